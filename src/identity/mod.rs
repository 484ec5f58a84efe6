//! Identity Module - key pairs and their on-disk / environment form
//!
//! A root key can come from an environment variable, a hex private-key file,
//! or be generated and written out. Delegate keys are never persisted here;
//! the bearer token is their only portable form.

mod keys;

pub use keys::KeyPair;

use crate::crypto::{CryptoError, CryptoPrimitives};
use crate::SignerConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

const KEY_FILE_PERMISSIONS: u32 = 0o600;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Environment variable not set: {0}")]
    MissingEnv(String),

    #[error("Failed to load key from {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save key to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

/// File locations for a persisted key pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletFiles {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
    pub address: PathBuf,
}

impl WalletFiles {
    /// The three standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            private_key: dir.join("private_key"),
            public_key: dir.join("public_key"),
            address: dir.join("node_address"),
        }
    }
}

impl KeyPair {
    /// Load a root key from the environment variable named in `config`
    pub fn from_env<P: CryptoPrimitives>(primitives: &P, config: &SignerConfig) -> Result<Self, IdentityError> {
        let var = &config.private_key_env_var;
        let value = zeroize::Zeroizing::new(
            std::env::var(var).map_err(|_| IdentityError::MissingEnv(var.clone()))?,
        );
        let key_pair = Self::from_hex(primitives, &value)?;
        tracing::info!(address = %key_pair.address(), variable = %var, "Key loaded from environment");
        Ok(key_pair)
    }

    /// Load a key pair from a hex private-key file
    pub async fn load<P: CryptoPrimitives>(primitives: &P, path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let path = path.as_ref();
        let contents = zeroize::Zeroizing::new(tokio::fs::read_to_string(path).await.map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "Failed to load key");
            IdentityError::Load {
                path: path.to_path_buf(),
                source,
            }
        })?);
        let key_pair = Self::from_hex(primitives, &contents)?;
        tracing::info!(address = %key_pair.address(), path = %path.display(), "Key loaded");
        Ok(key_pair)
    }

    /// Write private key, public key and address files.
    ///
    /// Fails if any file exists unless `overwrite` is set. Files are created
    /// with mode 0600 on unix.
    pub async fn save(&self, files: &WalletFiles, overwrite: bool) -> Result<(), IdentityError> {
        write_key_file(&files.private_key, self.private_key_hex().as_bytes(), overwrite).await?;
        write_key_file(&files.public_key, hex::encode(self.public_key()).as_bytes(), overwrite).await?;
        write_key_file(&files.address, self.address().to_string().as_bytes(), overwrite).await?;

        tracing::info!(
            address = %self.address(),
            path = %files.private_key.display(),
            "Key saved"
        );
        Ok(())
    }
}

async fn write_key_file(path: &Path, contents: &[u8], overwrite: bool) -> Result<(), IdentityError> {
    let save_err = |source| IdentityError::Save {
        path: path.to_path_buf(),
        source,
    };

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    options.mode(KEY_FILE_PERMISSIONS);

    let mut file = options.open(path).await.map_err(save_err)?;
    file.write_all(contents).await.map_err(save_err)?;
    file.flush().await.map_err(save_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secp256k1;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let files = WalletFiles::in_dir(temp_dir.path());
        let p = Secp256k1;

        let original = KeyPair::generate(&p).unwrap();
        original.save(&files, false).await.unwrap();

        let loaded = KeyPair::load(&p, &files.private_key).await.unwrap();
        assert_eq!(loaded, original);

        let address = tokio::fs::read_to_string(&files.address).await.unwrap();
        assert_eq!(address, original.address().to_string());
    }

    #[tokio::test]
    async fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let files = WalletFiles::in_dir(temp_dir.path());
        let p = Secp256k1;

        KeyPair::generate(&p).unwrap().save(&files, false).await.unwrap();

        let second = KeyPair::generate(&p).unwrap();
        assert!(matches!(
            second.save(&files, false).await,
            Err(IdentityError::Save { .. })
        ));

        second.save(&files, true).await.unwrap();
        assert_eq!(KeyPair::load(&p, &files.private_key).await.unwrap(), second);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let files = WalletFiles::in_dir(temp_dir.path());
        KeyPair::generate(&Secp256k1).unwrap().save(&files, false).await.unwrap();

        let mode = std::fs::metadata(&files.private_key).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, KEY_FILE_PERMISSIONS);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = KeyPair::load(&Secp256k1, temp_dir.path().join("nope")).await;

        assert!(matches!(result, Err(IdentityError::Load { .. })));
    }

    #[test]
    fn test_from_env() {
        let p = Secp256k1;
        let key_pair = KeyPair::generate(&p).unwrap();
        let config = SignerConfig {
            private_key_env_var: "RIVER_SIGNER_CORE_TEST_KEY".to_string(),
            ..SignerConfig::default()
        };

        std::env::set_var(&config.private_key_env_var, key_pair.private_key_hex().as_str());
        assert_eq!(KeyPair::from_env(&p, &config).unwrap(), key_pair);
        std::env::remove_var(&config.private_key_env_var);

        assert!(matches!(
            KeyPair::from_env(&p, &config),
            Err(IdentityError::MissingEnv(_))
        ));
    }
}
