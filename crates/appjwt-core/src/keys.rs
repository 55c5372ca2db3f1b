use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use jsonwebtoken::EncodingKey;
use tracing::{debug, warn};

use crate::algorithm::KeyFamily;
use crate::error::ConfigError;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Where the private key material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl KeySource {
    /// Returns the raw key material, rejecting empty input.
    pub fn read(&self) -> Result<Vec<u8>, ConfigError> {
        let material = match self {
            KeySource::Bytes(bytes) => bytes.clone(),
            KeySource::File(path) => read_key_file(path)?,
        };
        if material.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigError::MissingKey);
        }
        Ok(material)
    }
}

fn read_key_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let material = fs::read(path).map_err(|source| ConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    warn_if_shared(path);
    debug!("read {} bytes of key material from {}", material.len(), path.display());
    Ok(material)
}

fn warn_if_shared(path: &Path) {
    #[cfg(unix)]
    {
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                warn!(
                    "private key {} is accessible by other users (mode {:o})",
                    path.display(),
                    mode & 0o777
                );
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

/// A parsed private key, tagged with the family it was parsed as.
#[derive(Clone)]
pub struct SigningKey {
    family: KeyFamily,
    key: EncodingKey,
}

impl SigningKey {
    /// Parses `material` as a private key of `family`.
    ///
    /// RSA keys are accepted as PKCS#1 or PKCS#8 PEM, EC and Ed25519 keys as
    /// PKCS#8 PEM. HMAC uses the bytes as the shared secret, minus trailing
    /// whitespace left by editors.
    pub fn from_material(material: &[u8], family: KeyFamily) -> Result<Self, ConfigError> {
        let parsed = match family {
            KeyFamily::Hmac => {
                let secret = trim_end(material);
                if secret.is_empty() {
                    return Err(ConfigError::MissingKey);
                }
                Ok(EncodingKey::from_secret(secret))
            }
            KeyFamily::Rsa => EncodingKey::from_rsa_pem(material),
            KeyFamily::Ec => EncodingKey::from_ec_pem(material),
            KeyFamily::Ed => EncodingKey::from_ed_pem(material),
        };
        let key = parsed.map_err(|source| ConfigError::InvalidKey { family, source })?;
        Ok(Self { family, key })
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}
