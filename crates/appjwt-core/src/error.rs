//! Error types for token issuance.
//!
//! Resolution failures are [`ConfigError`]s, failures of the signature step
//! itself are [`SigningError`]s. Both are terminal for an invocation.

use std::io;
use std::path::PathBuf;

use crate::algorithm::KeyFamily;

/// Invalid or contradictory issuance input.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("issuer required")]
    MissingIssuer,

    #[error("key required")]
    MissingKey,

    #[error("unable to read key file {}", .path.display())]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {family} private key")]
    InvalidKey {
        family: KeyFamily,
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("algorithm required")]
    MissingAlgorithm,

    #[error(
        "unknown algorithm {0:?}, expected one of {}",
        crate::algorithm::supported_names()
    )]
    UnknownAlgorithm(String),

    #[error("duration and expiry are mutually exclusive")]
    ConflictingExpiry,

    #[error("expiry overflows the unix timestamp range")]
    TimeOverflow,

    #[error("invalid claims")]
    InvalidClaims(#[from] ClaimsError),

    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("unable to read config {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },
}

/// Temporal claim violations found before signing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    #[error("expiry {expires_at} is not after issued-at {issued_at}")]
    ExpiryNotAfterIssuedAt { issued_at: i64, expires_at: i64 },

    #[error("token expired at {expires_at} (now {now})")]
    Expired { expires_at: i64, now: i64 },

    #[error("token issued in the future at {issued_at} (now {now}, skew {skew}s)")]
    IssuedInFuture { issued_at: i64, now: i64, skew: u64 },
}

/// Failure of the cryptographic signing step.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("no signing method registered for {0:?}")]
    UnknownAlgorithm(String),

    #[error("failed to sign token")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Any failure of a full issuance.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
