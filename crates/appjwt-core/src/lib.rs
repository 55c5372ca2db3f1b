//! Issues short-lived JWT assertions that identify an application, such as
//! the token a GitHub App signs to request installation credentials.
//!
//! [`TokenIssuer::resolve`] reconciles the issued-at, expiry and duration
//! inputs into a [`ResolvedClaims`] window and loads the signing key;
//! [`TokenIssuer::sign`] turns the result into a compact token.

pub mod algorithm;
pub mod claims;
pub mod config;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod validity;

pub use algorithm::{KeyFamily, SigningMethod};
pub use claims::{ClaimsValidation, ResolvedClaims};
pub use config::{load_config, IssuerConfig};
pub use error::{ClaimsError, ConfigError, Error, SigningError};
pub use issuer::{IssuanceParameters, IssuancePolicy, Resolution, TokenIssuer};
pub use keys::{KeySource, SigningKey};
