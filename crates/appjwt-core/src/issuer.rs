use std::time::Duration;

use jsonwebtoken::Header;
use tracing::debug;

use crate::algorithm::SigningMethod;
use crate::claims::{ClaimsValidation, ResolvedClaims};
use crate::error::{ConfigError, Result, SigningError};
use crate::keys::{KeySource, SigningKey};

pub const DEFAULT_DURATION: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_ALGORITHM: &str = "RS256";

/// Raw inputs for one issuance.
///
/// `None` always means "not given by the caller"; defaults come from the
/// [`IssuancePolicy`], so an explicit value is never confused with a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceParameters {
    pub issuer: i64,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub duration: Option<Duration>,
    pub algorithm: Option<String>,
    pub key: Option<KeySource>,
    /// Invocation time in unix seconds, captured once by the caller.
    pub now: i64,
}

impl IssuanceParameters {
    pub fn new(issuer: i64, key: KeySource, now: i64) -> Self {
        Self {
            issuer,
            issued_at: None,
            expires_at: None,
            duration: None,
            algorithm: None,
            key: Some(key),
            now,
        }
    }
}

/// Defaults applied to inputs the caller left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuancePolicy {
    pub default_duration: Duration,
    pub default_algorithm: String,
    pub validation: ClaimsValidation,
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION,
            default_algorithm: DEFAULT_ALGORITHM.to_string(),
            validation: ClaimsValidation::default(),
        }
    }
}

/// A validated claim set together with everything needed to sign it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub claims: ResolvedClaims,
    pub key: SigningKey,
    pub method: SigningMethod,
}

#[derive(Debug, Clone, Default)]
pub struct TokenIssuer {
    policy: IssuancePolicy,
}

impl TokenIssuer {
    pub fn new(policy: IssuancePolicy) -> Self {
        Self { policy }
    }

    /// Resolves the time window and key for `params`.
    ///
    /// Checks run in a fixed order and stop at the first failure: issuer, key
    /// presence, algorithm, key parsing, duration/expiry exclusivity, then the
    /// temporal validity of the assembled claims.
    pub fn resolve(&self, params: &IssuanceParameters) -> Result<Resolution, ConfigError> {
        if params.issuer == 0 {
            return Err(ConfigError::MissingIssuer);
        }

        let material = params.key.as_ref().ok_or(ConfigError::MissingKey)?.read()?;

        let algorithm = params
            .algorithm
            .as_deref()
            .unwrap_or(&self.policy.default_algorithm);
        if algorithm.is_empty() {
            return Err(ConfigError::MissingAlgorithm);
        }
        let method = SigningMethod::lookup(algorithm)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(algorithm.to_string()))?;

        let key = SigningKey::from_material(&material, method.family())?;

        if params.duration.is_some() && params.expires_at.is_some() {
            return Err(ConfigError::ConflictingExpiry);
        }

        let reference = params.issued_at.unwrap_or(params.now);
        let expires_at = match params.expires_at {
            Some(exp) => exp,
            None => {
                let duration = params.duration.unwrap_or(self.policy.default_duration);
                i64::try_from(duration.as_secs())
                    .ok()
                    .and_then(|secs| reference.checked_add(secs))
                    .ok_or(ConfigError::TimeOverflow)?
            }
        };

        let claims = ResolvedClaims {
            iss: params.issuer,
            iat: reference,
            exp: expires_at,
        };
        self.policy.validation.validate(&claims, params.now)?;

        debug!(
            "resolved claims iss={} iat={} exp={} alg={}",
            claims.iss,
            claims.iat,
            claims.exp,
            method.name()
        );
        Ok(Resolution {
            claims,
            key,
            method,
        })
    }

    /// Signs `claims` with `key` under the method registered as `algorithm`.
    pub fn sign(
        claims: &ResolvedClaims,
        key: &SigningKey,
        algorithm: &str,
    ) -> Result<String, SigningError> {
        let method = SigningMethod::lookup(algorithm)
            .ok_or_else(|| SigningError::UnknownAlgorithm(algorithm.to_string()))?;
        let header = Header::new(method.algorithm());
        let token = jsonwebtoken::encode(&header, claims, key.encoding_key())?;
        Ok(token)
    }

    /// Resolves and signs in one step.
    pub fn issue(&self, params: &IssuanceParameters) -> Result<String> {
        let resolution = self.resolve(params)?;
        let token = Self::sign(
            &resolution.claims,
            &resolution.key,
            resolution.method.name(),
        )?;
        Ok(token)
    }
}
