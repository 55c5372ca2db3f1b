use serde::{Deserialize, Serialize};

use crate::error::ClaimsError;

/// The claim set carried by an application assertion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedClaims {
    pub iss: i64,
    pub iat: i64,
    pub exp: i64,
}

impl ResolvedClaims {
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

/// Temporal checks run on the claim set before it is signed.
///
/// The window itself must always be non-empty. Checks against the current
/// time are opt-in, since backdated assertions are a legitimate use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimsValidation {
    pub reject_expired: bool,
    pub reject_future_iat: bool,
    pub clock_skew_secs: u64,
}

impl Default for ClaimsValidation {
    fn default() -> Self {
        Self {
            reject_expired: false,
            reject_future_iat: false,
            clock_skew_secs: 0,
        }
    }
}

impl ClaimsValidation {
    /// Also reject windows that ended before `now` or start after it.
    ///
    /// A window ending exactly at `now` is still accepted.
    pub fn strict() -> Self {
        Self {
            reject_expired: true,
            reject_future_iat: true,
            ..Self::default()
        }
    }

    pub fn validate(&self, claims: &ResolvedClaims, now: i64) -> Result<(), ClaimsError> {
        if claims.exp <= claims.iat {
            return Err(ClaimsError::ExpiryNotAfterIssuedAt {
                issued_at: claims.iat,
                expires_at: claims.exp,
            });
        }
        if self.reject_expired && claims.exp < now {
            return Err(ClaimsError::Expired {
                expires_at: claims.exp,
                now,
            });
        }
        let skew = i64::try_from(self.clock_skew_secs).unwrap_or(i64::MAX);
        if self.reject_future_iat && claims.iat > now.saturating_add(skew) {
            return Err(ClaimsError::IssuedInFuture {
                issued_at: claims.iat,
                now,
                skew: self.clock_skew_secs,
            });
        }
        Ok(())
    }
}
