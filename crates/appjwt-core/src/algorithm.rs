use std::fmt;

use jsonwebtoken::Algorithm;

/// The kind of private key a signing method needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyFamily::Hmac => "HMAC",
            KeyFamily::Rsa => "RSA",
            KeyFamily::Ec => "EC",
            KeyFamily::Ed => "Ed25519",
        };
        f.write_str(name)
    }
}

/// A registered signing method, looked up by its JOSE `alg` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningMethod {
    name: &'static str,
    algorithm: Algorithm,
    family: KeyFamily,
}

const REGISTRY: &[SigningMethod] = &[
    SigningMethod::new("HS256", Algorithm::HS256, KeyFamily::Hmac),
    SigningMethod::new("HS384", Algorithm::HS384, KeyFamily::Hmac),
    SigningMethod::new("HS512", Algorithm::HS512, KeyFamily::Hmac),
    SigningMethod::new("RS256", Algorithm::RS256, KeyFamily::Rsa),
    SigningMethod::new("RS384", Algorithm::RS384, KeyFamily::Rsa),
    SigningMethod::new("RS512", Algorithm::RS512, KeyFamily::Rsa),
    SigningMethod::new("PS256", Algorithm::PS256, KeyFamily::Rsa),
    SigningMethod::new("PS384", Algorithm::PS384, KeyFamily::Rsa),
    SigningMethod::new("PS512", Algorithm::PS512, KeyFamily::Rsa),
    SigningMethod::new("ES256", Algorithm::ES256, KeyFamily::Ec),
    SigningMethod::new("ES384", Algorithm::ES384, KeyFamily::Ec),
    SigningMethod::new("EdDSA", Algorithm::EdDSA, KeyFamily::Ed),
];

impl SigningMethod {
    const fn new(name: &'static str, algorithm: Algorithm, family: KeyFamily) -> Self {
        Self {
            name,
            algorithm,
            family,
        }
    }

    /// Names are matched case-sensitively, as they appear in the token header.
    pub fn lookup(name: &str) -> Option<Self> {
        REGISTRY.iter().find(|method| method.name == name).copied()
    }

    pub fn all() -> &'static [SigningMethod] {
        REGISTRY
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }
}

/// Comma separated list of registered names, for help and error output.
pub fn supported_names() -> String {
    REGISTRY
        .iter()
        .map(|method| method.name)
        .collect::<Vec<_>>()
        .join(", ")
}
