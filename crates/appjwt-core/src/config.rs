use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::claims::ClaimsValidation;
use crate::error::ConfigError;
use crate::issuer::IssuancePolicy;
use crate::validity::parse_duration;

/// Optional settings read from a TOML or YAML file.
///
/// Every field may be overridden on the command line.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IssuerConfig {
    #[serde(default)]
    pub issuer: Option<i64>,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub default_duration: Option<String>,
    #[serde(default)]
    pub strict_time: bool,
}

impl IssuerConfig {
    /// Builds the issuance defaults, falling back to the built-in ones.
    ///
    /// The configured duration replaces the default window only; it never
    /// counts as an explicit duration.
    pub fn policy(&self) -> Result<IssuancePolicy, ConfigError> {
        let mut policy = IssuancePolicy::default();
        if let Some(raw) = &self.default_duration {
            policy.default_duration = parse_duration(raw)?;
        }
        if let Some(algorithm) = &self.algorithm {
            policy.default_algorithm = algorithm.clone();
        }
        if self.strict_time {
            policy.validation = ClaimsValidation::strict();
        }
        Ok(policy)
    }
}

pub fn load_config(path: &Path) -> Result<IssuerConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| ConfigError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };
    if path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
    {
        serde_yaml::from_str(&raw).map_err(|e| parse_error(single_line(&e.to_string())))
    } else {
        toml::from_str(&raw).map_err(|e| parse_error(toml_message(&raw, &e)))
    }
}

/// The toml error's `Display` embeds a source snippet; keep the message and
/// its position only.
fn toml_message(raw: &str, err: &toml::de::Error) -> String {
    let message = single_line(err.message());
    match err.span() {
        Some(span) => {
            let before = raw.get(..span.start).unwrap_or(raw);
            let line = before.matches('\n').count() + 1;
            let column = before.len() - before.rfind('\n').map_or(0, |idx| idx + 1) + 1;
            format!("{message} at line {line}, column {column}")
        }
        None => message,
    }
}

fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use tempfile::Builder;

    use super::*;
    use crate::issuer::DEFAULT_DURATION;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_toml() {
        let file = write_config(
            ".toml",
            "issuer = 1234\nkey_path = \"/etc/app/key.pem\"\ndefault_duration = \"5m\"\n",
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.issuer, Some(1234));
        assert_eq!(config.key_path, Some(PathBuf::from("/etc/app/key.pem")));
        assert!(!config.strict_time);
        assert_eq!(
            config.policy().unwrap().default_duration,
            Duration::from_secs(300)
        );
    }

    #[test]
    fn loads_yaml() {
        let file = write_config(".yml", "issuer: 99\nalgorithm: ES256\nstrict_time: true\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.issuer, Some(99));
        let policy = config.policy().unwrap();
        assert_eq!(policy.default_algorithm, "ES256");
        assert_eq!(policy.default_duration, DEFAULT_DURATION);
        assert_eq!(policy.validation, ClaimsValidation::strict());
    }

    #[test]
    fn rejects_unknown_fields_and_bad_duration() {
        let file = write_config(".toml", "isuer = 1\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ConfigParse { .. })
        ));

        let config = IssuerConfig {
            default_duration: Some("soon".to_string()),
            ..IssuerConfig::default()
        };
        assert!(matches!(
            config.policy(),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn parse_errors_render_on_one_line() {
        let file = write_config(".toml", "issuer = \"abc\"\n");
        let err = load_config(file.path()).unwrap_err();
        let rendered = err.to_string();
        assert!(!rendered.contains('\n'), "{rendered:?}");
        assert!(rendered.contains("at line 1, column 10"), "{rendered:?}");

        let file = write_config(".yaml", "issuer: [1, 2\n");
        let rendered = load_config(file.path()).unwrap_err().to_string();
        assert!(!rendered.contains('\n'), "{rendered:?}");
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/appjwt.toml")),
            Err(ConfigError::ConfigRead { .. })
        ));
    }
}
