use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

static SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+[smhdw])+$").expect("span regex"));
static SPAN_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)([smhdw])").expect("span part regex"));

/// Parses a validity span such as `600`, `5m` or `1h30m` into a [`Duration`].
///
/// A bare integer is a number of seconds. Zero-length spans are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let trimmed = input.trim();
    let invalid = |reason: &str| ConfigError::InvalidDuration {
        input: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let secs = if let Ok(secs) = trimmed.parse::<u64>() {
        secs
    } else if SPAN.is_match(trimmed) {
        let mut total: u64 = 0;
        for caps in SPAN_PART.captures_iter(trimmed) {
            let value: u64 = caps[1].parse().map_err(|_| invalid("value out of range"))?;
            let part = value
                .checked_mul(unit_seconds(&caps[2]))
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| invalid("value out of range"))?;
            total = part;
        }
        total
    } else {
        return Err(invalid("expected seconds or a span like 90s, 5m, 1h30m"));
    };

    if secs == 0 {
        return Err(invalid("duration must be positive"));
    }
    Ok(Duration::from_secs(secs))
}

fn unit_seconds(unit: &str) -> u64 {
    match unit {
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        "w" => 60 * 60 * 24 * 7,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_formats() {
        assert_eq!(parse_duration("600").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration(" 90s ").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1w").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn rejects_bad_spans() {
        for input in ["", "what", "5x", "-5m", "m", "1.5h", "0", "0m"] {
            assert!(
                matches!(parse_duration(input), Err(ConfigError::InvalidDuration { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_duration("99999999999999999999w").is_err());
        assert!(parse_duration("18446744073709551615w").is_err());
    }
}
