use nuevgen::core::flux::flavor::{flavor_code, is_neutrino};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),

    #[error("Unknown neutrino flavor '{0}'. Expected a PDG code (e.g. 14) or a name (e.g. numubar).")]
    UnknownFlavor(String),

    #[error("Invalid {kind} value for '{key}': '{value}'")]
    InvalidValue {
        kind: &'static str,
        key: String,
        value: String,
    },
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    pair.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| ParseError::InvalidKeyValue(pair.to_string()))
}

/// A neutrino flavor given either as a PDG code or by name.
pub fn parse_flavor(token: &str) -> Result<i32, ParseError> {
    let token = token.trim();
    let code = match token.parse::<i32>() {
        Ok(code) => Some(code).filter(|c| is_neutrino(*c)),
        Err(_) => flavor_code(token),
    };
    code.ok_or_else(|| ParseError::UnknownFlavor(token.to_string()))
}

pub fn parse_number<T: std::str::FromStr>(
    kind: &'static str,
    key: &str,
    value: &str,
) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidValue {
        kind,
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_at_first_equals() {
        assert_eq!(
            parse_key_value("geometry.fiducial-cut=box:0,0,0,1,1,1").unwrap(),
            ("geometry.fiducial-cut", "box:0,0,0,1,1,1")
        );
        assert_eq!(
            parse_key_value("flux.mixer.config=swap 12:14=x").unwrap(),
            ("flux.mixer.config", "swap 12:14=x")
        );
        assert!(parse_key_value("no-equals").is_err());
        assert!(parse_key_value("=3").is_err());
    }

    #[test]
    fn flavors_accept_codes_and_names() {
        assert_eq!(parse_flavor("14"), Ok(14));
        assert_eq!(parse_flavor(" -12 "), Ok(-12));
        assert_eq!(parse_flavor("NuMuBar"), Ok(-14));
        assert_eq!(parse_flavor("2212"), Err(ParseError::UnknownFlavor("2212".to_string())));
        assert!(parse_flavor("muon").is_err());
    }

    #[test]
    fn numbers_report_the_offending_key() {
        assert_eq!(parse_number::<f64>("float", "flux.mono-energy", "2.5"), Ok(2.5));
        let err = parse_number::<u64>("integer", "environment.seed", "x").unwrap_err();
        assert!(err.to_string().contains("environment.seed"));
    }
}
