// models/src/identifiers.rs
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};

/// Folds UUID v4 entropy into a fixed-width decimal fragment.
fn random_digits(width: u32) -> String {
    let n = Uuid::new_v4().as_u128() % 10u128.pow(width);
    format!("{:0>width$}", n, width = width as usize)
}

/// Patient-facing health identifier, format `MH` + 10 ASCII digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MhNumber(String);

impl MhNumber {
    pub fn new(value: String) -> ValidationResult<Self> {
        if Self::is_valid(&value) {
            Ok(MhNumber(value))
        } else {
            Err(ValidationError::InvalidIdentifier(value))
        }
    }

    pub fn generate() -> Self {
        MhNumber(format!("MH{}", random_digits(10)))
    }

    fn is_valid(value: &str) -> bool {
        value.len() == 12
            && value.starts_with("MH")
            && value[2..].bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MhNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MhNumber::new(s.to_string())
    }
}

impl fmt::Display for MhNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider-facing unique identifier, format `MHP` + 10 ASCII digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MhpNumber(String);

impl MhpNumber {
    pub fn new(value: String) -> ValidationResult<Self> {
        if Self::is_valid(&value) {
            Ok(MhpNumber(value))
        } else {
            Err(ValidationError::InvalidIdentifier(value))
        }
    }

    pub fn generate() -> Self {
        MhpNumber(format!("MHP{}", random_digits(10)))
    }

    fn is_valid(value: &str) -> bool {
        value.len() == 13
            && value.starts_with("MHP")
            && value[3..].bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MhpNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MhpNumber::new(s.to_string())
    }
}

impl fmt::Display for MhpNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Government Free Programme code. Stored normalized: trimmed, upper-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GfpCode(String);

impl GfpCode {
    /// Normalizes raw user input. Empty input is rejected before the
    /// allow-list is ever consulted.
    pub fn normalize(raw: &str) -> ValidationResult<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(ValidationError::missing("gfpCode"));
        }
        Ok(GfpCode(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GfpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for GfpCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The path a voucher was created through. Determines the serial prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerialOrigin {
    Direct,
    Flutterwave,
    Paystack,
    Free,
}

impl SerialOrigin {
    pub fn prefix(&self) -> &'static str {
        match self {
            SerialOrigin::Direct => "PKG",
            SerialOrigin::Flutterwave => "FLW",
            SerialOrigin::Paystack => "PSK",
            SerialOrigin::Free => "FREE",
        }
    }
}

/// Human-readable voucher serial, format `{PREFIX}-{YEAR}-{8 uppercase hex}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn new(value: String) -> ValidationResult<Self> {
        if Self::is_valid(&value) {
            Ok(SerialNumber(value))
        } else {
            Err(ValidationError::InvalidIdentifier(value))
        }
    }

    /// Generates a fresh serial for the given origin. The random fragment is
    /// the first 8 hex characters of a UUID v4, upper-cased. Uniqueness is
    /// enforced at insert time, not here.
    pub fn generate(origin: SerialOrigin) -> Self {
        let year = Utc::now().year();
        let fragment: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect::<String>()
            .to_uppercase();
        SerialNumber(format!("{}-{}-{}", origin.prefix(), year, fragment))
    }

    fn is_valid(value: &str) -> bool {
        let mut parts = value.splitn(3, '-');
        let prefix_ok = matches!(parts.next(), Some("PKG" | "FLW" | "PSK" | "FREE"));
        let year_ok = parts
            .next()
            .map(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false);
        let fragment_ok = parts
            .next()
            .map(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_alphanumeric()))
            .unwrap_or(false);
        prefix_ok && year_ok && fragment_ok
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SerialNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SerialNumber::new(s.to_string())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{GfpCode, MhNumber, MhpNumber, SerialNumber, SerialOrigin};
    use core::str::FromStr;

    #[test]
    fn should_generate_valid_mh_number() {
        let mh = MhNumber::generate();
        assert!(mh.as_str().starts_with("MH"));
        assert_eq!(mh.as_str().len(), 12);
        assert!(mh.as_str()[2..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn should_generate_valid_mhp_number() {
        let mhp = MhpNumber::generate();
        assert!(mhp.as_str().starts_with("MHP"));
        assert_eq!(mhp.as_str().len(), 13);
        assert!(mhp.as_str()[3..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn should_reject_malformed_mhp_number() {
        assert!(MhpNumber::from_str("MHP12345").is_err());
        assert!(MhpNumber::from_str("MHX0123456789").is_err());
        assert!(MhpNumber::from_str("MHP01234a6789").is_err());
    }

    #[test]
    fn should_accept_wellformed_mhp_number() {
        let parsed = MhpNumber::from_str("MHP0123456789");
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap().as_str(), "MHP0123456789");
    }

    #[test]
    fn should_normalize_gfp_code() {
        let code = GfpCode::normalize("  gfp2024a \n").unwrap();
        assert_eq!(code.as_str(), "GFP2024A");
    }

    #[test]
    fn should_reject_empty_gfp_code() {
        assert!(GfpCode::normalize("   ").is_err());
    }

    #[test]
    fn should_generate_serial_with_origin_prefix() {
        let serial = SerialNumber::generate(SerialOrigin::Free);
        assert!(serial.as_str().starts_with("FREE-"));
        let fragment = serial.as_str().rsplit('-').next().unwrap();
        assert_eq!(fragment.len(), 8);
        assert_eq!(fragment, fragment.to_uppercase());
    }

    #[test]
    fn should_round_trip_serial_from_str() {
        let serial = SerialNumber::generate(SerialOrigin::Direct);
        let parsed = SerialNumber::from_str(serial.as_str());
        assert_eq!(parsed.unwrap(), serial);
    }

    #[test]
    fn should_reject_unknown_serial_prefix() {
        assert!(SerialNumber::from_str("ABC-2024-DEADBEEF").is_err());
    }
}
