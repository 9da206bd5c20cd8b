//! Account addresses
//!
//! An address is 32 bytes. The canonical text form is `0x` followed by 64
//! lowercase hex characters; short forms such as `0x1` are accepted on input
//! and left-padded with zeros.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; Address::LENGTH]);

impl Address {
    pub const LENGTH: usize = 32;

    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(Error::InvalidArgument(format!(
                "Invalid address length: {}",
                s
            )));
        }

        let padded = format!("{:0>width$}", digits, width = Self::LENGTH * 2);
        let decoded = hex::decode(&padded)
            .map_err(|e| Error::InvalidArgument(format!("Invalid address {}: {}", s, e)))?;

        let mut bytes = [0u8; Self::LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_is_left_padded() {
        let addr: Address = "0x1".parse().unwrap();
        assert_eq!(
            addr.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_accepts_missing_prefix_and_uppercase() {
        let a: Address = "ABCDEF".parse().unwrap();
        let b: Address = "0xabcdef".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!("0x".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
        let too_long = format!("0x{}", "1".repeat(65));
        assert!(too_long.parse::<Address>().is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let addr: Address = "0x2a".parse().unwrap();
        let json = serde_json::to_value(addr).unwrap();
        assert_eq!(json.as_str().unwrap(), addr.to_string());

        let back: Address = serde_json::from_value(json).unwrap();
        assert_eq!(back, addr);
    }
}
