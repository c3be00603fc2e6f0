//! Some convenient serde helpers

use crate::types::U256;
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use std::convert::TryFrom;

/// Helper type to parse numeric strings and JSON numbers
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum StringifiedNumeric {
    /// `"1234"` or `"0x4d2"`
    String(String),
    /// `1234`
    Num(u64),
}

impl TryFrom<StringifiedNumeric> for U256 {
    type Error = String;

    fn try_from(value: StringifiedNumeric) -> Result<Self, Self::Error> {
        match value {
            StringifiedNumeric::Num(n) => Ok(U256::from(n)),
            StringifiedNumeric::String(s) => {
                if let Some(hex) = s.strip_prefix("0x") {
                    U256::from_str_radix(hex, 16).map_err(|err| err.to_string())
                } else {
                    U256::from_dec_str(&s).map_err(|err| err.to_string())
                }
            }
        }
    }
}

impl TryFrom<StringifiedNumeric> for u64 {
    type Error = String;

    fn try_from(value: StringifiedNumeric) -> Result<Self, Self::Error> {
        match value {
            StringifiedNumeric::Num(n) => Ok(n),
            StringifiedNumeric::String(s) => s.parse::<u64>().map_err(|err| err.to_string()),
        }
    }
}

/// Supports parsing numbers as strings
pub fn deserialize_stringified_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let num = StringifiedNumeric::deserialize(deserializer)?;
    u64::try_from(num).map_err(D::Error::custom)
}

/// Supports parsing big numbers as strings or JSON numbers
pub fn deserialize_stringified_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let num = StringifiedNumeric::deserialize(deserializer)?;
    U256::try_from(num).map_err(D::Error::custom)
}

/// (De)serializes a `u64` as a decimal string, accepting numbers on the way in
pub mod string_u64 {
    use super::*;

    /// Serializes as `"1234"`
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Accepts `"1234"` or `1234`
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserialize_stringified_u64(deserializer)
    }
}

/// (De)serializes a [`U256`] as a decimal string, accepting numbers and hex on the way in
pub mod string_u256 {
    use super::*;

    /// Serializes as `"1234"`
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Accepts `"1234"`, `"0x4d2"` or `1234`
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserialize_stringified_u256(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Amount {
        #[serde(deserialize_with = "deserialize_stringified_u256")]
        amount: U256,
    }

    #[test]
    fn parses_numbers_and_strings() {
        let a: Amount = serde_json::from_str(r#"{"amount":1000}"#).unwrap();
        assert_eq!(a.amount, U256::from(1000));
        let a: Amount = serde_json::from_str(r#"{"amount":"1000"}"#).unwrap();
        assert_eq!(a.amount, U256::from(1000));
        let a: Amount = serde_json::from_str(r#"{"amount":"0x3e8"}"#).unwrap();
        assert_eq!(a.amount, U256::from(1000));
        assert!(serde_json::from_str::<Amount>(r#"{"amount":"ten"}"#).is_err());
    }
}
