use crate::{types::U256, ErrorKind};
use thiserror::Error;

/// The most decimals a balance can have, `10^77` is the largest power of ten in a `U256`
pub const MAX_DECIMALS: u32 = 77;

/// Common HyperSDK unit sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Units {
    /// The native coin of the MorpheusVM family, 1e9 base units
    Coin,
    /// Base units
    Base,
    /// Use this for other less frequent unit sizes
    Other(u32),
}

impl Units {
    /// The number of decimals of this unit
    pub fn as_num(&self) -> u32 {
        match self {
            Units::Coin => 9,
            Units::Base => 0,
            Units::Other(inner) => *inner,
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Units::Coin
    }
}

impl From<u32> for Units {
    fn from(src: u32) -> Self {
        match src {
            9 => Units::Coin,
            0 => Units::Base,
            other => Units::Other(other),
        }
    }
}

impl From<Units> for u32 {
    fn from(units: Units) -> Self {
        units.as_num()
    }
}

/// Error thrown when converting between display strings and base units
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// The string is not a decimal number
    #[error("invalid balance `{0}`")]
    InvalidNumber(String),
    /// Balances cannot be negative
    #[error("balance cannot be negative: `{0}`")]
    Negative(String),
    /// More fractional digits than the unit supports
    #[error("balance `{value}` has more than {decimals} decimals")]
    TooManyDecimals {
        /// The offending input
        value: String,
        /// The unit's decimals
        decimals: u32,
    },
    /// The value does not fit
    #[error("balance `{0}` is too large")]
    Overflow(String),
}

impl ConversionError {
    /// Conversion failures are bad caller input
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

// `10^decimals`, failing for units no balance can be expressed in
fn scale(decimals: u32, value: &str) -> Result<U256, ConversionError> {
    if decimals > MAX_DECIMALS {
        return Err(ConversionError::Overflow(value.to_owned()))
    }
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| ConversionError::Overflow(value.to_owned()))
}

/// Converts a display string into base units, going through `f64`.
///
/// The string is parsed as a float and multiplied by `10^decimals`. A product with a fractional
/// part is rejected with [`ConversionError::TooManyDecimals`]. Values with more than ~15
/// significant digits lose precision on the way; this matches the behavior existing consumers
/// rely on. Use [`parse_balance_exact`] when exactness matters.
///
/// ```
/// use hypersdk_core::{types::U256, utils::parse_balance};
///
/// assert_eq!(parse_balance("1.5", 9).unwrap(), U256::from(1_500_000_000u64));
/// ```
pub fn parse_balance<K: Into<Units>>(balance: &str, units: K) -> Result<U256, ConversionError> {
    let decimals = units.into().as_num();
    scale(decimals, balance)?;
    let exponent =
        i32::try_from(decimals).map_err(|_| ConversionError::Overflow(balance.to_owned()))?;
    let trimmed = balance.trim();
    let float: f64 =
        trimmed.parse().map_err(|_| ConversionError::InvalidNumber(balance.to_owned()))?;
    if !float.is_finite() {
        return Err(ConversionError::InvalidNumber(balance.to_owned()))
    }
    if float < 0.0 {
        return Err(ConversionError::Negative(balance.to_owned()))
    }

    let scaled = float * 10f64.powi(exponent);
    if !scaled.is_finite() || scaled >= u128::MAX as f64 {
        return Err(ConversionError::Overflow(balance.to_owned()))
    }
    if scaled.fract() != 0.0 {
        return Err(ConversionError::TooManyDecimals { value: balance.to_owned(), decimals })
    }
    Ok(U256::from(scaled as u128))
}

/// Converts a display string into base units without any floating point step.
///
/// Rejects inputs with more fractional digits than `decimals`.
///
/// ```
/// use hypersdk_core::{types::U256, utils::parse_balance_exact};
///
/// let amount = parse_balance_exact("123456789.123456789", 9).unwrap();
/// assert_eq!(amount, U256::from(123_456_789_123_456_789u64));
/// ```
pub fn parse_balance_exact<K: Into<Units>>(
    balance: &str,
    units: K,
) -> Result<U256, ConversionError> {
    let decimals = units.into().as_num();
    scale(decimals, balance)?;
    let trimmed = balance.trim();
    if trimmed.starts_with('-') {
        return Err(ConversionError::Negative(balance.to_owned()))
    }
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(ConversionError::InvalidNumber(balance.to_owned()))
    }

    // trailing zeros carry no value
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(ConversionError::TooManyDecimals { value: balance.to_owned(), decimals })
    }

    let digits = format!("{int_part}{frac_part:0<width$}", width = decimals as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero())
    }
    U256::from_dec_str(digits).map_err(|_| ConversionError::Overflow(balance.to_owned()))
}

/// Formats base units as a display string with exactly `decimals` fractional digits.
///
/// Fails with [`ConversionError::Overflow`] for more than [`MAX_DECIMALS`] decimals.
///
/// ```
/// use hypersdk_core::{types::U256, utils::format_balance};
///
/// assert_eq!(format_balance(U256::from(1_500_000_000u64), 9).unwrap(), "1.500000000");
/// ```
pub fn format_balance<T: Into<U256>, K: Into<Units>>(
    amount: T,
    units: K,
) -> Result<String, ConversionError> {
    let decimals = units.into().as_num();
    let amount = amount.into();
    let divisor = scale(decimals, &amount.to_string())?;
    let quotient = amount / divisor;
    let remainder = amount % divisor;
    Ok(format!("{quotient}.{:0>width$}", remainder.to_string(), width = decimals as usize))
}
