/// Fixed-decimal balance conversion
mod units;
pub use units::{
    format_balance, parse_balance, parse_balance_exact, ConversionError, Units, MAX_DECIMALS,
};

/// Avalanche's checksummed base58 id encoding
pub mod cb58;

/// Milliseconds since the unix epoch, as used by payload timestamps
pub fn now_millis() -> u64 {
    let now = chrono::Utc::now().timestamp_millis();
    u64::try_from(now).unwrap_or_default()
}
