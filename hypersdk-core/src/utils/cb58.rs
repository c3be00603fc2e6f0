//! cb58 is base58 over the payload followed by the last four bytes of its sha256.
//!
//! Avalanche uses it to render ids, including the chain id returned by `hypersdk.network`.

use crate::{types::U256, ErrorKind};
use sha2::{Digest, Sha256};
use thiserror::Error;

const CHECKSUM_LEN: usize = 4;

/// Length of an id (chain, subnet, block, transaction)
pub const ID_LEN: usize = 32;

/// Error thrown when decoding a cb58 string
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Cb58Error {
    /// Not valid base58
    #[error("invalid base58: {0}")]
    Base58(String),
    /// Too short to carry a checksum
    #[error("cb58 input too short: {0} bytes")]
    TooShort(usize),
    /// The checksum does not match the payload
    #[error("cb58 checksum mismatch")]
    BadChecksum,
    /// The payload is not a 32 byte id
    #[error("expected a {ID_LEN} byte id, got {0} bytes")]
    BadIdLength(usize),
}

impl Cb58Error {
    /// Decoding errors come from malformed input
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Encoding
    }
}

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[hash.len() - CHECKSUM_LEN..]);
    out
}

/// Encodes bytes as cb58
pub fn encode<T: AsRef<[u8]>>(payload: T) -> String {
    let payload = payload.as_ref();
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum(payload));
    bs58::encode(buf).into_string()
}

/// Decodes a cb58 string, verifying its checksum
pub fn decode(s: &str) -> Result<Vec<u8>, Cb58Error> {
    let mut raw = bs58::decode(s).into_vec().map_err(|e| Cb58Error::Base58(e.to_string()))?;
    if raw.len() < CHECKSUM_LEN {
        return Err(Cb58Error::TooShort(raw.len()))
    }
    let split = raw.len() - CHECKSUM_LEN;
    if raw[split..] != checksum(&raw[..split]) {
        return Err(Cb58Error::BadChecksum)
    }
    raw.truncate(split);
    Ok(raw)
}

/// Decodes a cb58 id into its 32 bytes
pub fn decode_id(s: &str) -> Result<[u8; ID_LEN], Cb58Error> {
    let raw = decode(s)?;
    <[u8; ID_LEN]>::try_from(raw.as_slice()).map_err(|_| Cb58Error::BadIdLength(raw.len()))
}

/// Decodes a cb58 id and reads it as a big-endian integer.
///
/// This is the integer form of the chain id placed into transaction payloads.
pub fn id_to_u256(s: &str) -> Result<U256, Cb58Error> {
    Ok(U256::from_big_endian(&decode_id(s)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const CHAIN_ID: &str = "2c7iUW3kCDwRA9ZFd5bjZZc8iDy68uAsFSBahjqSZGttiTDSNH";
    const CHAIN_ID_BYTES: [u8; 32] =
        hex!("d36e467c73e2840140cc41b3d72f8a5a7446b2399c39b9c74d4cf077d2509024");

    #[test]
    fn decodes_chain_id() {
        assert_eq!(decode_id(CHAIN_ID).unwrap(), CHAIN_ID_BYTES);
        assert_eq!(encode(CHAIN_ID_BYTES), CHAIN_ID);
    }

    #[test]
    fn chain_id_as_integer() {
        let id = id_to_u256(CHAIN_ID).unwrap();
        let mut be = [0u8; 32];
        id.to_big_endian(&mut be);
        assert_eq!(be, CHAIN_ID_BYTES);
    }

    #[test]
    fn rejects_corrupted_input() {
        let mut corrupted = CHAIN_ID.to_string();
        corrupted.replace_range(0..1, "3");
        assert!(matches!(decode(&corrupted), Err(Cb58Error::BadChecksum)));
        assert!(matches!(decode("0OIl"), Err(Cb58Error::Base58(_))));
        assert!(matches!(decode_id(&encode([1u8, 2, 3])), Err(Cb58Error::BadIdLength(3))));
    }
}
