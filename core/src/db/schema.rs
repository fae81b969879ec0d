//! Namespaced key conventions from §6 ("Persisted state") and the
//! versioned-record envelope every value is wrapped in.

use serde::{de::DeserializeOwned, Serialize};

/// Every persisted record is prefixed with a 1-byte schema version so a
/// future migration can tell old and new layouts apart without a side
/// table. Version 1 is the only one this crate ever writes.
pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("empty record")]
    Empty,
    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u8),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Serializes `value` as JSON and prefixes it with `SCHEMA_VERSION`.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, EnvelopeError> {
    let mut bytes = vec![SCHEMA_VERSION];
    bytes.extend(serde_json::to_vec(value)?);
    Ok(bytes)
}

/// Inverse of `encode`. Rejects anything not written by this schema
/// version so a future incompatible layout fails loudly instead of
/// silently misparsing.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EnvelopeError> {
    let (version, rest) = bytes.split_first().ok_or(EnvelopeError::Empty)?;
    if *version != SCHEMA_VERSION {
        return Err(EnvelopeError::UnsupportedVersion(*version));
    }
    Ok(serde_json::from_slice(rest)?)
}

pub mod keys {
    pub fn header(chain: &str, hash_hex: &str) -> String {
        format!("headers/{chain}/{hash_hex}")
    }

    pub fn header_by_height(chain: &str, height: u64) -> String {
        format!("headers/{chain}/by_height/{height}")
    }

    pub fn tip(chain: &str) -> String {
        format!("headers/{chain}/tip")
    }

    pub fn swap(swap_id: &str) -> String {
        format!("swaps/info/{swap_id}")
    }

    pub fn swap_preimage(swap_id: &str) -> String {
        format!("swaps/preimages/{swap_id}")
    }

    pub fn token(symbol: &str) -> String {
        format!("bridge/tokens/{symbol}")
    }

    pub fn balance(address_hex: &str, symbol: &str) -> String {
        format!("bridge/balances/{address_hex}/{symbol}")
    }

    pub fn proof(proof_id: &str) -> String {
        format!("bridge/proofs/{proof_id}")
    }

    pub fn withdrawal(withdrawal_id: &str) -> String {
        format!("bridge/withdrawals/{withdrawal_id}")
    }

    pub fn validator(pubkey_hex: &str) -> String {
        format!("bridge/validators/{pubkey_hex}")
    }

    pub const BRIDGE_CONFIG: &str = "bridge/config";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips() {
        let value = vec![1u32, 2, 3];
        let bytes = encode(&value).unwrap();
        assert_eq!(bytes[0], SCHEMA_VERSION);
        let decoded: Vec<u32> = decode(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn decode_rejects_future_version() {
        let mut bytes = encode(&42u32).unwrap();
        bytes[0] = SCHEMA_VERSION + 1;
        assert!(matches!(
            decode::<u32>(&bytes),
            Err(EnvelopeError::UnsupportedVersion(_))
        ));
    }
}
