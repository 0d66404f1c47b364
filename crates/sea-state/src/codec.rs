//! Canonical byte encoding.
//!
//! One bincode configuration for everything that reaches the ledger:
//! fixed-width big-endian integers, length-prefixed strings and lists,
//! enum variant tags before payloads, and trailing bytes rejected on
//! decode. Combined with ordered collections in the data model this
//! makes `encode` a pure function of the value, which the ledger's
//! replay determinism depends on.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::StateError;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
}

/// Encode a value to its canonical bytes.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, StateError> {
    options()
        .serialize(value)
        .map_err(|e| StateError::Serialization(e.to_string()))
}

/// Decode a value from canonical bytes. Fails on any leftover bytes.
pub fn from_bytes<T: DeserializeOwned>(data: &[u8]) -> Result<T, StateError> {
    options()
        .deserialize(data)
        .map_err(|e| StateError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_big_endian_fixint() {
        let bytes = to_bytes(&1u32).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_map_order_is_stable() {
        let mut a = BTreeMap::new();
        a.insert("b".to_string(), 2i32);
        a.insert("a".to_string(), 1i32);
        let mut b = BTreeMap::new();
        b.insert("a".to_string(), 1i32);
        b.insert("b".to_string(), 2i32);
        assert_eq!(to_bytes(&a).unwrap(), to_bytes(&b).unwrap());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = to_bytes(&7u8).unwrap();
        bytes.push(0);
        assert!(from_bytes::<u8>(&bytes).is_err());
    }
}
