//! CBOR encoding for stored records, plus big-endian counter values.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Encode a record as CBOR.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Decode a CBOR record.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Encode a counter value as 8 big-endian bytes.
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode an 8-byte big-endian counter value.
pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("counter has {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use academic_ledger_core::{Address, AuthorizationStatus, Institution};

    #[test]
    fn test_record_decode_matches_encode() {
        let institution = Institution {
            index: "institution-1".into(),
            name: "State University".into(),
            address: "addr1".into(),
            creator: Address::new("cosmos1creator"),
            is_authorized: AuthorizationStatus::Unauthorized,
        };
        let bytes = encode(&institution).unwrap();
        let decoded: Institution = decode(&bytes).unwrap();
        assert_eq!(decoded, institution);
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let result: Result<Institution> = decode(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_counter_bytes_sort_numerically() {
        assert!(encode_u64(9) < encode_u64(10));
        assert_eq!(decode_u64(&encode_u64(42)).unwrap(), 42);
        assert!(decode_u64(&[1, 2]).is_err());
    }
}
