//! JSON codec between logical values and stored bytes.
//!
//! Encoding is compact `serde_json` output. Decoding always yields a
//! [`serde_json::Value`]; a `Uuid` therefore comes back as a plain string.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{CacheError, CacheResult};

/// Serialize a value to compact JSON bytes.
///
/// Returns [`CacheError::Encode`] when the value has no JSON representation,
/// e.g. a map with non-string keys or a type whose serializer refuses JSON.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> CacheResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Encode {
        reason: e.to_string(),
    })
}

/// Parse stored bytes into a JSON value.
///
/// Returns [`CacheError::Decode`] when the payload is not well-formed JSON.
pub fn decode(payload: &[u8]) -> CacheResult<Value> {
    decode_as(payload)
}

/// Parse stored bytes directly into a caller type.
///
/// A payload that is valid JSON but does not fit `T` is also a decode error.
pub fn decode_as<T: DeserializeOwned>(payload: &[u8]) -> CacheResult<T> {
    serde_json::from_slice(payload).map_err(|e| CacheError::Decode {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};
    use uuid::Uuid;

    /// Stand-in for an arbitrary-precision decimal without a JSON mapping.
    struct Decimal(&'static str);

    impl Serialize for Decimal {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom(format!(
                "decimal {} has no JSON representation",
                self.0
            )))
        }
    }

    #[test]
    fn test_encode_is_compact() {
        let bytes = encode(&json!({"a": [1, 2, {"b": null}], "c": true})).expect("encode");
        assert_eq!(bytes, br#"{"a":[1,2,{"b":null}],"c":true}"#);
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&42).expect("encode"), b"42");
        assert_eq!(encode(&1.5).expect("encode"), b"1.5");
        assert_eq!(encode("hi").expect("encode"), b"\"hi\"");
        assert_eq!(encode(&false).expect("encode"), b"false");
        assert_eq!(encode(&Option::<i32>::None).expect("encode"), b"null");
    }

    #[test]
    fn test_uuid_encodes_as_hyphenated_string() {
        let id = Uuid::parse_str("67E55044-10B1-426F-9247-BB680E5FE0C8").expect("uuid");
        let bytes = encode(&id).expect("encode");
        assert_eq!(bytes, b"\"67e55044-10b1-426f-9247-bb680e5fe0c8\"");
    }

    #[test]
    fn test_uuid_decodes_as_plain_string() {
        let id = Uuid::new_v4();
        let decoded = decode(&encode(&id).expect("encode")).expect("decode");
        assert_eq!(decoded, Value::String(id.to_string()));
    }

    #[test]
    fn test_uuid_inside_structure() {
        let id = Uuid::new_v4();
        let value = json!({"owner": id, "tags": [id]});
        let decoded = decode(&encode(&value).expect("encode")).expect("decode");
        assert_eq!(decoded["owner"], Value::String(id.to_string()));
        assert_eq!(decoded["tags"][0], Value::String(id.to_string()));
    }

    #[test]
    fn test_encode_decimal_is_encode_error() {
        let err = encode(&Decimal("3.14159265358979323846")).expect_err("must fail");
        assert!(matches!(err, CacheError::Encode { .. }));
        assert!(err.is_codec());
        assert!(!err.is_store());
    }

    #[test]
    fn test_encode_binary_map_keys_is_encode_error() {
        let mut blobs: HashMap<Vec<u8>, i32> = HashMap::new();
        blobs.insert(vec![0xde, 0xad], 1);
        let err = encode(&blobs).expect_err("must fail");
        assert!(matches!(err, CacheError::Encode { .. }));

        let mut pairs: BTreeMap<(i32, i32), i32> = BTreeMap::new();
        pairs.insert((1, 2), 3);
        assert!(matches!(encode(&pairs), Err(CacheError::Encode { .. })));
    }

    #[test]
    fn test_decode_malformed_is_decode_error() {
        let payloads: [&[u8]; 5] = [b"{", b"not json", b"", b"[1,2", b"\xff\xfe"];
        for payload in payloads {
            let err = decode(payload).expect_err("must fail");
            assert!(matches!(err, CacheError::Decode { .. }), "payload {:?}", payload);
        }
    }

    #[test]
    fn test_decode_as_shape_mismatch_is_decode_error() {
        let err = decode_as::<Vec<i32>>(b"{\"a\":1}").expect_err("must fail");
        assert!(matches!(err, CacheError::Decode { .. }));
    }

    #[test]
    fn test_decode_as_typed() {
        let values: Vec<i32> = decode_as(b"[1,2,3]").expect("decode");
        assert_eq!(values, vec![1, 2, 3]);
    }
}
