//! COSE_Key encoding of an ES256 (P-256) public key

use std::collections::BTreeMap;

use serde_cbor::Value;

use super::constants::*;
use crate::error::Error;

/// Length, in bytes, a COSE-encoded ES256 public key must serialize to. This
/// is a correctness check, not a tunable: any deviation means the map shape
/// changed out from under us.
pub const ENCODED_LEN: usize = 77;

/// Encodes a raw uncompressed SEC1 EC point (`0x04 | X | Y`, 65 bytes) as a
/// COSE_Key map for the ES256 algorithm.
///
/// Rejects any point that is not exactly 65 bytes starting with `0x04`
/// (uncompressed point marker). The serialized result is always exactly
/// [`ENCODED_LEN`] bytes; that invariant is checked here rather than trusted.
pub fn encode_es256(ec_point: &[u8]) -> Result<Vec<u8>, Error> {
    if ec_point.len() != 65 || ec_point[0] != 0x04 {
        log::debug!(
            "cose::encode_es256: unexpected format, len={}",
            ec_point.len()
        );
        return Err(Error::Protocol("cose: unexpected EC point format"));
    }

    let x = &ec_point[1..33];
    let y = &ec_point[33..65];

    let mut map: BTreeMap<i32, Value> = BTreeMap::new();
    map.insert(COSE_KEY_KTY, Value::Integer(COSE_KEY_KTY_EC2 as i128));
    map.insert(COSE_KEY_ALG, Value::Integer(COSE_KEY_ALGO_ES256 as i128));
    map.insert(
        COSE_KEY_EC2_CRV,
        Value::Integer(COSE_KEY_EC2_CRV_P256 as i128),
    );
    map.insert(COSE_KEY_EC2_X, Value::Bytes(x.to_vec()));
    map.insert(COSE_KEY_EC2_Y, Value::Bytes(y.to_vec()));

    let encoded = serde_cbor::to_vec(&map).map_err(|e| {
        log::debug!("cose::encode_es256: cbor encode failed: {}", e);
        Error::Internal("cose: cbor encode failed")
    })?;

    if encoded.len() != ENCODED_LEN {
        log::debug!(
            "cose::encode_es256: unexpected encoded length {}",
            encoded.len()
        );
        return Err(Error::Internal("cose: unexpected encoded key length"));
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_point() -> Vec<u8> {
        let mut p = vec![0x04u8];
        p.extend((0..32).map(|i| i as u8));
        p.extend((32..64).map(|i| i as u8));
        p
    }

    #[test]
    fn encodes_to_exactly_77_bytes() {
        let encoded = encode_es256(&sample_point()).unwrap();
        assert_eq!(encoded.len(), ENCODED_LEN);
    }

    #[test]
    fn rejects_compressed_point() {
        let mut p = sample_point();
        p[0] = 0x02;
        assert!(encode_es256(&p).is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        let p = vec![0x04u8; 64];
        assert!(encode_es256(&p).is_err());
    }

    #[test]
    fn round_trips_x_and_y() {
        let point = sample_point();
        let encoded = encode_es256(&point).unwrap();
        let map: BTreeMap<i32, Value> = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(
            map.get(&COSE_KEY_EC2_X),
            Some(&Value::Bytes(point[1..33].to_vec()))
        );
        assert_eq!(
            map.get(&COSE_KEY_EC2_Y),
            Some(&Value::Bytes(point[33..65].to_vec()))
        );
    }
}
