//! WebAuthn authenticator-data synthesis
//!
//! U2F authenticators never produce a WebAuthn `authData` structure
//! themselves; this module fabricates one from the pieces a U2F response
//! does carry (RP-id, a presence/flags byte, a signature counter, and —
//! for registration — the raw EC point and key handle). Two variants share
//! a 37-byte header: [`fake`] emits just the header for assertions,
//! [`encode_credential`] appends the attested-credential block for
//! registrations.

use ring::digest::{digest, SHA256};

use crate::cose;
use crate::error::Error;
use crate::secret::Secret;

const HEADER_LEN: usize = 37;
/// `user-present | attested-credential-data-included`. Hardcoded because a
/// synthesized U2F registration always reports exactly these two facts: the
/// test of user presence passed (no U2F exchange completes otherwise), and
/// this call is attaching attested credential data.
pub const REGISTRATION_FLAGS: u8 = 0x41;

fn header(rp_id: &str, flags: u8, sigcount: [u8; 4]) -> [u8; HEADER_LEN] {
    let rp_id_hash = digest(&SHA256, rp_id.as_bytes());
    let mut out = [0u8; HEADER_LEN];
    out[..32].copy_from_slice(rp_id_hash.as_ref());
    out[32] = flags;
    out[33..37].copy_from_slice(&sigcount);
    out
}

fn wrap_cbor_bytestring(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    serde_cbor::to_vec(&serde_bytes::Bytes::new(bytes)).map_err(|e| {
        log::debug!("authdata: cbor_serialize_alloc failed: {}", e);
        Error::Internal("authdata: cbor encode failed")
    })
}

/// Synthesizes the 37-byte authData header used for an assertion, wrapped as
/// a CBOR byte string. `sigcount` and `flags` are copied verbatim from the
/// device's AUTHENTICATE reply.
pub fn fake(rp_id: &str, flags: u8, sigcount: [u8; 4]) -> Result<Vec<u8>, Error> {
    wrap_cbor_bytestring(&header(rp_id, flags, sigcount))
}

/// Synthesizes the authData for a registration: header, a zeroed AAGUID, the
/// big-endian-length-prefixed key handle, and the COSE-encoded ES256 public
/// key, wrapped as a CBOR byte string.
///
/// `flags` is always [`REGISTRATION_FLAGS`] and `sigcount` is always zero for
/// a freshly-registered U2F credential; callers don't get to override them,
/// matching the reference's hardcoded `authdata.flags = 0x41`.
pub fn encode_credential(rp_id: &str, key_handle: &[u8], ec_point: &[u8]) -> Result<Vec<u8>, Error> {
    if key_handle.len() > u8::MAX as usize {
        return Err(Error::Internal("authdata: key handle too long"));
    }

    let pk = Secret::new(cose::encode_es256(ec_point)?);

    let mut buf = Vec::with_capacity(HEADER_LEN + 16 + 2 + key_handle.len() + pk.len());
    buf.extend_from_slice(&header(rp_id, REGISTRATION_FLAGS, [0; 4]));
    buf.extend_from_slice(&[0u8; 16]); // aaguid
    buf.extend_from_slice(&(key_handle.len() as u16).to_be_bytes());
    buf.extend_from_slice(key_handle);
    buf.extend_from_slice(&pk);
    let buf = Secret::new(buf);

    wrap_cbor_bytestring(&buf)
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
    fn fake_authdata_has_37_byte_header_and_matching_rp_hash() {
        let encoded = fake("example.com", 0x01, [0, 0, 0, 7]).unwrap();
        let raw: serde_bytes::ByteBuf = serde_cbor::from_slice(&encoded).unwrap();
        assert_eq!(raw.len(), HEADER_LEN);
        let expected_hash = digest(&SHA256, b"example.com");
        assert_eq!(&raw[..32], expected_hash.as_ref());
        assert_eq!(raw[32], 0x01);
        assert_eq!(&raw[33..37], &[0, 0, 0, 7]);
    }

    #[test]
    fn credential_authdata_matches_expected_layout() {
        let kh = vec![0xABu8; 0x40];
        let point = sample_point();
        let encoded = encode_credential("example.com", &kh, &point).unwrap();
        let raw: serde_bytes::ByteBuf = serde_cbor::from_slice(&encoded).unwrap();

        assert_eq!(raw.len(), HEADER_LEN + 16 + 2 + kh.len() + cose::key::ENCODED_LEN);
        assert_eq!(raw[32], REGISTRATION_FLAGS);
        assert_eq!(&raw[33..37], &[0, 0, 0, 0]);
        assert_eq!(&raw[37..53], &[0u8; 16]);
        assert_eq!(&raw[53..55], &[0x00, 0x40]);
        assert_eq!(&raw[55..55 + kh.len()], kh.as_slice());
    }

    #[test]
    fn rejects_oversized_key_handle() {
        let kh = vec![0u8; 256];
        let point = sample_point();
        assert!(encode_credential("example.com", &kh, &point).is_err());
    }
}
