//! Orchestrators: `u2f_register` and `u2f_authenticate`
//!
//! These sequence exclude-list/allow-list probes, user-presence prompts, and
//! the final REGISTER/AUTHENTICATE call, then populate the output
//! credential/assertion holders. Everything below them (APDU construction,
//! the poll loop, response parsing, authdata synthesis) is a leaf; this
//! module is where those leaves get sequenced.

use ring::digest::{digest, SHA256};

use crate::apdu::{self, Apdu};
use crate::assertion::{Assertion, AssertionRequest};
use crate::config::PollTiming;
use crate::credential::{Algorithm, Credential, CredentialRequest};
use crate::device::{self, sw, Device};
use crate::error::{Error, Skip};
use crate::poll;
use crate::response::{parse_auth_reply, parse_register_reply};

const SHA256_LEN: usize = 32;
const CMD: u8 = device::CTAPHID_MSG;

fn rp_id_hash(rp_id: &str) -> [u8; SHA256_LEN] {
    let mut out = [0u8; SHA256_LEN];
    out.copy_from_slice(digest(&SHA256, rp_id.as_bytes()).as_ref());
    out
}

/// Checks whether `key_handle` belongs to this authenticator, for this
/// `rp_id`, without requiring a touch.
///
/// Sends AUTHENTICATE/CHECK-ONLY directly (no poll-loop retry: the device is
/// expected to answer immediately with one of the two status words below)
/// and interprets the reply:
/// - `SW_CONDITIONS_NOT_SATISFIED` → the key exists.
/// - `SW_WRONG_DATA` → the key does not exist.
/// - anything else → an internal error.
fn key_lookup(
    dev: &mut impl Device,
    rp_id: &str,
    key_handle: &[u8],
    timing: PollTiming,
) -> Result<bool, Error> {
    if key_handle.len() > u8::MAX as usize {
        return Err(Error::InvalidArgument("key handle too long"));
    }

    let hash = rp_id_hash(rp_id);
    let mut request = Apdu::new(
        apdu::INS_AUTHENTICATE,
        apdu::P1_CHECK_ONLY,
        2 * SHA256_LEN + 1 + key_handle.len(),
    );
    request.add(&[0xFFu8; SHA256_LEN])?;
    request.add(&hash)?;
    request.add(&[key_handle.len() as u8])?;
    request.add(key_handle)?;
    let apdu = request.into_bytes();

    dev.tx(CMD, &apdu).map_err(|e| {
        log::debug!("key_lookup: tx failed: {}", e);
        Error::send(e)
    })?;

    let mut reply = [0u8; 8];
    let n = dev.rx(CMD, &mut reply, timing.rx_timeout_ms()).map_err(|e| {
        log::debug!("key_lookup: rx failed: {}", e);
        Error::recv(e)
    })?;
    if n != 2 {
        log::debug!("key_lookup: rx returned {} bytes, want 2", n);
        return Err(Error::Receive("key_lookup: unexpected reply length".into()));
    }

    match device::status_word(&reply[..n]) {
        Some(sw::CONDITIONS_NOT_SATISFIED) => Ok(true),
        Some(sw::WRONG_DATA) => Ok(false),
        other => {
            log::debug!("key_lookup: unexpected status word {:?}", other);
            Err(Error::Internal("key_lookup: unexpected status word"))
        }
    }
}

/// Issues a REGISTER with an all-`0xFF` challenge and application, solely to
/// force a user-presence-gated reply from the authenticator. The resulting
/// attestation is discarded; this call exists only to make the "credential
/// excluded" UX match the success path (the user still has to touch the
/// key).
fn send_dummy_register(dev: &mut impl Device, timing: PollTiming) -> Result<(), Error> {
    let mut request = Apdu::new(apdu::INS_REGISTER, 0, 2 * SHA256_LEN);
    request.add(&[0xFFu8; SHA256_LEN])?;
    request.add(&[0xFFu8; SHA256_LEN])?;
    let apdu = request.into_bytes();

    let mut reply = [0u8; 2048];
    poll::poll(dev, CMD, &apdu, &mut reply, timing)?;
    Ok(())
}

/// Signs `client_data_hash` with `key_handle`, driving the poll loop, and
/// returns the parsed signature and synthesized authData.
fn do_auth(
    dev: &mut impl Device,
    rp_id: &str,
    client_data_hash: &[u8],
    key_handle: &[u8],
    timing: PollTiming,
) -> Result<crate::response::AuthReply, Error> {
    if client_data_hash.len() != SHA256_LEN || key_handle.len() > u8::MAX as usize {
        return Err(Error::InvalidArgument("do_auth: bad argument"));
    }

    let hash = rp_id_hash(rp_id);
    let mut request = Apdu::new(
        apdu::INS_AUTHENTICATE,
        apdu::P1_SIGN,
        2 * SHA256_LEN + 1 + key_handle.len(),
    );
    request.add(client_data_hash)?;
    request.add(&hash)?;
    request.add(&[key_handle.len() as u8])?;
    request.add(key_handle)?;
    let apdu = request.into_bytes();

    let mut reply = [0u8; 128];
    let n = poll::poll(dev, CMD, &apdu, &mut reply, timing)?;

    parse_auth_reply(rp_id, &reply[..n])
}

/// Translates a make-credential request into a U2F REGISTER exchange.
///
/// Validates preconditions without touching the device (algorithm must be
/// ES256, client-data-hash must be 32 bytes, resident keys and user
/// verification are unsupported), walks the exclude list, then performs the
/// registration and populates `cred`.
pub fn u2f_register(
    dev: &mut impl Device,
    req: &CredentialRequest,
    cred: &mut Credential,
    timing: PollTiming,
) -> Result<(), Error> {
    if req.resident_key || req.user_verification {
        log::debug!(
            "u2f_register: rk={}, uv={}",
            req.resident_key,
            req.user_verification
        );
        return Err(Error::UnsupportedOption(
            "resident keys and user verification are not supported by U2F",
        ));
    }

    if req.algorithm != Algorithm::Es256 || req.client_data_hash.len() != SHA256_LEN {
        log::debug!(
            "u2f_register: algorithm={:?}, cdh_len={}",
            req.algorithm,
            req.client_data_hash.len()
        );
        return Err(Error::InvalidArgument(
            "algorithm must be ES256 and client-data-hash must be 32 bytes",
        ));
    }

    for excluded in &req.exclude_list {
        if key_lookup(dev, &req.rp_id, excluded, timing)? {
            log::debug!("u2f_register: exclude-list hit, forcing dummy touch");
            send_dummy_register(dev, timing)?;
            return Err(Error::CredentialExcluded);
        }
    }

    let hash = rp_id_hash(&req.rp_id);
    let mut request = Apdu::new(apdu::INS_REGISTER, 0, 2 * SHA256_LEN);
    request.add(&req.client_data_hash)?;
    request.add(&hash)?;
    let apdu = request.into_bytes();

    let mut reply = [0u8; 2048];
    let n = poll::poll(dev, CMD, &apdu, &mut reply, timing)?;

    let parsed = parse_register_reply(&req.rp_id, &reply[..n])?;
    cred.set_fmt("fido-u2f");
    cred.set_authdata(parsed.authdata);
    cred.set_x509(parsed.x5c);
    cred.set_sig(parsed.sig);

    Ok(())
}

/// Attempts to authenticate a single allow-list entry, returning `Ok(Some(..))`
/// on success, `Ok(None)` if the entry should be silently skipped (absent
/// from the device, or present but not allowed to sign without presence),
/// and `Err` for anything else.
fn authenticate_single(
    dev: &mut impl Device,
    req: &AssertionRequest,
    key_handle: &[u8],
    timing: PollTiming,
) -> Result<Result<crate::response::AuthReply, Skip>, Error> {
    if !key_lookup(dev, &req.rp_id, key_handle, timing)? {
        log::debug!("authenticate_single: not found");
        return Ok(Err(Skip::NotFound));
    }

    if !req.user_presence {
        log::debug!("authenticate_single: checking for key existence only");
        return Ok(Err(Skip::PresenceRequired));
    }

    let reply = do_auth(
        dev,
        &req.rp_id,
        &req.client_data_hash,
        key_handle,
        timing,
    )?;
    Ok(Ok(reply))
}

/// Translates a get-assertion request into one U2F AUTHENTICATE exchange per
/// allow-list entry that is both present on the device and eligible to sign
/// (requires `user_presence = true`; U2F has no separate user-verification
/// capability so `user_verification = true` is rejected outright).
pub fn u2f_authenticate(
    dev: &mut impl Device,
    req: &AssertionRequest,
    assertion: &mut Assertion,
    timing: PollTiming,
) -> Result<(), Error> {
    if req.user_verification {
        log::debug!("u2f_authenticate: uv={}", req.user_verification);
        return Err(Error::UnsupportedOption(
            "user verification is not supported by U2F",
        ));
    }

    assertion.set_count(req.allow_list.len());

    let mut nauth_ok = 0;
    for key_handle in &req.allow_list {
        match authenticate_single(dev, req, key_handle, timing)? {
            Ok(reply) => {
                let stmt = assertion.statement_mut(nauth_ok);
                stmt.set_id(key_handle.clone());
                stmt.set_authdata(reply.authdata);
                stmt.set_sig(reply.sig);
                nauth_ok += 1;
            }
            Err(Skip::NotFound) | Err(Skip::PresenceRequired) => {
                // ignore credentials that don't exist, or that exist but
                // cannot be signed with under this request's policy
            }
        }
    }

    assertion.set_stmt_len(nauth_ok);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;

    fn cdh() -> Vec<u8> {
        vec![0x11u8; 32]
    }

    fn register_req(exclude_list: Vec<Vec<u8>>) -> CredentialRequest {
        CredentialRequest {
            rp_id: "example.com".into(),
            client_data_hash: cdh(),
            algorithm: Algorithm::Es256,
            exclude_list,
            resident_key: false,
            user_verification: false,
        }
    }

    #[test]
    fn rejects_non_es256_without_device_io() {
        let mut dev = MockDevice::default();
        let mut req = register_req(vec![]);
        req.algorithm = Algorithm::Rs256;
        let mut cred = Credential::new();
        let err = u2f_register(&mut dev, &req, &mut cred, PollTiming::BLOCKING).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(dev.sent.is_empty());
    }

    #[test]
    fn rejects_resident_key_without_device_io() {
        let mut dev = MockDevice::default();
        let mut req = register_req(vec![]);
        req.resident_key = true;
        let mut cred = Credential::new();
        let err = u2f_register(&mut dev, &req, &mut cred, PollTiming::BLOCKING).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOption(_)));
        assert!(dev.sent.is_empty());
    }

    #[test]
    fn exclude_list_hit_sends_check_then_dummy_register() {
        let mut dev = MockDevice::with_replies(vec![
            vec![0x69, 0x85], // key_lookup: conditions not satisfied -> found
            vec![0x69, 0x85], // dummy register: still waiting
            vec![0x90, 0x00], // dummy register: done
        ]);
        let req = register_req(vec![vec![0xAAu8; 16]]);
        let mut cred = Credential::new();
        let err = u2f_register(&mut dev, &req, &mut cred, PollTiming::from_ms(1)).unwrap_err();
        assert!(matches!(err, Error::CredentialExcluded));

        assert_eq!(dev.sent.len(), 3);
        // first APDU is the CHECK-ONLY lookup: challenge is all-0xFF
        assert_eq!(&dev.sent[0][7..39], &[0xFFu8; 32][..]);
        // second+third are the dummy REGISTER: challenge and application
        // are both all-0xFF
        assert_eq!(&dev.sent[1][7..39], &[0xFFu8; 32][..]);
        assert_eq!(&dev.sent[1][39..71], &[0xFFu8; 32][..]);
    }

    #[test]
    fn registration_happy_path_populates_credential() {
        let cert = include_bytes!("../tests/data/sample-cert.der");
        let sig = vec![0xABu8; 70];
        let kh = vec![0xCDu8; 0x40];

        let mut point = vec![0x04u8];
        point.extend((0..32).map(|i| i as u8));
        point.extend((32..64).map(|i| i as u8));

        let mut reply = vec![0x05u8];
        reply.extend_from_slice(&point);
        reply.push(kh.len() as u8);
        reply.extend_from_slice(&kh);
        reply.extend_from_slice(cert);
        reply.extend_from_slice(&sig);
        reply.extend_from_slice(&[0x90, 0x00]);

        let mut dev = MockDevice::with_replies(vec![reply]);
        let req = register_req(vec![]);
        let mut cred = Credential::new();
        u2f_register(&mut dev, &req, &mut cred, PollTiming::from_ms(1)).unwrap();

        assert_eq!(cred.fmt(), "fido-u2f");
        assert_eq!(cred.x5c().len(), cert.len());
        assert_eq!(cred.sig(), sig.as_slice());
        assert_eq!(cred.authdata().len(), 37 + 18 + 64 + 77 + 2 /* cbor bstr header */);
    }

    fn auth_req(allow_list: Vec<Vec<u8>>, user_presence: bool) -> AssertionRequest {
        AssertionRequest {
            rp_id: "example.com".into(),
            client_data_hash: cdh(),
            allow_list,
            user_presence,
            user_verification: false,
        }
    }

    #[test]
    fn mixed_allow_list_only_records_present_entries() {
        // A: absent, B: present, C: absent
        let mut auth_reply_b = vec![0x01u8]; // flags
        auth_reply_b.extend_from_slice(&[0, 0, 0, 1]); // sigcount
        auth_reply_b.extend_from_slice(&[0xEFu8; 70]); // signature
        auth_reply_b.extend_from_slice(&[0x90, 0x00]);

        let mut dev = MockDevice::with_replies(vec![
            vec![0x6A, 0x80], // key_lookup(A): wrong data -> absent
            vec![0x69, 0x85], // key_lookup(B): conditions not satisfied -> present
            auth_reply_b,     // do_auth(B)
            vec![0x6A, 0x80], // key_lookup(C): wrong data -> absent
        ]);

        let req = auth_req(vec![vec![1], vec![2], vec![3]], true);
        let mut assertion = Assertion::new();
        u2f_authenticate(&mut dev, &req, &mut assertion, PollTiming::from_ms(1)).unwrap();

        assert_eq!(assertion.statements().len(), 1);
        assert_eq!(assertion.statements()[0].id(), &[2]);
    }

    #[test]
    fn user_presence_not_required_skips_present_entries() {
        let mut dev = MockDevice::with_replies(vec![vec![0x69, 0x85]]);
        let req = auth_req(vec![vec![9]], false);
        let mut assertion = Assertion::new();
        u2f_authenticate(&mut dev, &req, &mut assertion, PollTiming::from_ms(1)).unwrap();
        assert_eq!(assertion.statements().len(), 0);
    }
}
