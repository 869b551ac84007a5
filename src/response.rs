//! Parsing of raw U2F REGISTER and AUTHENTICATE replies
//!
//! Both replies are flat byte strings terminated by a 2-byte ISO-7816 status
//! word. Everything before that status word is read sequentially through
//! [`ByteReader`], the Rust stand-in for the reference's `buf_read` calls:
//! every read site shares the same underflow check instead of each hand-
//! rolling its own slice arithmetic.

use std::convert::TryInto;

use crate::authdata;
use crate::device::{self, sw};
use crate::error::Error;

/// A sequential cursor over a byte slice that fails instead of panicking on
/// underflow.
struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> ByteReader<'a> {
        ByteReader { buf }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.buf.len() < n {
            log::debug!("buf_read: underflow, want {}, have {}", n, self.buf.len());
            return Err(Error::Protocol("reply too short"));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn take_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    /// Consumes and returns everything left in the buffer.
    fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }
}

/// Result of parsing a U2F AUTHENTICATE reply.
#[derive(Debug)]
pub struct AuthReply {
    pub authdata: Vec<u8>,
    pub sig: Vec<u8>,
}

/// Result of parsing a U2F REGISTER reply.
#[derive(Debug)]
pub struct RegisterReply {
    pub authdata: Vec<u8>,
    pub x5c: Vec<u8>,
    pub sig: Vec<u8>,
}

fn strip_status_word(reply: &[u8]) -> Result<&[u8], Error> {
    match device::status_word(reply) {
        Some(sw::NO_ERROR) => Ok(&reply[..reply.len() - 2]),
        Some(other) => {
            log::debug!("unexpected status word {:#06x}", other);
            Err(Error::Protocol("unexpected status word"))
        }
        None => {
            log::debug!("reply shorter than a status word");
            Err(Error::Protocol("reply too short for a status word"))
        }
    }
}

/// Parses a raw AUTHENTICATE reply: `flags | sigcount | signature | SW`.
///
/// `rp_id` is needed to synthesize the authData header (§4.4); it is not
/// present in the wire reply itself.
pub fn parse_auth_reply(rp_id: &str, reply: &[u8]) -> Result<AuthReply, Error> {
    let body = strip_status_word(reply)?;
    let mut r = ByteReader::new(body);

    let flags = r.take_u8()?;
    let sigcount: [u8; 4] = r.take(4)?.try_into().expect("take(4) yields 4 bytes");
    let sig = r.take_rest().to_vec();

    let authdata = authdata::fake(rp_id, flags, sigcount)?;

    Ok(AuthReply { authdata, sig })
}

/// Parses a raw REGISTER reply:
/// `0x05 | pubkey(65) | kh_len(1) | kh | x5c(DER, length implied) | signature | SW`.
pub fn parse_register_reply(rp_id: &str, reply: &[u8]) -> Result<RegisterReply, Error> {
    let body = strip_status_word(reply)?;
    let mut r = ByteReader::new(body);

    let reserved = r.take_u8()?;
    if reserved != 0x05 {
        log::debug!("reserved byte: got {:#04x}, want 0x05", reserved);
        return Err(Error::Protocol("reserved byte mismatch"));
    }

    let pubkey = r.take(65)?;
    let kh_len = r.take_u8()? as usize;
    let key_handle = r.take(kh_len)?;

    let remaining = r.take_rest();
    let consumed = der_cert_len(remaining)?;
    if consumed == 0 || consumed >= remaining.len() {
        log::debug!(
            "x5c_get: consumed={}, remaining={}",
            consumed,
            remaining.len()
        );
        return Err(Error::Protocol("x509 certificate length discovery failed"));
    }
    let x5c = remaining[..consumed].to_vec();
    let sig = remaining[consumed..].to_vec();

    let authdata = authdata::encode_credential(rp_id, key_handle, pubkey)?;

    Ok(RegisterReply { authdata, x5c, sig })
}

/// Parses just enough of a DER-encoded X.509 certificate at the start of
/// `buf` to learn how many bytes it occupies; the certificate's contents are
/// never inspected further (signature verification is the caller's job).
fn der_cert_len(buf: &[u8]) -> Result<usize, Error> {
    use x509_parser::parse_x509_der;

    match parse_x509_der(buf) {
        Ok((rest, _cert)) => Ok(buf.len() - rest.len()),
        Err(e) => {
            log::debug!("d2i_X509: {:?}", e);
            Err(Error::Protocol("failed to parse x509 certificate"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cert_and_sig() -> (Vec<u8>, Vec<u8>) {
        // A minimal self-signed DER certificate, long enough that
        // `der_cert_len` has real work to do, followed by bytes that are
        // not part of the certificate (the signature).
        let raw = include_bytes!("../tests/data/sample-cert.der");
        let mut buf = raw.to_vec();
        let sig = vec![0xAB; 70];
        buf.extend_from_slice(&sig);
        (buf, sig)
    }

    fn sample_point() -> Vec<u8> {
        let mut p = vec![0x04u8];
        p.extend((0..32).map(|i| i as u8));
        p.extend((32..64).map(|i| i as u8));
        p
    }

    #[test]
    fn parses_well_formed_register_reply() {
        let (cert_and_sig, sig) = sample_cert_and_sig();
        let kh = vec![0xCDu8; 0x40];

        let mut reply = vec![0x05u8];
        reply.extend_from_slice(&sample_point());
        reply.push(kh.len() as u8);
        reply.extend_from_slice(&kh);
        reply.extend_from_slice(&cert_and_sig);
        reply.extend_from_slice(&[0x90, 0x00]);

        let parsed = parse_register_reply("example.com", &reply).unwrap();
        assert_eq!(parsed.sig, sig);
        assert_eq!(parsed.x5c.len(), cert_and_sig.len() - sig.len());
    }

    #[test]
    fn rejects_wrong_reserved_byte() {
        let mut reply = vec![0x04u8]; // should be 0x05
        reply.extend_from_slice(&sample_point());
        reply.push(0);
        reply.extend_from_slice(&[0x90, 0x00]);
        let err = parse_register_reply("example.com", &reply).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rejects_bad_status_word() {
        let reply = vec![0x05, 0x6A, 0x80];
        let err = parse_register_reply("example.com", &reply).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn parses_auth_reply() {
        let mut reply = vec![0x01u8]; // flags
        reply.extend_from_slice(&[0, 0, 0, 5]); // sigcount
        reply.extend_from_slice(&[0xEFu8; 70]); // signature
        reply.extend_from_slice(&[0x90, 0x00]);

        let parsed = parse_auth_reply("example.com", &reply).unwrap();
        assert_eq!(parsed.sig, vec![0xEFu8; 70]);
    }
}
