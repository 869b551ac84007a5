//! ISO-7816 APDU construction
//!
//! U2F speaks short APDUs framed with an extended (3-byte) length field, the
//! encoding CTAPHID transports commonly use. The builder here owns a single
//! growable buffer; callers declare a payload capacity up front and append to
//! it, the same shape as the reference implementation's `iso7816_new` /
//! `iso7816_add`.

use crate::error::Error;

/// U2F instruction byte: REGISTER.
pub const INS_REGISTER: u8 = 0x01;
/// U2F instruction byte: AUTHENTICATE.
pub const INS_AUTHENTICATE: u8 = 0x02;

/// AUTHENTICATE P1: check whether a key handle belongs to this device,
/// without requiring a touch.
pub const P1_CHECK_ONLY: u8 = 0x07;
/// AUTHENTICATE P1: require user presence and sign.
pub const P1_SIGN: u8 = 0x03;

const HEADER_LEN: usize = 4;
const EXT_LEN_LEN: usize = 3;

/// A U2F command being assembled for transmission.
///
/// `Apdu::new` reserves `capacity` bytes for the body; [`Apdu::add`] appends
/// to it and fails if the declared capacity would be exceeded, mirroring the
/// reference's fixed-capacity `iso7816_apdu_t`.
pub struct Apdu {
    buf: Vec<u8>,
    capacity: usize,
}

impl Apdu {
    /// Begins a new APDU with the given instruction, P1, and declared
    /// payload capacity.
    pub fn new(ins: u8, p1: u8, capacity: usize) -> Apdu {
        let mut buf = Vec::with_capacity(HEADER_LEN + EXT_LEN_LEN + capacity);
        buf.push(0x00); // CLA
        buf.push(ins);
        buf.push(p1);
        buf.push(0x00); // P2
        buf.extend_from_slice(&[0x00, 0x00, 0x00]); // placeholder extended length
        Apdu { buf, capacity }
    }

    /// Appends `data` to the APDU's body.
    ///
    /// Fails with [`Error::Internal`] if the total body length would exceed
    /// the capacity declared in [`Apdu::new`].
    pub fn add(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.body_len() + data.len() > self.capacity {
            return Err(Error::Internal("apdu: capacity overflow"));
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn body_len(&self) -> usize {
        self.buf.len() - HEADER_LEN - EXT_LEN_LEN
    }

    /// Finalizes the extended length field and returns the wire encoding.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let len = self.body_len() as u16;
        let len_bytes = len.to_be_bytes();
        self.buf[HEADER_LEN + 1] = len_bytes[0];
        self.buf[HEADER_LEN + 2] = len_bytes[1];
        self.buf
    }
}
