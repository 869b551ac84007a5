//! Zero-on-drop wrapper for call-scoped sensitive buffers
//!
//! Every intermediate buffer the response parser and authdata synthesizer
//! build out of key handles, public keys, or signatures before repackaging
//! them is held in [`Secret`] rather than a bare `Vec<u8>`, so it is
//! overwritten with zeros the moment it goes out of scope instead of being
//! merely freed. This is a small hand-rolled stand-in for the `zeroize`
//! crate, kept in-house rather than adding a dependency for one type.

use std::ops::Deref;

pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: Vec<u8>) -> Secret {
        Secret(bytes)
    }
}

impl Deref for Secret {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

fn zero(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        *byte = 0;
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        zero(&mut self.0);
    }
}
