//! COSE_Key support
//!
//! This crate only ever needs to *produce* a COSE_Key, never parse one (the
//! holder/caller side handles verification). `constants` carries the
//! RFC 8152 parameter identifiers; `key` builds the ES256 map from a raw EC
//! point.

pub mod constants;
pub mod key;

pub use key::encode_es256;
