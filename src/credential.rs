//! Credential request/response holders
//!
//! `CredentialRequest` carries the inputs to [`crate::u2f::u2f_register`];
//! `Credential` is the output holder it populates via the setters named in
//! the external interface (`set_fmt`, `set_authdata`, `set_x509`, `set_sig`).

/// The only signature algorithm a U2F authenticator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Es256,
    Rs256,
}

/// Inputs to a make-credential (registration) call.
pub struct CredentialRequest {
    pub rp_id: String,
    pub client_data_hash: Vec<u8>,
    pub algorithm: Algorithm,
    pub exclude_list: Vec<Vec<u8>>,
    pub resident_key: bool,
    pub user_verification: bool,
}

/// The populated result of a successful registration.
///
/// Every field starts empty; [`u2f_register`](crate::u2f::u2f_register) fills
/// them in exactly once, on success, via the setters below.
#[derive(Default, Debug)]
pub struct Credential {
    fmt: String,
    authdata: Vec<u8>,
    x5c: Vec<u8>,
    sig: Vec<u8>,
}

impl Credential {
    pub fn new() -> Credential {
        Credential::default()
    }

    pub fn set_fmt(&mut self, fmt: &str) {
        self.fmt = fmt.to_owned();
    }

    pub fn set_authdata(&mut self, authdata: Vec<u8>) {
        self.authdata = authdata;
    }

    pub fn set_x509(&mut self, x5c: Vec<u8>) {
        self.x5c = x5c;
    }

    pub fn set_sig(&mut self, sig: Vec<u8>) {
        self.sig = sig;
    }

    pub fn fmt(&self) -> &str {
        &self.fmt
    }

    pub fn authdata(&self) -> &[u8] {
        &self.authdata
    }

    pub fn x5c(&self) -> &[u8] {
        &self.x5c
    }

    pub fn sig(&self) -> &[u8] {
        &self.sig
    }
}
