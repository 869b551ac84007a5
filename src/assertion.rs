//! Assertion request/response holders
//!
//! `AssertionRequest` carries the inputs to
//! [`crate::u2f::u2f_authenticate`]; `Assertion` is the output holder,
//! pre-sized to the allow-list length and populated one statement at a time.

/// Inputs to a get-assertion (authentication) call.
pub struct AssertionRequest {
    pub rp_id: String,
    pub client_data_hash: Vec<u8>,
    pub allow_list: Vec<Vec<u8>>,
    pub user_presence: bool,
    pub user_verification: bool,
}

/// One populated assertion, corresponding to a single allow-list entry that
/// was found on the device and signed with.
#[derive(Default, Debug)]
pub struct AssertionStatement {
    id: Vec<u8>,
    authdata: Vec<u8>,
    sig: Vec<u8>,
}

impl AssertionStatement {
    pub fn set_id(&mut self, id: Vec<u8>) {
        self.id = id;
    }

    pub fn set_authdata(&mut self, authdata: Vec<u8>) {
        self.authdata = authdata;
    }

    pub fn set_sig(&mut self, sig: Vec<u8>) {
        self.sig = sig;
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    pub fn authdata(&self) -> &[u8] {
        &self.authdata
    }

    pub fn sig(&self) -> &[u8] {
        &self.sig
    }
}

/// The populated result of a get-assertion call: up to one
/// [`AssertionStatement`] per allow-list entry that both existed on the
/// device and was successfully signed with.
#[derive(Default, Debug)]
pub struct Assertion {
    stmt: Vec<AssertionStatement>,
    stmt_len: usize,
}

impl Assertion {
    pub fn new() -> Assertion {
        Assertion::default()
    }

    /// Pre-sizes the statement vector to `len` entries (the allow-list
    /// length), matching `fido_assert_set_count`.
    pub fn set_count(&mut self, len: usize) {
        self.stmt = (0..len).map(|_| AssertionStatement::default()).collect();
        self.stmt_len = 0;
    }

    /// The statement slot at `idx`, for the orchestrator to populate.
    pub fn statement_mut(&mut self, idx: usize) -> &mut AssertionStatement {
        &mut self.stmt[idx]
    }

    /// Sets the final count of populated statements (`nauth_ok`).
    pub fn set_stmt_len(&mut self, len: usize) {
        self.stmt_len = len;
    }

    /// The populated statements, i.e. `stmt[..stmt_len]`.
    pub fn statements(&self) -> &[AssertionStatement] {
        &self.stmt[..self.stmt_len]
    }
}
