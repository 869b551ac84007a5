//! Error taxonomy for the U2F-over-CTAPHID core

use std::fmt;

/// All errors that can be returned from this crate's public entry points.
///
/// Every orchestrator (`u2f_register`, `u2f_authenticate`) and every helper it
/// calls returns one of these. The variants mirror the five error kinds used by
/// the reference U2F implementation (invalid argument, unsupported option,
/// transport, protocol, internal), plus `CredentialExcluded`, which is a normal
/// control-flow outcome rather than a defect.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A precondition was violated before any device I/O was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The caller asked for a capability U2F authenticators cannot provide
    /// (resident keys, user verification).
    #[error("unsupported option: {0}")]
    UnsupportedOption(&'static str),

    /// `Device::tx` failed.
    #[error("transport send failed: {0}")]
    Send(String),

    /// `Device::rx` failed, or returned fewer bytes than required.
    #[error("transport receive failed: {0}")]
    Receive(String),

    /// The device replied with something that does not parse as a valid U2F
    /// response: an unexpected status word, a wrong reserved byte, a
    /// certificate that fails to parse, or a reply shorter than required.
    #[error("protocol error: {0}")]
    Protocol(&'static str),

    /// Something on our side failed that should not be able to fail:
    /// hashing, CBOR encoding, or a holder setter rejecting valid input.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// The credential id was already registered to this authenticator.
    ///
    /// Only ever produced by `u2f_register`'s exclude-list check, after the
    /// dummy touch-forcing REGISTER has completed.
    #[error("credential excluded")]
    CredentialExcluded,
}

impl Error {
    pub(crate) fn send<E: fmt::Display>(e: E) -> Error {
        Error::Send(e.to_string())
    }

    pub(crate) fn recv<E: fmt::Display>(e: E) -> Error {
        Error::Receive(e.to_string())
    }
}

/// Internal sentinel distinguishing "skip this allow-list entry" from the
/// public [`Error::CredentialExcluded`] outcome. The reference implementation
/// reuses `FIDO_ERR_CREDENTIAL_EXCLUDED` for both a missing allow-list entry
/// and a user-presence-required refusal; this type keeps those cases from
/// ever being confused with the exclude-list-hit error a caller of
/// `u2f_register` actually needs to match on.
pub(crate) enum Skip {
    /// `key_lookup` reported the id does not exist on this device.
    NotFound,
    /// The id exists but `up = false`, so it cannot be signed with.
    PresenceRequired,
}
