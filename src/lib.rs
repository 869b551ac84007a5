//! U2F-over-CTAPHID compatibility core
//!
//! Translates WebAuthn make-credential/get-assertion calls into legacy U2F
//! APDUs and synthesizes the WebAuthn-shaped responses (`authData`, COSE
//! public keys) a bare U2F authenticator cannot produce on its own.
//!
//! The two entry points are [`u2f::u2f_register`] and
//! [`u2f::u2f_authenticate`]; everything else in this crate exists to support
//! them.

pub mod apdu;
pub mod assertion;
pub mod authdata;
pub mod config;
pub mod cose;
pub mod credential;
pub mod device;
pub mod error;
pub mod poll;
pub mod response;
mod secret;
pub mod u2f;

pub use assertion::{Assertion, AssertionRequest, AssertionStatement};
pub use config::PollTiming;
pub use credential::{Algorithm, Credential, CredentialRequest};
pub use device::Device;
pub use error::Error;
pub use u2f::{u2f_authenticate, u2f_register};
