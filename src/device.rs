//! Device transport contract
//!
//! The CTAPHID framing layer (command/length framing over HID reports) is an
//! external collaborator: this crate only needs to send a framed U2F message
//! and receive the framed reply. That contract is captured as the [`Device`]
//! trait so orchestrators can be written and tested without real hardware.

use crate::error::Error;

/// CTAPHID command byte for an encapsulated U2F/CTAP1 message.
///
/// The reference implementation ORs `CTAP_FRAME_INIT` into this value before
/// calling `tx`/`rx`; callers of this crate's `Device` impls are expected to
/// do the equivalent framing themselves, so this constant is the raw CTAPHID
/// "MSG" command.
pub const CTAPHID_MSG: u8 = 0x03;

/// CTAPHID command byte used during device initialization (channel
/// allocation). Not used by the orchestrators in this crate, but part of the
/// transport's vocabulary.
pub const CTAPHID_INIT: u8 = 0x06;

/// A single, non-shareable handle to a U2F authenticator.
///
/// All operations on a `Device` are sequential: the caller must not invoke
/// `tx`/`rx` concurrently on the same handle, which is why every orchestrator
/// in this crate takes `&mut impl Device` rather than `&impl Device`.
pub trait Device {
    /// Transmits a framed command. Returns once the authenticator has
    /// accepted the request; does not wait for a reply.
    fn tx(&mut self, cmd: u8, data: &[u8]) -> Result<(), Error>;

    /// Waits up to `timeout_ms` milliseconds for a reply to a previously
    /// transmitted command, writing it into `buf`. Returns the number of
    /// bytes written. `timeout_ms = -1` means "wait indefinitely".
    fn rx(&mut self, cmd: u8, buf: &mut [u8], timeout_ms: i32) -> Result<usize, Error>;
}

/// ISO-7816 status words this crate interprets directly.
pub mod sw {
    /// `0x9000` — command completed successfully.
    pub const NO_ERROR: u16 = 0x9000;
    /// `0x6985` — the user has not yet satisfied the test-of-user-presence
    /// gate (i.e. "touch the key"). The poll loop retries on this word.
    pub const CONDITIONS_NOT_SATISFIED: u16 = 0x6985;
    /// `0x6A80` — the key handle presented does not belong to this
    /// authenticator.
    pub const WRONG_DATA: u16 = 0x6A80;
}

/// Reads the final two bytes of `reply` as a big-endian status word.
///
/// Returns `None` if `reply` is shorter than 2 bytes.
pub(crate) fn status_word(reply: &[u8]) -> Option<u16> {
    if reply.len() < 2 {
        return None;
    }
    let n = reply.len();
    Some(u16::from_be_bytes([reply[n - 2], reply[n - 1]]))
}
