//! Timing configuration for the device-polling loop
//!
//! Plays the same role for the poll loop that the teacher crate's
//! `WebAuthnConfig` plays for relying-party id/origin: a small, explicit,
//! constructible-with-defaults settings object instead of magic numbers
//! scattered through the orchestrators.

/// How long the poll loop waits for a reply, and how it paces retries.
#[derive(Clone, Copy, Debug)]
pub struct PollTiming {
    timeout_ms: i32,
}

impl PollTiming {
    /// Block indefinitely, pacing retries at 100ms, matching the reference's
    /// `ms == -1` convention.
    pub const BLOCKING: PollTiming = PollTiming { timeout_ms: -1 };

    /// Waits up to `timeout_ms` for each reply; retries are paced at the same
    /// interval. A negative value means "block indefinitely".
    pub fn from_ms(timeout_ms: i32) -> PollTiming {
        PollTiming { timeout_ms }
    }

    /// The timeout to hand to [`crate::device::Device::rx`].
    pub fn rx_timeout_ms(&self) -> i32 {
        self.timeout_ms
    }

    /// The delay between successive poll attempts: the caller-supplied
    /// timeout, or 100ms when blocking indefinitely.
    pub fn retry_delay_ms(&self) -> u64 {
        if self.timeout_ms == -1 {
            100
        } else {
            self.timeout_ms as u64
        }
    }
}

impl Default for PollTiming {
    fn default() -> PollTiming {
        PollTiming::BLOCKING
    }
}
