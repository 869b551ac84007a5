//! Device-polling retry loop
//!
//! Drives a single APDU to completion: transmit, receive, and retry while the
//! authenticator reports "conditions not satisfied" (the user has not yet
//! touched the key). Strictly sequential on one [`Device`] handle — see the
//! concurrency notes on that trait.

use std::thread;
use std::time::Duration;

use crate::device::{self, sw, Device};
use crate::error::Error;

/// Transmits `apdu` and waits for a reply, retrying on
/// `SW_CONDITIONS_NOT_SATISFIED` until some other status word (success or
/// error) comes back.
///
/// `reply_buf` must be large enough to hold the authenticator's largest
/// expected reply; this mirrors the reference's fixed-size stack buffers.
pub fn poll(
    dev: &mut impl Device,
    cmd: u8,
    apdu: &[u8],
    reply_buf: &mut [u8],
    timing: crate::config::PollTiming,
) -> Result<usize, Error> {
    loop {
        dev.tx(cmd, apdu).map_err(|e| {
            log::debug!("poll: tx failed: {}", e);
            Error::send(e)
        })?;

        let n = dev.rx(cmd, reply_buf, timing.rx_timeout_ms()).map_err(|e| {
            log::debug!("poll: rx failed: {}", e);
            Error::recv(e)
        })?;

        if n < 2 {
            log::debug!("poll: rx returned {} bytes, want >= 2", n);
            return Err(Error::Receive("short reply".into()));
        }

        if device::status_word(&reply_buf[..n]) == Some(sw::CONDITIONS_NOT_SATISFIED) {
            log::debug!("poll: conditions not satisfied, retrying");
            thread::sleep(Duration::from_millis(timing.retry_delay_ms()));
            continue;
        }

        return Ok(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollTiming;
    use crate::device::mock::MockDevice;

    #[test]
    fn retries_until_non_cns_reply() {
        let mut dev = MockDevice::with_replies(vec![
            vec![0x69, 0x85],
            vec![0x69, 0x85],
            vec![0x69, 0x85],
            vec![0x01, 0x02, 0x90, 0x00],
        ]);
        let mut buf = [0u8; 16];
        let n = poll(
            &mut dev,
            device::CTAPHID_MSG,
            b"apdu",
            &mut buf,
            PollTiming::from_ms(1),
        )
        .unwrap();
        assert_eq!(&buf[..n], &[0x01, 0x02, 0x90, 0x00]);
        assert_eq!(dev.rx_calls, 4);
        assert_eq!(dev.sent.len(), 4);
    }

    #[test]
    fn short_reply_is_a_receive_error() {
        let mut dev = MockDevice::with_replies(vec![vec![0x00]]);
        let mut buf = [0u8; 16];
        let err = poll(
            &mut dev,
            device::CTAPHID_MSG,
            b"apdu",
            &mut buf,
            PollTiming::from_ms(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Receive(_)));
    }
}
