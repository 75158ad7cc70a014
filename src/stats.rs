//! Bus diagnostics counters.
//!
//! The protocol has no error/status API on the hot path: frame failures are
//! handled on the bus itself (resend request) and queue pressure drops
//! bytes silently. These counters are the observation channel: the
//! controller accumulates them and the application reads a snapshot through
//! the same critical section it uses for the queue.

use crate::frame::FrameError;

/// Counters accumulated by the controller. Snapshot by value via
/// [`crate::Ps2Host::stats`]; counters saturate rather than wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Frames validated and enqueued (or dropped on a full queue).
    pub bytes_received: u32,

    /// Write frames completed through the ack bit.
    pub bytes_sent: u32,

    /// Received frames with a high start bit.
    pub bad_start: u32,

    /// Received frames whose data + parity count came out even.
    pub bad_parity: u32,

    /// Received frames with a low stop bit.
    pub bad_stop: u32,

    /// Resend requests (0xFE) issued for invalid frames.
    pub resend_requests: u32,

    /// Validated bytes dropped because the queue was full.
    pub queue_drops: u32,

    /// Write frames the device did not acknowledge.
    pub write_nacks: u32,

    /// Partial frames abandoned after a stale inter-edge gap.
    pub stale_resyncs: u32,
}

impl BusStats {
    pub const fn new() -> Self {
        Self {
            bytes_received: 0,
            bytes_sent: 0,
            bad_start: 0,
            bad_parity: 0,
            bad_stop: 0,
            resend_requests: 0,
            queue_drops: 0,
            write_nacks: 0,
            stale_resyncs: 0,
        }
    }

    /// Total received frames that failed validation.
    pub fn frame_errors(&self) -> u32 {
        self.bad_start
            .saturating_add(self.bad_parity)
            .saturating_add(self.bad_stop)
    }

    pub(crate) fn record_frame_error(&mut self, err: FrameError) {
        let counter = match err {
            FrameError::BadStart => &mut self.bad_start,
            FrameError::BadParity => &mut self.bad_parity,
            FrameError::BadStop => &mut self.bad_stop,
        };
        *counter = counter.saturating_add(1);
    }
}
