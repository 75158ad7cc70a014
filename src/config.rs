//! Driver configuration and protocol timing constants.
//!
//! The timing sequencer counts in fixed ticks; everything here is expressed
//! either in ticks of [`TICK_PERIOD_US`] or in microseconds.

/// Timing sequencer period in microseconds.
pub const TICK_PERIOD_US: u64 = 20;

/// Ticks the clock is held low to claim the bus before the write start bit.
///
/// The device must see the clock inhibited for at least 100 µs before it
/// gives up the bus; 11 ticks of 20 µs clears that with margin.
pub const WRITE_REQUEST_TICKS: u16 = 11;

/// Ticks the bus is held after the ack bit before returning to receive.
pub const WRITE_SETTLE_TICKS: u16 = 4;

/// Inter-edge gap in microseconds after which a partial frame is abandoned
/// and the next edge is treated as a fresh start bit.
pub const FRAME_STALE_US: i64 = 100_000;

/// Byte sent to the device when a received frame fails validation.
pub const RESEND_REQUEST: u8 = 0xFE;

/// Default scan code queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Driver configuration: pin selection plus the tunable tick counts.
///
/// The defaults reproduce the standard bus timing; the tick counts only
/// need adjusting when the sequencer runs at a period other than
/// [`TICK_PERIOD_US`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ps2Config {
    /// GPIO number of the data line.
    pub data_pin: i32,

    /// GPIO number of the clock line. Must be interrupt-capable.
    pub clock_pin: i32,

    /// Length of the write-request (bus claim) phase in ticks.
    pub write_request_ticks: u16,

    /// Length of the post-write settle phase in ticks.
    pub write_settle_ticks: u16,

    /// Staleness budget between consecutive clock edges in microseconds.
    pub frame_stale_us: i64,
}

impl Default for Ps2Config {
    fn default() -> Self {
        Self {
            data_pin: 4,
            clock_pin: 5,
            write_request_ticks: WRITE_REQUEST_TICKS,
            write_settle_ticks: WRITE_SETTLE_TICKS,
            frame_stale_us: FRAME_STALE_US,
        }
    }
}

impl Ps2Config {
    /// Default timing on the given pin pair.
    pub fn with_pins(data_pin: i32, clock_pin: i32) -> Self {
        Self {
            data_pin,
            clock_pin,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = Ps2Config::default();
        assert_eq!(config.write_request_ticks, 11);
        assert_eq!(config.write_settle_ticks, 4);
        assert_eq!(config.frame_stale_us, 100_000);
    }

    #[test]
    fn test_with_pins_keeps_timing() {
        let config = Ps2Config::with_pins(18, 19);
        assert_eq!(config.data_pin, 18);
        assert_eq!(config.clock_pin, 19);
        assert_eq!(config.write_request_ticks, WRITE_REQUEST_TICKS);
    }

    #[test]
    fn test_request_phase_covers_minimum_inhibit() {
        // The device needs >= 100 µs of inhibited clock before a write.
        let held_us = (WRITE_REQUEST_TICKS as u64 - 1) * TICK_PERIOD_US;
        assert!(held_us >= 100);
    }
}
