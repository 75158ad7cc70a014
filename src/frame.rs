//! Frame-level data model: bus role and the per-direction bit accumulators.
//!
//! A frame is the 11-bit unit exchanged per byte: start bit (low), eight
//! data bits LSB-first, odd parity, stop bit (high). Host-to-device frames
//! carry a twelfth bit: the device pulls data low to acknowledge.
//!
//! Both accumulators are pure state machines with no hardware access. The
//! controller samples or drives the data line and feeds them one falling
//! clock edge at a time; they are fully testable on the host.

/// Which engine is armed on the next falling clock edge.
///
/// Exactly one role is active at a time. Transitions happen only in the
/// timing sequencer or at an explicit send request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusRole {
    /// Bus claimed by a countdown phase (inhibit or write request); clock
    /// edges are ignored.
    Idle,
    /// Decoder armed: device-to-host frames are being sampled.
    Receiving,
    /// Encoder armed: a host-to-device frame is being emitted.
    Transmitting,
    /// Post-write drain; clock edges are ignored until settle expires.
    Settling,
}

/// First validation failure observed in a received frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Start bit sampled high.
    BadStart,
    /// Data + parity bits did not come out odd.
    BadParity,
    /// Stop bit sampled low.
    BadStop,
}

impl FrameError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameError::BadStart => "start bit not low",
            FrameError::BadParity => "parity not odd",
            FrameError::BadStop => "stop bit not high",
        }
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the final bit of a receive frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Frame validated; carries the decoded byte.
    Byte(u8),
    /// Frame failed validation; carries the first failed check.
    Invalid(FrameError),
}

/// Receive-side accumulator.
///
/// Bit positions 0–10 map to start / data 0–7 / parity / stop. A bad start
/// bit marks the frame invalid but counting continues, so the accumulator
/// stays synchronized with the device's clock through the rest of the
/// frame.
#[derive(Clone, Copy, Debug)]
pub struct ReadFrame {
    bit_pos: u8,
    byte: u8,
    parity: bool,
    error: Option<FrameError>,
}

impl ReadFrame {
    pub const fn new() -> Self {
        Self {
            bit_pos: 0,
            byte: 0,
            parity: false,
            error: None,
        }
    }

    /// Abandon any partial frame; the next bit is treated as a start bit.
    pub fn reset(&mut self) {
        self.bit_pos = 0;
    }

    /// Current bit position, 0 meaning "waiting for a start bit".
    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    /// Feed the data-line level sampled at one falling clock edge.
    ///
    /// Returns `Some` when the frame completes (after the stop bit); the
    /// accumulator is then ready for the next start bit.
    pub fn push_bit(&mut self, high: bool) -> Option<ReadOutcome> {
        match self.bit_pos {
            0 => {
                self.byte = 0;
                self.parity = false;
                self.error = None;
                if high {
                    self.error = Some(FrameError::BadStart);
                }
            }
            1..=8 => {
                if high {
                    self.byte |= 1 << (self.bit_pos - 1);
                    self.parity = !self.parity;
                }
            }
            9 => {
                if high {
                    self.parity = !self.parity;
                }
                // Total one-count across data + parity must be odd.
                if !self.parity && self.error.is_none() {
                    self.error = Some(FrameError::BadParity);
                }
            }
            _ => {
                if !high && self.error.is_none() {
                    self.error = Some(FrameError::BadStop);
                }
            }
        }

        self.bit_pos += 1;
        if self.bit_pos > 10 {
            self.bit_pos = 0;
            Some(match self.error {
                None => ReadOutcome::Byte(self.byte),
                Some(err) => ReadOutcome::Invalid(err),
            })
        } else {
            None
        }
    }
}

impl Default for ReadFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Action the transmit engine takes on one falling clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStep {
    /// Put a bit on the data line: `true` releases high, `false` drives low.
    EmitBit(bool),
    /// Release the data line; the device asserts the final framing.
    ReleaseForStop,
    /// Sample the data line: the device acknowledges by pulling it low.
    SampleAck,
}

/// Transmit-side accumulator: consumes the pending byte bit by bit.
///
/// The start bit is not part of this sequence: the timing sequencer puts
/// it on the line when the write-request phase expires, before the device
/// starts clocking.
#[derive(Clone, Copy, Debug)]
pub struct WriteFrame {
    bit_pos: u8,
    byte: u8,
    parity: bool,
}

impl WriteFrame {
    pub const fn new() -> Self {
        Self {
            bit_pos: 0,
            byte: 0,
            parity: false,
        }
    }

    /// Load a byte and rewind to the first data bit.
    pub fn load(&mut self, byte: u8) {
        self.byte = byte;
        self.bit_pos = 0;
        self.parity = false;
    }

    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }

    /// Advance one falling edge.
    ///
    /// Returns the action for this bit position, or `None` once the frame
    /// (including the ack bit) has completed.
    pub fn step(&mut self) -> Option<WriteStep> {
        let step = match self.bit_pos {
            0..=7 => {
                let high = self.byte & 0x01 != 0;
                self.byte >>= 1;
                if high {
                    self.parity = !self.parity;
                }
                WriteStep::EmitBit(high)
            }
            // Emit the bit that makes the total one-count odd: drive low
            // when the data bits already toggled an odd number of times.
            8 => WriteStep::EmitBit(!self.parity),
            9 => WriteStep::ReleaseForStop,
            10 => WriteStep::SampleAck,
            _ => return None,
        };
        self.bit_pos += 1;
        Some(step)
    }
}

impl Default for WriteFrame {
    fn default() -> Self {
        Self::new()
    }
}
