//! The bus controller: all mutable protocol state in one owned object.
//!
//! [`Ps2Host`] is driven from two interrupt paths, [`Ps2Host::on_clock_edge`]
//! for every falling clock edge and [`Ps2Host::on_tick`] for the fixed-period
//! timing sequencer, and from application context through
//! [`Ps2Host::send`], [`Ps2Host::try_read`] and [`Ps2Host::inhibit_for`].
//!
//! Execution model: the two interrupt entry points never run concurrently
//! (handlers do not nest on this class of hardware); application calls must
//! hold the platform's interrupt-suspension critical section. Every entry
//! point completes in bounded time, with no waits and no allocation.
//!
//! # Write sequencing
//!
//! The device owns the clock, so a host write is a three-phase negotiation
//! run off the periodic tick:
//!
//! 1. **request**: hold the clock low for [`Ps2Config::write_request_ticks`]
//!    ticks so the device abandons any transmission, then put the start bit
//!    on the data line and release the clock;
//! 2. **transmit**: the device clocks again; the encoder emits one bit per
//!    falling edge and samples the ack on the final edge;
//! 3. **settle**: hold the clock low for [`Ps2Config::write_settle_ticks`]
//!    ticks, then release it and re-arm the decoder.

use crate::config::{Ps2Config, RESEND_REQUEST};
use crate::frame::{BusRole, ReadFrame, ReadOutcome, WriteFrame, WriteStep};
use crate::line::LineControl;
use crate::queue::ScanQueue;
use crate::stats::BusStats;

/// Host-side controller for one keyboard bus.
///
/// Owns the line capability, both frame accumulators, the countdown
/// counters and the scan code queue. Application code never reaches into
/// the internals; it holds a handle and calls the entry points.
pub struct Ps2Host<L: LineControl, const N: usize = { crate::config::DEFAULT_QUEUE_CAPACITY }> {
    lines: L,

    role: BusRole,
    read_frame: ReadFrame,
    write_frame: WriteFrame,
    queue: ScanQueue<N>,

    // Countdown phases; at most one is nonzero at a time.
    inhibit_ticks: u16,
    write_ticks: u16,
    settle_ticks: u16,

    pending_write: u8,
    last_edge_us: i64,

    write_request_ticks: u16,
    write_settle_ticks: u16,
    frame_stale_us: i64,

    stats: BusStats,
}

impl<L: LineControl, const N: usize> Ps2Host<L, N> {
    /// Controller with default timing over the given lines.
    pub fn new(lines: L) -> Self {
        Self::with_config(lines, &Ps2Config::default())
    }

    /// Controller with explicit timing. Pin selection in `config` is the
    /// HAL's concern; only the tick counts and the staleness budget apply
    /// here.
    pub fn with_config(lines: L, config: &Ps2Config) -> Self {
        Self {
            lines,
            role: BusRole::Receiving,
            read_frame: ReadFrame::new(),
            write_frame: WriteFrame::new(),
            queue: ScanQueue::new(),
            inhibit_ticks: 0,
            write_ticks: 0,
            settle_ticks: 0,
            pending_write: 0,
            last_edge_us: 0,
            write_request_ticks: config.write_request_ticks,
            write_settle_ticks: config.write_settle_ticks,
            frame_stale_us: config.frame_stale_us,
            stats: BusStats::new(),
        }
    }

    /// Reset to the idle receive state: clears the queue, releases both
    /// lines and arms the decoder. Safe to call again after construction;
    /// the periodic timer is configured separately (and idempotently) by
    /// the HAL.
    pub fn init(&mut self) {
        self.queue.clear();
        self.read_frame.reset();
        self.inhibit_ticks = 0;
        self.write_ticks = 0;
        self.settle_ticks = 0;
        self.lines.release_data();
        self.lines.release_clock();
        self.role = BusRole::Receiving;
    }

    /// Single dispatch entry point for the falling clock edge.
    ///
    /// `now_us` is a monotonic microsecond timestamp used for the
    /// staleness guard. Which engine (if any) handles the edge is decided
    /// by the role tag, so no interrupt re-registration ever happens.
    pub fn on_clock_edge(&mut self, now_us: i64) {
        match self.role {
            BusRole::Receiving => self.decode_bit(now_us),
            BusRole::Transmitting => self.encode_bit(),
            // Bus is claimed or draining: a stray edge is ignored.
            BusRole::Idle | BusRole::Settling => {}
        }
    }

    fn decode_bit(&mut self, now_us: i64) {
        // A long gap means the device restarted or the line glitched;
        // whatever partial frame we hold is garbage.
        if self.read_frame.bit_pos() != 0
            && now_us.wrapping_sub(self.last_edge_us) > self.frame_stale_us
        {
            self.read_frame.reset();
            self.stats.stale_resyncs = self.stats.stale_resyncs.saturating_add(1);
        }
        self.last_edge_us = now_us;

        match self.read_frame.push_bit(self.lines.data_high()) {
            Some(ReadOutcome::Byte(byte)) => {
                self.stats.bytes_received = self.stats.bytes_received.saturating_add(1);
                if !self.queue.put(byte) {
                    self.stats.queue_drops = self.stats.queue_drops.saturating_add(1);
                }
            }
            Some(ReadOutcome::Invalid(err)) => {
                self.stats.record_frame_error(err);
                self.stats.resend_requests = self.stats.resend_requests.saturating_add(1);
                self.send(RESEND_REQUEST);
            }
            None => {}
        }
    }

    fn encode_bit(&mut self) {
        match self.write_frame.step() {
            Some(WriteStep::EmitBit(high)) => {
                if high {
                    self.lines.release_data();
                } else {
                    self.lines.drive_data_low();
                }
            }
            Some(WriteStep::ReleaseForStop) => {
                self.lines.release_data();
            }
            Some(WriteStep::SampleAck) => {
                // Low means acknowledged. A nack is recorded, not escalated;
                // the bus goes through settle and back to receive either way.
                if self.lines.data_high() {
                    self.stats.write_nacks = self.stats.write_nacks.saturating_add(1);
                }
                self.stats.bytes_sent = self.stats.bytes_sent.saturating_add(1);
                self.settle_ticks = self.write_settle_ticks;
                self.role = BusRole::Settling;
                self.lines.drive_clock_low();
            }
            None => {}
        }
    }

    /// Timing sequencer, invoked at the fixed tick period.
    ///
    /// Runs whichever countdown phase is active (request before settle, so
    /// a send issued mid-settle restarts cleanly) and is a no-op when none
    /// is.
    pub fn on_tick(&mut self) {
        if self.inhibit_ticks > 0 {
            self.inhibit_ticks -= 1;
            if self.inhibit_ticks > 0 {
                if self.lines.clock_high() {
                    self.lines.drive_clock_low();
                }
            } else {
                self.lines.release_clock();
                self.role = if self.write_ticks > 0 {
                    BusRole::Idle
                } else {
                    BusRole::Receiving
                };
            }
        } else if self.write_ticks > 0 {
            self.write_ticks -= 1;
            if self.write_ticks > 0 {
                if self.lines.clock_high() {
                    self.lines.drive_clock_low();
                }
            } else {
                // Bus claimed: put the start bit on the line, arm the
                // encoder, and give the clock back to the device.
                self.lines.drive_data_low();
                self.read_frame.reset();
                self.write_frame.load(self.pending_write);
                self.role = BusRole::Transmitting;
                self.lines.release_clock();
            }
        } else if self.settle_ticks > 0 {
            self.settle_ticks -= 1;
            if self.settle_ticks > 0 {
                if self.lines.clock_high() {
                    self.lines.drive_clock_low();
                }
            } else {
                self.role = BusRole::Receiving;
                self.lines.release_clock();
            }
        }
    }

    /// Request transmission of `byte` to the device.
    ///
    /// Captures the byte and arms the write-request countdown; there is no
    /// success feedback channel (a missing ack only shows up in
    /// [`BusStats::write_nacks`]). A request issued while a previous write
    /// is still in flight silently overwrites the pending byte and restarts
    /// the countdown.
    pub fn send(&mut self, byte: u8) {
        self.pending_write = byte;
        self.write_ticks = self.write_request_ticks;
        self.role = BusRole::Idle;
    }

    /// Hold the clock low for `ticks` sequencer periods, forcing the
    /// device to buffer instead of send. The line is released when the
    /// countdown expires. Ignored mid-write.
    pub fn inhibit_for(&mut self, ticks: u16) {
        if ticks == 0 || self.role == BusRole::Transmitting {
            return;
        }
        self.inhibit_ticks = ticks;
        if self.role == BusRole::Receiving {
            self.role = BusRole::Idle;
        }
    }

    /// Dequeue the oldest captured byte, or `None` when the queue is
    /// empty. Non-blocking; the caller must hold the interrupt-suspension
    /// critical section for the duration of the call.
    pub fn try_read(&mut self) -> Option<u8> {
        self.queue.pop()
    }

    /// Diagnostics snapshot.
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Currently armed role. Mostly useful for diagnostics and tests.
    pub fn role(&self) -> BusRole {
        self.role
    }

    /// Bytes waiting in the queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}
