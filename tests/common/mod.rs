//! Simulated bus and device shared by the integration tests.
//!
//! The two lines are wired-AND: either side can hold a line low, and the
//! level read by the controller reflects both. Falling clock edges are
//! delivered as direct `on_clock_edge` calls, so the device side only has
//! to manage the data line.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use ps2_host::{LineControl, Ps2Host};

/// Microseconds between consecutive clock edges (~12.5 kHz device clock).
pub const EDGE_GAP_US: i64 = 80;

#[derive(Default)]
struct Wire {
    host_data_low: bool,
    host_clock_low: bool,
    dev_data_low: bool,
}

/// Host-side view of the simulated lines; clones share the wire state.
#[derive(Clone, Default)]
pub struct SimLines(Rc<RefCell<Wire>>);

impl SimLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device side pulls (or releases) the data line.
    pub fn set_device_data(&self, low: bool) {
        self.0.borrow_mut().dev_data_low = low;
    }

    pub fn data_level(&self) -> bool {
        let wire = self.0.borrow();
        !(wire.host_data_low || wire.dev_data_low)
    }

    pub fn clock_level(&self) -> bool {
        !self.0.borrow().host_clock_low
    }

    pub fn host_holds_clock(&self) -> bool {
        self.0.borrow().host_clock_low
    }

    pub fn host_holds_data(&self) -> bool {
        self.0.borrow().host_data_low
    }
}

impl LineControl for SimLines {
    fn release_data(&mut self) {
        self.0.borrow_mut().host_data_low = false;
    }

    fn drive_data_low(&mut self) {
        self.0.borrow_mut().host_data_low = true;
    }

    fn release_clock(&mut self) {
        self.0.borrow_mut().host_clock_low = false;
    }

    fn drive_clock_low(&mut self) {
        self.0.borrow_mut().host_clock_low = true;
    }

    fn data_high(&self) -> bool {
        self.data_level()
    }

    fn clock_high(&self) -> bool {
        self.clock_level()
    }
}

/// Parity bit completing `byte` to an odd total one-count.
pub fn odd_parity_bit(byte: u8) -> bool {
    byte.count_ones() % 2 == 0
}

/// The 11 line levels of a device-to-host frame carrying `byte`.
pub fn frame_bits(byte: u8) -> [bool; 11] {
    let mut bits = [false; 11];
    for i in 0..8 {
        bits[1 + i] = byte & (1 << i) != 0;
    }
    bits[9] = odd_parity_bit(byte);
    bits[10] = true;
    bits
}

/// Clock one device-to-host frame into the controller, bit levels as
/// given. Returns the timestamp after the final edge.
pub fn clock_frame_in<const N: usize>(
    host: &mut Ps2Host<SimLines, N>,
    lines: &SimLines,
    bits: &[bool; 11],
    mut now_us: i64,
) -> i64 {
    for &bit in bits {
        lines.set_device_data(!bit);
        host.on_clock_edge(now_us);
        now_us += EDGE_GAP_US;
    }
    lines.set_device_data(false);
    now_us
}

/// Clock a correctly framed `byte` into the controller.
pub fn clock_byte_in<const N: usize>(
    host: &mut Ps2Host<SimLines, N>,
    lines: &SimLines,
    byte: u8,
    now_us: i64,
) -> i64 {
    clock_frame_in(host, lines, &frame_bits(byte), now_us)
}

/// What the device saw while clocking one host write off the line.
pub struct WriteCapture {
    /// Start bit observed on the line when the request phase expired.
    pub start_low: bool,
    /// The eight data bit levels, first-clocked first.
    pub data_bits: [bool; 8],
    pub parity: bool,
    pub stop: bool,
}

impl WriteCapture {
    /// Reassemble the byte the device received (LSB clocked first).
    pub fn byte(&self) -> u8 {
        self.data_bits
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &bit)| acc | ((bit as u8) << i))
    }

    /// One-count across data + parity.
    pub fn ones(&self) -> u32 {
        self.data_bits.iter().filter(|&&b| b).count() as u32 + self.parity as u32
    }
}

/// Act as the device for one host write already requested via `send`:
/// wait out the request phase, clock the frame off the encoder, drive the
/// ack bit, and drain the settle phase.
pub fn run_write_cycle<const N: usize>(
    host: &mut Ps2Host<SimLines, N>,
    lines: &SimLines,
    ack: bool,
) -> WriteCapture {
    // Request phase: the host must hold the clock for the whole countdown.
    for _ in 0..10 {
        host.on_tick();
        assert!(lines.host_holds_clock(), "clock released mid-request");
    }
    host.on_tick();
    let start_low = lines.host_holds_data();
    assert!(!lines.host_holds_clock(), "clock still held after request");

    // The device clocks; the encoder emits one bit per falling edge.
    let mut data_bits = [false; 8];
    for bit in data_bits.iter_mut() {
        host.on_clock_edge(0);
        *bit = lines.data_level();
    }
    host.on_clock_edge(0);
    let parity = lines.data_level();
    host.on_clock_edge(0);
    let stop = lines.data_level();

    // Acknowledgment: the device pulls data low before the final edge.
    lines.set_device_data(ack);
    host.on_clock_edge(0);
    lines.set_device_data(false);

    // Settle phase.
    for _ in 0..4 {
        host.on_tick();
    }

    WriteCapture {
        start_low,
        data_bits,
        parity,
        stop,
    }
}
