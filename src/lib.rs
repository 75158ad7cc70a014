//! # ps2-host
//!
//! Interrupt-driven host-side driver for the PS/2 keyboard bus.
//!
//! ## Architecture
//!
//! ```text
//! clock falling edge ──▶ Ps2Host::on_clock_edge ──▶ ScanQueue ──▶ try_read()
//! 20 µs periodic tick ─▶ Ps2Host::on_tick          (inhibit / write / settle)
//! ```
//!
//! Every byte travels in an 11-bit frame (start, 8 data bits LSB-first,
//! odd parity, stop; writes add a device-ack bit). The decoder and encoder
//! run entirely inside the clock-edge handler; the timing sequencer runs
//! off an independent periodic timer and owns all role transitions. The
//! only state shared with application code is the scan code queue, drained
//! under an interrupt-suspension critical section.
//!
//! The protocol core is hardware-free behind the [`LineControl`]
//! capability and fully testable on the host; the `hal` module binds it to
//! ESP-IDF GPIO and timer services on target.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod frame;
pub mod host;
pub mod line;
pub mod logging;
pub mod queue;
pub mod stats;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use config::Ps2Config;
pub use frame::{BusRole, FrameError};
pub use host::Ps2Host;
pub use line::LineControl;
pub use logging::{LogLevel, LogStream};
pub use queue::ScanQueue;
pub use stats::BusStats;
