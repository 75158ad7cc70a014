//! Hardware abstraction for ESP-IDF targets.
//!
//! Thin wrappers around ESP-IDF peripherals. Protocol logic stays in the
//! core modules; the HAL is just I/O.

pub mod gpio;
pub mod timer;

pub use gpio::EspLines;
pub use timer::TickTimer;
