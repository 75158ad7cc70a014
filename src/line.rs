//! Line-control capability consumed by the protocol core.
//!
//! The bus has two open-collector lines (clock and data) with pull-up
//! resistors. At any moment the host either releases a line to the pull-up
//! (it reads high unless the device drives it) or drives it low. The
//! protocol core never touches pins directly; it goes through this trait so
//! the same state machines run against real GPIO on target and simulated
//! lines in the test suite.
//!
//! All operations are idempotent and must be safe to call from interrupt
//! context, taking effect within a small bounded number of cycles.

/// Host-side control of the two bus lines.
pub trait LineControl {
    /// Release the data line to the pull-up.
    fn release_data(&mut self);

    /// Drive the data line low.
    fn drive_data_low(&mut self);

    /// Release the clock line to the pull-up.
    fn release_clock(&mut self);

    /// Drive the clock line low.
    fn drive_clock_low(&mut self);

    /// Instantaneous data line level.
    fn data_high(&self) -> bool;

    /// Instantaneous clock line level.
    fn clock_high(&self) -> bool;
}
