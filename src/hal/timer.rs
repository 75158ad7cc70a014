//! Periodic tick timer for the timing sequencer.
//!
//! One hardware timer drives [`crate::Ps2Host::on_tick`] at
//! [`TICK_PERIOD_US`]. Configuration is one-shot: the first call starts
//! the timer, every later call is a no-op while the running instance keeps
//! firing, so callers anywhere in the firmware can "ensure" the tick without
//! coordinating.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use esp_idf_svc::sys::EspError;
use esp_idf_svc::timer::{EspTimer, EspTimerService};

use crate::config::TICK_PERIOD_US;

static TICK_CONFIGURED: AtomicBool = AtomicBool::new(false);

/// Handle keeping the periodic tick alive. Dropping it stops the tick.
pub struct TickTimer {
    _timer: EspTimer<'static>,
}

impl TickTimer {
    /// Start the fixed-period tick with `callback` as the sequencer hook.
    ///
    /// Idempotent across repeated calls: only the first caller gets
    /// `Some(handle)`; later calls return `None` without touching the
    /// timer.
    pub fn configure<F>(callback: F) -> Result<Option<Self>, EspError>
    where
        F: FnMut() + Send + 'static,
    {
        if TICK_CONFIGURED.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }

        let service = EspTimerService::new()?;
        let timer = service.timer(callback)?;
        timer.every(Duration::from_micros(TICK_PERIOD_US))?;

        Ok(Some(Self { _timer: timer }))
    }
}
