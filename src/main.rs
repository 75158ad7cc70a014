//! ps2host - firmware entry point.
//!
//! Wires the protocol core to ESP-IDF: open-drain GPIO for the two bus
//! lines, the falling-edge interrupt on the clock line, and the 20 µs tick
//! timer. The main loop drains scan codes and the interrupt-safe log ring.
//!
//! Sharing model: the controller lives in a static cell. The clock ISR
//! accesses it directly (interrupts do not nest); the tick callback and the
//! main loop enter an interrupt-suspension critical section first.

#[cfg(target_os = "espidf")]
mod firmware {
    use core::cell::UnsafeCell;
    use core::ffi::c_void;

    use esp_idf_svc::hal::gpio::IOPin;
    use esp_idf_svc::hal::interrupt;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::sys;
    use esp_idf_svc::sys::EspError;

    use ps2_host::hal::{EspLines, TickTimer};
    use ps2_host::logging::LogStream;
    use ps2_host::{isr_info, isr_warn, BusStats, Ps2Host};

    // Wrapper making the static controller cell Sync.
    // SAFETY: the ISR has exclusive access while it runs (no nesting);
    // all other access goes through interrupt::free.
    struct SyncCell<T>(UnsafeCell<T>);
    unsafe impl<T> Sync for SyncCell<T> {}

    static HOST: SyncCell<Option<Ps2Host<EspLines<'static>>>> = SyncCell(UnsafeCell::new(None));
    static LOG: LogStream = LogStream::new();

    fn now_us() -> i64 {
        unsafe { sys::esp_timer_get_time() }
    }

    unsafe extern "C" fn clock_isr(_arg: *mut c_void) {
        if let Some(host) = (*HOST.0.get()).as_mut() {
            host.on_clock_edge(sys::esp_timer_get_time());
        }
    }

    /// Snapshot stats under the critical section.
    fn stats() -> BusStats {
        interrupt::free(|| unsafe {
            (*HOST.0.get())
                .as_ref()
                .map(|host| host.stats())
                .unwrap_or_default()
        })
    }

    pub fn run() -> Result<(), EspError> {
        sys::link_patches();

        let peripherals = Peripherals::take()?;
        let mut lines = EspLines::new(
            peripherals.pins.gpio4.downgrade(),
            peripherals.pins.gpio5.downgrade(),
        )?;
        unsafe {
            lines.attach_clock_isr(clock_isr, core::ptr::null_mut())?;
        }

        let mut host = Ps2Host::new(lines);
        host.init();
        unsafe {
            *HOST.0.get() = Some(host);
        }

        let _tick = TickTimer::configure(|| {
            interrupt::free(|| unsafe {
                if let Some(host) = (*HOST.0.get()).as_mut() {
                    host.on_tick();
                }
            });
        })?;

        println!("ps2host: bus armed, data=GPIO4 clock=GPIO5");

        let mut reported = BusStats::default();
        loop {
            // Drain captured scan codes.
            while let Some(code) = interrupt::free(|| unsafe {
                (*HOST.0.get()).as_mut().and_then(|host| host.try_read())
            }) {
                isr_info!(LOG, now_us(), "scan code {:#04x}", code);
            }

            // Surface new failures since the last pass.
            let current = stats();
            if current.frame_errors() > reported.frame_errors() {
                isr_warn!(
                    LOG,
                    now_us(),
                    "frame errors: {} (resends {})",
                    current.frame_errors(),
                    current.resend_requests
                );
            }
            if current.queue_drops > reported.queue_drops {
                isr_warn!(LOG, now_us(), "queue full, dropped {}", current.queue_drops);
            }
            if current.write_nacks > reported.write_nacks {
                isr_warn!(LOG, now_us(), "write not acked ({})", current.write_nacks);
            }
            reported = current;

            // Blocking output is fine here, outside interrupt context.
            while let Some(entry) = LOG.drain() {
                println!(
                    "[{:>10}] {:5} {}",
                    entry.timestamp_us,
                    entry.level.as_str(),
                    entry.message()
                );
            }

            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    if let Err(err) = firmware::run() {
        panic!("ps2host init failed: {err}");
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    // The firmware entry is target-only; on the host, run `cargo test`.
    eprintln!("ps2host runs on ESP-IDF targets; use `cargo test` on the host.");
}
