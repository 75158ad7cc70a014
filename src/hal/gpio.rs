//! Open-drain GPIO pair for the bus lines, plus the clock-edge interrupt.
//!
//! Both lines run in input/output open-drain mode with the internal
//! pull-up: writing high releases the line to the pull-up, writing low
//! sinks it, and the level read always reflects the wire (either side may
//! be holding it down).

use core::ffi::c_void;

use esp_idf_svc::hal::gpio::{AnyIOPin, InputOutput, InterruptType, Pin, PinDriver, Pull};
use esp_idf_svc::sys;
use esp_idf_svc::sys::EspError;

use crate::line::LineControl;

/// The two bus lines as open-drain GPIO.
pub struct EspLines<'d> {
    data: PinDriver<'d, AnyIOPin, InputOutput>,
    clock: PinDriver<'d, AnyIOPin, InputOutput>,
    clock_pin: i32,
}

impl<'d> EspLines<'d> {
    /// Claim the two pins and release both lines to idle.
    pub fn new(data: AnyIOPin, clock: AnyIOPin) -> Result<Self, EspError> {
        let clock_pin = clock.pin();

        let mut data = PinDriver::input_output_od(data)?;
        let mut clock = PinDriver::input_output_od(clock)?;
        data.set_pull(Pull::Up)?;
        clock.set_pull(Pull::Up)?;
        data.set_high()?;
        clock.set_high()?;

        Ok(Self {
            data,
            clock,
            clock_pin,
        })
    }

    /// Arm the falling-edge interrupt on the clock line.
    ///
    /// Installs the shared GPIO ISR service on first use (an
    /// already-installed service is fine) and registers `handler` for this
    /// pin.
    ///
    /// # Safety
    ///
    /// `handler` runs in interrupt context with `arg` passed through; it
    /// must not block, allocate or touch non-interrupt-safe services, and
    /// `arg` must stay valid for as long as the handler is registered.
    pub unsafe fn attach_clock_isr(
        &mut self,
        handler: unsafe extern "C" fn(*mut c_void),
        arg: *mut c_void,
    ) -> Result<(), EspError> {
        self.clock.set_interrupt_type(InterruptType::NegEdge)?;

        let rc = sys::gpio_install_isr_service(0);
        if rc != sys::ESP_ERR_INVALID_STATE as i32 {
            sys::esp!(rc)?;
        }
        sys::esp!(sys::gpio_isr_handler_add(self.clock_pin, Some(handler), arg))?;
        self.clock.enable_interrupt()
    }
}

// Level writes on an initialized open-drain driver cannot fail; the
// capability is infallible by design, so results are discarded.
impl LineControl for EspLines<'_> {
    fn release_data(&mut self) {
        let _ = self.data.set_high();
    }

    fn drive_data_low(&mut self) {
        let _ = self.data.set_low();
    }

    fn release_clock(&mut self) {
        let _ = self.clock.set_high();
    }

    fn drive_clock_low(&mut self) {
        let _ = self.clock.set_low();
    }

    fn data_high(&self) -> bool {
        self.data.is_high()
    }

    fn clock_high(&self) -> bool {
        self.clock.is_high()
    }
}
