//! Hand-off of the RTC alarm interrupt to normal execution context.
//!
//! The interrupt handler only sets [`EventFlags::OCCURRED`] in a flag
//! register shared with the main loop and asks the power manager to wake
//! up. The main loop later drains the flag and dispatches it, see
//! [`AlarmScheduler::poll`](crate::AlarmScheduler::poll).
//!
//! All access to the flag register happens inside a `critical_section`
//! that touches a single byte: no allocation, no I/O, no callbacks.
//!
//! ```rust,ignore
//! static ALARM_IRQ: InterruptBridge = InterruptBridge::new();
//!
//! #[interrupt]
//! fn GPIO() {
//!     ALARM_IRQ.on_alarm_interrupt(&POWER);
//! }
//! ```

use core::cell::Cell;

use critical_section::Mutex;

use crate::event::EventFlags;

/// The device's power management layer, as seen by the alarm core.
pub trait PowerManagement {
    /// True while the device is transitioning into low-power standby.
    /// Pending events are not drained during that window.
    fn is_entering_standby(&self) -> bool;

    /// Requests a wake-up because the RTC alarm fired.
    ///
    /// Called from interrupt context: implementations must not block or
    /// allocate.
    fn request_wakeup(&self);
}

impl<T: PowerManagement + ?Sized> PowerManagement for &T {
    fn is_entering_standby(&self) -> bool {
        (**self).is_entering_standby()
    }

    fn request_wakeup(&self) {
        (**self).request_wakeup();
    }
}

/// Flag register shared between the alarm interrupt and the main loop.
pub struct InterruptBridge {
    flags: Mutex<Cell<EventFlags>>,
}

impl InterruptBridge {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flags: Mutex::new(Cell::new(EventFlags::EMPTY)),
        }
    }

    /// Interrupt entry point for the falling edge of the RTC alarm line.
    pub fn on_alarm_interrupt<W: PowerManagement>(&self, power: &W) {
        self.raise(EventFlags::OCCURRED);
        power.request_wakeup();
    }

    /// Sets `bits` in the flag register.
    pub fn raise(&self, bits: EventFlags) {
        critical_section::with(|cs| {
            let flags = self.flags.borrow(cs);
            flags.set(flags.get() | bits);
        });
    }

    /// True if any of `bits` is currently set.
    #[must_use]
    pub fn is_pending(&self, bits: EventFlags) -> bool {
        critical_section::with(|cs| self.flags.borrow(cs).get().intersects(bits))
    }

    /// Clears `bits` in the flag register.
    pub fn clear(&self, bits: EventFlags) {
        critical_section::with(|cs| {
            let flags = self.flags.borrow(cs);
            flags.set(flags.get().without(bits));
        });
    }

    /// Snapshot of the flag register.
    #[must_use]
    pub fn pending(&self) -> EventFlags {
        critical_section::with(|cs| self.flags.borrow(cs).get())
    }
}

impl Default for InterruptBridge {
    fn default() -> Self {
        Self::new()
    }
}
