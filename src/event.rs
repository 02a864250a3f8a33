//! Alarm lifecycle events and the subscriber registry.
//!
//! Events are single bits in an [`EventFlags`] mask so that subscribers can
//! watch several of them with one registration. The [`EventBus`] keeps its
//! subscribers in registration order and never removes or reorders them.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::{BitAnd, BitOr, BitOrAssign};

use bitfield::bitfield;

bitfield! {
    /// Alarm lifecycle event bits.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct EventFlags(u8);
    impl Debug;
    /// The hardware alarm line fired
    pub occurred, set_occurred: 0;
    /// A new term was programmed into the hardware
    pub term_set, set_term_set: 1;
    /// The alarm went from enabled to disabled
    pub disabled, set_disabled: 2;
    /// The alarm went from disabled to enabled
    pub enabled, set_enabled: 3;
}

impl EventFlags {
    /// No event.
    pub const EMPTY: Self = Self(0);
    /// The hardware alarm line fired.
    pub const OCCURRED: Self = Self(1 << 0);
    /// A new term was programmed into the hardware.
    pub const TERM_SET: Self = Self(1 << 1);
    /// The alarm went from enabled to disabled.
    pub const DISABLED: Self = Self(1 << 2);
    /// The alarm went from disabled to enabled.
    pub const ENABLED: Self = Self(1 << 3);
    /// Every lifecycle event.
    pub const ALL: Self = Self(0x0F);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if any bit is set in both masks.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `self` with the bits of `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl From<u8> for EventFlags {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

impl From<EventFlags> for u8 {
    fn from(v: EventFlags) -> Self {
        v.0
    }
}

impl BitOr for EventFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "EventFlags(");
        if self.occurred() {
            defmt::write!(f, " OCCURRED");
        }
        if self.term_set() {
            defmt::write!(f, " TERM_SET");
        }
        if self.disabled() {
            defmt::write!(f, " DISABLED");
        }
        if self.enabled() {
            defmt::write!(f, " ENABLED");
        }
        defmt::write!(f, " )");
    }
}

/// Callback invoked with the full event value that was dispatched.
pub type EventCallback<'a> = Box<dyn FnMut(EventFlags) + 'a>;

struct Subscriber<'a> {
    mask: EventFlags,
    callback: EventCallback<'a>,
}

/// Append-only registry of event subscribers.
///
/// Must only be used from normal execution context, never from an interrupt
/// handler: callbacks may run for an arbitrary amount of time.
#[derive(Default)]
pub struct EventBus<'a> {
    subscribers: Vec<Subscriber<'a>>,
}

impl<'a> EventBus<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Appends a subscriber interested in any of the bits of `mask`.
    ///
    /// Identical or overlapping masks are allowed and each registration is
    /// called separately.
    ///
    /// # Panics
    ///
    /// Halts if the registry cannot grow.
    pub fn register<F>(&mut self, mask: EventFlags, callback: F)
    where
        F: FnMut(EventFlags) + 'a,
    {
        if self.subscribers.try_reserve(1).is_err() {
            error!(
                "event bus: registry allocation failed with {} subscribers",
                self.subscribers.len()
            );
            panic!("event bus registry allocation failed");
        }
        self.subscribers.push(Subscriber {
            mask,
            callback: Box::new(callback),
        });
        info!(
            "event bus: registered subscriber #{} for mask {:?}",
            self.subscribers.len(),
            mask.bits()
        );
    }

    /// Calls, in registration order, every subscriber whose mask intersects
    /// `event`. Each callback receives `event` unmasked.
    pub fn dispatch(&mut self, event: EventFlags) {
        for (index, subscriber) in self.subscribers.iter_mut().enumerate() {
            if subscriber.mask.intersects(event) {
                debug!(
                    "event bus: calling subscriber #{} for event {:?}",
                    index + 1,
                    event.bits()
                );
                (subscriber.callback)(event);
            }
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
