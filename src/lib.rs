//! Weekly RTC alarm scheduling for battery powered wearables.
//!
//! The alarm chip can only hold a single next-match term, while the user
//! configures a recurring alarm: a time of day plus a set of weekdays. This
//! crate keeps the chip programmed with the next occurrence of that
//! recurrence, persists the configuration and hands the alarm interrupt over
//! to the main loop, where subscribers are notified.
//!
//! ```rust,ignore
//! use rtc_alarm::{
//!     AlarmConfig, AlarmScheduler, EventFlags, InterruptBridge, MemoryStore, Pcf8563, WeekDays,
//! };
//!
//! static ALARM_IRQ: InterruptBridge = InterruptBridge::new();
//!
//! let rtc = Pcf8563::new(i2c);
//! let mut alarm = AlarmScheduler::new(rtc, MemoryStore::<96>::new(), power, &ALARM_IRQ);
//! alarm.register_callback(EventFlags::OCCURRED, |_| buzzer.ring());
//! alarm.set_alarm(AlarmConfig::new(true, 7, 30, WeekDays::from_mask(0b011_1110)));
//!
//! loop {
//!     alarm.poll();
//! }
//! ```
//!
//! # Features
//!
//! - `log`: log through the `log` crate
//! - `defmt`: log through `defmt` and derive `defmt::Format` for public types
#![no_std]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod config;
pub mod event;
pub mod interrupt;
pub mod pcf8563;
pub mod port;
pub mod resolver;
pub mod scheduler;
pub mod store;

pub use config::{AlarmConfig, WeekDays};
pub use event::{EventBus, EventCallback, EventFlags};
pub use interrupt::{InterruptBridge, PowerManagement};
pub use pcf8563::{Pcf8563, Pcf8563Error};
pub use port::{AlarmTerm, HardwareAlarmPort};
pub use resolver::{next_occurrence, ScheduledTerm};
pub use scheduler::AlarmScheduler;
pub use store::{ConfigLoadError, ConfigStore, MemoryStore, PersistenceWriteError, StoredAlarm};
