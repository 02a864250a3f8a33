//! The alarm scheduling core.
//!
//! [`AlarmScheduler`] owns the current [`AlarmConfig`], the scheduled term and
//! the subscriber registry, and keeps the single-term alarm chip in step with
//! the weekly recurrence.
//!
//! # Transitions
//!
//! [`AlarmScheduler::set_alarm`] always reprograms the chip and emits
//! [`EventFlags::TERM_SET`]. In addition:
//!
//! | was enabled | now enabled | event      |
//! |-------------|-------------|------------|
//! | false       | false       | none       |
//! | false       | true        | `ENABLED`  |
//! | true        | false       | `DISABLED` |
//! | true        | true        | none       |
//!
//! # Firing
//!
//! The alarm interrupt only marks the event in the [`InterruptBridge`]. The
//! main loop calls [`AlarmScheduler::poll`], which dispatches
//! [`EventFlags::OCCURRED`]. The next occurrence is not armed automatically:
//! once the application has handled the alarm it calls
//! [`AlarmScheduler::advance`] (or `set_alarm`).

use chrono::{Datelike, Timelike, Weekday};

use crate::config::AlarmConfig;
use crate::event::{EventBus, EventFlags};
use crate::interrupt::{InterruptBridge, PowerManagement};
use crate::port::{AlarmTerm, HardwareAlarmPort};
use crate::resolver::{next_occurrence, ScheduledTerm};
use crate::store::{ConfigLoadError, ConfigStore};

/// Scheduling context tying the alarm chip, the config store, the power
/// manager and the interrupt bridge together.
pub struct AlarmScheduler<'a, P, S, W>
where
    P: HardwareAlarmPort,
    S: ConfigStore,
    W: PowerManagement,
{
    port: P,
    store: S,
    power: W,
    irq: &'a InterruptBridge,
    config: AlarmConfig,
    term: Option<ScheduledTerm>,
    bus: EventBus<'a>,
}

impl<'a, P, S, W> AlarmScheduler<'a, P, S, W>
where
    P: HardwareAlarmPort,
    S: ConfigStore,
    W: PowerManagement,
{
    /// Creates the scheduler and restores the persisted configuration.
    ///
    /// A stored configuration is applied through [`set_alarm`](Self::set_alarm).
    /// If nothing is stored, or the stored document is unreadable, the default
    /// (disabled) configuration is kept and the chip is left untouched.
    pub fn new(port: P, store: S, power: W, irq: &'a InterruptBridge) -> Self {
        let mut scheduler = Self {
            port,
            store,
            power,
            irq,
            config: AlarmConfig::default(),
            term: None,
            bus: EventBus::new(),
        };

        match scheduler.store.load() {
            Ok(stored) => {
                info!(
                    "alarm: restoring {}:{} days={} enabled={}",
                    stored.hour,
                    stored.minute,
                    stored.week_days.mask(),
                    stored.enabled
                );
                scheduler.set_alarm(stored);
            }
            Err(ConfigLoadError::NotFound) => {
                debug!("alarm: no stored config, using defaults");
            }
            Err(e) => {
                error!("alarm: failed to load config ({:?}), using defaults", e);
            }
        }
        scheduler
    }

    /// Replaces the configuration and resynchronizes the chip.
    pub fn set_alarm(&mut self, config: AlarmConfig) {
        let was_enabled = self.config.enabled;
        if was_enabled {
            self.disable_port();
        }

        self.config = config;
        if let Err(e) = self.store.save(&self.config) {
            error!("alarm: failed to persist config: {:?}", e);
        }

        self.schedule_next();

        if self.config.enabled {
            self.enable_port();
        }

        match (was_enabled, self.config.enabled) {
            (false, true) => self.bus.dispatch(EventFlags::ENABLED),
            (true, false) => self.bus.dispatch(EventFlags::DISABLED),
            _ => {}
        }
    }

    /// Arms the next occurrence of the current configuration, typically after
    /// the application has handled a firing.
    pub fn advance(&mut self) {
        if self.config.enabled {
            self.disable_port();
        }
        self.schedule_next();
        if self.config.enabled {
            self.enable_port();
        }
    }

    /// Drains a pending alarm interrupt and dispatches it.
    ///
    /// Call once per main loop iteration. Nothing is drained while the device
    /// is entering standby; the flag stays set until a later poll.
    pub fn poll(&mut self) {
        if self.power.is_entering_standby() {
            return;
        }
        if self.irq.is_pending(EventFlags::OCCURRED) {
            info!("alarm: occurred");
            self.bus.dispatch(EventFlags::OCCURRED);
            self.irq.clear(EventFlags::OCCURRED);
        }
    }

    /// Registers `callback` for every event intersecting `mask`.
    pub fn register_callback<F>(&mut self, mask: EventFlags, callback: F)
    where
        F: FnMut(EventFlags) + 'a,
    {
        self.bus.register(mask, callback);
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn alarm_data(&self) -> AlarmConfig {
        self.config
    }

    /// Weekday of the scheduled term, `None` when no weekday is enabled.
    #[must_use]
    pub fn next_alarm_weekday(&self) -> Option<Weekday> {
        if !self.config.is_any_day_enabled() {
            return None;
        }
        self.term.map(|term| term.weekday())
    }

    /// The scheduled term, `None` when no weekday is enabled.
    #[must_use]
    pub fn next_alarm(&self) -> Option<ScheduledTerm> {
        self.term
    }

    #[must_use]
    pub fn is_alarm_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Configured alarm hour, also meaningful while the alarm is disabled.
    #[must_use]
    pub fn alarm_hour(&self) -> u8 {
        self.config.hour
    }

    /// Configured alarm minute, also meaningful while the alarm is disabled.
    #[must_use]
    pub fn alarm_minute(&self) -> u8 {
        self.config.minute
    }

    /// Whether the chip clock currently shows the configured hour and minute.
    ///
    /// # Errors
    ///
    /// Returns the port error if the clock could not be read.
    pub fn is_alarm_time(&mut self) -> Result<bool, P::Error> {
        let now = self.port.read_datetime()?;
        Ok(now.hour() == u32::from(self.config.hour)
            && now.minute() == u32::from(self.config.minute))
    }

    /// The alarm chip.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the alarm chip, e.g. to set its clock.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The config store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Computes the next term and programs it. Always emits `TERM_SET` once
    /// the chip has been programmed.
    fn schedule_next(&mut self) {
        if !self.config.is_any_day_enabled() {
            info!("alarm: no weekday enabled, term cleared");
            self.clear_term();
            return;
        }

        // A stale chip clock could place "now" on the wrong side of the term.
        if let Err(e) = self.port.sync_to_system_clock() {
            warn!("alarm: clock sync failed: {:?}", e);
        }
        let now = match self.port.read_datetime() {
            Ok(now) => now,
            Err(e) => {
                // The old term belongs to the old config, it must not stay armed.
                error!("alarm: cannot read clock, term cleared: {:?}", e);
                self.clear_term();
                return;
            }
        };

        let Some(term) = next_occurrence(now, &self.config) else {
            return;
        };
        let hw = term.hardware_term();
        if let Err(e) = self.port.set_term(&hw) {
            warn!("alarm: failed to program term: {:?}", e);
        }
        self.term = Some(term);
        info!(
            "alarm: term set to {}-{}-{} {}:{} (weekday {})",
            term.at().year(),
            term.at().month(),
            term.at().day(),
            term.at().hour(),
            term.at().minute(),
            term.weekday().num_days_from_sunday()
        );
        self.bus.dispatch(EventFlags::TERM_SET);
    }

    /// Programs the "no alarm" term and forgets the scheduled one.
    fn clear_term(&mut self) {
        if let Err(e) = self.port.set_term(&AlarmTerm::NONE) {
            warn!("alarm: failed to clear term: {:?}", e);
        }
        self.term = None;
        self.bus.dispatch(EventFlags::TERM_SET);
    }

    fn enable_port(&mut self) {
        if let Err(e) = self.port.enable() {
            warn!("alarm: failed to enable match: {:?}", e);
        }
    }

    fn disable_port(&mut self) {
        if let Err(e) = self.port.disable() {
            warn!("alarm: failed to disable match: {:?}", e);
        }
    }
}
