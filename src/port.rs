//! The RTC alarm chip as seen by the scheduler.

use chrono::NaiveDateTime;

/// A single next-match term for the alarm chip.
///
/// Every `None` field is excluded from the match. The all-`None` term is the
/// "no alarm" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTerm {
    /// Hour to match (0-23)
    pub hour: Option<u8>,
    /// Minute to match (0-59)
    pub minute: Option<u8>,
    /// Day of month to match (1-31)
    pub day_of_month: Option<u8>,
    /// Day of week to match (0=Sunday .. 6=Saturday)
    pub weekday: Option<u8>,
}

impl AlarmTerm {
    /// The "no alarm" sentinel: nothing is compared, nothing will match.
    pub const NONE: Self = Self {
        hour: None,
        minute: None,
        day_of_month: None,
        weekday: None,
    };

    /// Matches `hour:minute` on a given day of the month.
    #[must_use]
    pub const fn on_date(hour: u8, minute: u8, day_of_month: u8) -> Self {
        Self {
            hour: Some(hour),
            minute: Some(minute),
            day_of_month: Some(day_of_month),
            weekday: None,
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.hour.is_none()
            && self.minute.is_none()
            && self.day_of_month.is_none()
            && self.weekday.is_none()
    }
}

/// Operations the scheduler needs from the RTC alarm chip.
///
/// The chip holds exactly one term at a time. It must never be reprogrammed
/// while the match is enabled, the scheduler disables it first.
pub trait HardwareAlarmPort {
    /// Error reported by the underlying bus or device.
    #[cfg(not(feature = "defmt"))]
    type Error: core::fmt::Debug;
    /// Error reported by the underlying bus or device.
    #[cfg(feature = "defmt")]
    type Error: core::fmt::Debug + defmt::Format;

    /// Programs the next-match term.
    fn set_term(&mut self, term: &AlarmTerm) -> Result<(), Self::Error>;

    /// Arms the match (and clears a stale alarm flag).
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Disarms the match.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Reads the chip's current wall-clock date and time.
    fn read_datetime(&mut self) -> Result<NaiveDateTime, Self::Error>;

    /// Resynchronizes the chip and system clocks so that both agree on "now".
    fn sync_to_system_clock(&mut self) -> Result<(), Self::Error>;
}
