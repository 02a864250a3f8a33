//! The recurring alarm definition.
//!
//! An [`AlarmConfig`] describes a weekly alarm: a wall-clock time and the set
//! of weekdays on which it should fire. It is the single source of truth for
//! the scheduler and the only piece of state that gets persisted.

use chrono::Weekday;

/// Number of days in a week, and the size of a [`WeekDays`] set.
pub const DAYS_IN_WEEK: usize = 7;

/// Converts a Sunday-based index (0=Sunday .. 6=Saturday) into a [`Weekday`].
///
/// Indices past 6 wrap around the week.
#[must_use]
pub fn weekday_from_sunday_index(index: usize) -> Weekday {
    match index % DAYS_IN_WEEK {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// The set of weekdays an alarm recurs on, indexed 0=Sunday .. 6=Saturday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeekDays([bool; DAYS_IN_WEEK]);

impl WeekDays {
    /// No day enabled.
    pub const NONE: Self = Self([false; DAYS_IN_WEEK]);
    /// Every day enabled.
    pub const ALL: Self = Self([true; DAYS_IN_WEEK]);

    /// Creates a set from the raw Sunday-indexed flags.
    #[must_use]
    pub const fn new(days: [bool; DAYS_IN_WEEK]) -> Self {
        Self(days)
    }

    /// Creates a set from a bit mask where bit 0 is Sunday. Bit 7 is ignored.
    #[must_use]
    pub fn from_mask(mask: u8) -> Self {
        let mut days = [false; DAYS_IN_WEEK];
        for (index, day) in days.iter_mut().enumerate() {
            *day = (mask >> index) & 1 != 0;
        }
        Self(days)
    }

    /// Returns the bit mask representation, bit 0 is Sunday.
    #[must_use]
    pub fn mask(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |mask, (index, day)| mask | (u8::from(*day) << index))
    }

    /// Returns a copy with `day` enabled.
    #[must_use]
    pub fn with(mut self, day: Weekday) -> Self {
        self.set(day, true);
        self
    }

    /// Enables or disables a single day.
    pub fn set(&mut self, day: Weekday, enabled: bool) {
        self.0[day.num_days_from_sunday() as usize] = enabled;
    }

    #[must_use]
    pub fn contains(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_sunday() as usize]
    }

    /// True if at least one day is enabled.
    #[must_use]
    pub fn any(&self) -> bool {
        self.0.iter().any(|day| *day)
    }

    /// Raw Sunday-indexed flags.
    #[must_use]
    pub fn as_array(&self) -> &[bool; DAYS_IN_WEEK] {
        &self.0
    }
}

impl From<[bool; DAYS_IN_WEEK]> for WeekDays {
    fn from(days: [bool; DAYS_IN_WEEK]) -> Self {
        Self(days)
    }
}

/// A weekly recurring alarm.
///
/// `hour` and `minute` are taken as given: values outside 0-23 / 0-59 are not
/// rejected. The resolver rolls them over into the following minutes, hours or
/// days the same way C's `mktime` normalizes a `struct tm`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    /// Whether the hardware match is armed.
    pub enabled: bool,
    /// Hour of the alarm (0-23)
    pub hour: u8,
    /// Minute of the alarm (0-59)
    pub minute: u8,
    /// Days the alarm recurs on.
    pub week_days: WeekDays,
}

impl AlarmConfig {
    #[must_use]
    pub const fn new(enabled: bool, hour: u8, minute: u8, week_days: WeekDays) -> Self {
        Self {
            enabled,
            hour,
            minute,
            week_days,
        }
    }

    /// True if the alarm recurs on at least one day.
    #[must_use]
    pub fn is_any_day_enabled(&self) -> bool {
        self.week_days.any()
    }
}
