//! Next-occurrence computation for a weekly recurring alarm.
//!
//! Given "now" and an [`AlarmConfig`], [`next_occurrence`] returns the first
//! instant strictly after "now" that falls on an enabled weekday at the
//! configured time, or `None` when no weekday is enabled.
//!
//! The alarm chip only holds one term, so the result is programmed as
//! hour, minute and day-of-month (see [`ScheduledTerm::hardware_term`]).
//! Matching on the weekday register instead lets the chip refire on the same
//! day when a single weekday is enabled and the term equals "now".

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday};

use crate::config::{AlarmConfig, WeekDays, DAYS_IN_WEEK};
use crate::port::AlarmTerm;

/// The absolute timestamp of the next firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTerm {
    at: NaiveDateTime,
}

impl ScheduledTerm {
    #[must_use]
    pub const fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }

    /// When the alarm will fire.
    #[must_use]
    pub const fn at(&self) -> NaiveDateTime {
        self.at
    }

    /// The weekday the alarm will fire on.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.at.weekday()
    }

    /// The chip term for this firing: hour, minute and day of month.
    #[must_use]
    pub fn hardware_term(&self) -> AlarmTerm {
        // hour() < 24, minute() < 60, day() <= 31
        AlarmTerm::on_date(
            self.at.hour() as u8,
            self.at.minute() as u8,
            self.at.day() as u8,
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScheduledTerm {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ScheduledTerm({}-{}-{} {}:{})",
            self.at.year(),
            self.at.month(),
            self.at.day(),
            self.at.hour(),
            self.at.minute()
        );
    }
}

/// Computes the next firing of `config` strictly after `now`.
///
/// Returns `None` if no weekday is enabled. Otherwise the candidate is today
/// at `hour:minute`; if today is not enabled or the candidate is not after
/// `now`, the following enabled weekday is used. With a single enabled
/// weekday whose time already passed, that is the same weekday a week later.
#[must_use]
pub fn next_occurrence(now: NaiveDateTime, config: &AlarmConfig) -> Option<ScheduledTerm> {
    if !config.is_any_day_enabled() {
        return None;
    }

    // Out-of-range hour/minute roll over into the following days like mktime.
    let candidate = NaiveDateTime::new(now.date(), NaiveTime::MIN)
        + TimeDelta::hours(i64::from(config.hour))
        + TimeDelta::minutes(i64::from(config.minute));

    if config.week_days.contains(candidate.weekday()) && candidate > now {
        return Some(ScheduledTerm::new(candidate));
    }
    Some(ScheduledTerm::new(following_enabled_day(
        candidate,
        &config.week_days,
    )))
}

/// First instant after `from`, at the same time of day, that falls on an
/// enabled weekday. Requires at least one enabled day.
fn following_enabled_day(from: NaiveDateTime, days: &WeekDays) -> NaiveDateTime {
    (1..=DAYS_IN_WEEK as i64)
        .map(|offset| from + TimeDelta::days(offset))
        .find(|candidate| days.contains(candidate.weekday()))
        .unwrap_or(from + TimeDelta::days(DAYS_IN_WEEK as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // 2024-03-10 is a Sunday.
    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn config(hour: u8, minute: u8, days: WeekDays) -> AlarmConfig {
        AlarmConfig::new(true, hour, minute, days)
    }

    #[test]
    fn test_no_weekday_is_not_set() {
        assert_eq!(next_occurrence(at(10, 8, 0), &config(8, 0, WeekDays::NONE)), None);
    }

    #[test]
    fn test_today_not_enabled_goes_to_next_enabled_day() {
        // Tuesday 10:00, alarm Mon/Wed/Fri 08:00 -> Wednesday 08:00
        let days = WeekDays::NONE
            .with(Weekday::Mon)
            .with(Weekday::Wed)
            .with(Weekday::Fri);
        let now = at(12, 10, 0);
        assert_eq!(now.weekday(), Weekday::Tue);

        let term = next_occurrence(now, &config(8, 0, days)).unwrap();
        assert_eq!(term.at(), at(13, 8, 0));
        assert_eq!(term.weekday(), Weekday::Wed);
    }

    #[test]
    fn test_single_day_passed_wraps_a_week() {
        // Sunday 08:01, alarm Sunday 08:00 -> next Sunday 08:00
        let days = WeekDays::NONE.with(Weekday::Sun);
        let term = next_occurrence(at(10, 8, 1), &config(8, 0, days)).unwrap();
        assert_eq!(term.at(), at(17, 8, 0));
        assert_eq!(term.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_time_equal_to_now_is_not_today() {
        let days = WeekDays::NONE.with(Weekday::Sun);
        let term = next_occurrence(at(10, 8, 0), &config(8, 0, days)).unwrap();
        assert_eq!(term.at(), at(17, 8, 0));
    }

    #[test]
    fn test_later_today() {
        let days = WeekDays::NONE.with(Weekday::Sun).with(Weekday::Mon);
        let term = next_occurrence(at(10, 7, 59), &config(8, 0, days)).unwrap();
        assert_eq!(term.at(), at(10, 8, 0));
    }

    #[test]
    fn test_passed_today_goes_to_tomorrow_when_enabled() {
        let term = next_occurrence(at(10, 23, 30), &config(6, 15, WeekDays::ALL)).unwrap();
        assert_eq!(term.at(), at(11, 6, 15));
    }

    #[test]
    fn test_crosses_month_boundary() {
        // Sunday 2024-03-31 12:00, alarm Tuesday 07:00 -> 2024-04-02
        let now = at(31, 12, 0);
        let days = WeekDays::NONE.with(Weekday::Tue);
        let term = next_occurrence(now, &config(7, 0, days)).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 4, 2)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        assert_eq!(term.at(), expected);
        assert_eq!(term.hardware_term(), AlarmTerm::on_date(7, 0, 2));
    }

    #[test]
    fn test_seconds_in_now_are_respected() {
        let now = at(10, 8, 0) + TimeDelta::seconds(30);
        let term = next_occurrence(now, &config(8, 0, WeekDays::ALL)).unwrap();
        assert_eq!(term.at(), at(11, 8, 0));
    }

    #[test]
    fn test_out_of_range_time_rolls_over() {
        // 25:00 on Sunday normalizes to Monday 01:00
        let days = WeekDays::NONE.with(Weekday::Mon);
        let term = next_occurrence(at(10, 12, 0), &config(25, 0, days)).unwrap();
        assert_eq!(term.at(), at(11, 1, 0));
    }

    #[test]
    fn test_hardware_term_uses_day_of_month() {
        let term = ScheduledTerm::new(at(14, 21, 5));
        let hw = term.hardware_term();
        assert_eq!(hw.hour, Some(21));
        assert_eq!(hw.minute, Some(5));
        assert_eq!(hw.day_of_month, Some(14));
        assert_eq!(hw.weekday, None);
    }

    #[test]
    fn test_resolves_to_earliest_enabled_instant() {
        let nows = [
            at(10, 0, 0),
            at(11, 7, 59),
            at(12, 8, 0),
            at(13, 8, 1),
            at(14, 23, 59),
            at(16, 12, 30),
        ];
        let times = [(0u8, 0u8), (8, 0), (12, 30), (23, 59)];

        for mask in 1u8..0x80 {
            let days = WeekDays::from_mask(mask);
            for &now in &nows {
                for &(hour, minute) in &times {
                    let cfg = config(hour, minute, days);
                    let term = next_occurrence(now, &cfg).unwrap();

                    let expected = (0..=7)
                        .map(|offset| {
                            now.date()
                                .and_hms_opt(u32::from(hour), u32::from(minute), 0)
                                .unwrap()
                                + TimeDelta::days(offset)
                        })
                        .filter(|c| *c > now && days.contains(c.weekday()))
                        .min()
                        .unwrap();

                    assert!(term.at() > now);
                    assert!(days.contains(term.weekday()));
                    assert_eq!(term.at(), expected, "mask={mask:#09b} now={now}");
                }
            }
        }
    }
}
