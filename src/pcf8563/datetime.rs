//! `DateTime` conversion for the PCF8563 time registers.
//!
//! The PCF8563 keeps date and time in 7 consecutive BCD registers starting
//! at 0x02: seconds, minutes, hours, days, weekdays, century/months, years.
//! The century flag selects 19xx when set and 20xx when clear, so the chip
//! covers 1900-2099.
//!
//! Conversion errors are reported via [`DateTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::registers::{CenturyMonths, Days, Hours, Minutes, Seconds, Weekdays, Years};

/// Errors that can occur during PCF8563 date/time conversion or validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year is outside 1900-2099
    YearOutOfRange,
}

/// Converts `value` into (ones, tens) BCD digits, rejecting values above `max_value`.
pub(crate) fn make_bcd(value: u32, max_value: u32) -> Result<(u8, u8), DateTimeError> {
    if value > max_value {
        return Err(DateTimeError::InvalidDateTime);
    }
    let ones = u8::try_from(value % 10).map_err(|_| DateTimeError::InvalidDateTime)?;
    let tens = u8::try_from(value / 10).map_err(|_| DateTimeError::InvalidDateTime)?;
    Ok((ones, tens))
}

/// Decodes BCD digits, rejecting non-decimal nibbles.
pub(crate) fn from_bcd(ones: u8, tens: u8) -> Result<u32, DateTimeError> {
    if ones > 9 || tens > 9 {
        return Err(DateTimeError::InvalidDateTime);
    }
    Ok(10 * u32::from(tens) + u32::from(ones))
}

/// Raw contents of the PCF8563 time registers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RawDateTime {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
    days: Days,
    weekdays: Weekdays,
    century_months: CenturyMonths,
    years: Years,
}

impl RawDateTime {
    pub(crate) fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, DateTimeError> {
        let (ones, tens) = make_bcd(datetime.second(), 59)?;
        let mut seconds = Seconds::default();
        seconds.set_seconds(ones);
        seconds.set_ten_seconds(tens);

        let (ones, tens) = make_bcd(datetime.minute(), 59)?;
        let mut minutes = Minutes::default();
        minutes.set_minutes(ones);
        minutes.set_ten_minutes(tens);

        let (ones, tens) = make_bcd(datetime.hour(), 23)?;
        let mut hours = Hours::default();
        hours.set_hours(ones);
        hours.set_ten_hours(tens);

        let (ones, tens) = make_bcd(datetime.day(), 31)?;
        let mut days = Days::default();
        days.set_days(ones);
        days.set_ten_days(tens);

        let mut weekdays = Weekdays::default();
        weekdays.set_weekday(
            u8::try_from(datetime.weekday().num_days_from_sunday())
                .map_err(|_| DateTimeError::InvalidDateTime)?,
        );

        let (ones, tens) = make_bcd(datetime.month(), 12)?;
        let mut century_months = CenturyMonths::default();
        century_months.set_month(ones);
        century_months.set_ten_month(tens);

        let year = datetime.year();
        if !(1900..=2099).contains(&year) {
            error!("year {} is outside 1900-2099", year);
            return Err(DateTimeError::YearOutOfRange);
        }
        century_months.set_century(year < 2000);
        let offset = u32::try_from(year % 100).map_err(|_| DateTimeError::InvalidDateTime)?;
        let (ones, tens) = make_bcd(offset, 99)?;
        let mut years = Years::default();
        years.set_year(ones);
        years.set_ten_year(tens);

        Ok(Self {
            seconds,
            minutes,
            hours,
            days,
            weekdays,
            century_months,
            years,
        })
    }

    pub(crate) fn into_datetime(self) -> Result<NaiveDateTime, DateTimeError> {
        if self.seconds.voltage_low() {
            warn!("pcf8563: voltage low flag set, clock integrity not guaranteed");
        }
        let seconds = from_bcd(self.seconds.seconds(), self.seconds.ten_seconds())?;
        let minutes = from_bcd(self.minutes.minutes(), self.minutes.ten_minutes())?;
        let hours = from_bcd(self.hours.hours(), self.hours.ten_hours())?;
        let day = from_bcd(self.days.days(), self.days.ten_days())?;
        let month = from_bcd(
            self.century_months.month(),
            self.century_months.ten_month(),
        )?;
        let year_offset = from_bcd(self.years.year(), self.years.ten_year())?;
        let century = if self.century_months.century() {
            1900
        } else {
            2000
        };
        let year = century
            + i32::try_from(year_offset).map_err(|_| DateTimeError::InvalidDateTime)?;
        debug!(
            "pcf8563: read {}-{}-{} {}:{}:{}",
            year, month, day, hours, minutes, seconds
        );

        // The weekday register is not trusted, chrono derives it from the date.
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hours, minutes, seconds))
            .ok_or(DateTimeError::InvalidDateTime)
    }
}

impl From<[u8; 7]> for RawDateTime {
    fn from(data: [u8; 7]) -> Self {
        RawDateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            days: Days(data[3]),
            weekdays: Weekdays(data[4]),
            century_months: CenturyMonths(data[5]),
            years: Years(data[6]),
        }
    }
}

impl From<&RawDateTime> for [u8; 7] {
    fn from(dt: &RawDateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.days.0,
            dt.weekdays.0,
            dt.century_months.0,
            dt.years.0,
        ]
    }
}
