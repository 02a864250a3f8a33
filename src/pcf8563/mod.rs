//! Blocking PCF8563 driver implementing [`HardwareAlarmPort`].
//!
//! The PCF8563 has a single alarm made of four compare registers (minute,
//! hour, day of month, day of week). Each register carries an active-low
//! enable bit, so an [`AlarmTerm`] field of `None` is written as `0x80`.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtc_alarm::pcf8563::Pcf8563;
//!
//! fn set_system_time(now: chrono::NaiveDateTime) {
//!     // hand the time over to the platform clock
//! }
//!
//! let rtc = Pcf8563::new(i2c).with_system_clock(set_system_time);
//! ```

mod datetime;
mod registers;

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

pub use datetime::DateTimeError;
use datetime::{make_bcd, RawDateTime};
pub use registers::{
    CenturyMonths, ControlStatus2, DayAlarm, Days, HourAlarm, Hours, MinuteAlarm, Minutes,
    RegAddr, Seconds, WeekdayAlarm, Weekdays, Years,
};

use crate::port::{AlarmTerm, HardwareAlarmPort};

/// Default 7-bit I2C address of the PCF8563.
pub const DEFAULT_ADDRESS: u8 = 0x51;

/// Error type for PCF8563 operations.
#[derive(Debug)]
pub enum Pcf8563Error<I2CE> {
    /// I2C bus error
    I2c(I2CE),
    /// `DateTime` conversion error
    DateTime(DateTimeError),
}

impl<I2CE> From<I2CE> for Pcf8563Error<I2CE> {
    fn from(e: I2CE) -> Self {
        Pcf8563Error::I2c(e)
    }
}

#[cfg(feature = "defmt")]
impl<I2CE: core::fmt::Debug> defmt::Format for Pcf8563Error<I2CE> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Pcf8563Error::I2c(e) => defmt::write!(f, "I2c({})", defmt::Debug2Format(e)),
            Pcf8563Error::DateTime(e) => defmt::write!(f, "DateTime({})", e),
        }
    }
}

/// PCF8563 Real-Time Clock driver.
pub struct Pcf8563<I2C: I2c> {
    i2c: I2C,
    address: u8,
    system_clock: Option<fn(NaiveDateTime)>,
}

impl<I2C: I2c> Pcf8563<I2C> {
    /// Creates a driver at the default address.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Creates a driver at `address`.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            system_clock: None,
        }
    }

    /// Sets the hook that receives the chip time on
    /// [`sync_to_system_clock`](HardwareAlarmPort::sync_to_system_clock).
    #[must_use]
    pub fn with_system_clock(mut self, set_time: fn(NaiveDateTime)) -> Self {
        self.system_clock = Some(set_time);
        self
    }

    /// Releases the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, reg: RegAddr) -> Result<u8, Pcf8563Error<I2C::Error>> {
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg as u8], &mut data)?;
        Ok(data[0])
    }

    fn write_register(&mut self, reg: RegAddr, value: u8) -> Result<(), Pcf8563Error<I2C::Error>> {
        self.i2c.write(self.address, &[reg as u8, value])?;
        Ok(())
    }

    /// Reads the Control/Status 2 register.
    pub fn control_status2(&mut self) -> Result<ControlStatus2, Pcf8563Error<I2C::Error>> {
        Ok(ControlStatus2::from(self.read_register(RegAddr::ControlStatus2)?))
    }

    /// Writes the Control/Status 2 register.
    pub fn set_control_status2(
        &mut self,
        value: ControlStatus2,
    ) -> Result<(), Pcf8563Error<I2C::Error>> {
        self.write_register(RegAddr::ControlStatus2, value.into())
    }

    /// Gets the current date and time from the device.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, Pcf8563Error<I2C::Error>> {
        let mut data = [0; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)?;
        RawDateTime::from(data)
            .into_datetime()
            .map_err(Pcf8563Error::DateTime)
    }

    /// Sets the current date and time on the device.
    pub fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), Pcf8563Error<I2C::Error>> {
        let raw = RawDateTime::from_datetime(datetime).map_err(Pcf8563Error::DateTime)?;
        let data: [u8; 7] = (&raw).into();
        self.i2c.write(
            self.address,
            &[
                RegAddr::Seconds as u8,
                data[0],
                data[1],
                data[2],
                data[3],
                data[4],
                data[5],
                data[6],
            ],
        )?;
        Ok(())
    }

    /// Writes the four alarm compare registers.
    pub fn set_alarm(&mut self, term: &AlarmTerm) -> Result<(), Pcf8563Error<I2C::Error>> {
        let data = alarm_registers(term).map_err(Pcf8563Error::DateTime)?;
        debug!(
            "pcf8563: alarm registers {:?} {:?} {:?} {:?}",
            data[0], data[1], data[2], data[3]
        );
        self.i2c.write(
            self.address,
            &[RegAddr::MinuteAlarm as u8, data[0], data[1], data[2], data[3]],
        )?;
        Ok(())
    }
}

/// Encodes `term` as the minute, hour, day and weekday alarm registers.
fn alarm_registers(term: &AlarmTerm) -> Result<[u8; 4], DateTimeError> {
    let mut minute = MinuteAlarm::default();
    match term.minute {
        Some(value) => {
            let (ones, tens) = make_bcd(u32::from(value), 59)?;
            minute.set_minutes(ones);
            minute.set_ten_minutes(tens);
        }
        None => minute.set_disabled(true),
    }

    let mut hour = HourAlarm::default();
    match term.hour {
        Some(value) => {
            let (ones, tens) = make_bcd(u32::from(value), 23)?;
            hour.set_hours(ones);
            hour.set_ten_hours(tens);
        }
        None => hour.set_disabled(true),
    }

    let mut day = DayAlarm::default();
    match term.day_of_month {
        Some(value) => {
            if value == 0 {
                return Err(DateTimeError::InvalidDateTime);
            }
            let (ones, tens) = make_bcd(u32::from(value), 31)?;
            day.set_days(ones);
            day.set_ten_days(tens);
        }
        None => day.set_disabled(true),
    }

    let mut weekday = WeekdayAlarm::default();
    match term.weekday {
        Some(value) if value <= 6 => weekday.set_weekday(value),
        Some(_) => return Err(DateTimeError::InvalidDateTime),
        None => weekday.set_disabled(true),
    }

    Ok([minute.into(), hour.into(), day.into(), weekday.into()])
}

impl<I2C: I2c> HardwareAlarmPort for Pcf8563<I2C> {
    type Error = Pcf8563Error<I2C::Error>;

    fn set_term(&mut self, term: &AlarmTerm) -> Result<(), Self::Error> {
        self.set_alarm(term)
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        let mut cs2 = self.control_status2()?;
        cs2.set_alarm_flag(false);
        cs2.set_alarm_interrupt_enable(true);
        self.set_control_status2(cs2)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        let mut cs2 = self.control_status2()?;
        cs2.set_alarm_interrupt_enable(false);
        self.set_control_status2(cs2)
    }

    fn read_datetime(&mut self) -> Result<NaiveDateTime, Self::Error> {
        self.datetime()
    }

    fn sync_to_system_clock(&mut self) -> Result<(), Self::Error> {
        let now = self.datetime()?;
        if let Some(set_time) = self.system_clock {
            set_time(now);
        }
        Ok(())
    }
}
