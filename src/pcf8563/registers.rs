//! Register definitions and bitfield structures for the PCF8563 RTC.
//!
//! Only the registers the alarm core touches are modelled: the second
//! control/status register, the time block and the alarm block.

use bitfield::bitfield;

/// Register addresses for the PCF8563 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Control/Status 1 register
    ControlStatus1 = 0x00,
    /// Control/Status 2 register (alarm/timer flags and interrupt enables)
    ControlStatus2 = 0x01,
    /// Seconds register (0-59) with clock integrity flag
    Seconds = 0x02,
    /// Minutes register (0-59)
    Minutes = 0x03,
    /// Hours register (0-23)
    Hours = 0x04,
    /// Day of month register (1-31)
    Days = 0x05,
    /// Day of week register (0-6)
    Weekdays = 0x06,
    /// Month register (1-12) with century flag
    CenturyMonths = 0x07,
    /// Year register (0-99)
    Years = 0x08,
    /// Alarm minute register
    MinuteAlarm = 0x09,
    /// Alarm hour register
    HourAlarm = 0x0A,
    /// Alarm day of month register
    DayAlarm = 0x0B,
    /// Alarm day of week register
    WeekdayAlarm = 0x0C,
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Control/Status 2 register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct ControlStatus2(u8);
    impl Debug;
    /// Timer interrupt pulse mode
    pub timer_pulse, set_timer_pulse: 4;
    /// Alarm flag, set by the chip on a match
    pub alarm_flag, set_alarm_flag: 3;
    /// Timer flag
    pub timer_flag, set_timer_flag: 2;
    /// Alarm interrupt enable
    pub alarm_interrupt_enable, set_alarm_interrupt_enable: 1;
    /// Timer interrupt enable
    pub timer_interrupt_enable, set_timer_interrupt_enable: 0;
}
from_register_u8!(ControlStatus2);

#[cfg(feature = "defmt")]
impl defmt::Format for ControlStatus2 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ControlStatus2(");
        if self.alarm_interrupt_enable() {
            defmt::write!(f, " AIE");
        }
        if self.alarm_flag() {
            defmt::write!(f, " AF");
        }
        if self.timer_interrupt_enable() {
            defmt::write!(f, " TIE");
        }
        if self.timer_flag() {
            defmt::write!(f, " TF");
        }
        defmt::write!(f, " )");
    }
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Voltage low: clock integrity is no longer guaranteed
    pub voltage_low, set_voltage_low: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

bitfield! {
    /// Hours register (0-23) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Tens place of hours (0-2)
    pub ten_hours, set_ten_hours: 5, 4;
    /// Ones place of hours (0-9)
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Day of month register (1-31) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Days(u8);
    impl Debug;
    /// Tens place of the day (0-3)
    pub ten_days, set_ten_days: 5, 4;
    /// Ones place of the day (0-9)
    pub days, set_days: 3, 0;
}
from_register_u8!(Days);

bitfield! {
    /// Day of week register (0=Sunday .. 6=Saturday).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Weekdays(u8);
    impl Debug;
    /// Day of week (0-6)
    pub weekday, set_weekday: 2, 0;
}
from_register_u8!(Weekdays);

bitfield! {
    /// Month register (1-12) with century flag and BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct CenturyMonths(u8);
    impl Debug;
    /// Century flag (set = 19xx, clear = 20xx)
    pub century, set_century: 7;
    /// Tens place of month (0-1)
    pub ten_month, set_ten_month: 4, 4;
    /// Ones place of month (0-9)
    pub month, set_month: 3, 0;
}
from_register_u8!(CenturyMonths);

bitfield! {
    /// Year register (0-99) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Years(u8);
    impl Debug;
    /// Tens place of year (0-9)
    pub ten_year, set_ten_year: 7, 4;
    /// Ones place of year (0-9)
    pub year, set_year: 3, 0;
}
from_register_u8!(Years);

// Alarm registers. AE set means the field is left out of the match.

bitfield! {
    /// Alarm minute register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct MinuteAlarm(u8);
    impl Debug;
    /// Alarm enable bit, active low
    pub disabled, set_disabled: 7;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(MinuteAlarm);

bitfield! {
    /// Alarm hour register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct HourAlarm(u8);
    impl Debug;
    /// Alarm enable bit, active low
    pub disabled, set_disabled: 7;
    /// Tens place of hours (0-2)
    pub ten_hours, set_ten_hours: 5, 4;
    /// Ones place of hours (0-9)
    pub hours, set_hours: 3, 0;
}
from_register_u8!(HourAlarm);

bitfield! {
    /// Alarm day of month register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct DayAlarm(u8);
    impl Debug;
    /// Alarm enable bit, active low
    pub disabled, set_disabled: 7;
    /// Tens place of the day (0-3)
    pub ten_days, set_ten_days: 5, 4;
    /// Ones place of the day (0-9)
    pub days, set_days: 3, 0;
}
from_register_u8!(DayAlarm);

bitfield! {
    /// Alarm day of week register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct WeekdayAlarm(u8);
    impl Debug;
    /// Alarm enable bit, active low
    pub disabled, set_disabled: 7;
    /// Day of week (0-6)
    pub weekday, set_weekday: 2, 0;
}
from_register_u8!(WeekdayAlarm);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_status2_bits() {
        let mut cs2 = ControlStatus2::default();
        cs2.set_alarm_interrupt_enable(true);
        assert_eq!(u8::from(cs2), 0b0000_0010);
        cs2.set_alarm_flag(true);
        assert_eq!(u8::from(cs2), 0b0000_1010);

        let cs2 = ControlStatus2::from(0b0001_1101);
        assert!(cs2.timer_pulse());
        assert!(cs2.alarm_flag());
        assert!(cs2.timer_flag());
        assert!(!cs2.alarm_interrupt_enable());
        assert!(cs2.timer_interrupt_enable());
    }

    #[test]
    fn test_seconds_voltage_low() {
        let seconds = Seconds::from(0xD9);
        assert!(seconds.voltage_low());
        assert_eq!(seconds.ten_seconds(), 5);
        assert_eq!(seconds.seconds(), 9);
    }

    #[test]
    fn test_century_months() {
        let months = CenturyMonths::from(0x92);
        assert!(months.century());
        assert_eq!(months.ten_month(), 1);
        assert_eq!(months.month(), 2);
    }

    #[test]
    fn test_alarm_disabled_bit() {
        let minute = MinuteAlarm::from(0x80);
        assert!(minute.disabled());
        assert_eq!(minute.minutes(), 0);

        let mut hour = HourAlarm::default();
        hour.set_ten_hours(2);
        hour.set_hours(3);
        assert!(!hour.disabled());
        assert_eq!(u8::from(hour), 0x23);

        let day = DayAlarm::from(0x31);
        assert_eq!(day.ten_days(), 3);
        assert_eq!(day.days(), 1);

        let weekday = WeekdayAlarm::from(0x86);
        assert!(weekday.disabled());
        assert_eq!(weekday.weekday(), 6);
    }
}
