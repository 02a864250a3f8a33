#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use rtc_alarm::{
    AlarmConfig, AlarmTerm, ConfigLoadError, ConfigStore, EventFlags, HardwareAlarmPort,
    PersistenceWriteError, PowerManagement,
};

/// `day` counts from Sunday 2024-03-10.
pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10 + day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCall {
    SetTerm(AlarmTerm),
    Enable,
    Disable,
    Sync,
    ReadDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakePortError;

/// Alarm chip double recording every call.
pub struct FakePort {
    pub now: NaiveDateTime,
    pub calls: Vec<PortCall>,
    pub fail_read: bool,
    pub fail_writes: bool,
}

impl FakePort {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            calls: Vec::new(),
            fail_read: false,
            fail_writes: false,
        }
    }

    pub fn terms(&self) -> Vec<AlarmTerm> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PortCall::SetTerm(term) => Some(*term),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: PortCall) -> usize {
        self.calls.iter().filter(|call| **call == wanted).count()
    }

    fn write(&mut self, call: PortCall) -> Result<(), FakePortError> {
        self.calls.push(call);
        if self.fail_writes {
            Err(FakePortError)
        } else {
            Ok(())
        }
    }
}

impl HardwareAlarmPort for FakePort {
    type Error = FakePortError;

    fn set_term(&mut self, term: &AlarmTerm) -> Result<(), Self::Error> {
        self.write(PortCall::SetTerm(*term))
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.write(PortCall::Enable)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.write(PortCall::Disable)
    }

    fn read_datetime(&mut self) -> Result<NaiveDateTime, Self::Error> {
        self.calls.push(PortCall::ReadDateTime);
        if self.fail_read {
            Err(FakePortError)
        } else {
            Ok(self.now)
        }
    }

    fn sync_to_system_clock(&mut self) -> Result<(), Self::Error> {
        self.write(PortCall::Sync)
    }
}

#[derive(Default)]
pub struct FakePower {
    pub standby: Cell<bool>,
    pub wakeups: Cell<u32>,
}

impl PowerManagement for FakePower {
    fn is_entering_standby(&self) -> bool {
        self.standby.get()
    }

    fn request_wakeup(&self) {
        self.wakeups.set(self.wakeups.get() + 1);
    }
}

/// Store double with scripted load result and failing writes.
pub struct ScriptedStore {
    pub load_result: Result<AlarmConfig, ConfigLoadError>,
    pub fail_save: bool,
    pub saved: Vec<AlarmConfig>,
}

impl ScriptedStore {
    pub fn loading(load_result: Result<AlarmConfig, ConfigLoadError>) -> Self {
        Self {
            load_result,
            fail_save: false,
            saved: Vec::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            load_result: Err(ConfigLoadError::Storage),
            fail_save: true,
            saved: Vec::new(),
        }
    }
}

impl ConfigStore for ScriptedStore {
    fn load(&mut self) -> Result<AlarmConfig, ConfigLoadError> {
        self.load_result
    }

    fn save(&mut self, config: &AlarmConfig) -> Result<(), PersistenceWriteError> {
        if self.fail_save {
            return Err(PersistenceWriteError::Storage);
        }
        self.saved.push(*config);
        Ok(())
    }
}

/// Shared log of dispatched events.
pub type EventLog = Rc<RefCell<Vec<EventFlags>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &EventLog, event: EventFlags) -> usize {
    log.borrow().iter().filter(|e| **e == event).count()
}
