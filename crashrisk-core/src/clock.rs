//! Wall-clock access for time-dependent analysis
//!
//! Nothing else in the crate reads the system time; callers pass a `Clock`.

use chrono::{Local, NaiveDateTime};

/// Source of the current local date and time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
