//! Clock capability and cooperative interval timers.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Clock abstracts access to the current timestamp so date math remains deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Real-time clock backed by the system time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    // Bills are due on the household's local calendar day.
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Pins the clock to noon UTC on `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(noon_utc(date))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.set(noon_utc(date));
    }

    pub fn advance(&self, by: Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(noon))
}

/// Fires at most once per interval when ticked by the owner's event loop.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    last_fired: Option<DateTime<Utc>>,
    enabled: bool,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            enabled: true,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_fired {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    /// Marks the timer as fired when due and reports whether it fired.
    pub fn fire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_due(now) {
            self.last_fired = Some(now);
            true
        } else {
            false
        }
    }

    pub fn mark_fired(&mut self, now: DateTime<Utc>) {
        self.last_fired = Some(now);
    }
}
