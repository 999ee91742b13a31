use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::HouseholdError;

/// Cadence on which a bill repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    #[default]
    Once,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Once,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn is_recurring(self) -> bool {
        self != Frequency::Once
    }

    /// Returns the `step`-th occurrence after `from`; one-off bills have none.
    ///
    /// Monthly steps are taken from the original date, so a bill due on the
    /// 31st lands on the last day of shorter months without drifting.
    pub fn advance(self, from: NaiveDate, step: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Once => None,
            Frequency::Weekly => from.checked_add_signed(Duration::days(7 * i64::from(step))),
            Frequency::Biweekly => from.checked_add_signed(Duration::days(14 * i64::from(step))),
            Frequency::Monthly => checked_shift_month(from, i32::try_from(step).ok()?),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Once => "One-time",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Every 2 weeks",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Compact cadence marker shown next to bill names.
    pub fn badge(self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Weekly => "7d",
            Frequency::Biweekly => "14d",
            Frequency::Monthly => "30d",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = HouseholdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "once" => Ok(Frequency::Once),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(HouseholdError::Configuration(format!(
                "unknown bill frequency `{other}` (expected once, weekly, biweekly or monthly)"
            ))),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = HouseholdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.as_str().to_string()
    }
}

/// Moves `date` by `months` calendar months, clamping the day to the target month's length.
/// Targets outside the representable calendar leave `date` unchanged.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    checked_shift_month(date, months).unwrap_or(date)
}

pub fn checked_shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = (date.year() * 12 + date.month0() as i32).checked_add(months)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last_current| last_current.day())
        .unwrap_or(28)
}
