use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{HouseholdError, Result};

pub const PERIOD_LENGTH_DAYS: i64 = 14;

/// A 14-day pay period, both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Period starting `offset` whole periods after `payday`.
    ///
    /// Fails with `Configuration` when the period would fall outside the
    /// representable calendar.
    pub fn anchored(payday: NaiveDate, offset: i32) -> Result<Self> {
        Self::shifted_from(payday, i64::from(offset) * PERIOD_LENGTH_DAYS).ok_or_else(|| {
            HouseholdError::Configuration(format!(
                "period offset {offset} is outside the supported date range"
            ))
        })
    }

    fn shifted_from(start: NaiveDate, days: i64) -> Option<Self> {
        let start = start.checked_add_signed(Duration::try_days(days)?)?;
        let end = start.checked_add_signed(Duration::days(PERIOD_LENGTH_DAYS - 1))?;
        Some(Self { start, end })
    }

    /// The period before this one, or `None` at the start of the calendar.
    pub fn previous(&self) -> Option<Self> {
        Self::shifted_from(self.start, -PERIOD_LENGTH_DAYS)
    }

    pub fn next(&self) -> Option<Self> {
        Self::shifted_from(self.start, PERIOD_LENGTH_DAYS)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

/// True when `date` is a payday: on or after the anchor and a whole number of periods away.
pub fn is_payday(payday: NaiveDate, date: NaiveDate) -> bool {
    let diff = (date - payday).num_days();
    diff >= 0 && diff % PERIOD_LENGTH_DAYS == 0
}

pub fn paydays_between(payday: NaiveDate, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    let first = if start <= payday {
        Some(payday)
    } else {
        let diff = (start - payday).num_days();
        let steps = (diff + PERIOD_LENGTH_DAYS - 1) / PERIOD_LENGTH_DAYS;
        payday.checked_add_signed(Duration::days(steps * PERIOD_LENGTH_DAYS))
    };
    let step = Duration::days(PERIOD_LENGTH_DAYS);
    std::iter::successors(first, |current| current.checked_add_signed(step))
        .take_while(|current| *current <= end)
        .collect()
}

/// Offset of the period containing `date`, counting from the anchor payday.
pub fn offset_containing(payday: NaiveDate, date: NaiveDate) -> i32 {
    let steps = (date - payday).num_days().div_euclid(PERIOD_LENGTH_DAYS);
    i32::try_from(steps).unwrap_or(if steps < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn anchored_period_spans_fourteen_days() {
        let period = Period::anchored(date(2025, 1, 3), 0).unwrap();
        assert_eq!(period.start, date(2025, 1, 3));
        assert_eq!(period.end, date(2025, 1, 16));
        assert_eq!(period.days().count(), 14);
        assert!(period.contains(date(2025, 1, 16)));
        assert!(!period.contains(date(2025, 1, 17)));
    }

    #[test]
    fn previous_matches_negative_offset() {
        let payday = date(2025, 1, 3);
        for offset in -5..5 {
            let period = Period::anchored(payday, offset).unwrap();
            assert_eq!(period.previous(), Period::anchored(payday, offset - 1).ok());
            assert_eq!(period.next(), Period::anchored(payday, offset + 1).ok());
        }
    }

    #[test]
    fn offsets_past_the_calendar_are_rejected() {
        let payday = date(2025, 1, 3);
        for offset in [7_000_000, -7_000_000, i32::MAX, i32::MIN] {
            let err = Period::anchored(payday, offset).unwrap_err();
            assert!(matches!(err, HouseholdError::Configuration(_)));
        }
        let last = Period::anchored(NaiveDate::MAX - Duration::days(13), 0).unwrap();
        assert_eq!(last.end, NaiveDate::MAX);
        assert_eq!(last.next(), None);
        assert!(Period::anchored(NaiveDate::MAX - Duration::days(12), 0).is_err());
    }

    #[test]
    fn paydays_repeat_every_two_weeks_from_anchor() {
        let payday = date(2025, 1, 3);
        assert!(is_payday(payday, date(2025, 1, 17)));
        assert!(!is_payday(payday, date(2025, 1, 10)));
        assert!(!is_payday(payday, date(2024, 12, 20)));
        assert_eq!(
            paydays_between(payday, date(2025, 1, 10), date(2025, 2, 14)),
            vec![date(2025, 1, 17), date(2025, 1, 31), date(2025, 2, 14)]
        );
        assert!(paydays_between(payday, date(2025, 1, 4), date(2025, 1, 16)).is_empty());
    }

    #[test]
    fn offset_containing_rounds_toward_earlier_periods() {
        let payday = date(2025, 1, 3);
        assert_eq!(offset_containing(payday, date(2025, 1, 16)), 0);
        assert_eq!(offset_containing(payday, date(2025, 1, 17)), 1);
        assert_eq!(offset_containing(payday, date(2025, 1, 2)), -1);
    }
}
