use chrono::NaiveDate;

use crate::domain::{offset_containing, HouseholdState, Period};
use crate::errors::HouseholdError;

use super::ServiceResult;

pub struct PeriodService;

impl PeriodService {
    pub fn current_period(payday: Option<NaiveDate>, offset: i32) -> ServiceResult<Period> {
        let payday = payday.ok_or_else(|| {
            HouseholdError::Configuration("payday must be set before computing periods".into())
        })?;
        Period::anchored(payday, offset)
    }

    pub fn previous_period(payday: Option<NaiveDate>, offset: i32) -> ServiceResult<Period> {
        Self::current_period(payday, offset)?.previous().ok_or_else(|| {
            HouseholdError::Configuration(format!(
                "no period precedes offset {offset} in the supported date range"
            ))
        })
    }

    /// Period currently selected in `state`.
    pub fn period_for_state(state: &HouseholdState) -> ServiceResult<Period> {
        Self::current_period(state.payday, state.current_period_offset)
    }

    /// Moves the selected offset by `direction` and returns the newly selected
    /// period. The offset is left untouched when the target period cannot be built.
    pub fn navigate(state: &mut HouseholdState, direction: i32) -> ServiceResult<Period> {
        let offset = state.current_period_offset.saturating_add(direction);
        let period = Self::current_period(state.payday, offset)?;
        state.current_period_offset = offset;
        Ok(period)
    }

    /// Offset whose period contains `date`.
    pub fn offset_for_date(payday: Option<NaiveDate>, date: NaiveDate) -> ServiceResult<i32> {
        let payday = payday.ok_or_else(|| {
            HouseholdError::Configuration("payday must be set before computing periods".into())
        })?;
        Ok(offset_containing(payday, date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unset_payday_is_a_configuration_error() {
        let err = PeriodService::current_period(None, 0).unwrap_err();
        assert!(matches!(err, HouseholdError::Configuration(_)));
        assert!(PeriodService::previous_period(None, 3).is_err());
    }

    #[test]
    fn consecutive_offsets_are_fourteen_days_apart() {
        let payday = Some(date(2025, 1, 3));
        for offset in -3..3 {
            let current = PeriodService::current_period(payday, offset).unwrap();
            let next = PeriodService::current_period(payday, offset + 1).unwrap();
            assert_eq!(current.end - current.start, Duration::days(13));
            assert_eq!(next.start, current.start + Duration::days(14));
            assert_eq!(
                PeriodService::previous_period(payday, offset).unwrap(),
                PeriodService::current_period(payday, offset - 1).unwrap()
            );
        }
    }

    #[test]
    fn navigate_shifts_the_selected_offset() {
        let mut state = HouseholdState {
            payday: Some(date(2025, 1, 3)),
            ..HouseholdState::default()
        };
        assert_eq!(
            PeriodService::navigate(&mut state, 1).unwrap().start,
            date(2025, 1, 17)
        );
        let period = PeriodService::navigate(&mut state, -2).unwrap();
        assert_eq!(state.current_period_offset, -1);
        assert_eq!(period, PeriodService::period_for_state(&state).unwrap());
        assert_eq!(period.start, date(2024, 12, 20));
    }

    #[test]
    fn navigate_keeps_offset_when_target_is_out_of_range() {
        let mut state = HouseholdState {
            payday: Some(date(2025, 1, 3)),
            current_period_offset: 2,
            ..HouseholdState::default()
        };
        let err = PeriodService::navigate(&mut state, 7_000_000).unwrap_err();
        assert!(matches!(err, HouseholdError::Configuration(_)));
        assert_eq!(state.current_period_offset, 2);

        let mut unset = HouseholdState::default();
        assert!(PeriodService::navigate(&mut unset, 1).is_err());
        assert_eq!(unset.current_period_offset, 0);
    }

    #[test]
    fn offset_for_date_finds_containing_period() {
        let payday = Some(date(2025, 1, 3));
        assert_eq!(PeriodService::offset_for_date(payday, date(2025, 2, 1)).unwrap(), 2);
    }
}
