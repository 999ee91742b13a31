use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{is_payday, paydays_between, Bill, HouseholdState, Period};

use super::cash_flow_service::{CashFlow, CashFlowService, DueStatus};
use super::period_service::PeriodService;
use super::ServiceResult;

pub const CALENDAR_CELLS: usize = 42;
/// Longest look-ahead `upcoming_events` will scan.
pub const MAX_EVENT_WINDOW_DAYS: i64 = 366;

#[derive(Debug, Clone)]
pub struct BillView<'a> {
    pub bill: &'a Bill,
    pub status: DueStatus,
}

/// Dashboard for the selected period, compared against the one before it.
#[derive(Debug, Clone)]
pub struct Overview<'a> {
    pub period: Period,
    pub cash_flow: CashFlow,
    pub previous_cash_flow: CashFlow,
    pub balance_change: Decimal,
    pub bills: Vec<BillView<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Bill,
    Payday,
}

/// A dated cash movement. Bills carry negative amounts, paydays positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashEvent {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub in_period: bool,
    pub is_today: bool,
    pub is_payday: bool,
    pub bills: Vec<&'a Bill>,
}

pub struct OverviewService;

impl OverviewService {
    pub fn overview(
        state: &HouseholdState,
        today: NaiveDate,
        due_soon_days: i64,
    ) -> ServiceResult<Overview<'_>> {
        let period = PeriodService::period_for_state(state)?;
        let previous =
            PeriodService::previous_period(state.payday, state.current_period_offset)?;
        let cash_flow = CashFlowService::cash_flow(&state.bills, &period, state.biweekly_income);
        let previous_cash_flow =
            CashFlowService::cash_flow(&state.bills, &previous, state.biweekly_income);
        let bills = CashFlowService::bills_in_period(&state.bills, &period)
            .into_iter()
            .map(|bill| BillView {
                bill,
                status: DueStatus::classify(bill, today, due_soon_days),
            })
            .collect();
        Ok(Overview {
            period,
            cash_flow,
            previous_cash_flow,
            balance_change: cash_flow.available_cash - previous_cash_flow.available_cash,
            bills,
        })
    }

    /// Bills and paydays falling within `window_days` of today, oldest first.
    /// The window is clamped to `0..=MAX_EVENT_WINDOW_DAYS`.
    pub fn upcoming_events(
        state: &HouseholdState,
        today: NaiveDate,
        window_days: i64,
    ) -> Vec<CashEvent> {
        let window = Duration::days(window_days.clamp(0, MAX_EVENT_WINDOW_DAYS));
        let until = today.checked_add_signed(window).unwrap_or(NaiveDate::MAX);
        let mut events: Vec<CashEvent> = state
            .bills
            .iter()
            .filter(|bill| today <= bill.due_date && bill.due_date <= until)
            .map(|bill| CashEvent {
                date: bill.due_date,
                kind: EventKind::Bill,
                name: bill.name.clone(),
                amount: -bill.amount,
            })
            .collect();
        if let Some(payday) = state.payday {
            events.extend(
                paydays_between(payday, today, until)
                    .into_iter()
                    .map(|date| CashEvent {
                        date,
                        kind: EventKind::Payday,
                        name: "Payday".into(),
                        amount: state.biweekly_income,
                    }),
            );
        }
        events.sort_by_key(|event| event.date);
        events
    }

    /// Six-week grid starting on the Sunday on or before the first of the
    /// month containing the period start.
    pub fn calendar_month<'a>(
        state: &'a HouseholdState,
        period: &Period,
        today: NaiveDate,
    ) -> Vec<CalendarDay<'a>> {
        let first = period.start.with_day(1).unwrap_or(period.start);
        let lead = i64::from(first.weekday().num_days_from_sunday());
        let grid_start = first.checked_sub_signed(Duration::days(lead)).unwrap_or(first);
        grid_start
            .iter_days()
            .take(CALENDAR_CELLS)
            .map(|date| CalendarDay {
                date,
                in_month: date.month() == first.month() && date.year() == first.year(),
                in_period: period.contains(date),
                is_today: date == today,
                is_payday: state.payday.is_some_and(|payday| is_payday(payday, date)),
                bills: state
                    .bills
                    .iter()
                    .filter(|bill| bill.due_date == date)
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;
    use chrono::{TimeZone, Utc, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(name: &str, amount: i64, due: NaiveDate, paid: bool) -> Bill {
        let mut bill = Bill::new(
            name,
            Decimal::from(amount),
            due,
            "General",
            Frequency::Once,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        bill.is_paid = paid;
        bill
    }

    fn state() -> HouseholdState {
        HouseholdState {
            payday: Some(date(2025, 1, 3)),
            biweekly_income: Decimal::from(2000),
            bills: vec![
                bill("Gym", 30, date(2024, 12, 27), true),
                bill("Phone", 50, date(2025, 1, 10), false),
                bill("Water", 20, date(2025, 1, 5), true),
            ],
            ..HouseholdState::default()
        }
    }

    #[test]
    fn overview_compares_with_previous_period() {
        let state = state();
        let overview = OverviewService::overview(&state, date(2025, 1, 8), 3).unwrap();
        assert_eq!(overview.period.start, date(2025, 1, 3));
        assert_eq!(overview.cash_flow.available_cash, Decimal::from(1980));
        assert_eq!(overview.previous_cash_flow.available_cash, Decimal::from(1970));
        assert_eq!(overview.balance_change, Decimal::from(10));
        assert_eq!(overview.bills.len(), 2);
        assert_eq!(overview.bills[0].status, DueStatus::DueSoon { days: 2 });
        assert_eq!(overview.bills[1].status, DueStatus::Paid);
    }

    #[test]
    fn overview_requires_a_payday() {
        let state = HouseholdState::default();
        assert!(OverviewService::overview(&state, date(2025, 1, 8), 3).is_err());
    }

    #[test]
    fn upcoming_events_merge_bills_and_paydays() {
        let state = state();
        let events = OverviewService::upcoming_events(&state, date(2025, 1, 10), 7);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Bill);
        assert_eq!(events[0].amount, Decimal::from(-50));
        assert_eq!(events[1].kind, EventKind::Payday);
        assert_eq!(events[1].date, date(2025, 1, 17));
        assert_eq!(events[1].amount, Decimal::from(2000));
    }

    #[test]
    fn calendar_covers_six_weeks_from_sunday() {
        let state = state();
        let period = Period::anchored(date(2025, 1, 3), 0).unwrap();
        let days = OverviewService::calendar_month(&state, &period, date(2025, 1, 8));
        assert_eq!(days.len(), CALENDAR_CELLS);
        assert_eq!(days[0].date, date(2024, 12, 29));
        assert_eq!(days[0].date.weekday(), Weekday::Sun);
        assert!(!days[0].in_month);
        let jan3 = days.iter().find(|d| d.date == date(2025, 1, 3)).unwrap();
        assert!(jan3.is_payday && jan3.in_period && jan3.in_month);
        let jan10 = days.iter().find(|d| d.date == date(2025, 1, 10)).unwrap();
        assert_eq!(jan10.bills.len(), 1);
        assert!(days.iter().filter(|d| d.is_today).count() == 1);
    }

    #[test]
    fn oversized_event_window_is_clamped() {
        let state = state();
        let today = date(2025, 1, 10);
        let events = OverviewService::upcoming_events(&state, today, 100_000_000);
        assert_eq!(
            events,
            OverviewService::upcoming_events(&state, today, MAX_EVENT_WINDOW_DAYS)
        );
        assert_eq!(events[0].name, "Phone");
        // 2025-01-17 through 2026-01-02, every 14 days.
        let paydays = events.iter().filter(|e| e.kind == EventKind::Payday).count();
        assert_eq!(paydays, 26);
        assert!(OverviewService::upcoming_events(&state, NaiveDate::MAX, i64::MAX).len() <= 1);
    }

    #[test]
    fn overview_rejects_offsets_past_the_calendar() {
        let mut state = state();
        state.current_period_offset = i32::MAX;
        let err = OverviewService::overview(&state, date(2025, 1, 8), 3).unwrap_err();
        assert!(matches!(err, crate::errors::HouseholdError::Configuration(_)));
    }
}
