use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Bill, Period};

/// Totals for one pay period.
///
/// `available_cash` only subtracts bills already paid, while
/// `projected_balance` subtracts every bill due in the period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CashFlow {
    pub income: Decimal,
    pub total_bills: Decimal,
    pub paid_bills: Decimal,
    pub unpaid_bills: Decimal,
    pub available_cash: Decimal,
    pub projected_balance: Decimal,
}

/// Where a bill stands relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DueStatus {
    Paid,
    Overdue { days: i64 },
    DueToday,
    DueTomorrow,
    DueSoon { days: i64 },
    Upcoming,
}

impl DueStatus {
    pub fn classify(bill: &Bill, today: NaiveDate, due_soon_days: i64) -> DueStatus {
        if bill.is_paid {
            return DueStatus::Paid;
        }
        let days = (bill.due_date - today).num_days();
        match days {
            d if d < 0 => DueStatus::Overdue { days: -d },
            0 => DueStatus::DueToday,
            1 => DueStatus::DueTomorrow,
            d if d <= due_soon_days => DueStatus::DueSoon { days: d },
            _ => DueStatus::Upcoming,
        }
    }

    /// Unpaid and either overdue or due within the soon window.
    pub fn needs_attention(self) -> bool {
        !matches!(self, DueStatus::Paid | DueStatus::Upcoming)
    }
}

pub struct CashFlowService;

impl CashFlowService {
    /// Bills due inside `period`, in their original order.
    pub fn bills_in_period<'a>(bills: &'a [Bill], period: &Period) -> Vec<&'a Bill> {
        bills
            .iter()
            .filter(|bill| period.contains(bill.due_date))
            .collect()
    }

    pub fn cash_flow(bills: &[Bill], period: &Period, income: Decimal) -> CashFlow {
        let (paid_bills, unpaid_bills) = Self::bills_in_period(bills, period).into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(paid, unpaid), bill| {
                if bill.is_paid {
                    (paid + bill.amount, unpaid)
                } else {
                    (paid, unpaid + bill.amount)
                }
            },
        );
        let total_bills = paid_bills + unpaid_bills;
        CashFlow {
            income,
            total_bills,
            paid_bills,
            unpaid_bills,
            available_cash: income - paid_bills,
            projected_balance: income - total_bills,
        }
    }
}
