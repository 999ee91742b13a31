use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{shift_month, Bill, HouseholdState};

use super::recurrence_service::{InstanceIndex, RecurrenceService, DEFAULT_HORIZON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenancePolicy {
    pub prune_after_months: u32,
    pub replenish_below: usize,
    pub horizon: u32,
}

impl Default for MaintenancePolicy {
    fn default() -> Self {
        Self {
            prune_after_months: 6,
            replenish_below: 6,
            horizon: DEFAULT_HORIZON,
        }
    }
}

/// What one sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub pruned: usize,
    pub generated: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.pruned == 0 && self.generated == 0
    }
}

pub struct MaintenanceService;

impl MaintenanceService {
    /// Paid bills due before this date are dropped.
    pub fn prune_cutoff(today: NaiveDate, policy: &MaintenancePolicy) -> NaiveDate {
        let months = i32::try_from(policy.prune_after_months).unwrap_or(i32::MAX);
        shift_month(today, -months)
    }

    pub fn prune(bills: &mut Vec<Bill>, cutoff: NaiveDate) -> usize {
        let before = bills.len();
        bills.retain(|bill| !(bill.is_paid && bill.due_date < cutoff));
        before - bills.len()
    }

    pub fn future_instance_count(bills: &[Bill], parent: &Bill, today: NaiveDate) -> usize {
        bills
            .iter()
            .filter(|bill| bill.parent_bill_id == Some(parent.id) && bill.due_date > today)
            .count()
    }

    /// Tops up every recurring original that has run low on future instances.
    pub fn replenish(
        bills: &mut Vec<Bill>,
        today: NaiveDate,
        generated_at: DateTime<Utc>,
        policy: &MaintenancePolicy,
    ) -> usize {
        let current: &[Bill] = bills;
        let low: Vec<Bill> = current
            .iter()
            .filter(|bill| bill.is_recurring_original())
            .filter(|bill| {
                Self::future_instance_count(current, bill, today) < policy.replenish_below
            })
            .cloned()
            .collect();
        if low.is_empty() {
            return 0;
        }
        let mut index = InstanceIndex::from_bills(bills);
        let mut generated = 0;
        for original in &low {
            let instances = RecurrenceService::generate_instances(
                original,
                policy.horizon,
                today,
                generated_at,
                &mut index,
            );
            generated += instances.len();
            bills.extend(instances);
        }
        generated
    }

    /// Prunes stale paid bills then replenishes recurring originals.
    pub fn sweep(
        state: &mut HouseholdState,
        today: NaiveDate,
        generated_at: DateTime<Utc>,
        policy: &MaintenancePolicy,
    ) -> SweepReport {
        let cutoff = Self::prune_cutoff(today, policy);
        let pruned = Self::prune(&mut state.bills, cutoff);
        let generated = Self::replenish(&mut state.bills, today, generated_at, policy);
        let report = SweepReport { pruned, generated };
        tracing::info!(pruned, generated, %today, "maintenance sweep finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn bill(due: NaiveDate, paid: bool, frequency: Frequency) -> Bill {
        let mut bill = Bill::new("Water", Decimal::from(60), due, "Utilities", frequency, stamp());
        bill.is_paid = paid;
        bill
    }

    #[test]
    fn cutoff_uses_calendar_months() {
        let policy = MaintenancePolicy::default();
        assert_eq!(
            MaintenanceService::prune_cutoff(date(2025, 8, 31), &policy),
            date(2025, 2, 28)
        );
    }

    #[test]
    fn prunes_only_old_paid_bills() {
        let today = date(2025, 8, 15);
        let mut bills = vec![
            bill(date(2025, 1, 15), true, Frequency::Once),
            bill(date(2025, 6, 15), true, Frequency::Once),
            bill(date(2025, 1, 10), false, Frequency::Once),
        ];
        let cutoff = MaintenanceService::prune_cutoff(today, &MaintenancePolicy::default());
        assert_eq!(MaintenanceService::prune(&mut bills, cutoff), 1);
        assert_eq!(bills.len(), 2);
        assert!(bills.iter().all(|b| b.due_date != date(2025, 1, 15)));
    }

    #[test]
    fn replenish_tops_up_low_originals() {
        let today = date(2025, 6, 1);
        let original = bill(date(2025, 5, 20), false, Frequency::Weekly);
        let mut bills = vec![original.clone()];
        let policy = MaintenancePolicy::default();
        let generated = MaintenanceService::replenish(&mut bills, today, stamp(), &policy);
        assert!(generated > 0);
        assert!(MaintenanceService::future_instance_count(&bills, &original, today) >= 6);
        assert!(bills
            .iter()
            .filter(|b| b.parent_bill_id.is_some())
            .all(|b| b.due_date > today));
    }

    #[test]
    fn second_sweep_is_empty() {
        let today = date(2025, 8, 15);
        let mut state = HouseholdState {
            bills: vec![
                bill(date(2025, 1, 15), true, Frequency::Once),
                bill(date(2025, 8, 1), false, Frequency::Monthly),
            ],
            ..HouseholdState::default()
        };
        let policy = MaintenancePolicy::default();
        let first = MaintenanceService::sweep(&mut state, today, stamp(), &policy);
        assert!(!first.is_empty());
        let snapshot = state.clone();
        let second = MaintenanceService::sweep(&mut state, today, stamp(), &policy);
        assert!(second.is_empty());
        assert_eq!(state, snapshot);
    }
}
