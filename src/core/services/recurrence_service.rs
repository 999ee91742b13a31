use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Bill, BillId};
use crate::errors::HouseholdError;

use super::ServiceResult;

pub const DEFAULT_HORIZON: u32 = 12;

/// Tracks which `(original, due date)` instances already exist.
#[derive(Debug, Clone, Default)]
pub struct InstanceIndex {
    seen: HashSet<(BillId, NaiveDate)>,
}

impl InstanceIndex {
    pub fn from_bills(bills: &[Bill]) -> Self {
        let seen = bills
            .iter()
            .filter_map(|bill| bill.parent_bill_id.map(|parent| (parent, bill.due_date)))
            .collect();
        Self { seen }
    }

    pub fn contains(&self, parent: BillId, due_date: NaiveDate) -> bool {
        self.seen.contains(&(parent, due_date))
    }

    /// Claims the pair, failing if an instance already holds it.
    pub fn reserve(&mut self, parent: BillId, due_date: NaiveDate) -> ServiceResult<()> {
        if self.seen.insert((parent, due_date)) {
            Ok(())
        } else {
            Err(HouseholdError::DuplicateInstance { parent, due_date })
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

pub struct RecurrenceService;

impl RecurrenceService {
    /// Builds up to `horizon` future instances of a recurring original.
    ///
    /// Only dates strictly after `reference` are materialised. Pairs already
    /// present in `index` are skipped, so repeated calls never duplicate.
    pub fn generate_instances(
        original: &Bill,
        horizon: u32,
        reference: NaiveDate,
        generated_at: DateTime<Utc>,
        index: &mut InstanceIndex,
    ) -> Vec<Bill> {
        if !original.is_recurring_original() {
            return Vec::new();
        }
        let mut instances = Vec::new();
        for step in 1..=horizon {
            let Some(due_date) = original.frequency.advance(original.due_date, step) else {
                break;
            };
            if due_date <= reference {
                continue;
            }
            // Already materialised pairs are skipped.
            if index.reserve(original.id, due_date).is_ok() {
                instances.push(original.instance_for(due_date, generated_at));
            }
        }
        tracing::debug!(
            bill = %original.id,
            name = %original.name,
            generated = instances.len(),
            "generated recurring instances"
        );
        instances
    }

    /// Generates instances for `original` and appends them to `bills`.
    /// Returns how many were added.
    pub fn generate_into(
        bills: &mut Vec<Bill>,
        original: &Bill,
        horizon: u32,
        reference: NaiveDate,
        generated_at: DateTime<Utc>,
    ) -> usize {
        let mut index = InstanceIndex::from_bills(bills);
        let instances =
            Self::generate_instances(original, horizon, reference, generated_at, &mut index);
        let added = instances.len();
        bills.extend(instances);
        added
    }
}
