use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{wire, Bill, BillId, Frequency};

/// Display-only household preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub household_name: String,
    #[serde(default)]
    pub partner1: String,
    #[serde(default)]
    pub partner2: String,
    #[serde(default = "Settings::default_notifications")]
    pub notifications: bool,
}

impl Settings {
    fn default_notifications() -> bool {
        true
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            household_name: String::new(),
            partner1: String::new(),
            partner2: String::new(),
            notifications: Self::default_notifications(),
        }
    }
}

/// Everything the household persists: pay cycle anchor, income, bills and view offset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdState {
    #[serde(default, with = "wire::option_iso_date")]
    pub payday: Option<NaiveDate>,
    #[serde(default)]
    pub biweekly_income: Decimal,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub current_period_offset: i32,
    #[serde(default)]
    pub settings: Settings,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

impl HouseholdState {
    /// Starter household shown on first launch or when stored data is unreadable.
    pub fn sample(today: NaiveDate, now: DateTime<Utc>) -> Self {
        let payday = most_recent_friday(today);
        let monthly = |name: &str, amount: i64, days: i64, category: &str, paid: bool| {
            let mut bill = Bill::new(
                name,
                Decimal::from(amount),
                payday + Duration::days(days),
                category,
                Frequency::Monthly,
                now,
            );
            bill.is_paid = paid;
            bill
        };
        Self {
            payday: Some(payday),
            biweekly_income: Decimal::from(2100),
            bills: vec![
                monthly("Rent", 1200, 11, "Housing", false),
                monthly("Car Insurance", 127, -2, "Transportation", true),
                monthly("Phone Bill", 85, 5, "Utilities", false),
                monthly("Utilities", 165, 8, "Utilities", false),
            ],
            current_period_offset: 0,
            settings: Settings {
                household_name: "The Johnson Family".into(),
                partner1: "You".into(),
                partner2: "Your Partner".into(),
                notifications: true,
            },
            last_modified: None,
        }
    }

    pub fn bill(&self, id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    pub fn bill_mut(&mut self, id: BillId) -> Option<&mut Bill> {
        self.bills.iter_mut().find(|bill| bill.id == id)
    }

    /// Recurring bills entered by the user, excluding generated instances.
    pub fn recurring_originals(&self) -> impl Iterator<Item = &Bill> {
        self.bills.iter().filter(|bill| bill.is_recurring_original())
    }

    pub fn instances_of(&self, parent: BillId) -> impl Iterator<Item = &Bill> {
        self.bills
            .iter()
            .filter(move |bill| bill.parent_bill_id == Some(parent))
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = Some(now);
    }
}

fn most_recent_friday(today: NaiveDate) -> NaiveDate {
    let since_friday = (i64::from(today.weekday().num_days_from_monday()) - 4).rem_euclid(7);
    today - Duration::days(since_friday)
}
