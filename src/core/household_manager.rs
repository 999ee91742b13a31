use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::Config;
use crate::core::services::{
    CalendarDay, CashEvent, CashFlow, CashFlowService, MaintenanceService, Overview,
    OverviewService, PeriodService, RecurrenceService, SweepReport,
};
use crate::domain::{Bill, BillId, Frequency, HouseholdState, Period};
use crate::errors::{HouseholdError, Result};
use crate::storage::StorageBackend;
use crate::sync::{self, BroadcastChannel, ShareService, SyncEnvelope, CLOUD_BACKUP_KEY};
use crate::time::{Clock, IntervalTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message for the user that does not interrupt the operation that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// User-entered bill before it is assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category: String,
    pub frequency: Frequency,
}

/// Partial settings edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub household_name: Option<String>,
    pub partner1: Option<String>,
    pub partner2: Option<String>,
    pub biweekly_income: Option<Decimal>,
    pub payday: Option<NaiveDate>,
    pub notifications: Option<bool>,
}

/// Sole owner of mutable household state. Every mutation is saved and then
/// published to peers.
pub struct HouseholdManager {
    state: HouseholdState,
    storage: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    broadcast: Box<dyn BroadcastChannel>,
    config: Config,
    device_id: String,
    realtime: IntervalTimer,
    maintenance: IntervalTimer,
    notices: Vec<Notice>,
}

impl HouseholdManager {
    /// Loads persisted state, substituting the sample household when nothing
    /// usable is stored. Never fails; problems surface as notices.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
        broadcast: Box<dyn BroadcastChannel>,
        config: Config,
    ) -> Self {
        let mut notices = Vec::new();
        let device_id = match sync::device_id(storage.as_ref()) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(error = %err, "device id unavailable; using a temporary one");
                notices.push(Notice::warning(format!(
                    "Could not store a device id ({err}); sync will use a temporary one."
                )));
                format!("device-{}", uuid::Uuid::new_v4().simple())
            }
        };

        // `None` means the sample household is used; the flag says whether it
        // may replace what is on disk.
        let (loaded, persist_sample) = match storage.load() {
            Ok(Some(state)) => {
                tracing::info!(bills = state.bills.len(), "household loaded");
                (Some(state), false)
            }
            Ok(None) => {
                tracing::info!("no saved household; starting from sample data");
                notices.push(Notice::info(
                    "Welcome! A sample household was created to get you started.",
                ));
                (None, true)
            }
            Err(err) if err.is_recoverable_by_default() => {
                tracing::warn!(error = %err, "saved household unreadable; substituting sample data");
                notices.push(Notice::warning(format!(
                    "Saved data could not be read ({err}). Sample data was loaded instead."
                )));
                (None, true)
            }
            Err(err) => {
                tracing::warn!(error = %err, "household storage unavailable; saved data left untouched");
                notices.push(Notice::warning(format!(
                    "Saved data could not be loaded ({err}). Sample data is shown and the saved copy was not changed."
                )));
                (None, false)
            }
        };

        let state = match loaded {
            Some(state) => state,
            None => {
                let sample = HouseholdState::sample(clock.today(), clock.now());
                if persist_sample {
                    if let Err(err) = storage.save(&sample) {
                        tracing::warn!(error = %err, "failed to persist sample household");
                        notices.push(Notice::warning(format!(
                            "Sample data could not be saved ({err})."
                        )));
                    }
                }
                sample
            }
        };

        let realtime = IntervalTimer::new(config.sync_interval());
        let maintenance = IntervalTimer::new(config.maintenance_interval());
        Self {
            state,
            storage,
            clock,
            broadcast,
            config,
            device_id,
            realtime,
            maintenance,
            notices,
        }
    }

    pub fn state(&self) -> &HouseholdState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ---- derived views ----

    pub fn current_period(&self) -> Result<Period> {
        PeriodService::period_for_state(&self.state)
    }

    pub fn previous_period(&self) -> Result<Period> {
        PeriodService::previous_period(self.state.payday, self.state.current_period_offset)
    }

    pub fn cash_flow(&self) -> Result<CashFlow> {
        let period = self.current_period()?;
        Ok(CashFlowService::cash_flow(
            &self.state.bills,
            &period,
            self.state.biweekly_income,
        ))
    }

    pub fn bills_in_current_period(&self) -> Result<Vec<&Bill>> {
        let period = self.current_period()?;
        Ok(CashFlowService::bills_in_period(&self.state.bills, &period))
    }

    pub fn overview(&self) -> Result<Overview<'_>> {
        OverviewService::overview(&self.state, self.clock.today(), self.config.due_soon_days)
    }

    pub fn upcoming_events(&self) -> Vec<CashEvent> {
        OverviewService::upcoming_events(
            &self.state,
            self.clock.today(),
            self.config.upcoming_window_days,
        )
    }

    pub fn calendar(&self) -> Result<Vec<CalendarDay<'_>>> {
        let period = self.current_period()?;
        Ok(OverviewService::calendar_month(
            &self.state,
            &period,
            self.clock.today(),
        ))
    }

    // ---- mutations ----

    pub fn add_bill(&mut self, new_bill: NewBill) -> Result<BillId> {
        let name = new_bill.name.trim();
        if name.is_empty() {
            return Err(HouseholdError::InvalidInput("bill name is required".into()));
        }
        if new_bill.amount.is_sign_negative() && !new_bill.amount.is_zero() {
            return Err(HouseholdError::InvalidInput(format!(
                "bill amount must not be negative (got {})",
                new_bill.amount
            )));
        }
        let now = self.clock.now();
        let bill = Bill::new(
            name,
            new_bill.amount,
            new_bill.due_date,
            new_bill.category.trim(),
            new_bill.frequency,
            now,
        );
        let id = bill.id;
        let horizon = self.config.horizon_count;
        let today = self.clock.today();
        let generated = self.transact(|state| {
            state.bills.push(bill.clone());
            Ok(RecurrenceService::generate_into(
                &mut state.bills,
                &bill,
                horizon,
                today,
                now,
            ))
        })?;
        tracing::info!(bill = %id, name = %bill.name, generated, "bill added");
        Ok(id)
    }

    /// Flips the paid flag and returns the new value.
    pub fn toggle_paid(&mut self, id: BillId) -> Result<bool> {
        let paid = self.transact(|state| {
            state
                .bill_mut(id)
                .map(Bill::toggle_paid)
                .ok_or(HouseholdError::BillNotFound(id))
        })?;
        tracing::info!(bill = %id, paid, "bill paid flag toggled");
        Ok(paid)
    }

    /// Resolves a full id or a unique leading fragment of one.
    pub fn find_bill_by_prefix(&self, prefix: &str) -> Result<BillId> {
        let needle = prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Err(HouseholdError::InvalidInput("bill id is required".into()));
        }
        let compact = needle.replace('-', "");
        let mut matches = self.state.bills.iter().filter(|bill| {
            let simple = bill.id.0.simple().to_string();
            bill.id.to_string().starts_with(&needle) || simple.starts_with(&compact)
        });
        match (matches.next(), matches.next()) {
            (Some(bill), None) => Ok(bill.id),
            (None, _) => Err(HouseholdError::InvalidInput(format!(
                "no bill matches `{prefix}`"
            ))),
            (Some(_), Some(_)) => Err(HouseholdError::InvalidInput(format!(
                "`{prefix}` matches more than one bill"
            ))),
        }
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<()> {
        if let Some(income) = update.biweekly_income {
            if income.is_sign_negative() && !income.is_zero() {
                return Err(HouseholdError::InvalidInput(format!(
                    "income must not be negative (got {income})"
                )));
            }
        }
        self.transact(|state| {
            let settings = &mut state.settings;
            if let Some(name) = update.household_name {
                settings.household_name = name;
            }
            if let Some(partner) = update.partner1 {
                settings.partner1 = partner;
            }
            if let Some(partner) = update.partner2 {
                settings.partner2 = partner;
            }
            if let Some(notifications) = update.notifications {
                settings.notifications = notifications;
            }
            if let Some(income) = update.biweekly_income {
                state.biweekly_income = income;
            }
            if let Some(payday) = update.payday {
                state.payday = Some(payday);
            }
            Ok(())
        })?;
        tracing::info!("settings updated");
        Ok(())
    }

    /// Moves the selected period by `direction` periods and returns it.
    pub fn navigate_period(&mut self, direction: i32) -> Result<Period> {
        let period = self.transact(|state| PeriodService::navigate(state, direction))?;
        tracing::debug!(offset = self.state.current_period_offset, "period navigated");
        Ok(period)
    }

    /// Runs the sweep now. State is only committed when the sweep changed something.
    pub fn run_maintenance(&mut self) -> Result<SweepReport> {
        let policy = self.config.maintenance_policy();
        let snapshot = self.state.clone();
        let report = MaintenanceService::sweep(
            &mut self.state,
            self.clock.today(),
            self.clock.now(),
            &policy,
        );
        if !report.is_empty() {
            self.commit_or_restore(snapshot)?;
        }
        Ok(report)
    }

    /// Runs the sweep when the daily timer is due.
    pub fn maintenance_tick(&mut self) -> Result<Option<SweepReport>> {
        if self.maintenance.fire_if_due(self.clock.now()) {
            self.run_maintenance().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Re-broadcasts the current state when the real-time timer is due.
    pub fn sync_tick(&mut self) -> Result<bool> {
        if self.realtime.fire_if_due(self.clock.now()) {
            self.publish()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn disable_realtime_sync(&mut self) {
        self.realtime.disable();
        tracing::info!("real-time sync disabled");
    }

    pub fn enable_realtime_sync(&mut self) {
        self.realtime.enable();
    }

    pub fn is_realtime_sync_enabled(&self) -> bool {
        self.realtime.is_enabled()
    }

    /// Replaces local state when `timestamp` is strictly newer than the local
    /// modification stamp. Returns whether the update was applied.
    pub fn apply_remote_update(
        &mut self,
        timestamp: DateTime<Utc>,
        state: HouseholdState,
    ) -> Result<bool> {
        if !sync::is_newer(timestamp, self.state.last_modified) {
            tracing::debug!(
                remote = %timestamp,
                local = ?self.state.last_modified,
                "discarding stale remote update"
            );
            return Ok(false);
        }
        self.state = state;
        self.state.last_modified = Some(timestamp);
        self.storage.save(&self.state)?;
        tracing::info!(remote = %timestamp, "applied remote update");
        Ok(true)
    }

    /// Handles an envelope from a peer. Our own envelopes are ignored.
    pub fn receive(&mut self, envelope: SyncEnvelope) -> Result<bool> {
        if envelope.device_id == self.device_id {
            return Ok(false);
        }
        self.apply_remote_update(envelope.timestamp, envelope.data)
    }

    pub fn generate_share_code(&self) -> Result<String> {
        ShareService::publish(
            self.storage.as_ref(),
            &self.state,
            self.clock.now(),
            self.config.share_code_ttl(),
        )
    }

    /// Replaces local state with the household parked under `code`.
    pub fn join_with_share_code(&mut self, code: &str) -> Result<()> {
        let state = ShareService::redeem(self.storage.as_ref(), code, self.clock.now())?;
        let snapshot = std::mem::replace(&mut self.state, state);
        self.commit_or_restore(snapshot)?;
        tracing::info!(bills = self.state.bills.len(), "joined shared household");
        Ok(())
    }

    /// Wipes storage and starts over from the sample household.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.device_id = sync::device_id(self.storage.as_ref())?;
        let sample = HouseholdState::sample(self.clock.today(), self.clock.now());
        let snapshot = std::mem::replace(&mut self.state, sample);
        self.commit_or_restore(snapshot)?;
        self.notices
            .push(Notice::info("All data cleared. Sample data was loaded."));
        tracing::info!("household reset");
        Ok(())
    }

    fn envelope(&self) -> SyncEnvelope {
        let timestamp = self.state.last_modified.unwrap_or_else(|| self.clock.now());
        SyncEnvelope::new(self.device_id.clone(), timestamp, self.state.clone())
    }

    fn publish(&self) -> Result<()> {
        let envelope = self.envelope();
        self.broadcast.publish(&envelope)?;
        self.storage
            .save_blob(CLOUD_BACKUP_KEY, &serde_json::to_string(&envelope)?)?;
        Ok(())
    }

    /// Applies `change` and commits it. The in-memory state is put back when
    /// either the change or the save fails.
    fn transact<T>(
        &mut self,
        change: impl FnOnce(&mut HouseholdState) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.state.clone();
        match change(&mut self.state) {
            Ok(value) => {
                self.commit_or_restore(snapshot)?;
                Ok(value)
            }
            Err(err) => {
                self.state = snapshot;
                Err(err)
            }
        }
    }

    /// Saves then publishes the current state, restoring `snapshot` in memory
    /// when the save fails. A failed publish leaves the saved state in place.
    fn commit_or_restore(&mut self, snapshot: HouseholdState) -> Result<()> {
        self.state.touch(self.clock.now());
        if let Err(err) = self.storage.save(&self.state) {
            tracing::warn!(error = %err, "save failed; discarding in-memory change");
            self.state = snapshot;
            return Err(err);
        }
        self.publish()
    }
}
