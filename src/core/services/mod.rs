pub mod cash_flow_service;
pub mod maintenance_service;
pub mod overview_service;
pub mod period_service;
pub mod recurrence_service;

pub use cash_flow_service::{CashFlow, CashFlowService, DueStatus};
pub use maintenance_service::{MaintenancePolicy, MaintenanceService, SweepReport};
pub use overview_service::{
    BillView, CalendarDay, CashEvent, EventKind, Overview, OverviewService,
};
pub use period_service::PeriodService;
pub use recurrence_service::{InstanceIndex, RecurrenceService, DEFAULT_HORIZON};

use crate::errors::HouseholdError;

pub type ServiceResult<T> = Result<T, HouseholdError>;
