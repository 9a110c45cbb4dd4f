mod amortise;
mod calendar;
mod compare;
mod engine;
mod money;
mod saved;
mod types;
mod validate;

pub use amortise::{LoanInput, LoanMonth, LoanSchedule, amortise, monthly_payment};
pub use calendar::CalendarMonth;
pub use compare::{PlanComparison, PlanError, PlanReport, build_plan, checkpoint_indices, compare_plan};
pub use engine::{DEFAULT_CAP_MONTHS, run_simulation};
pub use money::{format_currency, format_percent, parse_number_loose, round_money};
pub use saved::{STORAGE_KEY, SavedPlan, SavedPlanError, example_plan};
pub use types::{
    CleanedDebt, Currency, DebtBalanceRow, DebtInput, PayoffInfo, ScheduleRow, Settings,
    SimulationResult, Strategy, new_debt_id,
};
pub use validate::{
    DebtField, FieldIssue, FieldWarning, MAX_EXTRA_PAYMENT, ValidatedPlan, ValidationError,
    normalize_extra_payment, validate_plan,
};
