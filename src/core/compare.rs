use thiserror::Error;
use tracing::{debug, warn};

use super::engine::run_simulation;
use super::money::format_currency;
use super::types::{Currency, DebtInput, Settings, SimulationResult, Strategy};
use super::validate::{FieldWarning, ValidatedPlan, ValidationError, validate_plan};

const CHECKPOINT_MONTHS: [usize; 4] = [1, 12, 24, 36];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(
        "The simulation hit the safety cap before paying everything off. Try increasing your \
         extra payment or minimums. This tool stops after {cap_months} months to avoid endless \
         projections."
    )]
    SafetyCap { cap_months: u32 },
}

/// Both strategy runs over the same debts and budget. Only built when both
/// runs paid everything off.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanComparison {
    pub snowball: SimulationResult,
    pub avalanche: SimulationResult,
    pub monthly_budget: f64,
    /// Snowball interest minus avalanche interest.
    pub interest_saved: f64,
    /// Snowball months minus avalanche months.
    pub month_difference: i64,
}

impl PlanComparison {
    pub fn result(&self, strategy: Strategy) -> &SimulationResult {
        match strategy {
            Strategy::Snowball => &self.snowball,
            Strategy::Avalanche => &self.avalanche,
        }
    }

    pub fn best_method(&self) -> Strategy {
        if self.interest_saved > 0.0 {
            Strategy::Avalanche
        } else {
            Strategy::Snowball
        }
    }

    pub fn interest_winner(&self) -> Option<Strategy> {
        if self.interest_saved > 0.0 {
            Some(Strategy::Avalanche)
        } else if self.interest_saved < 0.0 {
            Some(Strategy::Snowball)
        } else {
            None
        }
    }

    pub fn faster_method(&self) -> Option<Strategy> {
        match self.month_difference {
            d if d > 0 => Some(Strategy::Avalanche),
            d if d < 0 => Some(Strategy::Snowball),
            _ => None,
        }
    }

    pub fn describe_interest_saved(&self, currency: Currency) -> String {
        let amount = format_currency(self.interest_saved.abs(), currency);
        match self.interest_winner() {
            Some(winner) => format!("{amount} ({})", winner.label()),
            None => amount,
        }
    }

    pub fn describe_month_difference(&self) -> String {
        let Some(faster) = self.faster_method() else {
            return "Same".to_string();
        };
        let months = self.month_difference.unsigned_abs();
        let plural = if months == 1 { "" } else { "s" };
        format!("{months} month{plural} faster ({})", faster.label())
    }
}

/// A validated, compared plan ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub settings: Settings,
    pub base_min_sum: f64,
    pub extra_payment_clamped: bool,
    pub warnings: Vec<FieldWarning>,
    pub comparison: PlanComparison,
}

pub fn compare_plan(
    plan: &ValidatedPlan,
    settings: &Settings,
    cap_months: u32,
) -> Result<PlanComparison, PlanError> {
    let snowball = run_simulation(
        Strategy::Snowball,
        &plan.debts,
        settings,
        plan.monthly_budget,
        cap_months,
    );
    let avalanche = run_simulation(
        Strategy::Avalanche,
        &plan.debts,
        settings,
        plan.monthly_budget,
        cap_months,
    );

    let (Some(snowball_months), Some(avalanche_months)) =
        (snowball.months_to_debt_free, avalanche.months_to_debt_free)
    else {
        warn!(
            cap_months,
            snowball_completed = snowball.completed,
            avalanche_completed = avalanche.completed,
            "payoff simulation hit the safety cap"
        );
        return Err(PlanError::SafetyCap { cap_months });
    };

    debug!(
        snowball_months,
        avalanche_months,
        snowball_interest = snowball.total_interest,
        avalanche_interest = avalanche.total_interest,
        "compared payoff strategies"
    );

    Ok(PlanComparison {
        interest_saved: snowball.total_interest - avalanche.total_interest,
        month_difference: i64::from(snowball_months) - i64::from(avalanche_months),
        monthly_budget: plan.monthly_budget,
        snowball,
        avalanche,
    })
}

/// Validates raw rows, then simulates and compares both strategies.
/// `settings.extra_payment` is normalized on the way through.
pub fn build_plan(
    debts: &[DebtInput],
    settings: &Settings,
    cap_months: u32,
) -> Result<PlanReport, PlanError> {
    let plan = validate_plan(debts, settings.extra_payment)?;
    let settings = Settings {
        extra_payment: plan.extra_payment,
        ..settings.clone()
    };
    let comparison = compare_plan(&plan, &settings, cap_months)?;
    Ok(PlanReport {
        settings,
        base_min_sum: plan.base_min_sum,
        extra_payment_clamped: plan.extra_payment_clamped,
        warnings: plan.warnings,
        comparison,
    })
}

/// Schedule indices worth showing in a compact table: months 1, 12, 24, 36
/// and the final month, as far as the schedule reaches.
pub fn checkpoint_indices(schedule_len: usize) -> Vec<usize> {
    if schedule_len == 0 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = CHECKPOINT_MONTHS
        .iter()
        .chain(std::iter::once(&schedule_len))
        .filter(|&&month| month <= schedule_len)
        .map(|&month| month - 1)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::CalendarMonth;
    use crate::core::engine::DEFAULT_CAP_MONTHS;

    fn settings(extra_payment: f64) -> Settings {
        let mut settings = Settings::starting(CalendarMonth::new(2026, 3));
        settings.extra_payment = extra_payment;
        settings
    }

    fn example_debts() -> Vec<DebtInput> {
        vec![
            DebtInput::new("Credit card A", 1850.0, 29.9, 55.0),
            DebtInput::new("Credit card B", 4200.0, 22.9, 120.0),
            DebtInput::new("Personal loan", 7800.0, 9.9, 210.0),
        ]
    }

    #[test]
    fn build_plan_runs_both_strategies_over_the_same_budget() {
        let report = build_plan(&example_debts(), &settings(150.0), DEFAULT_CAP_MONTHS)
            .expect("example plan completes");
        let cmp = &report.comparison;

        assert_eq!(cmp.monthly_budget, 535.0);
        assert_eq!(report.base_min_sum, 385.0);
        assert_eq!(cmp.snowball.method, Strategy::Snowball);
        assert_eq!(cmp.avalanche.method, Strategy::Avalanche);
        assert!(cmp.snowball.completed && cmp.avalanche.completed);
        assert!(cmp.avalanche.total_interest <= cmp.snowball.total_interest);
        assert!(
            (cmp.interest_saved - (cmp.snowball.total_interest - cmp.avalanche.total_interest)).abs()
                < 1e-9
        );
    }

    #[test]
    fn build_plan_normalizes_extra_payment_into_settings() {
        let report = build_plan(&example_debts(), &settings(-40.0), DEFAULT_CAP_MONTHS)
            .expect("negative extra is clamped to zero");
        assert_eq!(report.settings.extra_payment, 0.0);
        assert!(report.extra_payment_clamped);
        assert_eq!(report.comparison.monthly_budget, 385.0);
    }

    #[test]
    fn validation_errors_stop_before_simulation() {
        let debts = vec![DebtInput::new("Card", 10_000.0, 36.0, 10.0)];
        let err = build_plan(&debts, &settings(0.0), DEFAULT_CAP_MONTHS).expect_err("infeasible");
        assert!(matches!(
            err,
            PlanError::Invalid(ValidationError::BudgetBelowInterest { .. })
        ));
    }

    #[test]
    fn either_strategy_hitting_the_cap_rejects_the_pair() {
        let err = build_plan(&example_debts(), &settings(0.0), 6).expect_err("6 months is too short");
        assert_eq!(err, PlanError::SafetyCap { cap_months: 6 });
        assert!(err.to_string().contains("6 months"));
    }

    #[test]
    fn equal_strategies_report_same_and_no_winner() {
        let debts = vec![DebtInput::new("Only", 1200.0, 18.0, 100.0)];
        let report = build_plan(&debts, &settings(50.0), DEFAULT_CAP_MONTHS).expect("valid");
        let cmp = &report.comparison;

        assert_eq!(cmp.interest_saved, 0.0);
        assert_eq!(cmp.month_difference, 0);
        assert_eq!(cmp.interest_winner(), None);
        assert_eq!(cmp.best_method(), Strategy::Snowball);
        assert_eq!(cmp.describe_month_difference(), "Same");
        assert_eq!(cmp.describe_interest_saved(Currency::Gbp), "£0.00");
    }

    #[test]
    fn difference_text_names_the_faster_method() {
        let mut cmp = build_plan(&example_debts(), &settings(150.0), DEFAULT_CAP_MONTHS)
            .expect("valid")
            .comparison;
        cmp.month_difference = 3;
        cmp.interest_saved = 12.346;
        assert_eq!(cmp.describe_month_difference(), "3 months faster (Avalanche)");
        assert_eq!(cmp.describe_interest_saved(Currency::Usd), "$12.35 (Avalanche)");

        cmp.month_difference = -1;
        cmp.interest_saved = -4.0;
        assert_eq!(cmp.describe_month_difference(), "1 month faster (Snowball)");
        assert_eq!(cmp.best_method(), Strategy::Snowball);
        assert_eq!(cmp.describe_interest_saved(Currency::Gbp), "£4.00 (Snowball)");
    }

    #[test]
    fn checkpoints_are_deduplicated_sorted_and_bounded() {
        assert_eq!(checkpoint_indices(0), Vec::<usize>::new());
        assert_eq!(checkpoint_indices(1), vec![0]);
        assert_eq!(checkpoint_indices(12), vec![0, 11]);
        assert_eq!(checkpoint_indices(30), vec![0, 11, 23, 29]);
        assert_eq!(checkpoint_indices(36), vec![0, 11, 23, 35]);
        assert_eq!(checkpoint_indices(80), vec![0, 11, 23, 35, 79]);
    }
}
