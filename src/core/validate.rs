use serde::Serialize;
use thiserror::Error;

use super::types::{CleanedDebt, DebtInput};

pub const MAX_EXTRA_PAYMENT: f64 = 1e12;
const INTEREST_TOLERANCE: f64 = 0.005;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DebtField {
    Balance,
    Apr,
    MinPayment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub debt_id: String,
    /// 1-based position of the debt in the input.
    pub row: usize,
    pub field: DebtField,
    pub message: String,
}

pub type FieldWarning = FieldIssue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Add at least one debt to calculate a payoff plan.")]
    NoDebts,
    #[error("{} debt field(s) need fixing before a plan can be calculated.", .0.len())]
    InvalidDebts(Vec<FieldIssue>),
    #[error(
        "Your total monthly payment is not enough to cover the interest being added each month. \
         Increase your extra payment, increase minimum payments, or reduce APR (where possible) \
         so balances decrease."
    )]
    BudgetBelowInterest {
        monthly_budget: f64,
        monthly_interest: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlan {
    pub debts: Vec<CleanedDebt>,
    pub monthly_budget: f64,
    pub base_min_sum: f64,
    pub extra_payment: f64,
    /// Set when a finite extra payment had to be pulled back into range.
    pub extra_payment_clamped: bool,
    pub warnings: Vec<FieldWarning>,
}

pub fn normalize_extra_payment(raw: f64) -> (f64, bool) {
    if !raw.is_finite() {
        return (0.0, false);
    }
    let clamped = raw.clamp(0.0, MAX_EXTRA_PAYMENT);
    (clamped, clamped != raw)
}

pub fn validate_plan(debts: &[DebtInput], extra_payment: f64) -> Result<ValidatedPlan, ValidationError> {
    let (extra_payment, extra_payment_clamped) = normalize_extra_payment(extra_payment);

    if debts.is_empty() {
        return Err(ValidationError::NoDebts);
    }

    let mut issues = Vec::new();
    let mut cleaned = Vec::with_capacity(debts.len());
    for (idx, debt) in debts.iter().enumerate() {
        let row = idx + 1;
        let mut flag = |field, message: &str| {
            issues.push(FieldIssue {
                debt_id: debt.id.clone(),
                row,
                field,
                message: message.to_string(),
            })
        };

        if !debt.balance.is_finite() || debt.balance <= 0.0 {
            flag(DebtField::Balance, "Enter a balance greater than 0.");
        }
        if !debt.apr.is_finite() || !(0.0..=100.0).contains(&debt.apr) {
            flag(DebtField::Apr, "Enter an APR between 0 and 100.");
        }
        if !debt.min_payment.is_finite() || debt.min_payment <= 0.0 {
            flag(DebtField::MinPayment, "Enter a minimum payment greater than 0.");
        }

        let name = match debt.name.trim() {
            "" => format!("Debt {row}"),
            trimmed => trimmed.to_string(),
        };
        cleaned.push(CleanedDebt::checked(
            debt.id.clone(),
            name,
            debt.balance,
            debt.apr,
            debt.min_payment,
        ));
    }

    if !issues.is_empty() {
        return Err(ValidationError::InvalidDebts(issues));
    }

    let warnings = cleaned
        .iter()
        .enumerate()
        .filter(|(_, d)| d.apr > 0.0 && d.min_payment <= d.monthly_interest() + INTEREST_TOLERANCE)
        .map(|(idx, d)| FieldIssue {
            debt_id: d.id.clone(),
            row: idx + 1,
            field: DebtField::MinPayment,
            message: "Warning: this minimum may not cover one month's interest at this balance. \
                      You may need extra payment (or a lower APR) to make progress."
                .to_string(),
        })
        .collect::<Vec<_>>();

    let base_min_sum: f64 = cleaned.iter().map(|d| d.min_payment).sum();
    let monthly_budget = base_min_sum + extra_payment;
    let monthly_interest: f64 = cleaned.iter().map(CleanedDebt::monthly_interest).sum();

    if monthly_budget <= monthly_interest + INTEREST_TOLERANCE {
        return Err(ValidationError::BudgetBelowInterest {
            monthly_budget,
            monthly_interest,
        });
    }

    Ok(ValidatedPlan {
        debts: cleaned,
        monthly_budget,
        base_min_sum,
        extra_payment,
        extra_payment_clamped,
        warnings,
    })
}
