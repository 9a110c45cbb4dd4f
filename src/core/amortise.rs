use serde::{Deserialize, Serialize};

use super::money::round_money;
use super::types::monthly_rate;

const BALANCE_TOLERANCE: f64 = 0.005;
const MAX_MONTHS: u32 = 1200;
const MAX_OVERRUN_MONTHS: u32 = 240;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanInput {
    pub loan_amount: f64,
    /// Arrangement fee added to the financed principal.
    pub fee: f64,
    pub apr: f64,
    pub term_months: u32,
    pub overpay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanMonth {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub overpay: f64,
    pub total: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSchedule {
    pub loan_amount: f64,
    pub fee: f64,
    pub principal: f64,
    pub apr: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
    pub overpay: f64,
    pub months_actual: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub schedule: Vec<LoanMonth>,
}

fn cents(value: f64) -> f64 {
    round_money(value, true)
}

fn loan_rate(apr: f64) -> f64 {
    if !apr.is_finite() || apr <= 0.0 {
        0.0
    } else {
        monthly_rate(apr)
    }
}

/// Level monthly payment that clears `principal` over `months`, in cents.
pub fn monthly_payment(principal: f64, apr: f64, months: u32) -> f64 {
    if !principal.is_finite() || principal <= 0.0 || months == 0 {
        return 0.0;
    }
    let r = loan_rate(apr);
    if r == 0.0 {
        return cents(principal / f64::from(months));
    }
    let discount = (1.0 + r).powi(-(months as i32));
    cents(principal * r / (1.0 - discount))
}

/// Month-by-month schedule for a single fixed-rate loan, with an optional
/// fixed overpayment. Returns `None` for a non-positive amount or term, or a
/// negative APR.
pub fn amortise(input: &LoanInput) -> Option<LoanSchedule> {
    if !input.loan_amount.is_finite() || input.loan_amount <= 0.0 {
        return None;
    }
    if !input.apr.is_finite() || input.apr < 0.0 || input.term_months == 0 {
        return None;
    }

    let fee = if input.fee.is_finite() && input.fee > 0.0 { input.fee } else { 0.0 };
    let extra = if input.overpay.is_finite() && input.overpay > 0.0 { input.overpay } else { 0.0 };
    let principal0 = input.loan_amount + fee;
    let base_payment = monthly_payment(principal0, input.apr, input.term_months);
    let r = loan_rate(input.apr);

    let mut balance = principal0;
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut month = 0u32;
    let mut schedule = Vec::new();

    while balance > BALANCE_TOLERANCE && month < MAX_MONTHS {
        month += 1;

        let interest = balance * r;
        let this_month = (base_payment + extra).min(balance + interest);
        let extra_used = (this_month - base_payment).max(0.0);
        let principal_paid = (this_month - interest).max(0.0);

        balance = (balance + interest - this_month).max(0.0);
        total_interest += interest;
        total_paid += this_month;

        schedule.push(LoanMonth {
            month,
            payment: cents(base_payment),
            interest: cents(interest),
            principal: cents(principal_paid - extra_used),
            overpay: cents(extra_used),
            total: cents(this_month),
            balance: cents(balance),
        });

        let past_term = month >= input.term_months && extra == 0.0;
        if past_term && (balance <= 0.01 || month > input.term_months + MAX_OVERRUN_MONTHS) {
            break;
        }
    }

    Some(LoanSchedule {
        loan_amount: cents(input.loan_amount),
        fee: cents(fee),
        principal: cents(principal0),
        apr: cents(input.apr),
        term_months: input.term_months,
        monthly_payment: cents(base_payment),
        overpay: cents(extra),
        months_actual: month,
        total_interest: cents(total_interest),
        total_paid: cents(total_paid),
        schedule,
    })
}
