use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::CalendarMonth;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Gbp,
    Usd,
    Eur,
    Inr,
}

impl Currency {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "GBP" => Some(Currency::Gbp),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "INR" => Some(Currency::Inr),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Inr => "INR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Inr => "₹",
        }
    }

    pub fn decimals(self) -> usize {
        2
    }
}

/// Surplus allocation policy applied after every minimum payment is made.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Snowball,
    Avalanche,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Snowball, Strategy::Avalanche];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Snowball => "snowball",
            Strategy::Avalanche => "avalanche",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Snowball => "Snowball",
            Strategy::Avalanche => "Avalanche",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub currency: Currency,
    /// Calendar month of the first simulated month, 1 = January.
    pub start_month: u32,
    pub start_year: i32,
    pub extra_payment: f64,
    pub round_pennies: bool,
}

impl Settings {
    pub fn starting(start: CalendarMonth) -> Self {
        Self {
            currency: Currency::Gbp,
            start_month: start.month,
            start_year: start.year,
            extra_payment: 0.0,
            round_pennies: true,
        }
    }

    pub fn start(&self) -> CalendarMonth {
        CalendarMonth::new(self.start_year, self.start_month)
    }
}

/// A debt row as the user typed it. Numeric fields may be NaN when a cell
/// is empty or unparseable.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtInput {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub apr: f64,
    pub min_payment: f64,
}

impl DebtInput {
    pub fn new(name: &str, balance: f64, apr: f64, min_payment: f64) -> Self {
        Self {
            id: new_debt_id(),
            name: name.to_string(),
            balance,
            apr,
            min_payment,
        }
    }

    pub fn blank() -> Self {
        Self::new("", f64::NAN, f64::NAN, f64::NAN)
    }
}

pub fn new_debt_id() -> String {
    format!("d{}", Uuid::new_v4().simple())
}

/// A debt that passed validation: every numeric field is finite and in range.
///
/// Only [`crate::core::validate_plan`] builds these, so the simulator can
/// take the ranges for granted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedDebt {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub apr: f64,
    pub min_payment: f64,
}

impl CleanedDebt {
    pub(crate) fn checked(id: String, name: String, balance: f64, apr: f64, min_payment: f64) -> Self {
        Self {
            id,
            name,
            balance,
            apr,
            min_payment,
        }
    }

    pub fn monthly_interest(&self) -> f64 {
        self.balance * monthly_rate(self.apr)
    }
}

pub fn monthly_rate(apr: f64) -> f64 {
    (apr / 100.0) / 12.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub index: u32,
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffInfo {
    pub id: String,
    pub name: String,
    pub payoff_month_index: Option<u32>,
    pub months_to_payoff: Option<u32>,
}

/// Remaining balance of every debt after one month, in `debts_snapshot` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtBalanceRow {
    pub index: u32,
    pub label: String,
    pub balances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub method: Strategy,
    pub completed: bool,
    pub months_to_debt_free: Option<u32>,
    pub debt_free_date: Option<CalendarMonth>,
    pub total_interest: f64,
    pub total_paid: f64,
    pub schedule: Vec<ScheduleRow>,
    pub payoff_info: Vec<PayoffInfo>,
    pub by_debt_balances: Vec<DebtBalanceRow>,
    pub debts_snapshot: Vec<CleanedDebt>,
}
