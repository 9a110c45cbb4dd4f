//! The `{settings, debts}` document a browser page keeps under
//! [`STORAGE_KEY`] so a plan survives a reload.
//!
//! Restoring is forgiving: anything missing or malformed falls back to a
//! default instead of rejecting the whole document. Months are stored
//! 0-based (`0` = January) in the document and 1-based in [`Settings`].

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::calendar::CalendarMonth;
use super::types::{Currency, DebtInput, Settings, new_debt_id};

pub const STORAGE_KEY: &str = "debt_tool_v2";

#[derive(Debug, Error)]
pub enum SavedPlanError {
    #[error("Invalid saved plan JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedPlan {
    pub settings: Settings,
    pub debts: Vec<DebtInput>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    currency: &'static str,
    start_month: u32,
    start_year: i32,
    extra_payment: f64,
    round_pennies: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredDebt<'a> {
    id: &'a str,
    name: &'a str,
    balance: f64,
    apr: f64,
    min_payment: f64,
}

#[derive(Serialize)]
struct StoredPlan<'a> {
    settings: StoredSettings,
    debts: Vec<StoredDebt<'a>>,
}

impl SavedPlan {
    pub fn parse(json: &str) -> Result<Self, SavedPlanError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::restore(&value, CalendarMonth::current_utc()))
    }

    /// Rebuilds a plan from an already-parsed document. `today` fills in a
    /// missing start month or year.
    pub fn restore(value: &Value, today: CalendarMonth) -> Self {
        let mut settings = Settings::starting(today);

        if let Some(stored) = value.get("settings").filter(|s| s.is_object()) {
            settings.currency = stored
                .get("currency")
                .and_then(Value::as_str)
                .and_then(Currency::from_code)
                .unwrap_or_default();
            settings.start_month = finite(stored.get("startMonth"))
                .filter(|m| (0.0..12.0).contains(m))
                .map_or(today.month, |m| m as u32 + 1);
            settings.start_year = finite(stored.get("startYear"))
                .map_or(today.year, |y| y as i32);
            settings.extra_payment = finite(stored.get("extraPayment")).unwrap_or(0.0);
            settings.round_pennies = stored.get("roundPennies") != Some(&Value::Bool(false));
        }

        let debts = value
            .get("debts")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(restore_debt).collect())
            .unwrap_or_default();

        Self { settings, debts }
    }

    pub fn to_json(&self) -> Result<String, SavedPlanError> {
        let stored = StoredPlan {
            settings: StoredSettings {
                currency: self.settings.currency.code(),
                start_month: self.settings.start_month.clamp(1, 12) - 1,
                start_year: self.settings.start_year,
                extra_payment: self.settings.extra_payment,
                round_pennies: self.settings.round_pennies,
            },
            debts: self
                .debts
                .iter()
                .map(|d| StoredDebt {
                    id: &d.id,
                    name: &d.name,
                    balance: d.balance,
                    apr: d.apr,
                    min_payment: d.min_payment,
                })
                .collect(),
        };
        Ok(serde_json::to_string(&stored)?)
    }
}

fn finite(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn restore_debt(row: &Value) -> DebtInput {
    let id = row
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map_or_else(new_debt_id, str::to_string);
    let name = row
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    DebtInput {
        id,
        name,
        balance: finite(row.get("balance")).unwrap_or(f64::NAN),
        apr: finite(row.get("apr")).unwrap_or(f64::NAN),
        min_payment: finite(row.get("minPayment")).unwrap_or(f64::NAN),
    }
}

/// Three typical debts with a small extra payment, for trying the planner.
pub fn example_plan(today: CalendarMonth) -> SavedPlan {
    let mut settings = Settings::starting(today);
    settings.extra_payment = 150.0;
    SavedPlan {
        settings,
        debts: vec![
            DebtInput::new("Credit card A", 1850.0, 29.9, 55.0),
            DebtInput::new("Credit card B", 4200.0, 22.9, 120.0),
            DebtInput::new("Personal loan", 7800.0, 9.9, 210.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> CalendarMonth {
        CalendarMonth::new(2026, 10)
    }

    #[test]
    fn restore_reads_page_document() {
        let value = json!({
            "settings": {
                "currency": "USD",
                "startMonth": 0,
                "startYear": 2027,
                "extraPayment": 75.5,
                "roundPennies": false
            },
            "debts": [
                { "id": "dabc", "name": "Visa", "balance": 1200, "apr": 19.9, "minPayment": 35 }
            ]
        });
        let plan = SavedPlan::restore(&value, today());

        assert_eq!(plan.settings.currency, Currency::Usd);
        assert_eq!(plan.settings.start_month, 1);
        assert_eq!(plan.settings.start_year, 2027);
        assert_eq!(plan.settings.extra_payment, 75.5);
        assert!(!plan.settings.round_pennies);
        assert_eq!(plan.debts.len(), 1);
        assert_eq!(plan.debts[0].id, "dabc");
        assert_eq!(plan.debts[0].name, "Visa");
        assert_eq!(plan.debts[0].min_payment, 35.0);
    }

    #[test]
    fn restore_falls_back_on_malformed_fields() {
        let value = json!({
            "settings": {
                "currency": "JPY",
                "startMonth": "March",
                "extraPayment": "lots",
                "roundPennies": "no"
            },
            "debts": [
                { "name": 7, "balance": "1,000", "apr": null }
            ]
        });
        let plan = SavedPlan::restore(&value, today());

        assert_eq!(plan.settings.currency, Currency::Gbp);
        assert_eq!(plan.settings.start_month, 10);
        assert_eq!(plan.settings.start_year, 2026);
        assert_eq!(plan.settings.extra_payment, 0.0);
        assert!(plan.settings.round_pennies);

        let debt = &plan.debts[0];
        assert!(debt.id.starts_with('d') && debt.id.len() > 1);
        assert_eq!(debt.name, "");
        assert!(debt.balance.is_nan() && debt.apr.is_nan() && debt.min_payment.is_nan());
    }

    #[test]
    fn restore_ignores_non_array_debts() {
        let plan = SavedPlan::restore(&json!({ "debts": { "a": 1 } }), today());
        assert!(plan.debts.is_empty());
        assert_eq!(plan.settings, Settings::starting(today()));
    }

    #[test]
    fn to_json_stores_zero_based_months_and_nulls_for_missing_numbers() {
        let mut plan = example_plan(CalendarMonth::new(2026, 12));
        plan.debts.push(DebtInput {
            id: "dblank".to_string(),
            ..DebtInput::blank()
        });
        let json = plan.to_json().expect("plan serializes");
        let value: Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["settings"]["startMonth"], json!(11));
        assert_eq!(value["settings"]["currency"], json!("GBP"));
        assert_eq!(value["debts"][0]["minPayment"], json!(55.0));
        assert_eq!(value["debts"][3]["balance"], Value::Null);

        let restored = SavedPlan::restore(&value, today());
        assert_eq!(restored.settings, plan.settings);
        assert_eq!(restored.debts[..3], plan.debts[..3]);
        assert!(restored.debts[3].balance.is_nan());
    }

    #[test]
    fn parse_rejects_broken_json() {
        let err = SavedPlan::parse("{ not json").expect_err("must fail");
        assert!(err.to_string().starts_with("Invalid saved plan JSON"));
    }
}
