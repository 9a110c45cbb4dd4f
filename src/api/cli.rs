use clap::{Parser, ValueEnum, error::ErrorKind};
use std::ffi::OsString;
use std::path::PathBuf;

use super::build_plan_response;
use crate::core::{
    CalendarMonth, Currency, DEFAULT_CAP_MONTHS, PlanError, PlanReport, SavedPlan, Strategy,
    ValidationError, build_plan, checkpoint_indices, example_plan, format_currency, format_percent,
    parse_number_loose,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCurrency {
    Gbp,
    Usd,
    Eur,
    Inr,
}

impl From<CliCurrency> for Currency {
    fn from(value: CliCurrency) -> Self {
        match value {
            CliCurrency::Gbp => Currency::Gbp,
            CliCurrency::Usd => Currency::Usd,
            CliCurrency::Eur => Currency::Eur,
            CliCurrency::Inr => Currency::Inr,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Snowball,
    Avalanche,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "debtplan",
    about = "Snowball vs avalanche debt payoff planner",
    after_help = "Run `debtplan serve [port]` to start the HTTP API instead."
)]
struct Cli {
    #[arg(
        long,
        conflicts_with = "example",
        help = "Saved plan JSON file with settings and debts"
    )]
    plan: Option<PathBuf>,
    #[arg(long, help = "Use the built-in example debts")]
    example: bool,
    #[arg(long, value_enum, help = "Display currency, defaults to the saved plan's")]
    currency: Option<CliCurrency>,
    #[arg(long, help = "Extra monthly payment on top of minimums, e.g. 150 or £150.00")]
    extra_payment: Option<String>,
    #[arg(long, help = "First month of the plan, 1-12")]
    start_month: Option<u32>,
    #[arg(long)]
    start_year: Option<i32>,
    #[arg(long, help = "Keep full precision instead of rounding every month to pennies")]
    no_round_pennies: bool,
    #[arg(long, default_value_t = DEFAULT_CAP_MONTHS, help = "Safety cap on simulated months")]
    cap_months: u32,
    #[arg(
        long,
        value_enum,
        default_value_t = CliStrategy::Snowball,
        help = "Which method's schedule and payoff table to print"
    )]
    method: CliStrategy,
    #[arg(long, help = "Print the full JSON report instead of a text summary")]
    json: bool,
}

/// Parses `args` (program name first), runs the plan and returns the text
/// to print on stdout.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.render().to_string());
        }
        Err(e) => return Err(e.render().to_string()),
    };
    let json = cli.json;
    let method = cli.method.into();
    let cap_months = cli.cap_months;

    let plan = build_saved_plan(cli)?;
    let report = build_plan(&plan.debts, &plan.settings, cap_months).map_err(describe_plan_error)?;

    if json {
        serde_json::to_string_pretty(&build_plan_response(&report))
            .map_err(|e| format!("Failed to serialize report: {e}"))
    } else {
        Ok(render_text_report(&report, method))
    }
}

fn build_saved_plan(cli: Cli) -> Result<SavedPlan, String> {
    let today = CalendarMonth::current_utc();
    let mut plan = match (&cli.plan, cli.example) {
        (Some(path), _) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
            SavedPlan::parse(&raw).map_err(|e| e.to_string())?
        }
        (None, true) => example_plan(today),
        (None, false) => return Err("Provide --plan <file> or --example".to_string()),
    };

    if !(1..=DEFAULT_CAP_MONTHS).contains(&cli.cap_months) {
        return Err(format!("--cap-months must be between 1 and {DEFAULT_CAP_MONTHS}"));
    }

    if let Some(currency) = cli.currency {
        plan.settings.currency = currency.into();
    }
    if let Some(raw) = &cli.extra_payment {
        let extra = parse_number_loose(raw);
        if extra.is_nan() {
            return Err("--extra-payment must be a number".to_string());
        }
        plan.settings.extra_payment = extra;
    }
    if let Some(month) = cli.start_month {
        if !(1..=12).contains(&month) {
            return Err("--start-month must be between 1 and 12".to_string());
        }
        plan.settings.start_month = month;
    }
    if let Some(year) = cli.start_year {
        plan.settings.start_year = year;
    }
    if cli.no_round_pennies {
        plan.settings.round_pennies = false;
    }

    Ok(plan)
}

fn describe_plan_error(err: PlanError) -> String {
    match &err {
        PlanError::Invalid(ValidationError::InvalidDebts(issues)) => {
            let mut lines = vec![err.to_string()];
            lines.extend(
                issues
                    .iter()
                    .map(|issue| format!("  debt {}: {}", issue.row, issue.message)),
            );
            lines.join("\n")
        }
        _ => err.to_string(),
    }
}

fn render_text_report(report: &PlanReport, method: Strategy) -> String {
    let currency = report.settings.currency;
    let money = |v: f64| format_currency(v, currency);
    let cmp = &report.comparison;
    let mut lines = Vec::new();

    lines.push(format!("Monthly budget: {} / month", money(cmp.monthly_budget)));
    if report.extra_payment_clamped {
        lines.push("Note: Extra payment must be 0 or more.".to_string());
    }
    for strategy in Strategy::ALL {
        let result = cmp.result(strategy);
        lines.push(format!(
            "{:<10} {} months, debt free {}, interest {}, total paid {}",
            format!("{}:", strategy.label()),
            result.months_to_debt_free.unwrap_or_default(),
            result.debt_free_date.map(CalendarMonth::label).unwrap_or_default(),
            money(result.total_interest),
            money(result.total_paid),
        ));
    }
    lines.push(format!("Interest saved: {}", cmp.describe_interest_saved(currency)));
    lines.push(format!("Time difference: {}", cmp.describe_month_difference()));

    if !report.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings:".to_string());
        for warning in &report.warnings {
            lines.push(format!("  debt {}: {}", warning.row, warning.message));
        }
    }

    let result = cmp.result(method);
    lines.push(String::new());
    lines.push(format!("{} schedule", method.label()));
    lines.push(format!(
        "{:<10} {:>14} {:>14} {:>14} {:>14}",
        "Month", "Payment", "Interest", "Principal", "Remaining"
    ));
    for idx in checkpoint_indices(result.schedule.len()) {
        let row = &result.schedule[idx];
        lines.push(format!(
            "{:<10} {:>14} {:>14} {:>14} {:>14}",
            row.label,
            money(row.payment),
            money(row.interest),
            money(row.principal),
            money(row.remaining),
        ));
    }

    lines.push(String::new());
    lines.push(format!("{} payoff order", method.label()));
    let start = report.settings.start();
    for (debt, payoff) in result.debts_snapshot.iter().zip(&result.payoff_info) {
        let when = payoff
            .months_to_payoff
            .map(|months| {
                format!(
                    "{months} mo ({})",
                    start.add_months(months.saturating_sub(1)).label()
                )
            })
            .unwrap_or_else(|| "—".to_string());
        lines.push(format!(
            "  {:<20} {:>14} {:>7} {:>12}  {}",
            debt.name,
            money(debt.balance),
            format_percent(debt.apr),
            money(debt.min_payment),
            when,
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("debtplan").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn example_plan_applies_overrides() {
        let cli = parse(&[
            "--example",
            "--currency",
            "usd",
            "--extra-payment",
            "$250.00",
            "--start-month",
            "6",
            "--start-year",
            "2030",
            "--no-round-pennies",
        ]);
        let plan = build_saved_plan(cli).expect("valid overrides");
        assert_eq!(plan.settings.currency, Currency::Usd);
        assert_eq!(plan.settings.extra_payment, 250.0);
        assert_eq!(plan.settings.start_month, 6);
        assert_eq!(plan.settings.start_year, 2030);
        assert!(!plan.settings.round_pennies);
        assert_eq!(plan.debts.len(), 3);
    }

    #[test]
    fn requires_a_plan_source() {
        let err = build_saved_plan(parse(&[])).expect_err("no plan source");
        assert!(err.contains("--plan"));
    }

    #[test]
    fn rejects_plan_and_example_together() {
        let result = Cli::try_parse_from(["debtplan", "--plan", "x.json", "--example"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_overrides() {
        let err = build_saved_plan(parse(&["--example", "--start-month", "13"]))
            .expect_err("month 13");
        assert!(err.contains("--start-month"));

        let err = build_saved_plan(parse(&["--example", "--extra-payment", "lots"]))
            .expect_err("not a number");
        assert!(err.contains("--extra-payment"));

        let err = build_saved_plan(parse(&["--example", "--cap-months", "0"]))
            .expect_err("zero cap");
        assert!(err.contains("--cap-months"));
    }

    #[test]
    fn text_report_lists_both_methods_and_payoff_rows() {
        let output = run_cli(["debtplan", "--example", "--start-month", "1", "--start-year", "2026"])
            .expect("example plan runs");
        assert!(output.contains("Monthly budget: £535.00 / month"));
        assert!(output.contains("Snowball:"));
        assert!(output.contains("Avalanche:"));
        assert!(output.contains("Snowball schedule"));
        assert!(output.contains("Jan 2026"));
        assert!(output.contains("Credit card A"));
        assert!(output.contains("29.9%"));
    }

    #[test]
    fn json_report_is_valid_json() {
        let output = run_cli(["debtplan", "--example", "--json", "--method", "avalanche"])
            .expect("example plan runs");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(value["monthlyBudget"], serde_json::json!(535.0));
        assert!(value["avalanche"]["schedule"].is_array());
    }

    #[test]
    fn safety_cap_is_reported_as_error() {
        let err = run_cli(["debtplan", "--example", "--extra-payment", "0", "--cap-months", "3"])
            .expect_err("three months is not enough");
        assert!(err.contains("safety cap"));
    }

    #[test]
    fn help_is_returned_as_output() {
        let output = run_cli(["debtplan", "--help"]).expect("help is not an error");
        assert!(output.contains("--extra-payment"));
    }
}
