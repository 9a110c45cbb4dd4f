use std::cmp::Ordering;

use super::money::round_money;
use super::types::{
    CleanedDebt, DebtBalanceRow, PayoffInfo, ScheduleRow, Settings, SimulationResult, Strategy,
    monthly_rate,
};

pub const DEFAULT_CAP_MONTHS: u32 = 1200;

/// Balances at or below this are treated as paid while stepping months.
const BALANCE_EPSILON: f64 = 1e-7;
const STOP_TOLERANCE: f64 = 0.005;
const COMPLETION_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub(crate) struct WorkingDebt {
    name: String,
    balance: f64,
    apr: f64,
    min_payment: f64,
    start_balance: f64,
}

impl WorkingDebt {
    fn from_clean(debt: &CleanedDebt) -> Self {
        Self {
            name: debt.name.clone(),
            balance: debt.balance,
            apr: debt.apr,
            min_payment: debt.min_payment,
            start_balance: debt.balance,
        }
    }

    fn is_open(&self) -> bool {
        self.balance > BALANCE_EPSILON
    }
}

/// Order in which open debts receive the surplus after minimums.
pub(crate) type DebtOrder = fn(&WorkingDebt, &WorkingDebt) -> Ordering;

impl Strategy {
    pub(crate) fn comparator(self) -> DebtOrder {
        match self {
            Strategy::Snowball => snowball_order,
            Strategy::Avalanche => avalanche_order,
        }
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn ascending(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Alphabetical, ignoring case first so "apple" sorts before "Banana".
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn avalanche_order(a: &WorkingDebt, b: &WorkingDebt) -> Ordering {
    descending(a.apr, b.apr)
        .then_with(|| descending(a.balance, b.balance))
        .then_with(|| by_name(&a.name, &b.name))
}

fn snowball_order(a: &WorkingDebt, b: &WorkingDebt) -> Ordering {
    ascending(a.balance, b.balance)
        .then_with(|| descending(a.apr, b.apr))
        .then_with(|| by_name(&a.name, &b.name))
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthFlow {
    interest: f64,
    paid: f64,
}

pub fn run_simulation(
    strategy: Strategy,
    debts: &[CleanedDebt],
    settings: &Settings,
    monthly_budget: f64,
    cap_months: u32,
) -> SimulationResult {
    simulate_with_order(
        strategy,
        strategy.comparator(),
        debts,
        settings,
        monthly_budget,
        cap_months,
    )
}

fn simulate_with_order(
    method: Strategy,
    order: DebtOrder,
    input: &[CleanedDebt],
    settings: &Settings,
    monthly_budget: f64,
    cap_months: u32,
) -> SimulationResult {
    let round = settings.round_pennies;
    let start = settings.start();
    let mut debts: Vec<WorkingDebt> = input.iter().map(WorkingDebt::from_clean).collect();
    let mut payoff_info: Vec<PayoffInfo> = input
        .iter()
        .map(|d| PayoffInfo {
            id: d.id.clone(),
            name: d.name.clone(),
            payoff_month_index: None,
            months_to_payoff: None,
        })
        .collect();

    let mut schedule = Vec::new();
    let mut by_debt_balances = Vec::new();
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut month_index = 0u32;

    while month_index < cap_months {
        let active: Vec<usize> = (0..debts.len()).filter(|&i| debts[i].is_open()).collect();
        let balance_before: f64 = active.iter().map(|&i| debts[i].balance).sum();
        if balance_before <= STOP_TOLERANCE {
            break;
        }

        let flow = step_month(&mut debts, &active, order, monthly_budget);
        record_payoffs(&debts, &mut payoff_info, month_index);

        let balance_after: f64 = debts.iter().map(|d| d.balance.max(0.0)).sum();
        let payment = round_money(flow.paid, round);
        let interest = round_money(flow.interest, round);
        let principal = round_money((payment - interest).max(0.0), round);
        let remaining = round_money(balance_after, round);

        total_interest += interest;
        total_paid += payment;

        let month = start.add_months(month_index);
        let label = month.label();
        schedule.push(ScheduleRow {
            index: month_index,
            year: month.year,
            month: month.month,
            label: label.clone(),
            payment,
            interest,
            principal,
            remaining,
        });
        by_debt_balances.push(DebtBalanceRow {
            index: month_index,
            label,
            balances: debts
                .iter()
                .map(|d| round_money(d.balance.max(0.0), round))
                .collect(),
        });

        month_index += 1;

        if balance_after <= STOP_TOLERANCE {
            break;
        }
    }

    let ending_balance: f64 = debts.iter().map(|d| d.balance.max(0.0)).sum();
    let completed = ending_balance <= COMPLETION_TOLERANCE;
    let months_to_debt_free = completed.then_some(schedule.len() as u32);
    // Nothing owed at the start means debt free as of the month before.
    let debt_free_date = months_to_debt_free.map(|months| match months {
        0 => start.previous(),
        m => start.add_months(m - 1),
    });

    SimulationResult {
        method,
        completed,
        months_to_debt_free,
        debt_free_date,
        total_interest: round_money(total_interest, round),
        total_paid: round_money(total_paid, round),
        schedule,
        payoff_info,
        by_debt_balances,
        debts_snapshot: input.to_vec(),
    }
}

/// Accrues interest, pays every minimum, then pours what is left of the
/// budget into open debts in `order`, each cleared before the next is paid.
fn step_month(
    debts: &mut [WorkingDebt],
    active: &[usize],
    order: DebtOrder,
    monthly_budget: f64,
) -> MonthFlow {
    let mut flow = MonthFlow::default();

    for &i in active {
        let debt = &mut debts[i];
        let interest = debt.balance * monthly_rate(debt.apr);
        debt.balance += interest;
        flow.interest += interest;
    }

    let mut remaining_budget = monthly_budget;
    for &i in active {
        let debt = &mut debts[i];
        let pay = debt.min_payment.min(debt.balance).min(remaining_budget);
        debt.balance -= pay;
        remaining_budget -= pay;
        flow.paid += pay;
    }
    remaining_budget = remaining_budget.max(0.0);

    let mut targets: Vec<usize> = active.iter().copied().filter(|&i| debts[i].is_open()).collect();
    targets.sort_by(|&a, &b| order(&debts[a], &debts[b]));

    for i in targets {
        if remaining_budget <= BALANCE_EPSILON {
            break;
        }
        let debt = &mut debts[i];
        if !debt.is_open() {
            continue;
        }
        let pay = remaining_budget.min(debt.balance);
        debt.balance -= pay;
        remaining_budget -= pay;
        flow.paid += pay;
    }

    flow
}

fn record_payoffs(debts: &[WorkingDebt], payoff_info: &mut [PayoffInfo], month_index: u32) {
    for (debt, info) in debts.iter().zip(payoff_info.iter_mut()) {
        if !debt.is_open() && debt.start_balance > 0.0 && info.payoff_month_index.is_none() {
            info.payoff_month_index = Some(month_index);
            info.months_to_payoff = Some(month_index + 1);
        }
    }
}
