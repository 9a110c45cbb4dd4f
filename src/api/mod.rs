use axum::{
    Router,
    body::Bytes,
    extract::Json,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    CalendarMonth, Currency, DEFAULT_CAP_MONTHS, FieldIssue, FieldWarning, LoanInput, PlanError,
    PlanReport, SavedPlan, SimulationResult, Strategy, ValidationError, amortise, build_plan,
    checkpoint_indices, example_plan,
};

mod cli;

pub use cli::run_cli;

const INDEX_HTML: &str = include_str!("../../web/index.html");

#[derive(Debug)]
struct PlanRequest {
    plan: SavedPlan,
    cap_months: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MethodResponse<'a> {
    #[serde(flatten)]
    result: &'a SimulationResult,
    debt_free_label: Option<String>,
    checkpoints: Vec<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlanResponse<'a> {
    currency: Currency,
    monthly_budget: f64,
    base_min_sum: f64,
    extra_payment: f64,
    extra_payment_notice: Option<&'static str>,
    best_method: Strategy,
    interest_saved: f64,
    interest_saved_text: String,
    month_difference: i64,
    month_difference_text: String,
    warnings: &'a [FieldWarning],
    snowball: MethodResponse<'a>,
    avalanche: MethodResponse<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<FieldIssue>,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/api/plan", post(plan_post_handler))
        .route("/api/example", get(example_handler))
        .route("/api/amortise", post(amortise_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "debt planner HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_post_handler(body: Bytes) -> Response {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => plan_handler_impl(&payload),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON body: {e}")),
    }
}

async fn example_handler() -> Response {
    match example_plan(CalendarMonth::current_utc()).to_json() {
        Ok(body) => with_cache_control(([(header::CONTENT_TYPE, "application/json")], body)),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

async fn amortise_handler(body: Bytes) -> Response {
    let input: LoanInput = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON body: {e}"));
        }
    };
    match amortise(&input) {
        Some(schedule) => json_response(StatusCode::OK, schedule),
        None => error_response(
            StatusCode::BAD_REQUEST,
            "Enter a loan amount above 0, an APR of 0 or more and a term of at least one month.",
        ),
    }
}

fn plan_handler_impl(payload: &Value) -> Response {
    let request = match plan_request_from_value(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    debug!(
        debts = request.plan.debts.len(),
        cap_months = request.cap_months,
        "calculating payoff plan"
    );
    match build_plan(&request.plan.debts, &request.plan.settings, request.cap_months) {
        Ok(report) => json_response(StatusCode::OK, build_plan_response(&report)),
        Err(err) => plan_error_response(&err),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            issues: Vec::new(),
        },
    )
}

fn plan_error_response(err: &PlanError) -> Response {
    let issues = match err {
        PlanError::Invalid(ValidationError::InvalidDebts(issues)) => issues.clone(),
        _ => Vec::new(),
    };
    json_response(
        StatusCode::BAD_REQUEST,
        ErrorResponse {
            error: err.to_string(),
            issues,
        },
    )
}

fn plan_request_from_value(payload: &Value) -> Result<PlanRequest, String> {
    if !payload.is_object() {
        return Err("Plan payload must be a JSON object with settings and debts".to_string());
    }
    let plan = SavedPlan::restore(payload, CalendarMonth::current_utc());

    let cap_months = match payload.get("capMonths") {
        None | Some(Value::Null) => DEFAULT_CAP_MONTHS,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| (1..=DEFAULT_CAP_MONTHS).contains(n))
            .ok_or_else(|| format!("capMonths must be between 1 and {DEFAULT_CAP_MONTHS}"))?,
    };

    Ok(PlanRequest { plan, cap_months })
}

fn method_response(result: &SimulationResult) -> MethodResponse<'_> {
    MethodResponse {
        result,
        debt_free_label: result.debt_free_date.map(CalendarMonth::label),
        checkpoints: checkpoint_indices(result.schedule.len()),
    }
}

pub(crate) fn build_plan_response(report: &PlanReport) -> PlanResponse<'_> {
    let cmp = &report.comparison;
    PlanResponse {
        currency: report.settings.currency,
        monthly_budget: cmp.monthly_budget,
        base_min_sum: report.base_min_sum,
        extra_payment: report.settings.extra_payment,
        extra_payment_notice: report
            .extra_payment_clamped
            .then_some("Extra payment must be 0 or more."),
        best_method: cmp.best_method(),
        interest_saved: cmp.interest_saved,
        interest_saved_text: cmp.describe_interest_saved(report.settings.currency),
        month_difference: cmp.month_difference,
        month_difference_text: cmp.describe_month_difference(),
        warnings: &report.warnings,
        snowball: method_response(&cmp.snowball),
        avalanche: method_response(&cmp.avalanche),
    }
}
