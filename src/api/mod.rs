mod report;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::{PlanField, PlanSummary, Planner};

pub use report::render_report;

#[derive(Debug, Parser)]
#[command(name = "fi_calculator", about = "Financial independence calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the JSON API and the printable report over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the plan summary as JSON
    Plan(PlanArgs),
    /// Print the printable HTML report
    Report(PlanArgs),
}

#[derive(Debug, Default, Clone, Args)]
pub struct PlanArgs {
    #[arg(long, help = "Current portfolio value")]
    principal: Option<String>,
    #[arg(long, help = "Amount invested every month")]
    monthly_contribution: Option<String>,
    #[arg(long, help = "Expected annual return in percent")]
    annual_return_rate: Option<String>,
    #[arg(long, help = "Expected annual inflation in percent")]
    annual_inflation_rate: Option<String>,
    #[arg(long, help = "Safe withdrawal rate in percent")]
    safe_withdrawal_rate: Option<String>,
    #[arg(long, help = "Monthly spending once financially independent")]
    monthly_expenses: Option<String>,
    #[arg(long, help = "Years shown in the yearly series")]
    horizon_years: Option<String>,
    #[arg(long, help = "Years in which FI should be reached")]
    target_years: Option<String>,
}

impl PlanArgs {
    fn entries(&self) -> [(PlanField, Option<&str>); 8] {
        [
            (PlanField::Principal, self.principal.as_deref()),
            (
                PlanField::MonthlyContribution,
                self.monthly_contribution.as_deref(),
            ),
            (
                PlanField::AnnualReturnRate,
                self.annual_return_rate.as_deref(),
            ),
            (
                PlanField::AnnualInflationRate,
                self.annual_inflation_rate.as_deref(),
            ),
            (
                PlanField::SafeWithdrawalRate,
                self.safe_withdrawal_rate.as_deref(),
            ),
            (PlanField::MonthlyExpenses, self.monthly_expenses.as_deref()),
            (PlanField::HorizonYears, self.horizon_years.as_deref()),
            (PlanField::TargetYears, self.target_years.as_deref()),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlanError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            PlanError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, "rejected plan request");
        error_response(status, &self.to_string())
    }
}

/// A payload value: JSON numbers and text are both accepted and go through
/// the same text parsing as a form input. Percent fields are in percent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum FieldInput {
    Number(f64),
    Text(String),
}

impl FieldInput {
    fn to_text(&self) -> String {
        match self {
            FieldInput::Number(n) => n.to_string(),
            FieldInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    principal: Option<FieldInput>,
    #[serde(alias = "monthly")]
    monthly_contribution: Option<FieldInput>,
    #[serde(alias = "annualReturn")]
    annual_return_rate: Option<FieldInput>,
    #[serde(alias = "annualInflation", alias = "inflation")]
    annual_inflation_rate: Option<FieldInput>,
    #[serde(alias = "swr")]
    safe_withdrawal_rate: Option<FieldInput>,
    #[serde(alias = "expenses")]
    monthly_expenses: Option<FieldInput>,
    #[serde(alias = "horizon")]
    horizon_years: Option<FieldInput>,
    target_years: Option<FieldInput>,
}

impl PlanPayload {
    fn into_args(self) -> PlanArgs {
        let text = |input: Option<FieldInput>| input.map(|v| v.to_text());
        PlanArgs {
            principal: text(self.principal),
            monthly_contribution: text(self.monthly_contribution),
            annual_return_rate: text(self.annual_return_rate),
            annual_inflation_rate: text(self.annual_inflation_rate),
            safe_withdrawal_rate: text(self.safe_withdrawal_rate),
            monthly_expenses: text(self.monthly_expenses),
            horizon_years: text(self.horizon_years),
            target_years: text(self.target_years),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldState {
    key: &'static str,
    text: String,
    value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    inputs: Vec<FieldState>,
    #[serde(flatten)]
    summary: PlanSummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Applies each provided value to a default planner, as if typed into the
/// field and committed. Out-of-range values are clamped; text that does not
/// parse is rejected.
pub fn build_planner(args: &PlanArgs) -> Result<Planner, PlanError> {
    let mut planner = Planner::default();
    for (field, raw) in args.entries() {
        let Some(raw) = raw else { continue };
        if !planner.submit(field, raw) {
            return Err(PlanError::InvalidValue {
                field: field.key(),
                value: raw.to_string(),
            });
        }
    }
    Ok(planner)
}

pub fn plan_json(args: &PlanArgs) -> Result<String, PlanError> {
    let planner = build_planner(args)?;
    let response = build_plan_response(&planner);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub fn report_html(args: &PlanArgs) -> Result<String, PlanError> {
    let planner = build_planner(args)?;
    Ok(render_report(&planner, &planner.summary()))
}

fn field_states(planner: &Planner) -> Vec<FieldState> {
    PlanField::ALL
        .iter()
        .map(|&field| FieldState {
            key: field.key(),
            text: planner.field(field).text().to_string(),
            value: planner.value(field),
        })
        .collect()
}

fn build_plan_response(planner: &Planner) -> PlanResponse {
    PlanResponse {
        inputs: field_states(planner),
        summary: planner.summary(),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "FI calculator listening");
    tracing::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(report_handler))
        .route("/report", get(report_handler))
        .route("/api/defaults", get(defaults_handler))
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, field_states(&Planner::default()))
}

async fn plan_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    plan_handler_impl(payload)
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    plan_handler_impl(payload)
}

fn plan_handler_impl(payload: PlanPayload) -> Response {
    match build_planner(&payload.into_args()) {
        Ok(planner) => json_response(StatusCode::OK, build_plan_response(&planner)),
        Err(err) => err.into_response(),
    }
}

async fn report_handler(Query(payload): Query<PlanPayload>) -> Response {
    match build_planner(&payload.into_args()) {
        Ok(planner) => with_cache_control(Html(render_report(&planner, &planner.summary()))),
        Err(err) => err.into_response(),
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
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn payload_from_json(json: &str) -> PlanPayload {
        serde_json::from_str(json).expect("valid payload")
    }

    #[test]
    fn build_planner_defaults_without_args() {
        let planner = build_planner(&PlanArgs::default()).expect("defaults are valid");
        assert_eq!(planner, Planner::default());
    }

    #[test]
    fn build_planner_reads_percent_fields_in_percent() {
        let args = PlanArgs {
            annual_return_rate: Some("7,5".to_string()),
            safe_withdrawal_rate: Some("3.5".to_string()),
            ..PlanArgs::default()
        };
        let planner = build_planner(&args).expect("valid args");
        assert_approx(planner.value(PlanField::AnnualReturnRate), 0.075);
        assert_approx(planner.value(PlanField::SafeWithdrawalRate), 0.035);
        assert_eq!(planner.field(PlanField::AnnualReturnRate).text(), "7.5");
    }

    #[test]
    fn build_planner_clamps_out_of_range_values() {
        let args = PlanArgs {
            principal: Some("5000000".to_string()),
            horizon_years: Some("200".to_string()),
            ..PlanArgs::default()
        };
        let planner = build_planner(&args).expect("valid args");
        assert_approx(planner.value(PlanField::Principal), 1_000_000.0);
        assert_eq!(planner.horizon_years(), 80);
    }

    #[test]
    fn build_planner_rejects_unparsable_text() {
        let args = PlanArgs {
            monthly_expenses: Some("lots".to_string()),
            ..PlanArgs::default()
        };
        let err = build_planner(&args).expect_err("must reject text");
        assert!(err.to_string().contains("monthlyExpenses"));
        assert!(matches!(err, PlanError::InvalidValue { .. }));
    }

    #[test]
    fn payload_accepts_numbers_text_and_aliases() {
        let payload = payload_from_json(
            r#"{"principal": 25000, "monthly": "450", "swr": 3.5, "horizon": "10"}"#,
        );
        let planner = build_planner(&payload.into_args()).expect("valid payload");
        assert_approx(planner.value(PlanField::Principal), 25_000.0);
        assert_approx(planner.value(PlanField::MonthlyContribution), 450.0);
        assert_approx(planner.value(PlanField::SafeWithdrawalRate), 0.035);
        assert_eq!(planner.horizon_years(), 10);
    }

    #[test]
    fn query_payload_parses_text_values() {
        let uri: Uri = "/api/plan?annualReturnRate=5&targetYears=20"
            .parse()
            .expect("valid uri");
        let Query(payload) = Query::<PlanPayload>::try_from_uri(&uri).expect("valid query");
        let planner = build_planner(&payload.into_args()).expect("valid payload");
        assert_approx(planner.value(PlanField::AnnualReturnRate), 0.05);
        assert_eq!(planner.target_years(), 20);
    }

    #[test]
    fn plan_response_serialization_contains_expected_fields() {
        let mut planner = Planner::default();
        assert!(planner.submit(PlanField::HorizonYears, "2"));
        let json = serde_json::to_value(build_plan_response(&planner)).expect("serializable");

        for key in [
            "inputs",
            "annualExpenses",
            "fiTargetToday",
            "maxHorizonYears",
            "horizon",
            "yearsToFi",
            "targetYears",
            "futureTargetAtTargetYears",
            "requiredMonthlyContribution",
            "series",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert!(json["horizon"].get("monthsToReach").is_some());
        assert_eq!(json["series"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["series"][1]["yearLabel"], "1 an");
        assert_eq!(json["inputs"][0]["key"], "principal");
        assert_eq!(json["inputs"][0]["text"], "18486.05");
    }

    #[test]
    fn unreached_fi_serializes_as_null() {
        let args = PlanArgs {
            monthly_contribution: Some("0".to_string()),
            annual_return_rate: Some("0".to_string()),
            ..PlanArgs::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&plan_json(&args).expect("plan json")).expect("valid json");
        assert!(json["horizon"]["monthsToReach"].is_null());
        assert!(json["yearsToFi"].is_null());
    }

    #[test]
    fn invalid_payload_maps_to_bad_request() {
        let payload = payload_from_json(r#"{"targetYears": "soon"}"#);
        let response = plan_handler_impl(payload);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
    }

    #[test]
    fn valid_payload_returns_ok() {
        let response = plan_handler_impl(PlanPayload::default());
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn assert_no_store(response: &Response) {
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_no_store(&response);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn defaults_lists_every_field_with_default_text() {
        let response = defaults_handler().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        let json = body_json(response).await;
        let fields = json.as_array().expect("array of fields");
        assert_eq!(fields.len(), PlanField::ALL.len());
        assert_eq!(fields[2]["key"], "annualReturnRate");
        assert_eq!(fields[2]["text"], "6.0");
        assert_eq!(fields[7]["key"], "targetYears");
        assert_eq!(fields[7]["value"], 15.0);
    }

    #[tokio::test]
    async fn report_route_serves_uncached_html() {
        let uri: Uri = "/report?horizonYears=4".parse().expect("valid uri");
        let query = Query::<PlanPayload>::try_from_uri(&uri).expect("valid query");
        let response = report_handler(query).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_no_store(&response);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let html = String::from_utf8(bytes.to_vec()).expect("utf-8 html");
        assert!(html.contains("<strong>Horizon:</strong> 4 ans"));
    }

    #[tokio::test]
    async fn report_route_rejects_unparsable_query() {
        let uri: Uri = "/report?principal=abc".parse().expect("valid uri");
        let query = Query::<PlanPayload>::try_from_uri(&uri).expect("valid query");
        let response = report_handler(query).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("principal"))
        );
    }

    #[test]
    fn report_html_uses_cli_values() {
        let args = PlanArgs {
            target_years: Some("20".to_string()),
            ..PlanArgs::default()
        };
        let html = report_html(&args).expect("report");
        assert!(html.contains("Objectif FI:</strong> 20 ans"));
    }
}
