//! HTTP routes for the catalog service.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::labels::normalize_division;
use crate::model::Clock;
use crate::report::{generate_catalog_report, ReportRequest};
use crate::store::CatalogStore;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub assets_dir: Option<PathBuf>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateBody {
    pub class_no: u32,
    pub division: String,
    #[serde(default)]
    pub return_inline: Option<bool>,
    pub selected_month: Option<i64>,
    pub selected_year: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalBody {
    pub class_no: u32,
    pub division: String,
    pub selected_month: i64,
    pub selected_year: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .route("/generate-historical-report", post(generate_historical))
        .with_state(state)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn generate(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Response {
    info!("POST /generate class={} division={:?}", body.class_no, body.division);
    let division = normalize_division(&body.division);
    if division.is_empty() {
        return bad_request("division is required");
    }
    let filename = report_filename(body.class_no, &division, body.selected_month.zip(body.selected_year));
    let mut req = ReportRequest::new(body.class_no, division);
    req.selected_month = body.selected_month;
    req.selected_year = body.selected_year;

    match render(state, req).await {
        Ok(bytes) => xlsx_response(&filename, bytes, body.return_inline.unwrap_or(false)),
        Err(detail) => bad_request(&detail),
    }
}

pub async fn generate_historical(
    State(state): State<AppState>,
    Json(body): Json<HistoricalBody>,
) -> Response {
    info!(
        "POST /generate-historical-report class={} division={:?} {}-{:02}",
        body.class_no, body.division, body.selected_year, body.selected_month
    );
    let division = normalize_division(&body.division);
    if division.is_empty() {
        return bad_request("division is required");
    }
    let filename = report_filename(
        body.class_no,
        &division,
        Some((body.selected_month, body.selected_year)),
    );
    let req = ReportRequest::new(body.class_no, division)
        .with_period(body.selected_month, body.selected_year);

    match render(state, req).await {
        Ok(bytes) => xlsx_response(&filename, bytes, false),
        Err(detail) => bad_request(&detail),
    }
}

/// `catalog_{class}-{DIV}.xlsx`, with `_{YYYY}-{MM}` when a month is given.
pub fn report_filename(class_no: u32, division: &str, period: Option<(i64, i64)>) -> String {
    match period {
        Some((month, year)) => format!("catalog_{}-{}_{}-{:02}.xlsx", class_no, division, year, month),
        None => format!("catalog_{}-{}.xlsx", class_no, division),
    }
}

async fn render(state: AppState, mut req: ReportRequest) -> Result<Vec<u8>, String> {
    req.assets_dir = state.assets_dir.clone();
    let joined = tokio::task::spawn_blocking(move || {
        generate_catalog_report(state.store.as_ref(), state.clock.as_ref(), &req)
    })
    .await;
    match joined {
        Ok(Ok(output)) => output
            .bytes
            .ok_or_else(|| "report produced no bytes".to_string()),
        Ok(Err(e)) => {
            warn!("report failed: {}", e);
            Err(e.to_string())
        }
        Err(e) => {
            warn!("report task failed: {}", e);
            Err(e.to_string())
        }
    }
}

fn xlsx_response(filename: &str, bytes: Vec<u8>, inline: bool) -> Response {
    let disposition = if inline { "inline" } else { "attachment" };
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn bad_request(detail: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}
