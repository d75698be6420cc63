use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use catalog_report::http::{
    generate, generate_historical, health, AppState, GenerateBody, HistoricalBody,
    XLSX_CONTENT_TYPE,
};
use catalog_report::model::Document;
use catalog_report::{FixedClock, MemoryStore};
use chrono::NaiveDate;
use serde_json::{json, Value};

fn doc(v: Value) -> Document {
    v.as_object().cloned().unwrap()
}

fn state() -> AppState {
    let store = MemoryStore::new()
        .with_student(doc(json!({"status": "active", "classDivision": "10-A", "rollNo": 1})))
        .with_roster_record(
            "10-A_2025-07",
            doc(json!({"studentsData": [{"fullNameMr": "अ", "rollNo": 1}]})),
        );
    AppState {
        store: Arc::new(store),
        assets_dir: None,
        clock: Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 10, 5).unwrap())),
    }
}

fn body(class_no: u32, division: &str) -> GenerateBody {
    GenerateBody {
        class_no,
        division: division.to_string(),
        return_inline: None,
        selected_month: None,
        selected_year: None,
    }
}

fn disposition(resp: &Response) -> String {
    resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string()
}

async fn detail(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    value["detail"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let Json(value) = health().await;
    assert_eq!(value, json!({"ok": true}));
}

#[tokio::test]
async fn generate_returns_attachment_by_default() {
    let resp = generate(State(state()), Json(body(10, " a "))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert_eq!(disposition(&resp), "attachment; filename=\"catalog_10-A.xlsx\"");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn generate_inline_with_period_suffix() {
    let mut req = body(10, "A");
    req.return_inline = Some(true);
    req.selected_month = Some(7);
    req.selected_year = Some(2025);
    let resp = generate(State(state()), Json(req)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(disposition(&resp), "inline; filename=\"catalog_10-A_2025-07.xlsx\"");
}

#[tokio::test]
async fn null_return_inline_means_attachment() {
    let req: GenerateBody = serde_json::from_value(json!({
        "class_no": 10,
        "division": "A",
        "return_inline": null,
    }))
    .unwrap();
    let resp = generate(State(state()), Json(req)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(disposition(&resp), "attachment; filename=\"catalog_10-A.xlsx\"");
}

#[tokio::test]
async fn blank_division_is_rejected() {
    let resp = generate(State(state()), Json(body(10, "   "))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(resp).await, "division is required");
}

#[tokio::test]
async fn empty_class_is_a_client_error() {
    let resp = generate(State(state()), Json(body(4, "C"))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(resp).await, "No students to print for 4-C.");
}

#[tokio::test]
async fn historical_report_is_always_attachment() {
    let req = HistoricalBody {
        class_no: 10,
        division: "a".to_string(),
        selected_month: 7,
        selected_year: 2025,
    };
    let resp = generate_historical(State(state()), Json(req)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        disposition(&resp),
        "attachment; filename=\"catalog_10-A_2025-07.xlsx\""
    );
}

#[tokio::test]
async fn missing_snapshot_is_a_client_error() {
    let req = HistoricalBody {
        class_no: 10,
        division: "A".to_string(),
        selected_month: 8,
        selected_year: 2025,
    };
    let resp = generate_historical(State(state()), Json(req)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        detail(resp).await,
        "No historical roster found: roster_records/10-A_2025-08"
    );
}
