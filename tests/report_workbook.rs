use std::io::Cursor;

use calamine::{open_workbook_from_rs, DataType, Range, Reader, Xlsx};
use catalog_report::model::Document;
use catalog_report::{
    generate_catalog_report, FixedClock, MemoryStore, ReportError, ReportRequest,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

fn doc(v: Value) -> Document {
    v.as_object().cloned().unwrap()
}

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2026, 10, 5).unwrap())
}

fn student(name: &str, roll: Value, gender: &str) -> Document {
    doc(json!({
        "status": "active",
        "classDivision": "10-A",
        "fullNameMr": name,
        "rollNo": roll,
        "gender": gender,
        "regNo": 100,
        "dob": {"seconds": 1_262_304_000},
    }))
}

fn live_store() -> MemoryStore {
    MemoryStore::new()
        .with_catalog(
            "10-A",
            doc(json!({
                "classTeacher": "सौ. कुलकर्णी",
                "subjects": [
                    {"nameMr": "गणित", "order": 2},
                    {"nameMr": "मराठी", "order": 1},
                    {"nameMr": "जुना", "order": 0, "active": false},
                ],
            })),
        )
        .with_student(student("तिसरा", json!(3), "मुलगा"))
        .with_student(student("पहिली", json!(1), "मुलगी"))
        .with_student(student("शेवटचा", Value::Null, "मुलगा"))
        .with_student(student("दुसरा", json!("2"), "मुलगा"))
        .with_student(doc(json!({"status": "left", "classDivision": "10-A", "rollNo": 0})))
}

fn sheet(bytes: &[u8], name: &str) -> Range<DataType> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    workbook.worksheet_range(name).unwrap().unwrap()
}

fn text(range: &Range<DataType>, r: u32, c: u32) -> Option<String> {
    match range.get_value((r, c)) {
        Some(DataType::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Column I of the roster, from the first data row down.
fn roster_names(range: &Range<DataType>, count: u32) -> Vec<String> {
    (2..2 + count)
        .map(|r| text(range, r, 8).unwrap_or_default())
        .collect()
}

#[test]
fn live_workbook_has_three_sheets_in_order() {
    let store = live_store();
    let out = generate_catalog_report(&store, &clock(), &ReportRequest::new(10, " a ")).unwrap();
    let bytes = out.bytes.unwrap();

    let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Front Page", "Catalog", "Back Page"]);

    let roster = sheet(&bytes, "Catalog");
    assert_eq!(
        roster_names(&roster, 4),
        vec!["पहिली", "दुसरा", "तिसरा", "शेवटचा"]
    );
    assert_eq!(text(&roster, 2, 6).as_deref(), Some("01-01-2010"));

    let cover = sheet(&bytes, "Front Page");
    assert_eq!(text(&cover, 6, 1).as_deref(), Some("महिना: ऑक्टोबर २०२६"));
    assert_eq!(text(&cover, 6, 10).as_deref(), Some("इयत्ता: १० वी"));
    assert_eq!(text(&cover, 6, 11).as_deref(), Some("तुकडी: अ"));
    assert_eq!(text(&cover, 7, 1).as_deref(), Some("वर्गशिक्षक :- सौ. कुलकर्णी"));

    let back = sheet(&bytes, "Back Page");
    assert_eq!(text(&back, 2, 1).as_deref(), Some("मराठी"));
    assert_eq!(text(&back, 3, 1).as_deref(), Some("गणित"));
}

#[test]
fn historical_workbook_keeps_snapshot_order() {
    let store = MemoryStore::new().with_roster_record(
        "10-A_2025-08",
        doc(json!({
            "studentsData": [
                {"fullNameMr": "क", "rollNo": 9},
                {"fullNameMr": "ख", "rollNo": 1},
                {"fullNameMr": "ग"},
            ]
        })),
    );
    let req = ReportRequest::new(10, "A").with_period(8, 2025);
    let bytes = generate_catalog_report(&store, &clock(), &req)
        .unwrap()
        .bytes
        .unwrap();

    assert_eq!(roster_names(&sheet(&bytes, "Catalog"), 3), vec!["क", "ख", "ग"]);
    let cover = sheet(&bytes, "Front Page");
    assert_eq!(text(&cover, 6, 1).as_deref(), Some("महिना: ऑगस्ट २०२५"));
}

#[test]
fn missing_snapshot_is_no_historical_data() {
    let req = ReportRequest::new(10, "A").with_period(8, 2025);
    let err = generate_catalog_report(&live_store(), &clock(), &req).unwrap_err();
    match err {
        ReportError::NoHistoricalData(msg) => {
            assert_eq!(msg, "No historical roster found: roster_records/10-A_2025-08")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn snapshot_of_only_junk_is_empty_roster() {
    let store = MemoryStore::new()
        .with_roster_record("10-A_2025-08", doc(json!({"studentsData": [1, "two"]})));
    let req = ReportRequest::new(10, "A").with_period(8, 2025);
    let err = generate_catalog_report(&store, &clock(), &req).unwrap_err();
    assert!(matches!(err, ReportError::EmptyRoster(_)));
}

#[test]
fn class_without_students_is_empty_roster() {
    let err = generate_catalog_report(&live_store(), &clock(), &ReportRequest::new(9, "A"))
        .unwrap_err();
    assert_eq!(err.to_string(), "No students to print for 9-A.");
}

#[test]
fn invalid_override_falls_back_to_live_roster() {
    let req = ReportRequest::new(10, "A").with_period(13, 2025);
    let bytes = generate_catalog_report(&live_store(), &clock(), &req)
        .unwrap()
        .bytes
        .unwrap();
    let cover = sheet(&bytes, "Front Page");
    assert_eq!(text(&cover, 6, 1).as_deref(), Some("महिना: ऑक्टोबर २०२६"));
}

#[test]
fn identical_inputs_give_identical_bytes() {
    let store = live_store();
    let req = ReportRequest::new(10, "A");
    let first = generate_catalog_report(&store, &clock(), &req).unwrap().bytes.unwrap();
    let second = generate_catalog_report(&store, &clock(), &req).unwrap().bytes.unwrap();
    assert_eq!(first, second);
}

#[test]
fn save_path_writes_file_and_creates_parents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/nested/catalog.xlsx");
    let mut req = ReportRequest::new(10, "a");
    req.save_path = Some(path.clone());
    req.return_bytes = false;

    let out = generate_catalog_report(&live_store(), &clock(), &req).unwrap();
    assert!(out.bytes.is_none());
    assert_eq!(out.path.as_deref(), Some(path.as_path()));

    let written = std::fs::read(&path).unwrap();
    assert_eq!(&written[..2], b"PK");
}
