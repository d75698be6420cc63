//! Report assembly: metadata and roster lookup, the three sheet builders, and
//! workbook serialization.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::cover::build_cover_sheet;
use crate::labels::{class_label, division_label, normalize_division};
use crate::layout::Sheet;
use crate::model::{
    class_division_key, snapshot_id, ClassDivisionMeta, Clock, HistoricalSnapshot, Period, ReportData,
    StudentRecord,
};
use crate::roster::build_roster_sheet;
use crate::store::{CatalogStore, StoreError};
use crate::subjects::{build_subject_sheet, Selector, TeacherSources};

pub const ROSTER_SHEET_NAME: &str = "Catalog";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NoHistoricalData(String),
    #[error("{0}")]
    EmptyRoster(String),
    #[error("{0}")]
    Unhandled(String),
}

impl From<StoreError> for ReportError {
    fn from(e: StoreError) -> Self {
        ReportError::Unhandled(e.to_string())
    }
}

impl From<XlsxError> for ReportError {
    fn from(e: XlsxError) -> Self {
        ReportError::Unhandled(e.to_string())
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Unhandled(e.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Unhandled(e.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub class_no: u32,
    pub division: String,
    pub selected_month: Option<i64>,
    pub selected_year: Option<i64>,
    pub assets_dir: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub return_bytes: bool,
}

impl ReportRequest {
    pub fn new(class_no: u32, division: impl Into<String>) -> Self {
        Self {
            class_no,
            division: division.into(),
            return_bytes: true,
            ..Default::default()
        }
    }

    pub fn with_period(mut self, month: i64, year: i64) -> Self {
        self.selected_month = Some(month);
        self.selected_year = Some(year);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportOutput {
    pub bytes: Option<Vec<u8>>,
    pub path: Option<PathBuf>,
}

/// Live roster in roll-number order. Students without a roll number keep
/// their store order after everyone else.
fn live_roster(store: &dyn CatalogStore, key: &str) -> Result<Vec<StudentRecord>, ReportError> {
    let mut students = store
        .active_students(key)?
        .iter()
        .map(StudentRecord::from_document)
        .collect::<Result<Vec<_>, _>>()?;
    students.sort_by_key(|s| s.roll_no.sort_key());
    Ok(students)
}

fn historical_roster(
    store: &dyn CatalogStore,
    record_id: &str,
) -> Result<Vec<StudentRecord>, ReportError> {
    let snapshot = store.roster_record(record_id)?.ok_or_else(|| {
        ReportError::NoHistoricalData(format!(
            "No historical roster found: roster_records/{}",
            record_id
        ))
    })?;
    let snapshot = HistoricalSnapshot::from_document(record_id, &snapshot)?.ok_or_else(|| {
        ReportError::NoHistoricalData(format!(
            "Historical roster for {} has no studentsData.",
            record_id
        ))
    })?;
    Ok(snapshot.students)
}

/// First day of `period`, with the year held inside Excel's 1900..=9999.
fn creation_date(period: Period) -> Result<ExcelDateTime, XlsxError> {
    let year = u16::try_from(period.year.clamp(1900, 9999)).unwrap_or(1900);
    let month = u8::try_from(period.month).unwrap_or(1);
    ExcelDateTime::from_ymd(year, month, 1)
}

fn write_sheets(sheets: &[Sheet], period: Period) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let created = creation_date(period)?;
    let properties = DocProperties::new().set_creation_datetime(&created);
    workbook.set_properties(&properties);

    for sheet in sheets {
        let mut worksheet = Worksheet::new();
        sheet.render(&mut worksheet)?;
        workbook.push_worksheet(worksheet);
    }
    workbook.save_to_buffer()
}

fn save(bytes: &[u8], path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Build the three-sheet catalog workbook for one class-division.
///
/// A valid `selected_month`/`selected_year` pair reads the frozen snapshot for
/// that month; anything else reads the live roster and stamps the cover with
/// the clock's current month.
pub fn generate_catalog_report(
    store: &dyn CatalogStore,
    clock: &dyn Clock,
    req: &ReportRequest,
) -> Result<ReportOutput, ReportError> {
    let division = normalize_division(&req.division);
    if division.is_empty() {
        return Err(ReportError::Validation("division is required".to_string()));
    }
    let key = class_division_key(req.class_no, &division);
    info!("Generating catalog for {}", key);

    let meta = ClassDivisionMeta::from_document(store.catalog_document(&key)?);
    if meta.document.is_empty() {
        info!("No metadata for {}, using defaults", key);
    }

    let students = match Period::from_override(req.selected_month, req.selected_year) {
        Some(period) => {
            let record_id = snapshot_id(req.class_no, &division, period);
            info!("Historical mode: reading roster_records/{}", record_id);
            historical_roster(store, &record_id)?
        }
        None => live_roster(store, &key)?,
    };
    if students.is_empty() {
        return Err(ReportError::EmptyRoster(format!(
            "No students to print for {}.",
            key
        )));
    }
    info!("{} students for {}", students.len(), key);

    let data = ReportData {
        teacher_name: meta.class_teacher.clone(),
        month: meta.month,
        year: meta.year,
        class_label: class_label(&req.class_no.to_string()),
        division_label: division_label(&division),
        division: division.clone(),
        selected_month: req.selected_month,
        selected_year: req.selected_year,
    };
    let period = data.resolve_period(clock);

    let mut roster = build_roster_sheet(req.class_no, &division, &students, None);
    roster.rename(ROSTER_SHEET_NAME);
    let cover = build_cover_sheet(&data, req.assets_dir.as_deref(), clock);

    let class_selector = Selector::Id(req.class_no.to_string());
    let division_selector = Selector::Id(division.clone());
    let sources = TeacherSources {
        meta: Some(&meta.document),
        class: Some(&class_selector),
        division: Some(&division_selector),
    };
    let back = build_subject_sheet(&meta.subjects, &sources);

    let mut sheets = [cover, roster, back];
    for sheet in &mut sheets {
        sheet.set_page_layout_view();
    }
    let bytes = write_sheets(&sheets, period)?;

    let path = match &req.save_path {
        Some(path) => {
            save(&bytes, path)?;
            info!("Saved {} to {}", key, path.display());
            Some(path.clone())
        }
        None => None,
    };

    Ok(ReportOutput {
        bytes: req.return_bytes.then_some(bytes),
        path,
    })
}
