use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A raw document as returned by the store.
pub type Document = serde_json::Map<String, Value>;

/// Gender value that marks the girls' section of the roster.
pub const GIRL_MARKER: &str = "मुलगी";

/// Sort key for students without a roll number; they go last.
pub const MISSING_ROLL_SENTINEL: i64 = 10_000_000;

pub fn class_division_key(class_no: u32, division: &str) -> String {
    format!("{}-{}", class_no, division.to_uppercase())
}

/// `{classNo}-{DIV}_{YYYY}-{MM}`
pub fn snapshot_id(class_no: u32, division: &str, period: Period) -> String {
    format!(
        "{}_{}-{:02}",
        class_division_key(class_no, division),
        period.year,
        period.month
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOfBirth {
    Date(NaiveDate),
    Text(String),
}

impl Default for DateOfBirth {
    fn default() -> Self {
        DateOfBirth::Text(String::new())
    }
}

impl DateOfBirth {
    pub fn display(&self) -> String {
        match self {
            DateOfBirth::Date(d) => d.format("%d-%m-%Y").to_string(),
            DateOfBirth::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RollNo {
    Number(i64),
    Text(String),
    #[default]
    Missing,
}

impl RollNo {
    pub fn sort_key(&self) -> i64 {
        match self {
            RollNo::Number(n) => *n,
            _ => MISSING_ROLL_SENTINEL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub reg_no: String,
    #[serde(deserialize_with = "lenient_text")]
    pub concession: String,
    #[serde(deserialize_with = "lenient_text")]
    pub caste: String,
    #[serde(deserialize_with = "lenient_text")]
    pub category_mr: String,
    #[serde(deserialize_with = "lenient_text")]
    pub category_en: String,
    #[serde(deserialize_with = "lenient_dob")]
    pub dob: DateOfBirth,
    #[serde(deserialize_with = "lenient_roll_no")]
    pub roll_no: RollNo,
    #[serde(deserialize_with = "lenient_text")]
    pub full_name_mr: String,
    #[serde(deserialize_with = "lenient_text")]
    pub mother_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(deserialize_with = "lenient_text")]
    pub class_division: String,
}

impl StudentRecord {
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc.clone()))
    }

    pub fn is_girl(&self) -> bool {
        self.gender == GIRL_MARKER
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectRecord {
    #[serde(deserialize_with = "lenient_opt_text")]
    pub name_mr: Option<String>,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub active: bool,
    #[serde(deserialize_with = "lenient_int")]
    pub order: i64,
}

impl Default for SubjectRecord {
    fn default() -> Self {
        Self {
            name_mr: None,
            name: None,
            active: true,
            order: 0,
        }
    }
}

impl SubjectRecord {
    /// Localized name, then default name, then empty.
    pub fn display_name(&self) -> &str {
        [self.name_mr.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// Per class-division metadata (`catalog/{classNo}-{DIV}`).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDivisionMeta {
    pub class_teacher: String,
    pub month: i64,
    pub year: i64,
    pub subjects: Vec<SubjectRecord>,
    pub document: Document,
}

impl Default for ClassDivisionMeta {
    fn default() -> Self {
        Self {
            class_teacher: "N/A".to_string(),
            month: 1,
            year: 2025,
            subjects: Vec::new(),
            document: Document::new(),
        }
    }
}

impl ClassDivisionMeta {
    pub fn from_document(doc: Option<Document>) -> Self {
        let Some(doc) = doc else {
            return Self::default();
        };
        let defaults = Self::default();
        let class_teacher = match doc.get("classTeacher") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => defaults.class_teacher,
            Some(other) => other.to_string(),
        };
        let month = doc.get("month").and_then(Value::as_i64).unwrap_or(defaults.month);
        let year = doc.get("year").and_then(Value::as_i64).unwrap_or(defaults.year);
        let subjects = doc
            .get("subjects")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|v| v.is_object())
                    .filter_map(|v| match serde_json::from_value::<SubjectRecord>(v.clone()) {
                        Ok(s) => Some(s),
                        Err(e) => {
                            tracing::warn!("skipping malformed subject entry: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            class_teacher,
            month,
            year,
            subjects,
            document: doc,
        }
    }
}

/// A roster frozen for one month, `roster_records/{classNo}-{DIV}_{YYYY}-{MM}`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSnapshot {
    pub id: String,
    pub students: Vec<StudentRecord>,
}

impl HistoricalSnapshot {
    /// `None` when `studentsData` is absent, not an array, or empty. Entries
    /// that are not objects are dropped; the rest keep their order.
    pub fn from_document(id: &str, doc: &Document) -> Result<Option<Self>, serde_json::Error> {
        let items = match doc.get("studentsData") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Ok(None),
        };
        let mut students = Vec::with_capacity(items.len());
        for item in items {
            match item.as_object() {
                Some(obj) => students.push(StudentRecord::from_document(obj)?),
                None => tracing::warn!("{}: skipping non-object studentsData entry", id),
            }
        }
        Ok(Some(Self {
            id: id.to_string(),
            students,
        }))
    }
}

/// A reporting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    /// A valid override needs both parts, month in 1..=12 and a positive year.
    pub fn from_override(month: Option<i64>, year: Option<i64>) -> Option<Period> {
        let (month, year) = (month?, year?);
        if !(1..=12).contains(&month) || year <= 0 {
            return None;
        }
        Some(Period {
            month: u32::try_from(month).ok()?,
            year: i32::try_from(year).ok()?,
        })
    }

    pub fn from_date(date: NaiveDate) -> Period {
        Period {
            month: date.month(),
            year: date.year(),
        }
    }
}

/// Source of "today" for anything that falls back to the current month.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Request-scoped values shared by the sheet builders.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub teacher_name: String,
    pub month: i64,
    pub year: i64,
    pub class_label: String,
    pub division_label: String,
    pub division: String,
    pub selected_month: Option<i64>,
    pub selected_year: Option<i64>,
}

impl ReportData {
    /// The override if valid, otherwise the clock's current month.
    pub fn resolve_period(&self, clock: &dyn Clock) -> Period {
        Period::from_override(self.selected_month, self.selected_year)
            .unwrap_or_else(|| Period::from_date(clock.today()))
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_roll_no<'de, D: Deserializer<'de>>(d: D) -> Result<RollNo, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => RollNo::Number(i),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                RollNo::Number(f as i64)
            }
            _ => RollNo::Text(n.to_string()),
        },
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => RollNo::Number(i),
            Err(_) if s.is_empty() => RollNo::Missing,
            Err(_) => RollNo::Text(s),
        },
        _ => RollNo::Missing,
    })
}

/// Store timestamps arrive as `{"seconds": ..}` (or `_seconds`); those become
/// dates, everything else is kept as text.
fn lenient_dob<'de, D: Deserializer<'de>>(d: D) -> Result<DateOfBirth, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64);
            match seconds.and_then(|s| DateTime::from_timestamp(s, 0)) {
                Some(dt) => DateOfBirth::Date(dt.date_naive()),
                None => DateOfBirth::Text(String::new()),
            }
        }
        Value::String(s) => DateOfBirth::Text(s),
        Value::Number(n) => DateOfBirth::Text(n.to_string()),
        _ => DateOfBirth::Text(String::new()),
    })
}
