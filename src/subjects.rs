//! Back page: one row per active subject for the month's syllabus notes and
//! the class teacher's signature block.

use serde_json::Value;

use crate::layout::{cols, row, Align, Font, Line, Range, Sheet, TextStyle, POINTS_PER_CM};
use crate::model::{Document, SubjectRecord};

pub const SHEET_NAME: &str = "Back Page";
pub const FIRST_SUBJECT_ROW: u32 = row(3);

const FONT: &str = "Kokila";
const HEADER_ROW: u32 = row(2);
const SUBJECT_ROW_CM: f64 = 2.82;
const TEACHER_FIELD: &str = "classTeacher";

/// A class or division argument: either a plain identifier or a document
/// that may itself carry the teacher's name.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Id(String),
    Document(Document),
}

impl Selector {
    fn id(&self) -> Option<&str> {
        match self {
            Selector::Id(s) => Some(s),
            Selector::Document(_) => None,
        }
    }

    fn document(&self) -> Option<&Document> {
        match self {
            Selector::Document(d) => Some(d),
            Selector::Id(_) => None,
        }
    }
}

/// Everything the teacher-name lookup may read from.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeacherSources<'a> {
    pub meta: Option<&'a Document>,
    pub class: Option<&'a Selector>,
    pub division: Option<&'a Selector>,
}

type Strategy = fn(&TeacherSources<'_>) -> Option<String>;

/// Tried in order; the first non-empty name wins.
const STRATEGIES: [Strategy; 4] = [from_meta_field, from_nested_meta, from_selector_documents, from_aliases];

/// Field spellings accepted by the alias probe, compared after lowercasing
/// and dropping `_`, `-` and spaces.
const TEACHER_ALIASES: [&str; 2] = ["classteacher", "teacher"];

fn non_empty_text(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn from_meta_field(src: &TeacherSources<'_>) -> Option<String> {
    non_empty_text(src.meta?.get(TEACHER_FIELD))
}

fn from_nested_meta(src: &TeacherSources<'_>) -> Option<String> {
    let meta = src.meta?;
    let class = src.class?.id()?;
    let division = src.division?.id()?;
    [
        format!("{}-{}", class, division),
        format!("catalog-{}-{}", class, division),
    ]
    .iter()
    .filter_map(|key| meta.get(key).and_then(Value::as_object))
    .find_map(|nested| non_empty_text(nested.get(TEACHER_FIELD)))
}

fn from_selector_documents(src: &TeacherSources<'_>) -> Option<String> {
    [src.class, src.division]
        .into_iter()
        .flatten()
        .filter_map(Selector::document)
        .find_map(|doc| non_empty_text(doc.get(TEACHER_FIELD)))
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn from_aliases(src: &TeacherSources<'_>) -> Option<String> {
    let docs = [
        src.meta,
        src.class.and_then(Selector::document),
        src.division.and_then(Selector::document),
    ];
    docs.into_iter().flatten().find_map(|doc| {
        TEACHER_ALIASES.iter().find_map(|alias| {
            doc.iter()
                .filter(|(k, _)| normalize_key(k) == *alias)
                .find_map(|(_, v)| non_empty_text(Some(v)))
        })
    })
}

fn strip_quotes(name: String) -> String {
    if name.chars().count() >= 2 && name.starts_with('"') && name.ends_with('"') {
        name[1..name.len() - 1].trim().to_string()
    } else {
        name
    }
}

/// Resolve the class teacher's name; empty when no source has one.
pub fn resolve_teacher_name(sources: &TeacherSources<'_>) -> String {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(sources))
        .map(strip_quotes)
        .unwrap_or_default()
}

/// Active subjects ordered by `order`, ties kept in input order.
pub fn visible_subjects(subjects: &[SubjectRecord]) -> Vec<&SubjectRecord> {
    let mut rows: Vec<&SubjectRecord> = subjects.iter().filter(|s| s.active).collect();
    rows.sort_by_key(|s| s.order);
    rows
}

pub fn build_subject_sheet(subjects: &[SubjectRecord], sources: &TeacherSources<'_>) -> Sheet {
    let mut sheet = Sheet::new(SHEET_NAME);

    sheet.set_column_width(cols::A, 5.51);
    for c in cols::B..=cols::K {
        sheet.set_column_width(c, 8.92);
    }
    sheet.set_column_width(cols::L, 13.33);
    sheet.set_row_height(row(1), 0.91 * POINTS_PER_CM);
    sheet.set_row_height(HEADER_ROW, 0.85 * POINTS_PER_CM);

    let blocks = [(cols::B, cols::C), (cols::D, cols::H), (cols::I, cols::K)];
    let header = TextStyle::new(Font::new(FONT, 14.0).bold(), Align::Center);
    for ((first, last), text) in blocks.into_iter().zip([
        "विषय",
        "महिन्यात पूर्ण केलेला अभ्यासक्रम",
        "विषय शिक्षकाची सही",
    ]) {
        let span = Range::row_span(HEADER_ROW, first, last);
        sheet.merge(span);
        sheet.write_text(HEADER_ROW, first, text, &header);
        sheet.thin_grid(span);
    }

    for c in cols::B..=cols::K {
        sheet.update_edges(HEADER_ROW, c, |e| {
            e.top = Line::Medium;
            e.bottom = Line::Medium;
        });
    }
    for c in [cols::B, cols::D] {
        sheet.update_edges(HEADER_ROW, c, |e| e.left = Line::Medium);
    }
    for c in [cols::C, cols::K] {
        sheet.update_edges(HEADER_ROW, c, |e| e.right = Line::Medium);
    }

    let mut r = FIRST_SUBJECT_ROW;
    for subject in visible_subjects(subjects) {
        sheet.set_row_height(r, SUBJECT_ROW_CM * POINTS_PER_CM);
        for (first, last) in blocks {
            sheet.merge(Range::row_span(r, first, last));
        }
        sheet.write_text(r, cols::B, subject.display_name(), &header);
        sheet.thin_grid(Range::row_span(r, cols::B, cols::K));
        r += 1;
    }

    // With no subjects the frame collapses onto the header row.
    let (first_row, last_row) = if r == FIRST_SUBJECT_ROW {
        (HEADER_ROW, HEADER_ROW)
    } else {
        (FIRST_SUBJECT_ROW, r - 1)
    };
    for c in cols::B..=cols::K {
        sheet.update_edges(first_row, c, |e| e.top = Line::Medium);
        sheet.update_edges(last_row, c, |e| e.bottom = Line::Medium);
    }
    for rr in first_row..=last_row {
        sheet.update_edges(rr, cols::B, |e| e.left = Line::Medium);
        sheet.update_edges(rr, cols::C, |e| e.right = Line::Medium);
        sheet.update_edges(rr, cols::K, |e| e.right = Line::Medium);
    }

    let signature = TextStyle::new(Font::new(FONT, 14.0), Align::Center);
    let spacer = last_row + 1;
    sheet.set_row_height(spacer, 1.00 * POINTS_PER_CM);
    let label_row = spacer + 1;
    sheet.merge(Range::row_span(label_row, cols::J, cols::K));
    sheet.write_text(label_row, cols::J, "वर्गशिक्षक", &signature);
    let gap = label_row + 1;
    sheet.set_row_height(gap, 0.90 * POINTS_PER_CM);
    let name_row = gap + 1;
    sheet.merge(Range::row_span(name_row, cols::J, cols::K));
    sheet.write_text(name_row, cols::J, resolve_teacher_name(sources), &signature);

    sheet
}
