//! Roster grid: one row per student with identity columns, 31 day columns,
//! working days and remarks, outlined per printed page.

use crate::layout::{cols, row, Align, Font, Line, Range, Sheet, TextStyle};
use crate::model::{class_division_key, RollNo, StudentRecord};

const FONT: &str = "Kokila";
const PT_PER_CM: f64 = 28.3465;
const CM_PER_CHAR: f64 = 0.2117;

pub const TITLE_ROW: u32 = row(1);
pub const HEADER_ROW: u32 = row(2);
pub const FIRST_DATA_ROW: u32 = row(3);
/// Blank bordered rows between the last student and the footer.
pub const PADDING_ROWS: u32 = 4;
pub const FOOTER_LABELS: [&str; 3] = ["हजर", "गैरहजर", "एकूण"];

pub const TITLE_ROW_HEIGHT_PT: f64 = 25.35;
/// Excel's height for rows that never get an explicit one (the caption row).
pub const DEFAULT_ROW_HEIGHT_PT: f64 = 15.0;
pub const DATA_ROW_HEIGHT_PT: f64 = 0.87 * PT_PER_CM;
/// Legal paper height less the vertical margins.
pub const PRINTABLE_HEIGHT_PT: f64 = (35.56 - 2.0) * PT_PER_CM;

const IDENTITY_HEADERS: [&str; 9] = [
    "रजि. नं.",
    "सवलत",
    "जात",
    "प्रवर्ग",
    "Category",
    "जन्म दिनांक",
    "अ.न.",
    "विद्यार्थ्यांचे नाव",
    "आईचे नाव",
];
const IDENTITY_WIDTHS_CM: [f64; 9] = [1.48, 1.70, 2.31, 1.67, 1.60, 2.50, 1.16, 4.80, 2.31];
const DAY_WIDTH_CM: f64 = 0.60;
const TOTAL_DAYS_LABEL: &str = "एकूण दिवस";
const WORKING_DAYS_LABEL: &str = "कामाचे दिवस";
const REMARKS_LABEL: &str = "शेरा";

const IDENTITY_FIRST: u16 = cols::B;
const IDENTITY_LAST: u16 = cols::J;
const DAYS_FIRST: u16 = cols::M;
const DAYS_LAST: u16 = cols::AQ;
const GRID_LAST: u16 = cols::AS;

/// Pixel-based widths converted to character units.
fn px_width(px: f64) -> f64 {
    (px - 5.0) / 7.0
}

/// Last student flagged as a girl, by position in `students`.
pub fn last_girl_index(students: &[StudentRecord]) -> Option<usize> {
    students.iter().rposition(StudentRecord::is_girl)
}

/// Split rows into printed pages.
///
/// `heights` are the row heights starting at `first_row`. Returns the
/// inclusive end row of each page; the last entry is always the last row.
pub fn page_segment_ends(first_row: u32, heights: &[f64], printable: f64) -> Vec<u32> {
    let mut ends = Vec::new();
    let mut total = 0.0;
    let mut r = first_row;
    for (i, &h) in heights.iter().enumerate() {
        total += h;
        if total > printable && i > 0 {
            ends.push(r - 1);
            total = h;
        }
        r += 1;
    }
    if !heights.is_empty() {
        ends.push(r - 1);
    }
    ends
}

pub fn build_roster_sheet(
    class_no: u32,
    division: &str,
    students: &[StudentRecord],
    last_girl_hint: Option<usize>,
) -> Sheet {
    let key = class_division_key(class_no, division);
    let mut sheet = Sheet::new(format!("Catalog Class {}", key));

    let header = TextStyle::new(Font::new(FONT, 14.0).bold(), Align::Center).wrapped();
    let day_header = TextStyle::new(Font::new(FONT, 10.0).bold(), Align::Center).wrapped();
    let body_center = TextStyle::new(Font::new(FONT, 14.0), Align::Center).wrapped();
    let body_left = TextStyle::new(Font::new(FONT, 14.0), Align::Left);
    let footer_label = TextStyle::new(Font::new(FONT, 14.0).bold(), Align::Center);

    // Header rows.
    sheet.merge(Range::row_span(TITLE_ROW, IDENTITY_FIRST, IDENTITY_LAST));
    for (c, text) in (IDENTITY_FIRST..).zip(IDENTITY_HEADERS) {
        sheet.write_text(HEADER_ROW, c, text, &header);
    }

    sheet.merge(Range::row_span(TITLE_ROW, DAYS_FIRST, cols::AJ));
    sheet.merge(Range::row_span(TITLE_ROW, cols::AK, DAYS_LAST));
    sheet.write_text(TITLE_ROW, cols::AK, TOTAL_DAYS_LABEL, &header);

    let day_labels = (1..=31).map(|d: u32| d.to_string());
    let extra_labels = [WORKING_DAYS_LABEL, REMARKS_LABEL].map(String::from);
    for (c, text) in (DAYS_FIRST..).zip(day_labels.chain(extra_labels)) {
        sheet.write_text(HEADER_ROW, c, text, &day_header);
    }

    sheet.set_font(HEADER_ROW, cols::F, Font::new(FONT, 9.0).bold());
    sheet.set_font(HEADER_ROW, cols::AR, Font::new(FONT, 8.0).bold());
    sheet.set_font(HEADER_ROW, cols::AS, Font::new(FONT, 12.0).bold());

    // Student rows.
    for (r, st) in (FIRST_DATA_ROW..).zip(students) {
        let values = [
            &st.reg_no,
            &st.concession,
            &st.caste,
            &st.category_mr,
            &st.category_en,
        ];
        for (c, v) in (IDENTITY_FIRST..).zip(values) {
            let style = if c == IDENTITY_FIRST { &body_center } else { &body_left };
            sheet.write_text(r, c, v.as_str(), style);
        }
        sheet.write_text(r, cols::G, st.dob.display(), &body_left);
        match &st.roll_no {
            RollNo::Number(n) => sheet.write_number(r, cols::H, *n as f64, &body_center),
            RollNo::Text(s) => sheet.write_text(r, cols::H, s.as_str(), &body_center),
            RollNo::Missing => sheet.write_text(r, cols::H, "", &body_center),
        }
        sheet.write_text(r, cols::I, st.full_name_mr.as_str(), &body_left);
        sheet.write_text(r, cols::J, st.mother_name.as_str(), &body_left);
    }

    // Dimensions.
    for (c, cm) in (IDENTITY_FIRST..).zip(IDENTITY_WIDTHS_CM) {
        sheet.set_column_width(c, cm / CM_PER_CHAR);
    }
    for c in DAYS_FIRST..=DAYS_LAST {
        sheet.set_column_width(c, DAY_WIDTH_CM / CM_PER_CHAR);
    }
    sheet.set_column_width(cols::AR, px_width(33.0));
    sheet.set_column_width(cols::AS, px_width(30.0));
    sheet.set_column_width(cols::AT, px_width(45.0));
    sheet.set_column_width(cols::A, px_width(45.0));
    // Tally columns, left blank for manual entry.
    sheet.set_column_width(cols::K, px_width(75.6));
    sheet.set_column_width(cols::L, px_width(75.6));

    sheet.set_row_height(row(18), 22.68);
    sheet.set_row_height(row(8), 28.35);

    let student_count = u32::try_from(students.len()).unwrap_or(u32::MAX);
    let last_student_row = FIRST_DATA_ROW + student_count - 1;
    let border_end_row = last_student_row + PADDING_ROWS;
    let footer_start = border_end_row + 1;
    let footer_end = footer_start + FOOTER_LABELS.len() as u32 - 1;

    for r in FIRST_DATA_ROW..=footer_end {
        sheet.set_row_height(r, DATA_ROW_HEIGHT_PT);
    }

    // Thin grid over the whole block, footer included.
    for (first, last) in [(IDENTITY_FIRST, IDENTITY_LAST), (DAYS_FIRST, GRID_LAST)] {
        sheet.thin_grid(Range::new(TITLE_ROW, first, footer_end, last));
    }

    for (r, text) in (footer_start..).zip(FOOTER_LABELS) {
        sheet.write_text(r, cols::I, text, &footer_label);
    }

    // Header outlines.
    sheet.medium_box(Range::row_span(TITLE_ROW, IDENTITY_FIRST, IDENTITY_LAST));
    sheet.outline_row(HEADER_ROW, IDENTITY_FIRST, IDENTITY_LAST);
    sheet.medium_box(Range::row_span(TITLE_ROW, DAYS_FIRST, GRID_LAST));
    sheet.outline_row(HEADER_ROW, DAYS_FIRST, DAYS_LAST);
    sheet.merge(Range::row_span(TITLE_ROW, cols::AR, cols::AS));
    sheet.box_cell(TITLE_ROW, cols::AK);
    for (r, c) in [
        (TITLE_ROW, cols::AR),
        (TITLE_ROW, cols::AS),
        (HEADER_ROW, cols::AR),
        (HEADER_ROW, cols::AS),
    ] {
        sheet.box_cell(r, c);
    }

    // Page outlines. The title and caption rows share the first printed page.
    sheet.set_row_height(TITLE_ROW, TITLE_ROW_HEIGHT_PT);
    let heights: Vec<f64> = (TITLE_ROW..=border_end_row)
        .map(|r| sheet.row_height(r).unwrap_or(DEFAULT_ROW_HEIGHT_PT))
        .collect();
    let page_ends: Vec<u32> = page_segment_ends(TITLE_ROW, &heights, PRINTABLE_HEIGHT_PT)
        .into_iter()
        .filter(|&end| end >= FIRST_DATA_ROW)
        .collect();
    tracing::debug!("roster {}: {} students, page ends {:?}", key, students.len(), page_ends);

    let mut start = FIRST_DATA_ROW;
    for &end in &page_ends {
        sheet.medium_box(Range::new(start, IDENTITY_FIRST, end, IDENTITY_LAST));
        sheet.medium_box(Range::new(start, DAYS_FIRST, end, GRID_LAST));
        start = end + 1;
    }
    sheet.medium_box(Range::new(footer_start, IDENTITY_FIRST, footer_end, IDENTITY_LAST));
    sheet.medium_box(Range::new(footer_start, DAYS_FIRST, footer_end, GRID_LAST));

    // Working-days and remarks columns are framed per page from the title
    // row down; the last frame runs through the footer.
    let mut column_ends = page_ends.clone();
    if let Some(last) = column_ends.last_mut() {
        *last = footer_end;
    }
    let mut start = TITLE_ROW;
    for &end in &column_ends {
        outline_column(&mut sheet, cols::AR, start, end);
        outline_column(&mut sheet, cols::AS, start, end);
        start = end + 1;
    }
    for c in [cols::AR, cols::AS] {
        for r in [TITLE_ROW, HEADER_ROW] {
            sheet.box_cell(r, c);
        }
    }

    let last_girl = last_girl_hint.or_else(|| last_girl_index(students));
    if let Some(idx) = last_girl {
        let r = FIRST_DATA_ROW + u32::try_from(idx).unwrap_or(0);
        for c in (IDENTITY_FIRST..=IDENTITY_LAST).chain(DAYS_FIRST..=GRID_LAST) {
            sheet.update_edges(r, c, |e| e.bottom = Line::Medium);
        }
    }

    sheet
}

/// Medium sides on a column run, medium caps at both ends, thin between,
/// never downgrading an edge that is already medium.
fn outline_column(sheet: &mut Sheet, c: u16, first_row: u32, last_row: u32) {
    let keep_or = |existing: Line, fallback: Line| {
        if existing == Line::Medium {
            Line::Medium
        } else {
            fallback
        }
    };
    for r in first_row..=last_row {
        sheet.update_edges(r, c, |e| {
            e.top = keep_or(e.top, if r == first_row { Line::Medium } else { Line::Thin });
            e.bottom = keep_or(e.bottom, if r == last_row { Line::Medium } else { Line::Thin });
            e.left = Line::Medium;
            e.right = Line::Medium;
        });
    }
}
