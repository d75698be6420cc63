//! Front page: school header, logo, monthly statistics template and the
//! class/teacher/month fields.

use std::path::Path;

use rust_xlsxwriter::{Image, XlsxError};

use crate::labels::{month_name, to_local_numerals};
use crate::layout::{cols, row, Align, Font, Range, Sheet, TextStyle};
use crate::model::{Clock, ReportData};

pub const SHEET_NAME: &str = "Front Page";
pub const LOGO_FILE: &str = "School_logo.png";
pub const FONT_FILE: &str = "Kokila.ttf";
pub const LOGO_HEIGHT_PX: f64 = 135.0;

const PREFERRED_FONT: &str = "Kokila";
const FALLBACK_FONT: &str = "Calibri";

const COLUMN_WIDTHS: [(u16, f64); 15] = [
    (cols::A, 10.53),
    (cols::B, 14.34),
    (cols::C, 5.62),
    (cols::D, 5.62),
    (cols::E, 5.62),
    (cols::F, 5.62),
    (cols::G, 5.62),
    (cols::H, 5.62),
    (cols::I, 5.62),
    (cols::J, 5.62),
    (cols::K, 15.79),
    (cols::L, 5.82),
    (cols::M, 5.82),
    (cols::N, 5.82),
    (cols::O, 4.01),
];

/// Heights in points for rows 1..=37.
const ROW_HEIGHTS: [f64; 37] = [
    15.03, 22.11, 28.92, 16.73, 22.11, 19.28, 24.66, 31.19, 23.53, 38.27, 22.11, // 1-11
    24.10, 24.10, 24.10, 24.10, 24.10, 24.10, 24.10, // 12-18
    20.41, 20.41, 26.37, 19.85, 18.71, // 19-23
    16.16, 16.16, 16.16, 16.16, 16.16, 16.16, 16.16, 16.16, // 24-31
    14.46, 19.28, 19.28, 19.28, 25.23, 19.28, // 32-37
];

const SCHOOL_HEADER: [(&str, f64); 4] = [
    ("श्री. अगस्ति एज्युकेशन सोसायटी मुंबई संचालित...", 16.0),
    ("अगस्ति विद्यालय, अकोले", 22.0),
    ("ता. अकोले, जि. अहिल्यानगर", 12.0),
    ("महिनावार उपस्थिती व अभ्यासक्रम", 16.0),
];

const CATEGORY_LABELS: [&str; 9] = [
    "मोफत शिक्षण",
    "बी.सी. एकदा नापास",
    "प्रा. शिक्षक पाल्य",
    "मा. शिक्षक पाल्य",
    "माजी सैनिक",
    "आजी सैनिक",
    "दार",
    "एकूण",
    "एकूण",
];

const CASTE_LABELS: [&str; 9] = [
    "अनु. जाती ( SC )",
    "अनु. जमाती (ST )",
    "भ. वि. जा. (NT)",
    "विशेष मागास (SBC)",
    "इतर मागास (OBC)",
    "खुला (OPEN)",
    "एकूण :-",
    "पटावर :-",
    "सरासरी हजेरी :-",
];

const CLASS_TEACHER_LABEL: &str = "वर्गशिक्षक";

/// The font the whole page is set in: Kokila when the assets ship it.
pub fn page_font(assets_dir: Option<&Path>) -> &'static str {
    match assets_dir {
        Some(dir) if dir.join(FONT_FILE).exists() => PREFERRED_FONT,
        _ => FALLBACK_FONT,
    }
}

/// Load the logo scaled to [`LOGO_HEIGHT_PX`], keeping its aspect ratio.
pub fn load_logo(path: &Path) -> Result<Image, XlsxError> {
    let image = Image::new(path)?;
    let (width, height) = (image.width(), image.height());
    let aspect = width / height.max(1.0);
    let target_width = (LOGO_HEIGHT_PX * aspect).trunc();
    Ok(image
        .set_scale_height(LOGO_HEIGHT_PX / height.max(1.0))
        .set_scale_width(target_width / width.max(1.0)))
}

pub fn build_cover_sheet(data: &ReportData, assets_dir: Option<&Path>, clock: &dyn Clock) -> Sheet {
    let mut sheet = Sheet::new(SHEET_NAME);

    for (c, width) in COLUMN_WIDTHS {
        sheet.set_column_width(c, width);
    }
    for (r, height) in (0u32..).zip(ROW_HEIGHTS) {
        sheet.set_row_height(r, height);
    }

    if let Some(dir) = assets_dir {
        let logo_path = dir.join(LOGO_FILE);
        if logo_path.exists() {
            match load_logo(&logo_path) {
                Ok(image) => sheet.insert_image(row(2), cols::D, image),
                Err(e) => tracing::warn!("logo {} skipped: {}", logo_path.display(), e),
            }
        }
    }

    let font = page_font(assets_dir);
    let center = |size: f64, bold: bool| {
        let f = Font::new(font, size);
        TextStyle::new(if bold { f.bold() } else { f }, Align::Center)
    };
    let table_header = center(14.0, true).wrapped();
    let table_subheader = center(14.0, false).wrapped();
    let table_label = TextStyle::new(Font::new(font, 12.0), Align::Left);

    // School header.
    for (r, (text, size)) in (row(2)..).zip(SCHOOL_HEADER) {
        sheet.merge(Range::row_span(r, cols::F, cols::N));
        sheet.write_text(r, cols::F, text, &center(size, true));
    }

    // Statistics grid header.
    for range in [
        Range::row_span(row(7), cols::B, cols::E),
        Range::row_span(row(7), cols::L, cols::N),
        Range::row_span(row(8), cols::B, cols::F),
        Range::new(row(9), cols::B, row(11), cols::B),
        Range::row_span(row(9), cols::C, cols::N),
        Range::row_span(row(10), cols::C, cols::D),
        Range::row_span(row(10), cols::E, cols::F),
        Range::row_span(row(10), cols::G, cols::H),
        Range::row_span(row(10), cols::I, cols::J),
        Range::row_span(row(10), cols::K, cols::N),
    ] {
        sheet.merge(range);
    }

    for range in [
        Range::new(row(9), cols::B, row(11), cols::B),
        Range::row_span(row(9), cols::C, cols::N),
        Range::row_span(row(10), cols::C, cols::D),
        Range::row_span(row(10), cols::E, cols::F),
        Range::row_span(row(10), cols::G, cols::H),
        Range::row_span(row(10), cols::I, cols::J),
        Range::row_span(row(10), cols::K, cols::N),
        Range::row_span(row(11), cols::C, cols::D),
        Range::row_span(row(11), cols::E, cols::F),
        Range::row_span(row(11), cols::G, cols::H),
        Range::row_span(row(11), cols::I, cols::J),
        Range::cell(row(11), cols::K),
        Range::row_span(row(11), cols::L, cols::N),
    ] {
        sheet.thin_grid(range);
        sheet.medium_box(range);
    }

    sheet.write_text(row(9), cols::B, "विद्यार्थ्यांची वर्गवारी", &table_header);
    sheet.write_text(row(9), cols::C, "विद्यार्थी संख्या", &table_header);
    for (c, text) in [
        (cols::C, "महिन्याचा पहिला दिवस"),
        (cols::E, "प्रवेश दिलेले"),
        (cols::G, "नाव कमी / तुकडी बदल"),
        (cols::I, "शेवटच्या दिवशी"),
        (cols::K, "मागासवर्गीय"),
    ] {
        sheet.write_text(row(10), c, text, &table_subheader);
    }
    for (c, text) in [
        (cols::C, "मुले"),
        (cols::E, "मुले"),
        (cols::G, "मुले"),
        (cols::I, "मुले"),
        (cols::L, "मुले"),
        (cols::D, "मुली"),
        (cols::F, "मुली"),
        (cols::H, "मुली"),
        (cols::J, "मुली"),
        (cols::M, "मुली"),
        (cols::K, "प्रवर्ग"),
        (cols::N, "एकूण"),
    ] {
        sheet.write_text(row(11), c, text, &table_subheader);
    }
    for (r, (category, caste)) in (row(12)..).zip(CATEGORY_LABELS.iter().zip(CASTE_LABELS)) {
        sheet.write_text(r, cols::B, *category, &table_label);
        sheet.write_text(r, cols::K, caste, &table_label);
    }

    // Statistics grid body: counts are filled in by hand.
    sheet.thin_grid(Range::new(row(12), cols::B, row(20), cols::N));
    for range in [
        Range::row_span(row(19), cols::L, cols::N),
        Range::row_span(row(20), cols::C, cols::D),
        Range::row_span(row(20), cols::E, cols::F),
        Range::row_span(row(20), cols::G, cols::H),
        Range::row_span(row(20), cols::I, cols::J),
        Range::row_span(row(20), cols::L, cols::N),
    ] {
        sheet.merge(range);
    }
    let column_blocks = [
        (cols::B, cols::B),
        (cols::C, cols::D),
        (cols::E, cols::F),
        (cols::G, cols::H),
        (cols::I, cols::J),
        (cols::K, cols::K),
        (cols::L, cols::N),
    ];
    for (first, last) in column_blocks {
        sheet.medium_box(Range::new(row(12), first, row(18), last));
        sheet.medium_box(Range::row_span(row(19), first, last));
        sheet.medium_box(Range::row_span(row(20), first, last));
    }

    // Admissions and removals table.
    sheet.thin_grid(Range::new(row(22), cols::B, row(31), cols::N));
    sheet.merge(Range::row_span(row(22), cols::B, cols::N));
    for r in row(23)..=row(31) {
        sheet.merge(Range::row_span(r, cols::C, cols::I));
    }
    for r in row(23)..=row(31) {
        sheet.merge(Range::row_span(r, cols::J, cols::N));
    }
    for range in [
        Range::row_span(row(22), cols::B, cols::N),
        Range::row_span(row(23), cols::B, cols::N),
        Range::new(row(23), cols::B, row(31), cols::B),
        Range::new(row(23), cols::C, row(31), cols::I),
        Range::new(row(23), cols::J, row(31), cols::N),
    ] {
        sheet.medium_box(range);
    }
    sheet.write_text(
        row(22),
        cols::B,
        "कमी केलेल्या व प्रवेश दिलेल्या विद्यार्थ्यांची नावे",
        &table_header,
    );
    sheet.write_text(row(23), cols::B, "रजि. नंबर", &table_header);
    sheet.write_text(row(23), cols::C, "विद्यार्थ्याचे नाव", &table_header);
    sheet.write_text(row(23), cols::J, "शेरा", &table_header);

    // Certification and signature block.
    for range in [
        Range::row_span(row(33), cols::B, cols::N),
        Range::row_span(row(34), cols::B, cols::N),
        Range::row_span(row(35), cols::L, cols::N),
        Range::row_span(row(37), cols::L, cols::N),
    ] {
        sheet.merge(range);
    }
    let signature_left = TextStyle::new(Font::new(font, 14.0), Align::Left);
    let signature_center = center(14.0, false).wrapped();
    sheet.write_text(
        row(33),
        cols::B,
        "मी असे प्रमाणित करतो की, वरील नोंदी बरोबर आहेत.",
        &signature_left,
    );
    sheet.write_text(
        row(34),
        cols::B,
        "हजेरीपत्रक तपासले असून त्यातील नोंदी आमचे माहितीनुसार बरोबर आहेत",
        &signature_left,
    );
    sheet.write_text(row(35), cols::L, CLASS_TEACHER_LABEL, &signature_center);

    // Dynamic fields.
    sheet.write_text(
        row(8),
        cols::B,
        format!("{} :- {}", CLASS_TEACHER_LABEL, data.teacher_name),
        &TextStyle::new(Font::new(font, 14.0).bold(), Align::Left),
    );
    sheet.write_text(row(37), cols::L, data.teacher_name.as_str(), &signature_center);

    let period = data.resolve_period(clock);
    let month = month_name(period.month).unwrap_or_default();
    let year = to_local_numerals(u64::try_from(period.year).unwrap_or_default());
    let info = Font::new(font, 18.0).bold();
    sheet.write_text(
        row(7),
        cols::B,
        format!("महिना: {} {}", month, year),
        &TextStyle::new(info.clone(), Align::Left),
    );
    sheet.write_text(
        row(7),
        cols::K,
        format!("इयत्ता: {}", data.class_label),
        &TextStyle::new(info.clone(), Align::Right),
    );
    sheet.write_text(
        row(7),
        cols::L,
        format!("तुकडी: {}", data.division_label),
        &TextStyle::new(info, Align::Center).wrapped(),
    );

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Edges, Line};
    use crate::model::FixedClock;
    use chrono::NaiveDate;

    fn data(month: Option<i64>, year: Option<i64>) -> ReportData {
        ReportData {
            teacher_name: "श्री. देशमुख".to_string(),
            month: 1,
            year: 2025,
            class_label: "१० वी".to_string(),
            division_label: "अ".to_string(),
            division: "A".to_string(),
            selected_month: month,
            selected_year: year,
        }
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
    }

    #[test]
    fn override_period_is_rendered() {
        let sheet = build_cover_sheet(&data(Some(8), Some(2025)), None, &clock());
        assert_eq!(sheet.text(row(7), cols::B), Some("महिना: ऑगस्ट २०२५"));
    }

    #[test]
    fn missing_override_uses_clock() {
        let sheet = build_cover_sheet(&data(None, None), None, &clock());
        assert_eq!(sheet.text(row(7), cols::B), Some("महिना: ऑक्टोबर २०२६"));

        let sheet = build_cover_sheet(&data(Some(8), None), None, &clock());
        assert_eq!(sheet.text(row(7), cols::B), Some("महिना: ऑक्टोबर २०२६"));
    }

    #[test]
    fn dynamic_fields() {
        let sheet = build_cover_sheet(&data(None, None), None, &clock());
        assert_eq!(sheet.name(), SHEET_NAME);
        assert_eq!(sheet.text(row(8), cols::B), Some("वर्गशिक्षक :- श्री. देशमुख"));
        assert_eq!(sheet.text(row(37), cols::L), Some("श्री. देशमुख"));
        assert_eq!(sheet.text(row(7), cols::K), Some("इयत्ता: १० वी"));
        assert_eq!(sheet.text(row(7), cols::L), Some("तुकडी: अ"));
        assert_eq!(sheet.text(row(3), cols::F), Some("अगस्ति विद्यालय, अकोले"));
    }

    #[test]
    fn statistics_grid_is_an_empty_template() {
        let sheet = build_cover_sheet(&data(None, None), None, &clock());
        assert_eq!(sheet.text(row(12), cols::B), Some("मोफत शिक्षण"));
        assert_eq!(sheet.text(row(20), cols::K), Some("सरासरी हजेरी :-"));
        for r in row(12)..=row(20) {
            assert!(sheet.text(r, cols::C).is_none());
            assert!(sheet.text(r, cols::L).is_none());
        }
        assert_eq!(sheet.edges(row(12), cols::C).top, Line::Medium);
        assert_eq!(sheet.edges(row(13), cols::C).top, Line::Thin);
        assert_eq!(sheet.edges(row(11), cols::K), Edges::MEDIUM);
    }

    #[test]
    fn font_falls_back_without_assets() {
        assert_eq!(page_font(None), "Calibri");
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(page_font(Some(dir.path())), "Calibri");
        std::fs::write(dir.path().join(FONT_FILE), b"").unwrap();
        assert_eq!(page_font(Some(dir.path())), "Kokila");
    }

    #[test]
    fn unreadable_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOGO_FILE), b"not a png").unwrap();
        let sheet = build_cover_sheet(&data(None, None), Some(dir.path()), &clock());
        assert!(sheet.images().is_empty());
        assert_eq!(sheet.text(row(8), cols::B), Some("वर्गशिक्षक :- श्री. देशमुख"));
    }
}
