//! In-memory sheet canvas.
//!
//! Builders lay out values, fonts, merges and per-cell border edges on a
//! [`Sheet`]; border helpers read and rewrite the edges that are already
//! there, so later outlines can be layered over an earlier grid. Nothing
//! touches `rust_xlsxwriter` until [`Sheet::render`] flushes the finished
//! canvas onto a worksheet.

use std::collections::BTreeMap;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Image, Worksheet, XlsxError};

/// Excel paper size code for US Legal.
pub const PAPER_LEGAL: u8 = 5;
pub const MARGIN_SIDE_IN: f64 = 0.0;
pub const MARGIN_VERTICAL_IN: f64 = 0.3937;
pub const MARGIN_HEADER_IN: f64 = 0.3;

pub const POINTS_PER_CM: f64 = 72.0 / 2.54;

/// Zero-based column indices by Excel letter.
pub mod cols {
    pub const A: u16 = 0;
    pub const B: u16 = 1;
    pub const C: u16 = 2;
    pub const D: u16 = 3;
    pub const E: u16 = 4;
    pub const F: u16 = 5;
    pub const G: u16 = 6;
    pub const H: u16 = 7;
    pub const I: u16 = 8;
    pub const J: u16 = 9;
    pub const K: u16 = 10;
    pub const L: u16 = 11;
    pub const M: u16 = 12;
    pub const N: u16 = 13;
    pub const O: u16 = 14;
    pub const AJ: u16 = 35;
    pub const AK: u16 = 36;
    pub const AQ: u16 = 42;
    pub const AR: u16 = 43;
    pub const AS: u16 = 44;
    pub const AT: u16 = 45;
}

/// Excel row number (1-based) to a zero-based row index.
pub const fn row(n: u32) -> u32 {
    n - 1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Line {
    #[default]
    None,
    Thin,
    Medium,
}

impl From<Line> for FormatBorder {
    fn from(line: Line) -> Self {
        match line {
            Line::None => FormatBorder::None,
            Line::Thin => FormatBorder::Thin,
            Line::Medium => FormatBorder::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub top: Line,
    pub bottom: Line,
    pub left: Line,
    pub right: Line,
}

impl Edges {
    pub const THIN: Edges = Edges::uniform(Line::Thin);
    pub const MEDIUM: Edges = Edges::uniform(Line::Medium);

    pub const fn uniform(line: Line) -> Edges {
        Edges {
            top: line,
            bottom: line,
            left: line,
            right: line,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    General,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    pub size: f64,
    pub bold: bool,
}

impl Font {
    pub fn new(name: &str, size: f64) -> Self {
        Self {
            name: name.to_string(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Font plus alignment; text is always vertically centred.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub align: Align,
    pub wrap: bool,
}

impl TextStyle {
    pub fn new(font: Font, align: Align) -> Self {
        Self {
            font,
            align,
            wrap: false,
        }
    }

    pub fn wrapped(mut self) -> Self {
        self.wrap = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Blank,
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub font: Option<Font>,
    pub align: Align,
    pub vcenter: bool,
    pub wrap: bool,
    pub edges: Edges,
}

impl Cell {
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn format(&self) -> Format {
        let mut format = Format::new();
        if let Some(font) = &self.font {
            format = format.set_font_name(&font.name).set_font_size(font.size);
            if font.bold {
                format = format.set_bold();
            }
        }
        format = match self.align {
            Align::General => format,
            Align::Left => format.set_align(FormatAlign::Left),
            Align::Center => format.set_align(FormatAlign::Center),
            Align::Right => format.set_align(FormatAlign::Right),
        };
        if self.vcenter {
            format = format.set_align(FormatAlign::VerticalCenter);
        }
        if self.wrap {
            format = format.set_text_wrap();
        }
        format
            .set_border_top(self.edges.top.into())
            .set_border_bottom(self.edges.bottom.into())
            .set_border_left(self.edges.left.into())
            .set_border_right(self.edges.right.into())
    }
}

/// Zero-based, inclusive cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl Range {
    pub const fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub const fn cell(r: u32, c: u16) -> Self {
        Self::new(r, c, r, c)
    }

    pub const fn row_span(r: u32, first_col: u16, last_col: u16) -> Self {
        Self::new(r, first_col, r, last_col)
    }

    fn positions(self) -> impl Iterator<Item = (u32, u16)> {
        (self.first_row..=self.last_row)
            .flat_map(move |r| (self.first_col..=self.last_col).map(move |c| (r, c)))
    }
}

#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub row: u32,
    pub col: u16,
    pub image: Image,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: Vec<Range>,
    row_heights: BTreeMap<u32, f64>,
    col_widths: BTreeMap<u16, f64>,
    images: Vec<PlacedImage>,
    page_layout_view: bool,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
            row_heights: BTreeMap::new(),
            col_widths: BTreeMap::new(),
            images: Vec::new(),
            page_layout_view: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_page_layout_view(&mut self) {
        self.page_layout_view = true;
    }

    pub fn is_page_layout_view(&self) -> bool {
        self.page_layout_view
    }

    pub fn cell(&self, r: u32, c: u16) -> Option<&Cell> {
        self.cells.get(&(r, c))
    }

    pub fn text(&self, r: u32, c: u16) -> Option<&str> {
        self.cell(r, c).and_then(Cell::text)
    }

    pub fn edges(&self, r: u32, c: u16) -> Edges {
        self.cell(r, c).map(|cell| cell.edges).unwrap_or_default()
    }

    pub fn merges(&self) -> &[Range] {
        &self.merges
    }

    pub fn row_height(&self, r: u32) -> Option<f64> {
        self.row_heights.get(&r).copied()
    }

    pub fn column_width(&self, c: u16) -> Option<f64> {
        self.col_widths.get(&c).copied()
    }

    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }

    fn cell_mut(&mut self, r: u32, c: u16) -> &mut Cell {
        self.cells.entry((r, c)).or_default()
    }

    /// Empty text leaves a styled blank cell.
    pub fn write_text(&mut self, r: u32, c: u16, text: impl Into<String>, style: &TextStyle) {
        let text = text.into();
        let value = if text.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(text)
        };
        self.write_value(r, c, value, style);
    }

    pub fn write_number(&mut self, r: u32, c: u16, n: f64, style: &TextStyle) {
        self.write_value(r, c, CellValue::Number(n), style);
    }

    fn write_value(&mut self, r: u32, c: u16, value: CellValue, style: &TextStyle) {
        let cell = self.cell_mut(r, c);
        cell.value = value;
        cell.font = Some(style.font.clone());
        cell.align = style.align;
        cell.vcenter = true;
        cell.wrap = style.wrap;
    }

    pub fn set_font(&mut self, r: u32, c: u16, font: Font) {
        self.cell_mut(r, c).font = Some(font);
    }

    pub fn merge(&mut self, range: Range) {
        self.merges.push(range);
    }

    pub fn set_row_height(&mut self, r: u32, points: f64) {
        self.row_heights.insert(r, points);
    }

    pub fn set_column_width(&mut self, c: u16, width: f64) {
        self.col_widths.insert(c, width);
    }

    pub fn insert_image(&mut self, row: u32, col: u16, image: Image) {
        self.images.push(PlacedImage { row, col, image });
    }

    pub fn set_edges(&mut self, r: u32, c: u16, edges: Edges) {
        self.cell_mut(r, c).edges = edges;
    }

    pub fn update_edges(&mut self, r: u32, c: u16, f: impl FnOnce(&mut Edges)) {
        f(&mut self.cell_mut(r, c).edges);
    }

    /// Thin lines on every side of every cell in `range`.
    pub fn thin_grid(&mut self, range: Range) {
        for (r, c) in range.positions() {
            self.set_edges(r, c, Edges::THIN);
        }
    }

    /// Medium outer frame around `range`, inner edges untouched.
    pub fn medium_box(&mut self, range: Range) {
        for c in range.first_col..=range.last_col {
            self.update_edges(range.first_row, c, |e| e.top = Line::Medium);
            self.update_edges(range.last_row, c, |e| e.bottom = Line::Medium);
        }
        for r in range.first_row..=range.last_row {
            self.update_edges(r, range.first_col, |e| e.left = Line::Medium);
            self.update_edges(r, range.last_col, |e| e.right = Line::Medium);
        }
    }

    /// Replace the edges of a single row span: medium top, bottom and ends,
    /// thin dividers in between.
    pub fn outline_row(&mut self, r: u32, first_col: u16, last_col: u16) {
        for c in first_col..=last_col {
            self.set_edges(
                r,
                c,
                Edges {
                    top: Line::Medium,
                    bottom: Line::Medium,
                    left: if c == first_col { Line::Medium } else { Line::Thin },
                    right: if c == last_col { Line::Medium } else { Line::Thin },
                },
            );
        }
    }

    pub fn box_cell(&mut self, r: u32, c: u16) {
        self.set_edges(r, c, Edges::MEDIUM);
    }

    /// Flush the canvas onto `worksheet`.
    pub fn render(&self, worksheet: &mut Worksheet) -> Result<(), XlsxError> {
        worksheet.set_name(&self.name)?;
        worksheet.set_paper_size(PAPER_LEGAL);
        worksheet.set_margins(
            MARGIN_SIDE_IN,
            MARGIN_SIDE_IN,
            MARGIN_VERTICAL_IN,
            MARGIN_VERTICAL_IN,
            MARGIN_HEADER_IN,
            MARGIN_HEADER_IN,
        );
        if self.page_layout_view {
            worksheet.set_view_page_layout();
        }

        for (&c, &width) in &self.col_widths {
            worksheet.set_column_width(c, width)?;
        }
        for (&r, &height) in &self.row_heights {
            worksheet.set_row_height(r, height)?;
        }

        for m in &self.merges {
            let anchor = self.cell(m.first_row, m.first_col).cloned().unwrap_or_default();
            let text = anchor.text().unwrap_or("");
            worksheet.merge_range(
                m.first_row,
                m.first_col,
                m.last_row,
                m.last_col,
                text,
                &anchor.format(),
            )?;
        }

        for (&(r, c), cell) in &self.cells {
            let is_anchor = self
                .merges
                .iter()
                .any(|m| m.first_row == r && m.first_col == c);
            if is_anchor {
                continue;
            }
            let format = cell.format();
            match &cell.value {
                CellValue::Text(s) => {
                    worksheet.write_string_with_format(r, c, s, &format)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(r, c, *n, &format)?;
                }
                CellValue::Blank => {
                    worksheet.write_blank(r, c, &format)?;
                }
            }
        }

        for placed in &self.images {
            worksheet.insert_image(placed.row, placed.col, &placed.image)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_box_keeps_inner_edges() {
        let mut sheet = Sheet::new("t");
        let range = Range::new(0, 0, 2, 2);
        sheet.thin_grid(range);
        sheet.medium_box(range);

        assert_eq!(
            sheet.edges(0, 0),
            Edges {
                top: Line::Medium,
                left: Line::Medium,
                bottom: Line::Thin,
                right: Line::Thin
            }
        );
        assert_eq!(sheet.edges(1, 1), Edges::THIN);
        assert_eq!(sheet.edges(2, 2).bottom, Line::Medium);
        assert_eq!(sheet.edges(2, 2).right, Line::Medium);
        assert_eq!(sheet.edges(1, 2).top, Line::Thin);
    }

    #[test]
    fn outline_row_uses_thin_dividers() {
        let mut sheet = Sheet::new("t");
        sheet.outline_row(1, 1, 3);
        assert_eq!(sheet.edges(1, 1).left, Line::Medium);
        assert_eq!(sheet.edges(1, 1).right, Line::Thin);
        assert_eq!(sheet.edges(1, 2).left, Line::Thin);
        assert_eq!(sheet.edges(1, 3).right, Line::Medium);
        assert!((1..=3).all(|c| sheet.edges(1, c).top == Line::Medium));
    }

    #[test]
    fn untouched_cells_have_no_edges() {
        let sheet = Sheet::new("t");
        assert_eq!(sheet.edges(5, 5), Edges::default());
        assert!(sheet.text(5, 5).is_none());
    }

    #[test]
    fn row_helper_is_one_based() {
        assert_eq!(row(1), 0);
        assert_eq!(row(37), 36);
    }

    #[test]
    fn render_accepts_merged_and_styled_cells() {
        let mut sheet = Sheet::new("Styled");
        let style = TextStyle::new(Font::new("Kokila", 14.0).bold(), Align::Center);
        sheet.write_text(0, 1, "title", &style);
        sheet.merge(Range::row_span(0, 1, 4));
        sheet.thin_grid(Range::row_span(0, 1, 4));
        sheet.medium_box(Range::row_span(0, 1, 4));
        sheet.write_number(1, 1, 3.0, &style);
        sheet.set_row_height(0, 25.35);
        sheet.set_column_width(1, 6.99);
        sheet.set_page_layout_view();

        let mut worksheet = Worksheet::new();
        sheet.render(&mut worksheet).unwrap();
    }
}
