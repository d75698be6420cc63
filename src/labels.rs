//! Marathi display labels: numerals, class ordinals, division letters and
//! month names. Every lookup is total; unknown input falls back to itself.

const DEVANAGARI_DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

const CLASS_LABELS: [(&str, &str); 10] = [
    ("1", "१ ली"),
    ("2", "२ री"),
    ("3", "३ री"),
    ("4", "४ थी"),
    ("5", "५ वी"),
    ("6", "६ वी"),
    ("7", "७ वी"),
    ("8", "८ वी"),
    ("9", "९ वी"),
    ("10", "१० वी"),
];

/// Shared by the assembler and the cover sheet.
const DIVISION_LABELS: [(&str, &str); 6] = [
    ("A", "अ"),
    ("B", "ब"),
    ("C", "क"),
    ("D", "ड"),
    ("E", "ई"),
    ("F", "फ"),
];

const MONTH_NAMES: [&str; 12] = [
    "जानेवारी",
    "फेब्रुवारी",
    "मार्च",
    "एप्रिल",
    "मे",
    "जून",
    "जुलै",
    "ऑगस्ट",
    "सप्टेंबर",
    "ऑक्टोबर",
    "नोव्हेंबर",
    "डिसेंबर",
];

/// Render `n` with Devanagari digits. No grouping separators.
pub fn to_local_numerals(n: u64) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => DEVANAGARI_DIGITS[d as usize],
            None => c,
        })
        .collect()
}

/// Ordinal label for a class number such as `"10"` → `"१० वी"`.
pub fn class_label(class_no: &str) -> String {
    let key = class_no.trim();
    CLASS_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| class_no.to_string())
}

pub fn division_label(code: &str) -> String {
    let trimmed = code.trim();
    let key = trimmed.to_uppercase();
    DIVISION_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// 1-indexed month name.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).copied()
}

/// Trim and uppercase a division code as used in keys and filenames.
pub fn normalize_division(division: &str) -> String {
    division.trim().to_uppercase()
}
