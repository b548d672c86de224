//! Unicode normalization for school names and column headers.
//!
//! File names on macOS arrive decomposed (NFD) while spreadsheet sheet names
//! are usually composed (NFC), so both sides are folded to NFC before use as
//! join keys.

use unicode_normalization::UnicodeNormalization;

/// Returns the NFC form of `raw`.
pub fn normalize(raw: &str) -> String {
    raw.nfc().collect()
}

/// Canonical form used to match column headers: NFC, BOM and surrounding
/// whitespace removed, lowercased, and any trailing `(unit)` dropped.
pub fn header_key(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    let without_unit = match trimmed.find('(') {
        Some(idx) if idx > 0 => trimmed[..idx].trim_end(),
        _ => trimmed,
    };
    normalize(without_unit).to_lowercase()
}
