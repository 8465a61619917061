use super::model::{Cell, TypedRow};

// ---------------------------------------------------------------------------
// Row parser: raw text → typed cells
// ---------------------------------------------------------------------------

/// Type a single cell. Finite floats become numbers; everything else,
/// including empty strings and textual `NaN`/`inf`, stays text verbatim.
pub fn parse_cell(raw: &str) -> Cell {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Numeric(v),
        _ => Cell::Text(raw.to_string()),
    }
}

/// Type every cell of a raw row independently.
pub fn parse_row<S: AsRef<str>>(raw: &[S]) -> TypedRow {
    raw.iter().map(|cell| parse_cell(cell.as_ref())).collect()
}
