use crate::data::model::Cell;

// ---------------------------------------------------------------------------
// Row interpolation
// ---------------------------------------------------------------------------

/// Blend two header-aligned rows at `fraction` in `[0, 1]`.
///
/// Numeric pairs are interpolated linearly. If either side of a column is
/// text, the column holds `from` until `fraction` reaches 1 and then snaps to
/// `to`. At `fraction == 1` the result equals `to` exactly for every column.
pub fn interpolate(from: &[Cell], to: &[Cell], fraction: f64) -> Vec<Cell> {
    let fraction = fraction.clamp(0.0, 1.0);
    from.iter()
        .zip(to)
        .map(|(a, b)| interpolate_cell(a, b, fraction))
        .collect()
}

fn interpolate_cell(from: &Cell, to: &Cell, fraction: f64) -> Cell {
    if fraction >= 1.0 {
        return to.clone();
    }
    if fraction <= 0.0 {
        return from.clone();
    }
    match (from, to) {
        (Cell::Numeric(a), Cell::Numeric(b)) => Cell::Numeric(lerp(*a, *b, fraction)),
        _ => from.clone(),
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let span = b - a;
    if span.is_finite() {
        a + span * t
    } else {
        // Endpoints near ±f64::MAX: the difference overflows, the weights don't.
        a * (1.0 - t) + b * t
    }
}
