//! Shared traits for entities stored in the registration ledger.

/// Exposes the stable numeric identifier for stored entities.
pub trait Identifiable {
    fn id(&self) -> i64;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Parses a decimal string the way the ledger treats stored amounts.
///
/// Returns `(value, well_formed)`. A blank or unparseable string counts as
/// zero so a malformed entry still lands in totals instead of disappearing a
/// row; the flag lets callers surface a data-quality warning.
pub fn amount_or_zero(raw: &str) -> (f64, bool) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (0.0, false);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => (value, true),
        _ => (0.0, false),
    }
}
