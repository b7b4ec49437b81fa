use crate::models::PairTable;

/// Drops rows whose `column` value is below `threshold`. Null values are kept.
/// A missing or non-numeric column, or `threshold <= 0`, leaves the table as is.
/// Returns the number of rows removed.
pub fn filter_by_threshold(table: &mut PairTable, column: &str, threshold: f64) -> usize {
    if threshold <= 0.0 {
        return 0;
    }
    let keep: Vec<bool> = match table.column(column) {
        Some(col) if col.is_numeric() => col.cells.iter()
            .map(|cell| cell.as_f64().map_or(true, |value| value >= threshold))
            .collect(),
        _ => return 0,
    };

    let before = table.len();
    table.retain_rows(&keep);
    let removed = before - table.len();
    if removed > 0 {
        tracing::debug!("Filtered {} rows with {} below {}", removed, column, threshold);
    }
    removed
}
