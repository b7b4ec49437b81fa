use crate::models::{Cell, PairTable};
use crate::models::schema::derived_column_name;

/// Adds the fees-per-target-liquidity column and returns its name.
///
/// A row gets `fee * target / liquidity` only when liquidity is at least the
/// target, non-zero, and both inputs are present. Every row is null when
/// either column is missing or non-numeric, or when `target_liquidity <= 0`.
pub fn compute_derived(
    table: &mut PairTable,
    fee_column: &str,
    liquidity_column: &str,
    target_liquidity: f64,
) -> String {
    let name = derived_column_name(target_liquidity);

    let inputs = match (table.column(fee_column), table.column(liquidity_column)) {
        (Some(fees), Some(liquidity)) if fees.is_numeric() && liquidity.is_numeric() => {
            Some((fees, liquidity))
        }
        _ => {
            tracing::debug!(
                "Derived column '{}' left empty: '{}'/'{}' missing or non-numeric",
                name, fee_column, liquidity_column
            );
            None
        }
    };

    let cells = match inputs {
        Some((fees, liquidity)) if target_liquidity > 0.0 => fees.cells.iter()
            .zip(&liquidity.cells)
            .map(|(fee, liq)| match (fee.as_f64(), liq.as_f64()) {
                (Some(fee), Some(liq)) if liq >= target_liquidity && liq != 0.0 => {
                    Cell::number(fee * target_liquidity / liq)
                }
                _ => Cell::Null,
            })
            .collect(),
        _ => vec![Cell::Null; table.len()],
    };

    table.set_column(&name, cells);
    name
}
