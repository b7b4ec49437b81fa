use crate::models::{Cell, PairTable};

/// Tolerant per-value coercion. `None` stands in for a value that cannot be read
/// as a finite number.
pub fn coerce(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Cell::Null | Cell::List(_) | Cell::Map(_) => None,
    }
}

/// Coerces each listed column that exists and is not already numeric.
/// Absent columns are skipped. Never fails.
pub fn normalize(table: &mut PairTable, numeric_columns: &[&str]) {
    for name in numeric_columns {
        let Some(column) = table.column_mut(name) else {
            continue;
        };
        if column.is_numeric() {
            continue;
        }

        let mut nulled = 0usize;
        for cell in column.cells.iter_mut() {
            let coerced = coerce(cell).map(Cell::Number).unwrap_or(Cell::Null);
            if coerced.is_null() && !cell.is_null() {
                nulled += 1;
            }
            *cell = coerced;
        }

        if nulled > 0 {
            tracing::debug!("Column '{}': {} values could not be coerced, set to null", name, nulled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;
    use std::collections::BTreeMap;

    fn table_with(name: &str, cells: Vec<Cell>) -> PairTable {
        let mut records = Vec::new();
        for _ in 0..cells.len() {
            records.push(serde_json::Map::new());
        }
        let mut table = PairTable::from_records(records);
        table.set_column(name, cells);
        table
    }

    #[test]
    fn coerce_handles_every_cell_shape() {
        assert_eq!(coerce(&Cell::Number(3.5)), Some(3.5));
        assert_eq!(coerce(&Cell::Text(" 6000 ".into())), Some(6000.0));
        assert_eq!(coerce(&Cell::Text("1e3".into())), Some(1000.0));
        assert_eq!(coerce(&Cell::Text("abc".into())), None);
        assert_eq!(coerce(&Cell::Text("NaN".into())), None);
        assert_eq!(coerce(&Cell::Text("".into())), None);
        assert_eq!(coerce(&Cell::Flag(true)), Some(1.0));
        assert_eq!(coerce(&Cell::Null), None);
        assert_eq!(coerce(&Cell::Map(BTreeMap::new())), None);
        assert_eq!(coerce(&Cell::List(vec![Cell::Number(1.0)])), None);
    }

    #[test]
    fn mixed_column_becomes_numbers_and_nulls() {
        let mut table = table_with(
            "liquidity",
            vec![
                Cell::Text("6000".into()),
                Cell::Text("n/a".into()),
                Cell::Null,
                Cell::Number(12.0),
            ],
        );

        normalize(&mut table, &["liquidity"]);

        let column = table.column("liquidity").unwrap();
        assert!(column.is_numeric());
        assert_eq!(
            column.cells,
            vec![Cell::Number(6000.0), Cell::Null, Cell::Null, Cell::Number(12.0)]
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut table = table_with("apr", vec![Cell::Text("1.5".into()), Cell::Text("x".into())]);
        normalize(&mut table, &["apr"]);
        let once = table.clone();
        normalize(&mut table, &["apr"]);
        assert_eq!(table, once);
    }

    #[test]
    fn absent_and_unlisted_columns_are_untouched() {
        let mut table = table_with("name", vec![Cell::Text("SOL-USDC".into())]);
        normalize(&mut table, &["liquidity", "apr"]);
        assert_eq!(
            table.column("name"),
            Some(&Column::new("name", vec![Cell::Text("SOL-USDC".into())]))
        );
        assert!(!table.has_column("liquidity"));
    }
}
