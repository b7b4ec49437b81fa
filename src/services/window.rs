use crate::models::{Cell, PairTable, Period};

/// Replaces each period-keyed record in `columns` with its value for `period`.
/// Cells that are not records (null included) become null, as do records
/// without the key. Run the normalizer afterwards: the selected values are not
/// guaranteed to be numbers.
pub fn extract_window(table: &mut PairTable, columns: &[&str], period: Period) {
    let key = period.api_key();
    for name in columns {
        let Some(column) = table.column_mut(name) else {
            continue;
        };
        for cell in column.cells.iter_mut() {
            *cell = match std::mem::replace(cell, Cell::Null) {
                Cell::Map(mut map) => map.remove(key).unwrap_or(Cell::Null),
                _ => Cell::Null,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: serde_json::Value) -> PairTable {
        let records = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        PairTable::from_records(records)
    }

    #[test]
    fn selects_value_for_every_period() {
        let windows = json!({
            "min_30": 1, "hour_1": 2, "hour_2": 3,
            "hour_4": 4, "hour_12": 5, "hour_24": 6
        });
        for (i, period) in Period::ALL.into_iter().enumerate() {
            let mut t = table(json!([{ "fees": windows.clone() }]));
            extract_window(&mut t, &["fees"], period);
            assert_eq!(t.cell("fees", 0), Some(&Cell::Number((i + 1) as f64)), "{}", period);
        }
    }

    #[test]
    fn non_record_cells_become_null() {
        let mut t = table(json!([
            {"volume": 10},
            {"volume": "abc"},
            {"volume": null},
            {"volume": {"hour_1": 3}},
            {"volume": {"hour_24": "7.5"}},
        ]));

        extract_window(&mut t, &["volume", "fees"], Period::Hour24);

        let cells = &t.column("volume").unwrap().cells;
        assert_eq!(cells[0], Cell::Null);
        assert_eq!(cells[1], Cell::Null);
        assert_eq!(cells[2], Cell::Null);
        assert_eq!(cells[3], Cell::Null);
        assert_eq!(cells[4], Cell::Text("7.5".to_string()));
        assert!(!t.has_column("fees"));
    }
}
