use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One value of a pair table. `Null` is the only "no value" marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Flag(bool),
    Text(String),
    List(Vec<Cell>),
    Map(BTreeMap<String, Cell>),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Finite numbers only; anything else becomes `Null`.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Null
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Flag(b),
            Value::Number(n) => n.as_f64().map(Cell::number).unwrap_or(Cell::Null),
            Value::String(s) => Cell::Text(s),
            Value::Array(items) => Cell::List(items.into_iter().map(Cell::from).collect()),
            Value::Object(map) => Cell::Map(map.into_iter().map(|(k, v)| (k, Cell::from(v))).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self { name: name.into(), cells }
    }

    /// Every cell is a number or null.
    pub fn is_numeric(&self) -> bool {
        self.cells.iter().all(|c| matches!(c, Cell::Number(_) | Cell::Null))
    }
}

/// Column-oriented table of pair records. All columns have `len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairTable {
    columns: Vec<Column>,
    rows: usize,
}

impl PairTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from JSON objects. The column set is the union of keys in
    /// order of first appearance; a record missing a key gets `Null` there.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let rows = records.len();
        let mut columns: Vec<Column> = Vec::new();

        for (row, record) in records.into_iter().enumerate() {
            for (key, value) in record {
                let idx = match columns.iter().position(|c| c.name == key) {
                    Some(idx) => idx,
                    None => {
                        columns.push(Column::new(key, vec![Cell::Null; rows]));
                        columns.len() - 1
                    }
                };
                columns[idx].cells[row] = Cell::from(value);
            }
        }

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[cfg(test)]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Replaces the named column, or appends it when absent.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows);
        match self.column_mut(name) {
            Some(column) => column.cells = cells,
            None => self.columns.push(Column::new(name, cells)),
        }
    }

    /// Keeps row `i` iff `keep[i]`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.rows);
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.cells.retain(|_| *flags.next().unwrap_or(&false));
        }
        self.rows = keep.iter().filter(|k| **k).count();
    }

    #[cfg(test)]
    pub fn cell(&self, column: &str, row: usize) -> Option<&Cell> {
        self.column(column).and_then(|c| c.cells.get(row))
    }
}

/// Result of one fetch: the table plus the population size the source reports.
#[derive(Debug, Clone)]
pub struct PairPage {
    pub table: PairTable,
    pub total: i64,
    pub fetched_at: DateTime<Utc>,
}

impl PairPage {
    pub fn new(table: PairTable, total: i64) -> Self {
        Self {
            table,
            total,
            fetched_at: Utc::now(),
        }
    }
}
