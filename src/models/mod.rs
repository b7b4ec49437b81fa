pub mod pair;
pub mod schema;

pub use pair::{Cell, Column, PairPage, PairTable};
pub use schema::{ColumnKind, Period, DEFAULT_COLUMNS, NUMERIC_COLUMNS, WINDOWED_COLUMNS};
