use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CURRENCY_COLUMNS: &[&str] = &["fees", "volume", "liquidity", "trade_volume_24h"];
pub const PERCENTAGE_COLUMNS: &[&str] = &[
    "apr",
    "apy",
    "fee_tvl_ratio",
    "base_fee_percentage",
    "max_fee_percentage",
];
pub const PRICE_COLUMNS: &[&str] = &["current_price"];
pub const OTHER_NUMERIC_COLUMNS: &[&str] = &["bin_step"];
pub const IDENTIFIER_COLUMNS: &[&str] = &["mint_x", "mint_y", "address"];

/// Columns whose cells are period-keyed records.
pub const WINDOWED_COLUMNS: &[&str] = &["fee_tvl_ratio", "fees", "volume"];

/// Every column that must hold numbers or nulls after normalization.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "fees",
    "volume",
    "liquidity",
    "trade_volume_24h",
    "apr",
    "apy",
    "fee_tvl_ratio",
    "base_fee_percentage",
    "max_fee_percentage",
    "current_price",
    "bin_step",
];

pub const DEFAULT_COLUMNS: &[&str] = &[
    "name",
    "mint_x",
    "mint_y",
    "fees",
    "trade_volume_24h",
    "volume",
    "liquidity",
    "apr",
    "fee_tvl_ratio",
    "current_price",
    "bin_step",
];

pub const FEE_COLUMN: &str = "fees";
pub const LIQUIDITY_COLUMN: &str = "liquidity";

/// Semantic type of a column, resolved from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Currency,
    Percentage,
    Price,
    OtherNumeric,
    Identifier,
    Text,
}

impl ColumnKind {
    pub fn of(name: &str) -> Self {
        if CURRENCY_COLUMNS.contains(&name) || is_derived_column(name) {
            ColumnKind::Currency
        } else if PERCENTAGE_COLUMNS.contains(&name) {
            ColumnKind::Percentage
        } else if PRICE_COLUMNS.contains(&name) {
            ColumnKind::Price
        } else if OTHER_NUMERIC_COLUMNS.contains(&name) {
            ColumnKind::OtherNumeric
        } else if IDENTIFIER_COLUMNS.contains(&name) {
            ColumnKind::Identifier
        } else {
            ColumnKind::Text
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnKind::Currency | ColumnKind::Percentage | ColumnKind::Price | ColumnKind::OtherNumeric
        )
    }
}

/// Name of the fees-per-target-liquidity column, e.g. `fees_per_$1000_liq`.
pub fn derived_column_name(target_liquidity: f64) -> String {
    format!("fees_per_${}_liq", target_liquidity as i64)
}

pub fn is_derived_column(name: &str) -> bool {
    name.strip_prefix("fees_per_$")
        .and_then(|rest| rest.strip_suffix("_liq"))
        .map(|digits| digits.parse::<i64>().is_ok())
        .unwrap_or(false)
}

/// Time window used to pick one value out of a windowed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Min30,
    Hour1,
    Hour2,
    Hour4,
    Hour12,
    #[default]
    Hour24,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Min30,
        Period::Hour1,
        Period::Hour2,
        Period::Hour4,
        Period::Hour12,
        Period::Hour24,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Period::Min30 => "30 Min",
            Period::Hour1 => "1 Hour",
            Period::Hour2 => "2 Hours",
            Period::Hour4 => "4 Hours",
            Period::Hour12 => "12 Hours",
            Period::Hour24 => "24 Hours",
        }
    }

    /// Key used by the API inside windowed records.
    pub fn api_key(self) -> &'static str {
        match self {
            Period::Min30 => "min_30",
            Period::Hour1 => "hour_1",
            Period::Hour2 => "hour_2",
            Period::Hour4 => "hour_4",
            Period::Hour12 => "hour_12",
            Period::Hour24 => "hour_24",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown period: {0}")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted) || p.api_key() == wanted)
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}

impl TryFrom<String> for Period {
    type Error = UnknownPeriod;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_registry() {
        assert_eq!(ColumnKind::of("liquidity"), ColumnKind::Currency);
        assert_eq!(ColumnKind::of("fees_per_$1000_liq"), ColumnKind::Currency);
        assert_eq!(ColumnKind::of("apy"), ColumnKind::Percentage);
        assert_eq!(ColumnKind::of("current_price"), ColumnKind::Price);
        assert_eq!(ColumnKind::of("bin_step"), ColumnKind::OtherNumeric);
        assert_eq!(ColumnKind::of("mint_x"), ColumnKind::Identifier);
        assert_eq!(ColumnKind::of("name"), ColumnKind::Text);
        assert_eq!(ColumnKind::of("something_new"), ColumnKind::Text);
    }

    #[test]
    fn numeric_columns_match_numeric_kinds() {
        for name in NUMERIC_COLUMNS {
            assert!(ColumnKind::of(name).is_numeric(), "{}", name);
        }
    }

    #[test]
    fn derived_name_encodes_integer_target() {
        assert_eq!(derived_column_name(1000.0), "fees_per_$1000_liq");
        assert_eq!(derived_column_name(2500.7), "fees_per_$2500_liq");
        assert!(is_derived_column("fees_per_$2500_liq"));
        assert!(!is_derived_column("fees_per_$abc_liq"));
    }

    #[test]
    fn period_parses_label_or_key() {
        assert_eq!("24 Hours".parse::<Period>().unwrap(), Period::Hour24);
        assert_eq!("24 hours".parse::<Period>().unwrap(), Period::Hour24);
        assert_eq!("min_30".parse::<Period>().unwrap(), Period::Min30);
        assert_eq!("12 Hours".parse::<Period>().unwrap().api_key(), "hour_12");
        assert!("3 Days".parse::<Period>().is_err());
        assert_eq!(Period::default(), Period::Hour24);
    }
}
