use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::models::{Cell, Column, ColumnKind};
use crate::models::schema::LIQUIDITY_COLUMN;
use crate::services::PipelineOutput;

/// How a column's values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFormat {
    Dollar,
    Percent,
    Price,
    Integer,
    Plain,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub label: String,
    pub kind: ColumnKind,
    pub format: ColumnFormat,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub small: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Display-ready slice of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub period: &'static str,
    pub target_liquidity: f64,
    pub min_liquidity: f64,
    pub displayed: usize,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableView {
    /// `selected` is the caller's column choice; `None` means the defaults.
    pub fn build(output: &PipelineOutput, selected: Option<&[String]>, defaults: &[String]) -> Self {
        let params = output.params;
        let table = &output.table;
        let derived = output.derived_column.as_str();

        let mut view = Self {
            period: params.period.label(),
            target_liquidity: params.target_liquidity,
            min_liquidity: params.min_liquidity,
            displayed: table.len(),
            total: output.total,
            summary: None,
            notice: None,
            fetched_at: output.fetched_at,
            columns: Vec::new(),
            rows: Vec::new(),
        };

        if let Some(error) = &output.error {
            view.notice = Some(Notice { level: NoticeLevel::Error, message: error.clone() });
            return view;
        }
        if output.fetched_rows == 0 {
            view.notice = Some(Notice {
                level: NoticeLevel::Info,
                message: "No pair data is currently available to display.".to_string(),
            });
            return view;
        }

        view.summary = Some(format!(
            "Displaying {} of ~{} available pairs (after filters) for '{}'.",
            table.len(),
            output.total,
            params.period.label()
        ));

        let available = table.column_names();
        let names = match selected {
            Some(chosen) => arrange_selected(chosen, derived, &available),
            None => default_selection(defaults, derived, &available),
        };

        if names.is_empty() {
            view.notice = Some(Notice {
                level: NoticeLevel::Warning,
                message: "Please select at least one column to display the table.".to_string(),
            });
            return view;
        }
        if table.is_empty() && params.min_liquidity > 0.0 {
            view.notice = Some(Notice {
                level: NoticeLevel::Info,
                message: format!(
                    "No pairs found with liquidity of at least ${}.",
                    thousands(params.min_liquidity.round() as i64)
                ),
            });
            return view;
        }

        let columns: Vec<&Column> = names.iter().filter_map(|n| table.column(n)).collect();
        view.columns = columns.iter()
            .map(|c| column_spec(c, derived, params.target_liquidity))
            .collect();
        view.rows = (0..table.len())
            .map(|row| columns.iter().map(|c| c.cells[row].clone()).collect())
            .collect();
        view
    }

    /// Fixed-width text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(summary) = &self.summary {
            out.push_str(summary);
            out.push('\n');
        }
        if let Some(notice) = &self.notice {
            out.push_str(&notice.message);
            out.push('\n');
        }
        if self.columns.is_empty() {
            return out;
        }

        let body: Vec<Vec<String>> = self.rows.iter()
            .map(|row| row.iter()
                .zip(&self.columns)
                .map(|(cell, spec)| format_cell(cell, spec.format))
                .collect())
            .collect();

        let widths: Vec<usize> = self.columns.iter()
            .enumerate()
            .map(|(i, spec)| {
                body.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(spec.label.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: Vec<&str>| -> String {
            cells.iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        out.push('\n');
        out.push_str(&line(self.columns.iter().map(|c| c.label.as_str()).collect()));
        out.push('\n');
        out.push_str(&widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("  "));
        out.push('\n');
        for row in &body {
            out.push_str(&line(row.iter().map(String::as_str).collect()));
            out.push('\n');
        }
        out
    }
}

/// Configured defaults with the derived column right after liquidity (or at
/// the end), limited to columns the table has. Falls back to the first seven
/// available columns.
pub fn default_selection(defaults: &[String], derived: &str, available: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in defaults {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    if available.contains(&derived) && !names.iter().any(|n| n == derived) {
        match names.iter().position(|n| n == LIQUIDITY_COLUMN) {
            Some(idx) => names.insert(idx + 1, derived.to_string()),
            None => names.push(derived.to_string()),
        }
    }

    names.retain(|n| available.contains(&n.as_str()));
    if names.is_empty() {
        names = available.iter().take(7).map(|n| n.to_string()).collect();
    }
    names
}

/// Caller's columns in their order, unknown names dropped, with the derived
/// column moved right after liquidity when both are chosen.
pub fn arrange_selected(selected: &[String], derived: &str, available: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in selected {
        if available.contains(&name.as_str()) && !names.contains(name) {
            names.push(name.clone());
        }
    }

    if let Some(derived_idx) = names.iter().position(|n| n == derived) {
        if names.iter().any(|n| n == LIQUIDITY_COLUMN) {
            let moved = names.remove(derived_idx);
            if let Some(liq_idx) = names.iter().position(|n| n == LIQUIDITY_COLUMN) {
                names.insert(liq_idx + 1, moved);
            }
        }
    }
    names
}

fn column_spec(column: &Column, derived: &str, target_liquidity: f64) -> ColumnSpec {
    let kind = ColumnKind::of(&column.name);
    let format = match kind {
        _ if !kind.is_numeric() || !column.is_numeric() => ColumnFormat::Text,
        ColumnKind::Currency => ColumnFormat::Dollar,
        ColumnKind::Percentage => ColumnFormat::Percent,
        ColumnKind::Price => ColumnFormat::Price,
        ColumnKind::OtherNumeric => {
            let integral = column.cells.iter()
                .filter_map(Cell::as_f64)
                .all(|v| v.fract() == 0.0);
            if integral { ColumnFormat::Integer } else { ColumnFormat::Plain }
        }
        _ => ColumnFormat::Text,
    };

    let label = if column.name == derived {
        format!("Fees per ${} Liq", thousands(target_liquidity as i64))
    } else {
        title_label(&column.name)
    };

    ColumnSpec {
        name: column.name.clone(),
        label,
        kind,
        format,
        small: kind == ColumnKind::Identifier,
    }
}

/// `fee_tvl_ratio` -> `Fee Tvl Ratio`.
pub fn title_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
        } else {
            label.push(c);
        }
        prev_alpha = c.is_alphabetic();
    }
    label
}

pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(d);
    }
    if value < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

pub fn format_cell(cell: &Cell, format: ColumnFormat) -> String {
    let value = match cell {
        Cell::Null => return String::new(),
        Cell::Number(n) => *n,
        Cell::Text(s) => return s.clone(),
        Cell::Flag(b) => return b.to_string(),
        other => return serde_json::to_string(other).unwrap_or_default(),
    };

    match format {
        ColumnFormat::Dollar => {
            let cents = (value.abs() * 100.0).round() as i64;
            let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
            format!("{}${}.{:02}", sign, thousands(cents / 100), cents % 100)
        }
        ColumnFormat::Percent => format!("{:.2}%", value),
        ColumnFormat::Price => format!("{:.12}", value),
        ColumnFormat::Integer => format!("{}", value.round() as i64),
        ColumnFormat::Plain | ColumnFormat::Text => value.to_string(),
    }
}
