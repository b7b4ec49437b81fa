use chrono::{DateTime, Utc};
use std::sync::Arc;
use crate::config::ViewConfig;
use crate::models::{PairPage, PairTable, Period, NUMERIC_COLUMNS, WINDOWED_COLUMNS};
use crate::models::schema::{derived_column_name, UnknownPeriod, FEE_COLUMN, LIQUIDITY_COLUMN};
use crate::sources::{PairSource, SourceError};
use super::{compute_derived, extract_window, filter_by_threshold, normalize, PairCache};

pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load data from the API. Please check server logs or try again later.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Period(#[from] UnknownPeriod),
    #[error("Target liquidity must be at least 1, got {0}")]
    TargetLiquidity(f64),
    #[error("Minimum liquidity must not be negative, got {0}")]
    MinLiquidity(f64),
}

/// Caller-chosen parameters of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub period: Period,
    pub target_liquidity: f64,
    pub min_liquidity: f64,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            period: Period::Hour24,
            target_liquidity: 1000.0,
            min_liquidity: 5000.0,
        }
    }
}

impl ViewParams {
    pub fn new(period: Period, target_liquidity: f64, min_liquidity: f64) -> Result<Self, ViewError> {
        if !(target_liquidity >= 1.0) {
            return Err(ViewError::TargetLiquidity(target_liquidity));
        }
        if !(min_liquidity >= 0.0) {
            return Err(ViewError::MinLiquidity(min_liquidity));
        }
        Ok(Self { period, target_liquidity, min_liquidity })
    }

    pub fn from_config(config: &ViewConfig) -> Result<Self, ViewError> {
        Self::new(config.period.parse()?, config.target_liquidity, config.min_liquidity)
    }

    pub fn derived_column(&self) -> String {
        derived_column_name(self.target_liquidity)
    }
}

/// Processed table for one run. `total` is the source's population size and
/// is unaffected by filtering.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: PairTable,
    pub total: i64,
    /// Rows fetched before the liquidity filter ran.
    pub fetched_rows: usize,
    pub params: ViewParams,
    pub derived_column: String,
    pub fetched_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl PipelineOutput {
    fn failed(params: ViewParams) -> Self {
        Self {
            table: PairTable::empty(),
            total: 0,
            fetched_rows: 0,
            derived_column: params.derived_column(),
            params,
            fetched_at: None,
            error: Some(LOAD_FAILED_MESSAGE.to_string()),
        }
    }
}

pub struct PairPipeline {
    source: Arc<dyn PairSource>,
    cache: Arc<PairCache>,
}

impl PairPipeline {
    pub fn new(source: Arc<dyn PairSource>, cache: Arc<PairCache>) -> Self {
        Self { source, cache }
    }

    /// Cached page, or a fresh fetch with the flat numeric columns normalized.
    /// Failures are not cached.
    pub async fn load(&self) -> Result<Arc<PairPage>, SourceError> {
        if let Some(page) = self.cache.get() {
            tracing::debug!("Cache hit: {} pairs", page.table.len());
            return Ok(page);
        }

        tracing::debug!("Cache miss, fetching from {}", self.source.name());
        let mut page = self.source.fetch_pairs().await?;

        let flat: Vec<&str> = NUMERIC_COLUMNS.iter()
            .copied()
            .filter(|c| !WINDOWED_COLUMNS.contains(c))
            .collect();
        normalize(&mut page.table, &flat);

        tracing::info!("✓ Loaded {} pairs (total {})", page.table.len(), page.total);
        Ok(self.cache.store(page))
    }

    /// One full run. A fetch failure yields an empty output carrying a message.
    pub async fn run(&self, params: ViewParams) -> PipelineOutput {
        match self.load().await {
            Ok(page) => process(&page, params),
            Err(e) => {
                tracing::warn!("Pipeline run aborted: {}", e);
                PipelineOutput::failed(params)
            }
        }
    }
}

/// Windows, normalization, derived metric and liquidity filter over a copy of
/// the page's table.
pub fn process(page: &PairPage, params: ViewParams) -> PipelineOutput {
    let mut table = page.table.clone();
    let derived_column = if table.is_empty() {
        params.derived_column()
    } else {
        extract_window(&mut table, WINDOWED_COLUMNS, params.period);
        normalize(&mut table, NUMERIC_COLUMNS);
        let name = compute_derived(&mut table, FEE_COLUMN, LIQUIDITY_COLUMN, params.target_liquidity);
        filter_by_threshold(&mut table, LIQUIDITY_COLUMN, params.min_liquidity);
        name
    };

    PipelineOutput {
        table,
        total: page.total,
        fetched_rows: page.table.len(),
        params,
        derived_column,
        fetched_at: Some(page.fetched_at),
        error: None,
    }
}
