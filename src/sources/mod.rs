pub mod meteora;

use async_trait::async_trait;
use crate::models::PairPage;

#[async_trait]
pub trait PairSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_pairs(&self) -> Result<PairPage, SourceError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
