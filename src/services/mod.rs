pub mod cache;
pub mod filter;
pub mod metric;
pub mod normalizer;
pub mod pipeline;
pub mod window;

pub use cache::PairCache;
pub use filter::filter_by_threshold;
pub use metric::compute_derived;
pub use normalizer::normalize;
pub use pipeline::{PairPipeline, PipelineOutput, ViewError, ViewParams};
pub use window::extract_window;
