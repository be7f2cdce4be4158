//! Application use cases / business logic

pub mod analyze;
pub mod bulk;
pub mod fix;
pub mod stats;

pub use analyze::{AnalyzeError, EngineConfig, FeedDoctor, generate_seo_title};
pub use fix::FixError;
pub use stats::{StatsError, compute_stats};
