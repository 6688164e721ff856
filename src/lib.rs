pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{cli::LocalStorage, HarvestConfig, PoolConfig};

pub use core::{etl::HarvestEngine, fetcher::HttpFetcher, publisher::Publisher};
pub use domain::model::{ContentType, HarvestSummary, ParsedEntity, PipelineOutcome};
pub use utils::error::{HarvestError, Result};
