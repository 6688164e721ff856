pub mod cli;

use crate::domain::model::ContentType;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_directory, validate_non_empty_string, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_WORKERS_PER_PIPELINE: usize = 2;

const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
const TOOL_REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");
const TOOL_CONTACT: &str = "zazi@smiy.org";
const LEGACY_DIRECTORY_FLAG: &str = "-entityfacts-pictures-dir";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "entityfacts-pictures-harvester", version)]
#[command(
    about = "Reads depiction information (image URLs) from line-delimited EntityFacts sheets on stdin and stores the pictures and thumbnails it references"
)]
#[command(
    after_help = "example: entityfacts-pictures-harvester --entityfacts-pictures-dir ./pictures < entityfacts.ldj"
)]
pub struct CliArgs {
    /// Directory where the pictures and thumbnails are stored
    #[arg(long = "entityfacts-pictures-dir", value_name = "DIR")]
    pub pictures_directory: PathBuf,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Parses the process arguments, accepting the single-dash spelling
    /// `-entityfacts-pictures-dir` as well.
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrites `-entityfacts-pictures-dir` to its double-dash form.
pub fn normalize_args<I>(args: I) -> Vec<std::ffi::OsString>
where
    I: IntoIterator<Item = std::ffi::OsString>,
{
    args.into_iter()
        .map(|arg| {
            let legacy = arg.to_str().is_some_and(|text| {
                text == LEGACY_DIRECTORY_FLAG
                    || text.starts_with(&format!("{}=", LEGACY_DIRECTORY_FLAG))
            });
            if legacy {
                let mut fixed = std::ffi::OsString::from("-");
                fixed.push(&arg);
                fixed
            } else {
                arg
            }
        })
        .collect()
}

/// Pool settings handed to each pipeline at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub pictures_directory: PathBuf,
    pub request_timeout_seconds: u64,
    pub workers_per_pipeline: usize,
    pub user_agent: String,
}

impl HarvestConfig {
    pub fn new(pictures_directory: impl Into<PathBuf>) -> Self {
        Self {
            pictures_directory: pictures_directory.into(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            workers_per_pipeline: DEFAULT_WORKERS_PER_PIPELINE,
            user_agent: user_agent(&host_name()),
        }
    }

    pub fn with_request_timeout_seconds(mut self, seconds: u64) -> Self {
        self.request_timeout_seconds = seconds;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn pool_config(&self, content_type: ContentType) -> PoolConfig {
        PoolConfig {
            name: format!("{}-worker", content_type),
            size: self.workers_per_pipeline,
        }
    }
}

#[cfg(feature = "cli")]
impl From<CliArgs> for HarvestConfig {
    fn from(args: CliArgs) -> Self {
        Self::new(args.pictures_directory)
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validate_directory("entityfacts-pictures-dir", &self.pictures_directory)?;
        validate_positive_number("request_timeout_seconds", self.request_timeout_seconds, 1)?;
        validate_positive_number("workers_per_pipeline", self.workers_per_pipeline as u64, 1)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        Ok(())
    }
}

/// User-Agent following the Wikimedia request identification policy:
/// bot name with the invoking host, repository URL and contact address,
/// and the tool version.
pub fn user_agent(host: &str) -> String {
    format!(
        "{name}-bot-from-{host}/{version} ({repository}; {contact}) {name}/{version}",
        name = TOOL_NAME,
        host = host,
        version = TOOL_VERSION,
        repository = TOOL_REPOSITORY,
        contact = TOOL_CONTACT,
    )
}

#[cfg(feature = "cli")]
fn host_name() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_string())
}

#[cfg(not(feature = "cli"))]
fn host_name() -> String {
    "localhost".to_string()
}
