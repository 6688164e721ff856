use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Malformed record on line {line_number}: {source} (line = '{line}')")]
    MalformedRecord {
        line_number: usize,
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read input: {0}")]
    InputRead(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Subscription error: {message}")]
    Subscription { message: String },

    #[error("Pipeline task failed: {message}")]
    PipelineTask { message: String },
}

/// 錯誤分類，對應擷取流程的三種處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 整個執行中止
    FatalIngestion,
    /// 只中止所屬的 pipeline
    FatalPipeline,
    Configuration,
}

impl HarvestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HarvestError::MalformedRecord { .. } | HarvestError::InputRead(_) => {
                ErrorCategory::FatalIngestion
            }
            HarvestError::Http(_)
            | HarvestError::Write { .. }
            | HarvestError::Subscription { .. }
            | HarvestError::PipelineTask { .. } => ErrorCategory::FatalPipeline,
            HarvestError::Config { .. } | HarvestError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::FatalIngestion => 1,
            ErrorCategory::FatalPipeline => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HarvestError::MalformedRecord { .. } => {
                "Check the input feed: every line must be one JSON object"
            }
            HarvestError::InputRead(_) => "Check that standard input is readable UTF-8 text",
            HarvestError::Http(_) => "Check network connectivity to the image host",
            HarvestError::Write { .. } => {
                "Check free disk space and write permissions of the pictures directory"
            }
            HarvestError::Config { .. } | HarvestError::InvalidConfigValue { .. } => {
                "Check the command line options"
            }
            HarvestError::Subscription { .. } | HarvestError::PipelineTask { .. } => {
                "This is an internal error, please report it"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
