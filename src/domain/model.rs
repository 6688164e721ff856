use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 從 EntityFacts sheet 解析出的實體，兩條 pipeline 各自拿到一份複本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEntity {
    pub identifier: String,
    pub depiction: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTarget {
    pub source_url: String,
    pub destination_filename: String,
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub bytes: Vec<u8>,
    pub destination_path: PathBuf,
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Picture,
    Thumbnail,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Picture => "picture",
            ContentType::Thumbnail => "thumbnail",
        }
    }

    /// Filename prefix, unique per content type.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ContentType::Picture => "image_",
            ContentType::Thumbnail => "thumbnail_",
        }
    }

    pub fn file_name(&self, identifier: &str, extension: &str) -> String {
        format!("{}{}.{}", self.file_prefix(), identifier, extension)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one content pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    /// 上游擷取失敗，pipeline 停止接收
    UpstreamFailed(String),
    Terminated(String),
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub content_type: ContentType,
    pub processed: usize,
    pub skipped: usize,
    pub outcome: PipelineOutcome,
}

impl PipelineReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == PipelineOutcome::Completed
    }
}

#[derive(Debug, Clone)]
pub struct HarvestSummary {
    pub records_read: usize,
    pub entities_published: usize,
    pub reports: Vec<PipelineReport>,
}

impl HarvestSummary {
    pub fn report(&self, content_type: ContentType) -> Option<&PipelineReport> {
        self.reports.iter().find(|r| r.content_type == content_type)
    }

    pub fn all_completed(&self) -> bool {
        self.reports.iter().all(PipelineReport::is_completed)
    }
}
