use crate::domain::model::{ContentType, UrlTarget};
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const BODY_EXCERPT_LIMIT: usize = 200;

/// HTTP 下載，只試一次，不重試
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        target: &UrlTarget,
        content_type: ContentType,
    ) -> Result<Option<Vec<u8>>> {
        tracing::debug!(
            identifier = %target.identifier,
            "📥 try to retrieve {} for GND identifier '{}' from URL '{}'",
            content_type,
            target.identifier,
            target.source_url
        );

        let response = self.client.get(&target.source_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            tracing::warn!(
                stage = "fetch",
                identifier = %target.identifier,
                "⚠️ couldn't fetch {} for GND identifier '{}' from URL '{}', got a '{}' ('{}')",
                content_type,
                target.identifier,
                target.source_url,
                status,
                body_excerpt(&body)
            );
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        tracing::debug!(
            identifier = %target.identifier,
            "retrieved {} for GND identifier '{}' ({} bytes)",
            content_type,
            target.identifier,
            bytes.len()
        );

        Ok(Some(bytes.to_vec()))
    }
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_EXCERPT_LIMIT) {
        Some((index, _)) => format!("{}…", &text[..index]),
        None => text.into_owned(),
    }
}
