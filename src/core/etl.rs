use crate::config::cli::LocalStorage;
use crate::config::HarvestConfig;
use crate::core::extract::DepictionExtractor;
use crate::core::fetcher::HttpFetcher;
use crate::core::pipeline::ContentPipeline;
use crate::core::publisher::{Connection, Publisher};
use crate::core::resolver::{PictureResolver, ThumbnailResolver};
use crate::core::source::RecordSource;
use crate::domain::model::{
    ContentType, HarvestSummary, ParsedEntity, PipelineOutcome, PipelineReport,
};
use crate::domain::ports::{Fetcher, Storage, UrlResolver};
use crate::utils::error::{HarvestError, Result};
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::task::JoinHandle;

const PIPELINE_COUNT: usize = 2;

/// Drives one harvesting run: reads the input on the calling task, fans the
/// extracted entities out to the picture and thumbnail pipelines, and waits
/// for both to finish.
pub struct HarvestEngine<F, S> {
    config: HarvestConfig,
    fetcher: Arc<F>,
    storage: Arc<S>,
    extractor: DepictionExtractor,
}

impl HarvestEngine<HttpFetcher, LocalStorage> {
    pub fn from_config(config: HarvestConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout()).map_err(
            |e| HarvestError::Config {
                message: format!("failed to build HTTP client: {}", e),
            },
        )?;
        Ok(Self::new(config, fetcher, LocalStorage::new()))
    }
}

impl<F, S> HarvestEngine<F, S>
where
    F: Fetcher + 'static,
    S: Storage + 'static,
{
    pub fn new(config: HarvestConfig, fetcher: F, storage: S) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            storage: Arc::new(storage),
            extractor: DepictionExtractor::new(),
        }
    }

    /// Runs until the input is exhausted and both pipelines are done.
    ///
    /// Returns the summary even when a pipeline terminated early. A malformed
    /// record or an input read error stops the pump, lets both pipelines
    /// wind down, and is returned as the error.
    pub async fn run<R>(&self, input: R) -> Result<HarvestSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        tracing::info!(
            "🚀 Starting harvest into '{}'",
            self.config.pictures_directory.display()
        );

        let publisher = Arc::new(Publisher::new(PIPELINE_COUNT));

        let pictures = self.spawn_pipeline(PictureResolver, &publisher);
        let thumbnails = self.spawn_pipeline(ThumbnailResolver, &publisher);

        // 所有 pipeline 訂閱完成前不會開始讀取
        let mut connection = publisher.connect().await?;
        let mut source = RecordSource::new(input);
        let pumped = self.pump(&mut source, &mut connection).await;

        let entities_published = match &pumped {
            Ok(()) => connection.complete(),
            Err(e) => {
                tracing::error!(
                    "❌ ingestion aborted: {} (category: {:?})",
                    e,
                    e.category()
                );
                connection.fail(e.to_string())
            }
        };

        let reports = vec![
            join_pipeline(ContentType::Picture, pictures).await,
            join_pipeline(ContentType::Thumbnail, thumbnails).await,
        ];

        pumped?;

        let summary = HarvestSummary {
            records_read: source.lines_read(),
            entities_published,
            reports,
        };

        tracing::info!(
            "📊 read {} records, published {} entities",
            summary.records_read,
            summary.entities_published
        );

        Ok(summary)
    }

    fn spawn_pipeline<R>(
        &self,
        resolver: R,
        publisher: &Arc<Publisher<ParsedEntity>>,
    ) -> JoinHandle<PipelineReport>
    where
        R: UrlResolver + 'static,
    {
        let content_type = resolver.content_type();
        let pipeline = ContentPipeline::new(
            resolver,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.storage),
            self.config.pictures_directory.clone(),
            &self.config.pool_config(content_type),
        );
        let publisher = Arc::clone(publisher);

        tokio::spawn(async move {
            match publisher.subscribe() {
                Ok(subscription) => pipeline.run(subscription).await,
                Err(e) => PipelineReport {
                    content_type,
                    processed: 0,
                    skipped: 0,
                    outcome: PipelineOutcome::Terminated(e.to_string()),
                },
            }
        })
    }

    async fn pump<R>(
        &self,
        source: &mut RecordSource<R>,
        connection: &mut Connection<ParsedEntity>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(record) = source.next_record().await? {
            if let Some(entity) = self.extractor.extract(&record)? {
                connection.publish(entity);
            }
        }
        Ok(())
    }
}

async fn join_pipeline(
    content_type: ContentType,
    handle: JoinHandle<PipelineReport>,
) -> PipelineReport {
    match handle.await {
        Ok(report) => report,
        Err(e) => {
            let error = HarvestError::PipelineTask {
                message: e.to_string(),
            };
            tracing::error!("❌ {} pipeline task failed: {}", content_type, error);
            PipelineReport {
                content_type,
                processed: 0,
                skipped: 0,
                outcome: PipelineOutcome::Terminated(error.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::UrlTarget;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }
    }

    /// Every URL answers with its own text as the body.
    struct EchoFetcher;

    #[async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(
            &self,
            target: &UrlTarget,
            _content_type: ContentType,
        ) -> Result<Option<Vec<u8>>> {
            Ok(Some(target.source_url.clone().into_bytes()))
        }
    }

    fn sheet(identifier: &str) -> String {
        json!({
            "@id": format!("http://hub.culturegraph.org/entityfacts/{}", identifier),
            "depiction": {
                "@id": format!("http://img/{}.jpg", identifier),
                "thumbnail": {"@id": format!("http://img/{}.png?width=270", identifier)}
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_run_fans_out_to_both_pipelines() {
        let storage = MockStorage::default();
        let engine =
            HarvestEngine::new(HarvestConfig::new("/pics"), EchoFetcher, storage.clone());

        let input = format!("{}\n{}\n", sheet("1"), sheet("2"));
        let summary = engine.run(input.as_bytes()).await.unwrap();

        assert_eq!(summary.records_read, 2);
        assert_eq!(summary.entities_published, 2);
        assert!(summary.all_completed());
        assert_eq!(summary.report(ContentType::Picture).unwrap().processed, 2);
        assert_eq!(summary.report(ContentType::Thumbnail).unwrap().processed, 2);

        let files = storage.files.lock().await;
        assert_eq!(files.len(), 4);
        assert_eq!(
            files.get(Path::new("/pics/thumbnail_2.png")).unwrap(),
            b"http://img/2.png?width=270"
        );
    }

    #[tokio::test]
    async fn test_blank_line_aborts_run() {
        let storage = MockStorage::default();
        let engine =
            HarvestEngine::new(HarvestConfig::new("/pics"), EchoFetcher, storage.clone());

        let input = format!("{}\n\n{}\n", sheet("1"), sheet("2"));
        let err = engine.run(input.as_bytes()).await.unwrap_err();

        assert!(matches!(err, HarvestError::MalformedRecord { line_number: 2, .. }));
        let files = storage.files.lock().await;
        assert!(!files.contains_key(Path::new("/pics/image_2.jpg")));
        assert!(!files.contains_key(Path::new("/pics/thumbnail_2.png")));
    }

    #[tokio::test]
    async fn test_malformed_line_aborts_run() {
        let storage = MockStorage::default();
        let engine =
            HarvestEngine::new(HarvestConfig::new("/pics"), EchoFetcher, storage.clone());

        let input = format!("{}\nnot json\n{}\n", sheet("1"), sheet("3"));
        let err = engine.run(input.as_bytes()).await.unwrap_err();

        assert!(matches!(err, HarvestError::MalformedRecord { line_number: 2, .. }));
        let files = storage.files.lock().await;
        assert!(!files.contains_key(Path::new("/pics/image_3.jpg")));
        assert!(!files.contains_key(Path::new("/pics/thumbnail_3.png")));
    }

    #[tokio::test]
    async fn test_empty_input_completes() {
        let engine = HarvestEngine::new(
            HarvestConfig::new("/pics"),
            EchoFetcher,
            MockStorage::default(),
        );

        let summary = engine.run(&b""[..]).await.unwrap();

        assert_eq!(summary.records_read, 0);
        assert_eq!(summary.reports.len(), 2);
        assert!(summary.all_completed());
    }
}
