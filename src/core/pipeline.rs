use crate::config::PoolConfig;
use crate::core::pool::WorkerPool;
use crate::core::publisher::{Notification, Subscription};
use crate::core::writer::write_content;
use crate::domain::model::{
    ContentType, FetchedContent, ParsedEntity, PipelineOutcome, PipelineReport,
};
use crate::domain::ports::{Fetcher, Storage, UrlResolver};
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::Instrument;

/// Resolve → fetch → write for one content type, on its own worker pool.
pub struct ContentPipeline<R, F, S> {
    stages: Arc<Stages<R, F, S>>,
    pool: WorkerPool,
}

struct Stages<R, F, S> {
    resolver: R,
    fetcher: Arc<F>,
    storage: Arc<S>,
    directory: PathBuf,
}

#[derive(Debug)]
enum RecordOutcome {
    Processed,
    Skipped,
}

#[derive(Debug, Default)]
struct Tally {
    processed: usize,
    skipped: usize,
    failure: Option<String>,
}

impl Tally {
    fn record(
        &mut self,
        content_type: ContentType,
        joined: std::result::Result<Result<RecordOutcome>, JoinError>,
    ) {
        match joined {
            Ok(Ok(RecordOutcome::Processed)) => self.processed += 1,
            Ok(Ok(RecordOutcome::Skipped)) => self.skipped += 1,
            Ok(Err(e)) => {
                tracing::error!(
                    "❌ {} pipeline failed: {} (category: {:?})",
                    content_type,
                    e,
                    e.category()
                );
                self.failure.get_or_insert_with(|| e.to_string());
            }
            Err(e) => {
                tracing::error!("❌ {} worker task aborted: {}", content_type, e);
                self.failure.get_or_insert_with(|| e.to_string());
            }
        }
    }
}

impl<R, F, S> ContentPipeline<R, F, S>
where
    R: UrlResolver + 'static,
    F: Fetcher + 'static,
    S: Storage + 'static,
{
    pub fn new(
        resolver: R,
        fetcher: Arc<F>,
        storage: Arc<S>,
        directory: impl Into<PathBuf>,
        pool_config: &PoolConfig,
    ) -> Self {
        Self {
            stages: Arc::new(Stages {
                resolver,
                fetcher,
                storage,
                directory: directory.into(),
            }),
            pool: WorkerPool::new(pool_config),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.stages.resolver.content_type()
    }

    /// Consumes the subscription until the upstream completes, fails, or a
    /// record raises a pipeline-fatal error.
    ///
    /// Records are dispatched in arrival order; workers may finish in any
    /// order. After a fatal error no new record is dispatched, but records
    /// already running are allowed to finish.
    pub async fn run(self, mut subscription: Subscription<ParsedEntity>) -> PipelineReport {
        let content_type = self.content_type();
        let failed = Arc::new(AtomicBool::new(false));
        let mut workers = JoinSet::new();
        let mut tally = Tally::default();
        let mut upstream_error = None;

        tracing::info!(
            "🚀 {} pipeline subscribed ({} workers)",
            content_type,
            self.pool.size()
        );

        loop {
            while let Some(joined) = workers.try_join_next() {
                tally.record(content_type, joined);
            }
            if tally.failure.is_some() || failed.load(Ordering::SeqCst) {
                break;
            }

            let entity = match subscription.recv().await {
                Some(Notification::Next(entity)) => entity,
                Some(Notification::Error(message)) => {
                    upstream_error = Some(message);
                    break;
                }
                None => break,
            };

            let worker = match self.pool.acquire().await {
                Ok(worker) => worker,
                Err(e) => {
                    tally.failure = Some(e.to_string());
                    break;
                }
            };
            // 等待 worker 期間可能有其他記錄失敗
            if failed.load(Ordering::SeqCst) {
                break;
            }

            let stages = Arc::clone(&self.stages);
            let failed = Arc::clone(&failed);
            let span = tracing::info_span!(
                "worker",
                pipeline = %content_type,
                worker = %worker.name()
            );

            workers.spawn(
                async move {
                    let result = stages.process(entity, content_type, worker.name()).await;
                    if result.is_err() {
                        failed.store(true, Ordering::SeqCst);
                    }
                    drop(worker);
                    result
                }
                .instrument(span),
            );
        }

        // 已開始的記錄讓它們跑完
        while let Some(joined) = workers.join_next().await {
            tally.record(content_type, joined);
        }

        let outcome = match (tally.failure.take(), upstream_error) {
            (Some(failure), _) => PipelineOutcome::Terminated(failure),
            (None, Some(message)) => PipelineOutcome::UpstreamFailed(message),
            (None, None) => PipelineOutcome::Completed,
        };

        match &outcome {
            PipelineOutcome::Completed => tracing::info!(
                "🏁 PROCESS {}s harvesting done! (processed: {}, skipped: {})",
                content_type,
                tally.processed,
                tally.skipped
            ),
            PipelineOutcome::UpstreamFailed(message) => tracing::error!(
                "🛑 {}s harvesting stopped, upstream failed: {} (processed: {}, skipped: {})",
                content_type,
                message,
                tally.processed,
                tally.skipped
            ),
            PipelineOutcome::Terminated(message) => tracing::error!(
                "🛑 {}s harvesting terminated early: {} (processed: {}, skipped: {})",
                content_type,
                message,
                tally.processed,
                tally.skipped
            ),
        }

        PipelineReport {
            content_type,
            processed: tally.processed,
            skipped: tally.skipped,
            outcome,
        }
    }
}

impl<R, F, S> Stages<R, F, S>
where
    R: UrlResolver,
    F: Fetcher,
    S: Storage,
{
    async fn process(
        &self,
        entity: ParsedEntity,
        content_type: ContentType,
        worker: &str,
    ) -> Result<RecordOutcome> {
        let Some(target) = self.resolver.resolve(&entity) else {
            return Ok(RecordOutcome::Skipped);
        };

        let Some(bytes) = self.fetcher.fetch(&target, content_type).await? else {
            return Ok(RecordOutcome::Skipped);
        };

        let content = FetchedContent {
            bytes,
            destination_path: self.directory.join(&target.destination_filename),
            identifier: target.identifier,
        };
        let identifier = write_content(self.storage.as_ref(), content, content_type).await?;

        tracing::info!(
            identifier = %identifier,
            "✅ PROCESSED {} of GND identifier '{}': {}",
            content_type,
            identifier,
            worker
        );

        Ok(RecordOutcome::Processed)
    }
}
