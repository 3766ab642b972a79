// Select → fetch → mark → extract, run as one background unit of work

use crate::catalog::CatalogStore;
use crate::error::PipelineError;
use std::sync::Arc;
use tercet_fetch::{ContentRecord, Extractor, Fetcher};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// What a pipeline run hands to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A validated record
    Record(ContentRecord),
    /// Something failed along the way; the cause has been logged
    NoRecord,
    /// There is nothing in the catalog to show
    CatalogEmpty,
}

impl Outcome {
    pub fn record(&self) -> Option<&ContentRecord> {
        match self {
            Outcome::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// Callback for delivering the outcome of a background run
pub type RecordCallback = Arc<dyn Fn(Outcome) + Send + Sync>;

pub struct Pipeline<S> {
    catalog: Arc<S>,
    fetcher: Fetcher,
    extractor: Extractor,
}

impl<S: CatalogStore + 'static> Pipeline<S> {
    pub fn new(catalog: Arc<S>, fetcher: Fetcher) -> Self {
        Self {
            catalog,
            fetcher,
            extractor: Extractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn catalog(&self) -> &Arc<S> {
        &self.catalog
    }

    /// Produce the next record, collapsing every failure into
    /// [`Outcome::NoRecord`].
    pub async fn next_record(&self) -> Outcome {
        match self.try_next_record().await {
            Ok(Some(record)) => Outcome::Record(record),
            Ok(None) => Outcome::CatalogEmpty,
            Err(e) => {
                warn!("No record produced: {}", e);
                Outcome::NoRecord
            }
        }
    }

    /// Like [`next_record`](Self::next_record) but keeps the failure cause.
    /// `Ok(None)` means the catalog is empty.
    pub async fn try_next_record(&self) -> Result<Option<ContentRecord>, PipelineError> {
        let catalog = Arc::clone(&self.catalog);
        let Some(reference) = tokio::task::spawn_blocking(move || catalog.pick_unvisited()).await??
        else {
            return Ok(None);
        };

        let raw = self.fetcher.fetch(&reference).await?;

        // A 200 consumes the reference even if its payload turns out unusable.
        let catalog = Arc::clone(&self.catalog);
        let marked = reference.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || catalog.mark_visited(&marked)).await? {
            warn!("Could not mark '{}' as visited: {}", reference, e);
        }

        let record = self.extractor.extract(&raw)?;
        info!("Extracted record from '{}'", reference);
        Ok(Some(record))
    }

    /// Run the pipeline on a tokio worker without blocking the caller.
    pub fn spawn_next(self: Arc<Self>) -> JoinHandle<Outcome> {
        tokio::spawn(async move { self.next_record().await })
    }

    /// Run the pipeline in the background and deliver the outcome to `callback`.
    pub fn spawn_next_with(self: Arc<Self>, callback: RecordCallback) -> JoinHandle<()> {
        tokio::spawn(async move {
            let outcome = self.next_record().await;
            callback(outcome);
        })
    }
}
