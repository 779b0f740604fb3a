//! Crawl driver
//!
//! The driver walks the post chain one page at a time:
//! - Load the page behind the current handle and extract its record
//! - Skip posts already persisted in full
//! - Enrich new posts, split them, and store both views
//! - Send a best-effort notification for each stored post
//! - Advance to the handle the page's navigation link points at
//!
//! Any failure other than notification halts the crawl; the untouched store
//! makes the failed post look new on the next run, so nothing is lost.

use crate::enrich::Enrich;
use crate::model::{PageHandle, RawRecord};
use crate::notify::Notifier;
use crate::page::PageSource;
use crate::storage::{RecordStore, StoreError};
use crate::{AlertmapError, PostError};
use std::sync::{Arc, Mutex};

/// Counters describing one finished crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Pages loaded and extracted
    pub visited: u64,

    /// Posts processed as new (persisted, unless this was a dry run)
    pub stored: u64,

    /// Posts skipped because they were already persisted
    pub skipped: u64,
}

/// Sequential crawl driver over the capability interfaces
pub struct CrawlDriver {
    source: Box<dyn PageSource>,
    enricher: Box<dyn Enrich>,
    store: Arc<Mutex<dyn RecordStore>>,
    notifier: Box<dyn Notifier>,
    dry_run: bool,
}

impl CrawlDriver {
    pub fn new(
        source: Box<dyn PageSource>,
        enricher: Box<dyn Enrich>,
        store: Arc<Mutex<dyn RecordStore>>,
        notifier: Box<dyn Notifier>,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            enricher,
            store,
            notifier,
            dry_run,
        }
    }

    /// Runs the crawl from `start` until the navigation chain ends
    ///
    /// # Arguments
    ///
    /// * `start` - Handle of the first page to visit
    ///
    /// # Returns
    ///
    /// Counters for the finished crawl, or the error that halted it
    pub async fn run(&self, start: PageHandle) -> Result<CrawlOutcome, AlertmapError> {
        let mut outcome = CrawlOutcome::default();
        let mut current = Some(start);

        while let Some(handle) = current {
            tracing::debug!("Visiting page: {}", handle);

            let loaded =
                self.source
                    .load(&handle)
                    .await
                    .map_err(|source| AlertmapError::PageExtraction {
                        handle: handle.to_string(),
                        source,
                    })?;
            outcome.visited += 1;

            let record = loaded.record;
            let already_stored = {
                let store = self.store.lock().unwrap();
                store.exists(&record.id)?
            };

            if already_stored {
                tracing::debug!("Post {} already stored, skipping", record.id);
                outcome.skipped += 1;
            } else {
                self.process_new_post(&record).await?;
                outcome.stored += 1;
            }

            current = loaded.next;
        }

        tracing::info!(
            "Navigation exhausted: {} visited, {} stored, {} skipped",
            outcome.visited,
            outcome.stored,
            outcome.skipped
        );

        Ok(outcome)
    }

    async fn process_new_post(&self, record: &RawRecord) -> Result<(), AlertmapError> {
        let enriched =
            self.enricher
                .enrich(record)
                .await
                .map_err(|e| AlertmapError::PostProcessing {
                    id: record.id.clone(),
                    source: PostError::Enrichment(e),
                })?;

        let (light, heavy) = enriched.split();

        if self.dry_run {
            tracing::info!(
                "[dry-run] Would store post {} ('{}', categories: {:?})",
                light.id,
                light.title,
                light.categories
            );
            return Ok(());
        }

        {
            let mut store = self.store.lock().unwrap();
            store
                .insert_light(&light)
                .map_err(|e| persistence_error(&record.id, e))?;
            store
                .insert_heavy(&heavy)
                .map_err(|e| persistence_error(&record.id, e))?;
        }

        tracing::info!("Stored post {} ('{}')", record.id, record.title);

        if let Err(e) = self.notifier.notify(&enriched).await {
            tracing::warn!("Notification for post {} failed: {}", record.id, e);
        }

        Ok(())
    }
}

fn persistence_error(id: &str, source: StoreError) -> AlertmapError {
    AlertmapError::PostProcessing {
        id: id.to_string(),
        source: PostError::Persistence(source),
    }
}
