//! Dataset loading with fixed-delay retries and atomic publication.
//!
//! Load failures never propagate: they are logged, counted, and the
//! previously published dataset stays authoritative.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use hashbrown::HashMap;
use serde::Serialize;
use tracing::{error, info, warn};
use xxhash_rust::xxh64::xxh64;

use super::{parse_dataset, DatasetError, DatasetKind, DatasetProvider};
use crate::cache::BoundaryCache;
use crate::config::DatasetConfig;

/// What one load request did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// `enable_loading` is off; the cache was not touched
    Disabled,
    /// Another load of the same dataset is running
    AlreadyLoading,
    /// Payload identical to the published one
    Unchanged { records: usize },
    Published {
        records: usize,
        skipped: usize,
        generation: u64,
    },
    Failed { attempts: u32, error: String },
}

/// Loader counters
#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    unchanged: AtomicU64,
    failed: AtomicU64,
    features_skipped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoaderStats {
    pub published: u64,
    pub unchanged: u64,
    pub failed: u64,
    pub features_skipped: u64,
}

/// Clears the in-progress flag on drop
struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DatasetLoader {
    provider: Arc<dyn DatasetProvider>,
    cache: Arc<BoundaryCache>,
    in_progress: HashMap<DatasetKind, AtomicBool>,
    counters: Counters,
}

impl DatasetLoader {
    pub fn new(provider: Arc<dyn DatasetProvider>, cache: Arc<BoundaryCache>) -> Self {
        let in_progress = DatasetKind::all()
            .iter()
            .map(|kind| (*kind, AtomicBool::new(false)))
            .collect();

        Self {
            provider,
            cache,
            in_progress,
            counters: Counters::default(),
        }
    }

    pub fn cache(&self) -> &Arc<BoundaryCache> {
        &self.cache
    }

    pub fn stats(&self) -> LoaderStats {
        LoaderStats {
            published: self.counters.published.load(Ordering::Relaxed),
            unchanged: self.counters.unchanged.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            features_skipped: self.counters.features_skipped.load(Ordering::Relaxed),
        }
    }

    fn begin(&self, kind: DatasetKind) -> Option<LoadGuard<'_>> {
        let flag = self.in_progress.get(&kind)?;
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadGuard(flag))
    }

    /// Load every configured dataset concurrently
    pub async fn load_all(&self, configs: &[DatasetConfig]) -> Vec<(DatasetKind, LoadOutcome)> {
        let outcomes = join_all(configs.iter().map(|cfg| self.load(cfg))).await;
        configs.iter().map(|cfg| cfg.kind).zip(outcomes).collect()
    }

    /// Load one dataset and publish it if it changed
    pub async fn load(&self, cfg: &DatasetConfig) -> LoadOutcome {
        if !cfg.enable_loading {
            info!("Loading disabled for {}, keeping cached data", cfg.kind);
            return LoadOutcome::Disabled;
        }

        let Some(_guard) = self.begin(cfg.kind) else {
            warn!("Load of {} already in progress, skipping", cfg.kind);
            return LoadOutcome::AlreadyLoading;
        };

        info!("Loading {} from {}", cfg.kind, cfg.source);

        let (bytes, attempts) = match self.fetch_with_retry(cfg).await {
            Ok(ok) => ok,
            Err((attempts, e)) => return self.fail(cfg, attempts, e),
        };

        let content_hash = xxh64(&bytes, 0);
        if let Some(info) = self.cache.snapshot().dataset(cfg.kind) {
            if info.content_hash == content_hash {
                info!("{} unchanged ({} records), not republishing", cfg.kind, info.records);
                self.counters.unchanged.fetch_add(1, Ordering::Relaxed);
                return LoadOutcome::Unchanged {
                    records: info.records,
                };
            }
        }

        let kind = cfg.kind;
        let parsed = tokio::task::spawn_blocking(move || parse_dataset(kind, &bytes))
            .await
            .map_err(|e| DatasetError::Task(e.to_string()))
            .and_then(|r| r);

        let report = match parsed {
            Ok(report) => report,
            Err(e) => return self.fail(cfg, attempts, e),
        };

        self.counters
            .features_skipped
            .fetch_add(report.skipped as u64, Ordering::Relaxed);

        // Nothing usable survived: keep what is published
        if report.records.is_empty() && report.skipped > 0 {
            let e = DatasetError::Format(format!(
                "all {} features were malformed",
                report.skipped
            ));
            return self.fail(cfg, attempts, e);
        }

        self.counters.published.fetch_add(1, Ordering::Relaxed);

        let records = report.records.len();
        let generation = self.cache.publish(cfg.kind, report.records, content_hash);

        LoadOutcome::Published {
            records,
            skipped: report.skipped,
            generation,
        }
    }

    fn fail(&self, cfg: &DatasetConfig, attempts: u32, e: DatasetError) -> LoadOutcome {
        error!(
            "Failed to load {} from {} after {} attempt(s): {}",
            cfg.kind, cfg.source, attempts, e
        );
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        LoadOutcome::Failed {
            attempts,
            error: e.to_string(),
        }
    }

    /// Read the raw bytes, retrying transient failures with a fixed delay.
    /// Each attempt is bounded by the dataset timeout.
    async fn fetch_with_retry(
        &self,
        cfg: &DatasetConfig,
    ) -> Result<(Vec<u8>, u32), (u32, DatasetError)> {
        let timeout = cfg.timeout();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let result = match tokio::time::timeout(timeout, self.provider.read(&cfg.source)).await
            {
                Ok(r) => r,
                Err(_) => Err(DatasetError::Timeout(timeout)),
            };

            match result {
                Ok(bytes) => return Ok((bytes, attempt)),
                Err(e) if e.is_transient() && attempt <= cfg.max_retry_attempts => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        cfg.max_retry_attempts + 1,
                        cfg.kind,
                        e,
                        cfg.retry_delay()
                    );
                    tokio::time::sleep(cfg.retry_delay()).await;
                }
                Err(e) => return Err((attempt, e)),
            }
        }
    }
}
