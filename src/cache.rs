//! Atomically swappable boundary/facility snapshots.
//!
//! A [`Snapshot`] is immutable once published. Publishing a dataset builds a
//! new snapshot that shares every untouched dataset with its predecessor and
//! swaps it in with a single reference replacement. Readers clone the current
//! `Arc` and work on it without holding any lock.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Serialize;
use tracing::info;

use crate::dataset::{DatasetKind, DatasetRecords};
use crate::models::{AgencyType, DistrictBoundary, Facility};

/// Bookkeeping for one published dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub records: usize,
    /// xxh64 of the raw payload
    pub content_hash: u64,
    pub loaded_at: DateTime<Utc>,
}

/// One complete, immutable version of all cached datasets
#[derive(Debug, Default)]
pub struct Snapshot {
    generation: u64,
    districts: HashMap<AgencyType, Arc<Vec<DistrictBoundary>>>,
    facilities: HashMap<AgencyType, Arc<Vec<Facility>>>,
    datasets: HashMap<DatasetKind, DatasetInfo>,
}

impl Snapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// District polygons for an agency, in dataset order
    pub fn districts(&self, agency: AgencyType) -> &[DistrictBoundary] {
        self.districts
            .get(&agency)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }

    /// Facility points for an agency, in dataset order
    pub fn facilities(&self, agency: AgencyType) -> &[Facility] {
        self.facilities
            .get(&agency)
            .map(|f| f.as_slice())
            .unwrap_or(&[])
    }

    pub fn dataset(&self, kind: DatasetKind) -> Option<&DatasetInfo> {
        self.datasets.get(&kind)
    }

    /// Published datasets ordered by kind
    pub fn datasets(&self) -> Vec<(DatasetKind, &DatasetInfo)> {
        let mut out: Vec<_> = self.datasets.iter().map(|(k, v)| (*k, v)).collect();
        out.sort_by_key(|(k, _)| *k);
        out
    }

    /// Successor snapshot with one dataset replaced
    fn with_dataset(&self, kind: DatasetKind, records: DatasetRecords, content_hash: u64) -> Self {
        let mut districts = self.districts.clone();
        let mut facilities = self.facilities.clone();
        let mut datasets = self.datasets.clone();

        datasets.insert(
            kind,
            DatasetInfo {
                records: records.len(),
                content_hash,
                loaded_at: Utc::now(),
            },
        );

        match records {
            DatasetRecords::Districts(d) => {
                districts.insert(kind.agency(), Arc::new(d));
            }
            DatasetRecords::Facilities(f) => {
                facilities.insert(kind.agency(), Arc::new(f));
            }
        }

        Self {
            generation: self.generation + 1,
            districts,
            facilities,
            datasets,
        }
    }
}

/// Read-mostly holder of the current [`Snapshot`]
#[derive(Debug, Default)]
pub struct BoundaryCache {
    current: RwLock<Arc<Snapshot>>,
}

impl BoundaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace one dataset and publish the result. Returns the new generation.
    ///
    /// `records` is fully built by the caller; only the reference swap happens
    /// under the write lock.
    pub fn publish(&self, kind: DatasetKind, records: DatasetRecords, content_hash: u64) -> u64 {
        let count = records.len();
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(guard.with_dataset(kind, records, content_hash));
        let generation = next.generation;
        *guard = next;
        drop(guard);

        info!(
            "Published {} ({} records) as snapshot generation {}",
            kind, count, generation
        );
        generation
    }
}
