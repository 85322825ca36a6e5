//! Explicit memoization of datasets and fitted pipelines
//!
//! Entries are computed at most once per key, shared as `Arc`, and never
//! evicted.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::ChurnPipeline;
use crate::synthetic::{generate, Dataset};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Dataset key: `(n_samples, seed)`
pub type DatasetKey = (usize, u64);

/// Pipeline key: dataset fingerprint, seed and the bit pattern of the test size
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub fingerprint: String,
    pub seed: u64,
    test_size_bits: u64,
    cv_folds: usize,
}

impl PipelineKey {
    pub fn new(fingerprint: String, config: &PipelineConfig) -> Self {
        Self {
            fingerprint,
            seed: config.seed,
            test_size_bits: config.test_size.to_bits(),
            cv_folds: config.cv_folds,
        }
    }

    pub fn test_size(&self) -> f64 {
        f64::from_bits(self.test_size_bits)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// One key's value, filled at most once
type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Compute-once map of shared values.
///
/// The map lock only guards slot lookup. A computation holds only its own
/// slot's mutex.
struct OnceMap<K, V> {
    slots: RwLock<HashMap<K, Slot<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash + Clone, V> OnceMap<K, V> {
    fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn slot(&self, key: &K) -> Slot<V> {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Return the cached value or compute it under the key's slot lock.
    /// A failed computation leaves the slot empty.
    fn get_or_try_insert(&self, key: &K, compute: impl FnOnce() -> Result<V>) -> Result<Arc<V>> {
        let slot = self.slot(key);
        let mut guard = slot.lock();
        if let Some(value) = guard.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(value));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute()?);
        *guard = Some(Arc::clone(&value));
        Ok(value)
    }

    /// Slots still being computed count as empty
    fn is_filled(slot: &Slot<V>) -> bool {
        slot.try_lock().is_some_and(|value| value.is_some())
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.slots.read().values().filter(|slot| Self::is_filled(slot)).count(),
        }
    }
}

/// Shared cache of generated datasets and fitted pipelines
pub struct PipelineCache {
    datasets: OnceMap<DatasetKey, Dataset>,
    pipelines: OnceMap<PipelineKey, ChurnPipeline>,
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineCache {
    pub fn new() -> Self {
        Self {
            datasets: OnceMap::new(),
            pipelines: OnceMap::new(),
        }
    }

    /// Dataset for `(n_samples, seed)`, generated on first request
    pub fn dataset(&self, n_samples: usize, seed: u64) -> Result<Arc<Dataset>> {
        self.datasets.get_or_try_insert(&(n_samples, seed), || {
            debug!(n_samples, seed, "Dataset cache miss");
            generate(n_samples, seed)
        })
    }

    /// Fitted pipeline for `config`, keyed on the content of its dataset
    pub fn pipeline(&self, config: &PipelineConfig) -> Result<Arc<ChurnPipeline>> {
        config.validate()?;
        let dataset = self.dataset(config.n_samples, config.seed)?;
        let key = PipelineKey::new(dataset.fingerprint()?, config);
        self.pipelines.get_or_try_insert(&key, || {
            debug!(seed = config.seed, test_size = config.test_size, "Pipeline cache miss");
            ChurnPipeline::fit_dataset(Arc::clone(&dataset), config)
        })
    }

    pub fn dataset_stats(&self) -> CacheStats {
        self.datasets.stats()
    }

    pub fn pipeline_stats(&self) -> CacheStats {
        self.pipelines.stats()
    }
}
