use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::dataset::cache::{CacheError, DatasetCache, DATASET_KEY};
use crate::dataset::source::{parse_record, DatasetSource, FetchError};
use crate::models::JobPosting;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Malformed upstream record {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Cached record {index} could not be decoded: {reason}")]
    CacheDecode { index: usize, reason: String },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Owns the cache-or-fetch decision for the full list of postings.
///
/// The first call that finds the cache empty fetches upstream once and
/// writes the whole batch. Every later call decodes the cached list.
pub struct DatasetLoader {
    cache: Arc<dyn DatasetCache>,
    source: Arc<dyn DatasetSource>,
    /// Serializes the miss path (re-check, fetch, write) within this process.
    /// Cache hits never take it.
    fill_guard: Mutex<()>,
}

impl DatasetLoader {
    pub fn new(cache: Arc<dyn DatasetCache>, source: Arc<dyn DatasetSource>) -> Self {
        Self {
            cache,
            source,
            fill_guard: Mutex::new(()),
        }
    }

    pub async fn get_data_list(&self) -> Result<Vec<JobPosting>, DatasetError> {
        if let Some(dataset) = self.read_cached().await? {
            return Ok(dataset);
        }

        let _guard = self.fill_guard.lock().await;
        // Another request may have filled the cache while we waited.
        if let Some(dataset) = self.read_cached().await? {
            return Ok(dataset);
        }

        info!("Downloading dataset");
        let items = self.source.fetch().await?;

        // Validate the whole batch before touching the cache.
        let mut dataset = Vec::with_capacity(items.len());
        let mut encoded = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let job = parse_record(item).map_err(|e| DatasetError::MalformedRecord {
                index,
                reason: e.to_string(),
            })?;
            encoded.push(job.encode().map_err(|e| DatasetError::MalformedRecord {
                index,
                reason: e.to_string(),
            })?);
            dataset.push(job);
        }

        self.cache.push_all(DATASET_KEY, encoded).await?;
        info!("Cached {} job postings", dataset.len());

        Ok(dataset)
    }

    async fn read_cached(&self) -> Result<Option<Vec<JobPosting>>, DatasetError> {
        if !self.cache.exists(DATASET_KEY).await? {
            return Ok(None);
        }
        info!("Dataset already cached");
        let raw = self.cache.range_all(DATASET_KEY).await?;
        decode_all(&raw).map(Some)
    }

    /// Drops the cached dataset so the next request re-fetches it.
    pub async fn clear_cache(&self) -> Result<bool, DatasetError> {
        let _guard = self.fill_guard.lock().await;
        Ok(self.cache.clear(DATASET_KEY).await?)
    }
}

fn decode_all(raw: &[Vec<u8>]) -> Result<Vec<JobPosting>, DatasetError> {
    raw.iter()
        .enumerate()
        .map(|(index, bytes)| {
            JobPosting::decode(bytes).map_err(|e| DatasetError::CacheDecode {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::cache::MemoryDatasetCache;
    use crate::dataset::source::{upstream_item, StaticSource};
    use serde_json::json;

    fn loader_with(
        items: Vec<serde_json::Value>,
    ) -> (DatasetLoader, Arc<MemoryDatasetCache>, Arc<StaticSource>) {
        let cache = Arc::new(MemoryDatasetCache::default());
        let source = Arc::new(StaticSource::items(items));
        let loader = DatasetLoader::new(cache.clone(), source.clone());
        (loader, cache, source)
    }

    #[tokio::test]
    async fn test_first_call_fetches_and_caches_in_order() {
        let (loader, cache, source) = loader_with(vec![
            upstream_item("ML", json!(["Python"])),
            upstream_item("Data", json!("['SQL']")),
        ]);

        let dataset = loader.get_data_list().await.unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset[0].position_type, "ML");
        assert_eq!(dataset[1].position_type, "Data");
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.len(DATASET_KEY), 2);
    }

    #[tokio::test]
    async fn test_cached_reads_are_idempotent_and_never_refetch() {
        let (loader, cache, source) = loader_with(vec![
            upstream_item("ML", json!(["Python"])),
            upstream_item("Data", json!("['SQL', 'R']")),
        ]);

        let fetched = loader.get_data_list().await.unwrap();
        let first = loader.get_data_list().await.unwrap();
        let second = loader.get_data_list().await.unwrap();

        assert_eq!(first, fetched);
        assert_eq!(second, first);
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.push_count(), 1);
        assert_eq!(cache.len(DATASET_KEY), 2);
    }

    #[tokio::test]
    async fn test_prepopulated_cache_performs_zero_fetches() {
        let cache = Arc::new(MemoryDatasetCache::default());
        let job = crate::models::job::sample_posting("ML", &["Python"]);
        cache
            .push_all(DATASET_KEY, vec![job.encode().unwrap()])
            .await
            .unwrap();
        let source = Arc::new(StaticSource::items(vec![]));
        let loader = DatasetLoader::new(cache.clone(), source.clone());

        assert_eq!(loader.get_data_list().await.unwrap(), vec![job.clone()]);
        assert_eq!(loader.get_data_list().await.unwrap(), vec![job]);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_read_does_not_wait_for_fill_guard() {
        let cache = Arc::new(MemoryDatasetCache::default());
        let job = crate::models::job::sample_posting("ML", &["Python"]);
        cache
            .push_all(DATASET_KEY, vec![job.encode().unwrap()])
            .await
            .unwrap();
        let source = Arc::new(StaticSource::items(vec![]));
        let loader = DatasetLoader::new(cache, source.clone());

        let _held = loader.fill_guard.lock().await;
        let dataset = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            loader.get_data_list(),
        )
        .await
        .expect("cached read blocked on the fill guard")
        .unwrap();
        assert_eq!(dataset, vec![job]);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_cache_empty() {
        let cache = Arc::new(MemoryDatasetCache::default());
        let source = Arc::new(StaticSource::failing(503));
        let loader = DatasetLoader::new(cache.clone(), source);

        let err = loader.get_data_list().await.unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Fetch(FetchError::Status { status: 503 })
        ));
        assert!(!cache.exists(DATASET_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_record_fails_without_partial_write() {
        let mut broken = upstream_item("ML", json!([]));
        broken.as_object_mut().unwrap().remove("Company");
        let (loader, cache, _source) =
            loader_with(vec![upstream_item("ML", json!(["Python"])), broken]);

        let err = loader.get_data_list().await.unwrap_err();
        match err {
            DatasetError::MalformedRecord { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("Company"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cache.len(DATASET_KEY), 0);
        assert_eq!(cache.push_count(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_is_surfaced() {
        let cache = Arc::new(MemoryDatasetCache::default());
        let job = crate::models::job::sample_posting("ML", &[]);
        cache
            .push_all(
                DATASET_KEY,
                vec![job.encode().unwrap(), b"garbage".to_vec()],
            )
            .await
            .unwrap();
        let source = Arc::new(StaticSource::items(vec![]));
        let loader = DatasetLoader::new(cache, source.clone());

        let err = loader.get_data_list().await.unwrap_err();
        assert!(matches!(err, DatasetError::CacheDecode { index: 1, .. }));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_upstream_writes_nothing() {
        let (loader, cache, source) = loader_with(vec![]);
        assert!(loader.get_data_list().await.unwrap().is_empty());
        assert!(loader.get_data_list().await.unwrap().is_empty());
        assert_eq!(cache.push_count(), 0);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let (loader, _cache, source) = loader_with(vec![upstream_item("ML", json!([]))]);
        loader.get_data_list().await.unwrap();
        assert!(loader.clear_cache().await.unwrap());
        loader.get_data_list().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_fetch_once() {
        let (loader, cache, source) = loader_with(vec![upstream_item("ML", json!(["Python"]))]);
        let loader = Arc::new(loader);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.get_data_list().await.unwrap() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().len(), 1);
        }

        assert_eq!(source.calls(), 1);
        assert_eq!(cache.len(DATASET_KEY), 1);
    }
}
