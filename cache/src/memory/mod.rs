use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use common::error::Error;
use common::models::{RecordId, RecordType};

use crate::AggregateCache;

/// 进程内聚合评分缓存
#[derive(Debug, Default)]
pub struct MemoryCache {
    data: RwLock<HashMap<(RecordType, RecordId), f64>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AggregateCache for MemoryCache {
    async fn get(&self, record_id: &RecordId, record_type: &RecordType) -> Result<Option<f64>, Error> {
        let key = (record_type.clone(), record_id.clone());
        Ok(self.data.read().get(&key).copied())
    }

    async fn put(&self, record_id: &RecordId, record_type: &RecordType, value: f64) -> Result<(), Error> {
        self.data
            .write()
            .insert((record_type.clone(), record_id.clone()), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = MemoryCache::new();
        let id = RecordId::from("m1");
        let movie = RecordType::from("movie");

        assert_eq!(cache.get(&id, &movie).await.unwrap(), None);
        cache.put(&id, &movie, 4.5).await.unwrap();
        assert_eq!(cache.get(&id, &movie).await.unwrap(), Some(4.5));

        cache.put(&id, &movie, 3.0).await.unwrap();
        assert_eq!(cache.get(&id, &movie).await.unwrap(), Some(3.0));
    }

    #[tokio::test]
    async fn keys_are_scoped_by_record_type() {
        let cache = MemoryCache::new();
        let id = RecordId::from("1");
        cache.put(&id, &RecordType::from("movie"), 5.0).await.unwrap();
        assert_eq!(cache.get(&id, &RecordType::from("series")).await.unwrap(), None);
    }
}
