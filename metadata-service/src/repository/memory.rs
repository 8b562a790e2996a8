use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use common::models::Metadata;
use common::Error;

use super::MetadataRepository;

/// 进程内元数据仓库
#[derive(Debug, Default)]
pub struct MemoryRepository {
    data: RwLock<HashMap<String, Metadata>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataRepository for MemoryRepository {
    async fn get(&self, id: &str) -> Result<Metadata, Error> {
        self.data
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::MetadataNotFound(id.to_string()))
    }

    async fn put(&self, id: &str, metadata: &Metadata) -> Result<(), Error> {
        self.data.write().insert(id.to_string(), metadata.clone());
        Ok(())
    }
}
