use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use common::models::{Rating, RecordId, RecordType};
use common::Error;

use super::{ratings_not_found, RatingRepository};

/// 进程内评分仓库，按插入顺序保存每条记录的评分
#[derive(Debug, Default)]
pub struct MemoryRepository {
    data: RwLock<HashMap<(RecordType, RecordId), Vec<Rating>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingRepository for MemoryRepository {
    async fn get(&self, record_id: &RecordId, record_type: &RecordType) -> Result<Vec<Rating>, Error> {
        let key = (record_type.clone(), record_id.clone());
        match self.data.read().get(&key) {
            Some(ratings) if !ratings.is_empty() => Ok(ratings.clone()),
            _ => Err(ratings_not_found(record_id, record_type)),
        }
    }

    async fn put(&self, record_id: &RecordId, record_type: &RecordType, rating: &Rating) -> Result<(), Error> {
        self.data
            .write()
            .entry((record_type.clone(), record_id.clone()))
            .or_default()
            .push(rating.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_unknown_record_is_not_found() {
        let repo = MemoryRepository::new();
        let result = repo.get(&RecordId::from("m1"), &RecordType::from("movie")).await;
        assert!(matches!(result, Err(Error::RatingsNotFound { .. })));
    }

    #[tokio::test]
    async fn put_appends_in_insertion_order() {
        let repo = MemoryRepository::new();
        let id = RecordId::from("m1");
        let movie = RecordType::from("movie");
        repo.put(&id, &movie, &Rating::new("u1", 5)).await.unwrap();
        repo.put(&id, &movie, &Rating::new("u2", 1)).await.unwrap();
        repo.put(&id, &movie, &Rating::new("u1", 3)).await.unwrap();

        let ratings = repo.get(&id, &movie).await.unwrap();
        assert_eq!(
            ratings,
            vec![Rating::new("u1", 5), Rating::new("u2", 1), Rating::new("u1", 3)]
        );
        assert!(repo.get(&id, &RecordType::from("series")).await.is_err());
    }
}
