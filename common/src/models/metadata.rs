use serde::{Deserialize, Serialize};

use crate::proto;

/// 电影元数据
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub director: String,
}

impl From<proto::metadata::Metadata> for Metadata {
    fn from(m: proto::metadata::Metadata) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            director: m.director,
        }
    }
}

impl From<Metadata> for proto::metadata::Metadata {
    fn from(m: Metadata) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            director: m.director,
        }
    }
}

/// 电影详情，没有评分时 `rating` 为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub metadata: Metadata,
}

impl From<MovieDetails> for proto::movie::MovieDetails {
    fn from(details: MovieDetails) -> Self {
        Self {
            rating: details.rating,
            metadata: Some(details.metadata.into()),
        }
    }
}
