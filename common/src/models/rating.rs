use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// 被评分记录的ID，例如电影ID
    RecordId
);
string_id!(
    /// 被评分记录的类型，例如 "movie"
    RecordType
);
string_id!(
    /// 评分用户ID
    UserId
);

/// 单个用户的评分值
pub type RatingValue = i32;

/// 一个用户对一条记录的评分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub value: RatingValue,
}

impl Rating {
    pub fn new(user_id: impl Into<UserId>, value: RatingValue) -> Self {
        Self {
            user_id: user_id.into(),
            value,
        }
    }
}

/// 消息队列中的评分事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEvent {
    pub record_id: RecordId,
    pub record_type: RecordType,
    pub user_id: UserId,
    pub value: RatingValue,
}

impl RatingEvent {
    pub fn rating(&self) -> Rating {
        Rating {
            user_id: self.user_id.clone(),
            value: self.value,
        }
    }
}

/// 计算评分的算术平均值，没有评分时返回None
pub fn mean_rating(ratings: &[Rating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(r.value)).sum();
    Some(sum / ratings.len() as f64)
}
