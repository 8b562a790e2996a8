use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{error, info};

use common::config::AppConfig;
use common::models::{Rating, RecordId, RecordType, UserId};
use common::Error;

use super::{ratings_not_found, RatingRepository};

/// 基于PostgreSQL的评分仓库
///
/// 表结构见 `sql/schema.sql`
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 从配置创建连接池
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections())
            .connect(&config.database.pg_url())
            .await
            .map_err(|err| {
                error!("数据库连接失败: {}", err);
                Error::Database(err)
            })?;
        info!("数据库连接成功");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RatingRepository for PostgresRepository {
    async fn get(&self, record_id: &RecordId, record_type: &RecordType) -> Result<Vec<Rating>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, value
            FROM ratings
            WHERE record_id = $1 AND record_type = $2
            "#,
        )
        .bind(record_id.as_str())
        .bind(record_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(ratings_not_found(record_id, record_type));
        }

        let ratings = rows
            .iter()
            .map(|row| {
                Ok(Rating {
                    user_id: UserId::new(row.try_get::<String, _>("user_id")?),
                    value: row.try_get::<i32, _>("value")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(ratings)
    }

    async fn put(&self, record_id: &RecordId, record_type: &RecordType, rating: &Rating) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO ratings (record_id, record_type, user_id, value)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record_id.as_str())
        .bind(record_type.as_str())
        .bind(rating.user_id.as_str())
        .bind(rating.value)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            error!(%record_id, %record_type, "评分写入数据库失败: {}", err);
            Error::Database(err)
        })?;
        Ok(())
    }
}
