use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{error, info};

use common::config::AppConfig;
use common::models::Metadata;
use common::Error;

use super::MetadataRepository;

/// 基于PostgreSQL的元数据仓库，表结构见 `sql/schema.sql`
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

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
impl MetadataRepository for PostgresRepository {
    async fn get(&self, id: &str) -> Result<Metadata, Error> {
        let row = sqlx::query(
            r#"
            SELECT title, description, director
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::MetadataNotFound(id.to_string()))?;

        Ok(Metadata {
            id: id.to_string(),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            director: row.try_get("director")?,
        })
    }

    async fn put(&self, id: &str, metadata: &Metadata) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO movies (id, title, description, director)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                description = EXCLUDED.description,
                director = EXCLUDED.director
            "#,
        )
        .bind(id)
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&metadata.director)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            error!(id, "元数据写入数据库失败: {}", err);
            Error::Database(err)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database with sql/schema.sql applied"]
    async fn put_then_get() {
        let config = AppConfig::from_file(Some("../config/config.yaml")).unwrap();
        let repo = PostgresRepository::from_config(&config).await.unwrap();
        let id = format!("pg-test-{}", std::process::id());

        assert!(matches!(repo.get(&id).await, Err(Error::MetadataNotFound(_))));
        let metadata = Metadata {
            id: id.clone(),
            title: "Heat".to_string(),
            description: "LA crime".to_string(),
            director: "Michael Mann".to_string(),
        };
        repo.put(&id, &metadata).await.unwrap();
        assert_eq!(repo.get(&id).await.unwrap(), metadata);
    }
}
