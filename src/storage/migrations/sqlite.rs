use crate::migrations::{Migration, Migrator};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

const CREATE_VERSION_TABLE_SQLITE: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
)";

pub struct SqliteStorageMigrator {
    pool: SqlitePool,
}

impl SqliteStorageMigrator {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Migrator for SqliteStorageMigrator {
    async fn get_current_version(&self) -> Result<u32> {
        let row = sqlx::query("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| anyhow!("version table does not exist"))?;
        match row {
            Some(row) => {
                let version: i64 = row.try_get("version")?;
                Ok(u32::try_from(version)?)
            }
            None => Ok(0),
        }
    }

    async fn set_version(&self, version: u32) -> Result<()> {
        sqlx::query(CREATE_VERSION_TABLE_SQLITE)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM schema_version")
            .execute(&self.pool)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(i64::from(version))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The schema has not changed since version 1.
    fn get_migrations(&self) -> Vec<Box<dyn Migration>> {
        Vec::new()
    }
}
