//! Schema version tracking shared by the storage backends.

use anyhow::{Result, bail};
use async_trait::async_trait;

/// One step that moves a database schema to `target_version`.
#[async_trait]
pub trait Migration: Send + Sync {
    fn target_version(&self) -> u32;

    fn description(&self) -> &str;

    /// Must be safe to run twice.
    async fn apply(&self) -> Result<()>;
}

/// Reads and writes the stored schema version of one backend and knows the
/// migrations that backend ships.
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Fails when the version table does not exist yet.
    async fn get_current_version(&self) -> Result<u32>;

    async fn set_version(&self, version: u32) -> Result<()>;

    /// Ordered by target version.
    fn get_migrations(&self) -> Vec<Box<dyn Migration>>;

    /// Version a freshly created schema starts at.
    fn base_version(&self) -> u32 {
        1
    }

    fn latest_version(&self) -> u32 {
        self.get_migrations()
            .iter()
            .map(|m| m.target_version())
            .max()
            .unwrap_or(0)
            .max(self.base_version())
    }

    async fn is_fresh_database(&self) -> bool {
        self.get_current_version().await.is_err()
    }

    /// Stamp a fresh database with the latest version, or bring an existing
    /// one up to date. Call after the current schema has been created.
    async fn prepare(&self) -> Result<()> {
        if self.is_fresh_database().await {
            let latest = self.latest_version();
            tracing::info!(version = latest, "initialising schema version");
            return self.set_version(latest).await;
        }
        self.migrate_to_latest().await
    }

    /// Apply every migration newer than the stored version, recording the
    /// version after each step.
    async fn migrate_to_latest(&self) -> Result<()> {
        let current = self.get_current_version().await?;
        let latest = self.latest_version();

        if current > latest {
            bail!(
                "stored schema version {current} is newer than this build supports ({latest}); \
                 upgrade the server before opening this database"
            );
        }
        if current == latest {
            tracing::debug!(version = current, "schema is up to date");
            return Ok(());
        }

        tracing::info!(from = current, to = latest, "migrating schema");
        for migration in self.get_migrations() {
            let target = migration.target_version();
            if target <= current {
                continue;
            }
            tracing::info!(version = target, "{}", migration.description());
            if let Err(e) = migration.apply().await {
                bail!("failed to apply migration to version {target}: {e}");
            }
            self.set_version(target).await?;
        }
        Ok(())
    }
}
