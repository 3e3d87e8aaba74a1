//! High-level access to install receipts

use crate::models::{HistoryEntry, HistoryOperation};
use crate::{create_pool, queries, run_migrations};
use keg_errors::{Error, StateError};
use keg_types::InstalledFormula;
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};

/// Records which formula versions are installed and what happened to them
#[derive(Clone)]
pub struct StateManager {
    pool: Pool<Sqlite>,
    db_path: PathBuf,
}

impl StateManager {
    /// Open (creating if needed) the database at `db_path` and migrate it
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the
    /// database cannot be opened, or migrations fail.
    pub async fn open(db_path: &Path) -> Result<Self, Error> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }

        let pool = create_pool(db_path).await?;
        run_migrations(&pool).await?;
        tracing::debug!(path = %db_path.display(), "state database ready");

        Ok(Self::with_pool(pool, db_path))
    }

    /// Wrap an existing, already migrated pool
    #[must_use]
    pub fn with_pool(pool: Pool<Sqlite>, db_path: &Path) -> Self {
        Self {
            pool,
            db_path: db_path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Store the receipt for a completed install and append to history.
    ///
    /// Any receipt for the same formula is replaced; the superseded receipt is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn record_install(
        &self,
        installed: &InstalledFormula,
    ) -> Result<Option<InstalledFormula>, Error> {
        let mut tx = self.pool.begin().await?;

        let previous = queries::get_installed(&mut tx, &installed.name)
            .await?
            .map(InstalledFormula::try_from)
            .transpose()?;
        let previous_version = previous.as_ref().map(|p| p.version.to_string());

        queries::upsert_installed(&mut tx, installed).await?;
        queries::insert_history(
            &mut tx,
            HistoryOperation::Install,
            installed,
            previous_version.as_deref(),
        )
        .await?;

        tx.commit().await?;
        Ok(previous)
    }

    /// Remove the receipt for `name` and append to history.
    ///
    /// # Errors
    ///
    /// Returns `StateError::StateCorrupted` if the receipt disappears during
    /// the transaction, or an error if the transaction fails.
    pub async fn record_uninstall(&self, name: &str) -> Result<Option<InstalledFormula>, Error> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = queries::get_installed(&mut tx, name).await? else {
            return Ok(None);
        };
        let removed = InstalledFormula::try_from(row)?;

        if !queries::delete_installed(&mut tx, name).await? {
            return Err(StateError::StateCorrupted {
                message: format!("receipt for {name} vanished during uninstall"),
            }
            .into());
        }
        queries::insert_history(&mut tx, HistoryOperation::Uninstall, &removed, None).await?;

        tx.commit().await?;
        Ok(Some(removed))
    }

    /// Receipt for `name`, if installed
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is corrupted.
    pub async fn get_installed(&self, name: &str) -> Result<Option<InstalledFormula>, Error> {
        let mut conn = self.pool.acquire().await?;
        queries::get_installed(&mut conn, name)
            .await?
            .map(InstalledFormula::try_from)
            .transpose()
    }

    /// Every receipt, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupted.
    pub async fn list_installed(&self) -> Result<Vec<InstalledFormula>, Error> {
        let mut conn = self.pool.acquire().await?;
        queries::list_installed(&mut conn)
            .await?
            .into_iter()
            .map(InstalledFormula::try_from)
            .collect()
    }

    /// Most recent history entries, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is corrupted.
    pub async fn history(&self, name: Option<&str>, limit: u32) -> Result<Vec<HistoryEntry>, Error> {
        let mut conn = self.pool.acquire().await?;
        queries::list_history(&mut conn, name, limit)
            .await?
            .into_iter()
            .map(HistoryEntry::try_from)
            .collect()
    }
}
