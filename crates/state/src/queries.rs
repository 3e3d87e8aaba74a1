//! Runtime SQL queries for receipts and history

use crate::models::{HistoryOperation, HistoryRow, InstalledRow};
use keg_errors::{Error, StateError};
use keg_types::InstalledFormula;
use sqlx::{query, query_as, Sqlite, SqliteConnection};

const INSTALLED_COLUMNS: &str =
    "name, version, platform, sha256, binary_path, size, installed_at";

/// Fetch the receipt for `name`
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get_installed(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<InstalledRow>, Error> {
    let sql = format!("SELECT {INSTALLED_COLUMNS} FROM installed WHERE name = ?1");
    let row = query_as::<Sqlite, InstalledRow>(&sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// All receipts ordered by name
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_installed(conn: &mut SqliteConnection) -> Result<Vec<InstalledRow>, Error> {
    let sql = format!("SELECT {INSTALLED_COLUMNS} FROM installed ORDER BY name");
    let rows = query_as::<Sqlite, InstalledRow>(&sql)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// Insert or replace the receipt for `installed.name`
///
/// # Errors
///
/// Returns an error if the statement fails.
pub async fn upsert_installed(
    conn: &mut SqliteConnection,
    installed: &InstalledFormula,
) -> Result<(), Error> {
    let size = i64::try_from(installed.size).map_err(|_| StateError::DatabaseError {
        message: format!(
            "{}: binary size {} does not fit in the receipt",
            installed.name, installed.size
        ),
    })?;
    query(
        "INSERT INTO installed (name, version, platform, sha256, binary_path, size, installed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(name) DO UPDATE SET
             version = excluded.version,
             platform = excluded.platform,
             sha256 = excluded.sha256,
             binary_path = excluded.binary_path,
             size = excluded.size,
             installed_at = excluded.installed_at",
    )
    .bind(&installed.name)
    .bind(installed.version.to_string())
    .bind(installed.platform.as_str())
    .bind(&installed.sha256)
    .bind(installed.binary_path.display().to_string())
    .bind(size)
    .bind(installed.installed_at.timestamp())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Delete the receipt for `name`, returning whether a row existed
///
/// # Errors
///
/// Returns an error if the statement fails.
pub async fn delete_installed(conn: &mut SqliteConnection, name: &str) -> Result<bool, Error> {
    let result = query("DELETE FROM installed WHERE name = ?1")
        .bind(name)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Append a history row describing an operation on `installed`
///
/// # Errors
///
/// Returns an error if the statement fails.
pub async fn insert_history(
    conn: &mut SqliteConnection,
    operation: HistoryOperation,
    installed: &InstalledFormula,
    previous_version: Option<&str>,
) -> Result<(), Error> {
    query(
        "INSERT INTO history (name, operation, version, previous_version, platform, sha256, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&installed.name)
    .bind(operation.as_str())
    .bind(installed.version.to_string())
    .bind(previous_version)
    .bind(installed.platform.as_str())
    .bind(&installed.sha256)
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// History rows, newest first, optionally restricted to one formula
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_history(
    conn: &mut SqliteConnection,
    name: Option<&str>,
    limit: u32,
) -> Result<Vec<HistoryRow>, Error> {
    let rows = query_as::<Sqlite, HistoryRow>(
        "SELECT id, name, operation, version, previous_version, platform, sha256, recorded_at
         FROM history
         WHERE ?1 IS NULL OR name = ?1
         ORDER BY id DESC
         LIMIT ?2",
    )
    .bind(name)
    .bind(i64::from(limit))
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
