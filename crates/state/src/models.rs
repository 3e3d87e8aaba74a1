//! Database models for install receipts and history

use chrono::{DateTime, Utc};
use keg_errors::{Error, StateError};
use keg_types::{InstalledFormula, PlatformTag, Version};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::path::PathBuf;

/// Row of the `installed` table
#[derive(Debug, Clone, FromRow)]
pub struct InstalledRow {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub sha256: String,
    pub binary_path: String,
    pub size: i64,
    pub installed_at: i64,
}

impl TryFrom<InstalledRow> for InstalledFormula {
    type Error = Error;

    fn try_from(row: InstalledRow) -> Result<Self, Self::Error> {
        Ok(Self {
            version: parse_version(&row.name, &row.version)?,
            platform: parse_platform(&row.name, &row.platform)?,
            installed_at: parse_timestamp(&row.name, row.installed_at)?,
            binary_path: PathBuf::from(row.binary_path),
            size: u64::try_from(row.size)
                .map_err(|_| corrupted(&row.name, format!("negative size {}", row.size)))?,
            sha256: row.sha256,
            name: row.name,
        })
    }
}

/// Kind of operation recorded in history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryOperation {
    Install,
    Uninstall,
}

impl HistoryOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for HistoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `history` table
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub name: String,
    pub operation: String,
    pub version: String,
    pub previous_version: Option<String>,
    pub platform: String,
    pub sha256: String,
    pub recorded_at: i64,
}

/// One install or uninstall in the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub name: String,
    pub operation: HistoryOperation,
    pub version: Version,
    pub previous_version: Option<Version>,
    pub platform: PlatformTag,
    pub sha256: String,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = Error;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let operation = match row.operation.as_str() {
            "install" => HistoryOperation::Install,
            "uninstall" => HistoryOperation::Uninstall,
            other => return Err(corrupted(&row.name, format!("unknown operation `{other}`"))),
        };
        let previous_version = row
            .previous_version
            .as_deref()
            .map(|v| parse_version(&row.name, v))
            .transpose()?;

        Ok(Self {
            id: row.id,
            operation,
            version: parse_version(&row.name, &row.version)?,
            previous_version,
            platform: parse_platform(&row.name, &row.platform)?,
            recorded_at: parse_timestamp(&row.name, row.recorded_at)?,
            sha256: row.sha256,
            name: row.name,
        })
    }
}

fn corrupted(name: &str, message: impl fmt::Display) -> Error {
    StateError::StateCorrupted {
        message: format!("{name}: {message}"),
    }
    .into()
}

fn parse_version(name: &str, value: &str) -> Result<Version, Error> {
    Version::parse(value).map_err(|_| corrupted(name, format!("invalid version `{value}`")))
}

fn parse_platform(name: &str, value: &str) -> Result<PlatformTag, Error> {
    value
        .parse()
        .map_err(|_| corrupted(name, format!("invalid platform `{value}`")))
}

fn parse_timestamp(name: &str, value: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(value, 0)
        .ok_or_else(|| corrupted(name, format!("invalid timestamp {value}")))
}
