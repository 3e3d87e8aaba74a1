#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for keg
//!
//! This crate serves as the orchestration layer between the CLI and the
//! specialized crates. Each operation takes an [`OpsCtx`], reports progress
//! through its event channel and returns a serializable result.

mod context;
mod fetch;
mod install;
mod lint;
mod query;
mod types;

pub use context::{OpsContextBuilder, OpsCtx};
pub use types::{FetchReport, InstallRequest, LintArtifact, LintReport, PlatformReport};

pub use fetch::fetch;
pub use install::{install, resolve_formula, uninstall};
pub use lint::lint;
pub use query::{
    formula_info, history, list_installed, platform, verification_error, verify,
    DEFAULT_HISTORY_LIMIT,
};

use keg_errors::Error;
use keg_state::HistoryEntry;
use keg_types::{FormulaInfo, InstallReport, InstalledFormula, VerifyEntry};

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Installed formulas
    InstalledList(Vec<InstalledFormula>),
    /// Formula details
    FormulaInfo(FormulaInfo),
    /// Install or uninstall report
    InstallReport(InstallReport),
    /// Downloaded artifact
    FetchReport(FetchReport),
    /// Checksums of installed binaries
    VerifyReport(Vec<VerifyEntry>),
    /// Selected platform
    PlatformReport(PlatformReport),
    /// Valid formula file
    LintReport(LintReport),
    /// Install/uninstall history
    History(Vec<HistoryEntry>),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            keg_errors::OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::VerifyReport(entries) => entries.iter().all(|e| e.ok),
            OperationResult::InstalledList(_)
            | OperationResult::FormulaInfo(_)
            | OperationResult::InstallReport(_)
            | OperationResult::FetchReport(_)
            | OperationResult::PlatformReport(_)
            | OperationResult::LintReport(_)
            | OperationResult::History(_) => true,
        }
    }
}
