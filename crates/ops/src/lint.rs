//! Formula file validation

use crate::{LintArtifact, LintReport, OpsCtx};
use keg_errors::Error;
use keg_events::EventEmitter;
use keg_formula::Formula;
use std::path::Path;

/// Parse and validate a formula file, resolving every declared platform
///
/// # Errors
///
/// Returns a parse error or `FormulaError::Invalid` describing the first
/// problem found.
pub async fn lint(ctx: &OpsCtx, path: &Path) -> Result<LintReport, Error> {
    let formula = Formula::load(path).await?;
    formula.validate()?;

    let mut artifacts = Vec::new();
    for platform in formula.supported_platforms() {
        let resolved = formula.resolve(platform)?;
        artifacts.push(LintArtifact {
            platform,
            artifact_name: resolved.artifact_name,
            url: resolved.url.to_string(),
        });
    }

    ctx.emit_debug(format!(
        "{} {} declares {} platforms",
        formula.name,
        formula.version,
        artifacts.len()
    ));

    Ok(LintReport {
        path: path.to_path_buf(),
        binary: formula.binary_name().to_string(),
        name: formula.name,
        version: formula.version,
        artifacts,
    })
}
