//! Formula directory ("tap") loading and lookup

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use keg_errors::{Error, FormulaError};
use keg_types::Version;

use crate::{Formula, FORMULA_EXTENSION};

/// A formula file that could not be used
#[derive(Debug, Clone)]
pub struct SkippedFormula {
    pub path: PathBuf,
    pub reason: String,
}

/// Every formula release found under a directory, indexed by name and version
#[derive(Debug, Clone, Default)]
pub struct FormulaDirectory {
    root: PathBuf,
    formulas: BTreeMap<String, BTreeMap<Version, Formula>>,
    skipped: Vec<SkippedFormula>,
}

impl FormulaDirectory {
    /// Load every `*.toml` file directly under `root`.
    ///
    /// A missing directory yields an empty tap. Files that fail to parse or
    /// validate are recorded in [`FormulaDirectory::skipped`] and otherwise
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub async fn load(root: &Path) -> Result<Self, Error> {
        let mut directory = Self {
            root: root.to_path_buf(),
            ..Self::default()
        };

        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %root.display(), "formula directory does not exist");
                return Ok(directory);
            }
            Err(e) => return Err(Error::io_with_path(&e, root)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, root))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(FORMULA_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match Self::load_one(&path).await {
                Ok(formula) => directory.insert_from(formula, &path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping formula");
                    directory.skipped.push(SkippedFormula {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(directory)
    }

    async fn load_one(path: &Path) -> Result<Formula, Error> {
        let formula = Formula::load(path).await?;
        formula.validate()?;
        Ok(formula)
    }

    fn insert_from(&mut self, formula: Formula, path: &Path) {
        let versions = self.formulas.entry(formula.name.clone()).or_default();
        if versions.contains_key(&formula.version) {
            tracing::warn!(path = %path.display(), "duplicate formula release");
            self.skipped.push(SkippedFormula {
                path: path.to_path_buf(),
                reason: format!(
                    "duplicate release {} {}",
                    formula.name, formula.version
                ),
            });
            return;
        }
        versions.insert(formula.version.clone(), formula);
    }

    /// Add a release, replacing any release with the same name and version
    pub fn insert(&mut self, formula: Formula) {
        self.formulas
            .entry(formula.name.clone())
            .or_default()
            .insert(formula.version.clone(), formula);
    }

    /// Look up a release; without `version` the newest release is returned.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::NotFound` for unknown names and
    /// `FormulaError::VersionNotFound` for unknown versions.
    pub fn find(&self, name: &str, version: Option<&Version>) -> Result<&Formula, Error> {
        let versions = self
            .formulas
            .get(name)
            .ok_or_else(|| FormulaError::NotFound {
                name: name.to_string(),
            })?;

        let found = match version {
            Some(version) => versions.get(version),
            None => versions.values().next_back(),
        };

        found.ok_or_else(|| {
            FormulaError::VersionNotFound {
                name: name.to_string(),
                version: version.map_or_else(|| "latest".to_string(), ToString::to_string),
            }
            .into()
        })
    }

    /// Known versions of `name`, oldest first
    #[must_use]
    pub fn versions(&self, name: &str) -> Vec<Version> {
        self.formulas
            .get(name)
            .map(|versions| versions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Newest release of every formula, ordered by name
    pub fn latest(&self) -> impl Iterator<Item = &Formula> {
        self.formulas
            .values()
            .filter_map(|versions| versions.values().next_back())
    }

    /// Formula names, ordered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formulas.keys().map(String::as_str)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files that were ignored while loading
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFormula] {
        &self.skipped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}
