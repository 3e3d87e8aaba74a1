//! State management error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum StateError {
    #[error("database error: {message}")]
    DatabaseError { message: String },

    #[error("migration failed: {message}")]
    MigrationFailed { message: String },

    #[error("state corrupted: {message}")]
    StateCorrupted { message: String },
}

impl UserFacingError for StateError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DatabaseError { .. } => Some("Ensure no other keg process holds the database."),
            Self::MigrationFailed { .. } | Self::StateCorrupted { .. } => {
                Some("Move the state database aside and reinstall your formulas.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseError { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DatabaseError { .. } => "state.database_error",
            Self::MigrationFailed { .. } => "state.migration_failed",
            Self::StateCorrupted { .. } => "state.corrupted",
        };
        Some(code)
    }
}
