//! Platform selection events

use serde::{Deserialize, Serialize};
use keg_types::PlatformTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Host OS mapped to an artifact platform tag
    Selected {
        /// Operating system name as reported by the binary
        os: String,
        tag: PlatformTag,
    },

    /// Host OS has no published artifact platform
    Unsupported { os: String },
}
