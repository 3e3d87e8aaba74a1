use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Download-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Download started; `total_size` comes from `Content-Length` when present
    Started {
        url: String,
        package: Option<String>,
        total_size: Option<u64>,
    },

    /// Download progress update
    Progress {
        url: String,
        bytes_downloaded: u64,
        total_bytes: u64,
    },

    /// Download completed and its checksum computed
    Completed {
        url: String,
        package: Option<String>,
        final_size: u64,
        sha256: String,
    },

    /// Download failed
    Failed {
        url: String,
        package: Option<String>,
        failure: FailureContext,
    },

    /// Request is being retried after a transient failure
    Retrying {
        url: String,
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },
}
