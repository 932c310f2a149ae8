//! Default values for configuration fields

use std::path::PathBuf;

/// External application launched by the app-intent mode
pub const DEFAULT_INTENT_APP_ID: &str = "com.google.android.youtube.tv";

/// Seconds the extraction tool may spend on one socket operation
pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 30;

/// Seconds allowed for one whole extraction call
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;

pub fn default_intent_app_id() -> String {
    DEFAULT_INTENT_APP_ID.to_string()
}

pub fn default_socket_timeout_secs() -> u64 {
    DEFAULT_SOCKET_TIMEOUT_SECS
}

pub fn default_extraction_timeout_secs() -> u64 {
    DEFAULT_EXTRACTION_TIMEOUT_SECS
}

pub fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("dash-bridge")
}

pub fn default_include_subtitles() -> bool {
    true
}
