//! yt-dlp CLI extractor
//!
//! Spawns the native yt-dlp binary with a JSON dump request (no download)
//! and parses its stdout into the crate's extraction record.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::errors::{ExtractorError, ExtractorResult};
use crate::models::Extraction;

use super::MediaExtractor;

/// Locations probed before falling back to PATH lookup
const COMMON_BINARY_PATHS: &[&str] = &[
    "/opt/homebrew/bin/yt-dlp",
    "/usr/local/bin/yt-dlp",
    "/usr/bin/yt-dlp",
];

/// CLI-based media extractor using the yt-dlp binary
pub struct YtDlpExtractor {
    binary: PathBuf,
    cookies_path: Option<PathBuf>,
    socket_timeout: Duration,
    extraction_timeout: Duration,
}

impl YtDlpExtractor {
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            binary: config
                .ytdlp_path
                .clone()
                .unwrap_or_else(Self::find_binary),
            cookies_path: config.cookies_path.clone(),
            socket_timeout: Duration::from_secs(config.socket_timeout_secs),
            extraction_timeout: Duration::from_secs(config.extraction_timeout_secs),
        }
    }

    /// Find the yt-dlp binary in well-known locations, else rely on PATH
    fn find_binary() -> PathBuf {
        for path in COMMON_BINARY_PATHS {
            if Path::new(path).exists() {
                return PathBuf::from(path);
            }
        }
        PathBuf::from("yt-dlp")
    }

    fn build_args(&self, watch_url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--format".to_string(),
            "best/bestvideo+bestaudio".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout.as_secs().to_string(),
            "--retries".to_string(),
            "2".to_string(),
        ];

        if let Some(cookies) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(cookies.display().to_string());
        }

        args.push(watch_url.to_string());
        args
    }

    fn parse_output(stdout: &[u8]) -> ExtractorResult<Extraction> {
        Ok(serde_json::from_slice(stdout)?)
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract(&self, watch_url: &str) -> ExtractorResult<Extraction> {
        let args = self.build_args(watch_url);
        debug!(
            target = "extractor.ytdlp",
            binary = %self.binary.display(),
            url = watch_url,
            "invoking extraction tool"
        );

        let output = tokio::time::timeout(
            self.extraction_timeout,
            Command::new(&self.binary).args(&args).output(),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.extraction_timeout))?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ExtractorError::ToolNotFound(self.binary.display().to_string())
            }
            _ => ExtractorError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractorError::Execution(stderr.trim().to_string()));
        }

        Self::parse_output(&output.stdout)
    }
}
