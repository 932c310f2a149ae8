use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::models::PlaybackMode;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub subtitles: SubtitleConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Playback strategy selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Strategy used when the caller does not request one explicitly.
    /// Leaving this unset makes resolution fail with a configuration error.
    #[serde(default)]
    pub mode: Option<PlaybackMode>,
    /// Strategy retried once if the extraction path fails
    #[serde(default)]
    pub fallback: Option<PlaybackMode>,
    /// Application identifier handed to the OS intent launcher
    #[serde(default = "default_intent_app_id")]
    pub intent_app_id: String,
    /// Maintainer name compared against sibling add-ons for loop prevention
    #[serde(default)]
    pub own_author: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            mode: None,
            fallback: None,
            intent_app_id: default_intent_app_id(),
            own_author: String::new(),
        }
    }
}

/// Caption-track emission flags for the manifest synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Emit authored caption tracks
    #[serde(default = "default_include_subtitles")]
    pub include_subtitles: bool,
    /// Emit machine-generated caption tracks
    #[serde(default)]
    pub include_auto_subtitles: bool,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            include_subtitles: default_include_subtitles(),
            include_auto_subtitles: false,
        }
    }
}

/// Where synthesized manifests are staged before handoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    #[serde(default = "default_staging_dir")]
    pub dir: PathBuf,
    /// Reuse one fixed file name instead of a unique name per request.
    /// Overlapping requests then race on the same path; only enable this for
    /// hosts that require a well-known manifest location.
    #[serde(default)]
    pub single_slot: bool,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: default_staging_dir(),
            single_slot: false,
        }
    }
}

/// Extraction tool invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Explicit path to the yt-dlp binary; discovered when unset
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,
    /// Cookies file forwarded to the extraction tool
    #[serde(default)]
    pub cookies_path: Option<PathBuf>,
    #[serde(default = "default_socket_timeout_secs")]
    pub socket_timeout_secs: u64,
    #[serde(default = "default_extraction_timeout_secs")]
    pub extraction_timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            cookies_path: None,
            socket_timeout_secs: default_socket_timeout_secs(),
            extraction_timeout_secs: default_extraction_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [playback]
            mode = "extract"
            fallback = "app-intent"
            "#,
        )
        .unwrap();

        assert_eq!(config.playback.mode, Some(PlaybackMode::Extract));
        assert_eq!(config.playback.fallback, Some(PlaybackMode::AppIntent));
        assert_eq!(config.playback.intent_app_id, DEFAULT_INTENT_APP_ID);
        assert!(config.subtitles.include_subtitles);
        assert!(!config.subtitles.include_auto_subtitles);
        assert!(!config.staging.single_slot);
    }

    #[test]
    fn empty_config_has_no_mode() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.playback.mode, None);
        assert_eq!(config.playback.fallback, None);
    }
}
