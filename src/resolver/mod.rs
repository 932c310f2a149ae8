//! Playback resolution
//!
//! Top-level strategy dispatcher: given a video identifier and a playback
//! mode, either hand playback to an external application or a sibling
//! plugin, or extract formats and synthesize a manifest locally. When the
//! extraction path fails and a fallback mode is configured, exactly one
//! fallback hop is attempted, with a user-visible notice carrying the cause.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{ResolveError, ResolveResult};
use crate::extractor::MediaExtractor;
use crate::manifest::{FormatCatalog, ManifestSynthesizer};
use crate::models::{
    InputstreamKind, PlayableItem, PlaybackHints, PlaybackMode, ResolvedPlayback,
};

pub mod intent;
pub mod redirect_guard;

pub use intent::{INTENT_ACTION_VIEW, IntentLauncher, Notifier};
pub use redirect_guard::{AddonDirectory, AddonInfo, RedirectGuard, StaticAddonDirectory};

/// This add-on's own integration id
pub const OWN_PLUGIN_ID: &str = "plugin.video.dashbridge";

/// Sibling integration ids playback can be handed to
pub const YOUTUBE_PLUGIN_ID: &str = "plugin.video.youtube";
pub const TUBED_PLUGIN_ID: &str = "plugin.video.tubed";

/// Canonical watch URL for a video identifier
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Deep link into the YouTube sibling plugin's playback entry point
pub fn youtube_plugin_link(video_id: &str) -> String {
    format!("plugin://{}/play/?video_id={}", YOUTUBE_PLUGIN_ID, video_id)
}

/// Deep link into the Tubed sibling plugin's playback entry point
pub fn tubed_plugin_link(video_id: &str) -> String {
    format!("plugin://{}/?mode=play&video_id={}", TUBED_PLUGIN_ID, video_id)
}

/// True when a URL comes from this add-on, a known sibling, or the video
/// service itself
pub fn is_recognized_source(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(OWN_PLUGIN_ID)
        || lower.contains(YOUTUBE_PLUGIN_ID)
        || lower.contains(TUBED_PLUGIN_ID)
        || lower.contains("youtube.com")
}

/// Extract a video identifier from a recognized URL
///
/// Checks the known identifier query parameters in precedence order;
/// returns `None` for URLs from unrecognized sources or with no usable
/// identifier.
pub fn video_id_from_url(url: &str) -> Option<String> {
    if !is_recognized_source(url) {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

    for key in ["video_id", "videoid", "v"] {
        if let Some((_, value)) = pairs.iter().find(|(k, _)| k == key) {
            if !value.is_empty() {
                return Some(value.clone());
            }
        }
    }
    None
}

/// Strategy dispatcher for playback requests
pub struct PlaybackResolver {
    config: Config,
    extractor: Arc<dyn MediaExtractor>,
    guard: RedirectGuard,
    launcher: Arc<dyn IntentLauncher>,
    notifier: Arc<dyn Notifier>,
    synthesizer: ManifestSynthesizer,
}

impl PlaybackResolver {
    pub fn new(
        config: Config,
        extractor: Arc<dyn MediaExtractor>,
        directory: Arc<dyn AddonDirectory>,
        launcher: Arc<dyn IntentLauncher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let guard = RedirectGuard::new(directory, config.playback.own_author.clone());
        let synthesizer = ManifestSynthesizer::from_config(&config.subtitles);
        Self {
            config,
            extractor,
            guard,
            launcher,
            notifier,
            synthesizer,
        }
    }

    /// Resolve using the configured playback mode
    pub async fn resolve(&self, video_id: &str) -> ResolveResult<ResolvedPlayback> {
        let mode = self
            .config
            .playback
            .mode
            .ok_or(ResolveError::NoPlaybackModeConfigured)?;
        self.resolve_with_mode(video_id, mode).await
    }

    /// Resolve with an explicit playback mode
    ///
    /// Iterative single-hop fallback: when the extraction path fails and a
    /// fallback mode is configured, the failure is surfaced as a
    /// notification and the fallback mode is tried once. No further hops.
    pub async fn resolve_with_mode(
        &self,
        video_id: &str,
        mode: PlaybackMode,
    ) -> ResolveResult<ResolvedPlayback> {
        let mut mode = mode;
        let mut fallback = self.config.playback.fallback;

        loop {
            match self.dispatch(video_id, mode).await {
                Err(ResolveError::ExtractionFailed { source, .. }) if fallback.is_some() => {
                    let next = fallback.take().unwrap();
                    warn!(
                        target = "resolver",
                        video_id,
                        from = %mode,
                        to = %next,
                        cause = %source,
                        "extraction path failed, retrying with fallback mode"
                    );
                    self.notifier.notify(&source.to_string()).await;
                    mode = next;
                }
                outcome => return outcome,
            }
        }
    }

    async fn dispatch(
        &self,
        video_id: &str,
        mode: PlaybackMode,
    ) -> ResolveResult<ResolvedPlayback> {
        match mode {
            PlaybackMode::AppIntent => self.launch_app_intent(video_id).await,
            PlaybackMode::YoutubePlugin => {
                self.guard.assert_safe(YOUTUBE_PLUGIN_ID)?;
                Ok(ResolvedPlayback::Item(PlayableItem::deep_link(
                    youtube_plugin_link(video_id),
                )))
            }
            PlaybackMode::TubedPlugin => {
                self.guard.assert_safe(TUBED_PLUGIN_ID)?;
                Ok(ResolvedPlayback::Item(PlayableItem::deep_link(
                    tubed_plugin_link(video_id),
                )))
            }
            PlaybackMode::Extract => self.extract_and_synthesize(video_id).await,
        }
    }

    async fn launch_app_intent(&self, video_id: &str) -> ResolveResult<ResolvedPlayback> {
        let url = watch_url(video_id);
        debug!(
            target = "resolver",
            app_id = %self.config.playback.intent_app_id,
            url = %url,
            "handing playback to external application"
        );
        self.launcher
            .launch(&self.config.playback.intent_app_id, INTENT_ACTION_VIEW, &url)
            .await;
        Ok(ResolvedPlayback::Launched)
    }

    async fn extract_and_synthesize(&self, video_id: &str) -> ResolveResult<ResolvedPlayback> {
        let url = watch_url(video_id);
        let extraction = self
            .extractor
            .extract(&url)
            .await
            .map_err(|e| ResolveError::extraction_failed(video_id, e))?;

        let catalog = FormatCatalog::from_extraction(video_id, extraction)
            .map_err(|e| ResolveError::extraction_failed(video_id, e))?;
        let document = self
            .synthesizer
            .build(&catalog)
            .map_err(|e| ResolveError::extraction_failed(video_id, e))?;

        let path = self
            .stage_manifest(video_id, &document.text)
            .await
            .map_err(|e| ResolveError::extraction_failed(video_id, e))?;

        info!(
            target = "resolver",
            video_id,
            adaptation_sets = document.adaptation_sets,
            dropped_formats = document.dropped_formats,
            path = %path.display(),
            "synthesized manifest"
        );

        Ok(ResolvedPlayback::Item(PlayableItem {
            path: path.display().to_string(),
            slug: Some(video_id.to_string()),
            inputstream: Some(InputstreamKind::Mpd),
            headers: document.headers,
            hints: PlaybackHints {
                remove_framerate: true,
            },
        }))
    }

    /// Write the assembled manifest to the staging directory
    ///
    /// The document is only written once fully assembled in memory, so an
    /// abandoned extraction never leaves a partial manifest behind. Unique
    /// file names keep overlapping requests from racing on one path unless
    /// single-slot staging was explicitly configured.
    async fn stage_manifest(&self, video_id: &str, text: &str) -> std::io::Result<PathBuf> {
        let staging = &self.config.staging;
        tokio::fs::create_dir_all(&staging.dir).await?;

        let file_name = if staging.single_slot {
            "yt.mpd".to_string()
        } else {
            format!("yt-{}-{}.mpd", video_id, Uuid::new_v4())
        };
        let path = staging.dir.join(file_name);
        tokio::fs::write(&path, text).await?;
        Ok(path)
    }
}
