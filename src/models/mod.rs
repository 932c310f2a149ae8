//! Core data model for playback resolution and manifest synthesis
//!
//! The descriptor shapes mirror the extraction collaborator's JSON output
//! (one record per muxed stream, plus caption-track maps keyed by language
//! tag). Ordered maps are used wherever the collaborator's iteration order
//! is load-bearing: header merging is last-write-wins in catalog order and
//! manifests must be reproducible.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Muxing family tag of an extracted format
///
/// Only the three DASH-style families are recognized by the manifest
/// synthesizer's grouping rules; anything else (HLS variants, progressive
/// downloads) is preserved here as `Other` and dropped during bucketing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    WebmDash,
    Mp4Dash,
    M4aDash,
    #[serde(untagged)]
    Other(String),
}

/// Start/end byte offsets of a segment-index box or initialization segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// One media format descriptor from the extraction collaborator
///
/// Numeric fields the collaborator may omit are Option-typed and validated
/// at synthesis time; they are never silently defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    /// Free-text label, scanned for "original"/"default" track hints
    #[serde(rename = "format", default)]
    pub format_label: Option<String>,
    #[serde(default)]
    pub container: Option<Container>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    /// Bits per second
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    /// IETF language tag, empty when the collaborator reports none
    #[serde(default)]
    pub language: Option<String>,
    /// Absolute media URL, percent-escaped as received
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "indexRange", default)]
    pub index_range: Option<ByteRange>,
    #[serde(rename = "initRange", default)]
    pub init_range: Option<ByteRange>,
    #[serde(rename = "http_headers", default)]
    pub request_headers: IndexMap<String, String>,
}

impl FormatDescriptor {
    /// Video codec identifier, treating "none"/empty as absent
    pub fn video_codec(&self) -> Option<&str> {
        codec_present(self.vcodec.as_deref())
    }

    /// Audio codec identifier, treating "none"/empty as absent
    pub fn audio_codec(&self) -> Option<&str> {
        codec_present(self.acodec.as_deref())
    }

    /// Language tag for grouping; empty string when unreported
    pub fn language_tag(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }

    /// Case-insensitive substring match against the free-text label
    pub fn label_contains(&self, needle: &str) -> bool {
        self.format_label
            .as_deref()
            .is_some_and(|label| label.to_lowercase().contains(needle))
    }
}

fn codec_present(codec: Option<&str>) -> Option<&str> {
    match codec {
        Some("none") | Some("") | None => None,
        Some(other) => Some(other),
    }
}

/// One candidate encoding of a caption track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleVariant {
    pub ext: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// The full record returned by the extraction collaborator for one video
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Extraction {
    /// Presentation duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
    /// Authored caption tracks, keyed by language tag in collaborator order
    #[serde(default)]
    pub subtitles: IndexMap<String, Vec<SubtitleVariant>>,
    /// Machine-generated caption tracks, keyed by language tag
    #[serde(default)]
    pub automatic_captions: IndexMap<String, Vec<SubtitleVariant>>,
}

/// Closed set of playback strategies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PlaybackMode {
    /// Launch an external application via an OS-level intent
    AppIntent,
    /// Deep-link into the YouTube sibling plugin
    YoutubePlugin,
    /// Deep-link into the Tubed sibling plugin
    TubedPlugin,
    /// Extract formats locally and synthesize a manifest
    Extract,
}

/// Inputstream handler the host player should attach to the item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputstreamKind {
    Mpd,
}

/// Side-channel playback hints for the downstream player
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PlaybackHints {
    /// Declared frame rates from the collaborator are approximate (24 vs
    /// 23.976 etc.) and must not be trusted literally
    pub remove_framerate: bool,
}

/// A playable item descriptor handed back to the host player
#[derive(Debug, Clone, Serialize)]
pub struct PlayableItem {
    /// Local manifest path or sibling deep-link URI
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputstream: Option<InputstreamKind>,
    /// Merged request headers required to fetch the referenced media
    pub headers: IndexMap<String, String>,
    pub hints: PlaybackHints,
}

impl PlayableItem {
    /// Item pointing at another plugin's playback entry point
    pub fn deep_link(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            slug: None,
            inputstream: None,
            headers: IndexMap::new(),
            hints: PlaybackHints::default(),
        }
    }
}

/// Outcome of a top-level resolve call
///
/// App-intent launches are fire-and-forget: the external application takes
/// over and there is no item for the host player to navigate to.
#[derive(Debug)]
pub enum ResolvedPlayback {
    /// An external application was launched; terminal success, no item
    Launched,
    Item(PlayableItem),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn container_parses_known_and_unknown_tags() {
        let known: Container = serde_json::from_str("\"webm_dash\"").unwrap();
        assert_eq!(known, Container::WebmDash);

        let unknown: Container = serde_json::from_str("\"hls\"").unwrap();
        assert_eq!(unknown, Container::Other("hls".to_string()));
    }

    #[test]
    fn codec_none_marker_is_absent() {
        let descriptor: FormatDescriptor = serde_json::from_str(
            r#"{"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2"}"#,
        )
        .unwrap();
        assert_eq!(descriptor.video_codec(), None);
        assert_eq!(descriptor.audio_codec(), Some("mp4a.40.2"));
    }

    #[test]
    fn playback_mode_round_trips_kebab_case() {
        assert_eq!(
            PlaybackMode::from_str("app-intent").unwrap(),
            PlaybackMode::AppIntent
        );
        assert_eq!(PlaybackMode::Extract.to_string(), "extract");
    }

    #[test]
    fn label_match_is_case_insensitive() {
        let descriptor: FormatDescriptor = serde_json::from_str(
            r#"{"format_id": "251", "format": "251 - audio (Original)"}"#,
        )
        .unwrap();
        assert!(descriptor.label_contains("original"));
        assert!(!descriptor.label_contains("default"));
    }
}
