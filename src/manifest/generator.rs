//! DASH manifest generation
//!
//! Renders a [`FormatCatalog`] into static MPD text and aggregates the
//! request headers needed to fetch the referenced media. The manifest is
//! built by incremental string building with explicit escaping; the
//! downstream player parses this as literal adaptive-streaming markup, so
//! the element nesting and the stream-URL escaping order are contractual.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::SubtitleConfig;
use crate::errors::{SynthesisError, SynthesisResult};
use crate::models::{FormatDescriptor, SubtitleVariant};
use crate::utils::url::UrlUtils;

use super::catalog::{AdaptationGroup, FormatCatalog};

/// Caption encoding the synthesizer selects
const CAPTION_TEXT_FORMAT: &str = "vtt";

/// Delivery protocol caption variants must not use (segmented playlists
/// cannot be referenced by a single BaseURL)
const SEGMENTED_PLAYLIST_PROTOCOL: &str = "m3u8_native";

/// Suffix annotating machine-translated caption languages
const AUTO_TRANSLATED_LABEL: &str = "auto-translated";

/// A synthesized manifest plus its side-channel metadata
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    /// The rendered MPD markup
    pub text: String,
    /// Presentation duration in seconds
    pub duration: f64,
    /// Request headers merged across all representations, last write wins
    pub headers: IndexMap<String, String>,
    /// Adaptation sets emitted (audio/video groups plus caption tracks)
    pub adaptation_sets: usize,
    /// Descriptors the catalog discarded during classification
    pub dropped_formats: usize,
}

/// Renders format catalogs into manifest documents
#[derive(Debug, Clone, Copy)]
pub struct ManifestSynthesizer {
    include_subtitles: bool,
    include_auto_subtitles: bool,
}

impl ManifestSynthesizer {
    pub fn new(include_subtitles: bool, include_auto_subtitles: bool) -> Self {
        Self {
            include_subtitles,
            include_auto_subtitles,
        }
    }

    pub fn from_config(config: &SubtitleConfig) -> Self {
        Self::new(config.include_subtitles, config.include_auto_subtitles)
    }

    /// Build the manifest document for a catalog
    ///
    /// Pure function of the catalog and the two caption flags; staging the
    /// result to disk is the caller's concern.
    pub fn build(&self, catalog: &FormatCatalog) -> SynthesisResult<ManifestDocument> {
        let mut mpd = String::new();
        let mut headers: IndexMap<String, String> = IndexMap::new();
        let mut adaptation_sets = 0usize;

        mpd.push_str(&format!(
            "<MPD minBufferTime=\"PT1.5S\" mediaPresentationDuration=\"PT{}S\" type=\"static\" profiles=\"urn:mpeg:dash:profile:isoff-main:2011\">\n<Period>",
            catalog.duration
        ));

        for (id, group) in catalog.groups.iter().enumerate() {
            self.write_adaptation_set(&mut mpd, id, group, &mut headers)?;
            adaptation_sets += 1;
        }

        let mut caption_index = 0usize;
        if self.include_subtitles {
            for (language, variants) in &catalog.subtitles {
                if write_caption_set(&mut mpd, caption_index, language, variants) {
                    caption_index += 1;
                    adaptation_sets += 1;
                }
            }
        }

        if self.include_auto_subtitles {
            for (language, variants) in &catalog.automatic_captions {
                // The source-language track duplicates the authored captions
                if language.to_lowercase().contains("orig") {
                    continue;
                }
                let annotated = format!("{}-({})", language, AUTO_TRANSLATED_LABEL);
                if write_caption_set(&mut mpd, caption_index, &annotated, variants) {
                    caption_index += 1;
                    adaptation_sets += 1;
                }
            }
        }

        mpd.push_str("\n</Period>\n</MPD>");

        debug!(
            target = "manifest.generator",
            video_id = %catalog.video_id,
            adaptation_sets,
            headers = headers.len(),
            "manifest assembled"
        );

        Ok(ManifestDocument {
            text: mpd,
            duration: catalog.duration,
            headers,
            adaptation_sets,
            dropped_formats: catalog.dropped,
        })
    }

    fn write_adaptation_set(
        &self,
        mpd: &mut String,
        id: usize,
        group: &AdaptationGroup,
        headers: &mut IndexMap<String, String>,
    ) -> SynthesisResult<()> {
        let original = if group.is_original() {
            " original=\"true\""
        } else {
            ""
        };
        let default = if group.is_default() {
            " default=\"true\""
        } else {
            ""
        };

        mpd.push_str(&format!(
            "\n<AdaptationSet id=\"{}\" mimeType=\"{}\" lang=\"{}\"{}{}><Role schemeIdUri=\"urn:mpeg:DASH:role:2011\" value=\"main\"/>",
            id,
            group.mime_type(),
            UrlUtils::escape_markup(&group.language),
            original,
            default
        ));

        for format in &group.formats {
            write_representation(mpd, format, headers)?;
        }

        mpd.push_str("\n</AdaptationSet>");
        Ok(())
    }
}

fn write_representation(
    mpd: &mut String,
    format: &FormatDescriptor,
    headers: &mut IndexMap<String, String>,
) -> SynthesisResult<()> {
    let malformed = |field: &'static str| SynthesisError::MalformedFormat {
        format_id: format.format_id.clone(),
        field,
    };

    let codec = format
        .video_codec()
        .or_else(|| format.audio_codec())
        .ok_or_else(|| malformed("codec"))?;
    let bitrate = format.bitrate.ok_or_else(|| malformed("bitrate"))?;
    let url = format.url.as_deref().ok_or_else(|| malformed("url"))?;
    let index_range = format.index_range.ok_or_else(|| malformed("indexRange"))?;
    let init_range = format.init_range.ok_or_else(|| malformed("initRange"))?;

    for (name, value) in &format.request_headers {
        headers.insert(name.clone(), value.clone());
    }

    mpd.push_str(&format!(
        "\n<Representation id=\"{}\" codecs=\"{}\" bandwidth=\"{}\"",
        UrlUtils::escape_markup(&format.format_id),
        UrlUtils::escape_markup(codec),
        bitrate
    ));

    if format.video_codec().is_some() {
        let width = format.width.ok_or_else(|| malformed("width"))?;
        let height = format.height.ok_or_else(|| malformed("height"))?;
        let fps = format.fps.ok_or_else(|| malformed("fps"))?;
        mpd.push_str(&format!(
            " width=\"{}\" height=\"{}\" frameRate=\"{}\"",
            width, height, fps
        ));
    }
    mpd.push('>');

    if format.audio_codec().is_some() {
        // Fixed 2-channel declaration regardless of the source's channel
        // count; the consuming player tolerates this, a faithful count is
        // unverified against it
        mpd.push_str(
            "\n<AudioChannelConfiguration schemeIdUri=\"urn:mpeg:dash:23003:3:audio_channel_configuration:2011\" value=\"2\"/>",
        );
    }

    mpd.push_str(&format!(
        "\n<BaseURL>{}</BaseURL>\n<SegmentBase indexRange=\"{}-{}\">\n<Initialization range=\"{}-{}\" />\n</SegmentBase>",
        UrlUtils::escape_stream_url(url),
        index_range.start,
        index_range.end,
        init_range.start,
        init_range.end
    ));
    mpd.push_str("\n</Representation>");
    Ok(())
}

/// Emit a text adaptation set for the first eligible caption variant
///
/// Returns false (emitting nothing) when no variant is eligible; caption
/// absence degrades gracefully.
fn write_caption_set(
    mpd: &mut String,
    index: usize,
    language_attr: &str,
    variants: &[SubtitleVariant],
) -> bool {
    let Some(url) = variants
        .iter()
        .find(|v| {
            v.ext == CAPTION_TEXT_FORMAT
                && v.protocol.as_deref() != Some(SEGMENTED_PLAYLIST_PROTOCOL)
        })
        .and_then(|v| v.url.as_deref())
    else {
        return false;
    };

    mpd.push_str(&format!(
        "\n<AdaptationSet id=\"caption_{}\" contentType=\"text\" mimeType=\"text/vtt\" lang=\"{}\">\n<Representation id=\"caption_rep_{}\">\n<BaseURL>{}</BaseURL>\n</Representation>\n</AdaptationSet>",
        index,
        UrlUtils::escape_markup(language_attr),
        index,
        UrlUtils::escape_stream_url(url)
    ));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ByteRange, Container, Extraction};
    use indexmap::indexmap;

    fn video_format(format_id: &str, url: &str) -> FormatDescriptor {
        FormatDescriptor {
            format_id: format_id.to_string(),
            format_label: Some(format!("{} - 640x360 (360p)", format_id)),
            container: Some(Container::Mp4Dash),
            vcodec: Some("avc1.4d401e".to_string()),
            acodec: Some("none".to_string()),
            bitrate: Some(500_000),
            width: Some(640),
            height: Some(360),
            fps: Some(30.0),
            language: Some("en".to_string()),
            url: Some(url.to_string()),
            index_range: Some(ByteRange { start: 741, end: 1300 }),
            init_range: Some(ByteRange { start: 0, end: 740 }),
            request_headers: indexmap! {
                "User-Agent".to_string() => "Mozilla/5.0".to_string(),
            },
        }
    }

    fn audio_format(format_id: &str) -> FormatDescriptor {
        FormatDescriptor {
            format_id: format_id.to_string(),
            format_label: Some(format!("{} - audio only (default)", format_id)),
            container: Some(Container::M4aDash),
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            bitrate: Some(128_000),
            width: None,
            height: None,
            fps: None,
            language: Some("en".to_string()),
            url: Some("https://cdn.example/audio".to_string()),
            index_range: Some(ByteRange { start: 500, end: 900 }),
            init_range: Some(ByteRange { start: 0, end: 499 }),
            request_headers: indexmap! {
                "User-Agent".to_string() => "Mozilla/5.0".to_string(),
                "X-Session".to_string() => "audio".to_string(),
            },
        }
    }

    fn catalog_of(formats: Vec<FormatDescriptor>) -> FormatCatalog {
        FormatCatalog::from_extraction(
            "vid",
            Extraction {
                duration: Some(120.0),
                formats,
                ..Extraction::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn emits_one_set_per_bucket_with_representations_in_order() {
        let synthesizer = ManifestSynthesizer::new(false, false);
        let document = synthesizer
            .build(&catalog_of(vec![
                video_format("134", "https://cdn.example/video-a"),
                audio_format("140"),
                video_format("135", "https://cdn.example/video-b"),
            ]))
            .unwrap();

        assert_eq!(document.adaptation_sets, 2);
        let video_set = document.text.find("mimeType=\"video/mp4\"").unwrap();
        let audio_set = document.text.find("mimeType=\"audio/mp4\"").unwrap();
        assert!(video_set < audio_set);

        let first = document.text.find("id=\"134\"").unwrap();
        let second = document.text.find("id=\"135\"").unwrap();
        assert!(first < second);
    }

    #[test]
    fn stream_urls_are_escaped_in_order() {
        let synthesizer = ManifestSynthesizer::new(false, false);
        let document = synthesizer
            .build(&catalog_of(vec![video_format(
                "134",
                "https://cdn.example/seg?a=1&r=<x>",
            )]))
            .unwrap();

        assert!(document
            .text
            .contains("<BaseURL>https://cdn.example/seg?a=1&amp;r=&lt;x&gt;</BaseURL>"));
        assert!(!document.text.contains("&amp;amp;"));
    }

    #[test]
    fn audio_representations_declare_two_channels() {
        let synthesizer = ManifestSynthesizer::new(false, false);
        let document = synthesizer.build(&catalog_of(vec![audio_format("140")])).unwrap();

        assert!(document.text.contains(
            "AudioChannelConfiguration schemeIdUri=\"urn:mpeg:dash:23003:3:audio_channel_configuration:2011\" value=\"2\""
        ));
        // Audio-only representations carry no video attributes
        assert!(!document.text.contains("frameRate"));
    }

    #[test]
    fn default_label_surfaces_on_adaptation_set() {
        let synthesizer = ManifestSynthesizer::new(false, false);
        let document = synthesizer.build(&catalog_of(vec![audio_format("140")])).unwrap();
        assert!(document.text.contains(" default=\"true\""));
        assert!(!document.text.contains(" original=\"true\""));
    }

    #[test]
    fn video_entry_missing_dimensions_is_malformed() {
        let mut broken = video_format("134", "https://cdn.example/v");
        broken.width = None;

        let synthesizer = ManifestSynthesizer::new(false, false);
        let result = synthesizer.build(&catalog_of(vec![broken]));
        assert!(matches!(
            result,
            Err(SynthesisError::MalformedFormat { field: "width", .. })
        ));
    }

    #[test]
    fn missing_byte_ranges_are_malformed() {
        let mut broken = audio_format("140");
        broken.init_range = None;

        let synthesizer = ManifestSynthesizer::new(false, false);
        assert!(matches!(
            synthesizer.build(&catalog_of(vec![broken])),
            Err(SynthesisError::MalformedFormat { field: "initRange", .. })
        ));
    }

    #[test]
    fn headers_merge_last_write_wins_in_catalog_order() {
        let mut video = video_format("134", "https://cdn.example/v");
        video.request_headers.insert("X-Session".to_string(), "video".to_string());

        let synthesizer = ManifestSynthesizer::new(false, false);
        // Audio comes after video, so its X-Session value wins
        let document = synthesizer
            .build(&catalog_of(vec![video, audio_format("140")]))
            .unwrap();

        assert_eq!(
            document.headers.get("X-Session").map(String::as_str),
            Some("audio")
        );
        assert_eq!(
            document.headers.get("User-Agent").map(String::as_str),
            Some("Mozilla/5.0")
        );
    }

    #[test]
    fn caption_tracks_select_first_eligible_variant() {
        let mut catalog = catalog_of(vec![audio_format("140")]);
        catalog.subtitles = indexmap! {
            "en".to_string() => vec![
                SubtitleVariant {
                    ext: "vtt".to_string(),
                    url: Some("https://cdn.example/caps.m3u8".to_string()),
                    protocol: Some("m3u8_native".to_string()),
                },
                SubtitleVariant {
                    ext: "srv3".to_string(),
                    url: Some("https://cdn.example/caps.srv3".to_string()),
                    protocol: None,
                },
                SubtitleVariant {
                    ext: "vtt".to_string(),
                    url: Some("https://cdn.example/caps.vtt".to_string()),
                    protocol: None,
                },
            ],
            "xx".to_string() => vec![SubtitleVariant {
                ext: "srv3".to_string(),
                url: Some("https://cdn.example/other.srv3".to_string()),
                protocol: None,
            }],
        };

        let synthesizer = ManifestSynthesizer::new(true, false);
        let document = synthesizer.build(&catalog).unwrap();

        assert!(document.text.contains("caption_0"));
        assert!(document.text.contains("https://cdn.example/caps.vtt"));
        // Track with no eligible variant is skipped without error
        assert!(!document.text.contains("caption_1"));
        assert!(!document.text.contains("other.srv3"));
    }

    #[test]
    fn auto_captions_skip_original_language_and_annotate_the_rest() {
        let mut catalog = catalog_of(vec![audio_format("140")]);
        catalog.automatic_captions = indexmap! {
            "en-orig".to_string() => vec![SubtitleVariant {
                ext: "vtt".to_string(),
                url: Some("https://cdn.example/orig.vtt".to_string()),
                protocol: None,
            }],
            "de".to_string() => vec![SubtitleVariant {
                ext: "vtt".to_string(),
                url: Some("https://cdn.example/de.vtt".to_string()),
                protocol: None,
            }],
        };

        let synthesizer = ManifestSynthesizer::new(false, true);
        let document = synthesizer.build(&catalog).unwrap();

        assert!(!document.text.contains("orig.vtt"));
        assert!(document.text.contains("lang=\"de-(auto-translated)\""));
        assert!(document.text.contains("de.vtt"));
    }

    #[test]
    fn manifest_skeleton_carries_duration_and_profile() {
        let synthesizer = ManifestSynthesizer::new(false, false);
        let document = synthesizer.build(&catalog_of(vec![audio_format("140")])).unwrap();

        assert!(document.text.starts_with(
            "<MPD minBufferTime=\"PT1.5S\" mediaPresentationDuration=\"PT120S\" type=\"static\" profiles=\"urn:mpeg:dash:profile:isoff-main:2011\">"
        ));
        assert!(document.text.ends_with("\n</Period>\n</MPD>"));
    }
}
