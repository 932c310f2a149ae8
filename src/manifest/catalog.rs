/*!
 * Format Catalog
 * ==============
 *
 * Purpose:
 *   Shape one extraction record into the groups a DASH manifest is built
 *   from:
 *
 *   1. Discard descriptors without a recognized container.
 *   2. Classify the survivors into one of four mime buckets from
 *      container + codec presence (combined-webm splits on video-codec
 *      presence; combined-mp4 requires a video codec; audio-only mp4 maps
 *      to audio/mp4).
 *   3. Group by (bucket, language), preserving first-seen order of groups
 *      and of descriptors within a group.
 *
 * Descriptors matching no bucket (HLS-style formats, progressive downloads)
 * are dropped: the downstream player cannot address them by byte range.
 * The drop is counted and logged rather than silent.
 *
 * NOTE:
 *   - This module is intentionally pure data shaping (no rendering, no I/O).
 */

use indexmap::IndexMap;
use tracing::debug;

use crate::errors::{SynthesisError, SynthesisResult};
use crate::models::{Container, Extraction, FormatDescriptor, SubtitleVariant};

/// Mime bucket a classified descriptor lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeBucket {
    VideoWebm,
    AudioWebm,
    VideoMp4,
    AudioMp4,
}

impl MimeBucket {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::VideoWebm => "video/webm",
            Self::AudioWebm => "audio/webm",
            Self::VideoMp4 => "video/mp4",
            Self::AudioMp4 => "audio/mp4",
        }
    }

    /// Classify a descriptor; `None` means it has no bucket and is dropped
    fn classify(descriptor: &FormatDescriptor) -> Option<Self> {
        match descriptor.container.as_ref()? {
            Container::WebmDash => {
                if descriptor.video_codec().is_some() {
                    Some(Self::VideoWebm)
                } else {
                    Some(Self::AudioWebm)
                }
            }
            Container::Mp4Dash => descriptor.video_codec().is_some().then_some(Self::VideoMp4),
            Container::M4aDash => Some(Self::AudioMp4),
            Container::Other(_) => None,
        }
    }
}

/// One adaptation-set-to-be: interchangeable descriptors sharing a mime
/// bucket and language
#[derive(Debug, Clone)]
pub struct AdaptationGroup {
    pub bucket: MimeBucket,
    pub language: String,
    pub formats: Vec<FormatDescriptor>,
}

impl AdaptationGroup {
    pub fn mime_type(&self) -> &'static str {
        self.bucket.mime_type()
    }

    /// Track-selection hint: any member labelled "original"
    pub fn is_original(&self) -> bool {
        self.formats.iter().any(|f| f.label_contains("original"))
    }

    /// Track-selection hint: any member labelled "default"
    pub fn is_default(&self) -> bool {
        self.formats.iter().any(|f| f.label_contains("default"))
    }
}

/// Request-local catalog of everything one manifest is synthesized from
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    pub video_id: String,
    /// Presentation duration in seconds
    pub duration: f64,
    pub groups: Vec<AdaptationGroup>,
    pub subtitles: IndexMap<String, Vec<SubtitleVariant>>,
    pub automatic_captions: IndexMap<String, Vec<SubtitleVariant>>,
    /// Descriptors discarded during classification
    pub dropped: usize,
}

impl FormatCatalog {
    /// Shape an extraction record into classified, ordered groups
    ///
    /// Fails with `NoPlayableFormats` when no descriptor survives
    /// classification, and `MissingDuration` when the collaborator reported
    /// no presentation duration.
    pub fn from_extraction(
        video_id: impl Into<String>,
        extraction: Extraction,
    ) -> SynthesisResult<Self> {
        let video_id = video_id.into();
        let duration = extraction
            .duration
            .ok_or_else(|| SynthesisError::MissingDuration {
                video_id: video_id.clone(),
            })?;

        let mut grouped: IndexMap<(MimeBucket, String), Vec<FormatDescriptor>> = IndexMap::new();
        let mut dropped = 0usize;

        for descriptor in extraction.formats {
            match MimeBucket::classify(&descriptor) {
                Some(bucket) => {
                    let key = (bucket, descriptor.language_tag().to_string());
                    grouped.entry(key).or_default().push(descriptor);
                }
                None => {
                    dropped += 1;
                    debug!(
                        target = "manifest.catalog",
                        format_id = %descriptor.format_id,
                        container = ?descriptor.container,
                        "dropping descriptor with no matching mime bucket"
                    );
                }
            }
        }

        if grouped.is_empty() {
            return Err(SynthesisError::NoPlayableFormats { video_id });
        }

        if dropped > 0 {
            debug!(
                target = "manifest.catalog",
                video_id, dropped, "discarded descriptors during classification"
            );
        }

        let groups = grouped
            .into_iter()
            .map(|((bucket, language), formats)| AdaptationGroup {
                bucket,
                language,
                formats,
            })
            .collect();

        Ok(Self {
            video_id,
            duration,
            groups,
            subtitles: extraction.subtitles,
            automatic_captions: extraction.automatic_captions,
            dropped,
        })
    }
}
