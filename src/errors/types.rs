//! Error type definitions for the dash-bridge playback core
//!
//! This module defines all error types used throughout the crate, providing
//! a layered error system: extractor-boundary failures and manifest
//! data-quality failures are both wrapped into `ResolveError::ExtractionFailed`
//! at the resolver boundary so the fallback logic can catch them uniformly.

use std::time::Duration;
use thiserror::Error;

/// Resolver-level errors
///
/// These are the only errors that escape a top-level `resolve` call. All
/// synthesis-path failures surface as `ExtractionFailed` with the underlying
/// cause attached, which is the variant the single-hop fallback retries on.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No playback mode was requested and none is configured
    #[error("no playback mode configured")]
    NoPlaybackModeConfigured,

    /// Handing playback to the target add-on would loop back into an
    /// equivalent add-on by the same maintainer
    #[error("refusing to redirect playback to '{addon_id}': same maintainer as this add-on")]
    RedirectLoop { addon_id: String },

    /// The extraction/synthesis path failed for a video
    #[error("extraction failed for video '{video_id}': {source}")]
    ExtractionFailed {
        video_id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ResolveError {
    /// Wrap any synthesis-path failure for the fallback logic to catch
    pub fn extraction_failed<E>(video_id: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ExtractionFailed {
            video_id: video_id.into(),
            source: Box::new(source),
        }
    }
}

/// Manifest synthesis data-quality errors
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// No descriptor survived container classification
    #[error("no playable formats found for video '{video_id}'")]
    NoPlayableFormats { video_id: String },

    /// A classified descriptor is missing a field its mime bucket requires
    #[error("format '{format_id}' is missing required field '{field}'")]
    MalformedFormat {
        format_id: String,
        field: &'static str,
    },

    /// The extraction record carries no presentation duration
    #[error("extraction result for video '{video_id}' has no duration")]
    MissingDuration { video_id: String },
}

/// Extraction collaborator boundary errors
///
/// Raised by `MediaExtractor` implementations; never propagated raw past the
/// resolver.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The backing extraction tool is not installed or not runnable
    #[error("extraction tool not found: {0}")]
    ToolNotFound(String),

    /// The extraction tool ran but exited with an error
    #[error("extraction tool failed: {0}")]
    Execution(String),

    /// The extraction tool produced output we could not parse
    #[error("failed to parse extraction output: {0}")]
    Parse(#[from] serde_json::Error),

    /// The extraction call exceeded its deadline
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),

    /// Spawning or reading the extraction tool failed
    #[error("i/o error running extraction tool: {0}")]
    Io(#[from] std::io::Error),
}
