//! Extraction collaborator boundary
//!
//! The resolver never talks to an extraction library directly; it goes
//! through the narrow [`MediaExtractor`] trait so the synthesis path can be
//! tested without any network-capable tool installed. The shipped
//! implementation shells out to the yt-dlp binary.

use async_trait::async_trait;

use crate::errors::ExtractorResult;
use crate::models::Extraction;

pub mod ytdlp;

pub use ytdlp::YtDlpExtractor;

/// Narrow interface over the media-extraction collaborator
///
/// Implementations turn a canonical watch URL into the format/caption record
/// described by the data model. Failures must surface as `ExtractorError`,
/// never as panics.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the backing tool (for logging)
    fn name(&self) -> &'static str;

    /// Extract stream metadata for a canonical watch URL
    async fn extract(&self, watch_url: &str) -> ExtractorResult<Extraction>;
}
