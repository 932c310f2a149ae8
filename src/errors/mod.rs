//! Centralized error handling for the dash-bridge playback core
//!
//! # Error Categories
//!
//! - **Resolve Errors**: playback-mode dispatch, redirect-loop policy and
//!   the wrapped extraction/synthesis failures the fallback logic retries on
//! - **Synthesis Errors**: data-quality failures in the format catalog
//! - **Extractor Errors**: the extraction collaborator boundary

pub mod types;

pub use types::*;

/// Convenience type alias for resolver Results
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Convenience type alias for synthesis Results
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Convenience type alias for extractor Results
pub type ExtractorResult<T> = Result<T, ExtractorError>;
