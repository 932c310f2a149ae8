//! Manifest synthesis
//!
//! Turns the extraction collaborator's heterogeneous format list into a
//! single static DASH manifest: `catalog` shapes and groups the descriptors,
//! `generator` renders the manifest text and merges request headers.

pub mod catalog;
pub mod generator;

pub use catalog::{AdaptationGroup, FormatCatalog, MimeBucket};
pub use generator::{ManifestDocument, ManifestSynthesizer};
