// ABOUTME: Main library entry point for Prism, the content extraction and normalization core.
// ABOUTME: Re-exports the public API: Extractor, ExtractorBuilder, Options, CanonicalDocument, ExtractError.

//! Prism - turns an article URL, a video URL, or raw text into clean,
//! paragraph-structured plain text.
//!
//! Every input goes through the same pipeline: the classifier decides what the
//! input is, the fetcher retrieves raw content (HTTP for articles, caption
//! tracks for videos, nothing for raw text), and the normalizer strips markup
//! and boilerplate into a [`CanonicalDocument`]. Any step can fail with a typed
//! [`ExtractError`].
//!
//! # Example
//!
//! ```no_run
//! use prism_extract::{ExtractError, Extractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExtractError> {
//!     let extractor = Extractor::builder().build()?;
//!     let doc = extractor.extract("https://example.com/article").await?;
//!     println!("{}", doc.text());
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod normalize;
pub mod options;
pub mod resource;
pub mod source;
pub mod transcript;

pub use crate::document::{CanonicalDocument, SourceMetadata};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractor::Extractor;
pub use crate::fetch::{ContentKind, FetchResult, Fetcher};
pub use crate::normalize::{normalize, NormalizeOptions};
pub use crate::options::{ExtractorBuilder, Options};
pub use crate::source::{classify, SourceInput, SourceKind, VideoHost, VideoRef};
pub use crate::transcript::{Caption, NoTranscripts, Transcript, TranscriptSource, YouTubeCaptions};
