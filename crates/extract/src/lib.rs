//! # Docmind Extract
//!
//! Turns a directory of source documents into ordered text fragments ready
//! for relevance ranking.
//!
//! ## Pipeline position
//!
//! ```text
//! Document directory
//!     │
//!     ├──> Page text (pdftotext for PDFs, direct read for text/markdown)
//!     │
//!     ├──> Paragraph split on blank-line boundaries
//!     │
//!     └──> Fragment[] {text, source_id, page_number}
//! ```
//!
//! Fragments come out in extraction order: documents sorted by filename,
//! pages in document order, paragraphs top to bottom. Downstream stages rely
//! on that order as the canonical one, so it is never shuffled here.
//!
//! Sentence splitting for the refinement stage also lives in this crate, so
//! that every consumer agrees on where sentence boundaries fall.

mod config;
mod error;
mod extractor;
mod sentences;
mod types;

pub use config::ExtractConfig;
pub use error::{ExtractError, Result};
pub use extractor::FragmentExtractor;
pub use sentences::split_into_sentences;
pub use types::Fragment;
