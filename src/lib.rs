//! # docmark
//!
//! Reconstructs structured Markdown from PDF manuals, guides and release
//! notes.
//!
//! Extracted PDF text has lost its fonts and layout. docmark rebuilds the
//! document structure from the text alone (titles, sections, callouts,
//! lists, labeled fields) and rebuilds tables from the vector rules drawn on
//! each page. Images supplied by the caller are slotted into the narrative at
//! fixed structural trigger points.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmark::convert::PdfConverter;
//!
//! fn main() -> docmark::Result<()> {
//!     let converter = PdfConverter::with_defaults()?;
//!     let result = converter.convert_file("guide.pdf", &[])?;
//!     println!("{}", result.markdown);
//!     Ok(())
//! }
//! ```
//!
//! Pre-extracted text goes through the same pipeline:
//!
//! ```
//! let markdown = docmark::text_to_markdown("NOTE: careful here.\nMore detail.").unwrap();
//! assert!(markdown.starts_with("> **NOTE:** careful here.\n> More detail."));
//! ```
//!
//! ## Features
//!
//! - **Three document variants**: standard manuals, how-to guides, table documents
//! - **Geometry tables**: grids inferred from rule segments, merged across pages
//! - **Configurable vocabulary**: every literal lives in a JSON-loadable [`DocumentProfile`]
//! - **Parallel batches**: Rayon-backed conversion of independent documents

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod profile;
pub mod render;

// Re-export commonly used types
pub use convert::{
    convert_batch, BatchJob, BatchOutcome, ContentSource, ConversionInput, ConversionStatus,
    ConvertOptions, ConvertResult, PdfConverter, Pipeline,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{
    images_from_files, Block, BlockKind, CalloutKind, Document, DocumentVariant, ImageFilter,
    ImageRef, Line, PageContent, Table, TableCell, TableRow,
};
pub use profile::DocumentProfile;
pub use render::{ExtractionStats, JsonFormat, RenderOptions};

use std::path::Path;

/// Convert pre-extracted text with the built-in profile.
pub fn text_to_markdown(text: &str) -> Result<String> {
    Ok(Pipeline::with_defaults()?.convert_text(text, &[])?.markdown)
}

/// Convert a PDF file to Markdown with the built-in profile.
///
/// # Example
///
/// ```no_run
/// let markdown = docmark::to_markdown("guide.pdf").unwrap();
/// std::fs::write("guide.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(convert::convert_file(path, &[])?.markdown)
}

/// Convert a PDF file to Markdown with a custom profile.
pub fn to_markdown_with_profile<P: AsRef<Path>>(
    path: P,
    profile: DocumentProfile,
    images: &[ImageRef],
) -> Result<String> {
    let pipeline = Pipeline::new(profile, ConvertOptions::default())?;
    Ok(PdfConverter::new(pipeline).convert_file(path, images)?.markdown)
}

/// Normalize raw extracted text with the built-in profile.
pub fn normalize_text(text: &str) -> Result<String> {
    let normalizer = parser::Normalizer::new(&DocumentProfile::default())?;
    Ok(normalizer.normalize(text))
}

/// Build the document tree of a PDF file without rendering it.
pub fn parse_file<P: AsRef<Path>>(path: P, images: &[ImageRef]) -> Result<Document> {
    let source = parser::LopdfSource::load_file(path)?;
    Pipeline::with_defaults()?.document(&source, images)
}

/// Serialize the document tree of a PDF file to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path, &[])?;
    render::to_json(&doc, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_markdown_list() {
        let markdown = text_to_markdown("1. First step\n2. Second step").unwrap();
        assert!(markdown.starts_with("1. First step\n2. Second step\n\n"));
    }

    #[test]
    fn test_normalize_text_drops_page_numbers() {
        let text = normalize_text("Intro line\n12\nPage 3 of 9\nMore text").unwrap();
        assert_eq!(text, "Intro line\nMore text");
    }

    #[test]
    fn test_to_markdown_rejects_missing_file() {
        assert!(matches!(to_markdown("/nonexistent.pdf"), Err(Error::Io(_))));
    }

    #[test]
    fn test_detect_format_from_bytes_reexport() {
        assert!(matches!(detect_format_from_bytes(b""), Err(Error::UnknownFormat)));
        assert_eq!(detect_format_from_bytes(b"%PDF-2.0\n").unwrap().version, "2.0");
    }
}
