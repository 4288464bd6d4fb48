//! Conversion pipeline: normalize, pick a variant, classify, render.
//!
//! A [`Pipeline`] is compiled once from a [`DocumentProfile`] and can then
//! convert any number of documents. It holds no per-document state, so one
//! pipeline can be shared across threads.
//!
//! # Example
//!
//! ```
//! use docmark::convert::{ConversionInput, Pipeline, ConvertOptions};
//! use docmark::profile::DocumentProfile;
//!
//! fn main() -> docmark::Result<()> {
//!     let pipeline = Pipeline::new(DocumentProfile::default(), ConvertOptions::default())?;
//!     let input = ConversionInput::new("Introduction\nThis is the intro text.");
//!     let result = pipeline.convert(&input, &[])?;
//!     assert!(result.markdown.starts_with("## Introduction"));
//!     Ok(())
//! }
//! ```

pub mod batch;
mod pdf;
mod strategy;

pub use batch::{convert_batch, BatchJob, BatchOutcome, ConversionStatus, JobInput};
#[cfg(feature = "async")]
pub use pdf::convert_file_async;
pub use pdf::{convert_file, PdfConverter};
pub use strategy::{strategy_for, HowToStrategy, StandardStrategy, TableStrategy, VariantStrategy};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{Document, DocumentVariant, ImageRef, Line, PageContent};
use crate::parser::{detect_variant, Normalizer, RuleSet, TableRouter};
use crate::profile::DocumentProfile;
use crate::render::{Emphasis, ExtractionStats, MarkdownRenderer, RenderOptions};

/// Supplier of raw text and page geometry for one document.
///
/// Failures of the underlying extractor surface as
/// [`Error::ExtractionFailed`](crate::Error::ExtractionFailed).
pub trait ContentSource {
    /// Raw extracted text of the whole document.
    fn text(&self) -> Result<String>;

    /// Drawing operators and positioned text of every page.
    fn pages(&self) -> Result<Vec<PageContent>>;
}

/// In-memory content, for pre-extracted text and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionInput {
    pub text: String,
    pub pages: Vec<PageContent>,
}

impl ConversionInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pages: Vec::new(),
        }
    }

    /// Attach page geometry.
    pub fn with_pages(mut self, pages: Vec<PageContent>) -> Self {
        self.pages = pages;
        self
    }
}

impl ContentSource for ConversionInput {
    fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn pages(&self) -> Result<Vec<PageContent>> {
        Ok(self.pages.clone())
    }
}

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Force a variant instead of detecting it
    pub variant: Option<DocumentVariant>,

    /// Rendering options
    pub render: RenderOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a document variant.
    pub fn with_variant(mut self, variant: DocumentVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.render.collect_stats = collect;
        self
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered Markdown
    pub markdown: String,

    /// Variant that produced the blocks
    pub variant: DocumentVariant,

    /// Extraction statistics (if collected)
    pub stats: Option<ExtractionStats>,

    /// When the conversion finished
    pub converted_at: DateTime<Utc>,
}

impl ConvertResult {
    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.markdown.len()
    }
}

/// A compiled conversion pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    profile: DocumentProfile,
    options: ConvertOptions,
    normalizer: Normalizer,
    rules: RuleSet,
    router: TableRouter,
    emphasis: Emphasis,
}

impl Pipeline {
    /// Compile every pattern of the profile.
    pub fn new(profile: DocumentProfile, options: ConvertOptions) -> Result<Self> {
        let normalizer = Normalizer::new(&profile)?;
        let rules = RuleSet::new(&profile)?;
        let router = TableRouter::new(&profile);
        let emphasis = Emphasis::new(&profile)?;
        Ok(Self {
            profile,
            options,
            normalizer,
            rules,
            router,
            emphasis,
        })
    }

    /// Pipeline for the built-in profile.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DocumentProfile::default(), ConvertOptions::default())
    }

    pub fn profile(&self) -> &DocumentProfile {
        &self.profile
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn router(&self) -> &TableRouter {
        &self.router
    }

    /// Normalize the source text and build the document tree.
    pub fn document(&self, source: &dyn ContentSource, images: &[ImageRef]) -> Result<Document> {
        let raw = source.text()?;
        let text = self.normalizer.normalize(&raw);
        let variant = match self.options.variant {
            Some(forced) => {
                log::debug!("variant forced to {}", forced);
                forced
            }
            None => detect_variant(&text, images, &self.profile),
        };

        let lines = Line::split(&text);
        let blocks = strategy_for(variant).blocks(self, &lines, source)?;
        log::debug!("{} variant produced {} blocks", variant, blocks.len());

        let mut doc = Document::new(variant).with_footer(self.profile.footer_text());
        doc.blocks = blocks;
        Ok(doc)
    }

    /// Render a document built by this pipeline.
    pub fn render(&self, doc: &Document, images: &[ImageRef]) -> (String, Option<ExtractionStats>) {
        let renderer = MarkdownRenderer::new(self.options.render.clone()).with_emphasis(&self.emphasis);
        if self.options.render.collect_stats {
            let result = renderer.render_with_stats(doc, images);
            (result.content, Some(result.stats))
        } else {
            (renderer.render(doc, images), None)
        }
    }

    /// The image list with the profile's filter applied.
    ///
    /// Filtered images stay in the list as suppressed slots.
    pub fn filter_images(&self, images: &[ImageRef]) -> Vec<ImageRef> {
        let mut images = images.to_vec();
        let suppressed = self.profile.image_filter.apply(&mut images);
        if suppressed > 0 {
            log::debug!("{} of {} images suppressed by filter", suppressed, images.len());
        }
        images
    }

    /// Convert one document to Markdown.
    pub fn convert(&self, source: &dyn ContentSource, images: &[ImageRef]) -> Result<ConvertResult> {
        let images = self.filter_images(images);
        let doc = self.document(source, &images)?;
        let (markdown, stats) = self.render(&doc, &images);
        Ok(ConvertResult {
            markdown,
            variant: doc.variant,
            stats,
            converted_at: Utc::now(),
        })
    }

    /// Convert pre-extracted text.
    pub fn convert_text(&self, text: &str, images: &[ImageRef]) -> Result<ConvertResult> {
        self.convert(&ConversionInput::new(text), images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailingSource;

    impl ContentSource for FailingSource {
        fn text(&self) -> Result<String> {
            Err(Error::ExtractionFailed("extractor crashed".into()))
        }

        fn pages(&self) -> Result<Vec<PageContent>> {
            Err(Error::ExtractionFailed("extractor crashed".into()))
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::with_defaults().unwrap()
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_variant(DocumentVariant::Table)
            .with_stats(true);

        assert_eq!(options.variant, Some(DocumentVariant::Table));
        assert!(options.render.collect_stats);
    }

    #[test]
    fn test_intro_scenario() {
        let result = pipeline()
            .convert_text("Introduction\nThis is the intro text.", &[])
            .unwrap();
        assert!(result
            .markdown
            .starts_with("## Introduction\n\nThis is the intro text."));
        assert!(result.markdown.ends_with("All rights reserved."));
        assert_eq!(result.variant, DocumentVariant::Standard);
        assert!(result.stats.is_none());
    }

    #[test]
    fn test_empty_input_is_footer_only() {
        let result = pipeline().convert_text("", &[]).unwrap();
        assert_eq!(
            result.markdown,
            DocumentProfile::default().footer_text().unwrap()
        );
    }

    #[test]
    fn test_source_failure_propagates() {
        let err = pipeline().convert(&FailingSource, &[]).unwrap_err();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[test]
    fn test_forced_variant() {
        let options = ConvertOptions::new().with_variant(DocumentVariant::HowTo);
        let pipeline = Pipeline::new(DocumentProfile::default(), options).unwrap();
        let result = pipeline.convert_text("Some text here.", &[]).unwrap();
        assert_eq!(result.variant, DocumentVariant::HowTo);
    }

    #[test]
    fn test_stats_collected() {
        let options = ConvertOptions::new().with_stats(true);
        let pipeline = Pipeline::new(DocumentProfile::default(), options).unwrap();
        let result = pipeline
            .convert_text("1. First step\n2. Second step", &[])
            .unwrap();
        let stats = result.stats.unwrap();
        assert_eq!(stats.list_item_count, 2);
    }

    #[test]
    fn test_filter_keeps_slots() {
        let images = vec![
            ImageRef::new(0, "images/logo.png", "Diagram 1")
                .with_dimensions(568, 130)
                .with_size(4000),
            ImageRef::new(1, "images/notes.png", "Diagram 2"),
        ];
        let filtered = pipeline().filter_images(&images);
        assert_eq!(filtered.len(), 2);
        assert!(filtered[0].suppressed);
        assert!(!filtered[1].suppressed);
        assert!(!images[0].suppressed);
    }

    #[test]
    fn test_invalid_profile_pattern() {
        let mut profile = DocumentProfile::default();
        profile.boilerplate_patterns.push("(unclosed".into());
        let err = Pipeline::new(profile, ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
