//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

use crate::model::{Block, Document};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered Markdown
    pub content: String,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, stats: ExtractionStats) -> Self {
        Self { content, stats }
    }

    /// Create a simple result with just content.
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            stats: ExtractionStats::default(),
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected while rendering one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of heading blocks (title, section, subsection)
    pub heading_count: u32,

    /// Number of paragraphs
    pub paragraph_count: u32,

    /// Number of callouts
    pub callout_count: u32,

    /// Number of labeled fields
    pub labeled_field_count: u32,

    /// Number of ordered, roman and bullet items
    pub list_item_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of table body rows
    pub table_row_count: u32,

    /// Images rendered at a placeholder
    pub images_rendered: u32,

    /// Suppressed images that consumed a slot
    pub images_suppressed: u32,

    /// Images appended after the last block
    pub images_appended: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a block by kind.
    pub fn add_block(&mut self, block: &Block) {
        match block {
            Block::MainTitle { .. } | Block::SectionHeader { .. } | Block::SubsectionHeader { .. } => {
                self.heading_count += 1
            }
            Block::Paragraph { .. } => self.paragraph_count += 1,
            Block::Callout { .. } => self.callout_count += 1,
            Block::LabeledField { .. } => self.labeled_field_count += 1,
            Block::OrderedItem { .. } | Block::RomanItem { .. } | Block::BulletItem { .. } => {
                self.list_item_count += 1
            }
            Block::Table { table } => {
                self.table_count += 1;
                self.table_row_count += table.body().len() as u32;
            }
            Block::ImagePlaceholder => {}
        }
    }

    /// Count every block of a document.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self::new();
        for block in &doc.blocks {
            stats.add_block(block);
        }
        stats
    }

    /// Increment rendered image count.
    pub fn add_image(&mut self) {
        self.images_rendered += 1;
    }

    /// Increment suppressed image count.
    pub fn add_suppressed_image(&mut self) {
        self.images_suppressed += 1;
    }

    /// Increment appended image count.
    pub fn add_appended_image(&mut self) {
        self.images_appended += 1;
    }

    /// Total images that appear in the output.
    pub fn images_in_output(&self) -> u32 {
        self.images_rendered + self.images_appended
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.callout_count += other.callout_count;
        self.labeled_field_count += other.labeled_field_count;
        self.list_item_count += other.list_item_count;
        self.table_count += other.table_count;
        self.table_row_count += other.table_row_count;
        self.images_rendered += other.images_rendered;
        self.images_suppressed += other.images_suppressed;
        self.images_appended += other.images_appended;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
