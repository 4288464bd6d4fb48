//! Classified document blocks.

use serde::{Deserialize, Serialize};

use super::Table;

/// A classified unit of document structure.
///
/// Blocks are produced once, top to bottom, by a scanner and are not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Top-level document title
    MainTitle { text: String },

    /// Section header
    SectionHeader { text: String },

    /// Subsection header
    SubsectionHeader { text: String },

    /// Labeled admonition rendered as a blockquote
    Callout {
        callout: CalloutKind,
        /// Label as written, including any parenthetical qualifier
        label: String,
        /// First line text followed by continuation lines (empty = paragraph gap)
        lines: Vec<String>,
    },

    /// `Label: value` line
    LabeledField { label: String, value: String },

    /// Numbered list item
    OrderedItem { number: String, text: String },

    /// Roman-numeral list item with an optional continuation paragraph
    RomanItem {
        numeral: String,
        text: String,
        continuation: Option<String>,
    },

    /// Bullet list item
    BulletItem { text: String },

    /// Plain paragraph
    Paragraph { text: String },

    /// Table built by the table router
    Table { table: Table },

    /// Slot resolved against the image list at render time
    ImagePlaceholder,
}

impl Block {
    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Create a heading block at the given depth (1 = title, 2 = section, 3+ = subsection).
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let text = text.into();
        match level {
            0 | 1 => Block::MainTitle { text },
            2 => Block::SectionHeader { text },
            _ => Block::SubsectionHeader { text },
        }
    }

    /// Kind tag of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::MainTitle { .. } => BlockKind::MainTitle,
            Block::SectionHeader { .. } => BlockKind::SectionHeader,
            Block::SubsectionHeader { .. } => BlockKind::SubsectionHeader,
            Block::Callout { .. } => BlockKind::Callout,
            Block::LabeledField { .. } => BlockKind::LabeledField,
            Block::OrderedItem { .. } => BlockKind::OrderedItem,
            Block::RomanItem { .. } => BlockKind::RomanItem,
            Block::BulletItem { .. } => BlockKind::BulletItem,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::Table { .. } => BlockKind::TableBlock,
            Block::ImagePlaceholder => BlockKind::ImagePlaceholder,
        }
    }

    /// Heading depth, if this block is a heading.
    pub fn level(&self) -> Option<u8> {
        match self {
            Block::MainTitle { .. } => Some(1),
            Block::SectionHeader { .. } => Some(2),
            Block::SubsectionHeader { .. } => Some(3),
            _ => None,
        }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.level().is_some()
    }

    /// Primary text of the block, when it has a single one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::MainTitle { text }
            | Block::SectionHeader { text }
            | Block::SubsectionHeader { text }
            | Block::OrderedItem { text, .. }
            | Block::RomanItem { text, .. }
            | Block::BulletItem { text }
            | Block::Paragraph { text } => Some(text),
            Block::LabeledField { value, .. } => Some(value),
            Block::Callout { lines, .. } => lines.first().map(String::as_str),
            Block::Table { .. } | Block::ImagePlaceholder => None,
        }
    }
}

/// Kind tag for a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    MainTitle,
    SectionHeader,
    SubsectionHeader,
    Callout,
    LabeledField,
    OrderedItem,
    RomanItem,
    BulletItem,
    Paragraph,
    TableBlock,
    ImagePlaceholder,
}

/// Callout flavor derived from its label token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    Note,
    Important,
    Warning,
    Tip,
    Caution,
    /// A label configured in the profile that has no dedicated kind
    Other,
}

impl CalloutKind {
    /// Map a label token (case-insensitive) to its kind.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "NOTE" => CalloutKind::Note,
            "IMPORTANT" => CalloutKind::Important,
            "WARNING" => CalloutKind::Warning,
            "TIP" => CalloutKind::Tip,
            "CAUTION" => CalloutKind::Caution,
            _ => CalloutKind::Other,
        }
    }
}
