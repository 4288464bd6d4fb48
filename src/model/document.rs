//! Document-level types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Block, BlockKind};
use crate::error::Error;

/// Top-level conversion strategy chosen once per document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentVariant {
    /// Manuals and guides handled by the standard scanner
    #[default]
    Standard,
    /// Step-by-step guides with multi-line titles and a table of contents
    HowTo,
    /// Release and patch notes built around tables
    Table,
}

impl DocumentVariant {
    /// All variants in dispatch order.
    pub const ALL: [DocumentVariant; 3] = [
        DocumentVariant::Standard,
        DocumentVariant::HowTo,
        DocumentVariant::Table,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentVariant::Standard => "standard",
            DocumentVariant::HowTo => "howto",
            DocumentVariant::Table => "table",
        }
    }
}

impl fmt::Display for DocumentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(DocumentVariant::Standard),
            "howto" | "how-to" => Ok(DocumentVariant::HowTo),
            "table" | "release" => Ok(DocumentVariant::Table),
            other => Err(Error::Config(format!("unknown document variant: {other}"))),
        }
    }
}

/// A reconstructed document: ordered blocks plus a generated footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Strategy that produced the blocks
    pub variant: DocumentVariant,

    /// Blocks in output order
    pub blocks: Vec<Block>,

    /// Footer appended after all content
    pub footer: Option<String>,
}

impl Document {
    /// Create an empty document for the given variant.
    pub fn new(variant: DocumentVariant) -> Self {
        Self {
            variant,
            blocks: Vec::new(),
            footer: None,
        }
    }

    /// Set the footer.
    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer;
        self
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Text of the main title, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::MainTitle { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of blocks of the given kind.
    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| b.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!("HowTo".parse::<DocumentVariant>().unwrap(), DocumentVariant::HowTo);
        assert_eq!("release".parse::<DocumentVariant>().unwrap(), DocumentVariant::Table);
        assert!("poster".parse::<DocumentVariant>().is_err());
        for variant in DocumentVariant::ALL {
            assert_eq!(variant.as_str().parse::<DocumentVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_document_title_and_counts() {
        let mut doc = Document::new(DocumentVariant::Standard);
        assert!(doc.is_empty());
        doc.push(Block::heading("Guide", 1));
        doc.push(Block::paragraph("a"));
        doc.push(Block::paragraph("b"));

        assert_eq!(doc.title(), Some("Guide"));
        assert_eq!(doc.count(BlockKind::Paragraph), 2);
    }
}
