//! One conversion strategy per document variant.

use crate::error::Result;
use crate::model::{Block, DocumentVariant, Line};
use crate::parser::{Classifier, ScanOptions};

use super::{ContentSource, Pipeline};

/// Builds the blocks of one document variant.
pub trait VariantStrategy: Send + Sync {
    /// Variant this strategy handles.
    fn variant(&self) -> DocumentVariant;

    /// Classify normalized lines into blocks.
    ///
    /// `source` is consulted again only by strategies that need page geometry.
    fn blocks(&self, pipeline: &Pipeline, lines: &[Line], source: &dyn ContentSource) -> Result<Vec<Block>>;
}

/// Manuals and guides.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStrategy;

impl VariantStrategy for StandardStrategy {
    fn variant(&self) -> DocumentVariant {
        DocumentVariant::Standard
    }

    fn blocks(&self, pipeline: &Pipeline, lines: &[Line], _source: &dyn ContentSource) -> Result<Vec<Block>> {
        Ok(Classifier::new(pipeline.rules(), pipeline.profile()).classify(lines))
    }
}

/// Step-by-step guides with multi-line titles and a table of contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HowToStrategy;

impl VariantStrategy for HowToStrategy {
    fn variant(&self) -> DocumentVariant {
        DocumentVariant::HowTo
    }

    fn blocks(&self, pipeline: &Pipeline, lines: &[Line], _source: &dyn ContentSource) -> Result<Vec<Block>> {
        let options = ScanOptions::howto(pipeline.profile());
        Ok(Classifier::new(pipeline.rules(), pipeline.profile())
            .with_options(options)
            .classify(lines))
    }
}

/// Release and patch notes built around tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableStrategy;

impl VariantStrategy for TableStrategy {
    fn variant(&self) -> DocumentVariant {
        DocumentVariant::Table
    }

    fn blocks(&self, pipeline: &Pipeline, lines: &[Line], source: &dyn ContentSource) -> Result<Vec<Block>> {
        let router = pipeline.router();
        let (preamble, sections) = router.split_sections(lines);
        let mut blocks = Classifier::new(pipeline.rules(), pipeline.profile()).classify(&preamble);

        let pages = source.pages()?;
        log::debug!(
            "table document: {} sections, {} pages of geometry",
            sections.len(),
            pages.len()
        );
        blocks.extend(router.route(&sections, &pages));
        Ok(blocks)
    }
}

static STRATEGIES: [&dyn VariantStrategy; 3] = [&StandardStrategy, &HowToStrategy, &TableStrategy];

/// Strategy registered for a variant.
pub fn strategy_for(variant: DocumentVariant) -> &'static dyn VariantStrategy {
    STRATEGIES
        .iter()
        .copied()
        .find(|s| s.variant() == variant)
        .unwrap_or(&StandardStrategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConversionInput, ConvertOptions};
    use crate::model::{BlockKind, DrawOp, PageContent};
    use crate::profile::DocumentProfile;

    fn pipeline() -> Pipeline {
        Pipeline::new(DocumentProfile::default(), ConvertOptions::default()).unwrap()
    }

    #[test]
    fn test_every_variant_has_a_strategy() {
        for variant in DocumentVariant::ALL {
            assert_eq!(strategy_for(variant).variant(), variant);
        }
    }

    #[test]
    fn test_standard_ignores_geometry() {
        struct NoPages;
        impl ContentSource for NoPages {
            fn text(&self) -> Result<String> {
                Ok(String::new())
            }
            fn pages(&self) -> Result<Vec<PageContent>> {
                Err(crate::Error::ExtractionFailed("pages not available".into()))
            }
        }
        let lines = Line::split("Plain words here.");
        let blocks = StandardStrategy.blocks(&pipeline(), &lines, &NoPages).unwrap();
        assert_eq!(blocks, vec![Block::paragraph("Plain words here.")]);
    }

    #[test]
    fn test_table_strategy_uses_geometry() {
        let mut page = PageContent::new(1);
        for x in [0.0, 100.0, 300.0] {
            page = page.op(DrawOp::Rect {
                x,
                y: 0.0,
                width: 0.5,
                height: 40.0,
            });
        }
        for y in [0.0, 20.0, 40.0] {
            page = page.op(DrawOp::Rect {
                x: 0.0,
                y,
                width: 300.0,
                height: 0.5,
            });
        }
        let page = page
            .text("Feature", 5.0, 30.0)
            .text("Description", 105.0, 30.0)
            .text("VPN", 5.0, 10.0)
            .text("Secure tunnel", 105.0, 10.0);

        let lines = Line::split("release notes\n\nNew Features\nFeature Description\nVPN Secure tunnel");
        let source = ConversionInput::new("").with_pages(vec![page]);
        let blocks = TableStrategy.blocks(&pipeline(), &lines, &source).unwrap();

        let kinds: Vec<BlockKind> = blocks.iter().map(Block::kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Paragraph, BlockKind::SectionHeader, BlockKind::TableBlock]
        );
        let Block::Table { table } = &blocks[2] else {
            panic!("expected a table");
        };
        assert_eq!(table.body().len(), 1);
        assert_eq!(table.rows[1].texts(), vec!["VPN", "Secure tunnel"]);
    }
}
