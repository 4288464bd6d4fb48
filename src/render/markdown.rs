//! Markdown rendering for classified documents.

use crate::model::{Block, BlockKind, Document, ImageRef, Table, TableRow};

use super::emphasis::{collapse_blank_lines, Emphasis};
use super::images::{ImageCursor, Slot};
use super::{ExtractionStats, RenderOptions, RenderResult};

/// Convert a document to Markdown without the bolding pass.
pub fn to_markdown(doc: &Document, images: &[ImageRef], options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc, images)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(
    doc: &Document,
    images: &[ImageRef],
    options: &RenderOptions,
) -> RenderResult {
    MarkdownRenderer::new(options.clone()).render_with_stats(doc, images)
}

/// Markdown renderer.
///
/// Blocks are emitted in order. Every [`Block::ImagePlaceholder`] takes the
/// next slot of the image list; images left over at the end are appended
/// before the footer.
pub struct MarkdownRenderer<'a> {
    options: RenderOptions,
    emphasis: Option<&'a Emphasis>,
    stats: ExtractionStats,
}

impl<'a> MarkdownRenderer<'a> {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            emphasis: None,
            stats: ExtractionStats::new(),
        }
    }

    /// Use a compiled bolding pass; it runs when `options.emphasis` is set.
    pub fn with_emphasis(mut self, emphasis: &'a Emphasis) -> Self {
        self.emphasis = Some(emphasis);
        self
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document, images: &[ImageRef]) -> String {
        self.render_internal(doc, images)
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, doc: &Document, images: &[ImageRef]) -> RenderResult {
        self.options.collect_stats = true;
        let content = self.render_internal(doc, images);
        self.stats.count_text(&content);
        RenderResult::new(content, self.stats)
    }

    fn render_internal(&mut self, doc: &Document, images: &[ImageRef]) -> String {
        let mut output = String::new();
        let mut previous: Option<BlockKind> = None;
        let mut cursor = ImageCursor::new(images);

        for block in &doc.blocks {
            if self.options.collect_stats {
                self.stats.add_block(block);
            }
            let rendered = match block {
                Block::ImagePlaceholder => match cursor.next_slot() {
                    Slot::Image(image) => {
                        self.stats.add_image();
                        image.to_markdown()
                    }
                    Slot::Suppressed(_) => {
                        self.stats.add_suppressed_image();
                        continue;
                    }
                    Slot::Exhausted => continue,
                },
                _ => self.render_block(block),
            };
            if rendered.is_empty() {
                continue;
            }
            push_block(&mut output, &mut previous, block.kind(), &rendered);
        }

        for image in cursor.drain() {
            if image.suppressed {
                self.stats.add_suppressed_image();
                continue;
            }
            self.stats.add_appended_image();
            push_block(&mut output, &mut previous, BlockKind::ImagePlaceholder, &image.to_markdown());
        }

        if self.options.include_footer {
            if let Some(footer) = doc.footer.as_deref().filter(|f| !f.trim().is_empty()) {
                push_block(&mut output, &mut previous, BlockKind::Paragraph, footer);
            }
        }

        let mut output = collapse_blank_lines(&output);
        if self.options.emphasis {
            if let Some(emphasis) = self.emphasis {
                output = emphasis.apply(&output);
            }
        }
        output.trim().to_string()
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::MainTitle { text } => format!("# {}", self.escape(text)),
            Block::SectionHeader { text } => format!("## {}", self.escape(text)),
            Block::SubsectionHeader { text } => format!("### {}", self.escape(text)),
            Block::Callout { label, lines, .. } => self.render_callout(label, lines),
            Block::LabeledField { label, value } => {
                if value.trim().is_empty() {
                    format!("**{}:**", label)
                } else {
                    format!("**{}:** {}", label, self.escape(value))
                }
            }
            Block::OrderedItem { number, text } => format!("{}. {}", number, self.escape(text)),
            Block::RomanItem {
                numeral,
                text,
                continuation,
            } => {
                let mut out = format!("**{})** {}", numeral, self.escape(text));
                if let Some(more) = continuation.as_deref().filter(|c| !c.trim().is_empty()) {
                    out.push_str("\n\n");
                    out.push_str(&self.escape(more));
                }
                out
            }
            Block::BulletItem { text } => format!("- {}", self.escape(text)),
            Block::Paragraph { text } => self.escape(text),
            Block::Table { table } => self.render_table(table),
            Block::ImagePlaceholder => String::new(),
        }
    }

    fn render_callout(&self, label: &str, lines: &[String]) -> String {
        let first = lines.first().map(|l| self.escape(l)).unwrap_or_default();
        let mut out = format!("> **{}:** {}", label, first).trim_end().to_string();
        for line in lines.iter().skip(1) {
            out.push('\n');
            if line.trim().is_empty() {
                out.push('>');
            } else {
                out.push_str("> ");
                out.push_str(&self.escape(line));
            }
        }
        out
    }

    /// Render a pipe table; every row gets the same number of cells.
    fn render_table(&self, table: &Table) -> String {
        if table.is_empty() {
            return String::new();
        }
        let width = table.column_count();
        let header_len = (table.header_rows as usize).clamp(1, table.rows.len());
        let header = &table.rows[0];
        let body = &table.rows[header_len..];
        let numbered = self.options.table_numbering
            && header.cells.first().map(|c| c.text.trim()) != Some("#");

        let mut lines = Vec::with_capacity(body.len() + 2);
        let mut head = row_cells(header, width);
        if numbered {
            head.insert(0, "#".to_string());
        }
        lines.push(pipe_row(&head));
        lines.push(pipe_row(&vec!["---".to_string(); head.len()]));

        for (i, row) in body.iter().enumerate() {
            let mut cells = row_cells(row, width);
            if numbered {
                cells.insert(0, (i + 1).to_string());
            }
            lines.push(pipe_row(&cells));
        }
        lines.join("\n")
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

fn is_list(kind: BlockKind) -> bool {
    matches!(kind, BlockKind::OrderedItem | BlockKind::BulletItem)
}

/// Append a rendered block; consecutive items of one list kind stay on
/// adjacent lines.
fn push_block(output: &mut String, previous: &mut Option<BlockKind>, kind: BlockKind, text: &str) {
    if let Some(prev) = *previous {
        output.push_str(if prev == kind && is_list(kind) { "\n" } else { "\n\n" });
    }
    output.push_str(text);
    *previous = Some(kind);
}

fn row_cells(row: &TableRow, width: usize) -> Vec<String> {
    (0..width)
        .map(|i| row.cells.get(i).map(|c| table_cell(&c.text)).unwrap_or_default())
        .collect()
}

fn table_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("<br>")
}

fn pipe_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Escape special Markdown characters.
/// Only characters that could be misread as inline syntax are escaped.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalloutKind, DocumentVariant};

    fn doc(blocks: Vec<Block>) -> Document {
        let mut doc = Document::new(DocumentVariant::Standard);
        doc.blocks = blocks;
        doc
    }

    fn plain() -> RenderOptions {
        RenderOptions::new().with_footer(false)
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_headings_and_paragraph() {
        let d = doc(vec![
            Block::heading("Guide", 1),
            Block::heading("Introduction", 2),
            Block::heading("Setup", 3),
            Block::paragraph("Body text."),
        ]);
        assert_eq!(
            to_markdown(&d, &[], &plain()),
            "# Guide\n\n## Introduction\n\n### Setup\n\nBody text."
        );
    }

    #[test]
    fn test_callout_form() {
        let d = doc(vec![Block::Callout {
            callout: CalloutKind::Note,
            label: "NOTE".into(),
            lines: vec!["careful here.".into(), "More detail.".into(), "".into(), "Tail.".into()],
        }]);
        assert_eq!(
            to_markdown(&d, &[], &plain()),
            "> **NOTE:** careful here.\n> More detail.\n>\n> Tail."
        );
    }

    #[test]
    fn test_labeled_field_and_roman() {
        let d = doc(vec![
            Block::LabeledField {
                label: "Mode".into(),
                value: "".into(),
            },
            Block::RomanItem {
                numeral: "i".into(),
                text: "Open the portal".into(),
                continuation: Some("Then sign in.".into()),
            },
        ]);
        assert_eq!(
            to_markdown(&d, &[], &plain()),
            "**Mode:**\n\n**i)** Open the portal\n\nThen sign in."
        );
    }

    #[test]
    fn test_list_items_on_adjacent_lines() {
        let d = doc(vec![
            Block::OrderedItem {
                number: "1".into(),
                text: "First step".into(),
            },
            Block::ImagePlaceholder,
            Block::OrderedItem {
                number: "2".into(),
                text: "Second step".into(),
            },
            Block::BulletItem { text: "a".into() },
            Block::BulletItem { text: "b".into() },
        ]);
        assert_eq!(
            to_markdown(&d, &[], &plain()),
            "1. First step\n2. Second step\n\n- a\n- b"
        );
    }

    #[test]
    fn test_images_follow_cursor_and_leftovers_append() {
        let images = vec![
            ImageRef::new(0, "/i/logo.png", "Diagram 1").suppressed(),
            ImageRef::new(1, "/i/a.png", "Diagram 2"),
            ImageRef::new(2, "/i/b.png", "Diagram 3"),
        ];
        let d = doc(vec![
            Block::paragraph("one"),
            Block::ImagePlaceholder,
            Block::paragraph("two"),
            Block::ImagePlaceholder,
        ])
        .with_footer(Some("---".into()));

        let result = to_markdown_with_stats(&d, &images, &RenderOptions::new());
        assert_eq!(
            result.content,
            "one\n\ntwo\n\n![Diagram 2](/i/a.png)\n\n![Diagram 3](/i/b.png)\n\n---"
        );
        assert_eq!(result.stats.images_suppressed, 1);
        assert_eq!(result.stats.images_rendered, 1);
        assert_eq!(result.stats.images_appended, 1);
    }

    #[test]
    fn test_table_numbered_and_rectangular() {
        let table = Table::from_rows(
            vec![
                vec!["Feature", "Description"],
                vec!["VPN", "Secure\ntunnel"],
                vec!["DNS"],
            ],
            true,
        );
        let md = to_markdown(&doc(vec![Block::Table { table }]), &[], &plain());
        assert_eq!(
            md,
            "| # | Feature | Description |\n| --- | --- | --- |\n\
             | 1 | VPN | Secure<br>tunnel |\n| 2 | DNS |  |"
        );
        for line in md.lines() {
            assert_eq!(line.matches('|').count(), 4);
        }
    }

    #[test]
    fn test_table_without_numbering_escapes_pipes() {
        let table = Table::from_rows(vec![vec!["Item"], vec!["a|b"]], true);
        let options = plain().with_table_numbering(false);
        let md = to_markdown(&doc(vec![Block::Table { table }]), &[], &options);
        assert_eq!(md, "| Item |\n| --- |\n| a\\|b |");
    }

    #[test]
    fn test_empty_document_renders_footer_only() {
        let d = doc(vec![]).with_footer(Some("© 2025 Example".into()));
        assert_eq!(to_markdown(&d, &[], &RenderOptions::new()), "© 2025 Example");
        assert_eq!(to_markdown(&d, &[], &plain()), "");
    }

    #[test]
    fn test_emphasis_runs_when_enabled() {
        let profile = crate::profile::DocumentProfile::default().with_emphasis_keywords(["BrinkAgent"]);
        let emphasis = Emphasis::new(&profile).unwrap();
        let d = doc(vec![Block::paragraph("Start BrinkAgent.")]);

        let md = MarkdownRenderer::new(plain()).with_emphasis(&emphasis).render(&d, &[]);
        assert_eq!(md, "Start **BrinkAgent**.");
        let md = MarkdownRenderer::new(plain().with_emphasis(false))
            .with_emphasis(&emphasis)
            .render(&d, &[]);
        assert_eq!(md, "Start BrinkAgent.");
    }
}
