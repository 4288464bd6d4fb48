//! Single-pass document structure scanner.
//!
//! The scanner walks normalized lines once, top to bottom, keeping one piece
//! of mutable state (the paragraph accumulator) and using the line cursor for
//! continuation lookahead. Image placeholders are emitted at the structural
//! trigger points configured in the profile; they are resolved against the
//! image list only at render time.

use crate::model::{Block, Line};
use crate::profile::DocumentProfile;

use super::cursor::LineCursor;
use super::rules::{LineContext, LineKind, RuleSet};

/// Scanner behavior that differs between document variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Join consecutive title-like lines at the top into one title
    pub multiline_titles: bool,
    /// Drop a table of contents and its entries
    pub skip_toc: bool,
    /// Turn the first subsection header into the title when none was found
    pub promote_first_subsection: bool,
    /// Sections (lowercase) where list markers trigger images; empty = everywhere
    pub tracked_sections: Vec<String>,
}

impl ScanOptions {
    /// Options for manuals and guides.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Options for step-by-step how-to guides.
    pub fn howto(profile: &DocumentProfile) -> Self {
        Self {
            multiline_titles: true,
            skip_toc: true,
            promote_first_subsection: true,
            tracked_sections: profile
                .howto
                .tracked_sections
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
        }
    }
}

/// Mutable scan state.
#[derive(Debug, Default)]
struct ScanState {
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    title_seen: bool,
    section: Option<String>,
}

impl ScanState {
    /// Emit the accumulated paragraph, if any.
    fn flush(&mut self) {
        if !self.paragraph.is_empty() {
            let text = self.paragraph.join(" ");
            self.paragraph.clear();
            self.blocks.push(Block::paragraph(text));
        }
    }

    fn push(&mut self, block: Block) {
        self.flush();
        self.blocks.push(block);
    }
}

/// Line classifier producing the block sequence of one document.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    rules: &'a RuleSet,
    profile: &'a DocumentProfile,
    options: ScanOptions,
}

impl<'a> Classifier<'a> {
    /// Create a standard classifier.
    pub fn new(rules: &'a RuleSet, profile: &'a DocumentProfile) -> Self {
        Self {
            rules,
            profile,
            options: ScanOptions::standard(),
        }
    }

    /// Set the scan options.
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Classify all lines into blocks.
    pub fn classify(&self, lines: &[Line]) -> Vec<Block> {
        let mut cursor = LineCursor::new(lines);
        let mut state = ScanState::default();

        while let Some(ctx) = cursor.peek_context() {
            let line = ctx.line();
            if line.is_blank() {
                state.flush();
                cursor.advance();
                continue;
            }

            let text = line.text();
            if self.options.skip_toc && self.is_toc_heading(text) {
                state.flush();
                self.skip_toc(&mut cursor);
                continue;
            }

            match self.rules.classify(&ctx) {
                Some(LineKind::MainTitle) => {
                    cursor.advance();
                    let title = if self.options.multiline_titles {
                        self.merge_title_lines(text, &mut cursor)
                    } else {
                        text.to_string()
                    };
                    state.title_seen = true;
                    state.push(Block::MainTitle { text: title });
                }
                Some(LineKind::SectionHeader) => {
                    cursor.advance();
                    state.section = Some(text.to_lowercase());
                    state.push(Block::SectionHeader {
                        text: text.to_string(),
                    });
                    if self.triggers_after_section(text) {
                        state.push(Block::ImagePlaceholder);
                    }
                }
                Some(LineKind::SubsectionHeader) => {
                    cursor.advance();
                    let clean = self.rules.strip_continued(text).to_string();
                    state.section = Some(clean.to_lowercase());
                    if self.options.promote_first_subsection && !state.title_seen {
                        log::debug!("promoting `{clean}` to document title");
                        state.title_seen = true;
                        state.push(Block::MainTitle { text: clean });
                    } else {
                        state.push(Block::SubsectionHeader { text: clean });
                    }
                }
                Some(LineKind::Callout) => self.scan_callout(&ctx, &mut cursor, &mut state),
                Some(LineKind::LabeledField) => {
                    cursor.advance();
                    if let Some((label, value)) = self.rules.parse_labeled_field(text) {
                        state.push(Block::LabeledField { label, value });
                    }
                }
                Some(LineKind::OrderedItem) => self.scan_ordered(text, &mut cursor, &mut state),
                Some(LineKind::RomanItem) => self.scan_roman(text, &mut cursor, &mut state),
                Some(LineKind::BulletItem) => {
                    cursor.advance();
                    let item = self.rules.strip_bullet(text).unwrap_or(text);
                    state.push(Block::BulletItem {
                        text: item.to_string(),
                    });
                }
                None => {
                    cursor.advance();
                    state.paragraph.push(text.to_string());
                }
            }

            if self.profile.image_triggers.after_figure_captions && self.rules.is_figure_caption(text) {
                state.push(Block::ImagePlaceholder);
            }
        }

        state.flush();
        state.blocks
    }

    fn scan_callout(&self, ctx: &LineContext<'_>, cursor: &mut LineCursor<'_>, state: &mut ScanState) {
        cursor.advance();
        let Some(parts) = self.rules.parse_callout(ctx.text()) else {
            state.paragraph.push(ctx.text().to_string());
            return;
        };
        let mut lines = vec![parts.rest];
        lines.extend(cursor.take_continuation(self.rules, &self.profile.callout_policy, |_| false));
        state.push(Block::Callout {
            callout: parts.kind,
            label: parts.label,
            lines,
        });
    }

    fn scan_ordered(&self, text: &str, cursor: &mut LineCursor<'_>, state: &mut ScanState) {
        cursor.advance();
        let Some((number, first)) = self.rules.parse_ordered(text) else {
            state.paragraph.push(text.to_string());
            return;
        };
        let rest = cursor.take_continuation(self.rules, &self.profile.list_policy, |_| false);
        state.push(Block::OrderedItem {
            number,
            text: join_words(std::iter::once(first).chain(rest)),
        });
        if self.profile.image_triggers.after_ordered_items && self.in_tracked_section(state) {
            state.push(Block::ImagePlaceholder);
        }
    }

    fn scan_roman(&self, text: &str, cursor: &mut LineCursor<'_>, state: &mut ScanState) {
        cursor.advance();
        let Some((numeral, first)) = self.rules.parse_roman(text) else {
            state.paragraph.push(text.to_string());
            return;
        };
        if self.profile.image_triggers.before_roman_start
            && numeral.eq_ignore_ascii_case("i")
            && self.in_tracked_section(state)
        {
            state.push(Block::ImagePlaceholder);
        }
        let rest = cursor.take_continuation(self.rules, &self.profile.list_policy, |t| {
            self.rules.is_roman_marker(t)
        });
        let continuation = join_words(rest);
        state.push(Block::RomanItem {
            numeral,
            text: first,
            continuation: (!continuation.is_empty()).then_some(continuation),
        });
    }

    /// Append following title-like lines to the title.
    fn merge_title_lines(&self, first: &str, cursor: &mut LineCursor<'_>) -> String {
        let mut title = first.to_string();
        while let Some(ctx) = cursor.peek_context() {
            if !self.is_title_continuation(&ctx) {
                break;
            }
            title.push(' ');
            title.push_str(ctx.text());
            cursor.advance();
        }
        title
    }

    fn is_title_continuation(&self, ctx: &LineContext<'_>) -> bool {
        let line = ctx.line();
        let t = self.rules.thresholds();
        let text = line.text();
        if line.is_blank()
            || line.index >= t.title_window
            || line.char_len() >= t.title_max_len
            || text.ends_with(['.', ',', ':', ';'])
            || !text.starts_with(|c: char| c.is_uppercase())
            || self.is_toc_heading(text)
        {
            return false;
        }
        matches!(
            self.rules.classify(ctx),
            None | Some(LineKind::MainTitle) | Some(LineKind::SubsectionHeader)
        )
    }

    fn is_toc_heading(&self, text: &str) -> bool {
        let text = text.trim_end_matches(':').trim();
        self.profile
            .howto
            .toc_headings
            .iter()
            .any(|h| h.eq_ignore_ascii_case(text))
    }

    fn skip_toc(&self, cursor: &mut LineCursor<'_>) {
        cursor.advance();
        let mut skipped = 0usize;
        while let Some(line) = cursor.peek() {
            if !line.is_blank() && !self.rules.is_toc_entry(line.text()) {
                break;
            }
            skipped += usize::from(!line.is_blank());
            cursor.advance();
        }
        log::debug!("skipped table of contents with {skipped} entries");
    }

    fn triggers_after_section(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.profile
            .image_triggers
            .after_sections
            .iter()
            .any(|s| !s.is_empty() && lower.contains(&s.to_lowercase()))
    }

    fn in_tracked_section(&self, state: &ScanState) -> bool {
        let tracked = &self.options.tracked_sections;
        tracked.is_empty()
            || state
                .section
                .as_deref()
                .is_some_and(|current| tracked.iter().any(|t| current.contains(t.as_str())))
    }
}

/// Join non-empty fragments with single spaces.
fn join_words<I>(parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
