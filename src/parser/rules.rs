//! Line classification rules.
//!
//! Rules are an ordered table of `(kind, predicate)` pairs evaluated top to
//! bottom; the first predicate that accepts a line decides its kind. Lines no
//! rule accepts are paragraph text. The same table, minus labeled fields,
//! answers whether a line starts a new section, which is what ends greedy
//! continuation of callouts and list items.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{compile, Result};
use crate::model::{CalloutKind, Line};
use crate::profile::{ClassifierThresholds, DocumentProfile};

use super::normalizer::literal_pattern;

/// Structural kind a single line can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    MainTitle,
    SectionHeader,
    SubsectionHeader,
    Callout,
    LabeledField,
    OrderedItem,
    RomanItem,
    BulletItem,
}

type Predicate = fn(&RuleSet, &LineContext<'_>) -> bool;

/// One entry of the rule table.
pub struct Rule {
    /// Kind assigned when the predicate matches
    pub kind: LineKind,
    /// Whether a match ends a callout or list continuation
    pub boundary: bool,
    predicate: Predicate,
}

/// The rule table, in priority order.
static RULES: [Rule; 8] = [
    Rule {
        kind: LineKind::MainTitle,
        boundary: true,
        predicate: is_main_title,
    },
    Rule {
        kind: LineKind::SectionHeader,
        boundary: true,
        predicate: is_section_header,
    },
    Rule {
        kind: LineKind::SubsectionHeader,
        boundary: true,
        predicate: is_subsection_header,
    },
    Rule {
        kind: LineKind::Callout,
        boundary: true,
        predicate: is_callout,
    },
    Rule {
        kind: LineKind::LabeledField,
        boundary: false,
        predicate: is_labeled_field,
    },
    Rule {
        kind: LineKind::OrderedItem,
        boundary: true,
        predicate: is_ordered_item,
    },
    Rule {
        kind: LineKind::RomanItem,
        boundary: true,
        predicate: is_roman_item,
    },
    Rule {
        kind: LineKind::BulletItem,
        boundary: true,
        predicate: is_bullet_item,
    },
];

/// A line together with the lines around it, for lookahead.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    lines: &'a [Line],
    pos: usize,
}

impl<'a> LineContext<'a> {
    /// Context for `lines[pos]`; `pos` must be in range.
    pub fn new(lines: &'a [Line], pos: usize) -> Self {
        debug_assert!(pos < lines.len());
        Self { lines, pos }
    }

    pub fn line(&self) -> &'a Line {
        &self.lines[self.pos]
    }

    pub fn text(&self) -> &'a str {
        self.line().text()
    }

    /// The next line after this one that holds text.
    pub fn next_non_blank(&self) -> Option<&'a Line> {
        self.lines[self.pos + 1..].iter().find(|l| !l.is_blank())
    }
}

/// Parsed callout label line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutParts {
    pub kind: CalloutKind,
    /// Label as written, including any parenthetical qualifier
    pub label: String,
    /// Text after the colon
    pub rest: String,
}

/// Compiled rules for one profile.
#[derive(Debug, Clone)]
pub struct RuleSet {
    thresholds: ClassifierThresholds,
    titles: Vec<Regex>,
    sections: HashSet<String>,
    callout: Option<Regex>,
    labeled: Regex,
    ordered: Regex,
    roman: Regex,
    continued: Regex,
    figure: Regex,
    toc_entry: Regex,
    bullet_markers: Vec<String>,
}

impl RuleSet {
    /// Compile the rules for a profile.
    pub fn new(profile: &DocumentProfile) -> Result<Self> {
        let mut titles = profile
            .titles
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| compile(&format!("^{}$", literal_pattern(t))))
            .collect::<Result<Vec<_>>>()?;
        for pattern in &profile.title_patterns {
            titles.push(compile(pattern)?);
        }

        let labels: Vec<String> = profile
            .callout_labels
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| regex::escape(l.trim()))
            .collect();
        let callout = if labels.is_empty() {
            None
        } else {
            Some(compile(&format!(
                r"(?i)^({})(\s*\([^)]+\))?:\s*(.*)$",
                labels.join("|")
            ))?)
        };

        Ok(Self {
            thresholds: profile.thresholds.clone(),
            titles,
            sections: profile
                .section_names
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
            callout,
            labeled: compile(r"^([A-Z][a-zA-Z\s]{2,30}):\s*(.*)$")?,
            ordered: compile(r"^(\d+)[.)]\s+(.+)$")?,
            roman: compile(r"^([ivxIVX]+)\)\s+(.+)$")?,
            continued: compile(r"(?i)^(.+?)\s*-\s*Continued$")?,
            figure: compile(r"(?i)^fig(?:ure|\.)?\s*\d+\s*[:.]")?,
            toc_entry: compile(r"^\S.*?(?:\.{2,}|\x{2026}+|\s)\s*\d{1,4}$")?,
            bullet_markers: profile
                .bullet_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// The rule table in priority order.
    pub fn rules() -> &'static [Rule] {
        &RULES
    }

    /// Classify a line; `None` means paragraph text.
    pub fn classify(&self, ctx: &LineContext<'_>) -> Option<LineKind> {
        if ctx.line().is_blank() {
            return None;
        }
        RULES
            .iter()
            .find(|rule| (rule.predicate)(self, ctx))
            .map(|rule| rule.kind)
    }

    /// Check if a line would start a new section.
    ///
    /// Every boundary rule is tested on its own, so a line shadowed by an
    /// earlier non-boundary rule still counts.
    pub fn is_boundary(&self, ctx: &LineContext<'_>) -> bool {
        !ctx.line().is_blank()
            && RULES
                .iter()
                .filter(|rule| rule.boundary)
                .any(|rule| (rule.predicate)(self, ctx))
    }

    /// Check a single rule.
    pub fn matches(&self, kind: LineKind, ctx: &LineContext<'_>) -> bool {
        RULES
            .iter()
            .find(|rule| rule.kind == kind)
            .is_some_and(|rule| (rule.predicate)(self, ctx))
    }

    /// Title test without the positional window.
    pub fn looks_like_title(&self, text: &str) -> bool {
        if self.titles.iter().any(|re| re.is_match(text)) {
            return true;
        }
        let t = &self.thresholds;
        let len = text.chars().count();
        if len > t.title_min_len && len < t.title_max_len {
            let (upper, letters) = letter_counts(text);
            return letters > 0 && upper as f32 / letters as f32 > t.title_upper_ratio;
        }
        false
    }

    /// Check a line against the section vocabulary only.
    pub fn is_known_section(&self, text: &str) -> bool {
        self.sections.contains(&text.trim().to_lowercase())
    }

    pub fn parse_callout(&self, text: &str) -> Option<CalloutParts> {
        let caps = self.callout.as_ref()?.captures(text)?;
        let token = caps.get(1)?.as_str();
        let qualifier = caps.get(2).map_or("", |m| m.as_str());
        Some(CalloutParts {
            kind: CalloutKind::from_label(token),
            label: format!("{token}{qualifier}"),
            rest: caps.get(3).map_or("", |m| m.as_str()).trim().to_string(),
        })
    }

    /// Split `Label: value`, applying the false-positive filters.
    pub fn parse_labeled_field(&self, text: &str) -> Option<(String, String)> {
        if text.contains(" the ")
            || text.contains(" is ")
            || text.chars().count() >= self.thresholds.label_max_len
        {
            return None;
        }
        let caps = self.labeled.captures(text)?;
        Some((
            caps.get(1)?.as_str().to_string(),
            caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
        ))
    }

    /// Split `N. text` / `N) text` into number and text.
    pub fn parse_ordered(&self, text: &str) -> Option<(String, String)> {
        let caps = self.ordered.captures(text)?;
        Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().trim().to_string()))
    }

    /// Split `iv) text` into numeral and text.
    pub fn parse_roman(&self, text: &str) -> Option<(String, String)> {
        let caps = self.roman.captures(text)?;
        Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().trim().to_string()))
    }

    pub fn is_roman_marker(&self, text: &str) -> bool {
        self.roman.is_match(text)
    }

    /// Text of a bullet line without its marker.
    ///
    /// ASCII markers such as `-` need whitespace after them; glyph markers do not.
    pub fn strip_bullet<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.bullet_markers.iter().find_map(|marker| {
            let rest = text.strip_prefix(marker.as_str())?;
            if marker.is_ascii() && !rest.starts_with(char::is_whitespace) {
                return None;
            }
            Some(rest.trim_start())
        })
    }

    /// Remove a trailing `- Continued` marker.
    pub fn strip_continued<'t>(&self, text: &'t str) -> &'t str {
        self.continued
            .captures(text)
            .and_then(|c| c.get(1))
            .map_or(text, |m| m.as_str())
    }

    pub fn is_figure_caption(&self, text: &str) -> bool {
        self.figure.is_match(text)
    }

    /// Table-of-contents entry: text ending in a page number, usually after dot leaders.
    pub fn is_toc_entry(&self, text: &str) -> bool {
        self.toc_entry.is_match(text)
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }
}

/// Count ASCII uppercase letters and ASCII letters.
fn letter_counts(text: &str) -> (usize, usize) {
    text.chars()
        .filter(char::is_ascii_alphabetic)
        .fold((0, 0), |(upper, letters), c| {
            (upper + usize::from(c.is_ascii_uppercase()), letters + 1)
        })
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn is_main_title(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    ctx.line().index < rules.thresholds.title_window && rules.looks_like_title(ctx.text())
}

fn is_section_header(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    let text = ctx.text();
    if text.chars().count() > rules.thresholds.section_max_len {
        return false;
    }
    if rules.is_known_section(text) {
        return true;
    }
    let (upper, letters) = letter_counts(text);
    letters > rules.thresholds.section_min_letters
        && upper as f32 / letters as f32 > rules.thresholds.section_upper_ratio
}

fn is_subsection_header(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    let text = ctx.text();
    let t = &rules.thresholds;
    let len = text.chars().count();
    if len > t.section_max_len {
        return false;
    }
    if rules.continued.is_match(text) {
        return true;
    }

    let mut chars = text.chars();
    let title_case = matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_ascii_uppercase() && b.is_ascii_lowercase()
    );
    if !title_case || len >= t.subsection_max_len || text.ends_with('.') || text.ends_with(',') {
        return false;
    }

    ctx.next_non_blank()
        .is_some_and(|next| next.char_len() > t.subsection_min_next_len)
}

fn is_callout(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    rules.callout.as_ref().is_some_and(|re| re.is_match(ctx.text()))
}

fn is_labeled_field(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    rules.parse_labeled_field(ctx.text()).is_some()
}

fn is_ordered_item(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    rules.ordered.is_match(ctx.text())
}

fn is_roman_item(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    rules.roman.is_match(ctx.text())
}

fn is_bullet_item(rules: &RuleSet, ctx: &LineContext<'_>) -> bool {
    rules.strip_bullet(ctx.text()).is_some()
}
