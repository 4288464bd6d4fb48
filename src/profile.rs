//! Document-family configuration.
//!
//! Every vocabulary list, boilerplate pattern and threshold the pipeline
//! relies on lives in [`DocumentProfile`]. The default profile describes the
//! built-in family of manuals, guides and release notes; another family can be
//! targeted by loading a JSON profile. Fields missing from the JSON keep their
//! default values.
//!
//! # Example
//!
//! ```
//! use docmark::profile::DocumentProfile;
//!
//! let profile = DocumentProfile::from_json_str(r#"{ "section_names": ["Overview"] }"#).unwrap();
//! assert_eq!(profile.section_names, vec!["Overview".to_string()]);
//! assert!(!profile.callout_labels.is_empty());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ImageFilter;

/// Vocabulary, patterns and thresholds for one family of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentProfile {
    /// Human-readable profile name
    pub name: String,

    /// Known main titles, matched case-insensitively as whole lines
    pub titles: Vec<String>,

    /// Additional main-title regexes
    pub title_patterns: Vec<String>,

    /// Titles whose later occurrences are stripped from the body
    pub dedupe_titles: Vec<String>,

    /// Known section names, matched case-insensitively as whole lines
    pub section_names: Vec<String>,

    /// Recurring headings kept only on their first occurrence
    pub dedupe_headings: Vec<String>,

    /// Regexes removed from the raw text before line filtering
    pub boilerplate_patterns: Vec<String>,

    /// Regexes for whole lines (running headers, page numbers) that are dropped
    pub running_header_patterns: Vec<String>,

    /// Known mis-encoded sequences and their repairs
    pub replacements: Vec<Replacement>,

    /// Callout label tokens
    pub callout_labels: Vec<String>,

    /// Line prefixes that mark a bullet item
    pub bullet_markers: Vec<String>,

    /// Classifier length and ratio thresholds
    pub thresholds: ClassifierThresholds,

    /// When callout continuation stops
    pub callout_policy: ContinuationPolicy,

    /// When list-item continuation stops
    pub list_policy: ContinuationPolicy,

    /// Where images are placed
    pub image_triggers: ImageTriggers,

    /// Signals and behavior for the how-to variant
    pub howto: HowToSignals,

    /// Vocabulary for table documents
    pub table: TableVocabulary,

    /// Geometry thresholds for rule-based table detection
    pub geometry: GeometryThresholds,

    /// Rules that mark decorative images as suppressed
    pub image_filter: ImageFilter,

    /// Phrases re-emphasized by the final bolding pass
    pub emphasis_keywords: Vec<String>,

    /// Footer lines appended to every document
    pub footer: Vec<String>,
}

impl DocumentProfile {
    /// Create the built-in profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a profile from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a profile from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the profile as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the section vocabulary.
    pub fn with_section_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.section_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the emphasis keyword vocabulary.
    pub fn with_emphasis_keywords<S: Into<String>>(
        mut self,
        keywords: impl IntoIterator<Item = S>,
    ) -> Self {
        self.emphasis_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the footer lines.
    pub fn with_footer<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.footer = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the callout continuation policy.
    pub fn with_callout_policy(mut self, policy: ContinuationPolicy) -> Self {
        self.callout_policy = policy;
        self
    }

    /// Set the list continuation policy.
    pub fn with_list_policy(mut self, policy: ContinuationPolicy) -> Self {
        self.list_policy = policy;
        self
    }

    /// Footer text as it appears in the output, or `None` when empty.
    pub fn footer_text(&self) -> Option<String> {
        if self.footer.is_empty() {
            None
        } else {
            Some(self.footer.join("\n\n"))
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for DocumentProfile {
    fn default() -> Self {
        Self {
            name: "cloudbrink-manuals".to_string(),
            titles: strings(&[
                "Bridge Mode User Guide",
                "App-Level QOE Analytics",
                "Cloudbrink Administrator Guide",
            ]),
            title_patterns: strings(&[r"(?i)^Cloudbrink\s+Administrator\s+Guide"]),
            dedupe_titles: strings(&["Bridge Mode User Guide"]),
            section_names: strings(&[
                "Introduction",
                "Prerequisites",
                "Bridge Mode Important Notes",
                "Bridge Mode User Config",
                "Use Cases",
                "Troubleshoot",
            ]),
            dedupe_headings: strings(&[
                "Bridge Mode User Config",
                "Introduction",
                "Prerequisites",
                "Bridge Mode Important Notes",
            ]),
            boilerplate_patterns: strings(&[
                r"(?i)Hybrid Access As A Service[ \t]*",
                r"(?is)©\s*\d{4}\s+Cloudbrink,?\s*Inc\..*?respective owners\.",
                r"(?is)Corporate Headquarters\s+Cloudbrink,?\s*Inc\.\s*\n.*?CA\s+\d{5}",
                r"(?i)530\s+Lakeside\s+Drive,?\s+Suite\s+190,?\s+Sunnyvale,?\s+CA\s+94085",
                r"(?im)\s*-\s*Continued\s*$",
            ]),
            running_header_patterns: strings(&[
                r"^.*?\|\s*\d+.*$",
                r"^\|\s*\d+[A-Za-z\s]*$",
                r"(?i)^(Cloudbrink\s+)?Software Defined Mobility$",
                r"(?i)^Page\s+\d+\s+of\s+\d+$",
                r"^\d+$",
            ]),
            replacements: vec![
                Replacement::new("â€™", "\u{2019}"),
                Replacement::new("â€˜", "\u{2018}"),
                Replacement::new("â€œ", "\u{201C}"),
                Replacement::new("â€\u{9D}", "\u{201D}"),
                Replacement::new("â€“", "\u{2013}"),
                Replacement::new("â€”", "\u{2014}"),
                Replacement::new("â€¢", "\u{2022}"),
                Replacement::new("â†’", "\u{2192}"),
                Replacement::new("Â©", "\u{00A9}"),
            ],
            callout_labels: strings(&["NOTE", "IMPORTANT", "WARNING", "TIP", "CAUTION"]),
            bullet_markers: strings(&["•", "●", "○", "-"]),
            thresholds: ClassifierThresholds::default(),
            callout_policy: ContinuationPolicy::default(),
            list_policy: ContinuationPolicy::default(),
            image_triggers: ImageTriggers::default(),
            howto: HowToSignals::default(),
            table: TableVocabulary::default(),
            geometry: GeometryThresholds::default(),
            image_filter: ImageFilter::default(),
            emphasis_keywords: strings(&["Bridge Mode", "BrinkAgent", "Admin Portal"]),
            footer: strings(&["---", "© 2025 Cloudbrink, Inc. All rights reserved."]),
        }
    }
}

/// A literal text repair applied during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Mis-encoded sequence
    pub from: String,
    /// Intended text
    pub to: String,
}

impl Replacement {
    /// Create a new replacement.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Length and ratio thresholds used by the line rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// Lines (by source index) eligible as the main title
    pub title_window: usize,
    /// Heuristic title length, exclusive lower bound
    pub title_min_len: usize,
    /// Heuristic title length, exclusive upper bound
    pub title_max_len: usize,
    /// Uppercase ratio a heuristic title must exceed
    pub title_upper_ratio: f32,
    /// Longest line accepted as any header
    pub section_max_len: usize,
    /// Uppercase ratio a heuristic section header must exceed
    pub section_upper_ratio: f32,
    /// Letters a heuristic section header must exceed
    pub section_min_letters: usize,
    /// Heuristic subsection length, exclusive upper bound
    pub subsection_max_len: usize,
    /// Length the following line must exceed for a subsection header
    pub subsection_min_next_len: usize,
    /// Labeled-field length, exclusive upper bound
    pub label_max_len: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            title_window: 5,
            title_min_len: 10,
            title_max_len: 60,
            title_upper_ratio: 0.3,
            section_max_len: 100,
            section_upper_ratio: 0.85,
            section_min_letters: 3,
            subsection_max_len: 80,
            subsection_min_next_len: 20,
            label_max_len: 50,
        }
    }
}

/// Termination rule for greedy continuation consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuationPolicy {
    /// Blank lines tolerated inside the block before it ends
    pub blank_lines_allowed: usize,
    /// End the block at a line that starts a new section
    pub stop_at_boundary: bool,
}

impl ContinuationPolicy {
    /// A policy tolerating `blank_lines_allowed` blank lines.
    pub fn tolerant(blank_lines_allowed: usize) -> Self {
        Self {
            blank_lines_allowed,
            ..Self::default()
        }
    }
}

impl Default for ContinuationPolicy {
    fn default() -> Self {
        Self {
            blank_lines_allowed: 0,
            stop_at_boundary: true,
        }
    }
}

/// Structural points at which the image cursor advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageTriggers {
    /// Section headers (substring, case-insensitive) followed by an image
    pub after_sections: Vec<String>,
    /// Place an image after every ordered item
    pub after_ordered_items: bool,
    /// Place an image before a roman list starting at `i)`
    pub before_roman_start: bool,
    /// Place an image after `Figure N:` captions
    pub after_figure_captions: bool,
}

impl Default for ImageTriggers {
    fn default() -> Self {
        Self {
            after_sections: strings(&["introduction"]),
            after_ordered_items: true,
            before_roman_start: true,
            after_figure_captions: true,
        }
    }
}

/// Signals that select the how-to variant and tune its scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HowToSignals {
    /// Substrings of image paths that mark a how-to document
    pub image_markers: Vec<String>,
    /// Headings that open a table of contents
    pub toc_headings: Vec<String>,
    /// Sections where ordered items trigger images (empty = everywhere)
    pub tracked_sections: Vec<String>,
}

impl Default for HowToSignals {
    fn default() -> Self {
        Self {
            image_markers: strings(&["howto", "how-to", "how_to"]),
            toc_headings: strings(&["Table of Contents", "Contents"]),
            tracked_sections: Vec::new(),
        }
    }
}

/// Vocabulary for recognizing and assembling table documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableVocabulary {
    /// Phrases anywhere in the text that mark a table document
    pub detect_phrases: Vec<String>,
    /// Whole-line headings that mark a table document
    pub trigger_headings: Vec<String>,
    /// Headings that open a table section
    pub section_headings: Vec<String>,
    /// Words that make a row look like a header
    pub header_terms: Vec<String>,
    /// Header words that start an embedded second table
    pub split_terms: Vec<String>,
    /// Column names used when a table has no header row
    pub default_columns: Vec<String>,
    /// Header word-overlap ratio at which pages are merged
    pub header_similarity: f32,
}

impl Default for TableVocabulary {
    fn default() -> Self {
        Self {
            detect_phrases: strings(&["release notes", "release note", "patch notes"]),
            trigger_headings: strings(&["New Features", "Issues Resolved"]),
            section_headings: strings(&[
                "New Features",
                "Enhancements",
                "Issues Resolved",
                "Known Issues",
                "System Requirements",
            ]),
            header_terms: strings(&["feature", "item", "description", "requirement", "issue"]),
            split_terms: strings(&["requirement"]),
            default_columns: strings(&["Feature", "Description", "Requirement"]),
            header_similarity: 0.6,
        }
    }
}

/// Thresholds for turning drawing operators into table grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryThresholds {
    /// Rectangles thinner than this are rule segments
    pub rule_max_width: f32,
    /// Segments closer than this on one grid line are joined
    pub segment_join_gap: f32,
    /// Segments within this distance share a grid line
    pub position_tolerance: f32,
    /// Distance within which an outer boundary counts as present
    pub boundary_tolerance: f32,
    /// Vertical jump that starts a new line inside a cell
    pub cell_break_gap: f32,
}

impl Default for GeometryThresholds {
    fn default() -> Self {
        Self {
            rule_max_width: 2.0,
            segment_join_gap: 0.5,
            position_tolerance: 2.0,
            boundary_tolerance: 5.0,
            cell_break_gap: 5.0,
        }
    }
}
