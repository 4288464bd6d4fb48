//! Text normalization for raw extracted PDF text.
//!
//! Stages run in a fixed order because later patterns assume the earlier
//! cleanup already happened:
//!
//! 1. encoding repair (line endings, NBSP, bullet glyphs, mis-encoded sequences, NFC)
//! 2. boilerplate removal (profile patterns, then running-header lines)
//! 3. de-duplication of recurring headings and of the main title
//! 4. collapse of long blank-line runs
//!
//! No stage fails on content; a pattern that does not match leaves the text as is.

use std::collections::HashSet;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{compile, Result};
use crate::profile::{DocumentProfile, Replacement};

/// Glyphs that PDF fonts commonly emit in place of a bullet.
const BULLET_GLYPHS: &[char] = &['\u{2219}', '\u{25AA}', '\u{F0B7}', '\u{F0A7}', '\u{F076}'];

/// Text normalizer compiled from a [`DocumentProfile`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    replacements: Vec<Replacement>,
    boilerplate: Vec<Regex>,
    running_headers: Vec<Regex>,
    dedupe_headings: HashSet<String>,
    dedupe_titles: Vec<Regex>,
    blank_runs: Regex,
}

impl Normalizer {
    /// Compile the normalizer for a profile.
    pub fn new(profile: &DocumentProfile) -> Result<Self> {
        let boilerplate = profile
            .boilerplate_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;
        let running_headers = profile
            .running_header_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;
        let dedupe_titles = profile
            .dedupe_titles
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| compile(&literal_pattern(t)))
            .collect::<Result<Vec<_>>>()?;

        let mut replacements = profile.replacements.clone();
        // Longer sequences first so a shorter prefix never shadows them.
        replacements.sort_by(|a, b| b.from.len().cmp(&a.from.len()));

        Ok(Self {
            replacements,
            boilerplate,
            running_headers,
            dedupe_headings: profile
                .dedupe_headings
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect(),
            dedupe_titles,
            blank_runs: compile(r"\n(?:[ \t]*\n){3,}")?,
        })
    }

    /// Run all stages.
    pub fn normalize(&self, raw: &str) -> String {
        let text = self.repair_encoding(raw);
        let text = self.strip_boilerplate(&text);
        let text = self.dedupe_headings(&text);
        let text = self.dedupe_titles(&text);
        let text = self.collapse_blank_lines(&text);
        text.trim().to_string()
    }

    /// Stage 1: unify line endings and repair characters.
    pub fn repair_encoding(&self, raw: &str) -> String {
        let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");
        text = text
            .chars()
            .map(|c| match c {
                '\u{00A0}' | '\u{202F}' => ' ',
                c if BULLET_GLYPHS.contains(&c) => '\u{2022}',
                c => c,
            })
            .collect();

        for rep in &self.replacements {
            if !rep.from.is_empty() && text.contains(rep.from.as_str()) {
                text = text.replace(rep.from.as_str(), &rep.to);
            }
        }

        text.nfc().collect()
    }

    /// Stage 2: remove boilerplate blocks and running-header lines.
    ///
    /// Running-header lines are dropped entirely so that a paragraph broken
    /// across a page boundary joins up again.
    pub fn strip_boilerplate(&self, text: &str) -> String {
        let mut text = text.to_string();
        for re in &self.boilerplate {
            if re.is_match(&text) {
                text = re.replace_all(&text, "").into_owned();
            }
        }

        text.split('\n')
            .filter(|line| {
                let trimmed = line.trim();
                trimmed.is_empty() || !self.running_headers.iter().any(|re| re.is_match(trimmed))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stage 3a: keep only the first occurrence of each recurring heading.
    pub fn dedupe_headings(&self, text: &str) -> String {
        let mut seen: HashSet<String> = HashSet::new();
        text.split('\n')
            .filter(|line| {
                let key = line.trim().to_lowercase();
                if !self.dedupe_headings.contains(&key) {
                    return true;
                }
                seen.insert(key)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stage 3b: strip every occurrence of a dedupe title after the first.
    ///
    /// This also removes the title from ordinary sentences that happen to
    /// contain it.
    pub fn dedupe_titles(&self, text: &str) -> String {
        let mut text = text.to_string();
        for re in &self.dedupe_titles {
            let Some(first) = re.find(&text) else {
                continue;
            };
            let (head, tail) = text.split_at(first.end());
            let stripped = re.replace_all(tail, "");
            if stripped.len() != tail.len() {
                log::debug!("stripped repeated title `{}`", first.as_str());
            }
            text = format!("{head}{stripped}");
        }
        text
    }

    /// Stage 4: collapse runs of four or more line breaks to one blank line.
    pub fn collapse_blank_lines(&self, text: &str) -> String {
        self.blank_runs.replace_all(text, "\n\n").into_owned()
    }
}

/// Case-insensitive pattern for a literal phrase, tolerant of whitespace changes.
pub(crate) fn literal_pattern(phrase: &str) -> String {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    format!(r"(?i){}", words.join(r"\s+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&DocumentProfile::default()).unwrap()
    }

    // ==================== Encoding Tests ====================

    #[test]
    fn test_line_endings_and_nbsp() {
        let n = normalizer();
        assert_eq!(n.repair_encoding("a\r\nb\rc\u{00A0}d"), "a\nb\nc d");
    }

    #[test]
    fn test_mis_encoded_sequences() {
        let n = normalizer();
        let text = n.repair_encoding("Itâ€™s â€œquotedâ€\u{9D} â€“ go â†’ next Â© 2024");
        assert_eq!(text, "It\u{2019}s \u{201C}quoted\u{201D} \u{2013} go \u{2192} next \u{00A9} 2024");
    }

    #[test]
    fn test_bullet_glyphs() {
        let n = normalizer();
        assert_eq!(n.repair_encoding("\u{F0B7} item"), "\u{2022} item");
    }

    #[test]
    fn test_nfc() {
        let n = normalizer();
        assert_eq!(n.repair_encoding("e\u{0301}"), "\u{00E9}");
    }

    // ==================== Boilerplate Tests ====================

    #[test]
    fn test_running_headers_and_page_numbers_removed() {
        let n = normalizer();
        let raw = "Intro text\nBridge Mode User Guide | 4\nPage 4 of 12\n17\nmore text";
        assert_eq!(n.strip_boilerplate(raw), "Intro text\nmore text");
    }

    #[test]
    fn test_copyright_and_address_blocks_removed() {
        let n = normalizer();
        let raw = "Body\n© 2024 Cloudbrink, Inc. All rights reserved. Other marks belong to their respective owners.\nCorporate Headquarters Cloudbrink Inc.\n530 Lakeside Drive, Suite 190, Sunnyvale, CA 94085\nTail";
        let text = n.normalize(raw);
        assert!(!text.contains("Cloudbrink"));
        assert!(!text.contains("Lakeside"));
        assert!(text.starts_with("Body"));
        assert!(text.ends_with("Tail"));
    }

    #[test]
    fn test_continued_suffix_removed() {
        let n = normalizer();
        assert_eq!(n.normalize("Use Cases - Continued\nBody"), "Use Cases\nBody");
    }

    #[test]
    fn test_unmatched_text_unchanged() {
        let n = normalizer();
        let text = "Plain line one\nPlain line two";
        assert_eq!(n.normalize(text), text);
    }

    // ==================== Dedupe Tests ====================

    #[test]
    fn test_recurring_headings_kept_once() {
        let n = normalizer();
        let raw = "Introduction\nfirst\nPREREQUISITES\nx\nIntroduction\nsecond\nprerequisites";
        assert_eq!(n.dedupe_headings(raw), "Introduction\nfirst\nPREREQUISITES\nx\nsecond");
    }

    #[test]
    fn test_title_dedupe_keeps_first_occurrence() {
        let n = normalizer();
        let raw = "Bridge Mode User Guide\nIntro\nBRIDGE MODE USER GUIDE\nMore";
        let text = n.dedupe_titles(raw);
        assert_eq!(text, "Bridge Mode User Guide\nIntro\n\nMore");
    }

    #[test]
    fn test_title_dedupe_strips_prose_known_false_positive() {
        let n = normalizer();
        let raw = "Bridge Mode User Guide\nSee the Bridge Mode User Guide for details.";
        assert_eq!(n.dedupe_titles(raw), "Bridge Mode User Guide\nSee the  for details.");
    }

    // ==================== Spacing Tests ====================

    #[test]
    fn test_collapse_blank_lines() {
        let n = normalizer();
        assert_eq!(n.collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(n.collapse_blank_lines("a\n  \n\n \nb"), "a\n\nb");
        assert_eq!(n.collapse_blank_lines("a\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalizer().normalize(""), "");
    }

    #[test]
    fn test_invalid_profile_pattern() {
        let mut profile = DocumentProfile::default();
        profile.boilerplate_patterns.push("(".to_string());
        assert!(Normalizer::new(&profile).is_err());
    }
}
