//! Post-processing passes over rendered Markdown.

use regex::Regex;

use crate::error::{compile, Result};
use crate::profile::DocumentProfile;

/// Collapse runs of three or more newlines to a single blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(c);
    }
    out
}

/// Final bolding pass.
///
/// Re-emphasizes callout labels at line start and the profile's keyword
/// vocabulary. Text already between `**` markers is left alone, so running
/// the pass on its own output changes nothing.
#[derive(Debug, Clone)]
pub struct Emphasis {
    callout: Regex,
    keywords: Option<Regex>,
}

impl Emphasis {
    /// Compile the pass for a profile.
    pub fn new(profile: &DocumentProfile) -> Result<Self> {
        let labels = profile
            .callout_labels
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");
        let callout = compile(&format!(r"(?m)^(>[ \t]*)?((?i:{labels}))(\s*\([^)\n]*\))?:"))?;

        let mut keywords: Vec<&str> = profile
            .emphasis_keywords
            .iter()
            .map(String::as_str)
            .filter(|k| !k.trim().is_empty())
            .collect();
        // Longest first so that overlapping keywords bold the widest match.
        keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));
        let keywords = if keywords.is_empty() {
            None
        } else {
            let alternatives = keywords.iter().map(|k| bounded(k)).collect::<Vec<_>>();
            Some(compile(&alternatives.join("|"))?)
        };

        Ok(Self { callout, keywords })
    }

    /// Apply the pass.
    pub fn apply(&self, text: &str) -> String {
        let text = self.callout.replace_all(text, "${1}**${2}${3}:**");
        let Some(keywords) = &self.keywords else {
            return text.into_owned();
        };
        text.split('\n')
            .map(|line| bold_outside_markers(keywords, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Keyword pattern with word boundaries on the sides that start or end in a
/// word character.
fn bounded(keyword: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let mut pattern = String::new();
    if is_word(keyword.chars().next()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(keyword));
    if is_word(keyword.chars().last()) {
        pattern.push_str(r"\b");
    }
    pattern
}

fn bold_outside_markers(keywords: &Regex, line: &str) -> String {
    // Headings, images and lines with unbalanced markers stay as rendered.
    if line.starts_with('#') || line.contains("](") || line.matches("**").count() % 2 == 1 {
        return line.to_string();
    }
    line.split("**")
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 0 {
                keywords.replace_all(segment, "**${0}**").into_owned()
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("**")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> Emphasis {
        let profile = DocumentProfile::default()
            .with_emphasis_keywords(["Bridge Mode", "Bridge Mode User Config", "BrinkAgent"]);
        Emphasis::new(&profile).unwrap()
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_bolds_keywords() {
        assert_eq!(
            pass().apply("Start BrinkAgent before Bridge Mode."),
            "Start **BrinkAgent** before **Bridge Mode**."
        );
    }

    #[test]
    fn test_longest_keyword_wins() {
        assert_eq!(
            pass().apply("Open Bridge Mode User Config now"),
            "Open **Bridge Mode User Config** now"
        );
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert_eq!(pass().apply("BrinkAgents run"), "BrinkAgents run");
    }

    #[test]
    fn test_restores_callout_label() {
        assert_eq!(pass().apply("> Note (beta): try it"), "> **Note (beta):** try it");
        assert_eq!(pass().apply("WARNING: hot"), "**WARNING:** hot");
    }

    #[test]
    fn test_headings_and_images_untouched() {
        let text = "## Bridge Mode\n\n![Bridge Mode](/img/a.png)";
        assert_eq!(pass().apply(text), text);
    }

    #[test]
    fn test_idempotent() {
        let text = "> NOTE: use Bridge Mode\n> with **BrinkAgent** and BrinkAgent\n\n\
                    **Mode:** Bridge Mode\n\n| 1 | Bridge Mode |";
        let once = pass().apply(text);
        let twice = pass().apply(&once);
        assert_eq!(once, twice);
        assert!(!once.contains("****"));
        assert!(once.contains("> **NOTE:** use **Bridge Mode**"));
    }
}
