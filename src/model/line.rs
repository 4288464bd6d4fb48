//! Normalized text lines.

/// A single line of normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line as it appears in the normalized text
    pub raw: String,
    /// Line with surrounding whitespace removed
    pub trimmed: String,
    /// Position in the normalized text (0-based)
    pub index: usize,
}

impl Line {
    /// Create a line at the given source index.
    pub fn new(raw: impl Into<String>, index: usize) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().to_string();
        Self { raw, trimmed, index }
    }

    /// Split normalized text into lines.
    pub fn split(text: &str) -> Vec<Line> {
        if text.is_empty() {
            return Vec::new();
        }
        text.split('\n')
            .enumerate()
            .map(|(index, raw)| Line::new(raw, index))
            .collect()
    }

    /// Trimmed text.
    pub fn text(&self) -> &str {
        &self.trimmed
    }

    /// Check if the line holds no visible text.
    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }

    /// Length of the trimmed text in characters.
    pub fn char_len(&self) -> usize {
        self.trimmed.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_blank_lines_and_indices() {
        let lines = Line::split("  Title  \n\nBody");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw, "  Title  ");
        assert_eq!(lines[0].text(), "Title");
        assert!(lines[1].is_blank());
        assert_eq!(lines[2].index, 2);
    }

    #[test]
    fn test_split_empty() {
        assert!(Line::split("").is_empty());
    }

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(Line::new("é•x", 0).char_len(), 3);
    }
}
