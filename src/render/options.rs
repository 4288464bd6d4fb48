//! Rendering options and configuration.

/// Options for rendering a classified document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape Markdown syntax characters in body text
    pub escape_special_chars: bool,

    /// Append the profile footer after all content
    pub include_footer: bool,

    /// Run the keyword and callout bolding pass
    pub emphasis: bool,

    /// Prepend a `#` column numbering body rows of each table
    pub table_numbering: bool,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable escaping of Markdown syntax characters.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable the footer.
    pub fn with_footer(mut self, include: bool) -> Self {
        self.include_footer = include;
        self
    }

    /// Enable or disable the bolding pass.
    pub fn with_emphasis(mut self, emphasis: bool) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Enable or disable table row numbering.
    pub fn with_table_numbering(mut self, numbering: bool) -> Self {
        self.table_numbering = numbering;
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_special_chars: false,
            include_footer: true,
            emphasis: true,
            table_numbering: true,
            collect_stats: false,
        }
    }
}
