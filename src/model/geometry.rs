//! Page-level drawing operations and positioned text.
//!
//! These are the inputs of table reconstruction. They are produced by a PDF
//! backend and carry only what grid detection needs.

use serde::{Deserialize, Serialize};

/// A drawing operator relevant to table rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    /// Push the graphics state (`q`)
    Save,
    /// Pop the graphics state (`Q`)
    Restore,
    /// Concatenate a matrix onto the current transform (`cm`)
    Transform([f32; 6]),
    /// Set the stroke width (`w`)
    SetLineWidth(f32),
    /// Rectangle path (`re`)
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Begin a subpath (`m`)
    MoveTo { x: f32, y: f32 },
    /// Straight segment from the current point (`l`)
    LineTo { x: f32, y: f32 },
}

/// A run of text at a page position (PDF user space, y grows upward).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Drawing operators and text fragments of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub number: u32,
    /// Drawing operators in stream order
    pub ops: Vec<DrawOp>,
    /// Text fragments in stream order
    pub fragments: Vec<TextFragment>,
}

impl PageContent {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Append a drawing operator.
    pub fn op(mut self, op: DrawOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Append a text fragment.
    pub fn text(mut self, text: impl Into<String>, x: f32, y: f32) -> Self {
        self.fragments.push(TextFragment::new(text, x, y));
        self
    }

    /// Check if the page has neither drawing operators nor text.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.fragments.is_empty()
    }
}
