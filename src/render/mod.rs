//! Rendering of classified documents to Markdown and JSON.

mod emphasis;
mod images;
mod json;
mod markdown;
mod options;
mod result;

pub use emphasis::{collapse_blank_lines, Emphasis};
pub use images::{ImageCursor, Slot};
pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::RenderOptions;
pub use result::{ExtractionStats, RenderResult};
