//! Document model types.
//!
//! This module defines the intermediate representation that connects the
//! scanners, the table router and the renderer: lines in, blocks out, plus
//! the page geometry and image list supplied by collaborators.

mod block;
mod document;
mod geometry;
mod image;
mod line;
mod table;

pub use block::{Block, BlockKind, CalloutKind};
pub use document::{Document, DocumentVariant};
pub use geometry::{DrawOp, PageContent, TextFragment};
pub use image::{images_from_files, ImageFilter, ImageRef, LogoSize};
pub use line::Line;
pub use table::{Table, TableCell, TableRow};
