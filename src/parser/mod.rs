//! Text and geometry parsing.
//!
//! Normalized text goes through the rule table and the line scanner to
//! become blocks; page geometry goes through grid detection and cell
//! assembly to become tables. The PDF backend that supplies both lives here
//! too.

pub mod backend;
mod cells;
mod classifier;
mod cursor;
mod geometry;
mod normalizer;
mod rules;
mod table_router;
mod variant;

pub use backend::{page_contents, ContentInterpreter, LopdfSource, PdfBackend};
pub use cells::CellAssembler;
pub use classifier::{Classifier, ScanOptions};
pub use cursor::LineCursor;
pub use geometry::{merge_intervals, Edge, Grid, GridDetector, GridLine, Interval, Matrix};
pub use normalizer::Normalizer;
pub use rules::{CalloutParts, LineContext, LineKind, Rule, RuleSet};
pub use table_router::{header_similarity, TableRouter, TableSection, TableSource};
pub use variant::{detect_variant, is_howto_document, is_table_document};
