//! Document variant detection.

use crate::model::{DocumentVariant, ImageRef};
use crate::profile::DocumentProfile;

/// Pick the conversion strategy for a document.
///
/// Table signals in the text win over how-to signals in the image paths;
/// everything else is a standard document.
pub fn detect_variant(text: &str, images: &[ImageRef], profile: &DocumentProfile) -> DocumentVariant {
    if is_table_document(text, profile) {
        DocumentVariant::Table
    } else if is_howto_document(images, profile) {
        DocumentVariant::HowTo
    } else {
        DocumentVariant::Standard
    }
}

/// Check for release/patch-note vocabulary or a table trigger heading.
pub fn is_table_document(text: &str, profile: &DocumentProfile) -> bool {
    let lower = text.to_lowercase();
    let vocab = &profile.table;
    if vocab
        .detect_phrases
        .iter()
        .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
    {
        return true;
    }
    text.lines().any(|line| {
        let line = line.trim();
        vocab
            .trigger_headings
            .iter()
            .any(|h| h.eq_ignore_ascii_case(line))
    })
}

/// Check whether any image path carries a how-to marker.
pub fn is_howto_document(images: &[ImageRef], profile: &DocumentProfile) -> bool {
    images.iter().any(|image| {
        let path = image.path.to_lowercase();
        profile
            .howto
            .image_markers
            .iter()
            .any(|m| !m.is_empty() && path.contains(&m.to_lowercase()))
    })
}
