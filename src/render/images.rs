//! Forward-only cursor over the supplied image list.

use crate::model::ImageRef;

/// What a placeholder resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// Render this image here
    Image(&'a ImageRef),
    /// A suppressed image consumed the slot
    Suppressed(&'a ImageRef),
    /// The list is used up; the placeholder is a no-op
    Exhausted,
}

/// Cursor that hands out images strictly in list order.
///
/// The position only moves forward: an image is handed out at most once and
/// never after an image that follows it in the list.
#[derive(Debug, Clone)]
pub struct ImageCursor<'a> {
    images: &'a [ImageRef],
    position: usize,
}

impl<'a> ImageCursor<'a> {
    pub fn new(images: &'a [ImageRef]) -> Self {
        Self {
            images,
            position: 0,
        }
    }

    /// Index of the next image to hand out.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of images not yet handed out.
    pub fn remaining(&self) -> usize {
        self.images.len().saturating_sub(self.position)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.images.len()
    }

    /// Consume the next slot.
    pub fn next_slot(&mut self) -> Slot<'a> {
        let Some(image) = self.images.get(self.position) else {
            return Slot::Exhausted;
        };
        self.position += 1;
        if image.suppressed {
            log::debug!("image slot {} suppressed ({})", image.index, image.path);
            Slot::Suppressed(image)
        } else {
            log::debug!("image slot {} -> {}", image.index, image.path);
            Slot::Image(image)
        }
    }

    /// Consume every remaining image, suppressed ones included.
    pub fn drain(&mut self) -> std::slice::Iter<'a, ImageRef> {
        let rest = &self.images[self.position.min(self.images.len())..];
        self.position = self.images.len();
        rest.iter()
    }
}
