//! Externally supplied image references.

use serde::{Deserialize, Serialize};

/// One entry of the ordered image list handed to the pipeline.
///
/// The list order is the insertion order in the output. A suppressed image
/// still occupies its slot so that later images stay aligned with the layout
/// of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Position in the list (0-based)
    pub index: usize,

    /// Display path or URL
    pub path: String,

    /// Caption / alt text
    pub alt: String,

    /// Consume a slot without rendering
    #[serde(default)]
    pub suppressed: bool,

    /// Pixel width, when known
    #[serde(default)]
    pub width: Option<u32>,

    /// Pixel height, when known
    #[serde(default)]
    pub height: Option<u32>,

    /// Encoded file size, when known
    #[serde(default)]
    pub size_bytes: Option<u64>,

    /// Source page, when known
    #[serde(default)]
    pub page: Option<u32>,
}

impl ImageRef {
    /// Create an image reference.
    pub fn new(index: usize, path: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            index,
            path: path.into(),
            alt: alt.into(),
            suppressed: false,
            width: None,
            height: None,
            size_bytes: None,
            page: None,
        }
    }

    /// Set the pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the encoded file size.
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Mark the image as suppressed.
    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }

    /// Markdown image syntax for this entry.
    pub fn to_markdown(&self) -> String {
        format!("![{}]({})", self.alt, self.path)
    }
}

/// Build image references from file names the way the portal serves them.
///
/// Names are filtered to raster images, sorted, and given `Diagram N` alt text
/// with a path of `{url_prefix}/{name}`.
pub fn images_from_files<S: AsRef<str>>(names: &[S], url_prefix: &str) -> Vec<ImageRef> {
    let mut files: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| is_raster_name(n))
        .collect();
    files.sort_unstable();

    let prefix = url_prefix.trim_end_matches('/');
    files
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut image = ImageRef::new(i, format!("{prefix}/{name}"), format!("Diagram {}", i + 1));
            image.page = Some(i as u32 + 1);
            image
        })
        .collect()
}

fn is_raster_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

/// Pixel dimensions of a known logo or banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoSize {
    pub width: u32,
    pub height: u32,
}

impl LogoSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rules that mark decorative or duplicate images as suppressed.
///
/// Images without known dimensions are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFilter {
    /// Known logo and banner sizes
    pub logo_sizes: Vec<LogoSize>,
    /// Pixel tolerance when matching logo sizes
    pub logo_tolerance: u32,
    /// Smaller files are decorative
    pub min_size_bytes: u64,
    /// Wider aspect ratios are banners
    pub max_aspect: f32,
    /// Narrower aspect ratios are rules or strips
    pub min_aspect: f32,
    /// Shorter images are decorative
    pub min_height: u32,
    /// Images larger than this in both dimensions are meaningful
    pub meaningful_width: u32,
    pub meaningful_height: u32,
    /// Files larger than this are meaningful
    pub meaningful_size_bytes: u64,
    /// Dimension difference under which two images may be duplicates
    pub duplicate_dimension_tolerance: u32,
    /// File-size difference ratio at or under which two images are duplicates
    pub duplicate_size_ratio: f64,
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self {
            logo_sizes: vec![
                LogoSize::new(568, 130),
                LogoSize::new(2559, 357),
                LogoSize::new(2625, 230),
                LogoSize::new(653, 133),
                LogoSize::new(530, 108),
            ],
            logo_tolerance: 5,
            min_size_bytes: 5 * 1024,
            max_aspect: 7.0,
            min_aspect: 0.15,
            min_height: 200,
            meaningful_width: 600,
            meaningful_height: 300,
            meaningful_size_bytes: 30 * 1024,
            duplicate_dimension_tolerance: 10,
            duplicate_size_ratio: 0.001,
        }
    }
}

impl ImageFilter {
    /// Check whether the dimensions match a known logo.
    pub fn is_known_logo(&self, width: u32, height: u32) -> bool {
        self.logo_sizes.iter().any(|logo| {
            width.abs_diff(logo.width) <= self.logo_tolerance
                && height.abs_diff(logo.height) <= self.logo_tolerance
        })
    }

    /// Mark decorative and duplicate images as suppressed, in list order.
    ///
    /// Returns the number of images newly suppressed.
    pub fn apply(&self, images: &mut [ImageRef]) -> usize {
        let mut accepted: Vec<(u32, u32, u64)> = Vec::new();
        let mut suppressed = 0;

        for image in images.iter_mut() {
            if image.suppressed {
                continue;
            }
            let (Some(width), Some(height)) = (image.width, image.height) else {
                continue;
            };
            let size = image.size_bytes.unwrap_or(u64::MAX);

            if self.is_decorative(width, height, size) || self.is_duplicate(&accepted, width, height, size) {
                log::debug!("suppressing image {} ({}x{})", image.path, width, height);
                image.suppressed = true;
                suppressed += 1;
            } else {
                accepted.push((width, height, size));
            }
        }

        suppressed
    }

    fn is_decorative(&self, width: u32, height: u32, size: u64) -> bool {
        if height == 0 {
            return true;
        }
        let aspect = width as f32 / height as f32;
        if self.is_known_logo(width, height)
            || size < self.min_size_bytes
            || aspect > self.max_aspect
            || aspect < self.min_aspect
            || height < self.min_height
        {
            return true;
        }

        let reasonable = width > self.meaningful_width && height > self.meaningful_height;
        let large = size > self.meaningful_size_bytes;
        !reasonable && !large
    }

    fn is_duplicate(&self, accepted: &[(u32, u32, u64)], width: u32, height: u32, size: u64) -> bool {
        if size == u64::MAX {
            return false;
        }
        accepted.iter().any(|&(w, h, s)| {
            if s == u64::MAX
                || w.abs_diff(width) >= self.duplicate_dimension_tolerance
                || h.abs_diff(height) >= self.duplicate_dimension_tolerance
            {
                return false;
            }
            let ratio = size.abs_diff(s) as f64 / size.max(s).max(1) as f64;
            ratio <= self.duplicate_size_ratio
        })
    }
}
