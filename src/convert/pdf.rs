//! PDF document converter.

use std::path::Path;

use crate::error::Result;
use crate::model::{ImageRef, Table};
use crate::parser::{page_contents, LopdfSource};

use super::{ConvertResult, Pipeline};

/// Converts PDF files through a compiled [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PdfConverter {
    pipeline: Pipeline,
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Converter for the built-in profile.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Pipeline::with_defaults()?))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Convert a PDF file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P, images: &[ImageRef]) -> Result<ConvertResult> {
        let path = path.as_ref();
        log::debug!("converting {}", path.display());
        let source = LopdfSource::load_file(path)?;
        self.pipeline.convert(&source, images)
    }

    /// Convert PDF bytes.
    pub fn convert_bytes(&self, bytes: Vec<u8>, images: &[ImageRef]) -> Result<ConvertResult> {
        let source = LopdfSource::load_bytes(bytes)?;
        self.pipeline.convert(&source, images)
    }

    /// Geometry tables of a PDF, merged across pages and finalized.
    pub fn tables<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Table>> {
        let source = LopdfSource::load_file(path)?;
        let pages = page_contents(&source)?;
        let router = self.pipeline.router();
        let mut tables: Vec<Table> = router
            .geometry_tables(&pages)
            .into_iter()
            .map(|t| router.finalize(t))
            .collect();
        router.unify_widths(&mut tables);
        Ok(tables)
    }
}

/// Convert a PDF file with the built-in profile.
///
/// # Example
///
/// ```no_run
/// let result = docmark::convert::convert_file("guide.pdf", &[]).unwrap();
/// std::fs::write("guide.md", result.markdown).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, images: &[ImageRef]) -> Result<ConvertResult> {
    PdfConverter::with_defaults()?.convert_file(path, images)
}

/// Convert a PDF file without blocking the async runtime.
///
/// The file is read with `tokio::fs`; parsing and conversion run on the
/// blocking thread pool.
#[cfg(feature = "async")]
pub async fn convert_file_async(
    pipeline: std::sync::Arc<Pipeline>,
    path: impl AsRef<Path>,
    images: Vec<ImageRef>,
) -> Result<ConvertResult> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || {
        let source = LopdfSource::load_bytes(bytes)?;
        pipeline.convert(&source, &images)
    })
    .await
    .map_err(|e| crate::Error::ExtractionFailed(format!("conversion task failed: {}", e)))?
}
