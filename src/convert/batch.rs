//! Parallel conversion of independent documents.
//!
//! Every job runs the shared [`Pipeline`] on its own input; nothing mutable is
//! shared between jobs, and a failing job is recorded in its outcome without
//! affecting the others.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::error::Result;
use crate::model::ImageRef;
use crate::parser::LopdfSource;

use super::{ConversionInput, ConvertResult, Pipeline};

/// Where a job's content comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum JobInput {
    /// A PDF file on disk
    PdfFile(PathBuf),
    /// Pre-extracted text
    Text(String),
}

/// One document to convert.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Display name, usually the file stem
    pub name: String,
    pub input: JobInput,
    /// Ordered image list for this document
    pub images: Vec<ImageRef>,
}

impl BatchJob {
    /// Job for a PDF file, named after its stem.
    pub fn pdf(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            input: JobInput::PdfFile(path),
            images: Vec::new(),
        }
    }

    /// Job for pre-extracted text.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: JobInput::Text(text.into()),
            images: Vec::new(),
        }
    }

    /// Attach the image list.
    pub fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.images = images;
        self
    }

    fn run(&self, pipeline: &Pipeline) -> Result<ConvertResult> {
        match &self.input {
            JobInput::PdfFile(path) => {
                let source = LopdfSource::load_file(path)?;
                pipeline.convert(&source, &self.images)
            }
            JobInput::Text(text) => pipeline.convert(&ConversionInput::new(text.as_str()), &self.images),
        }
    }
}

/// Per-document state after a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    Completed,
    Failed(String),
}

/// Outcome of one batch job.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub name: String,
    pub status: ConversionStatus,
    /// Present when the job completed
    pub result: Option<ConvertResult>,
}

impl BatchOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == ConversionStatus::Completed
    }
}

/// Convert jobs in parallel on `threads` workers (all cores when `None`).
///
/// Outcomes come back in job order. `on_done` is called from worker threads
/// as each job finishes.
pub fn convert_batch<F>(
    pipeline: &Pipeline,
    jobs: &[BatchJob],
    threads: Option<usize>,
    on_done: F,
) -> Vec<BatchOutcome>
where
    F: Fn(&BatchOutcome) + Sync,
{
    let run_one = |job: &BatchJob| {
        let outcome = match job.run(pipeline) {
            Ok(result) => BatchOutcome {
                name: job.name.clone(),
                status: ConversionStatus::Completed,
                result: Some(result),
            },
            Err(e) => {
                log::warn!("{}: conversion failed: {}", job.name, e);
                BatchOutcome {
                    name: job.name.clone(),
                    status: ConversionStatus::Failed(e.to_string()),
                    result: None,
                }
            }
        };
        on_done(&outcome);
        outcome
    };

    let threads = threads
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(4)
        .clamp(1, jobs.len().max(1));

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map(|pool| pool.install(|| jobs.par_iter().map(&run_one).collect()))
        .unwrap_or_else(|e| {
            log::warn!("thread pool unavailable ({}), converting sequentially", e);
            jobs.iter().map(&run_one).collect()
        })
}
