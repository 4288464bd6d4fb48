//! docmark CLI - structured Markdown from PDF manuals and release notes

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docmark::convert::{convert_batch, BatchJob, ConvertOptions, ConvertResult, PdfConverter, Pipeline};
use docmark::parser::Normalizer;
use docmark::render::{to_json, JsonFormat, RenderOptions};
use docmark::{images_from_files, DocumentProfile, DocumentVariant, ImageRef};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docmark")]
#[command(version)]
#[command(about = "Reconstruct structured Markdown from PDF manuals, guides and release notes", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to Markdown
    Convert {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        images: ImageArgs,
    },

    /// Convert pre-extracted text to Markdown
    Text {
        /// Input text file
        #[arg(value_name = "TXT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        images: ImageArgs,
    },

    /// Convert every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "OUTDIR")]
        output: Option<PathBuf>,

        /// Number of worker threads (all cores if not specified)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the tables detected from page geometry as JSON
    Tables {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Document profile (JSON)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
    },

    /// Print normalized text
    Normalize {
        /// Input text file
        #[arg(value_name = "TXT")]
        input: PathBuf,

        /// Document profile (JSON)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
    },

    /// Print the built-in document profile as JSON
    Profile,

    /// Show version information
    Version,
}

#[derive(Args)]
struct PipelineArgs {
    /// Document profile (JSON); missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Force a document variant (standard, howto, table)
    #[arg(long, value_parser = parse_variant)]
    variant: Option<DocumentVariant>,

    /// Print extraction statistics to stderr
    #[arg(long)]
    stats: bool,

    /// Leave out the footer
    #[arg(long)]
    no_footer: bool,

    /// Skip the keyword bolding pass
    #[arg(long)]
    no_emphasis: bool,
}

#[derive(Args)]
struct ImageArgs {
    /// Directory with the document's extracted images
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Path prefix for image links
    #[arg(long, default_value = "images")]
    image_prefix: String,
}

fn parse_variant(s: &str) -> Result<DocumentVariant, String> {
    s.parse().map_err(|e: docmark::Error| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            pipeline,
            images,
        } => cmd_convert(&input, output.as_deref(), &pipeline, &images),
        Commands::Text {
            input,
            output,
            pipeline,
            images,
        } => cmd_text(&input, output.as_deref(), &pipeline, &images),
        Commands::Batch {
            input,
            output,
            jobs,
            pipeline,
        } => cmd_batch(&input, output.as_deref(), jobs, &pipeline),
        Commands::Tables {
            input,
            pretty,
            profile,
        } => cmd_tables(&input, pretty, profile.as_deref()),
        Commands::Normalize { input, profile } => cmd_normalize(&input, profile.as_deref()),
        Commands::Profile => cmd_profile(),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_profile(path: Option<&Path>) -> docmark::Result<DocumentProfile> {
    match path {
        Some(path) => {
            log::debug!("loading profile {}", path.display());
            DocumentProfile::from_path(path)
        }
        None => Ok(DocumentProfile::default()),
    }
}

fn build_pipeline(args: &PipelineArgs) -> docmark::Result<Pipeline> {
    let profile = load_profile(args.profile.as_deref())?;
    let render = RenderOptions::new()
        .with_footer(!args.no_footer)
        .with_emphasis(!args.no_emphasis)
        .with_stats(args.stats);
    let mut options = ConvertOptions::new().with_render_options(render);
    if let Some(variant) = args.variant {
        options = options.with_variant(variant);
    }
    Pipeline::new(profile, options)
}

fn load_images(args: &ImageArgs) -> Result<Vec<ImageRef>, Box<dyn std::error::Error>> {
    let Some(dir) = &args.image_dir else {
        return Ok(Vec::new());
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    let images: Vec<ImageRef> = images_from_files(&names, &args.image_prefix)
        .into_iter()
        .map(|entry| with_file_info(entry, dir))
        .collect();
    log::debug!("{} images from {}", images.len(), dir.display());
    Ok(images)
}

/// Fill in byte size and pixel dimensions from the file on disk.
///
/// Unreadable files keep empty fields and pass the image filter untouched.
fn with_file_info(mut entry: ImageRef, dir: &Path) -> ImageRef {
    let Some(name) = entry.path.rsplit('/').next() else {
        return entry;
    };
    let file = dir.join(name);
    if let Ok(meta) = fs::metadata(&file) {
        entry = entry.with_size(meta.len());
    }
    match image::image_dimensions(&file) {
        Ok((width, height)) => entry = entry.with_dimensions(width, height),
        Err(e) => log::debug!("{}: no dimensions ({})", file.display(), e),
    }
    entry
}

fn write_result(result: &ConvertResult, output: Option<&Path>) -> CliResult {
    if let Some(path) = output {
        fs::write(path, &result.markdown)?;
        println!(
            "{} {} ({} variant)",
            "Saved to".green(),
            path.display(),
            result.variant
        );
    } else {
        println!("{}", result.markdown);
    }

    if let Some(stats) = &result.stats {
        eprintln!("{}", "Extraction Statistics".cyan().bold());
        eprintln!("{}", "─".repeat(40).dimmed());
        eprintln!("{}: {}", "Variant".bold(), result.variant);
        eprintln!("{}: {}", "Headings".bold(), stats.heading_count);
        eprintln!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
        eprintln!("{}: {}", "Callouts".bold(), stats.callout_count);
        eprintln!("{}: {}", "List items".bold(), stats.list_item_count);
        eprintln!(
            "{}: {} ({} rows)",
            "Tables".bold(),
            stats.table_count,
            stats.table_row_count
        );
        eprintln!(
            "{}: {} placed, {} appended, {} suppressed",
            "Images".bold(),
            stats.images_rendered,
            stats.images_appended,
            stats.images_suppressed
        );
        eprintln!("{}: {}", "Words".bold(), stats.word_count);
    }
    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>, args: &PipelineArgs, images: &ImageArgs) -> CliResult {
    let converter = PdfConverter::new(build_pipeline(args)?);
    let images = load_images(images)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Converting {}...", input.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = converter.convert_file(input, &images);
    spinner.finish_and_clear();

    write_result(&result?, output)
}

fn cmd_text(input: &Path, output: Option<&Path>, args: &PipelineArgs, images: &ImageArgs) -> CliResult {
    let pipeline = build_pipeline(args)?;
    let images = load_images(images)?;
    let text = fs::read_to_string(input)?;
    let result = pipeline.convert_text(&text, &images)?;
    write_result(&result, output)
}

fn cmd_batch(input: &Path, output: Option<&Path>, jobs: Option<usize>, args: &PipelineArgs) -> CliResult {
    let pipeline = build_pipeline(args)?;

    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    if files.is_empty() {
        println!("{} {}", "No PDF files in".yellow(), input.display());
        return Ok(());
    }

    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| input.join("markdown"));
    fs::create_dir_all(&output_dir)?;

    let batch: Vec<BatchJob> = files.into_iter().map(BatchJob::pdf).collect();
    let pb = ProgressBar::new(batch.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let outcomes = convert_batch(&pipeline, &batch, jobs, |outcome| {
        pb.set_message(outcome.name.clone());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let mut failed = 0;
    println!("\n{}", "Results:".green().bold());
    for outcome in &outcomes {
        match &outcome.result {
            Some(result) => {
                let path = output_dir.join(format!("{}.md", outcome.name));
                fs::write(&path, &result.markdown)?;
                println!("  {} {} ({})", "✓".green(), outcome.name, result.variant);
            }
            None => {
                failed += 1;
                if let docmark::ConversionStatus::Failed(message) = &outcome.status {
                    println!("  {} {}: {}", "✗".red(), outcome.name, message);
                }
            }
        }
    }
    println!(
        "\n{} converted, {} failed, output in {}",
        outcomes.len() - failed,
        failed,
        output_dir.display()
    );
    Ok(())
}

fn cmd_tables(input: &Path, pretty: bool, profile: Option<&Path>) -> CliResult {
    let pipeline = Pipeline::new(load_profile(profile)?, ConvertOptions::default())?;
    let tables = PdfConverter::new(pipeline).tables(input)?;
    let format = if pretty {
        JsonFormat::Pretty
    } else {
        JsonFormat::Compact
    };
    println!("{}", to_json(&tables, format)?);
    Ok(())
}

fn cmd_normalize(input: &Path, profile: Option<&Path>) -> CliResult {
    let normalizer = Normalizer::new(&load_profile(profile)?)?;
    let text = fs::read_to_string(input)?;
    println!("{}", normalizer.normalize(&text));
    Ok(())
}

fn cmd_profile() -> CliResult {
    println!("{}", DocumentProfile::default().to_json_pretty()?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docmark".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structured Markdown from PDF manuals, guides and release notes");
}
