//! The `alttext describe` command: alt text for files on disk.

use clap::{Args, ValueEnum};
use futures_util::stream::{self, StreamExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use alttext_core::pipeline::DiscoveredFile;
use alttext_core::{AltTextGenerator, Config, DescribeRecord, FileDiscovery, OutputWriter};

use super::Provider;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object, or an array for several files
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for alttext_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Jsonl => Self::JsonLines,
        }
    }
}

/// Arguments for the `describe` command.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Image file or directory
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum words in each caption (defaults to `caption.default_word_limit`)
    #[arg(short, long, env = "ALTTEXT_WORD_LIMIT")]
    pub word_limit: Option<usize>,

    /// Vision provider (defaults to `llm.provider`)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (provider-specific)
    #[arg(long)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Concurrent provider requests in directory mode
    #[arg(short, long, default_value = "4")]
    pub parallel: usize,
}

/// Tally of a describe run.
#[derive(Debug, Default)]
struct Summary {
    succeeded: usize,
    failed: usize,
    total_bytes: u64,
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs, config: Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let files = collect_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No supported images found in {:?}", args.input);
    }

    let generator = Arc::new(AltTextGenerator::from_config(
        &config,
        args.provider.map(|p| p.as_str()),
        args.model.as_deref(),
    )?);
    // Fail early on bad word limits instead of once per file.
    let word_limit = generator.resolve_word_limit(args.word_limit)?;

    if !generator.provider().is_available().await {
        tracing::warn!(
            "Provider '{}' is not reachable; requests will likely fail",
            generator.provider().name()
        );
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), args.output.is_none());

    let progress = (files.len() > 1).then(|| create_progress_bar(files.len() as u64));
    let start = Instant::now();
    let mut summary = Summary::default();

    let mut results = stream::iter(files)
        .map(|file| {
            let generator = Arc::clone(&generator);
            async move { describe_file(&generator, file, word_limit).await }
        })
        .buffer_unordered(args.parallel.max(1));

    while let Some((record, size)) = results.next().await {
        if record.is_success() {
            summary.succeeded += 1;
            summary.total_bytes += size;
        } else {
            summary.failed += 1;
            if let Some(err) = &record.error {
                tracing::error!("Failed: {} - {}", record.path, err.message);
            }
        }
        writer.push(record)?;

        if let Some(pb) = &progress {
            pb.inc(1);
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let done = summary.succeeded + summary.failed;
                pb.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
            }
        }
    }

    writer.finish()?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
        print_summary(&summary, start.elapsed());
    }

    if let Some(path) = &args.output {
        tracing::info!("Wrote results to {:?}", path);
    }

    if summary.succeeded == 0 {
        anyhow::bail!("No alt text generated ({} failed)", summary.failed);
    }
    Ok(())
}

/// A file argument is used as-is; directories are walked for supported images.
fn collect_files(input: &Path) -> anyhow::Result<Vec<DiscoveredFile>> {
    if input.is_file() {
        let size = std::fs::metadata(input)?.len();
        return Ok(vec![DiscoveredFile {
            path: input.to_path_buf(),
            size,
        }]);
    }
    Ok(FileDiscovery::default().discover(input))
}

async fn describe_file(
    generator: &AltTextGenerator,
    file: DiscoveredFile,
    word_limit: usize,
) -> (DescribeRecord, u64) {
    let record = match tokio::fs::read(&file.path).await {
        Ok(bytes) => {
            let result = generator.generate(bytes, Some(word_limit)).await;
            DescribeRecord::from_result(&file.path, result)
        }
        Err(e) => DescribeRecord::read_failure(&file.path, &e),
    };
    (record, file.size)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn print_summary(summary: &Summary, elapsed: Duration) {
    let total = summary.succeeded + summary.failed;
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.succeeded as f64 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!(
        "    Input:        {:>6.1} MB",
        summary.total_bytes as f64 / 1_000_000.0
    );
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>5.1} img/sec", rate);
    eprintln!("  ====================================");
}
