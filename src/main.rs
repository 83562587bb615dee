use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use case_scraper::parser::{self, BlockPolicy, ExtractOptions, ShapeMode, TestCases};
use case_scraper::runner::{self, Language};
use case_scraper::{fetch, store};

const BATCH_CHUNK: usize = 500;

#[derive(Parser)]
#[command(name = "case_scraper", about = "Extract judge-ready test cases from problem pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the examples of one HTML page and print the JSON result
    Extract {
        /// HTML file to read (default: stdin)
        file: Option<PathBuf>,
        #[command(flatten)]
        opts: ExtractArgs,
    },
    /// Download a problem page and write its cases as ip<N>.txt / op<N>.txt
    Fetch {
        /// Problem URL (default: read from stdin)
        url: Option<String>,
        #[command(flatten)]
        opts: ExtractArgs,
        #[command(flatten)]
        out: OutArgs,
    },
    /// Process every *.html file in a directory
    Batch {
        /// Directory of saved problem pages
        dir: PathBuf,
        #[command(flatten)]
        opts: ExtractArgs,
        #[command(flatten)]
        out: OutArgs,
    },
    /// Print the folder name derived from a problem URL
    Slug {
        url: String,
    },
    /// Run a C++ or Python solution against its stored cases
    Run {
        /// Solution source file
        solution: PathBuf,
        /// Source language (default: from the file extension)
        #[arg(long, value_enum)]
        lang: Option<Language>,
        /// Folder holding ip<N>.txt / op<N>.txt (default: <out-dir>/<solution name>)
        #[arg(long)]
        cases: Option<PathBuf>,
        /// Per-case time limit in seconds
        #[arg(long, default_value_t = runner::DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
        /// Python interpreter
        #[arg(long, env = "CASE_SCRAPER_PYTHON", default_value = runner::DEFAULT_PYTHON)]
        python: String,
        #[command(flatten)]
        out: OutArgs,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Reject arrays whose rows differ in shape
    #[arg(long)]
    strict_shape: bool,
    /// Drop examples that fail to parse instead of failing the page
    #[arg(long)]
    skip_bad_blocks: bool,
}

impl From<&ExtractArgs> for ExtractOptions {
    fn from(args: &ExtractArgs) -> Self {
        ExtractOptions {
            shape_mode: if args.strict_shape {
                ShapeMode::Strict
            } else {
                ShapeMode::FirstElement
            },
            on_block_error: if args.skip_bad_blocks {
                BlockPolicy::Skip
            } else {
                BlockPolicy::Abort
            },
        }
    }
}

#[derive(Args)]
struct OutArgs {
    /// Root folder for test data
    #[arg(long, env = "CASE_SCRAPER_OUT_DIR", default_value = store::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON result, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract { file, opts } => {
            let html = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => read_stdin()?,
            };
            let cases = parser::extract_cases(&html, &(&opts).into())?;
            println!("{}", serde_json::to_string(&store::Envelope::new(&cases))?);
            Ok(())
        }
        Commands::Fetch { url, opts, out } => {
            let url = match url {
                Some(u) => u,
                None => read_stdin()?,
            };
            let url = url.trim();
            let slug = fetch::problem_slug(url)?;
            let client = fetch::client()?;
            let html = fetch::fetch_page(&client, url).await?;

            let cases = parser::extract_cases(&html, &(&opts).into())
                .with_context(|| format!("Failed to extract cases from {}", url))?;
            if cases.is_empty() {
                warn!("No example blocks found on {}", url);
            }
            let written = store::write_cases(&out.out_dir, &slug, &cases)?;
            println!(
                "Wrote {} cases to {}",
                written,
                store::problem_dir(&out.out_dir, &slug).display()
            );
            Ok(())
        }
        Commands::Batch { dir, opts, out } => {
            let files = html_files(&dir)?;
            if files.is_empty() {
                println!("No .html files in {}.", dir.display());
                return Ok(());
            }
            println!("Processing {} pages...", files.len());
            let counts = process_files(&files, &out.out_dir, &(&opts).into())?;
            counts.print();
            Ok(())
        }
        Commands::Slug { url } => {
            println!("{}", fetch::problem_slug(&url)?);
            Ok(())
        }
        Commands::Run {
            solution,
            lang,
            cases,
            timeout_secs,
            python,
            out,
        } => {
            let lang = match lang.or_else(|| Language::detect(&solution)) {
                Some(l) => l,
                None => bail!(
                    "Cannot tell the language of {}; pass --lang",
                    solution.display()
                ),
            };
            let dir = cases.unwrap_or_else(|| {
                store::problem_dir(&out.out_dir, &page_slug(&solution))
            });

            let program = runner::prepare(&solution, lang, &python).await?;
            let report =
                runner::run_all(&program, &dir, Duration::from_secs(timeout_secs)).await?;
            report.print();
            if !report.all_passed() {
                bail!(
                    "{} of {} test cases failed",
                    report.cases.len() - report.passed(),
                    report.cases.len()
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

struct BatchCounts {
    pages: usize,
    cases: usize,
    failed: usize,
}

impl BatchCounts {
    fn print(&self) {
        println!(
            "Wrote {} cases from {} pages ({} failed).",
            self.cases, self.pages, self.failed,
        );
    }
}

fn process_files(files: &[PathBuf], out_dir: &Path, opts: &ExtractOptions) -> Result<BatchCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = BatchCounts {
        pages: 0,
        cases: 0,
        failed: 0,
    };

    for chunk in files.chunks(BATCH_CHUNK) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| (path, extract_file(path, opts)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(cases) => {
                    let slug = page_slug(path);
                    counts.cases += store::write_cases(out_dir, &slug, &cases)?;
                    counts.pages += 1;
                }
                Err(e) => {
                    warn!("{}: {:#}", path.display(), e);
                    counts.failed += 1;
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        "Batch finished: {} pages, {} cases, {} failed",
        counts.pages, counts.cases, counts.failed
    );
    Ok(counts)
}

fn extract_file(path: &Path, opts: &ExtractOptions) -> Result<TestCases> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parser::extract_cases(&html, opts)?)
}

fn page_slug(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
