//! CLI binary for pscore.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ScorerConfig` / `SummarizeOptions` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pscore::{
    BinLayout, HistogramRenderer, PScorer, ScanProgressCallback, ScorerConfig, SummarizeOptions,
    SvgHistogram, TextHistogram,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the batch, one log line per
/// document.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} documents  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ScanProgressCallback for CliProgressCallback {
    fn on_scan_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, _index: usize, _total: usize, document: &str) {
        self.bar.set_message(document.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, value_count: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{value_count:>4} p-values")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(error),
        ));
        self.bar.inc(1);
    }

    fn on_scan_complete(&self, total_documents: usize, total_values: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        eprintln!(
            "{} {} p-values from {}/{} documents",
            if failed == 0 { green("✔") } else { red("⚠") },
            bold(&total_values.to_string()),
            total_documents - failed,
            total_documents,
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Significant p-values of one paper, text histogram on stderr
  pscore paper.pdf

  # Whole corpus, all p-values, SVG chart
  pscore --files-path corpus/ --all --svg dist.svg a.pdf b.pdf c.pdf

  # Custom bins: explicit edges or a uniform width
  pscore --bins 0,0.01,0.02,0.03,0.04,0.05 paper.pdf
  pscore --bins width:0.005 paper.pdf

  # Reproducible values for "p < .05"-style reports
  pscore --seed 42 --json paper.pdf

  # Inspect what the pattern matched, without normalising
  pscore --raw paper.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Path to a libpdfium to load instead of the system one
  RUST_LOG            Log filter (overrides --verbose / --quiet)
"#;

/// Extract p-values from PDFs and plot their distribution.
#[derive(Parser, Debug)]
#[command(
    name = "pscore",
    version,
    about = "Extract p-values from PDFs and plot their distribution",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF documents to scan, in order.
    #[arg(required = true)]
    documents: Vec<String>,

    /// Directory every document path is resolved against.
    #[arg(long, env = "PSCORE_FILES_PATH", default_value = ".")]
    files_path: PathBuf,

    /// Regular expression used to find p-values.
    #[arg(long, env = "PSCORE_PATTERN")]
    pattern: Option<String>,

    /// Keep non-significant values (> 0.05) and plot over [0, 1].
    #[arg(long)]
    all: bool,

    /// Histogram bins: comma-separated edges, or width:W for uniform bins.
    #[arg(long, env = "PSCORE_BINS")]
    bins: Option<String>,

    /// Chart title.
    #[arg(long)]
    title: Option<String>,

    /// Write the histogram as SVG to this file instead of drawing on stderr.
    #[arg(long, env = "PSCORE_SVG")]
    svg: Option<PathBuf>,

    /// Print values as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Seed for threshold expansion (reproducible output).
    #[arg(long, env = "PSCORE_SEED")]
    seed: Option<u64>,

    /// Print raw pattern matches per document and exit.
    #[arg(long)]
    raw: bool,

    /// Disable progress bar.
    #[arg(long, env = "PSCORE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs (raw matches per page).
    #[arg(short, long, env = "PSCORE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PSCORE_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level chatter unless --verbose is set.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.raw && cli.documents.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build scorer ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let renderer: Box<dyn HistogramRenderer> = match cli.svg {
        Some(ref path) => Box::new(SvgHistogram::new(path)),
        None => Box::new(TextHistogram::new(io::stderr())),
    };

    let mut scorer = PScorer::new(config)
        .context("Failed to initialise the PDF text backend")?
        .with_renderer(renderer);

    if show_progress {
        scorer = scorer.with_progress(CliProgressCallback::new());
    }

    // ── Raw mode ─────────────────────────────────────────────────────────
    if cli.raw {
        let mut raw = BTreeMap::new();
        for doc in &cli.documents {
            let found = scorer
                .raw_p_values(doc, None)
                .with_context(|| format!("Failed to scan {doc}"))?;
            raw.insert(doc.as_str(), found);
        }
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&raw).context("Failed to serialise matches")?
            );
        } else {
            for (doc, found) in &raw {
                println!("{}", bold(doc));
                for m in found {
                    println!("  {m}");
                }
            }
        }
        return Ok(());
    }

    // ── Summarize ────────────────────────────────────────────────────────
    let options = build_options(&cli)?;
    let values = scorer
        .summarize(&cli.documents, &options)
        .context("Scan failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&values).context("Failed to serialise values")?
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for v in &values {
            writeln!(handle, "{v}").context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "{} p-values{}",
            values.len(),
            if options.significant {
                " (≤ 0.05)"
            } else {
                ""
            }
        );
    }

    Ok(())
}

/// Map CLI args to `ScorerConfig`.
fn build_config(cli: &Cli) -> Result<ScorerConfig> {
    let mut builder = ScorerConfig::builder().files_path(&cli.files_path);
    if let Some(ref pattern) = cli.pattern {
        builder = builder.search_pattern(pattern);
    }
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    builder.build().context("Invalid configuration")
}

/// Map CLI args to `SummarizeOptions`.
fn build_options(cli: &Cli) -> Result<SummarizeOptions> {
    let significant = !cli.all;
    let mut options = SummarizeOptions::default().significant(significant);
    if let Some(ref spec) = cli.bins {
        options = options.bins(parse_bins(spec, significant)?);
    }
    if let Some(ref title) = cli.title {
        options = options.title(title);
    }
    Ok(options)
}

/// Parse `--bins`: `0,0.01,0.02` or `width:0.01`.
fn parse_bins(s: &str, significant: bool) -> Result<Vec<f64>> {
    let s = s.trim();

    if let Some(width) = s.strip_prefix("width:") {
        let width: f64 = width.trim().parse().context("Invalid bin width")?;
        if !(width > 0.0 && width.is_finite()) {
            anyhow::bail!("Bin width must be positive (got {})", width);
        }
        let x_max = if significant { 0.05 } else { 1.0 };
        if width > x_max {
            anyhow::bail!("Bin width {} exceeds the axis range [0, {}]", width, x_max);
        }
        return Ok(BinLayout::uniform(width, x_max).edges);
    }

    let edges = s
        .split(',')
        .map(|e| {
            e.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid bin edge: '{}'", e.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    if edges.len() < 2 {
        anyhow::bail!("At least two bin edges are needed (got {})", edges.len());
    }
    Ok(edges)
}
