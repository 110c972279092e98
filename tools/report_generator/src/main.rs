use aimcr_core::config::{ReportFormat, ReviewConfig};
use aimcr_core::drafts::store::read_record_file;
use aimcr_core::report::layout::ReportOptions;
use aimcr_core::report::{default_output_path, sink_for, write_report};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Html,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Html => ReportFormat::Html,
        }
    }
}

/// Render a finished AI model control review to a document.
#[derive(Debug, Parser)]
#[command(name = "aimcr-report", version)]
struct Cli {
    /// Review JSON: a saved draft, a submission data.json, or report input.
    input: PathBuf,

    /// Output document. Defaults to the input path with the format's extension.
    output: Option<PathBuf>,

    /// Document format. Falls back to the output extension, then to config.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Config file (defaults to ./aimcr.toml when present).
    #[arg(long, env = "AIMCR_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }

    match run(&cli) {
        Ok(path) => println!("Report created: {}", path.display()),
        Err(error) => {
            tracing::error!(error = ?error, input = %cli.input.display(), "report generation failed");
            eprintln!("Error: {error:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<PathBuf> {
    let config = ReviewConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let format = resolve_format(cli.format, cli.output.as_deref(), config.report.format);
    let sink = sink_for(format);

    let record = read_record_file(&cli.input)
        .with_context(|| format!("failed to read review from {}", cli.input.display()))?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, sink.as_ref()));

    let options = ReportOptions::from_config(&config.report);
    write_report(&record, &options, sink.as_ref(), &output)
        .with_context(|| format!("failed to write report to {}", output.display()))
}

fn resolve_format(flag: Option<FormatArg>, output: Option<&Path>, configured: ReportFormat) -> ReportFormat {
    if let Some(flag) = flag {
        return flag.into();
    }
    match output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("html") | Some("htm") => ReportFormat::Html,
        Some("md") | Some("markdown") => ReportFormat::Markdown,
        _ => configured,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("AIMCR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
