use aimcr_core::config::ReviewConfig;
use aimcr_core::drafts::store::{read_record_file, DraftStore};
use aimcr_core::review::checklist::{ArtifactCategory, RiskScore};
use aimcr_core::review::interchange::to_report_input;
use aimcr_core::review::model::{MetadataField, ReviewRecord};
use aimcr_core::session::ReviewSession;
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Manage AI model control review drafts and submissions.
#[derive(Debug, Parser)]
#[command(name = "aimcr-drafts", version)]
struct Cli {
    /// Config file (defaults to ./aimcr.toml when present).
    #[arg(long, global = true, env = "AIMCR_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `storage.drafts_dir`.
    #[arg(long, global = true)]
    drafts_dir: Option<PathBuf>,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List saved drafts, newest first.
    List,
    /// Start a review and save it as a draft.
    New {
        project_id: String,
        /// `<category>=<name>`, e.g. `models=phi-3`. Repeatable.
        #[arg(long = "artifact", value_parser = parse_artifact_arg)]
        artifacts: Vec<(ArtifactCategory, String)>,
        #[arg(long)]
        reviewer: Option<String>,
    },
    /// Score one check of one artifact and save the result as a new draft.
    Score {
        draft: String,
        #[arg(value_parser = parse_category)]
        category: ArtifactCategory,
        /// 1-based artifact position within the category.
        artifact: usize,
        check: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..=5))]
        score: u64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Print category and overall risk for a draft name or a review file.
    Risk {
        draft: String,
        #[arg(long)]
        json: bool,
    },
    /// Write the report-input form of a draft.
    Export { draft: String, output: PathBuf },
    /// Final submission. Requires `--confirm`.
    Submit {
        draft: String,
        #[arg(long)]
        confirm: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }

    if let Err(error) = run(cli) {
        tracing::error!(error = ?error, "command failed");
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ReviewConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.drafts_dir {
        config.storage.drafts_dir = dir;
    }
    let store = DraftStore::open(&config.storage.drafts_dir)
        .with_context(|| format!("failed to open drafts in {}", config.storage.drafts_dir.display()))?;
    store.refresh();
    let now = OffsetDateTime::now_utc();

    match cli.command {
        Command::List => {
            for entry in store.list()? {
                println!("{}\t{}", entry.name, entry.label());
            }
        }
        Command::New {
            project_id,
            artifacts,
            reviewer,
        } => {
            let mut session = ReviewSession::new(&config.session, now);
            session.set_metadata(MetadataField::ProjectId, project_id);
            if let Some(reviewer) = reviewer {
                session.set_metadata(MetadataField::ReviewerName, reviewer);
            }
            for (category, name) in artifacts {
                let index = session.add_artifact(category);
                session.rename_artifact(category, index, name)?;
            }
            let entry = session.save_draft(&store, now)?;
            println!("Draft saved: {}", entry.path.display());
        }
        Command::Score {
            draft,
            category,
            artifact,
            check,
            score,
            notes,
        } => {
            let record = load_record(&store, &draft)?;
            let index = artifact
                .checked_sub(1)
                .ok_or_else(|| anyhow!("artifact positions start at 1"))?;
            let score = RiskScore::from_value(score).ok_or_else(|| anyhow!("score must be between 1 and 5"))?;

            let mut session = ReviewSession::from_record(record, &config.session, now);
            session.set_score(category, index, &check, score)?;
            if let Some(notes) = notes {
                session.set_notes(category, index, &check, notes)?;
            }
            let entry = session.save_draft(&store, now)?;
            println!("Draft saved: {}", entry.path.display());
        }
        Command::Risk { draft, json } => {
            let record = load_record(&store, &draft)?;
            let session = ReviewSession::from_record(record, &config.session, now);
            let risk = session.review_risk();
            if json {
                println!("{}", serde_json::to_string_pretty(&risk)?);
            } else {
                for category in &risk.categories {
                    println!(
                        "{}: {} ({})",
                        category.category.report_title(),
                        category.total,
                        category.severity
                    );
                }
                println!("FINAL RISK SCORE: {} ({})", risk.total, risk.verdict());
            }
        }
        Command::Export { draft, output } => {
            let record = load_record(&store, &draft)?;
            let value = to_report_input(&record)?;
            std::fs::write(&output, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Exported: {}", output.display());
        }
        Command::Submit { draft, confirm } => {
            if !confirm {
                bail!("submission is final; re-run with --confirm");
            }
            let record = load_record(&store, &draft)?;
            let mut session = ReviewSession::from_record(record, &config.session, now);
            let receipt = session.submit(&store, &config.storage.submissions_dir, confirm, now)?;
            println!(
                "Submitted: {} (sha256 {})",
                receipt.folder.display(),
                receipt.data_sha256
            );
        }
    }
    Ok(())
}

/// A bare name is looked up in the draft store; anything that looks like a path is read directly.
fn load_record(store: &DraftStore, draft: &str) -> anyhow::Result<ReviewRecord> {
    let path = Path::new(draft);
    if path.components().count() > 1 || path.is_file() {
        return read_record_file(path).with_context(|| format!("failed to read review from {}", draft));
    }
    store
        .load(draft)
        .with_context(|| format!("failed to load draft {}", draft))
}

fn parse_category(raw: &str) -> Result<ArtifactCategory, String> {
    ArtifactCategory::from_key(raw).ok_or_else(|| {
        let keys: Vec<&str> = ArtifactCategory::ALL.iter().map(|c| c.key()).collect();
        format!("unknown category '{}' (expected one of: {})", raw, keys.join(", "))
    })
}

fn parse_artifact_arg(raw: &str) -> Result<(ArtifactCategory, String), String> {
    let (category, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <category>=<name>, got '{}'", raw))?;
    Ok((parse_category(category.trim())?, name.trim().to_string()))
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
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
