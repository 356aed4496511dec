mod output;
mod prompt;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vacancy_client::{ApiConfig, HhClient};
use vacancy_core::ingest::{
    IngestOptions, IngestService, TracingIngestReporter, fetch_batch, load_snapshot, summarize,
};
use vacancy_core::roster::{ROSTER, RosterEntry, select_companies};
use vacancy_core::snapshot::{SnapshotDocument, SnapshotFile, merge};
use vacancy_db::{Database, DatabaseConfig, VacancyRepository};

const DEFAULT_SNAPSHOT: &str = "hh_data.json";

/// Used when `RUST_LOG` is unset or does not parse.
const LOG_DIRECTIVES: &[&str] = &[
    "vacancies=info",
    "vacancy_core=info",
    "vacancy_client=info",
    "vacancy_db=info",
];

#[derive(Parser)]
#[command(
    name = "vacancies",
    version,
    about = "Load hh.ru vacancies for a fixed employer roster into PostgreSQL"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(
        short,
        long,
        global = true,
        env = "VACANCY_CONFIG",
        default_value = "config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch companies and replace the snapshot file without touching the database
    Fetch {
        /// Comma-separated 1-based roster numbers (default: whole roster)
        #[arg(long)]
        companies: Option<String>,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that need a database connection.
#[derive(Subcommand)]
enum StoreCommand {
    /// Fetch selected companies, store them, update the snapshot, and report (default)
    Ingest(IngestArgs),

    /// Store the contents of the snapshot file
    LoadSnapshot {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Show company and vacancy counts
    Stats,

    /// Search stored vacancies by keyword in name or description
    Search {
        #[arg(short, long)]
        keyword: String,
    },
}

#[derive(Args, Default)]
struct IngestArgs {
    /// Clear both tables without asking
    #[arg(long, conflicts_with = "keep")]
    clear: bool,

    /// Keep existing rows without asking
    #[arg(long)]
    keep: bool,

    /// Comma-separated 1-based roster numbers, e.g. 1,3,5
    #[arg(long)]
    companies: Option<String>,

    /// Keyword for the final search (skips the prompt)
    #[arg(long)]
    keyword: Option<String>,

    #[command(flatten)]
    snapshot: SnapshotArgs,
}

#[derive(Args, Default)]
struct SnapshotArgs {
    /// Snapshot JSON file
    #[arg(long, env = "VACANCY_SNAPSHOT")]
    snapshot: Option<PathBuf>,
}

impl SnapshotArgs {
    fn file(&self) -> SnapshotFile {
        SnapshotFile::new(
            self.snapshot
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT)),
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env_directives.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Store(StoreCommand::Ingest(IngestArgs::default())));

    match command {
        Commands::Fetch {
            companies,
            snapshot,
        } => {
            let api = load_api_config(&cli.config)?;
            cmd_fetch(&api, companies.as_deref(), &snapshot).await
        }
        Commands::Store(command) => {
            let text = std::fs::read_to_string(&cli.config).with_context(|| {
                format!("Failed to read config file: {}", cli.config.display())
            })?;
            let config = ConfigText {
                text,
                origin: cli.config.display().to_string(),
            };
            let db_config = DatabaseConfig::from_toml_str(&config.text, &config.origin)?;

            let db = Database::connect(&db_config).await?;
            let result = run_with_db(command, &db, &config).await;
            db.close().await;
            result
        }
    }
}

/// `RUST_LOG` when it is set and parses, otherwise [`LOG_DIRECTIVES`].
fn log_filter(env_directives: Option<&str>) -> EnvFilter {
    env_directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(LOG_DIRECTIVES.join(",")))
}

/// Raw config file contents, parsed per section on demand.
struct ConfigText {
    text: String,
    origin: String,
}

/// The `[api]` section is optional, so a missing file falls back to defaults
/// for commands that never touch the database.
fn load_api_config(path: &Path) -> Result<ApiConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(ApiConfig::from_toml_str(&text, &path.display().to_string())?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ApiConfig::default()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read config file: {}", path.display()))
        }
    }
}

fn roster_selection(companies: Option<&str>) -> Result<Option<Vec<RosterEntry>>> {
    companies
        .map(|input| select_companies(input).context("Invalid --companies"))
        .transpose()
}

async fn run_with_db(command: StoreCommand, db: &Database, config: &ConfigText) -> Result<()> {
    let repo = db.vacancy_repo();

    match command {
        StoreCommand::Ingest(args) => {
            let api = ApiConfig::from_toml_str(&config.text, &config.origin)?;
            let client = HhClient::new(&api)?;
            let service = IngestService::new(client, repo, args.snapshot.file());
            cmd_ingest(&service, args).await
        }
        StoreCommand::LoadSnapshot { snapshot } => {
            let batch = load_snapshot(&repo, &snapshot.file(), &TracingIngestReporter).await?;
            if batch.companies.is_empty() {
                println!("Snapshot is empty, nothing to load.");
            } else {
                output::print_batch(&batch);
            }
            Ok(())
        }
        StoreCommand::Stats => {
            repo.ensure_schema().await?;
            output::print_summary(&summarize(&repo).await?);
            output::print_company_counts(&repo.companies_with_vacancy_counts().await?);
            Ok(())
        }
        StoreCommand::Search { keyword } => {
            repo.ensure_schema().await?;
            let matches = repo.search_vacancies(&keyword).await?;
            output::print_search(&keyword, &matches);
            Ok(())
        }
    }
}

async fn cmd_ingest(
    service: &IngestService<HhClient, VacancyRepository>,
    args: IngestArgs,
) -> Result<()> {
    let clear_tables = if args.clear {
        true
    } else if args.keep {
        false
    } else {
        prompt::confirm_clear()?
    };

    let companies = match roster_selection(args.companies.as_deref())? {
        Some(companies) => companies,
        None => prompt::choose_companies()?,
    };

    let report = service
        .run(&companies, IngestOptions { clear_tables })
        .await?;
    output::print_ingest_report(&report);

    let keyword = match args.keyword {
        Some(keyword) => keyword,
        None => prompt::ask_keyword()?,
    };
    let matches = service.search(&keyword).await?;
    output::print_search(&keyword, &matches);

    Ok(())
}

async fn cmd_fetch(
    api: &ApiConfig,
    companies: Option<&str>,
    snapshot: &SnapshotArgs,
) -> Result<()> {
    let companies = roster_selection(companies)?.unwrap_or_else(|| ROSTER.to_vec());
    let snapshot = snapshot.file();
    let client = HhClient::new(api)?;

    let fetched = fetch_batch(&client, &companies, &TracingIngestReporter).await?;
    if fetched.payloads.is_empty() {
        println!("No data to process, snapshot left untouched.");
        return Ok(());
    }

    let document = merge(SnapshotDocument::new(), &fetched.payloads);
    snapshot.write(&document)?;

    println!(
        "Wrote {} companies to {}",
        document.len(),
        snapshot.path().display()
    );
    for skipped in &fetched.skipped {
        println!("  ! {} skipped", skipped.name);
    }
    Ok(())
}
