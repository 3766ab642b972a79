use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tercet_core::seed::{load_ids_from_file, parse_id_line, seed_catalog};
use tercet_core::{BatchInsert, Catalog, CatalogStore, Outcome, Pipeline};
use tercet_fetch::{ContentRecord, Fetcher, FetcherConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

pub const DEFAULT_DB_PATH: &str = "~/.config/tercet/tercet.db";

pub const NO_RECORD_MESSAGE: &str = "Problems parsing the submission. Try again.";
pub const CATALOG_EMPTY_MESSAGE: &str = "The catalog is empty. Add references with `tercet add`.";

const EXAMPLE_PAYLOAD: &str = r#"{"title": "An old silent pond / A frog jumps into the pond / Splash! Silence again.", "author": "Matsuo Basho"}"#;

/// How a record is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Expand `~` in the database location
pub fn resolve_db_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Make sure the base URL ends in `/` so ids are appended as a path segment
pub fn normalize_base_url(url: &Url) -> String {
    let raw = url.as_str();
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    }
}

/// Ids from the command line, or from a file when one is given
pub fn collect_ids(cli_ids: &[String], file: Option<&PathBuf>) -> Result<Vec<String>> {
    let ids: Vec<String> = if let Some(path) = file {
        load_ids_from_file(path)
            .with_context(|| format!("Failed to read id file {}", path.display()))?
    } else {
        cli_ids.iter().filter_map(|id| parse_id_line(id)).collect()
    };

    if ids.is_empty() {
        bail!("No reference ids given");
    }
    Ok(ids)
}

pub fn format_record(record: &ContentRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(record).context("Failed to serialize record")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for line in record.lines() {
                out.push_str(&format!("  {}\n", line.bright_white().bold()));
            }
            out.push('\n');
            out.push_str(&format!("    ~ {}\n", record.attribution().italic().cyan()));
            Ok(out)
        }
    }
}

pub fn example_record() -> Result<ContentRecord> {
    tercet_fetch::extract(EXAMPLE_PAYLOAD).context("Built-in example failed validation")
}

fn open_catalog(db_path: &Path) -> Result<Catalog> {
    if !Catalog::exists(db_path) {
        bail!(
            "No catalog at {}. Run `tercet init` first.",
            db_path.display()
        );
    }
    Catalog::open(db_path).with_context(|| format!("Failed to open {}", db_path.display()))
}

fn output_format(args: &ArgMatches) -> OutputFormat {
    args.get_one::<String>("format")
        .and_then(|f| OutputFormat::parse(f))
        .unwrap_or(OutputFormat::Text)
}

fn print_batch_report(report: &BatchInsert) {
    println!(
        "{} {} reference(s) added",
        "✓".green().bold(),
        report.inserted.to_string().cyan()
    );
    if !report.duplicates.is_empty() {
        println!(
            "{} {} already present:",
            "⚠".yellow().bold(),
            report.duplicates.len().to_string().yellow()
        );
        for id in &report.duplicates {
            println!("  {} {}", "•".yellow(), id);
        }
    }
}

pub fn handle_init(db_path: &Path, args: &ArgMatches) -> Result<()> {
    let force = args.get_flag("force");
    let seed_file = args.get_one::<PathBuf>("seed-file");

    if Catalog::exists(db_path) {
        if !force {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!(
                "Catalog already exists at {}",
                db_path.display().to_string().bright_white()
            );
            println!("Use --force to recreate it.");
            return Ok(());
        }
        println!("{} Deleting existing catalog (force mode)", "→".yellow().bold());
        Catalog::drop(db_path)
            .with_context(|| format!("Failed to delete {}", db_path.display()))?;
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    println!("{} Creating catalog...", "→".blue());
    let catalog = Catalog::open(db_path)
        .with_context(|| format!("Failed to create {}", db_path.display()))?;
    println!(
        "{} Catalog initialized: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );

    if let Some(path) = seed_file {
        let ids = collect_ids(&[], Some(path))?;
        println!("{} Seeding from {}", "→".blue(), path.display());
        let report = seed_catalog(&catalog, &ids)?;
        print_batch_report(&report);
    }

    Ok(())
}

pub fn handle_add(db_path: &Path, args: &ArgMatches) -> Result<()> {
    let cli_ids: Vec<String> = args
        .get_many::<String>("ID")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let ids = collect_ids(&cli_ids, args.get_one::<PathBuf>("file"))?;

    let catalog = open_catalog(db_path)?;
    let report = catalog.insert_batch(&ids)?;
    print_batch_report(&report);
    Ok(())
}

pub async fn handle_next(db_path: &Path, args: &ArgMatches, quiet: bool) -> Result<()> {
    let base_url = args
        .get_one::<Url>("base-url")
        .context("Missing base URL")?;
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&10);
    let format = output_format(args);

    let mut config = FetcherConfig {
        base_url: normalize_base_url(base_url),
        connect_timeout: Duration::from_secs(timeout),
        read_timeout: Duration::from_secs(timeout),
        ..FetcherConfig::default()
    };
    if let Some(agent) = args.get_one::<String>("user-agent") {
        config.user_agent = agent.clone();
    }

    debug!("Using catalog at {}", db_path.display());
    let catalog = open_catalog(db_path)?;
    let pipeline = Arc::new(Pipeline::new(
        Arc::new(catalog),
        Fetcher::with_config(config),
    ));

    let spinner = if quiet {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("Invalid spinner template")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Fetching...");
        Some(spinner)
    };

    let outcome = pipeline.spawn_next().await?;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        Outcome::Record(record) => {
            print!("{}", format_record(&record, format)?);
            if format == OutputFormat::Json {
                println!();
            }
            Ok(())
        }
        Outcome::NoRecord => {
            eprintln!("{} {}", "✗".red().bold(), NO_RECORD_MESSAGE);
            std::process::exit(1);
        }
        Outcome::CatalogEmpty => {
            eprintln!("{} {}", "✗".red().bold(), CATALOG_EMPTY_MESSAGE);
            std::process::exit(1);
        }
    }
}

pub fn handle_list(db_path: &Path) -> Result<()> {
    let catalog = open_catalog(db_path)?;
    let references = catalog.list()?;

    for reference in &references {
        let marker = if reference.visited {
            "✓".green()
        } else {
            "·".dimmed()
        };
        println!("  {} {}", marker, reference.id);
    }

    let unvisited = catalog.unvisited_count()?;
    println!();
    println!(
        "{} references, {} unvisited",
        references.len().to_string().cyan(),
        unvisited.to_string().cyan()
    );
    Ok(())
}

pub fn handle_reset(db_path: &Path) -> Result<()> {
    let catalog = open_catalog(db_path)?;
    let cleared = catalog.reset_visited()?;
    println!(
        "{} {} visited flag(s) cleared",
        "✓".green().bold(),
        cleared.to_string().cyan()
    );
    Ok(())
}

pub fn handle_example(args: &ArgMatches) -> Result<()> {
    let format = output_format(args);
    let record = example_record()?;
    print!("{}", format_record(&record, format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
