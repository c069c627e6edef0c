//! marc: pack files into `.mar` archives and unpack them again
//!
//! Commands:
//!   archive FILES... [-n NAME]   - create NAME.mar from the given files
//!   un-archive ARCHIVE [-d DIR]  - extract every entry into DIR
//!   list ARCHIVE [--json]        - show entry names and sizes
//!   config show                  - display the active configuration
//!
//! Archive commands take a password via `-p`, `MARC_PASSWORD`, or
//! `--ask-password` (interactive prompt).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

use marc_archive::{Marchive, ProgressFn};
use marc_core::config::MarcConfig;
use marc_core::MarcError;
use marc_storage::LocalFileSystem;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "marc",
    version,
    about = "Single-file archiver with optional password encryption"
)]
struct Cli {
    /// Path to marc.toml configuration file
    #[arg(long, short = 'c', env = "MARC_CONFIG", default_value = "marc.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "MARC_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "MARC_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack files into NAME.mar
    Archive {
        /// Files to add; each is stored under the path as given
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Archive name (".mar" is appended; default from config)
        #[arg(long, short = 'n')]
        name: Option<String>,
        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Extract every entry of an archive
    ///
    /// Entries are written under their bare file name; directories stored in
    /// entry names are not recreated.
    UnArchive {
        /// Archive to extract (".mar" is optional)
        archive: PathBuf,
        /// Output directory (default: config output_dir, then current dir)
        #[arg(long, short = 'd')]
        directory: Option<PathBuf>,
        #[command(flatten)]
        password: PasswordArgs,
    },

    /// List entry names and sizes
    List {
        archive: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        password: PasswordArgs,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Args, Debug, Default)]
struct PasswordArgs {
    /// Archive password
    #[arg(long, short = 'p', env = "MARC_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Prompt for the password instead
    #[arg(long)]
    ask_password: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

const INVALID_KEY_MESSAGE: &str =
    "Invalid password provided (or archive is not password protected).";

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_invalid_key(&e) => {
            eprintln!("{INVALID_KEY_MESSAGE}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = MarcConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .unwrap_or_else(|| parse_log_format(&config.log.format));
    init_logging(&level, format);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "marc starting"
    );

    match cli.command {
        Commands::Archive {
            files,
            name,
            password,
        } => {
            let name = name.unwrap_or_else(|| config.archive.default_name.clone());
            cmd_archive(&config, &files, &name, password.resolve()?.as_ref())
        }
        Commands::UnArchive {
            archive,
            directory,
            password,
        } => cmd_un_archive(
            &config,
            &archive,
            directory.as_deref(),
            password.resolve()?.as_ref(),
        ),
        Commands::List {
            archive,
            json,
            password,
        } => cmd_list(&config, &archive, json, password.resolve()?.as_ref()),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn parse_log_format(s: &str) -> LogFormat {
    if s.eq_ignore_ascii_case("json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}

impl PasswordArgs {
    fn resolve(&self) -> Result<Option<SecretString>> {
        if self.ask_password {
            let entered =
                rpassword::prompt_password("Password: ").context("reading password from terminal")?;
            return Ok(Some(SecretString::from(entered)));
        }
        Ok(self.password.clone().map(SecretString::from))
    }
}

/// True if any error in the chain is a failed key check.
fn is_invalid_key(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<MarcError>(), Some(MarcError::InvalidKey)))
}

// ── Progress bar helpers ──────────────────────────────────────────────────────

fn make_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ── `marc archive` ────────────────────────────────────────────────────────────

fn cmd_archive(
    config: &MarcConfig,
    files: &[PathBuf],
    name: &str,
    password: Option<&SecretString>,
) -> Result<()> {
    let marchive = Marchive::from_config(LocalFileSystem, config);

    match marchive
        .archive_files(files, name, password)
        .with_context(|| format!("creating archive {name}"))?
    {
        Some(path) => println!("Archive {} successfully created.", path.display()),
        None => println!("Nothing to archive."),
    }
    Ok(())
}

// ── `marc un-archive` ─────────────────────────────────────────────────────────

fn cmd_un_archive(
    config: &MarcConfig,
    archive: &Path,
    directory: Option<&Path>,
    password: Option<&SecretString>,
) -> Result<()> {
    let marchive = Marchive::from_config(LocalFileSystem, config);

    let pb = make_progress_bar(0, "extract");
    let bar = pb.clone();
    let progress: ProgressFn = Box::new(move |done, total, name| {
        bar.set_length(total);
        bar.set_position(done);
        bar.set_message(name.to_string());
    });

    let result = marchive.extract_with_progress(archive, directory, password, Some(&progress));
    pb.finish_and_clear();
    let report = result.with_context(|| format!("extracting {}", archive.display()))?;

    let dir = report.output_dir.display();
    for path in &report.extracted {
        let file = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("{file} successfully extracted to {dir}.");
    }
    for failure in &report.failures {
        eprintln!("{}: {}", failure.name, failure.reason);
    }
    println!(
        "{}/{} files extracted successfully.",
        report.success_count(),
        report.total()
    );

    if !report.is_complete() {
        anyhow::bail!("{} entries could not be extracted", report.failures.len());
    }
    Ok(())
}

// ── `marc list` ───────────────────────────────────────────────────────────────

fn cmd_list(
    config: &MarcConfig,
    archive: &Path,
    json: bool,
    password: Option<&SecretString>,
) -> Result<()> {
    let marchive = Marchive::from_config(LocalFileSystem, config);
    let entries = marchive
        .list(archive, password)
        .with_context(|| format!("reading {}", archive.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("serializing entry list")?
        );
        return Ok(());
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(4).max(4);
    println!("{:<width$}  {:>10}", "NAME", "SIZE");
    for entry in &entries {
        println!("{:<width$}  {:>10}", entry.name, fmt_bytes(entry.size));
    }
    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!("{} entries, {}", entries.len(), fmt_bytes(total));
    Ok(())
}

// ── `marc config show` ────────────────────────────────────────────────────────

fn cmd_config_show(config: &MarcConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

fn fmt_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
