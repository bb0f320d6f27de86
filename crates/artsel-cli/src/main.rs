//! artsel CLI
//!
//! Browse Art Institute of Chicago artworks page by page and keep a
//! persistent selection across pages and runs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use artsel_core::{BlobStore, Config, FileBlobStore, MemoryBlobStore};

mod commands;
mod output;
mod tui;

use commands::AppSession;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "artsel")]
#[command(about = "artsel - Page through artworks and keep a selection")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a config file other than the default
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Keep the selection in memory only; nothing is restored or saved
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui {
        /// Page to open on
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show a page of artworks with selection marks
    #[command(alias = "ls")]
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Records per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Select the first N records, starting at a page
    Select {
        /// How many records to select
        #[arg(allow_negative_numbers = true)]
        count: i64,
        /// Page to start from
        #[arg(short, long, default_value_t = 1)]
        from_page: usize,
        /// Records per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Toggle selection of records on a page
    Toggle {
        /// Artwork ids on that page
        #[arg(required = true)]
        ids: Vec<u64>,
        /// Page the ids are on
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Records per page (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Inspect or reset the saved selection
    Selection {
        #[command(subcommand)]
        command: Option<SelectionCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show session status
    Status,
}

#[derive(Subcommand)]
enum SelectionCommands {
    /// List selected artworks
    Show,
    /// Write selected artworks as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Deselect everything and end the session
    Clear,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, page_size, fields, data_dir, session, request_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work even when the current config is invalid
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config_path.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config_path.as_ref())
        .context("Failed to load configuration")?;

    // TUI is the default when no command is given
    let command = cli.command.unwrap_or(Commands::Tui { page: 1 });
    match command {
        Commands::Tui { .. } => tui::init_logging(&config),
        _ => init_cli_logging(),
    }

    if cli.ephemeral {
        let session = commands::open_session(&config, MemoryBlobStore::new())?;
        run_command(command, &config, session, &output).await
    } else {
        let blobs = FileBlobStore::new(config.session_dir());
        let session = commands::open_session(&config, blobs)?;
        run_command(command, &config, session, &output).await
    }
}

async fn run_command<B: BlobStore>(
    command: Commands,
    config: &Config,
    mut session: AppSession<B>,
    output: &Output,
) -> Result<()> {
    match command {
        Commands::Tui { page } => tui::run(session, page).await,
        Commands::List { page, limit } => {
            commands::page::list(&mut session, page, limit, output).await
        }
        Commands::Select {
            count,
            from_page,
            limit,
        } => commands::page::select(&mut session, count, from_page, limit, output).await,
        Commands::Toggle { ids, page, limit } => {
            commands::page::toggle(&mut session, ids, page, limit, output).await
        }
        Commands::Selection { command } => handle_selection_command(command, &mut session, output),
        Commands::Status => commands::status::show(config, &session, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_selection_command<B: BlobStore>(
    command: Option<SelectionCommands>,
    session: &mut AppSession<B>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(SelectionCommands::Show) | None => commands::selection::show(session, output),
        Some(SelectionCommands::Export { out }) => {
            commands::selection::export(session, out, output)
        }
        Some(SelectionCommands::Clear) => commands::selection::clear(session, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr, filtered by ARTSEL_LOG (warnings only by default)
fn init_cli_logging() {
    let filter = std::env::var("ARTSEL_LOG")
        .ok()
        .and_then(|level| {
            EnvFilter::try_new(format!("artsel_core={level},artsel_cli={level}")).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
