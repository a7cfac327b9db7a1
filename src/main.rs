use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use assay_receipts::commands::session::{self, PrintOptions};
use assay_receipts::commands::{history, receipts, settings};
use assay_receipts::db::{Database, HistoryStore, MemoryStore};
use assay_receipts::models::Settings;
use assay_receipts::services::state::AppState;

#[derive(Parser)]
#[command(name = "receipts")]
#[command(about = "Collection vouchers for an assaying and hallmarking centre")]
#[command(version)]
struct Cli {
    /// Directory holding the receipt database and exported vouchers
    #[arg(long, env = "ASSAY_RECEIPTS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep history in memory only; nothing is written to disk except vouchers
    #[arg(long)]
    ephemeral: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit receipts interactively (default)
    Edit,

    /// List saved receipts, newest first
    History,

    /// Print a saved receipt to the terminal
    Show {
        /// Receipt number (e.g. RC12) or id
        receipt: String,
    },

    /// Export a saved receipt as HTML and open it for printing
    Print {
        /// Receipt number (e.g. RC12) or id
        receipt: String,

        /// Only write the file
        #[arg(long)]
        no_open: bool,
    },

    /// Show the number the next new receipt will get
    NextNumber,

    /// Inspect or change the printed company details and fee constants
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List every setting
    Show,
    /// Change one setting
    Set { key: String, value: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir(),
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Create data dir {}", data_dir.display()))?;
    let print = PrintOptions {
        dir: data_dir.join("vouchers"),
        open_file: true,
    };

    match cli.command.unwrap_or(Commands::Edit) {
        Commands::Edit => {
            let mut state = open_state(cli.ephemeral, &data_dir)?;
            let stdin = io::stdin();
            session::run(&mut state, &print, stdin.lock(), io::stdout()).context("Session I/O")?;
        }
        Commands::History => {
            let state = open_state(cli.ephemeral, &data_dir)?;
            println!("{}", history::format_history(&history::get_history(&state)));
        }
        Commands::Show { receipt } => {
            let mut state = open_state(cli.ephemeral, &data_dir)?;
            history::load_receipt(receipt, &mut state).map_err(|e| anyhow!(e))?;
            print!("{}", receipts::show_receipt(&state));
        }
        Commands::Print { receipt, no_open } => {
            let mut state = open_state(cli.ephemeral, &data_dir)?;
            history::load_receipt(receipt, &mut state).map_err(|e| anyhow!(e))?;
            let message =
                receipts::print_receipt(&state, &print.dir, !no_open).map_err(|e| anyhow!(e))?;
            println!("{}", message);
        }
        Commands::NextNumber => {
            let state = open_state(cli.ephemeral, &data_dir)?;
            println!("{}", state.history().next_receipt_number());
        }
        Commands::Config { action } => {
            if cli.ephemeral {
                bail!("Settings are stored on disk; drop --ephemeral to change them");
            }
            let db = open_database(&data_dir)?;
            match action {
                ConfigAction::Show => {
                    for (key, value) in settings::get_settings(&db).map_err(|e| anyhow!(e))? {
                        println!("{:<16} {}", key, value);
                    }
                }
                ConfigAction::Set { key, value } => {
                    settings::save_setting(&db, &key, &value).map_err(|e| anyhow!(e))?;
                }
            }
        }
    }
    Ok(())
}

/// Session over the on-disk store, or an in-memory one with default settings.
fn open_state(ephemeral: bool, data_dir: &Path) -> Result<AppState> {
    if ephemeral {
        let store: Box<dyn HistoryStore> = Box::new(MemoryStore::new());
        return Ok(AppState::new(store, Settings::default()));
    }
    let db = open_database(data_dir)?;
    let app_settings = settings::load_settings(&db);
    Ok(AppState::new(Box::new(db), app_settings))
}

fn open_database(data_dir: &Path) -> Result<Database> {
    let db_path = data_dir.join("receipts.sqlite");
    Database::new(db_path.clone()).with_context(|| format!("Open database {}", db_path.display()))
}

fn default_data_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("assay-receipts");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local/share/assay-receipts");
    }
    PathBuf::from(".assay-receipts")
}
