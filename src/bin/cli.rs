//! docstore CLI
//!
//! Operator interface for inspecting and editing a docstore data directory.

use std::process;

use clap::{Parser, Subcommand};
use docstore::{Config, Store, DEFAULT_RECENT_LOGS};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// docstore CLI
#[derive(Parser, Debug)]
#[command(name = "docstore-cli")]
#[command(about = "CLI for the docstore JSON record store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, env = "DOCSTORE_DATA_DIR", default_value = "./data")]
    data_dir: String,

    /// Snapshot directory (defaults to <data-dir>/backups)
    #[arg(short, long, env = "DOCSTORE_BACKUP_DIR")]
    backup_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create missing table files and verify existing ones
    Init,

    /// Snapshot every table file
    Backup,

    /// Print a whole table
    Dump {
        /// Table name (users, servers, plans, logs)
        table: String,
    },

    /// Print a user's plan record
    GetUser {
        /// User id
        id: String,
    },

    /// Replace a user's plan record
    SetUser {
        /// User id
        id: String,

        /// Record as a JSON object
        json: String,
    },

    /// Delete a user's plan record
    RemoveUser {
        /// User id
        id: String,
    },

    /// Print a server record
    GetServer {
        /// Server id
        id: String,
    },

    /// Replace a server record
    SetServer {
        /// Server id
        id: String,

        /// Record as a JSON object
        json: String,
    },

    /// Append an activity log entry
    Log {
        /// Acting user id
        user: String,

        /// Action name
        action: String,

        /// Details as JSON
        #[arg(default_value = "{}")]
        details: String,
    },

    /// Print the newest activity log entries
    Logs {
        /// Number of entries
        #[arg(short, long, default_value_t = DEFAULT_RECENT_LOGS)]
        limit: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,docstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder().data_dir(&args.data_dir);
    if let Some(dir) = &args.backup_dir {
        builder = builder.backup_dir(dir);
    }

    // Initialization failures are fatal
    let store = match Store::open(builder.build()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&store, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(store: &Store, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Init => {
            for table in store.cached_tables() {
                println!("{}\t{} entries", table, store.entry_count(table));
            }
        }
        Commands::Backup => {
            let path = store.backup()?;
            println!("{}", path.display());
        }
        Commands::Dump { table } => {
            let document = store.read(&table)?;
            println!("{}", serde_json::to_string_pretty(&*document)?);
        }
        Commands::GetUser { id } => print_record(store.get_user_plan(&id))?,
        Commands::SetUser { id, json } => {
            let plan: Value = serde_json::from_str(&json)?;
            store.set_user_plan(&id, &plan)?;
        }
        Commands::RemoveUser { id } => {
            if !store.remove_user_plan(&id)? {
                eprintln!("No plan for user {}", id);
            }
        }
        Commands::GetServer { id } => print_record(store.get_server(&id))?,
        Commands::SetServer { id, json } => {
            let data: Value = serde_json::from_str(&json)?;
            store.set_server(&id, &data)?;
        }
        Commands::Log {
            user,
            action,
            details,
        } => {
            let details: Value = serde_json::from_str(&details)?;
            let id = store.log_activity(&user, &action, &details)?;
            println!("{}", id);
        }
        Commands::Logs { limit } => {
            for record in store.get_recent_logs(limit) {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
    }

    Ok(())
}

fn print_record(record: Option<Value>) -> Result<(), Box<dyn std::error::Error>> {
    match record {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => eprintln!("Not found"),
    }
    Ok(())
}
