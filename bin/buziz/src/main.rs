//! `buziz` — the Buziz CLI client.
//!
//! Manages contexts and drives the office, timeclock, records, and
//! schedule services over the current context's store: the server when
//! it answers, the local fallback when it doesn't.

mod commands;
mod config;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::ClientConfig;

/// Buziz CLI tool.
#[derive(Parser, Debug)]
#[command(name = "buziz", about = "Buziz CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.buziz/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Context management.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Office management.
    Office {
        #[command(subcommand)]
        action: OfficeAction,
    },

    /// Time clock.
    Clock {
        #[command(subcommand)]
        action: ClockAction,
    },

    /// Generic record collections.
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Shift schedule.
    Shifts {
        #[command(subcommand)]
        action: ShiftsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create or update a context.
    Create {
        /// Context name.
        name: String,
        /// Server URL (e.g. http://localhost:8080).
        #[arg(long)]
        server: String,
        /// Static bearer token.
        #[arg(long, default_value = "")]
        token: String,
        /// Local data directory (default: ~/.buziz/<name>).
        #[arg(long, default_value = "")]
        data_dir: String,
    },
    /// Switch the current context.
    Use { name: String },
    /// List all contexts.
    List,
}

#[derive(Subcommand, Debug)]
enum OfficeAction {
    /// Create an office; the acting user becomes its Owner.
    Create {
        /// Office name.
        name: String,
        /// Acting user id.
        #[arg(long)]
        user: String,
        /// Acting user's display name.
        #[arg(long = "as")]
        user_name: String,
    },
    /// Join an office by code.
    Join {
        /// Join code.
        code: String,
        /// Acting user id.
        #[arg(long)]
        user: String,
        /// Display name for the new employee.
        #[arg(long = "as")]
        user_name: String,
    },
    /// List the acting user's offices.
    List {
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
enum ClockAction {
    /// Clock in.
    In {
        #[arg(long)]
        office: String,
        #[arg(long)]
        employee: String,
    },
    /// Clock out.
    Out {
        #[arg(long)]
        office: String,
        #[arg(long)]
        employee: String,
    },
    /// Show the active clock-in, if any.
    Status {
        #[arg(long)]
        employee: String,
    },
}

#[derive(Subcommand, Debug)]
enum DataAction {
    /// List a collection.
    List {
        office: String,
        data_type: String,
    },
    /// Create or replace one record.
    Put {
        office: String,
        data_type: String,
        id: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
        /// Stored version being replaced (omit when creating).
        #[arg(long)]
        expected_version: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum ShiftsAction {
    /// List an office's shifts.
    List { office: String },
    /// Expand recurring patterns over the forward horizon.
    Materialize { office: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);

    if let Commands::Context { action } = &cli.command {
        return match action {
            ContextAction::Create {
                name,
                server,
                token,
                data_dir,
            } => commands::context::create(name, server, token, data_dir, &config_path),
            ContextAction::Use { name } => commands::context::use_context(name, &config_path),
            ContextAction::List => commands::context::list(&config_path),
        };
    }

    let client_config = ClientConfig::load(&config_path)?;
    let ctx = client_config.current().ok_or_else(|| {
        anyhow::anyhow!("No current context. Run `buziz context create <name> --server <url>`.")
    })?;

    match cli.command {
        Commands::Context { .. } => unreachable!("handled above"),
        Commands::Office { action } => match action {
            OfficeAction::Create { name, user, user_name } => {
                commands::office::create(ctx, &user, &user_name, &name)
            }
            OfficeAction::Join { code, user, user_name } => {
                commands::office::join(ctx, &user, &user_name, &code)
            }
            OfficeAction::List { user } => commands::office::list(ctx, &user),
        },
        Commands::Clock { action } => match action {
            ClockAction::In { office, employee } => {
                commands::clock::clock_in(ctx, &employee, &office)
            }
            ClockAction::Out { office, employee } => {
                commands::clock::clock_out(ctx, &employee, &office)
            }
            ClockAction::Status { employee } => commands::clock::status(ctx, &employee),
        },
        Commands::Data { action } => match action {
            DataAction::List { office, data_type } => {
                commands::data::list(ctx, &office, &data_type)
            }
            DataAction::Put {
                office,
                data_type,
                id,
                json_body,
                expected_version,
            } => commands::data::put(ctx, &office, &data_type, &id, &json_body, expected_version),
        },
        Commands::Shifts { action } => match action {
            ShiftsAction::List { office } => commands::shifts::list(ctx, &office),
            ShiftsAction::Materialize { office } => commands::shifts::materialize(ctx, &office),
        },
    }
}
