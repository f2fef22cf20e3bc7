//! `trade-admin` command line console
//!
//! Administers the trading platform's back office: subscription payments,
//! TPIN activations and withdrawal payouts, behind an admin login.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use trade_admin_console::{Console, ConsoleError, Result, StatusFilter};
use trade_admin_core::{Config, Credentials};
use tracing::{debug, info};

/// Command line interface for the admin console
#[derive(Parser)]
#[command(
    name = "trade-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Admin console for the trading platform back office"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format (json, pretty); overrides the config file
    #[arg(long)]
    log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Log in with admin credentials
    Login {
        /// Admin email
        #[arg(short, long)]
        email: String,

        /// Password; prompted without echo when omitted
        #[arg(long, env = "TRADE_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and forget the stored token
    Logout,

    /// Show the current session
    Whoami,

    /// Show dashboard statistics
    Dashboard,

    /// List registered users
    Users {
        /// Case-insensitive match on name or email
        #[arg(short, long, default_value = "")]
        search: String,

        /// Subscription status filter
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
    },

    /// Pending subscription payments
    Deposits {
        /// Deposit subcommand (defaults to list)
        #[command(subcommand)]
        action: Option<DepositCommands>,
    },

    /// Pending TPIN activations
    Tpin {
        /// TPIN subcommand (defaults to list)
        #[command(subcommand)]
        action: Option<TpinCommands>,
    },

    /// Pending withdrawals
    Withdrawals {
        /// Withdrawal subcommand (defaults to list)
        #[command(subcommand)]
        action: Option<WithdrawalCommands>,
    },

    /// Inspect configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Deposit commands
#[derive(Subcommand)]
enum DepositCommands {
    /// List pending deposits
    List {
        /// Match on user name, user email or payment id
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Approve a subscription payment
    Approve {
        /// User id
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// Payment id
        #[arg(value_name = "PAYMENT_ID")]
        payment_id: String,
    },
}

/// TPIN commands
#[derive(Subcommand)]
enum TpinCommands {
    /// List pending TPIN requests
    List {
        /// Match on name or email
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Activate a user's TPIN
    Approve {
        /// User id
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },
}

/// Withdrawal commands
#[derive(Subcommand)]
enum WithdrawalCommands {
    /// List pending withdrawals
    List {
        /// Match on user name or email
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Record the payout of a withdrawal
    Approve {
        /// User id
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// Withdrawal id
        #[arg(value_name = "WITHDRAWAL_ID")]
        withdrawal_id: String,

        /// Bank or UPI transaction reference of the payout
        #[arg(short, long)]
        transaction_id: String,
    },
}

/// Main entry point for the console
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // Held until exit so buffered file output is flushed.
    let _log_guard = trade_admin_core::init_logging(&config.logging)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "trade-admin starting"
    );

    if let Commands::Config { show } = cli.command {
        return handle_config_command(&config, show);
    }

    let console = Console::new(config)?;
    let state = console.start().await;
    info!(state = state.label(), "session initialised");

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let identity = console
                .login(&Credentials::new(email, password))
                .await?;
            println!("logged in as {} <{}>", identity.name, identity.email);
        }
        Commands::Logout => {
            console.logout().await;
            println!("logged out");
        }
        Commands::Whoami => println!("{}", console.whoami()),
        Commands::Dashboard => println!("{}", console.dashboard().await?),
        Commands::Users { search, status } => {
            println!("{}", console.users(&search, status).await?);
        }
        Commands::Deposits { action } => {
            let out = match action.unwrap_or(DepositCommands::List {
                search: String::new(),
            }) {
                DepositCommands::List { search } => console.deposits(&search).await?,
                DepositCommands::Approve {
                    user_id,
                    payment_id,
                } => {
                    let remaining = console.approve_deposit(&user_id, &payment_id).await?;
                    println!("subscription approved for {user_id}");
                    remaining
                }
            };
            println!("{out}");
        }
        Commands::Tpin { action } => {
            let out = match action.unwrap_or(TpinCommands::List {
                search: String::new(),
            }) {
                TpinCommands::List { search } => console.tpin_requests(&search).await?,
                TpinCommands::Approve { user_id } => {
                    let remaining = console.approve_tpin(&user_id).await?;
                    println!("TPIN activated for {user_id}");
                    remaining
                }
            };
            println!("{out}");
        }
        Commands::Withdrawals { action } => {
            let out = match action.unwrap_or(WithdrawalCommands::List {
                search: String::new(),
            }) {
                WithdrawalCommands::List { search } => console.withdrawals(&search).await?,
                WithdrawalCommands::Approve {
                    user_id,
                    withdrawal_id,
                    transaction_id,
                } => {
                    let remaining = console
                        .approve_withdrawal(&user_id, &withdrawal_id, &transaction_id)
                        .await?;
                    println!("withdrawal {withdrawal_id} approved");
                    remaining
                }
            };
            println!("{out}");
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Ask for the password on the terminal without echoing it
fn prompt_password() -> Result<String> {
    dialoguer::Password::new()
        .with_prompt("password")
        .interact()
        .map_err(|e| ConsoleError::input(format!("could not read password: {e}")))
}

/// Show configuration as TOML
fn handle_config_command(config: &Config, show: bool) -> Result<()> {
    if show {
        let config_toml = toml::to_string_pretty(config).map_err(|e| {
            trade_admin_core::Error::configuration(format!(
                "Failed to serialize configuration: {e}"
            ))
        })?;
        println!("{config_toml}");
    } else {
        println!("configuration is valid");
    }
    Ok(())
}
