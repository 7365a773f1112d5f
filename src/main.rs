//! Multisig Vault CLI Application
//!
//! A command-line interface for operating a multi-signature wallet on a
//! local simulated chain.

use clap::{Parser, Subcommand};
use multisig_vault::cli::{self, AppState};
use multisig_vault::crypto::Address;
use multisig_vault::multisig::{Amount, TxId};
use multisig_vault::units::parse_amount;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "An M-of-N multi-signature custody wallet", long_about = None)]
struct Cli {
    /// Data directory for wallet and chain state
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new multisig wallet
    Init {
        /// Comma-separated owner addresses
        #[arg(short, long)]
        owners: Option<String>,

        /// Number of approvals required to execute
        #[arg(short, long)]
        threshold: Option<usize>,

        /// JSON deployment config with owners and threshold
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Optional wallet label
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Account identity operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Mint coins to an account on the local chain
    Fund {
        /// Account to fund
        #[arg(short, long)]
        address: Address,

        /// Amount in coins (e.g. 0.1)
        #[arg(short = 'm', long, value_parser = amount_arg)]
        amount: Amount,
    },

    /// Show an account balance
    Balance {
        /// Account address (defaults to the wallet)
        #[arg(short, long)]
        address: Option<Address>,
    },

    /// Send coins into the wallet
    Deposit {
        /// Sending account
        #[arg(short, long)]
        from: Address,

        /// Amount in coins
        #[arg(short = 'm', long, value_parser = amount_arg)]
        amount: Amount,

        /// Attached data: 0x-prefixed hex or plain text
        #[arg(long)]
        data: Option<String>,
    },

    /// Propose an outgoing transaction
    Submit {
        /// Proposing owner
        #[arg(short, long)]
        from: Address,

        /// Recipient
        #[arg(short, long)]
        to: Address,

        /// Amount in coins
        #[arg(short = 'm', long, value_parser = amount_arg)]
        amount: Amount,

        /// Attached data: 0x-prefixed hex or plain text
        #[arg(long)]
        data: Option<String>,
    },

    /// Approve a pending transaction
    Approve {
        /// Approving owner
        #[arg(short, long)]
        from: Address,

        /// Transaction id
        #[arg(short, long)]
        id: TxId,
    },

    /// Withdraw a previous approval
    Revoke {
        /// Revoking owner
        #[arg(short, long)]
        from: Address,

        /// Transaction id
        #[arg(short, long)]
        id: TxId,
    },

    /// Execute a transaction that has enough approvals
    Execute {
        /// Executing owner
        #[arg(short, long)]
        from: Address,

        /// Transaction id
        #[arg(short, long)]
        id: TxId,
    },

    /// Show a transaction
    Tx {
        /// Transaction id
        id: TxId,
    },

    /// List transactions
    Txs {
        /// Only show transactions not yet executed
        #[arg(short, long)]
        pending: bool,
    },

    /// Display wallet information
    Info,

    /// Show recent wallet events
    Events {
        /// Number of events to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Export the wallet to a file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a wallet from a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Roll back to a saved backup (0 is the most recent)
    Restore {
        /// Backup index
        #[arg(short, long, default_value = "0")]
        backup: usize,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Generate a new key pair and address
    New,

    /// Show the address for an existing private key
    FromKey {
        /// Hex-encoded private key
        #[arg(short, long)]
        private_key: String,
    },
}

fn amount_arg(s: &str) -> Result<Amount, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Commands that don't need a wallet
    match &cli.command {
        Commands::Init {
            owners,
            threshold,
            config,
            label,
        } => {
            return cli::cmd_init(
                &cli.data_dir,
                owners.as_deref(),
                *threshold,
                config.as_deref(),
                label.clone(),
            );
        }
        Commands::Account { action } => {
            return match action {
                AccountCommands::New => cli::cmd_account_new(),
                AccountCommands::FromKey { private_key } => {
                    cli::cmd_account_from_key(private_key)
                }
            };
        }
        _ => {}
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Account { .. } => unreachable!(),

        Commands::Fund { address, amount } => {
            cli::cmd_fund(&mut state, &address, amount)?;
        }

        Commands::Balance { address } => {
            let address = address.unwrap_or(*state.wallet.address());
            cli::cmd_balance(&state, &address)?;
        }

        Commands::Deposit { from, amount, data } => {
            let payload = cli::parse_payload(data.as_deref())?;
            cli::cmd_deposit(&mut state, &from, amount, &payload)?;
        }

        Commands::Submit {
            from,
            to,
            amount,
            data,
        } => {
            let payload = cli::parse_payload(data.as_deref())?;
            cli::cmd_submit(&mut state, &from, &to, amount, payload)?;
        }

        Commands::Approve { from, id } => {
            cli::cmd_approve(&mut state, &from, id)?;
        }

        Commands::Revoke { from, id } => {
            cli::cmd_revoke(&mut state, &from, id)?;
        }

        Commands::Execute { from, id } => {
            cli::cmd_execute(&mut state, &from, id)?;
        }

        Commands::Tx { id } => {
            cli::cmd_tx(&state, id)?;
        }

        Commands::Txs { pending } => {
            cli::cmd_txs(&state, pending)?;
        }

        Commands::Info => {
            cli::cmd_info(&state)?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&state, count)?;
        }

        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }

        Commands::Restore { backup } => {
            cli::cmd_restore(&mut state, backup)?;
        }
    }

    Ok(())
}
