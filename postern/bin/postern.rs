//! Command-line front end for the postern acceptance pipeline
//!
//! - `accept` hands a single message to the pipeline, exactly as the SMTP
//!   engine would after end-of-data, and prints the reply line
//! - `check` reports how individual recipient addresses would be treated
//! - `spool` inspects and removes accepted messages
//! - `config` prints the effective configuration

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use postern::{Postern, report};
use postern_common::{Envelope, logging};
use postern_delivery::DeliveryPipeline;
use postern_spool::SpooledMessageId;
use tokio::io::AsyncReadExt as _;

/// Recipient validation and atomic delivery for a minimal local MTA
#[derive(Parser, Debug)]
#[command(name = "postern")]
#[command(about = "Accept mail for local accounts", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to $POSTERN_CONFIG, then ./postern.config.ron,
    /// then /etc/postern/postern.config.ron)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Accept a message for local delivery
    Accept {
        /// Envelope sender
        #[arg(long)]
        from: String,

        /// Envelope recipient, may be repeated
        #[arg(long = "to", required = true)]
        to: Vec<String>,

        /// File holding the message body (reads stdin if omitted)
        #[arg(long)]
        body: Option<PathBuf>,
    },
    /// Report how recipient addresses would be treated
    Check {
        /// Addresses to check
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Inspect the message spool
    Spool {
        #[command(subcommand)]
        action: SpoolAction,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
enum SpoolAction {
    /// List spooled message ids, oldest first
    List,
    /// Show the envelope of a spooled message
    Show {
        /// Message ID to show
        message_id: String,
    },
    /// Remove a message from the spool
    Delete {
        /// Message ID to delete
        message_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = Postern::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print_config(&config);
            Ok(0)
        }
        Commands::Accept { from, to, body } => {
            let body = read_body(body).await?;
            let result = config.accept(Envelope::new(from, to, body)?).await;

            println!("{}", report::reply_line(&result));
            Ok(report::exit_code(&result))
        }
        Commands::Check { addresses } => {
            let pipeline = config.into_pipeline().context("Failed to open spool")?;
            let mut all_valid = true;

            for address in &addresses {
                let outcome = pipeline.check_recipient(address).await;
                all_valid &= outcome.is_valid();
                println!("{}", report::describe(address, &outcome));
            }

            Ok(u8::from(!all_valid))
        }
        Commands::Spool { action } => {
            let pipeline = config.into_pipeline().context("Failed to open spool")?;
            spool(&pipeline, action).await?;
            Ok(0)
        }
    }
}

async fn read_body(path: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = path {
        return tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read message body from {}", path.display()));
    }

    let mut body = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut body)
        .await
        .context("Failed to read message body from stdin")?;
    Ok(body)
}

async fn spool(pipeline: &DeliveryPipeline, action: SpoolAction) -> anyhow::Result<()> {
    let store = pipeline.store();

    match action {
        SpoolAction::List => {
            let ids = store.list().await?;

            println!("{:<28} {:>13}", "MESSAGE ID", "TIMESTAMP MS");
            println!("{}", "-".repeat(42));
            for id in &ids {
                println!("{:<28} {:>13}", id.to_string(), id.timestamp_ms());
            }
            println!("\nTotal: {} message(s)", ids.len());
        }
        SpoolAction::Show { message_id } => {
            let id = parse_id(&message_id)?;
            let envelope = store.read(&id).await?;

            println!("Message ID: {id}");
            println!("Timestamp: {} ms", id.timestamp_ms());
            println!();
            println!("Envelope:");
            println!("  From: {}", envelope.sender());
            println!("  To: {}", envelope.recipients().len());
            for recipient in envelope.recipients() {
                println!("    - {recipient}");
            }
            println!();
            println!("Body: {} bytes", envelope.body().len());
        }
        SpoolAction::Delete { message_id } => {
            let id = parse_id(&message_id)?;
            store.delete(&id).await?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}

fn parse_id(message_id: &str) -> anyhow::Result<SpooledMessageId> {
    message_id
        .parse()
        .with_context(|| format!("Invalid message id {message_id:?}"))
}

fn print_config(config: &Postern) {
    let server = &config.server;

    println!("Server:");
    println!("  Hostname: {}", server.hostname);
    println!("  Domain: {}", server.domain);
    println!("  Listen: {}", server.bind_address());
    println!();
    println!("Spool: {:?}", config.spool);
    println!("Local accounts: {}", config.directory.accounts.len());
    for account in &config.directory.accounts {
        println!("  - {account}");
    }
}
