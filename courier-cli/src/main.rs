//! Courier CLI
//!
//! Thin wrapper around courier-core for publishing from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a new identity
//! courier keygen
//!
//! # Publish a public note to the default relays
//! courier --nsec nsec1... send-public "hello nostr"
//!
//! # Send a gift-wrapped direct message
//! NOSTR_NSEC=nsec1... courier send-dm npub1... "see you at 5"
//!
//! # Use specific relays and a shorter timeout
//! courier --relay wss://nos.lol --relay wss://relay.damus.io --timeout 5 send-public "hi"
//! ```

mod config;
mod secret;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use courier_core::nostr::KeyPair;
use courier_core::relay::{Destination, PublishConfig, PublishReport, RelayDestination};
use courier_core::Courier;

/// Courier - signed Nostr notes and private direct messages
#[derive(Parser)]
#[command(name = "courier")]
#[command(version)]
#[command(about = "Publish signed Nostr notes and gift-wrapped direct messages")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Secret key (nsec). Falls back to NOSTR_NSEC, then ~/.nostr_nsec
    #[arg(long, env = secret::NSEC_ENV, hide_env_values = true, global = true)]
    nsec: Option<String>,

    /// Relay URL to publish to (repeatable; defaults to a built-in list)
    #[arg(long = "relay", value_name = "URL", global = true)]
    relays: Vec<String>,

    /// Per-relay connect and publish timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = config::DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a public text note
    SendPublic {
        /// Note text
        message: String,
    },

    /// Send an encrypted direct message
    SendDm {
        /// Recipient public key (npub)
        npub: String,
        /// Message text
        message: String,
    },

    /// Generate a new key pair
    Keygen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let timeout = config::timeout_from_secs(cli.timeout);
    let relays = config::relays_or_default(&cli.relays);

    match cli.command {
        Commands::Keygen => keygen(),

        Commands::SendPublic { message } => {
            let courier = load_courier(cli.nsec.as_deref(), timeout)?;
            let destinations = connect_relays(&relays, timeout).await;

            let result = courier
                .publish_text_note(&message, &as_destinations(&destinations))
                .await;
            disconnect_all(&destinations).await;

            finish(result?)
        }

        Commands::SendDm { npub, message } => {
            let courier = load_courier(cli.nsec.as_deref(), timeout)?;
            let destinations = connect_relays(&relays, timeout).await;

            let result = courier
                .send_direct_message(npub.trim(), &message, &as_destinations(&destinations))
                .await;
            disconnect_all(&destinations).await;

            finish(result.context("failed to send direct message")?)
        }
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn keygen() -> Result<()> {
    let keys = KeyPair::generate().context("failed to generate key pair")?;
    let nsec = zeroize::Zeroizing::new(keys.to_nsec()?);

    println!("Secret key (keep private): {}", nsec.as_str());
    println!("Public key: {}", keys.public_key().to_npub()?);
    println!();
    println!("Save the secret key to ~/{} or export {}.", secret::NSEC_FILE_NAME, secret::NSEC_ENV);
    Ok(())
}

fn load_courier(explicit_nsec: Option<&str>, timeout: Duration) -> Result<Courier> {
    let nsec_file = secret::default_nsec_file();
    let nsec = secret::resolve_nsec(explicit_nsec, nsec_file.as_deref())?;
    let keys = KeyPair::from_nsec(&nsec).context("invalid secret key")?;

    tracing::info!("Using identity {}", keys.public_key().to_npub()?);
    Ok(Courier::new(keys).with_publish_config(PublishConfig { timeout }))
}

/// Connects to every relay, skipping the ones that fail.
async fn connect_relays(urls: &[String], timeout: Duration) -> Vec<Arc<RelayDestination>> {
    let attempts = urls
        .iter()
        .map(|url| async move { (url, RelayDestination::connect(url, timeout).await) });

    let mut connected = Vec::with_capacity(urls.len());
    for (url, result) in futures::future::join_all(attempts).await {
        match result {
            Ok(destination) => connected.push(Arc::new(destination)),
            Err(e) => tracing::warn!("Skipping relay {url}: {e}"),
        }
    }
    connected
}

fn as_destinations(relays: &[Arc<RelayDestination>]) -> Vec<Arc<dyn Destination>> {
    relays
        .iter()
        .map(|relay| Arc::clone(relay) as Arc<dyn Destination>)
        .collect()
}

async fn disconnect_all(relays: &[Arc<RelayDestination>]) {
    for relay in relays {
        relay.disconnect().await;
    }
}

fn finish(report: PublishReport) -> Result<()> {
    println!("Event {}", report.event_id);
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("  ok      {}", outcome.destination),
            Some(e) => println!("  failed  {}: {e}", outcome.destination),
        }
    }
    println!(
        "Accepted by {}/{} relays",
        report.success_count(),
        report.outcomes.len()
    );

    if !report.is_success() {
        bail!("no relay accepted the event");
    }
    Ok(())
}
