use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, DEFAULT_CONFIG_FILE},
    Endpoint, Key, ShowroomClient,
};
use shared::domain::{ExhibitorId, ExhibitorRecord};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse exhibitor stalls from the terminal")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every exhibitor and where the data came from.
    List,
    /// Show one exhibitor profile.
    Exhibitor { id: i64 },
    /// Look up a product and its exhibitor.
    Product { id: String },
    /// Quote an order for a product.
    Order {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Check reachability of the configured endpoints.
    Probe,
    /// Step through stalls with navigation keys.
    Slideshow {
        #[arg(long)]
        autoplay: bool,
        #[arg(long, default_value_t = 0)]
        seconds: u64,
        /// Comma separated: left, right, space.
        #[arg(long, default_value = "")]
        keys: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let settings = load_settings_from(&cli.config, |key| std::env::var(key).ok());
    let client = ShowroomClient::new(settings);

    match cli.command {
        Command::List => {
            let state = client.store().fetch_exhibitors().await;
            let source = state.data_source.map_or("unknown", |s| s.label());
            println!("{} exhibitors (source={source})", state.data.len());
            for record in &state.data {
                println!("{}", summary(record));
            }
            if let Some(diagnostic) = state.diagnostic {
                println!("note: {}", diagnostic.message);
            }
        }
        Command::Exhibitor { id } => {
            client.store().ensure_loaded().await;
            match client.store().find_exhibitor(ExhibitorId(id)).await {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => bail!("exhibitor {id} not found"),
            }
        }
        Command::Product { id } => {
            let result = client.queries().product(&id).await;
            let Some(lookup) = result.data else {
                bail!("product id is required");
            };
            if lookup.not_found {
                bail!("product {id} not found");
            }
            println!("{}", serde_json::to_string_pretty(&lookup)?);
        }
        Command::Order {
            product_id,
            quantity,
        } => {
            let result = client.queries().order(&product_id, quantity).await;
            let Some(view) = result.data else {
                bail!("product id is required");
            };
            if view.lookup.not_found {
                bail!("product {product_id} not found");
            }
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Probe => {
            for endpoint in [Endpoint::Primary, Endpoint::Backup] {
                let report = client.acquirer().probe(endpoint).await;
                println!("{}", serde_json::to_string(&report)?);
            }
        }
        Command::Slideshow {
            autoplay,
            seconds,
            keys,
        } => {
            let records = client.queries().exhibitors().await.data.unwrap_or_default();
            let mut slideshow = client.slideshow().await;
            if autoplay {
                slideshow.toggle_autoplay().await;
            }
            print_slide(&records, slideshow.index().await);

            for token in keys.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let key = parse_key(token)?;
                slideshow.handle_key(key).await;
                print_slide(&records, slideshow.index().await);
            }

            if seconds > 0 {
                info!(seconds, "watching slideshow");
                tokio::time::sleep(Duration::from_secs(seconds)).await;
                print_slide(&records, slideshow.index().await);
            }
        }
    }

    info!(api_calls = client.counter().get(), "done");
    Ok(())
}

fn parse_key(token: &str) -> Result<Key> {
    Ok(match token.to_ascii_lowercase().as_str() {
        "left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrowright" => Key::ArrowRight,
        "space" | " " => Key::Space,
        other => bail!("unknown key {other:?}, expected left, right or space"),
    })
}

fn summary(record: &ExhibitorRecord) -> String {
    let city = record
        .address
        .as_ref()
        .map(|a| a.city.as_str())
        .unwrap_or("-");
    format!(
        "#{} {} ({city}, {} products)",
        record.id,
        record.name,
        record.products.len()
    )
}

fn print_slide(records: &[ExhibitorRecord], index: usize) {
    match records.get(index) {
        Some(record) => println!("[{}/{}] {}", index + 1, records.len(), summary(record)),
        None => println!("no exhibitors to show"),
    }
}
