mod art;
mod enrich;
mod slideshow;
mod view;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gbview-cli")]
#[command(about = "Resolve and browse panorama viewpoints for building records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a panorama reference link and print the extracted values
    Parse {
        /// Share link or embed link
        reference: String,
    },
    /// Fetch one record and print its resolved viewpoint
    Resolve {
        /// Record id
        id: i64,
        /// Height of the pane the panorama is shown in, in pixels
        #[arg(long, requires = "full_height")]
        pane_height: Option<f64>,
        /// Height of the full viewer window, in pixels
        #[arg(long, requires = "pane_height")]
        full_height: Option<f64>,
        /// Also print the embed link (needs `GOOGLE_MAPS_API_KEY`)
        #[arg(long)]
        embed: bool,
    },
    /// Resolve many records concurrently
    Enrich {
        /// Record ids; when omitted, every record with a panorama link is used
        ids: Vec<i64>,
        /// Number of concurrent fetches (defaults to `GBVIEW_ENRICH_CONCURRENCY`)
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Turn a pasted link into stored column values and an embed link
    Embed {
        reference: String,
        /// Embed API key
        #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
        key: Option<String>,
    },
    /// List map markers, forwarding `key=value` filters to the record API
    Markers {
        #[arg(long = "filter", value_parser = parse_filter_pair)]
        filters: Vec<(String, String)>,
        /// Only markers whose artwork is visible in the panorama
        #[arg(long)]
        art_visible: bool,
    },
    /// List postcodes that have records
    Zipcodes,
    /// List panorama records in one postcode with their art-visibility flag
    Zip {
        zipcode: String,
        /// Only records whose artwork is marked visible
        #[arg(long)]
        visible_only: bool,
    },
    /// Pick one eligible record at random and print its viewpoint
    Random,
    /// Cycle through eligible records on a timer
    Slideshow {
        /// Seconds between slides
        #[arg(long, default_value = "10")]
        interval_secs: u64,
        /// Stop after this many slides
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn parse_filter_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got \"{raw}\""))?;
    if key.trim().is_empty() {
        return Err(format!("empty filter key in \"{raw}\""));
    }
    Ok((key.trim().to_owned(), value.to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Offline commands run without an API base URL, so a config error is
    // only fatal for the commands that talk to the record API.
    let config = gbview_core::load_app_config();
    let log_level = config
        .as_ref()
        .map_or_else(|_| "info".to_owned(), |c| c.log_level.clone());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse { reference } => view::run_parse(&reference),
        Commands::Embed { reference, key } => view::run_embed(&reference, key.as_deref()),
        Commands::Resolve {
            id,
            pane_height,
            full_height,
            embed,
        } => {
            let dims = pane_height
                .zip(full_height)
                .map(|(pane, full)| gbview_core::PaneDimensions::new(pane, full));
            view::run_resolve(&config?, id, dims, embed).await
        }
        Commands::Enrich { ids, concurrency } => {
            enrich::run_enrich(&config?, &ids, concurrency).await
        }
        Commands::Markers {
            mut filters,
            art_visible,
        } => {
            if art_visible {
                filters.push(("artVisible".to_owned(), "1".to_owned()));
            }
            enrich::run_markers(&config?, &filters).await
        }
        Commands::Zipcodes => art::run_zipcodes(&config?).await,
        Commands::Zip {
            zipcode,
            visible_only,
        } => art::run_zip(&config?, &zipcode, visible_only).await,
        Commands::Random => slideshow::run_random(&config?).await,
        Commands::Slideshow {
            interval_secs,
            limit,
        } => slideshow::run_slideshow(&config?, interval_secs, limit).await,
    }
}

/// Pretty-prints `value` as JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Builds the record API client from config, with a readable error.
fn build_client(config: &gbview_core::AppConfig) -> anyhow::Result<gbview_client::RecordClient> {
    gbview_client::RecordClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build record API client: {e}"))
}
