mod cities;
mod search;

use clap::{Parser, Subcommand};
use rentscope_broker::CityAggregator;
use rentscope_core::{FuelType, Segment, SortOrder, Transmission};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rentscope-cli")]
#[command(about = "Citywide rental car availability from the broker API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every branch in a city and list offers by price
    Search {
        /// City slug (e.g., istanbul); defaults to RENTSCOPE_DEFAULT_CITY
        #[arg(long)]
        city: Option<String>,
        /// Pickup time, e.g. 2025-07-01T10:00 or "01.07.2025 10:00"
        #[arg(long)]
        pickup: String,
        /// Dropoff time, same formats as --pickup
        #[arg(long)]
        dropoff: String,
        #[arg(long)]
        fuel: Option<FuelType>,
        #[arg(long)]
        gear: Option<Transmission>,
        #[arg(long)]
        segment: Option<Segment>,
        /// price-asc or price-desc
        #[arg(long, default_value = "price-asc")]
        sort: SortOrder,
        /// Maximum number of offers to print
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the cities that have at least one branch
    Cities {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rentscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("rentscope-cli: use `search` or `cities`; see --help");
        return Ok(());
    };

    let aggregator = CityAggregator::from_app_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build broker client: {e}"))?;
    tracing::debug!(broker = %aggregator.client().base_url(), "broker client ready");

    match command {
        Commands::Search {
            city,
            pickup,
            dropoff,
            fuel,
            gear,
            segment,
            sort,
            limit,
            json,
        } => {
            let args = search::SearchArgs {
                city: city.as_deref().unwrap_or(config.default_city.as_str()),
                pickup: &pickup,
                dropoff: &dropoff,
                filter: rentscope_core::OfferFilter {
                    fuel,
                    gear,
                    segment,
                },
                sort,
                limit,
                json,
            };
            search::run_search(&aggregator, &args).await
        }
        Commands::Cities { json } => cities::run_cities(&aggregator, json).await,
    }
}
