use std::path::PathBuf;

use clap::Parser;
use countries_client::{
    Client, ClientConfig,
    presentation::{CountryCard, CountryList},
};
use futures::future::join_all;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "countries-client",
    version,
    about = "Explore countries around the world using GraphQL"
)]
struct Args {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GraphQL endpoint, overrides the config file
    #[arg(long)]
    endpoint: Option<String>,

    /// Route requests through the augmenting mock dispatcher
    #[arg(long, conflicts_with = "no_mock")]
    mock: bool,

    /// Send requests straight to the endpoint
    #[arg(long)]
    no_mock: bool,

    /// Show details for these country codes
    #[arg(long = "details", value_name = "CODE", num_args = 1..)]
    details: Vec<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(ClientConfig, Vec<String>)> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };

        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if self.mock {
            config.mock = true;
        }
        if self.no_mock {
            config.mock = false;
        }

        Ok((config, self.details))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let (config, details) = Args::parse().into_config()?;
    info!(?config, "starting countries-client");

    let client = Client::from_config(&config);

    let mut list = CountryList::new(client.clone(), config.display_limit);
    print!("{}", list.render());
    list.mount().await;
    print!("{}", list.render());

    if let Some(e) = list.error() {
        anyhow::bail!("{}", e.message());
    }

    let mut cards: Vec<CountryCard> = list
        .countries()
        .iter()
        .filter(|country| details.iter().any(|code| code.eq_ignore_ascii_case(&country.code)))
        .cloned()
        .map(CountryCard::new)
        .collect();

    for card in &mut cards {
        card.toggle_details();
    }
    join_all(cards.iter_mut().map(|card| card.load_details(&client))).await;

    for card in &cards {
        println!("{}", card.render());
    }

    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
