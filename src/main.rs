//! carpool-planner CLI
//!
//! Usage:
//!   carpool-planner [--event input/event.txt] [--token-file input/google_token.txt]
//!
//! Reads the event file, fetches distances and routes from the maps API and
//! prints the suggested car pools.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use carpool_planner::event_file::load_event_file;
use carpool_planner::maps::{MapsClient, MapsConfig};
use carpool_planner::planner::{plan, PlanOptions};
use carpool_planner::report::render;

#[derive(Parser)]
#[command(name = "carpool-planner")]
#[command(about = "Plan car pools and pickup times for an event", long_about = None)]
struct Cli {
    /// Event file with Players and Details sections
    #[arg(long, default_value = "input/event.txt")]
    event: PathBuf,

    /// File whose first line is the maps API key
    #[arg(long, default_value = "input/google_token.txt")]
    token_file: PathBuf,

    /// Maps API key (takes precedence over the token file)
    #[arg(long, env = "MAPS_API_KEY")]
    api_key: Option<String>,

    /// Base URL of the maps API
    #[arg(long)]
    base_url: Option<String>,

    /// Seats per car
    #[arg(long)]
    max_pool_size: Option<u32>,

    /// Largest distance (miles) between locations sharing a car
    #[arg(long)]
    max_radius: Option<f64>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("car pooling failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_event_file(&cli.event)?;

    let mut config = MapsConfig {
        api_key: api_key(cli)?,
        ..MapsConfig::default()
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    let client = MapsClient::new(config)?;

    let mut options = PlanOptions::default();
    if let Some(size) = cli.max_pool_size {
        options.max_pool_size = size;
    }
    if let Some(radius) = cli.max_radius {
        options.max_radius = radius;
    }

    let result = plan(&data.attendees, &data.event, &client, &client, &options)?;
    println!("{}", render(&result, &data.event, !cli.no_color));
    Ok(())
}

fn api_key(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(key) = &cli.api_key {
        return Ok(key.clone());
    }
    read_token(&cli.token_file)
}

fn read_token(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("cannot read API token file {}: {}", path.display(), err))?;
    let token = text.lines().next().unwrap_or_default().trim().to_string();
    if token.is_empty() {
        return Err(format!("API token file {} is empty", path.display()).into());
    }
    Ok(token)
}
