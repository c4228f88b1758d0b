//! GeoDrop CLI entry point

use std::process::ExitCode;

use clap::Parser;

use geodrop::cli::{
    app::{load_merged_config, run_list, run_nearby, run_play, run_record, EXIT_ERROR},
    args::{Cli, Commands},
    presenter::Presenter,
    RecordOptions,
};
use geodrop::cli::config_cmd::handle_config_command;
use geodrop::domain::config::AppConfig;
use geodrop::domain::geo::Coordinate;
use geodrop::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Build CLI config from args
    let cli_config = AppConfig {
        data_dir: cli.data_dir.clone(),
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Record {
            owner,
            note,
            lat,
            lon,
        } => {
            let position_override = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
                _ => None,
            };
            let options = RecordOptions {
                owner,
                note,
                position_override,
            };
            run_record(options, config).await
        }
        Commands::List => run_list(config).await,
        Commands::Play { id } => run_play(&id, config).await,
        Commands::Nearby { lat, lon, radius } => {
            run_nearby(Coordinate::new(lat, lon), radius, config).await
        }
    }
}
