// src/main.rs
use clap::Parser;
use soccerverse_bot::cli::{Args, is_config_command};
use soccerverse_bot::commands::{
    handle_config_update_command, handle_list_config_command, handle_search_command,
    handle_service_command, handle_stats_command, handle_update_command,
};
use soccerverse_bot::config::Config;
use soccerverse_bot::error::AppError;
use soccerverse_bot::logging::setup_logging;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Config commands run before logging so a broken config can still be fixed
    if args.list_config {
        return handle_list_config_command().await;
    }
    if is_config_command(&args) {
        return handle_config_update_command(&args).await;
    }

    let config = Config::load().await?;

    // The guard must be kept alive for the duration of the program
    let (log_file_path, _guard) = setup_logging(&args, &config).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    if args.update {
        handle_update_command(&config).await
    } else if args.stats {
        handle_stats_command(&config).await
    } else if let Some(term) = &args.search {
        handle_search_command(&config, term, args.limit).await
    } else {
        handle_service_command(&config).await
    }
}
