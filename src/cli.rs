use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

use crate::constants::DEFAULT_SEARCH_LIMIT;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Determines if the invocation is a one-shot command rather than the
/// long-running service. One-shot commands print their result and exit:
/// - --update, --stats or --search
/// - config operations
pub fn is_one_shot_command(args: &Args) -> bool {
    args.update || args.stats || args.search.is_some() || is_config_command(args)
}

/// True when any configuration operation is requested
pub fn is_config_command(args: &Args) -> bool {
    args.list_config
        || args.new_data_pack_url.is_some()
        || args.new_log_file_path.is_some()
        || args.clear_log_file_path
}

/// Soccerverse name-mapping service
///
/// Keeps the club, player, league, stadium and cup name tables of the
/// Soccerverse community data pack up to date and answers name lookups.
///
/// Without an action flag the service runs until Ctrl-C:
/// - loads the persisted snapshot, refreshing it when older than a week
/// - forces a refresh every Sunday at 03:00
#[derive(Parser, Debug, Default)]
#[command(about, long_about = None, version)]
#[command(styles = get_styles())]
pub struct Args {
    /// Force a data pack download now and print the before/after table counts.
    #[arg(short = 'u', long = "update", help_heading = "Actions")]
    pub update: bool,

    /// Print table counts, last update and next scheduled update.
    #[arg(short = 's', long = "stats", help_heading = "Actions")]
    pub stats: bool,

    /// Search clubs whose name contains TERM (case-insensitive).
    #[arg(long = "search", value_name = "TERM", help_heading = "Actions")]
    pub search: Option<String>,

    /// Maximum number of search results.
    #[arg(long = "limit", default_value_t = DEFAULT_SEARCH_LIMIT, help_heading = "Actions")]
    pub limit: usize,

    /// Update the data pack URL in config.
    #[arg(
        long = "set-data-pack-url",
        value_name = "URL",
        help_heading = "Configuration"
    )]
    pub new_data_pack_url: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", help_heading = "Configuration")]
    pub new_log_file_path: Option<String>,

    /// Clear the custom log file path from config. This reverts to using the default log location.
    #[arg(long = "clear-log-file", help_heading = "Configuration")]
    pub clear_log_file_path: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Enable debug logging. One-shot commands also log to the terminal.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}
