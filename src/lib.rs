//! Soccerverse name-mapping library
//!
//! Keeps the club, player, league, stadium and cup name tables of the
//! Soccerverse community data pack in memory, persists them to a local
//! snapshot and refreshes them weekly. Readers resolve ids to display names
//! without ever blocking on a refresh.
//!
//! # Examples
//!
//! ```rust,no_run
//! use soccerverse_bot::config::Config;
//! use soccerverse_bot::error::AppError;
//! use soccerverse_bot::facade::NameResolutionFacade;
//! use soccerverse_bot::mappings::MappingRefresher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let refresher = MappingRefresher::from_config(&config)?;
//!
//!     // Load the snapshot, refreshing it when older than a week
//!     refresher.initialize().await;
//!
//!     let facade = NameResolutionFacade::from_config(refresher.store(), &config)?;
//!     println!("{}", facade.club_name(2180));
//!     for club in facade.search_clubs("united", 10) {
//!         println!("{} {}", club.id, club.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod facade;
pub mod logging;
pub mod mappings;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use commands::{UpdateReport, run_admin_update};
pub use config::Config;
pub use error::AppError;
pub use facade::{Fixture, FixtureNames, NameResolutionFacade};
pub use mappings::{
    ClubMatch, MappingRefresher, MappingStats, MappingStore, RefreshPhase, RefreshScheduler,
    ScheduleHandle, WeeklySchedule,
};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
