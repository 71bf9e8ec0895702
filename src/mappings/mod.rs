//! Club, player, league, stadium and cup name tables built from the community
//! data pack, kept fresh on a weekly schedule.

pub mod decode;
pub mod models;
pub mod refresher;
pub mod schedule;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod tables;

pub use models::{DataPack, SnapshotMeta};
pub use refresher::{MappingRefresher, MappingStats, RefreshPhase};
pub use schedule::{RefreshScheduler, ScheduleHandle, WeeklySchedule};
pub use snapshot::SnapshotFile;
pub use source::RemoteDataSource;
pub use store::{ClubMatch, MappingSnapshot, MappingStore};
pub use tables::{LeagueKey, NameTables, TableCounts};
