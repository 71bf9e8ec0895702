use crate::cli::Args;
use crate::config::Config;
use crate::error::AppError;
use crate::facade::NameResolutionFacade;
use crate::facade::time_formatting::{format_date, format_date_time};
use crate::mappings::{ClubMatch, MappingRefresher, MappingStats, RefreshScheduler, WeeklySchedule};
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Before/after view of an admin-triggered refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub before: MappingStats,
    pub after: MappingStats,
    pub completed_at: DateTime<Utc>,
}

impl UpdateReport {
    /// Renders the report in the bot's French wording, dates in `offset`.
    pub fn render(&self, offset: FixedOffset) -> String {
        let before = &self.before.counts;
        let after = &self.after.counts;
        let next_update = self
            .after
            .next_update
            .map(|at| format_date(at, offset))
            .unwrap_or_else(|| "Dimanche prochain 3h00".to_string());

        [
            "✅ Mise à jour réussie !".to_string(),
            "📊 Statistiques".to_string(),
            format!("Clubs : {} → {}", before.clubs, after.clubs),
            format!("Joueurs : {} → {}", before.players, after.players),
            format!("Ligues : {} → {}", before.leagues, after.leagues),
            format!("Stades : {} → {}", before.stadiums, after.stadiums),
            format!("Coupes : {} → {}", before.cups, after.cups),
            format!(
                "📅 Dernière mise à jour : {}",
                format_date_time(self.completed_at, offset)
            ),
            format!("🔄 Prochaine mise à jour automatique : {next_update}"),
        ]
        .join("\n")
    }
}

/// Message shown to the admin when a forced refresh fails
pub fn render_update_failure(error: &AppError) -> String {
    [
        "❌ Erreur de mise à jour".to_string(),
        "Une erreur est survenue lors de la mise à jour des mappings.".to_string(),
        format!("🔧 Détails de l'erreur : {error}"),
        "💡 Les mappings actuels restent disponibles. Réessayez dans quelques minutes.".to_string(),
    ]
    .join("\n")
}

/// The admin-only update action.
///
/// Non-admin callers are rejected before any fetch happens. On failure the
/// previously loaded tables stay live and the error is returned untouched.
pub async fn run_admin_update(
    refresher: &MappingRefresher,
    is_admin: bool,
) -> Result<UpdateReport, AppError> {
    if !is_admin {
        warn!("Rejected mapping update from a non-admin caller");
        return Err(AppError::permission_denied(
            "Cette commande est réservée aux administrateurs du serveur.",
        ));
    }

    let before = refresher.stats();
    let after = refresher.force_refresh().await?;
    Ok(UpdateReport {
        before,
        after,
        completed_at: Utc::now(),
    })
}

pub fn render_stats(stats: &MappingStats, offset: FixedOffset) -> String {
    let last_update = stats
        .last_update
        .map(|at| format_date_time(at, offset))
        .unwrap_or_else(|| "Jamais".to_string());
    let next_update = stats
        .next_update
        .map(|at| format_date(at, offset))
        .unwrap_or_else(|| "Dimanche prochain 3h00".to_string());

    [
        format!("Clubs : {}", stats.counts.clubs),
        format!("Joueurs : {}", stats.counts.players),
        format!("Ligues : {}", stats.counts.leagues),
        format!("Stades : {}", stats.counts.stadiums),
        format!("Coupes : {}", stats.counts.cups),
        format!("Dernière mise à jour : {last_update}"),
        format!("Prochaine mise à jour : {next_update}"),
    ]
    .join("\n")
}

pub fn render_search_results(term: &str, matches: &[ClubMatch]) -> String {
    if matches.is_empty() {
        return format!("Aucun club trouvé pour \"{term}\"");
    }
    matches
        .iter()
        .map(|club| format!("{:>8}  {}", club.id, club.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads the persisted snapshot for read-only commands. A missing snapshot is
/// not an error: lookups fall back to placeholder names.
async fn load_for_reading(refresher: &MappingRefresher) {
    if let Err(e) = refresher.load_persisted_snapshot().await {
        warn!("Serving fallback names, no snapshot loaded: {e}");
        println!("Aucun snapshot disponible. Lancez --update pour télécharger le data pack.");
    }
}

/// Handles the --update command.
///
/// The operator running the binary is trusted, so the admin gate is passed.
/// Prints the report, or the failure message and returns the error.
pub async fn handle_update_command(config: &Config) -> Result<(), AppError> {
    let offset = config.schedule_offset()?;
    let refresher = MappingRefresher::from_config(config)?;
    if let Err(e) = refresher.load_persisted_snapshot().await {
        info!("Starting update without a persisted snapshot: {e}");
    }

    println!("🔄 Mise à jour en cours...");
    match run_admin_update(&refresher, true).await {
        Ok(report) => {
            println!("{}", report.render(offset));
            Ok(())
        }
        Err(e) => {
            println!("{}", render_update_failure(&e));
            Err(e)
        }
    }
}

/// Handles the --stats command.
pub async fn handle_stats_command(config: &Config) -> Result<(), AppError> {
    let refresher = MappingRefresher::from_config(config)?;
    load_for_reading(&refresher).await;
    println!("{}", render_stats(&refresher.stats(), config.schedule_offset()?));
    Ok(())
}

/// Handles the --search command.
pub async fn handle_search_command(
    config: &Config,
    term: &str,
    limit: usize,
) -> Result<(), AppError> {
    let refresher = MappingRefresher::from_config(config)?;
    load_for_reading(&refresher).await;
    let facade = NameResolutionFacade::from_config(refresher.store(), config)?;
    println!("{}", render_search_results(term, &facade.search_clubs(term, limit)));
    Ok(())
}

/// Runs the long-lived service: startup load, weekly refresh, Ctrl-C to stop.
pub async fn handle_service_command(config: &Config) -> Result<(), AppError> {
    let schedule = WeeklySchedule::from_config(config)?;
    let refresher = Arc::new(MappingRefresher::from_config(config)?);

    let phase = refresher.initialize().await;
    info!("Mapping service ready: {phase:?}, {}", refresher.stats().counts);

    let handle = RefreshScheduler::start(Arc::clone(&refresher), schedule);
    tokio::signal::ctrl_c().await?;

    info!("Shutdown requested, stopping refresh scheduler");
    handle.stop().await;
    Ok(())
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    Config::display().await
}

/// Handles configuration update commands (--set-data-pack-url, --set-log-file, --clear-log-file).
///
/// Updates configuration based on the provided arguments and saves changes.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    update_config_file(&Config::get_config_path(), args).await?;
    println!("Config updated successfully!");

    Ok(())
}

/// Rewrites the config file at `path` with the flags of `args` applied.
///
/// The file is read as stored: environment overrides are not applied, so they
/// never end up persisted, and an invalid file can still be repaired. A missing
/// or unparsable file starts from the defaults. Only the updated result is
/// validated.
pub async fn update_config_file(path: &str, args: &Args) -> Result<Config, AppError> {
    let mut config = Config::load_from_path(path).await.unwrap_or_else(|e| {
        warn!("Could not read configuration at {path} ({e}), starting from defaults");
        Config::default()
    });
    apply_config_updates(&mut config, args);
    config.validate()?;
    config.save_to_path(path).await?;
    Ok(config)
}

/// Applies the configuration flags of `args` to `config`
pub fn apply_config_updates(config: &mut Config, args: &Args) {
    if let Some(new_url) = &args.new_data_pack_url {
        config.data_pack_url = new_url.clone();
    }

    if let Some(new_log_path) = &args.new_log_file_path {
        config.log_file_path = Some(new_log_path.clone());
    } else if args.clear_log_file_path {
        config.log_file_path = None;
        println!("Custom log file path cleared. Using default location.");
    }
}
