use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use valorador::config::RubricSettings;
use valorador::error::AppError;
use valorador::workflows::rubric::{RubricLoader, RubricService, ScoringOverrides, ScoringProfile};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the rubric and layers profile, scoring file and command-line overrides, in that order.
pub(crate) fn build_service(
    settings: &RubricSettings,
    overrides: ScoringOverrides,
) -> Result<RubricService, AppError> {
    let rubric = RubricLoader::load_or_builtin(settings.rubric_path.as_deref())?;

    let file_overrides = match &settings.scoring_path {
        Some(path) => ScoringOverrides::from_path(path)?,
        None => ScoringOverrides::default(),
    };
    let config = file_overrides.merge(overrides).resolve(settings.profile);

    let service = RubricService::new(rubric, config)?;
    info!(
        items = service.rubric().items().len(),
        body_maximum = service.config().body.maximum,
        team_capped = service.config().team.capped,
        global_minimum = service.config().global.minimum_required,
        "rubric service configured"
    );
    Ok(service)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_profile(raw: &str) -> Result<ScoringProfile, String> {
    raw.parse::<ScoringProfile>().map_err(|err| err.to_string())
}
