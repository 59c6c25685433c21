mod builtin;
mod normalizer;
mod parser;

use super::domain::{CriterionKey, RubricDefinition, RubricItem, RubricSource, Scale};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

pub(crate) use normalizer::criterion_key;
use parser::RawEntry;

#[derive(Debug, thiserror::Error)]
pub enum RubricLoadError {
    #[error("failed to read rubric definition {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON rubric definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML rubric definition: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid CSV rubric definition: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported rubric format '{0}' (use .json, .yaml, .yml or .csv)")]
    UnsupportedFormat(String),
    #[error("rubric definition contains no items")]
    Empty,
    /// Entry is missing a required field or clashes with another entry.
    #[error("malformed rubric entry #{position}: {reason}")]
    MalformedRubric { position: usize, reason: String },
    /// Entry's scale or minimum is unusable.
    #[error("malformed rubric item '{criterion}': {reason}")]
    MalformedItem { criterion: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubricFormat {
    Json,
    Yaml,
    Csv,
}

impl RubricFormat {
    pub fn from_path(path: &Path) -> Result<Self, RubricLoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            other => Err(RubricLoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub struct RubricLoader;

impl RubricLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RubricDefinition, RubricLoadError> {
        let path = path.as_ref();
        let format = RubricFormat::from_path(path)?;
        let file = std::fs::File::open(path).map_err(|source| RubricLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, format, RubricSource::File(path.to_path_buf()))
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: RubricFormat,
        source: RubricSource,
    ) -> Result<RubricDefinition, RubricLoadError> {
        let entries = match format {
            RubricFormat::Json => parser::parse_json(reader)?,
            RubricFormat::Yaml => parser::parse_yaml(reader)?,
            RubricFormat::Csv => parser::parse_csv(reader)?,
        };

        let items = build_items(entries)?;
        info!(
            source = %source.describe(),
            items = items.len(),
            "rubric definition loaded"
        );
        Ok(RubricDefinition::from_checked_items(source, items))
    }

    /// Loads `path` when given, otherwise falls back to the built-in rubric.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<RubricDefinition, RubricLoadError> {
        match path {
            Some(path) => Self::from_path(path),
            None => {
                info!("no rubric definition supplied, using built-in default");
                Ok(Self::builtin())
            }
        }
    }

    pub fn builtin() -> RubricDefinition {
        builtin::default_rubric()
    }
}

fn build_items(entries: Vec<RawEntry>) -> Result<Vec<RubricItem>, RubricLoadError> {
    if entries.is_empty() {
        return Err(RubricLoadError::Empty);
    }

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());
    let mut max_points: i64 = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        let position = index + 1;
        let group = required_field(entry.section.as_deref(), "section", position)?;
        let label = required_field(entry.item.as_deref(), "item", position)?;

        let key = criterion_key(entry.criterion.as_deref().unwrap_or(&label));
        if key.is_empty() {
            return Err(RubricLoadError::MalformedRubric {
                position,
                reason: "criterion key has no letters or digits".to_string(),
            });
        }
        if !seen.insert(key.clone()) {
            return Err(RubricLoadError::MalformedRubric {
                position,
                reason: format!("duplicate criterion '{key}'"),
            });
        }

        let levels = entry
            .scale
            .ok_or_else(|| RubricLoadError::MalformedItem {
                criterion: key.clone(),
                reason: "missing scale".to_string(),
            })?
            .0;
        let scale = Scale::new(levels).map_err(|err| RubricLoadError::MalformedItem {
            criterion: key.clone(),
            reason: err.to_string(),
        })?;

        max_points = max_points
            .checked_add(scale.max_value())
            .ok_or_else(|| RubricLoadError::MalformedItem {
                criterion: key.clone(),
                reason: "scale values push the rubric maximum out of range".to_string(),
            })?;

        if let Some(minimum) = entry.minimum {
            if minimum < 0 {
                return Err(RubricLoadError::MalformedItem {
                    criterion: key,
                    reason: format!("minimum must not be negative (got {minimum})"),
                });
            }
        }

        items.push(RubricItem {
            criterion: CriterionKey(key),
            group,
            label,
            scale,
            minimum: entry.minimum,
        });
    }

    Ok(items)
}

fn required_field(
    value: Option<&str>,
    field: &'static str,
    position: usize,
) -> Result<String, RubricLoadError> {
    value
        .map(normalizer::clean_label)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RubricLoadError::MalformedRubric {
            position,
            reason: format!("missing required field '{field}'"),
        })
}
