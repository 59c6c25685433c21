use super::super::domain::{Section, TeamCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Threshold and cap settings for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub maximum: i64,
    pub minimum_required: i64,
    pub capped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub minimum_required: i64,
}

/// Complete scoring rubric configuration: section thresholds plus the team category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub body: SectionConfig,
    pub team: SectionConfig,
    pub global: GlobalConfig,
    pub categories: Vec<TeamCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{section} maximum must not be negative (got {maximum})")]
    NegativeMaximum { section: Section, maximum: i64 },
    #[error("{section} minimum required must not be negative (got {minimum})")]
    NegativeMinimum { section: Section, minimum: i64 },
    #[error("{section} minimum required {minimum} exceeds its maximum {maximum}")]
    MinimumAboveMaximum {
        section: Section,
        minimum: i64,
        maximum: i64,
    },
    #[error("Cuerpo score is always capped; capped=false is not allowed")]
    BodyMustBeCapped,
    #[error("global minimum required must not be negative (got {0})")]
    NegativeGlobalMinimum(i64),
    #[error("global minimum required {minimum} is above the highest reachable total {ceiling}")]
    UnreachableGlobalMinimum { minimum: i64, ceiling: i64 },
    #[error("section maximums {body} + {team} do not fit in a score")]
    MaximumOverflow { body: i64, team: i64 },
    #[error("no team categories configured")]
    NoCategories,
    #[error("team category '{0}' is configured more than once")]
    DuplicateCategory(String),
    #[error("team category '{name}' must not have negative points (got {points})")]
    NegativeCategoryPoints { name: String, points: i64 },
}

impl ScoringConfig {
    /// Rejects thresholds that are out of range or can never be satisfied.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.body.capped {
            return Err(ConfigurationError::BodyMustBeCapped);
        }

        for (section, config) in [(Section::Team, &self.team), (Section::Body, &self.body)] {
            if config.maximum < 0 {
                return Err(ConfigurationError::NegativeMaximum {
                    section,
                    maximum: config.maximum,
                });
            }
            if config.minimum_required < 0 {
                return Err(ConfigurationError::NegativeMinimum {
                    section,
                    minimum: config.minimum_required,
                });
            }
            if config.capped && config.minimum_required > config.maximum {
                return Err(ConfigurationError::MinimumAboveMaximum {
                    section,
                    minimum: config.minimum_required,
                    maximum: config.maximum,
                });
            }
        }

        if self.body.maximum.checked_add(self.team.maximum).is_none() {
            return Err(ConfigurationError::MaximumOverflow {
                body: self.body.maximum,
                team: self.team.maximum,
            });
        }

        if self.global.minimum_required < 0 {
            return Err(ConfigurationError::NegativeGlobalMinimum(
                self.global.minimum_required,
            ));
        }

        if let Some(ceiling) = self.max_total() {
            if self.global.minimum_required > ceiling {
                return Err(ConfigurationError::UnreachableGlobalMinimum {
                    minimum: self.global.minimum_required,
                    ceiling,
                });
            }
        }

        if self.categories.is_empty() {
            return Err(ConfigurationError::NoCategories);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.points < 0 {
                return Err(ConfigurationError::NegativeCategoryPoints {
                    name: category.name.clone(),
                    points: category.points,
                });
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigurationError::DuplicateCategory(category.name.clone()));
            }
        }

        Ok(())
    }

    pub fn section(&self, section: Section) -> &SectionConfig {
        match section {
            Section::Team => &self.team,
            Section::Body => &self.body,
        }
    }

    /// Highest reachable combined total, or `None` when the team score is uncapped.
    pub fn max_total(&self) -> Option<i64> {
        if self.team.capped {
            Some(self.body.maximum.saturating_add(self.team.maximum))
        } else {
            None
        }
    }

    pub fn category_points(&self, name: &str) -> Option<i64> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.points)
    }

    pub fn apply(mut self, overrides: &ScoringOverrides) -> Self {
        if let Some(value) = overrides.body_maximum {
            self.body.maximum = value;
        }
        if let Some(value) = overrides.body_minimum_required {
            self.body.minimum_required = value;
        }
        if let Some(value) = overrides.team_maximum {
            self.team.maximum = value;
        }
        if let Some(value) = overrides.team_minimum_required {
            self.team.minimum_required = value;
        }
        if let Some(value) = overrides.cap_team {
            self.team.capped = value;
        }
        if let Some(value) = overrides.global_minimum_required {
            self.global.minimum_required = value;
        }
        if let Some(categories) = &overrides.categories {
            self.categories = categories.clone();
        }
        self
    }
}

/// Built-in reglament variants. They disagree on team capping and category magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringProfile {
    #[default]
    Estandar,
    Ampliado,
}

const CATEGORY_NAMES: [&str; 7] = [
    "Investigador/a Superior I",
    "Investigador/a Principal II",
    "Investigador/a Independiente III",
    "Investigador/a Adjunto/a IV",
    "Investigador/a Asistente V",
    "Becario/a de Iniciación VI",
    "Sin categorización / Externo",
];

impl ScoringProfile {
    pub const fn ordered() -> [Self; 2] {
        [Self::Estandar, Self::Ampliado]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Estandar => "estandar",
            Self::Ampliado => "ampliado",
        }
    }

    pub fn config(self) -> ScoringConfig {
        let (team_capped, points): (bool, [i64; 7]) = match self {
            Self::Estandar => (true, [6, 5, 4, 3, 2, 1, 0]),
            Self::Ampliado => (false, [10, 9, 8, 5, 4, 2, 1]),
        };

        ScoringConfig {
            body: SectionConfig {
                maximum: 75,
                minimum_required: 45,
                capped: true,
            },
            team: SectionConfig {
                maximum: 25,
                minimum_required: 10,
                capped: team_capped,
            },
            global: GlobalConfig {
                minimum_required: 60,
            },
            categories: CATEGORY_NAMES
                .iter()
                .zip(points)
                .map(|(name, points)| TeamCategory::new(*name, points))
                .collect(),
        }
    }
}

impl fmt::Display for ScoringProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scoring profile '{0}' (expected estandar or ampliado)")]
pub struct UnknownProfile(pub String);

impl FromStr for ScoringProfile {
    type Err = UnknownProfile;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "estandar" | "estándar" | "standard" => Ok(Self::Estandar),
            "ampliado" | "extended" => Ok(Self::Ampliado),
            other => Err(UnknownProfile(other.to_string())),
        }
    }
}

/// Partial configuration read from a file or the command line; unset fields keep the profile value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringOverrides {
    #[serde(default)]
    pub profile: Option<ScoringProfile>,
    #[serde(default)]
    pub body_maximum: Option<i64>,
    #[serde(default)]
    pub body_minimum_required: Option<i64>,
    #[serde(default)]
    pub team_maximum: Option<i64>,
    #[serde(default)]
    pub team_minimum_required: Option<i64>,
    #[serde(default)]
    pub cap_team: Option<bool>,
    #[serde(default)]
    pub global_minimum_required: Option<i64>,
    #[serde(default)]
    pub categories: Option<Vec<TeamCategory>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringFileError {
    #[error("failed to read scoring configuration {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON scoring configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML scoring configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported scoring configuration format '{0}' (use .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

impl ScoringOverrides {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringFileError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let file = std::fs::File::open(path).map_err(|source| ScoringFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_str() {
            "json" => Self::from_json_reader(file),
            "yaml" | "yml" => Ok(serde_yaml::from_reader(file)?),
            other => Err(ScoringFileError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ScoringFileError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Layers `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ScoringOverrides) -> Self {
        Self {
            profile: other.profile.or(self.profile),
            body_maximum: other.body_maximum.or(self.body_maximum),
            body_minimum_required: other.body_minimum_required.or(self.body_minimum_required),
            team_maximum: other.team_maximum.or(self.team_maximum),
            team_minimum_required: other.team_minimum_required.or(self.team_minimum_required),
            cap_team: other.cap_team.or(self.cap_team),
            global_minimum_required: other
                .global_minimum_required
                .or(self.global_minimum_required),
            categories: other.categories.or(self.categories),
        }
    }

    /// Resolves the profile (explicit or `fallback`) and applies every override on top.
    pub fn resolve(&self, fallback: ScoringProfile) -> ScoringConfig {
        self.profile.unwrap_or(fallback).config().apply(self)
    }
}
