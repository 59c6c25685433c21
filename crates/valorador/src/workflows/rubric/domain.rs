use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// The two weighted halves of the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Team,
    Body,
}

impl Section {
    pub const fn ordered() -> [Self; 2] {
        [Self::Team, Self::Body]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Team => "Equipo",
            Self::Body => "Cuerpo",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identifier for a rubric item, independent of display order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionKey(pub String);

impl CriterionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One selectable option on an item's scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleLevel {
    pub label: String,
    pub value: i64,
}

/// Ordered, non-empty set of labelled point values for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Scale {
    levels: Vec<ScaleLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaleError {
    #[error("scale has no levels")]
    Empty,
    #[error("scale contains a blank label")]
    BlankLabel,
    #[error("scale label '{0}' appears more than once")]
    DuplicateLabel(String),
    #[error("scale level '{label}' must be a positive integer, found {value}")]
    NonPositive { label: String, value: i64 },
}

impl Scale {
    pub fn new<I, S>(levels: I) -> Result<Self, ScaleError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for (label, value) in levels {
            let label = label.into().trim().to_string();
            if label.is_empty() {
                return Err(ScaleError::BlankLabel);
            }
            if value <= 0 {
                return Err(ScaleError::NonPositive { label, value });
            }
            if !seen.insert(label.clone()) {
                return Err(ScaleError::DuplicateLabel(label));
            }
            collected.push(ScaleLevel { label, value });
        }

        if collected.is_empty() {
            return Err(ScaleError::Empty);
        }

        Ok(Self { levels: collected })
    }

    /// The three-level scale used by the built-in rubric; five items top out at 75.
    pub fn three_level() -> Self {
        Self {
            levels: [("Insuficiente", 5), ("Adecuado", 10), ("Destacado", 15)]
                .into_iter()
                .map(|(label, value)| ScaleLevel {
                    label: label.to_string(),
                    value,
                })
                .collect(),
        }
    }

    pub fn levels(&self) -> &[ScaleLevel] {
        &self.levels
    }

    pub fn value_of(&self, label: &str) -> Option<i64> {
        let label = label.trim();
        self.levels
            .iter()
            .find(|level| level.label == label)
            .map(|level| level.value)
    }

    pub fn max_value(&self) -> i64 {
        self.levels
            .iter()
            .map(|level| level.value)
            .max()
            .unwrap_or_default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.levels.iter().map(|level| level.label.as_str()).collect()
    }
}

/// A single scored criterion of the Body section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricItem {
    pub criterion: CriterionKey,
    /// Grouping heading taken from the definition's `section` field.
    pub group: String,
    pub label: String,
    pub scale: Scale,
    /// Per-item floor; falling below it only raises a warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
}

impl RubricItem {
    pub fn points_for(&self, label: &str) -> Option<i64> {
        self.scale.value_of(label)
    }
}

/// Where a rubric definition came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum RubricSource {
    Builtin,
    File(PathBuf),
}

impl RubricSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Builtin => "built-in default rubric".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Validated, ordered list of Body items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricDefinition {
    source: RubricSource,
    items: Vec<RubricItem>,
}

impl RubricDefinition {
    /// Items must be non-empty with unique criterion keys; the loader checks both.
    pub(crate) fn from_checked_items(source: RubricSource, items: Vec<RubricItem>) -> Self {
        Self { source, items }
    }

    pub fn source(&self) -> &RubricSource {
        &self.source
    }

    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    pub fn item(&self, criterion: &CriterionKey) -> Option<&RubricItem> {
        self.items.iter().find(|item| &item.criterion == criterion)
    }

    /// Highest attainable raw Body sum, before capping.
    pub fn max_points(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.scale.max_value())
            .fold(0, i64::saturating_add)
    }
}

/// Researcher category used to assign Team points automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCategory {
    pub name: String,
    pub points: i64,
}

impl TeamCategory {
    pub fn new(name: impl Into<String>, points: i64) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_rejects_empty_duplicate_and_non_positive_levels() {
        assert_eq!(
            Scale::new(Vec::<(String, i64)>::new()),
            Err(ScaleError::Empty)
        );
        assert_eq!(
            Scale::new([("Bajo", 1), (" Bajo ", 2)]),
            Err(ScaleError::DuplicateLabel("Bajo".to_string()))
        );
        assert!(matches!(
            Scale::new([("Bajo", 0)]),
            Err(ScaleError::NonPositive { value: 0, .. })
        ));
        assert_eq!(Scale::new([("  ", 1)]), Err(ScaleError::BlankLabel));
    }

    #[test]
    fn scale_lookup_preserves_order_and_trims_labels() {
        let scale = Scale::new([("Alto", 3), ("Bajo", 1), ("Medio", 2)]).expect("valid scale");
        assert_eq!(scale.labels(), vec!["Alto", "Bajo", "Medio"]);
        assert_eq!(scale.value_of(" Medio "), Some(2));
        assert_eq!(scale.value_of("medio"), None);
        assert_eq!(scale.max_value(), 3);
    }

    #[test]
    fn sections_are_labelled_in_spanish() {
        let labels: Vec<_> = Section::ordered().iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Equipo", "Cuerpo"]);
    }
}
