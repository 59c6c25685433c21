use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::definition::criterion_key;
use super::domain::{CriterionKey, RubricDefinition};
use super::evaluation::{
    BodyEntry, EvaluationInput, EvaluationResult, RubricEvaluator, TeamEntry,
};

const DEFAULT_PROJECT_NAME: &str = "Proyecto sin nombre";
const DIRECT_SCORE_CRITERION: &str = "puntaje_global";
const COMPONENT_CATEGORY: &str = "Componente adicional";

/// One interaction's worth of user input, built fresh for every recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub observations: String,
    pub team: TeamInput,
    pub body: BodyInput,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInput {
    pub members: Vec<TeamMemberInput>,
    /// Extra team points added on top of the roster.
    #[serde(default)]
    pub components: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMemberInput {
    pub name: String,
    pub category: String,
    #[serde(default = "default_included")]
    pub included: bool,
}

fn default_included() -> bool {
    true
}

/// Body score either itemised against the rubric or entered as a single global value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyInput {
    Selections(Vec<SelectionInput>),
    DirectScore(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionInput {
    pub criterion: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("team roster is empty; select at least one member")]
    EmptyTeam,
    #[error("team member '{member}' has unknown category '{category}'")]
    UnknownCategory { member: String, category: String },
    #[error("selection refers to unknown criterion '{0}'")]
    UnknownCriterion(String),
    #[error("criterion '{0}' has no selection")]
    MissingSelection(CriterionKey),
    #[error("criterion '{0}' was selected more than once")]
    DuplicateSelection(CriterionKey),
    #[error("criterion '{criterion}' has no option '{label}' (expected one of: {expected})")]
    UnknownLabel {
        criterion: CriterionKey,
        label: String,
        expected: String,
    },
    #[error("direct Cuerpo score must not be negative (got {0})")]
    NegativeDirectScore(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyMode {
    Itemized,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRow {
    pub name: String,
    pub category: String,
    pub included: bool,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyRow {
    pub criterion: CriterionKey,
    pub group: String,
    pub item: String,
    pub label: String,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
}

/// Evaluation result paired with the resolved rows it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub project_name: String,
    pub observations: String,
    pub body_mode: BodyMode,
    pub result: EvaluationResult,
    pub team_rows: Vec<TeamRow>,
    pub body_rows: Vec<BodyRow>,
}

/// Resolves user input against a rubric and runs the evaluator.
pub struct EvaluationSession<'a> {
    rubric: &'a RubricDefinition,
    evaluator: &'a RubricEvaluator,
}

impl<'a> EvaluationSession<'a> {
    pub fn new(rubric: &'a RubricDefinition, evaluator: &'a RubricEvaluator) -> Self {
        Self { rubric, evaluator }
    }

    pub fn run(&self, input: &SessionInput) -> Result<SessionReport, SessionError> {
        let team_rows = self.resolve_team(&input.team)?;
        let (body_mode, body_rows) = match &input.body {
            BodyInput::Selections(selections) => {
                (BodyMode::Itemized, self.resolve_selections(selections)?)
            }
            BodyInput::DirectScore(score) => (BodyMode::Direct, direct_body_rows(*score)?),
        };

        let evaluation_input = EvaluationInput {
            team: team_rows
                .iter()
                .map(|row| TeamEntry {
                    points: row.points,
                    included: row.included,
                })
                .collect(),
            body: body_rows
                .iter()
                .map(|row| BodyEntry {
                    criterion: row.criterion.clone(),
                    points: row.points,
                    minimum: row.minimum,
                })
                .collect(),
        };

        let result = self.evaluator.evaluate(&evaluation_input);
        for breach in &result.item_breaches {
            warn!(
                criterion = %breach.criterion,
                points = breach.points,
                minimum = breach.minimum,
                "item below its minimum"
            );
        }
        debug!(
            project = %input.project_name,
            total = result.total,
            verdict = result.verdict().label(),
            "session evaluated"
        );

        Ok(SessionReport {
            project_name: input.project_name.trim().to_string(),
            observations: input.observations.clone(),
            body_mode,
            result,
            team_rows,
            body_rows,
        })
    }

    fn resolve_team(&self, team: &TeamInput) -> Result<Vec<TeamRow>, SessionError> {
        if team.members.is_empty() {
            return Err(SessionError::EmptyTeam);
        }

        let config = self.evaluator.config();
        let mut rows = Vec::with_capacity(team.members.len() + team.components.len());

        for member in &team.members {
            let points = config.category_points(&member.category).ok_or_else(|| {
                SessionError::UnknownCategory {
                    member: member.name.clone(),
                    category: member.category.clone(),
                }
            })?;
            rows.push(TeamRow {
                name: member.name.trim().to_string(),
                category: member.category.trim().to_string(),
                included: member.included,
                points,
            });
        }

        for (index, points) in team.components.iter().enumerate() {
            rows.push(TeamRow {
                name: component_name(index),
                category: COMPONENT_CATEGORY.to_string(),
                included: true,
                points: i64::from(*points),
            });
        }

        Ok(rows)
    }

    fn resolve_selections(
        &self,
        selections: &[SelectionInput],
    ) -> Result<Vec<BodyRow>, SessionError> {
        let mut chosen: HashMap<CriterionKey, &SelectionInput> = HashMap::new();

        for selection in selections {
            let key = CriterionKey(criterion_key(&selection.criterion));
            if self.rubric.item(&key).is_none() {
                return Err(SessionError::UnknownCriterion(selection.criterion.clone()));
            }
            if chosen.insert(key.clone(), selection).is_some() {
                return Err(SessionError::DuplicateSelection(key));
            }
        }

        self.rubric
            .items()
            .iter()
            .map(|item| -> Result<BodyRow, SessionError> {
                let selection = chosen
                    .get(&item.criterion)
                    .ok_or_else(|| SessionError::MissingSelection(item.criterion.clone()))?;
                let points =
                    item.points_for(&selection.label)
                        .ok_or_else(|| SessionError::UnknownLabel {
                            criterion: item.criterion.clone(),
                            label: selection.label.clone(),
                            expected: item.scale.labels().join(", "),
                        })?;

                Ok(BodyRow {
                    criterion: item.criterion.clone(),
                    group: item.group.clone(),
                    item: item.label.clone(),
                    label: selection.label.trim().to_string(),
                    points,
                    minimum: item.minimum,
                })
            })
            .collect()
    }
}

fn direct_body_rows(score: i64) -> Result<Vec<BodyRow>, SessionError> {
    if score < 0 {
        return Err(SessionError::NegativeDirectScore(score));
    }

    Ok(vec![BodyRow {
        criterion: CriterionKey(DIRECT_SCORE_CRITERION.to_string()),
        group: "Cuerpo".to_string(),
        item: "Puntaje global".to_string(),
        label: "Carga directa".to_string(),
        points: score,
        minimum: None,
    }])
}

/// `Componente A`, `Componente B`, ... then numbered past the alphabet.
fn component_name(index: usize) -> String {
    match u8::try_from(index).ok().filter(|index| *index < 26) {
        Some(offset) => format!("Componente {}", char::from(b'A' + offset)),
        None => format!("Componente {}", index + 1),
    }
}
