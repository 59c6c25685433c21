mod config;
mod policy;
mod rules;

pub use config::{
    ConfigurationError, GlobalConfig, ScoringConfig, ScoringFileError, ScoringOverrides,
    ScoringProfile, SectionConfig, UnknownProfile,
};
pub use policy::{condition_label, Verdict};

use super::domain::{CriterionKey, Section};
use policy::decide_conditions;
use serde::{Deserialize, Serialize};

/// Points resolved for one Body item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyEntry {
    pub criterion: CriterionKey,
    pub points: i64,
    #[serde(default)]
    pub minimum: Option<i64>,
}

/// Points contributed by one Team member or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub points: i64,
    pub included: bool,
}

/// Everything the evaluator needs for one recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub team: Vec<TeamEntry>,
    pub body: Vec<BodyEntry>,
}

/// Raw and capped totals for a section together with its threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionScore {
    pub section: Section,
    pub raw: i64,
    pub total: i64,
    pub maximum: i64,
    pub minimum_required: i64,
    pub capped: bool,
    pub meets_minimum: bool,
}

/// Body item scored below its own minimum. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemBreach {
    pub criterion: CriterionKey,
    pub minimum: i64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub team: SectionScore,
    pub body: SectionScore,
    pub total: i64,
    pub global_minimum: i64,
    pub global_ok: bool,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_breaches: Vec<ItemBreach>,
}

impl EvaluationResult {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_approved(self.approved)
    }

    pub fn section(&self, section: Section) -> &SectionScore {
        match section {
            Section::Team => &self.team,
            Section::Body => &self.body,
        }
    }
}

/// Stateless evaluator holding a validated scoring configuration.
#[derive(Debug, Clone)]
pub struct RubricEvaluator {
    config: ScoringConfig,
}

impl RubricEvaluator {
    pub fn new(config: ScoringConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn evaluate(&self, input: &EvaluationInput) -> EvaluationResult {
        let body_tally = rules::tally_body(&input.body, &self.config.body);
        let team_tally = rules::tally_team(&input.team, &self.config.team);

        let body = section_score(Section::Body, body_tally, &self.config.body);
        let team = section_score(Section::Team, team_tally, &self.config.team);
        let total = body.total.saturating_add(team.total);
        let conditions = decide_conditions(&team, &body, total, &self.config.global);

        EvaluationResult {
            team,
            body,
            total,
            global_minimum: self.config.global.minimum_required,
            global_ok: conditions.global_ok,
            approved: conditions.approved,
            item_breaches: rules::item_breaches(&input.body),
        }
    }
}

fn section_score(
    section: Section,
    tally: rules::SectionTally,
    config: &SectionConfig,
) -> SectionScore {
    SectionScore {
        section,
        raw: tally.raw,
        total: tally.total,
        maximum: config.maximum,
        minimum_required: config.minimum_required,
        capped: config.capped,
        meets_minimum: tally.total >= config.minimum_required,
    }
}
