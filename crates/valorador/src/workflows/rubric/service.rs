use tracing::info;

use super::domain::RubricDefinition;
use super::evaluation::{ConfigurationError, RubricEvaluator, ScoringConfig};
use super::session::{EvaluationSession, SessionError, SessionInput, SessionReport};

/// Loaded rubric plus validated evaluator, shared read-only across interactions.
#[derive(Debug, Clone)]
pub struct RubricService {
    rubric: RubricDefinition,
    evaluator: RubricEvaluator,
}

impl RubricService {
    pub fn new(rubric: RubricDefinition, config: ScoringConfig) -> Result<Self, ConfigurationError> {
        let evaluator = RubricEvaluator::new(config)?;
        Ok(Self { rubric, evaluator })
    }

    pub fn rubric(&self) -> &RubricDefinition {
        &self.rubric
    }

    pub fn config(&self) -> &ScoringConfig {
        self.evaluator.config()
    }

    /// Full recomputation for one interaction; no state is retained between calls.
    pub fn evaluate(&self, input: &SessionInput) -> Result<SessionReport, SessionError> {
        let report = EvaluationSession::new(&self.rubric, &self.evaluator).run(input)?;
        info!(
            project = %report.project_name,
            team = report.result.team.total,
            body = report.result.body.total,
            total = report.result.total,
            verdict = report.result.verdict().label(),
            "rubric evaluated"
        );
        Ok(report)
    }
}
