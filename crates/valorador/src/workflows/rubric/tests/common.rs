use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::rubric::domain::CriterionKey;
use crate::workflows::rubric::{
    BodyEntry, BodyInput, EvaluationInput, GlobalConfig, RubricLoader, RubricService,
    ScoringConfig, ScoringProfile, SectionConfig, SelectionInput, SessionInput, TeamEntry,
    TeamInput, TeamMemberInput,
};

/// 75/45 body, 25/10 team, global 60.
pub(super) fn scoring_config(cap_team: bool) -> ScoringConfig {
    ScoringConfig {
        body: SectionConfig {
            maximum: 75,
            minimum_required: 45,
            capped: true,
        },
        team: SectionConfig {
            maximum: 25,
            minimum_required: 10,
            capped: cap_team,
        },
        global: GlobalConfig {
            minimum_required: 60,
        },
        categories: ScoringProfile::Estandar.config().categories,
    }
}

pub(super) fn body(points: &[i64]) -> Vec<BodyEntry> {
    points
        .iter()
        .enumerate()
        .map(|(index, points)| BodyEntry {
            criterion: CriterionKey(format!("item_{index}")),
            points: *points,
            minimum: None,
        })
        .collect()
}

pub(super) fn team(points: &[i64]) -> Vec<TeamEntry> {
    points
        .iter()
        .map(|points| TeamEntry {
            points: *points,
            included: true,
        })
        .collect()
}

pub(super) fn input(team_points: &[i64], body_points: &[i64]) -> EvaluationInput {
    EvaluationInput {
        team: team(team_points),
        body: body(body_points),
    }
}

pub(super) fn member(name: &str, category: &str) -> TeamMemberInput {
    TeamMemberInput {
        name: name.to_string(),
        category: category.to_string(),
        included: true,
    }
}

pub(super) fn select(criterion: &str, label: &str) -> SelectionInput {
    SelectionInput {
        criterion: criterion.to_string(),
        label: label.to_string(),
    }
}

/// Built-in rubric, every item rated `label`.
pub(super) fn uniform_selections(label: &str) -> Vec<SelectionInput> {
    RubricLoader::builtin()
        .items()
        .iter()
        .map(|item| select(item.criterion.as_str(), label))
        .collect()
}

pub(super) fn session_input(body: BodyInput) -> SessionInput {
    SessionInput {
        project_name: "Biorremediación de suelos".to_string(),
        observations: "Revisar cronograma".to_string(),
        team: TeamInput {
            members: vec![
                member("Ana Pereyra", "Investigador/a Superior I"),
                member("Luis Ortiz", "Investigador/a Independiente III"),
                member("Sofía Benítez", "Becario/a de Iniciación VI"),
            ],
            components: Vec::new(),
        },
        body,
    }
}

pub(super) fn service(profile: ScoringProfile) -> RubricService {
    RubricService::new(RubricLoader::builtin(), profile.config()).expect("profile is valid")
}

pub(super) fn shared_service() -> Arc<RubricService> {
    Arc::new(service(ScoringProfile::Estandar))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
