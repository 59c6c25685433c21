use super::common::*;

use crate::workflows::rubric::domain::CriterionKey;
use crate::workflows::rubric::{
    BodyInput, BodyMode, EvaluationSession, RubricEvaluator, RubricFormat, RubricLoader,
    RubricService, RubricSource, ScoringProfile, SessionError, TeamCategory, Verdict,
};

#[test]
fn itemized_session_resolves_labels_against_the_rubric() {
    let mut selections = uniform_selections("Adecuado");
    selections[0] = select("planteo_del_problema", "Destacado");
    let report = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections)))
        .expect("session resolves");

    assert_eq!(report.body_mode, BodyMode::Itemized);
    assert_eq!(report.body_rows.len(), 5);
    assert_eq!(report.body_rows[0].points, 15);
    assert_eq!(report.body_rows[0].group, "Fundamentación");
    assert_eq!(report.result.body.total, 55);
    assert_eq!(report.result.team.total, 11);
    assert_eq!(report.result.total, 66);
    assert_eq!(report.result.verdict(), Verdict::Approved);
}

#[test]
fn rows_follow_rubric_order_regardless_of_selection_order() {
    let mut selections = uniform_selections("Destacado");
    selections.reverse();
    let report = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections)))
        .expect("session resolves");

    let criteria: Vec<_> = report
        .body_rows
        .iter()
        .map(|row| row.criterion.as_str().to_string())
        .collect();
    let expected: Vec<_> = RubricLoader::builtin()
        .items()
        .iter()
        .map(|item| item.criterion.as_str().to_string())
        .collect();
    assert_eq!(criteria, expected);
}

#[test]
fn criterion_names_are_normalised_before_lookup() {
    let mut selections = uniform_selections("Adecuado");
    selections[3] = select("Metodología", "Adecuado");
    // Accents survive normalisation, so this is not the "metodologia" key.
    let error = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections)))
        .expect_err("accented name does not match the key");
    assert_eq!(
        error,
        SessionError::UnknownCriterion("Metodología".to_string())
    );

    let mut selections = uniform_selections("Adecuado");
    selections[3] = select("  METODOLOGIA ", "Adecuado");
    assert!(service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections)))
        .is_ok());
}

#[test]
fn unknown_label_lists_the_valid_options() {
    let mut selections = uniform_selections("Adecuado");
    selections[1] = select("estado_del_arte", "Excelente");

    let error = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections)))
        .expect_err("label is not on the scale");

    assert_eq!(
        error,
        SessionError::UnknownLabel {
            criterion: CriterionKey("estado_del_arte".to_string()),
            label: "Excelente".to_string(),
            expected: "Insuficiente, Adecuado, Destacado".to_string(),
        }
    );
}

#[test]
fn every_item_needs_exactly_one_selection() {
    let mut selections = uniform_selections("Adecuado");
    let dropped = selections.pop().expect("builtin rubric has items");
    let missing = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections.clone())))
        .expect_err("missing selection");
    assert_eq!(
        missing,
        SessionError::MissingSelection(CriterionKey(dropped.criterion.clone()))
    );

    selections.push(dropped.clone());
    selections.push(dropped);
    let duplicated = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::Selections(selections)))
        .expect_err("duplicate selection");
    assert!(matches!(duplicated, SessionError::DuplicateSelection(_)));
}

#[test]
fn direct_score_bypasses_the_rubric() {
    let report = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::DirectScore(90)))
        .expect("direct score");

    assert_eq!(report.body_mode, BodyMode::Direct);
    assert_eq!(report.body_rows.len(), 1);
    assert_eq!(report.body_rows[0].item, "Puntaje global");
    assert_eq!(report.result.body.raw, 90);
    assert_eq!(report.result.body.total, 75);

    let error = service(ScoringProfile::Estandar)
        .evaluate(&session_input(BodyInput::DirectScore(-1)))
        .expect_err("negative direct score");
    assert_eq!(error, SessionError::NegativeDirectScore(-1));
}

#[test]
fn team_points_come_from_the_category_table() {
    let mut input = session_input(BodyInput::DirectScore(50));
    input.team.members[2].included = false;
    input.team.components = vec![3, 2];

    let estandar = service(ScoringProfile::Estandar)
        .evaluate(&input)
        .expect("estandar");
    assert_eq!(estandar.team_rows.len(), 5);
    assert_eq!(estandar.team_rows[3].name, "Componente A");
    assert_eq!(estandar.team_rows[4].name, "Componente B");
    assert_eq!(estandar.result.team.total, 6 + 4 + 3 + 2);

    let ampliado = service(ScoringProfile::Ampliado)
        .evaluate(&input)
        .expect("ampliado");
    assert_eq!(ampliado.result.team.raw, 10 + 8 + 3 + 2);
    assert_eq!(ampliado.result.team.total, 23);
}

#[test]
fn ampliado_profile_does_not_cap_the_team() {
    let mut input = session_input(BodyInput::DirectScore(50));
    input.team.members = vec![
        member("A", "Investigador/a Superior I"),
        member("B", "Investigador/a Superior I"),
        member("C", "Investigador/a Principal II"),
    ];

    let estandar = service(ScoringProfile::Estandar).evaluate(&input).expect("estandar");
    assert_eq!(estandar.result.team.total, 17);

    let ampliado = service(ScoringProfile::Ampliado).evaluate(&input).expect("ampliado");
    assert_eq!(ampliado.result.team.raw, 29);
    assert_eq!(ampliado.result.team.total, 29);
}

#[test]
fn team_roster_is_validated() {
    let mut input = session_input(BodyInput::DirectScore(50));
    input.team.members[1].category = "Profesor visitante".to_string();
    let error = service(ScoringProfile::Estandar)
        .evaluate(&input)
        .expect_err("unknown category");
    assert_eq!(
        error,
        SessionError::UnknownCategory {
            member: "Luis Ortiz".to_string(),
            category: "Profesor visitante".to_string(),
        }
    );

    input.team.members.clear();
    let error = service(ScoringProfile::Estandar)
        .evaluate(&input)
        .expect_err("empty team");
    assert_eq!(error, SessionError::EmptyTeam);
}

#[test]
fn session_runs_directly_against_an_evaluator() {
    let rubric = RubricLoader::builtin();
    let evaluator = RubricEvaluator::new(scoring_config(true)).expect("valid");
    let session = EvaluationSession::new(&rubric, &evaluator);

    let input = session_input(BodyInput::Selections(uniform_selections("Insuficiente")));
    let first = session.run(&input).expect("first run");
    let second = session.run(&input).expect("second run");

    assert_eq!(first, second);
    assert_eq!(first.result.body.total, 25);
    assert_eq!(first.result.verdict(), Verdict::NotApproved);
}

#[test]
fn session_input_deserialises_with_defaults() {
    let input: crate::workflows::rubric::SessionInput = serde_json::from_str(
        r#"{
            "team": {"members": [{"name": "Ana", "category": "Investigador/a Superior I"}]},
            "body": {"direct_score": 60}
        }"#,
    )
    .expect("valid payload");

    assert_eq!(input.project_name, "Proyecto sin nombre");
    assert!(input.observations.is_empty());
    assert!(input.team.members[0].included);
    assert!(input.team.components.is_empty());
    assert_eq!(input.body, BodyInput::DirectScore(60));
}

#[test]
fn oversized_scale_values_stay_within_the_section_caps() {
    let rubric = RubricLoader::from_reader(
        std::io::Cursor::new(format!(
            r#"[{{"section": "A", "item": "Impacto", "scale": {{"Bajo": 1, "Alto": {}}}}}]"#,
            i64::MAX
        )),
        RubricFormat::Json,
        RubricSource::Builtin,
    )
    .expect("a single maximal level fits");

    let mut config = scoring_config(true);
    config.categories = vec![TeamCategory::new("Investigador/a Superior I", i64::MAX)];
    let service = RubricService::new(rubric, config).expect("valid config");

    let mut input = session_input(BodyInput::Selections(vec![select("impacto", "Alto")]));
    input.team.members = vec![
        member("A", "Investigador/a Superior I"),
        member("B", "Investigador/a Superior I"),
    ];
    let report = service.evaluate(&input).expect("session resolves");

    assert_eq!(report.result.body.raw, i64::MAX);
    assert_eq!(report.result.body.total, 75);
    assert_eq!(report.result.team.raw, i64::MAX);
    assert_eq!(report.result.team.total, 25);
    assert_eq!(report.result.total, 100);
    assert_eq!(report.result.verdict(), Verdict::Approved);
}
