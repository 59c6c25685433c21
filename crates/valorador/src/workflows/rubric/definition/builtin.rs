use super::super::domain::{CriterionKey, RubricDefinition, RubricItem, RubricSource, Scale};

const DEFAULT_ITEMS: &[(&str, &str, &str)] = &[
    ("planteo_del_problema", "Fundamentación", "Planteo del problema"),
    ("estado_del_arte", "Fundamentación", "Estado del arte"),
    ("objetivos", "Objetivos", "Claridad y pertinencia de los objetivos"),
    ("metodologia", "Metodología", "Adecuación de la metodología"),
    ("factibilidad", "Factibilidad", "Cronograma y recursos"),
];

/// Fallback rubric used when no external definition is supplied.
pub(crate) fn default_rubric() -> RubricDefinition {
    let items = DEFAULT_ITEMS
        .iter()
        .map(|(criterion, group, label)| RubricItem {
            criterion: CriterionKey((*criterion).to_string()),
            group: (*group).to_string(),
            label: (*label).to_string(),
            scale: Scale::three_level(),
            minimum: None,
        })
        .collect();

    RubricDefinition::from_checked_items(RubricSource::Builtin, items)
}
