//! Rubric scoring: definition loading, Team/Body evaluation with capping and
//! thresholds, and the spreadsheet export of a finished evaluation.
//!
//! Every interaction recomputes from scratch; nothing is cached between calls.

pub mod definition;
pub mod domain;
pub(crate) mod evaluation;
pub mod export;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use definition::{RubricFormat, RubricLoadError, RubricLoader};
pub use domain::{
    CriterionKey, RubricDefinition, RubricItem, RubricSource, Scale, ScaleError, ScaleLevel,
    Section, TeamCategory,
};
pub use evaluation::{
    condition_label, BodyEntry, ConfigurationError, EvaluationInput, EvaluationResult,
    GlobalConfig, ItemBreach, RubricEvaluator, ScoringConfig, ScoringFileError, ScoringOverrides,
    ScoringProfile, SectionConfig, SectionScore, TeamEntry, UnknownProfile, Verdict,
};
pub use export::{
    export_report, workbook, CsvWorkbook, ExportError, ExportMetadata, MemoryWorkbook, Sheet,
    WorkbookSink, XlsxWorkbook, BODY_SHEET, SUMMARY_SHEET, TEAM_SHEET, WORKBOOK_FILE_NAME,
};
pub use router::{rubric_router, EvaluationResponse, RubricView};
pub use service::RubricService;
pub use session::{
    BodyInput, BodyMode, BodyRow, EvaluationSession, SelectionInput, SessionError, SessionInput,
    SessionReport, TeamInput, TeamMemberInput, TeamRow,
};
