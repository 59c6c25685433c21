use crate::cli::{SourceArgs, ThresholdArgs};
use crate::infra::build_service;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;
use valorador::config::{AppConfig, RubricSettings};
use valorador::error::AppError;
use valorador::telemetry;
use valorador::workflows::rubric::{
    condition_label, export_report, BodyMode, ExportMetadata, RubricService, SectionScore,
    SessionInput, SessionReport, XlsxWorkbook,
};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Session file (JSON) with project data, team roster and Cuerpo selections
    #[arg(long)]
    pub(crate) input: PathBuf,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[command(flatten)]
    pub(crate) thresholds: ThresholdArgs,
    /// Write the Resumen/Equipo/Cuerpo workbook (resumen_valorador.xlsx) into this directory
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
    /// File copied unchanged next to the exported sheets
    #[arg(long, requires = "export_dir")]
    pub(crate) attachment: Option<PathBuf>,
    /// Evaluation date recorded in the export (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RubricShowArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[command(flatten)]
    pub(crate) thresholds: ThresholdArgs,
}

fn prepare(source: &SourceArgs) -> Result<RubricSettings, AppError> {
    let mut config = AppConfig::load()?;
    source.apply(&mut config.rubric);
    telemetry::init(&config.telemetry)?;
    Ok(config.rubric)
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let settings = prepare(&args.source)?;
    let service = build_service(&settings, args.thresholds.overrides())?;
    let evaluated_on = args.date.unwrap_or_else(|| Local::now().date_naive());

    let report = evaluate_file(&service, &args)?;
    print!("{}", render_report(&report));

    if let Some(directory) = &args.export_dir {
        let written =
            export_to_directory(&report, evaluated_on, directory, args.attachment.as_deref())?;
        println!("\nInforme exportado:");
        for path in written {
            println!("  - {}", path.display());
        }
    }

    Ok(())
}

pub(crate) fn run_rubric_show(args: RubricShowArgs) -> Result<(), AppError> {
    let settings = prepare(&args.source)?;
    let service = build_service(&settings, args.thresholds.overrides())?;
    print!("{}", render_rubric(&service));
    Ok(())
}

fn evaluate_file(service: &RubricService, args: &EvaluateArgs) -> Result<SessionReport, AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let input: SessionInput = serde_json::from_str(&raw)?;
    Ok(service.evaluate(&input)?)
}

/// Writes the workbook and, when given, the attachment. Scores are not touched on failure.
pub(crate) fn export_to_directory(
    report: &SessionReport,
    evaluated_on: NaiveDate,
    directory: &Path,
    attachment: Option<&Path>,
) -> Result<Vec<PathBuf>, AppError> {
    let mut workbook = XlsxWorkbook::create(directory)?;
    export_report(report, &ExportMetadata { evaluated_on }, &mut workbook)?;
    workbook.save()?;
    if let Some(path) = attachment {
        workbook.attach(path)?;
    }

    info!(
        directory = %workbook.directory().display(),
        files = workbook.written().len(),
        "report exported"
    );
    Ok(workbook.written().to_vec())
}

fn section_line(name: &str, score: &SectionScore) -> String {
    let ceiling = if score.capped {
        format!("{} / {}", score.total, score.maximum)
    } else {
        format!("{} (sin tope, referencia {})", score.total, score.maximum)
    };
    format!(
        "{name}: {ceiling} | condición {} (mín {})",
        condition_label(score.meets_minimum),
        score.minimum_required
    )
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub(crate) fn render_report(report: &SessionReport) -> String {
    let result = &report.result;
    let mut lines = vec![format!("Proyecto: {}", report.project_name)];

    lines.push("\nEquipo".to_string());
    lines.extend(report.team_rows.iter().map(|row| {
        let marker = if row.included { "x" } else { " " };
        format!(
            "  [{marker}] {} - {} ({} pts)",
            row.name, row.category, row.points
        )
    }));

    let heading = match report.body_mode {
        BodyMode::Itemized => "Cuerpo (desglose por ítems)",
        BodyMode::Direct => "Cuerpo (puntaje global)",
    };
    lines.push(format!("\n{heading}"));
    lines.extend(report.body_rows.iter().map(|row| {
        format!(
            "  - {} / {}: {} ({} pts)",
            row.group, row.item, row.label, row.points
        )
    }));

    lines.push(format!("\n{}", section_line("Equipo", &result.team)));
    lines.push(section_line("Cuerpo", &result.body));
    lines.push(format!(
        "Total: {} | condición global {} (mín {})",
        result.total,
        condition_label(result.global_ok),
        result.global_minimum
    ));

    lines.extend(result.item_breaches.iter().map(|breach| {
        format!(
            "Advertencia: '{}' por debajo de su mínimo ({}/{})",
            breach.criterion, breach.points, breach.minimum
        )
    }));

    lines.push(format!("\nResultado: {}", result.verdict().label()));
    if !report.observations.trim().is_empty() {
        lines.push(format!("Observaciones: {}", report.observations.trim()));
    }
    join_lines(lines)
}

pub(crate) fn render_rubric(service: &RubricService) -> String {
    let rubric = service.rubric();
    let config = service.config();
    let mut lines = vec![format!("Rúbrica: {}", rubric.source().describe())];

    let mut current_group: Option<&str> = None;
    for item in rubric.items() {
        if current_group != Some(item.group.as_str()) {
            lines.push(format!("\n{}", item.group));
            current_group = Some(item.group.as_str());
        }
        let levels = item
            .scale
            .levels()
            .iter()
            .map(|level| format!("{}={}", level.label, level.value))
            .collect::<Vec<_>>()
            .join(", ");
        let minimum = item
            .minimum
            .map(|minimum| format!(" [mín {minimum}]"))
            .unwrap_or_default();
        lines.push(format!(
            "  - {} ({}): {levels}{minimum}",
            item.label, item.criterion
        ));
    }

    lines.push(format!("\nPuntaje máximo por ítems: {}", rubric.max_points()));
    lines.push(format!(
        "Cuerpo: máx {} / mín {}",
        config.body.maximum, config.body.minimum_required
    ));
    lines.push(format!(
        "Equipo: máx {} / mín {}{}",
        config.team.maximum,
        config.team.minimum_required,
        if config.team.capped { "" } else { " (sin tope)" }
    ));
    lines.push(format!("Mínimo global: {}", config.global.minimum_required));

    lines.push("\nCategorías de Equipo".to_string());
    lines.extend(
        config
            .categories
            .iter()
            .map(|category| format!("  - {}: {} pts", category.name, category.points)),
    );
    join_lines(lines)
}
