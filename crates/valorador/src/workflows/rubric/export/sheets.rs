use super::super::evaluation::condition_label;
use super::super::session::SessionReport;
use super::ExportMetadata;

pub const SUMMARY_SHEET: &str = "Resumen";
pub const TEAM_SHEET: &str = "Equipo";
pub const BODY_SHEET: &str = "Cuerpo";

/// Flat table destined for one spreadsheet tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &'static str, headers: Vec<String>) -> Self {
        Self {
            name,
            headers,
            rows: Vec::new(),
        }
    }

    /// Value of `header` in the first row, if both exist.
    pub fn first_value(&self, header: &str) -> Option<&str> {
        let column = self.headers.iter().position(|name| name == header)?;
        self.rows
            .first()
            .and_then(|row| row.get(column))
            .map(String::as_str)
    }
}

pub(crate) fn summary_sheet(report: &SessionReport, metadata: &ExportMetadata) -> Sheet {
    let result = &report.result;
    let mut sheet = Sheet::new(
        SUMMARY_SHEET,
        vec![
            "Proyecto/Postulante".to_string(),
            "Equipo".to_string(),
            "Cuerpo".to_string(),
            "Total".to_string(),
            "Aprobado".to_string(),
            format!("Condición Equipo (mín {})", result.team.minimum_required),
            format!("Condición Cuerpo (mín {})", result.body.minimum_required),
            format!("Condición Global (mín {})", result.global_minimum),
            "Mínimo Global requerido".to_string(),
            "Observaciones".to_string(),
            "Fecha de evaluación".to_string(),
        ],
    );

    sheet.rows.push(vec![
        report.project_name.clone(),
        result.team.total.to_string(),
        result.body.total.to_string(),
        result.total.to_string(),
        result.verdict().label().to_string(),
        condition_label(result.team.meets_minimum).to_string(),
        condition_label(result.body.meets_minimum).to_string(),
        condition_label(result.global_ok).to_string(),
        result.global_minimum.to_string(),
        report.observations.clone(),
        metadata.evaluated_on.format("%Y-%m-%d").to_string(),
    ]);

    sheet
}

pub(crate) fn team_sheet(report: &SessionReport) -> Sheet {
    let mut sheet = Sheet::new(
        TEAM_SHEET,
        vec![
            "Nombre".to_string(),
            "Categoría".to_string(),
            "Incluido".to_string(),
            "Puntos".to_string(),
        ],
    );

    sheet.rows = report
        .team_rows
        .iter()
        .map(|row| {
            vec![
                row.name.clone(),
                row.category.clone(),
                if row.included { "Sí" } else { "No" }.to_string(),
                row.points.to_string(),
            ]
        })
        .collect();

    sheet
}

pub(crate) fn body_sheet(report: &SessionReport) -> Sheet {
    let mut sheet = Sheet::new(
        BODY_SHEET,
        vec![
            "Sección".to_string(),
            "Ítem".to_string(),
            "Opción".to_string(),
            "Puntos".to_string(),
        ],
    );

    sheet.rows = report
        .body_rows
        .iter()
        .map(|row| {
            vec![
                row.group.clone(),
                row.item.clone(),
                row.label.clone(),
                row.points.to_string(),
            ]
        })
        .collect();

    sheet
}
