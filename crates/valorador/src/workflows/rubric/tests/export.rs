use super::common::*;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;

use crate::workflows::rubric::{
    export_report, BodyInput, CsvWorkbook, ExportError, ExportMetadata, MemoryWorkbook,
    ScoringProfile, SessionReport, XlsxWorkbook, BODY_SHEET, SUMMARY_SHEET, TEAM_SHEET,
    WORKBOOK_FILE_NAME,
};

fn metadata() -> ExportMetadata {
    ExportMetadata {
        evaluated_on: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
    }
}

fn approved_report() -> SessionReport {
    let mut input = session_input(BodyInput::Selections(uniform_selections("Adecuado")));
    input.team.members[2].included = false;
    service(ScoringProfile::Estandar)
        .evaluate(&input)
        .expect("session resolves")
}

#[test]
fn summary_sheet_mirrors_the_displayed_result() {
    let report = approved_report();
    let mut sink = MemoryWorkbook::default();
    export_report(&report, &metadata(), &mut sink).expect("memory export");

    let names: Vec<_> = sink.sheets.iter().map(|sheet| sheet.name).collect();
    assert_eq!(names, vec![SUMMARY_SHEET, TEAM_SHEET, BODY_SHEET]);

    let summary = sink.sheet(SUMMARY_SHEET).expect("summary sheet");
    assert_eq!(
        summary.first_value("Proyecto/Postulante"),
        Some("Biorremediación de suelos")
    );
    assert_eq!(summary.first_value("Equipo"), Some("10"));
    assert_eq!(summary.first_value("Cuerpo"), Some("50"));
    assert_eq!(summary.first_value("Total"), Some("60"));
    assert_eq!(summary.first_value("Aprobado"), Some("APROBADO"));
    assert_eq!(summary.first_value("Condición Equipo (mín 10)"), Some("OK"));
    assert_eq!(summary.first_value("Condición Cuerpo (mín 45)"), Some("OK"));
    assert_eq!(summary.first_value("Condición Global (mín 60)"), Some("OK"));
    assert_eq!(summary.first_value("Mínimo Global requerido"), Some("60"));
    assert_eq!(summary.first_value("Observaciones"), Some("Revisar cronograma"));
    assert_eq!(summary.first_value("Fecha de evaluación"), Some("2025-03-14"));
}

#[test]
fn detail_sheets_list_every_row() {
    let report = approved_report();
    let mut sink = MemoryWorkbook::default();
    export_report(&report, &metadata(), &mut sink).expect("memory export");

    let team = sink.sheet(TEAM_SHEET).expect("team sheet");
    assert_eq!(team.headers, vec!["Nombre", "Categoría", "Incluido", "Puntos"]);
    assert_eq!(team.rows.len(), 3);
    assert_eq!(
        team.rows[2],
        vec!["Sofía Benítez", "Becario/a de Iniciación VI", "No", "1"]
    );

    let body = sink.sheet(BODY_SHEET).expect("body sheet");
    assert_eq!(body.headers, vec!["Sección", "Ítem", "Opción", "Puntos"]);
    assert_eq!(body.rows.len(), 5);
    assert_eq!(
        body.rows[0],
        vec!["Fundamentación", "Planteo del problema", "Adecuado", "10"]
    );
}

#[test]
fn csv_workbook_writes_one_file_per_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let target = dir.path().join("informe");
    let report = approved_report();

    let mut workbook = CsvWorkbook::create(&target).expect("directory created");
    export_report(&report, &metadata(), &mut workbook).expect("csv export");

    assert_eq!(workbook.written().len(), 3);
    let summary = std::fs::read_to_string(target.join("resumen.csv")).expect("summary file");
    let mut lines = summary.lines();
    assert!(lines
        .next()
        .expect("header line")
        .starts_with("Proyecto/Postulante,Equipo,Cuerpo,Total,Aprobado"));
    assert!(lines
        .next()
        .expect("data line")
        .starts_with("Biorremediación de suelos,10,50,60,APROBADO"));

    assert!(target.join("equipo.csv").exists());
    assert!(target.join("cuerpo.csv").exists());
}

#[test]
fn xlsx_workbook_is_one_document_with_three_sheets() {
    let dir = tempfile::tempdir().expect("temp dir");
    let report = approved_report();

    let mut workbook = XlsxWorkbook::create(dir.path().join("informe")).expect("directory");
    export_report(&report, &metadata(), &mut workbook).expect("xlsx export");
    let path = workbook.save().expect("workbook saved");

    assert_eq!(path, dir.path().join("informe").join(WORKBOOK_FILE_NAME));
    assert_eq!(workbook.written(), &[path.clone()]);
    assert_eq!(workbook.sheet_names(), &[SUMMARY_SHEET, TEAM_SHEET, BODY_SHEET]);

    let mut saved: Xlsx<_> = open_workbook(&path).expect("readable xlsx");
    assert_eq!(saved.sheet_names(), vec!["Resumen", "Equipo", "Cuerpo"]);

    let summary = saved.worksheet_range(SUMMARY_SHEET).expect("summary sheet");
    assert_eq!(
        summary.get_value((0, 0)),
        Some(&Data::String("Proyecto/Postulante".to_string()))
    );
    assert_eq!(
        summary.get_value((1, 0)),
        Some(&Data::String("Biorremediación de suelos".to_string()))
    );
    assert_eq!(summary.get_value((1, 3)), Some(&Data::Float(60.0)));
    assert_eq!(
        summary.get_value((1, 4)),
        Some(&Data::String("APROBADO".to_string()))
    );

    let body = saved.worksheet_range(BODY_SHEET).expect("body sheet");
    assert_eq!(body.height(), 6);
}

#[test]
fn xlsx_workbook_keeps_attachments_beside_the_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("plantilla.xlsm");
    std::fs::write(&source, b"PK\x03\x04macro").expect("write attachment");

    let mut workbook = XlsxWorkbook::create(dir.path().join("salida")).expect("directory");
    export_report(&approved_report(), &metadata(), &mut workbook).expect("xlsx export");
    let saved = workbook.save().expect("workbook saved");
    let copied = workbook.attach(&source).expect("attachment copied");

    assert_eq!(copied, dir.path().join("salida").join("plantilla.xlsm"));
    assert_eq!(workbook.written(), &[saved, copied]);
}

#[test]
fn attachment_is_copied_verbatim() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("plantilla.xlsx");
    std::fs::write(&source, b"PK\x03\x04plantilla").expect("write attachment");

    let mut workbook = CsvWorkbook::create(dir.path().join("salida")).expect("directory");
    let copied = workbook.attach(&source).expect("attachment copied");

    assert_eq!(copied, dir.path().join("salida").join("plantilla.xlsx"));
    assert_eq!(
        std::fs::read(&copied).expect("read copy"),
        b"PK\x03\x04plantilla"
    );
    assert_eq!(workbook.written(), &[copied]);
}

#[test]
fn missing_attachment_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut workbook = CsvWorkbook::create(dir.path()).expect("directory");

    let error = workbook
        .attach(&dir.path().join("no-existe.xlsx"))
        .expect_err("missing file");
    assert!(matches!(error, ExportError::Attachment { .. }));
    assert!(workbook.written().is_empty());
}

#[test]
fn export_leaves_the_report_untouched() {
    let report = approved_report();
    let before = report.clone();
    let mut sink = MemoryWorkbook::default();
    export_report(&report, &metadata(), &mut sink).expect("memory export");
    assert_eq!(report, before);
}
