mod sheets;
mod xlsx;

pub use sheets::{Sheet, BODY_SHEET, SUMMARY_SHEET, TEAM_SHEET};
pub use xlsx::{XlsxWorkbook, WORKBOOK_FILE_NAME};

use chrono::NaiveDate;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::info;

use super::session::SessionReport;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to prepare export directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write sheet {path}: {source}")]
    Sheet { path: PathBuf, source: csv::Error },
    #[error("failed to build workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("failed to copy attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Data that belongs in the export but not in the evaluation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportMetadata {
    pub evaluated_on: NaiveDate,
}

/// Destination for the workbook's sheets.
pub trait WorkbookSink: Debug {
    fn write_sheet(&mut self, sheet: &Sheet) -> Result<(), ExportError>;
}

/// Builds the `Resumen`, `Equipo` and `Cuerpo` sheets for a report.
pub fn workbook(report: &SessionReport, metadata: &ExportMetadata) -> [Sheet; 3] {
    [
        sheets::summary_sheet(report, metadata),
        sheets::team_sheet(report),
        sheets::body_sheet(report),
    ]
}

/// Serialises every sheet to `sink`. The report itself is never modified.
pub fn export_report<S>(
    report: &SessionReport,
    metadata: &ExportMetadata,
    sink: &mut S,
) -> Result<(), ExportError>
where
    S: WorkbookSink + ?Sized,
{
    for sheet in workbook(report, metadata) {
        sink.write_sheet(&sheet)?;
    }
    Ok(())
}

/// Writes each sheet as `<directory>/<sheet>.csv`.
#[derive(Debug)]
pub struct CsvWorkbook {
    directory: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvWorkbook {
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self, ExportError> {
        let directory = prepare_directory(directory.as_ref())?;
        Ok(Self {
            directory,
            written: Vec::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Copies a user-supplied file next to the sheets, unchanged.
    pub fn attach(&mut self, source: &Path) -> Result<PathBuf, ExportError> {
        let target = copy_attachment(&self.directory, source)?;
        self.written.push(target.clone());
        Ok(target)
    }
}

fn prepare_directory(directory: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(directory).map_err(|source| ExportError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(directory.to_path_buf())
}

fn copy_attachment(directory: &Path, source: &Path) -> Result<PathBuf, ExportError> {
    let file_name = source
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "adjunto".into());
    let target = directory.join(file_name);

    std::fs::copy(source, &target).map_err(|err| ExportError::Attachment {
        path: source.to_path_buf(),
        source: err,
    })?;

    info!(attachment = %target.display(), "attachment copied");
    Ok(target)
}

impl WorkbookSink for CsvWorkbook {
    fn write_sheet(&mut self, sheet: &Sheet) -> Result<(), ExportError> {
        let path = self
            .directory
            .join(format!("{}.csv", sheet.name.to_lowercase()));
        let sheet_error = |source: csv::Error| ExportError::Sheet {
            path: path.clone(),
            source,
        };

        let mut writer = csv::Writer::from_path(&path).map_err(sheet_error)?;
        writer.write_record(&sheet.headers).map_err(sheet_error)?;
        for row in &sheet.rows {
            writer.write_record(row).map_err(sheet_error)?;
        }
        writer
            .flush()
            .map_err(|err| sheet_error(csv::Error::from(err)))?;

        info!(sheet = sheet.name, path = %path.display(), rows = sheet.rows.len(), "sheet written");
        self.written.push(path);
        Ok(())
    }
}

/// Keeps sheets in memory; useful for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    pub sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

impl WorkbookSink for MemoryWorkbook {
    fn write_sheet(&mut self, sheet: &Sheet) -> Result<(), ExportError> {
        self.sheets.push(sheet.clone());
        Ok(())
    }
}
