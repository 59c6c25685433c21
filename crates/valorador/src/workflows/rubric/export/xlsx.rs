use std::fmt;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use super::{copy_attachment, prepare_directory, ExportError, Sheet, WorkbookSink};

pub const WORKBOOK_FILE_NAME: &str = "resumen_valorador.xlsx";

/// Collects every sheet into one `.xlsx` document; nothing touches disk until [`XlsxWorkbook::save`].
pub struct XlsxWorkbook {
    directory: PathBuf,
    path: PathBuf,
    workbook: Workbook,
    sheet_names: Vec<&'static str>,
    written: Vec<PathBuf>,
}

impl XlsxWorkbook {
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self, ExportError> {
        let directory = prepare_directory(directory.as_ref())?;
        let path = directory.join(WORKBOOK_FILE_NAME);
        Ok(Self {
            directory,
            path,
            workbook: Workbook::new(),
            sheet_names: Vec::new(),
            written: Vec::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn sheet_names(&self) -> &[&'static str] {
        &self.sheet_names
    }

    pub fn attach(&mut self, source: &Path) -> Result<PathBuf, ExportError> {
        let target = copy_attachment(&self.directory, source)?;
        self.written.push(target.clone());
        Ok(target)
    }

    /// Writes the workbook file with every sheet added so far.
    pub fn save(&mut self) -> Result<PathBuf, ExportError> {
        self.workbook
            .save(&self.path)
            .map_err(|source| self.workbook_error(source))?;

        info!(
            path = %self.path.display(),
            sheets = self.sheet_names.len(),
            "workbook saved"
        );
        self.written.push(self.path.clone());
        Ok(self.path.clone())
    }

    fn workbook_error(&self, source: XlsxError) -> ExportError {
        ExportError::Workbook {
            path: self.path.clone(),
            source,
        }
    }

    fn fill(&mut self, sheet: &Sheet) -> Result<(), XlsxError> {
        let header = Format::new().set_bold();
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (index, title) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, column(index)?, title.as_str(), &header)?;
        }

        for (offset, cells) in sheet.rows.iter().enumerate() {
            let row = u32::try_from(offset + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (index, cell) in cells.iter().enumerate() {
                let col = column(index)?;
                // Scores stay numeric so the sheet can be summed in place.
                match cell.parse::<i64>() {
                    Ok(number) => worksheet.write_number(row, col, number as f64)?,
                    Err(_) => worksheet.write_string(row, col, cell.as_str())?,
                };
            }
        }

        worksheet.autofit();
        Ok(())
    }
}

fn column(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

impl WorkbookSink for XlsxWorkbook {
    fn write_sheet(&mut self, sheet: &Sheet) -> Result<(), ExportError> {
        self.fill(sheet).map_err(|source| self.workbook_error(source))?;
        info!(sheet = sheet.name, rows = sheet.rows.len(), "sheet added to workbook");
        self.sheet_names.push(sheet.name);
        Ok(())
    }
}

impl fmt::Debug for XlsxWorkbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XlsxWorkbook")
            .field("path", &self.path)
            .field("sheet_names", &self.sheet_names)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}
