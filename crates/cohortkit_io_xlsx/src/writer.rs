//! XLSX writer kernel that turns a spreadsheet document into a workbook.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::spec::{EnumSheetCell, SpecSheetExportOptions, SpecSpreadsheetDocument, XlsxExportError};
use crate::util::{
    cast_col_num, cast_row_num, derive_filename, derive_merge_tracker, sanitize_sheet_name,
    validate_grid_limits,
};

/// Single-sheet workbook writer.
///
/// The workbook is buffered in memory until [`Self::save`] or
/// [`Self::save_to_buffer`] is called.
pub struct XlsxReportWriter {
    workbook: Workbook,
    c_sheet_name: Option<String>,
}

impl Default for XlsxReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxReportWriter {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            c_sheet_name: None,
        }
    }

    /// Name of the written sheet, once written.
    pub fn sheet_name(&self) -> Option<&str> {
        self.c_sheet_name.as_deref()
    }

    /// Write `document` as the workbook's only sheet.
    ///
    /// Returns the sheet name actually used after sanitization.
    pub fn write_document(
        &mut self,
        document: &SpecSpreadsheetDocument,
        sheet_name: &str,
    ) -> Result<String, XlsxExportError> {
        if let Some(c_existing) = &self.c_sheet_name {
            return Err(XlsxExportError::InvalidOptions(format!(
                "Workbook already holds sheet {c_existing:?}; only one sheet is written."
            )));
        }
        validate_grid_limits(document.height(), document.width())?;

        let c_sheet_name = sanitize_sheet_name(sheet_name, "_");
        if c_sheet_name != sheet_name {
            warn!("sheet name {sheet_name:?} sanitized to {c_sheet_name:?}");
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&c_sheet_name)?;
        write_grid(worksheet, document)?;

        for (col_idx, n_width) in document.column_widths.iter().enumerate() {
            worksheet.set_column_width(cast_col_num(col_idx)?, *n_width as f64)?;
        }

        self.c_sheet_name = Some(c_sheet_name.clone());
        Ok(c_sheet_name)
    }

    /// Serialize the workbook into `.xlsx` bytes.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxExportError> {
        self.validate_written()?;
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Save the workbook to `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), XlsxExportError> {
        self.validate_written()?;
        self.workbook.save(path)?;
        info!("xlsx saved: {}", path.display());
        Ok(())
    }

    fn validate_written(&self) -> Result<(), XlsxExportError> {
        if self.c_sheet_name.is_none() {
            return Err(XlsxExportError::InvalidOptions(
                "No sheet written before save.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Write `document` into an in-memory `.xlsx` workbook.
pub fn export_document_to_buffer(
    document: &SpecSpreadsheetDocument,
    options: &SpecSheetExportOptions,
) -> Result<Vec<u8>, XlsxExportError> {
    let mut writer = XlsxReportWriter::new();
    writer.write_document(document, &options.sheet_name)?;
    let v_bytes = writer.save_to_buffer()?;
    info!("xlsx buffer written: {} bytes", v_bytes.len());
    Ok(v_bytes)
}

/// Write `document` to `<dir_out>/<options.filename>.xlsx` and return the path.
pub fn export_document_to_dir(
    document: &SpecSpreadsheetDocument,
    options: &SpecSheetExportOptions,
    dir_out: &Path,
) -> Result<PathBuf, XlsxExportError> {
    std::fs::create_dir_all(dir_out)?;
    let path_file_out = dir_out.join(derive_filename(&options.filename));

    let mut writer = XlsxReportWriter::new();
    writer.write_document(document, &options.sheet_name)?;
    writer.save(&path_file_out)?;
    Ok(path_file_out)
}

fn write_grid(
    worksheet: &mut Worksheet,
    document: &SpecSpreadsheetDocument,
) -> Result<(), XlsxExportError> {
    let set_cells_covered = derive_merge_tracker(&document.merges);
    let set_anchors_merged: BTreeSet<(usize, usize)> = document
        .merges
        .iter()
        .filter(|merge| !merge.is_single_cell())
        .map(|merge| (merge.row_idx_start, merge.col_idx_start))
        .collect();

    for (row_idx, l_row) in document.grid.iter().enumerate() {
        for (col_idx, cell) in l_row.iter().enumerate() {
            if set_cells_covered.contains(&(row_idx, col_idx))
                || set_anchors_merged.contains(&(row_idx, col_idx))
            {
                continue;
            }
            write_cell(worksheet, row_idx, col_idx, cell)?;
        }
    }

    let fmt_merge = Format::new();
    for merge in document.merges.iter().filter(|merge| !merge.is_single_cell()) {
        let cell = document
            .grid
            .get(merge.row_idx_start)
            .and_then(|l_row| l_row.get(merge.col_idx_start))
            .cloned()
            .unwrap_or_else(EnumSheetCell::empty);

        let c_text = match &cell {
            EnumSheetCell::Text(s) => s.as_str(),
            EnumSheetCell::Number(_) => "",
        };
        worksheet.merge_range(
            cast_row_num(merge.row_idx_start)?,
            cast_col_num(merge.col_idx_start)?,
            cast_row_num(merge.row_idx_end)?,
            cast_col_num(merge.col_idx_end)?,
            c_text,
            &fmt_merge,
        )?;
        if let EnumSheetCell::Number(x) = cell {
            worksheet.write_number(
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_start)?,
                x,
            )?;
        }
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    cell: &EnumSheetCell,
) -> Result<(), XlsxExportError> {
    let row_num = cast_row_num(row_idx)?;
    let col_num = cast_col_num(col_idx)?;
    match cell {
        EnumSheetCell::Number(x) => {
            worksheet.write_number(row_num, col_num, *x)?;
        }
        EnumSheetCell::Text(s) if !s.is_empty() => {
            worksheet.write_string(row_num, col_num, s)?;
        }
        EnumSheetCell::Text(_) => {}
    }
    Ok(())
}
