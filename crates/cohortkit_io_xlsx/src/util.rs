//! Stateless helper utilities used by the serializer and writer.

use std::collections::BTreeSet;

use cohortkit_report::EnumCellValue;

use crate::conf::{
    C_FILE_EXTENSION, C_FILENAME_DEFAULT, C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_CELL_PLACEHOLDERS, TUP_EXCEL_ILLEGAL,
    TUP_FILENAME_ILLEGAL,
};
use crate::spec::{EnumSheetCell, SpecColumnWidthPolicy, SpecMergeRange, XlsxExportError};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Blank out dash placeholders; keep any other text as-is.
pub fn normalize_cell_text(text: &str) -> String {
    if TUP_CELL_PLACEHOLDERS.contains(&text.trim()) {
        return String::new();
    }
    text.to_string()
}

/// Convert a presentation value into a literal sheet cell.
pub fn convert_cell_value(value: &EnumCellValue) -> EnumSheetCell {
    match value {
        EnumCellValue::Text(s) => EnumSheetCell::Text(normalize_cell_text(s)),
        EnumCellValue::Integer(n) => EnumSheetCell::Number(*n as f64),
        EnumCellValue::Number(x) if x.is_finite() => EnumSheetCell::Number(*x),
        EnumCellValue::Number(_) => EnumSheetCell::empty(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidth

/// Displayed length of `text` in characters.
pub fn estimate_text_width(text: &str) -> usize {
    text.chars().count()
}

/// `clamp(n_len_max + padding, min, max)`.
pub fn calculate_column_width(n_len_max: usize, n_min: usize, n_max: usize, n_pad: usize) -> usize {
    usize::min(n_max, usize::max(n_min, n_len_max + n_pad))
}

/// Reject width clamps that cannot be satisfied.
pub fn validate_policy_width(policy_width: &SpecColumnWidthPolicy) -> Result<(), XlsxExportError> {
    if policy_width.width_index_min == 0 || policy_width.width_data_min == 0 {
        return Err(XlsxExportError::InvalidOptions(
            "policy_width minimum widths must be >= 1.".to_string(),
        ));
    }
    if policy_width.width_index_max < policy_width.width_index_min {
        return Err(XlsxExportError::InvalidOptions(
            "policy_width.width_index_max must be >= policy_width.width_index_min.".to_string(),
        ));
    }
    if policy_width.width_data_max < policy_width.width_data_min {
        return Err(XlsxExportError::InvalidOptions(
            "policy_width.width_data_max must be >= policy_width.width_data_min.".to_string(),
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_DEFAULT.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Export filename with `.xlsx` extension and no path separators.
pub fn derive_filename(base_name: &str) -> String {
    let mut c_name = base_name.trim().to_string();
    for c_illegal in TUP_FILENAME_ILLEGAL {
        c_name = c_name.replace(c_illegal, "_");
    }
    if c_name
        .to_ascii_lowercase()
        .ends_with(C_FILE_EXTENSION)
    {
        c_name.truncate(c_name.len() - C_FILE_EXTENSION.len());
    }
    let c_name = c_name.trim();
    if c_name.is_empty() {
        return format!("{C_FILENAME_DEFAULT}{C_FILE_EXTENSION}");
    }
    format!("{c_name}{C_FILE_EXTENSION}")
}

/// Fail when the grid exceeds worksheet limits.
pub fn validate_grid_limits(n_rows: usize, n_cols: usize) -> Result<(), XlsxExportError> {
    if n_rows > N_NROWS_EXCEL_MAX {
        return Err(XlsxExportError::SheetTooLarge(format!(
            "{n_rows} rows exceed the Excel limit of {N_NROWS_EXCEL_MAX}."
        )));
    }
    if n_cols > N_NCOLS_EXCEL_MAX {
        return Err(XlsxExportError::SheetTooLarge(format!(
            "{n_cols} columns exceed the Excel limit of {N_NCOLS_EXCEL_MAX}."
        )));
    }
    Ok(())
}

pub fn cast_row_num(value: usize) -> Result<u32, XlsxExportError> {
    u32::try_from(value)
        .map_err(|_| XlsxExportError::SheetTooLarge(format!("row index overflow: {value}")))
}

pub fn cast_col_num(value: usize) -> Result<u16, XlsxExportError> {
    u16::try_from(value)
        .map_err(|_| XlsxExportError::SheetTooLarge(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeUtils

/// Cells covered by a merge, excluding each merge's anchor cell.
pub fn derive_merge_tracker(merges: &[SpecMergeRange]) -> BTreeSet<(usize, usize)> {
    let mut set_cells_covered = BTreeSet::new();

    for merge in merges {
        for row_idx in merge.row_idx_start..=merge.row_idx_end {
            for col_idx in merge.col_idx_start..=merge.col_idx_end {
                if row_idx == merge.row_idx_start && col_idx == merge.col_idx_start {
                    continue;
                }
                set_cells_covered.insert((row_idx, col_idx));
            }
        }
    }

    set_cells_covered
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
