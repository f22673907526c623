//! Spreadsheet document models, export options and errors.

use cohortkit_report::ReportError;
use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{
    C_FILENAME_DEFAULT, C_SHEET_NAME_DEFAULT, N_WIDTH_DATA_MAX, N_WIDTH_DATA_MIN,
    N_WIDTH_INDEX_MAX, N_WIDTH_INDEX_MIN, N_WIDTH_PADDING,
};

////////////////////////////////////////////////////////////////////////////////
// #region SheetCell

/// Literal spreadsheet cell value. No formulas.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSheetCell {
    /// Text value; empty text means a blank cell.
    Text(String),
    /// Numeric value.
    Number(f64),
}

impl EnumSheetCell {
    /// Blank cell.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Whether the cell is blank.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Text as shown by a spreadsheet with general formatting.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(x) => {
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    format!("{}", *x as i64)
                } else {
                    x.to_string()
                }
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Document

/// Inclusive rectangular merge range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecMergeRange {
    pub row_idx_start: usize,
    pub col_idx_start: usize,
    pub row_idx_end: usize,
    pub col_idx_end: usize,
}

impl SpecMergeRange {
    /// Range covering exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.row_idx_start == self.row_idx_end && self.col_idx_start == self.col_idx_end
    }

    /// Whether `(row_idx, col_idx)` lies inside the range.
    pub fn contains(&self, row_idx: usize, col_idx: usize) -> bool {
        (self.row_idx_start..=self.row_idx_end).contains(&row_idx)
            && (self.col_idx_start..=self.col_idx_end).contains(&col_idx)
    }
}

/// Serialized sheet: literal grid, merges and column widths.
///
/// Header cells under a group merge repeat the group label in every slot;
/// the title is held by the anchor cell of its row only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSpreadsheetDocument {
    pub grid: Vec<Vec<EnumSheetCell>>,
    pub merges: Vec<SpecMergeRange>,
    pub column_widths: Vec<usize>,
}

impl SpecSpreadsheetDocument {
    /// Number of grid rows.
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Number of grid columns.
    pub fn width(&self) -> usize {
        self.column_widths.len()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Column width clamps used by the serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnWidthPolicy {
    /// Minimum width of the index column.
    pub width_index_min: usize,
    /// Maximum width of the index column.
    pub width_index_max: usize,
    /// Minimum width of data columns.
    pub width_data_min: usize,
    /// Maximum width of data columns.
    pub width_data_max: usize,
    /// Padding added to the longest text before clamping.
    pub width_padding: usize,
}

impl Default for SpecColumnWidthPolicy {
    fn default() -> Self {
        Self {
            width_index_min: N_WIDTH_INDEX_MIN,
            width_index_max: N_WIDTH_INDEX_MAX,
            width_data_min: N_WIDTH_DATA_MIN,
            width_data_max: N_WIDTH_DATA_MAX,
            width_padding: N_WIDTH_PADDING,
        }
    }
}

/// Per-export options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetExportOptions {
    /// Optional title row merged across all columns.
    pub title: Option<String>,
    /// Header text of the index column.
    pub index_label: String,
    /// Base filename; `.xlsx` is appended when missing.
    pub filename: String,
    /// Worksheet name.
    pub sheet_name: String,
    /// Column width clamps.
    pub policy_width: SpecColumnWidthPolicy,
}

impl Default for SpecSheetExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            index_label: String::new(),
            filename: C_FILENAME_DEFAULT.to_string(),
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            policy_width: SpecColumnWidthPolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Export failures.
#[derive(Debug, Error)]
pub enum XlsxExportError {
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    /// Invalid width policy or writer state.
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),
    /// Named index column is missing from the table.
    #[error("Column not found: {0:?}")]
    ColumnNotFound(String),
    /// Grid exceeds Excel worksheet limits.
    #[error("Sheet too large: {0}")]
    SheetTooLarge(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
