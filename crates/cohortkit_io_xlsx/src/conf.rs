//! XLSX export constants and default preset factories.

use crate::spec::{SpecColumnWidthPolicy, SpecSheetExportOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Characters not allowed in exported file names.
pub const TUP_FILENAME_ILLEGAL: [&str; 9] = ["/", "\\", ":", "*", "?", "\"", "<", ">", "|"];

/// Dash placeholders the table widgets use for absent values.
pub const TUP_CELL_PLACEHOLDERS: [&str; 2] = ["—", "-"];

/// Default worksheet name.
pub const C_SHEET_NAME_DEFAULT: &str = "Datos";
/// Default export base filename.
pub const C_FILENAME_DEFAULT: &str = "export";
/// Workbook file extension.
pub const C_FILE_EXTENSION: &str = ".xlsx";

/// Index column width bounds.
pub const N_WIDTH_INDEX_MIN: usize = 15;
pub const N_WIDTH_INDEX_MAX: usize = 50;
/// Data column width bounds.
pub const N_WIDTH_DATA_MIN: usize = 10;
pub const N_WIDTH_DATA_MAX: usize = 30;
/// Padding added to the longest text of a column.
pub const N_WIDTH_PADDING: usize = 2;

/// Build default column width policy.
pub fn derive_default_width_policy() -> SpecColumnWidthPolicy {
    SpecColumnWidthPolicy::default()
}

/// Build default per-sheet export options.
pub fn derive_default_export_options() -> SpecSheetExportOptions {
    SpecSheetExportOptions::default()
}
