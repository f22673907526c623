//! `cohortkit_io_xlsx` v1:
//! Spreadsheet serialization and XLSX output for presentation models.
//!
//! Modules:
//! - `conf`       : Excel limits, width bounds and default names
//! - `spec`       : document/options models and `XlsxExportError`
//! - `util`       : sheet/file name and width helpers
//! - `serializer` : presentation model -> grid + merges + widths
//! - `frame`      : `DataFrame` -> flat presentation model
//! - `writer`     : document -> single-sheet workbook
//! - `report`     : payload -> workbook in one call
pub mod conf;
pub mod frame;
pub mod report;
pub mod serializer;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{derive_default_export_options, derive_default_width_policy};
pub use frame::{derive_presentation_model_from_dataframe, serialize_dataframe};
pub use report::{derive_report_export_options, export_report_to_buffer, serialize_report};
pub use serializer::serialize_presentation_model;
pub use spec::{
    EnumSheetCell, SpecColumnWidthPolicy, SpecMergeRange, SpecSheetExportOptions,
    SpecSpreadsheetDocument, XlsxExportError,
};
pub use util::sanitize_sheet_name;
pub use writer::{XlsxReportWriter, export_document_to_buffer, export_document_to_dir};
