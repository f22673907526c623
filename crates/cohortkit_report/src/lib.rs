//! `cohortkit_report` v1:
//! Graduation report pivot kernel.
//!
//! Modules:
//! - `conf`    : constants and default presets
//! - `spec`    : config/metric/presentation models and errors
//! - `payload` : backend aggregate payload shapes
//! - `policy`  : metric column ordering
//! - `util`    : percentage resolution and label helpers
//! - `pivot`   : per-shape transforms into presentation models
pub mod conf;
pub mod payload;
pub mod pivot;
pub mod policy;
pub mod spec;
pub mod util;

pub use conf::{
    C_FILENAME_REPORT_DEFAULT, C_KEY_FLAT_GROUP, C_KEY_TOTAL_ROW, C_KEY_TOTALS, C_LABEL_TOTAL_ROW,
    C_LABEL_TOTALS, derive_default_report_config, derive_index_label, derive_metric_label,
};
pub use payload::{
    SpecCareer, SpecCareerTableData, SpecCareerTableRow, SpecGeneration, SpecGenerationTableData,
    SpecGenerationTableRow, SpecGroupedData, SpecPayloadMetadata, SpecReportPayload,
    SpecSummaryData,
};
pub use pivot::{
    build_presentation_model, pivot_grouped_by_career, pivot_grouped_by_generation,
    pivot_summary, pivot_table_by_career, pivot_table_by_generation, validate_payload_shape,
};
pub use policy::{derive_metric_cells, derive_metric_order, derive_sub_columns};
pub use spec::{
    EnumCellValue, EnumColumnAlign, EnumDenominator, EnumGroupBy, EnumHeaderLayout,
    EnumMetricKey, EnumReportShape, EnumTableType, ReportError, SpecColumnGroup, SpecMetricSet,
    SpecPresentationModel, SpecPresentationRow, SpecReportConfig, SpecReportFilter,
    SpecSubColumn,
};
pub use util::{calculate_rate, derive_report_title, format_rate, resolve_percentage};
