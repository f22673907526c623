//! Report constants and default preset factories.

use crate::spec::{EnumGroupBy, EnumMetricKey, SpecReportConfig};

/// Column group key of the synthetic totals group in grouped reports.
pub const C_KEY_TOTALS: &str = "totales";
/// Column group label of the synthetic totals group.
pub const C_LABEL_TOTALS: &str = "TOTALES";
/// Row key of the synthesized grand-total row.
pub const C_KEY_TOTAL_ROW: &str = "total";
/// Row label of the synthesized grand-total row.
pub const C_LABEL_TOTAL_ROW: &str = "TOTAL";
/// Key of the single implicit column group used by flat layouts.
pub const C_KEY_FLAT_GROUP: &str = "valores";
/// Subcolumn key prefix for per-generation columns in by-career tables.
pub const C_PREFIX_GENERATION_COLUMN: &str = "generacion_";

/// Index column label when rows are generations.
pub const C_LABEL_INDEX_GENERATION: &str = "GENERACIÓN";
/// Index column label when rows are careers.
pub const C_LABEL_INDEX_CAREER: &str = "CARRERA";

/// Export title prefix.
pub const C_TITLE_REPORT: &str = "Reporte de titulación";
/// Base filename of exported reports.
pub const C_FILENAME_REPORT_DEFAULT: &str = "reporte_titulacion";

/// Header label for a metric subcolumn.
pub fn derive_metric_label(metric: EnumMetricKey) -> &'static str {
    match metric {
        EnumMetricKey::Ingreso => "Ingreso",
        EnumMetricKey::Egreso => "Egreso",
        EnumMetricKey::Titulados => "Titulados",
        EnumMetricKey::Porcentaje => "% Titulación",
    }
}

/// Index column label for the row axis.
pub fn derive_index_label(group_by: EnumGroupBy) -> &'static str {
    match group_by {
        EnumGroupBy::Generation => C_LABEL_INDEX_GENERATION,
        EnumGroupBy::Career => C_LABEL_INDEX_CAREER,
    }
}

/// Build default report configuration.
pub fn derive_default_report_config() -> SpecReportConfig {
    SpecReportConfig::default()
}
