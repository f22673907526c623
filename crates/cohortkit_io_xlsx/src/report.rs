//! End-to-end export of a backend report payload.

use cohortkit_report::{
    C_FILENAME_REPORT_DEFAULT, SpecReportConfig, SpecReportPayload, build_presentation_model,
    derive_index_label, derive_report_title,
};

use crate::serializer::serialize_presentation_model;
use crate::spec::{SpecSheetExportOptions, SpecSpreadsheetDocument, XlsxExportError};
use crate::writer::export_document_to_buffer;

/// Export options preset for a graduation report of `payload` under `config`.
///
/// Dates echoed in the payload metadata take precedence in the title, as they
/// do in the pivot.
pub fn derive_report_export_options(
    payload: &SpecReportPayload,
    config: &SpecReportConfig,
) -> SpecSheetExportOptions {
    let config = config.with_payload_metadata(&payload.metadata);
    SpecSheetExportOptions {
        title: Some(derive_report_title(&config.filter)),
        index_label: derive_index_label(config.group_by).to_string(),
        filename: C_FILENAME_REPORT_DEFAULT.to_string(),
        ..SpecSheetExportOptions::default()
    }
}

/// Pivot `payload` and serialize the resulting model.
pub fn serialize_report(
    payload: &SpecReportPayload,
    config: &SpecReportConfig,
    options: &SpecSheetExportOptions,
) -> Result<SpecSpreadsheetDocument, XlsxExportError> {
    let model = build_presentation_model(payload, config)?;
    serialize_presentation_model(&model, options)
}

/// Pivot, serialize and write `payload` into `.xlsx` bytes.
pub fn export_report_to_buffer(
    payload: &SpecReportPayload,
    config: &SpecReportConfig,
    options: &SpecSheetExportOptions,
) -> Result<Vec<u8>, XlsxExportError> {
    let document = serialize_report(payload, config, options)?;
    export_document_to_buffer(&document, options)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use cohortkit_report::{EnumGroupBy, EnumReportShape, ReportError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::spec::EnumSheetCell;

    fn summary_payload() -> SpecReportPayload {
        SpecReportPayload::from_json_value(json!({
            "type": "summary",
            "metadata": {"graduationRateDenominator": "egreso", "includeOtherValue": false},
            "data": {"metrics": {"ingreso": 100, "egreso": 80, "titulados": 40}}
        }))
        .unwrap()
    }

    fn summary_config() -> SpecReportConfig {
        let mut config = SpecReportConfig {
            report_shape: EnumReportShape::Summary,
            group_by: EnumGroupBy::Career,
            ..SpecReportConfig::default()
        };
        config.filter.date_start = NaiveDate::from_ymd_opt(2020, 1, 1);
        config.filter.date_end = NaiveDate::from_ymd_opt(2024, 12, 31);
        config
    }

    #[test]
    fn report_options_carry_title_and_index_label() {
        let options = derive_report_export_options(&summary_payload(), &summary_config());
        assert_eq!(
            options.title.as_deref(),
            Some("Reporte de titulación (2020-01-01 a 2024-12-31)")
        );
        assert_eq!(options.index_label, "CARRERA");
        assert_eq!(options.filename, "reporte_titulacion");
    }

    #[test]
    fn report_title_follows_payload_dates() {
        let payload = SpecReportPayload::from_json_value(json!({
            "type": "summary",
            "metadata": {"startDate": "2021-01-01", "endDate": "2021-12-31"},
            "data": {"metrics": {"ingreso": 10, "egreso": 8, "titulados": 4}}
        }))
        .unwrap();
        let options = derive_report_export_options(&payload, &summary_config());
        assert_eq!(
            options.title.as_deref(),
            Some("Reporte de titulación (2021-01-01 a 2021-12-31)")
        );
    }

    #[test]
    fn summary_report_serializes_title_header_and_total_row() {
        let config = summary_config();
        let options = derive_report_export_options(&summary_payload(), &config);
        let document = serialize_report(&summary_payload(), &config, &options).unwrap();

        assert_eq!(document.height(), 3);
        assert_eq!(
            document.grid[2],
            vec![
                EnumSheetCell::Text("TOTAL".to_string()),
                EnumSheetCell::Number(80.0),
                EnumSheetCell::Number(40.0),
                EnumSheetCell::Text("50.00%".to_string()),
            ]
        );
    }

    #[test]
    fn report_export_surfaces_shape_mismatch() {
        let config = SpecReportConfig::default();
        let err = export_report_to_buffer(
            &summary_payload(),
            &config,
            &derive_report_export_options(&summary_payload(), &config),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            XlsxExportError::Report(ReportError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn report_export_produces_workbook_bytes() {
        let config = summary_config();
        let v_bytes = export_report_to_buffer(
            &summary_payload(),
            &config,
            &derive_report_export_options(&summary_payload(), &config),
        )
        .unwrap();
        assert!(v_bytes.starts_with(b"PK"));
    }
}
