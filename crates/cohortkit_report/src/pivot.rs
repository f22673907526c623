//! Reshape backend aggregate payloads into presentation models.
//!
//! One transform per report shape; every transform takes its column order
//! from [`crate::policy`], so grouped, table and summary output can never
//! disagree on which metrics appear or in which order.

use std::collections::BTreeMap;

use log::debug;

use crate::conf::{
    C_KEY_FLAT_GROUP, C_KEY_TOTAL_ROW, C_KEY_TOTALS, C_LABEL_TOTAL_ROW, C_LABEL_TOTALS,
    C_PREFIX_GENERATION_COLUMN,
};
use crate::payload::{
    SpecCareerTableData, SpecGenerationTableData, SpecGroupedData, SpecReportPayload,
    SpecSummaryData,
};
use crate::policy::{derive_metric_cells, derive_sub_columns};
use crate::spec::{
    EnumCellValue, EnumColumnAlign, EnumGroupBy, EnumHeaderLayout, EnumReportShape, ReportError,
    SpecColumnGroup, SpecMetricSet, SpecPresentationModel, SpecPresentationRow, SpecReportConfig,
    SpecSubColumn,
};
use crate::util::derive_upper_label;

////////////////////////////////////////////////////////////////////////////////
// #region Dispatch

/// Build the presentation model for `payload` under `config`.
///
/// The payload's declared `(type, tableType)` must match
/// `(config.report_shape, config.group_by)`; summaries only check `type`.
/// Backend metadata overrides the denominator and other-value settings.
pub fn build_presentation_model(
    payload: &SpecReportPayload,
    config: &SpecReportConfig,
) -> Result<SpecPresentationModel, ReportError> {
    let config = config.with_payload_metadata(&payload.metadata);
    config.validate()?;
    validate_payload_shape(payload, &config)?;

    let model = match (config.report_shape, config.group_by) {
        (EnumReportShape::Grouped, EnumGroupBy::Generation) => {
            pivot_grouped_by_generation(&payload.decode_data()?, &config)
        }
        (EnumReportShape::Grouped, EnumGroupBy::Career) => {
            pivot_grouped_by_career(&payload.decode_data()?, &config)
        }
        (EnumReportShape::Table, EnumGroupBy::Generation) => {
            pivot_table_by_generation(&payload.decode_data()?, &config)
        }
        (EnumReportShape::Table, EnumGroupBy::Career) => {
            pivot_table_by_career(&payload.decode_data()?, &config)
        }
        (EnumReportShape::Summary, _) => pivot_summary(&payload.decode_data()?, &config),
    };

    debug!(
        "pivot {}: column_groups={} rows={}",
        payload.describe_shape(),
        model.column_groups.len(),
        model.rows.len()
    );
    Ok(model)
}

/// Fail fast when the payload was produced for a different report.
pub fn validate_payload_shape(
    payload: &SpecReportPayload,
    config: &SpecReportConfig,
) -> Result<(), ReportError> {
    let if_is_match = payload.report_type == config.report_shape
        && (config.report_shape == EnumReportShape::Summary
            || payload.table_type == Some(config.group_by.table_type()));
    if if_is_match {
        return Ok(());
    }

    let expected = match config.report_shape {
        EnumReportShape::Summary => config.report_shape.to_string(),
        _ => format!("{}/{}", config.report_shape, config.group_by.table_type()),
    };
    Err(ReportError::ShapeMismatch {
        expected,
        received: payload.describe_shape(),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Grouped

/// Generation rows × career column groups, plus a `totales` group.
pub fn pivot_grouped_by_generation(
    data: &SpecGroupedData,
    config: &SpecReportConfig,
) -> SpecPresentationModel {
    let l_rows: Vec<(&str, &str)> = data
        .generations
        .iter()
        .map(|generation| (generation.id.as_str(), generation.label()))
        .collect();
    let l_cols: Vec<(&str, &str)> = data
        .careers
        .iter()
        .map(|career| (career.id.as_str(), career.label()))
        .collect();
    pivot_grouped_matrix(&l_rows, &l_cols, &data.values, config)
}

/// Career rows × generation column groups, plus a `totales` group.
pub fn pivot_grouped_by_career(
    data: &SpecGroupedData,
    config: &SpecReportConfig,
) -> SpecPresentationModel {
    let l_rows: Vec<(&str, &str)> = data
        .careers
        .iter()
        .map(|career| (career.id.as_str(), career.label()))
        .collect();
    let l_cols: Vec<(&str, &str)> = data
        .generations
        .iter()
        .map(|generation| (generation.id.as_str(), generation.label()))
        .collect();
    pivot_grouped_matrix(&l_rows, &l_cols, &data.values, config)
}

fn pivot_grouped_matrix(
    l_rows: &[(&str, &str)],
    l_cols: &[(&str, &str)],
    values: &BTreeMap<String, BTreeMap<String, SpecMetricSet>>,
    config: &SpecReportConfig,
) -> SpecPresentationModel {
    let l_sub_columns = derive_sub_columns(config, false);

    let mut l_column_groups: Vec<SpecColumnGroup> = l_cols
        .iter()
        .map(|(id, label)| SpecColumnGroup {
            key: id.to_string(),
            label: derive_upper_label(label),
            sub_columns: l_sub_columns.clone(),
        })
        .collect();
    l_column_groups.push(SpecColumnGroup {
        key: C_KEY_TOTALS.to_string(),
        label: C_LABEL_TOTALS.to_string(),
        sub_columns: derive_sub_columns(config, true),
    });

    let l_presentation_rows = l_rows
        .iter()
        .map(|(row_id, row_label)| {
            let mut dict_cells = BTreeMap::new();
            if let Some(dict_row_values) = values.get(*row_id) {
                for (col_id, _) in l_cols {
                    if let Some(metrics) = dict_row_values.get(*col_id) {
                        dict_cells.insert(
                            col_id.to_string(),
                            derive_metric_cells(metrics, config, false),
                        );
                    }
                }
                if let Some(metrics) = dict_row_values.get(C_KEY_TOTALS) {
                    dict_cells.insert(
                        C_KEY_TOTALS.to_string(),
                        derive_metric_cells(metrics, config, true),
                    );
                }
            }
            SpecPresentationRow {
                key: row_id.to_string(),
                label: derive_upper_label(row_label),
                cells: dict_cells,
            }
        })
        .collect();

    SpecPresentationModel {
        layout: EnumHeaderLayout::Grouped,
        column_groups: l_column_groups,
        rows: l_presentation_rows,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Table

/// One row per generation plus a trailing `TOTAL` row.
pub fn pivot_table_by_generation(
    data: &SpecGenerationTableData,
    config: &SpecReportConfig,
) -> SpecPresentationModel {
    let mut l_rows: Vec<SpecPresentationRow> = data
        .rows
        .iter()
        .map(|row| {
            create_flat_row(
                &row.generation_id,
                row.label(),
                derive_metric_cells(&row.metrics.with_porcentaje(row.percentage), config, false),
            )
        })
        .collect();
    l_rows.push(create_flat_row(
        C_KEY_TOTAL_ROW,
        C_LABEL_TOTAL_ROW,
        derive_metric_cells(
            &data.total.with_porcentaje(data.total_percentage),
            config,
            false,
        ),
    ));

    create_flat_model(derive_sub_columns(config, false), l_rows)
}

/// One row per career; per-generation `titulados` columns precede the metric
/// columns. The `TOTAL` row sums each generation column across careers.
pub fn pivot_table_by_career(
    data: &SpecCareerTableData,
    config: &SpecReportConfig,
) -> SpecPresentationModel {
    let l_generation_keys: Vec<String> = data
        .generations
        .iter()
        .map(|generation| format!("{C_PREFIX_GENERATION_COLUMN}{}", generation.id))
        .collect();

    let mut l_sub_columns: Vec<SpecSubColumn> = data
        .generations
        .iter()
        .zip(&l_generation_keys)
        .map(|(generation, key)| SpecSubColumn {
            key: key.clone(),
            label: generation.label().to_string(),
            align: EnumColumnAlign::Center,
        })
        .collect();
    l_sub_columns.extend(derive_sub_columns(config, false));

    let mut l_sum_by_generation = vec![0u64; data.generations.len()];
    let mut l_rows = Vec::with_capacity(data.careers.len() + 1);
    for career in &data.careers {
        let mut dict_cells = BTreeMap::new();
        for (n_idx, (generation, key)) in data.generations.iter().zip(&l_generation_keys).enumerate()
        {
            let n_titulados = career
                .values_by_generation
                .get(&generation.id)
                .copied()
                .unwrap_or(0);
            l_sum_by_generation[n_idx] += n_titulados;
            dict_cells.insert(key.clone(), EnumCellValue::Integer(n_titulados));
        }
        dict_cells.extend(derive_metric_cells(
            &career.metrics.with_porcentaje(career.percentage),
            config,
            false,
        ));
        l_rows.push(create_flat_row(&career.id, career.label(), dict_cells));
    }

    let mut dict_total_cells: BTreeMap<String, EnumCellValue> = l_generation_keys
        .iter()
        .zip(&l_sum_by_generation)
        .map(|(key, n_sum)| (key.clone(), EnumCellValue::Integer(*n_sum)))
        .collect();
    dict_total_cells.extend(derive_metric_cells(
        &data.total.with_porcentaje(data.total_percentage),
        config,
        false,
    ));
    l_rows.push(create_flat_row(
        C_KEY_TOTAL_ROW,
        C_LABEL_TOTAL_ROW,
        dict_total_cells,
    ));

    create_flat_model(l_sub_columns, l_rows)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Summary

/// Single `TOTAL` row.
pub fn pivot_summary(data: &SpecSummaryData, config: &SpecReportConfig) -> SpecPresentationModel {
    let row = create_flat_row(
        C_KEY_TOTAL_ROW,
        C_LABEL_TOTAL_ROW,
        derive_metric_cells(&data.metrics.with_porcentaje(data.percentage), config, false),
    );
    create_flat_model(derive_sub_columns(config, false), vec![row])
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FlatHelpers

fn create_flat_row(
    key: &str,
    label: &str,
    dict_cells: BTreeMap<String, EnumCellValue>,
) -> SpecPresentationRow {
    SpecPresentationRow {
        key: key.to_string(),
        label: label.to_string(),
        cells: BTreeMap::from([(C_KEY_FLAT_GROUP.to_string(), dict_cells)]),
    }
}

fn create_flat_model(
    l_sub_columns: Vec<SpecSubColumn>,
    l_rows: Vec<SpecPresentationRow>,
) -> SpecPresentationModel {
    SpecPresentationModel {
        layout: EnumHeaderLayout::Flat,
        column_groups: vec![SpecColumnGroup {
            key: C_KEY_FLAT_GROUP.to_string(),
            label: String::new(),
            sub_columns: l_sub_columns,
        }],
        rows: l_rows,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
