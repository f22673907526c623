//! Metric column policy shared by every report shape.
//!
//! Order is fixed by the configuration alone:
//! 1. the non-denominator count, only when `includeOtherValue` is set,
//! 2. the denominator count,
//! 3. `titulados`,
//! 4. `porcentaje`, omitted for grouped totals columns.

use std::collections::BTreeMap;

use crate::conf::derive_metric_label;
use crate::spec::{
    EnumCellValue, EnumColumnAlign, EnumMetricKey, SpecMetricSet, SpecReportConfig, SpecSubColumn,
};
use crate::util::resolve_percentage;

/// Ordered metrics for one column group.
pub fn derive_metric_order(config: &SpecReportConfig, if_totals_only: bool) -> Vec<EnumMetricKey> {
    let mut l_metrics = Vec::with_capacity(4);
    if config.if_include_other_value {
        l_metrics.push(config.denominator.other().metric());
    }
    l_metrics.push(config.denominator.metric());
    l_metrics.push(EnumMetricKey::Titulados);
    if !if_totals_only {
        l_metrics.push(EnumMetricKey::Porcentaje);
    }
    l_metrics
}

/// Ordered subcolumn descriptors for one column group.
pub fn derive_sub_columns(config: &SpecReportConfig, if_totals_only: bool) -> Vec<SpecSubColumn> {
    derive_metric_order(config, if_totals_only)
        .into_iter()
        .map(|metric| SpecSubColumn {
            key: metric.as_str().to_string(),
            label: derive_metric_label(metric).to_string(),
            align: EnumColumnAlign::Center,
        })
        .collect()
}

/// Cell map of one metric set, keyed like [`derive_sub_columns`].
pub fn derive_metric_cells(
    metrics: &SpecMetricSet,
    config: &SpecReportConfig,
    if_totals_only: bool,
) -> BTreeMap<String, EnumCellValue> {
    derive_metric_order(config, if_totals_only)
        .into_iter()
        .map(|metric| {
            let value = match metrics.count(metric) {
                Some(n_count) => EnumCellValue::Integer(n_count),
                None => EnumCellValue::Text(resolve_percentage(metrics, config.denominator)),
            };
            (metric.as_str().to_string(), value)
        })
        .collect()
}
