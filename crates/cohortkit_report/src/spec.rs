//! Report configuration, metric and presentation models.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region MetricEnums

/// Metric addressable by a report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumMetricKey {
    /// Admitted students.
    Ingreso,
    /// Students who completed coursework.
    Egreso,
    /// Students who obtained the degree.
    Titulados,
    /// Graduation rate against the denominator metric.
    Porcentaje,
}

impl EnumMetricKey {
    /// Stable key used for subcolumns and cell maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingreso => "ingreso",
            Self::Egreso => "egreso",
            Self::Titulados => "titulados",
            Self::Porcentaje => "porcentaje",
        }
    }
}

impl fmt::Display for EnumMetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric the graduation rate divides by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnumDenominator {
    /// Rate over admitted students.
    Ingreso,
    /// Rate over students who completed coursework (default).
    #[default]
    Egreso,
}

impl EnumDenominator {
    /// Column metric carrying the denominator count.
    pub fn metric(self) -> EnumMetricKey {
        match self {
            Self::Ingreso => EnumMetricKey::Ingreso,
            Self::Egreso => EnumMetricKey::Egreso,
        }
    }

    /// The count metric that is not the denominator.
    pub fn other(self) -> Self {
        match self {
            Self::Ingreso => Self::Egreso,
            Self::Egreso => Self::Ingreso,
        }
    }
}

/// Column alignment hint for table widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumColumnAlign {
    Left,
    #[default]
    Center,
    Right,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportShapeEnums

/// Presentational layout requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumReportShape {
    /// Entity-by-entity matrix with one column group per entity.
    #[default]
    Grouped,
    /// Flat table with one row per entity.
    Table,
    /// Single aggregate row.
    Summary,
}

impl EnumReportShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grouped => "grouped",
            Self::Table => "table",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for EnumReportShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row axis of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumGroupBy {
    #[default]
    Generation,
    Career,
}

impl EnumGroupBy {
    /// Backend `tableType` matching this grouping.
    pub fn table_type(self) -> EnumTableType {
        match self {
            Self::Generation => EnumTableType::PorGeneraciones,
            Self::Career => EnumTableType::PorCarreras,
        }
    }
}

/// Backend `tableType` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumTableType {
    #[serde(rename = "por-generaciones")]
    PorGeneraciones,
    #[serde(rename = "por-carreras")]
    PorCarreras,
}

impl EnumTableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PorGeneraciones => "por-generaciones",
            Self::PorCarreras => "por-carreras",
        }
    }
}

impl fmt::Display for EnumTableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportConfig

/// Date range and career filter the backend aggregated with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecReportFilter {
    /// Inclusive start of the reporting window.
    #[serde(rename = "startDate", default)]
    pub date_start: Option<NaiveDate>,
    /// Inclusive end of the reporting window.
    #[serde(rename = "endDate", default)]
    pub date_end: Option<NaiveDate>,
    /// Careers the backend aggregated; empty means all careers.
    /// Only checked for blank or repeated ids here.
    #[serde(rename = "careerIds", default)]
    pub career_ids: Vec<String>,
}

/// Call-time report configuration.
///
/// `if_include_other_value` only adds the non-denominator count; it never
/// changes which metric drives the percentage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecReportConfig {
    /// Metric used as percentage base.
    #[serde(default)]
    pub denominator: EnumDenominator,
    /// Also show the non-denominator count.
    #[serde(rename = "includeOtherValue", default)]
    pub if_include_other_value: bool,
    /// Requested layout.
    #[serde(rename = "reportShape", default)]
    pub report_shape: EnumReportShape,
    /// Row axis.
    #[serde(rename = "groupBy", default)]
    pub group_by: EnumGroupBy,
    /// Window and career filter.
    #[serde(flatten)]
    pub filter: SpecReportFilter,
}

impl SpecReportConfig {
    /// Check filter consistency.
    pub fn validate(&self) -> Result<(), ReportError> {
        if let (Some(date_start), Some(date_end)) = (self.filter.date_start, self.filter.date_end)
            && date_start > date_end
        {
            return Err(ReportError::InvalidFilter(format!(
                "startDate {date_start} is after endDate {date_end}."
            )));
        }

        let mut set_career_ids = BTreeSet::new();
        for c_id in &self.filter.career_ids {
            if c_id.trim().is_empty() {
                return Err(ReportError::InvalidFilter(
                    "careerIds must not contain blank ids.".to_string(),
                ));
            }
            if !set_career_ids.insert(c_id.trim()) {
                return Err(ReportError::InvalidFilter(format!(
                    "careerIds contains {c_id:?} more than once."
                )));
            }
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MetricSet

/// Aggregate counts for one (row entity, column entity) pair or a total.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecMetricSet {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub ingreso: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub egreso: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub titulados: u64,
    /// Backend-computed rate, already `titulados / denominator * 100`.
    #[serde(default, deserialize_with = "deserialize_rate")]
    pub porcentaje: Option<f64>,
}

impl SpecMetricSet {
    /// Count for a count metric; `None` for [`EnumMetricKey::Porcentaje`].
    pub fn count(&self, metric: EnumMetricKey) -> Option<u64> {
        match metric {
            EnumMetricKey::Ingreso => Some(self.ingreso),
            EnumMetricKey::Egreso => Some(self.egreso),
            EnumMetricKey::Titulados => Some(self.titulados),
            EnumMetricKey::Porcentaje => None,
        }
    }

    /// Count of the denominator metric.
    pub fn count_of(&self, denominator: EnumDenominator) -> u64 {
        match denominator {
            EnumDenominator::Ingreso => self.ingreso,
            EnumDenominator::Egreso => self.egreso,
        }
    }

    /// Copy with `porcentaje` replaced when `rate` is set.
    pub fn with_porcentaje(&self, rate: Option<f64>) -> Self {
        Self {
            porcentaje: rate.or(self.porcentaje),
            ..self.clone()
        }
    }
}

/// Loosely-typed count as emitted by SQL aggregations.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum EnumRawCount {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl EnumRawCount {
    /// Non-negative whole count; text must parse as one.
    pub(crate) fn into_count(self) -> Result<u64, String> {
        let n_value = match self {
            Self::Integer(n) => return Ok(n),
            Self::Float(x) => x,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("count {s:?} is not a number"))?,
        };
        if !n_value.is_finite() || n_value < 0.0 || n_value.fract() != 0.0 {
            return Err(format!("count {n_value} is not a non-negative integer"));
        }
        Ok(n_value as u64)
    }

    fn into_rate(self) -> Option<f64> {
        let n_value = match self {
            Self::Integer(n) => n as f64,
            Self::Float(x) => x,
            Self::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        };
        n_value.is_finite().then_some(n_value)
    }
}

/// `null` and missing counts become `0`; malformed or negative counts fail.
pub(crate) fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<EnumRawCount>::deserialize(deserializer)? {
        Some(raw) => raw.into_count().map_err(D::Error::custom),
        None => Ok(0),
    }
}

/// Numeric or textual (`"50.00"`, `"50%"`) rate; anything else is `None`.
pub(crate) fn deserialize_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EnumRawCount>::deserialize(deserializer)?.and_then(EnumRawCount::into_rate))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PresentationModel

/// Literal value held by a presentation cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumCellValue {
    Text(String),
    Integer(u64),
    Number(f64),
}

impl EnumCellValue {
    /// Text as displayed by the table widget.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
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

/// One leaf column under a column group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecSubColumn {
    pub key: String,
    pub label: String,
    pub align: EnumColumnAlign,
}

/// Top-level header spanning its subcolumns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecColumnGroup {
    pub key: String,
    pub label: String,
    pub sub_columns: Vec<SpecSubColumn>,
}

/// One rendered row; `cells[group_key][sub_column_key]`.
///
/// A missing entry means the backend omitted the cell, which is different
/// from an entity with zero counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpecPresentationRow {
    pub key: String,
    pub label: String,
    pub cells: BTreeMap<String, BTreeMap<String, EnumCellValue>>,
}

impl SpecPresentationRow {
    /// Cell under `group_key` / `sub_column_key`, if present.
    pub fn get(&self, group_key: &str, sub_column_key: &str) -> Option<&EnumCellValue> {
        self.cells.get(group_key)?.get(sub_column_key)
    }
}

/// Header structure of a presentation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumHeaderLayout {
    /// Two header rows: group labels over subcolumn labels.
    #[default]
    Grouped,
    /// One header row of subcolumn labels.
    Flat,
}

/// Shape-agnostic table consumed by table widgets and the spreadsheet serializer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpecPresentationModel {
    pub layout: EnumHeaderLayout,
    pub column_groups: Vec<SpecColumnGroup>,
    pub rows: Vec<SpecPresentationRow>,
}

impl SpecPresentationModel {
    /// Number of leaf columns, excluding the index column.
    pub fn width_data(&self) -> usize {
        self.column_groups
            .iter()
            .map(|group| group.sub_columns.len())
            .sum()
    }

    /// Row with `key`, if any.
    pub fn row(&self, key: &str) -> Option<&SpecPresentationRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Column group with `key`, if any.
    pub fn column_group(&self, key: &str) -> Option<&SpecColumnGroup> {
        self.column_groups.iter().find(|group| group.key == key)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Report construction failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Payload `(type, tableType)` does not match the requested report.
    #[error("Report shape mismatch: expected {expected}, received {received}.")]
    ShapeMismatch {
        /// Shape implied by the report configuration.
        expected: String,
        /// Shape declared by the payload.
        received: String,
    },
    /// Payload is not valid JSON or its `data` does not fit the declared shape.
    #[error("Malformed report payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    /// Inconsistent report filter.
    #[error("Invalid report filter: {0}")]
    InvalidFilter(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_set_treats_null_and_missing_counts_as_zero() {
        let metrics: SpecMetricSet =
            serde_json::from_str(r#"{"ingreso": null, "titulados": "7"}"#).expect("parse");
        assert_eq!(metrics.ingreso, 0);
        assert_eq!(metrics.egreso, 0);
        assert_eq!(metrics.titulados, 7);
        assert_eq!(metrics.porcentaje, None);
    }

    #[test]
    fn metric_set_rejects_unparsable_and_negative_counts() {
        for c_json in [
            r#"{"ingreso": "abc", "egreso": 8, "titulados": 2}"#,
            r#"{"ingreso": 10, "egreso": -5, "titulados": 2}"#,
            r#"{"ingreso": 10, "egreso": 8, "titulados": 2.5}"#,
        ] {
            assert!(
                serde_json::from_str::<SpecMetricSet>(c_json).is_err(),
                "accepted {c_json}"
            );
        }
    }

    #[test]
    fn metric_set_accepts_textual_rate() {
        let metrics: SpecMetricSet =
            serde_json::from_str(r#"{"egreso": 8, "titulados": 4, "porcentaje": "50.00"}"#)
                .expect("parse");
        assert_eq!(metrics.porcentaje, Some(50.0));
    }

    #[test]
    fn config_deserializes_camel_case_keys_with_defaults() {
        let config: SpecReportConfig = serde_json::from_str(
            r#"{"denominator": "ingreso", "includeOtherValue": true, "groupBy": "career",
                "startDate": "2020-01-01"}"#,
        )
        .expect("parse");
        assert_eq!(config.denominator, EnumDenominator::Ingreso);
        assert!(config.if_include_other_value);
        assert_eq!(config.report_shape, EnumReportShape::Grouped);
        assert_eq!(config.group_by, EnumGroupBy::Career);
        assert_eq!(
            config.filter.date_start,
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert!(config.filter.career_ids.is_empty());
    }

    #[test]
    fn config_rejects_inverted_date_range() {
        let config = SpecReportConfig {
            filter: SpecReportFilter {
                date_start: NaiveDate::from_ymd_opt(2024, 6, 1),
                date_end: NaiveDate::from_ymd_opt(2024, 1, 1),
                career_ids: vec![],
            },
            ..SpecReportConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidFilter(_))
        ));
    }

    #[test]
    fn config_rejects_blank_or_repeated_career_ids() {
        for l_ids in [vec!["c1", " "], vec!["c1", "c2", "c1"]] {
            let config = SpecReportConfig {
                filter: SpecReportFilter {
                    career_ids: l_ids.into_iter().map(String::from).collect(),
                    ..SpecReportFilter::default()
                },
                ..SpecReportConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ReportError::InvalidFilter(_))
            ));
        }
    }

    #[test]
    fn number_cells_display_without_trailing_zero_fraction() {
        assert_eq!(EnumCellValue::Number(12.0).to_display_string(), "12");
        assert_eq!(EnumCellValue::Number(1.5).to_display_string(), "1.5");
        assert_eq!(EnumCellValue::Integer(40).to_display_string(), "40");
    }
}
