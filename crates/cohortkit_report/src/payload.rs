//! Backend aggregate payloads.
//!
//! The envelope carries `type`, `tableType` and `metadata`; `data` is decoded
//! into one of the shape structs below only after the envelope matched the
//! requested report.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use crate::spec::{
    EnumDenominator, EnumRawCount, EnumReportShape, EnumTableType, ReportError, SpecMetricSet,
    SpecReportConfig, deserialize_rate,
};

////////////////////////////////////////////////////////////////////////////////
// #region Envelope

/// Report settings echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SpecPayloadMetadata {
    /// Denominator the backend computed `porcentaje` with.
    #[serde(rename = "graduationRateDenominator", default)]
    pub denominator: Option<EnumDenominator>,
    #[serde(rename = "includeOtherValue", default)]
    pub if_include_other_value: Option<bool>,
    #[serde(rename = "startDate", default)]
    pub date_start: Option<NaiveDate>,
    #[serde(rename = "endDate", default)]
    pub date_end: Option<NaiveDate>,
}

/// Raw backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecReportPayload {
    #[serde(rename = "type")]
    pub report_type: EnumReportShape,
    #[serde(rename = "tableType", default)]
    pub table_type: Option<EnumTableType>,
    #[serde(default)]
    pub metadata: SpecPayloadMetadata,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SpecReportPayload {
    /// Parse a payload from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a payload from an already decoded JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ReportError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode `data` into a concrete shape.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, ReportError> {
        Ok(T::deserialize(&self.data)?)
    }

    /// `type/tableType` as reported in shape errors.
    pub fn describe_shape(&self) -> String {
        match self.table_type {
            Some(table_type) => format!("{}/{}", self.report_type, table_type),
            None => self.report_type.to_string(),
        }
    }
}

impl SpecReportConfig {
    /// Fold backend-declared settings into this configuration.
    ///
    /// The backend computed `porcentaje` with its declared denominator, so the
    /// payload value wins when present.
    pub fn with_payload_metadata(&self, metadata: &SpecPayloadMetadata) -> Self {
        let mut config = self.clone();
        if let Some(denominator) = metadata.denominator {
            config.denominator = denominator;
        }
        if let Some(if_include_other_value) = metadata.if_include_other_value {
            config.if_include_other_value = if_include_other_value;
        }
        if metadata.date_start.is_some() {
            config.filter.date_start = metadata.date_start;
        }
        if metadata.date_end.is_some() {
            config.filter.date_end = metadata.date_end;
        }
        config
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Entities

/// Career descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecCareer {
    #[serde(deserialize_with = "deserialize_entity_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
}

impl SpecCareer {
    /// Short name when present, full name otherwise.
    pub fn label(&self) -> &str {
        match self.short_name.as_deref() {
            Some(short_name) if !short_name.trim().is_empty() => short_name,
            _ => &self.name,
        }
    }
}

/// Generation (cohort) descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecGeneration {
    #[serde(deserialize_with = "deserialize_entity_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl SpecGeneration {
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRawEntityId {
    Text(String),
    Integer(i64),
}

/// Entity ids arrive as strings or integers; both become strings.
fn deserialize_entity_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match EnumRawEntityId::deserialize(deserializer)? {
        EnumRawEntityId::Text(s) => s,
        EnumRawEntityId::Integer(n) => n.to_string(),
    })
}

fn deserialize_count_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let dict_raw = BTreeMap::<String, Option<EnumRawCount>>::deserialize(deserializer)?;
    dict_raw
        .into_iter()
        .map(|(key, value)| {
            let n_count = match value {
                Some(raw) => raw.into_count().map_err(D::Error::custom)?,
                None => 0,
            };
            Ok::<_, D::Error>((key, n_count))
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ShapeData
//
// Shape-defining keys are required so data of another shape fails to decode.

/// `grouped` data: `values[row_entity_id][column_entity_id | "totales"]`.
///
/// Rows are generations for `por-generaciones` and careers for `por-carreras`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecGroupedData {
    pub careers: Vec<SpecCareer>,
    pub generations: Vec<SpecGeneration>,
    pub values: BTreeMap<String, BTreeMap<String, SpecMetricSet>>,
}

/// One row of a `table` / `por-generaciones` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecGenerationTableRow {
    #[serde(rename = "generationId", deserialize_with = "deserialize_entity_id")]
    pub generation_id: String,
    #[serde(rename = "generationName", default)]
    pub generation_name: Option<String>,
    pub metrics: SpecMetricSet,
    #[serde(default, deserialize_with = "deserialize_rate")]
    pub percentage: Option<f64>,
}

impl SpecGenerationTableRow {
    pub fn label(&self) -> &str {
        match self.generation_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.generation_id,
        }
    }
}

/// `table` / `por-generaciones` data.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecGenerationTableData {
    pub rows: Vec<SpecGenerationTableRow>,
    pub total: SpecMetricSet,
    #[serde(rename = "totalPercentage", default, deserialize_with = "deserialize_rate")]
    pub total_percentage: Option<f64>,
}

/// One career of a `table` / `por-carreras` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecCareerTableRow {
    #[serde(deserialize_with = "deserialize_entity_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    /// `titulados` per generation id.
    #[serde(rename = "valuesByGeneration", default, deserialize_with = "deserialize_count_map")]
    pub values_by_generation: BTreeMap<String, u64>,
    pub metrics: SpecMetricSet,
    #[serde(default, deserialize_with = "deserialize_rate")]
    pub percentage: Option<f64>,
}

impl SpecCareerTableRow {
    pub fn label(&self) -> &str {
        match self.short_name.as_deref() {
            Some(short_name) if !short_name.trim().is_empty() => short_name,
            _ => &self.name,
        }
    }
}

/// `table` / `por-carreras` data.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecCareerTableData {
    pub generations: Vec<SpecGeneration>,
    pub careers: Vec<SpecCareerTableRow>,
    pub total: SpecMetricSet,
    #[serde(rename = "totalPercentage", default, deserialize_with = "deserialize_rate")]
    pub total_percentage: Option<f64>,
}

/// `summary` data.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecSummaryData {
    pub metrics: SpecMetricSet,
    #[serde(default, deserialize_with = "deserialize_rate")]
    pub percentage: Option<f64>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_envelope_parses_metadata_and_defers_data() {
        let payload = SpecReportPayload::from_json_str(
            r#"{
                "type": "table",
                "tableType": "por-carreras",
                "metadata": {"graduationRateDenominator": "ingreso", "includeOtherValue": true},
                "data": {"careers": []}
            }"#,
        )
        .expect("parse payload");

        assert_eq!(payload.report_type, EnumReportShape::Table);
        assert_eq!(payload.table_type, Some(EnumTableType::PorCarreras));
        assert_eq!(payload.metadata.denominator, Some(EnumDenominator::Ingreso));
        assert_eq!(payload.describe_shape(), "table/por-carreras");
    }

    #[test]
    fn payload_rejects_unknown_table_type() {
        let err = SpecReportPayload::from_json_str(
            r#"{"type": "grouped", "tableType": "por-semestres", "data": {}}"#,
        )
        .expect_err("unknown tableType");
        assert!(matches!(err, ReportError::MalformedPayload(_)));
    }

    #[test]
    fn career_table_row_normalizes_ids_and_counts() {
        let row: SpecCareerTableRow = serde_json::from_str(
            r#"{"id": 7, "name": "Ingeniería en Sistemas", "shortName": "ISC",
                "valuesByGeneration": {"1": 4, "2": null},
                "metrics": {"ingreso": 10, "egreso": 8, "titulados": 4},
                "percentage": "50.5"}"#,
        )
        .expect("parse row");

        assert_eq!(row.id, "7");
        assert_eq!(row.label(), "ISC");
        assert_eq!(row.values_by_generation["1"], 4);
        assert_eq!(row.values_by_generation["2"], 0);
        assert_eq!(row.percentage, Some(50.5));
    }

    #[test]
    fn metadata_overrides_config_settings() {
        let metadata = SpecPayloadMetadata {
            denominator: Some(EnumDenominator::Ingreso),
            if_include_other_value: None,
            date_start: None,
            date_end: None,
        };
        let config = SpecReportConfig {
            if_include_other_value: true,
            ..SpecReportConfig::default()
        }
        .with_payload_metadata(&metadata);

        assert_eq!(config.denominator, EnumDenominator::Ingreso);
        assert!(config.if_include_other_value);
    }

    #[test]
    fn table_row_without_metrics_is_rejected() {
        let result = serde_json::from_str::<SpecGenerationTableRow>(
            r#"{"generationId": 1, "generationName": "Gen 2019"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn career_table_row_rejects_malformed_generation_count() {
        let result = serde_json::from_str::<SpecCareerTableRow>(
            r#"{"id": 1, "name": "ISC", "valuesByGeneration": {"1": "n/a"},
                "metrics": {"ingreso": 1, "egreso": 1, "titulados": 1}}"#,
        );
        assert!(result.is_err());
    }
}
