//! Stateless value helpers shared by the pivot transforms.

use crate::conf::C_TITLE_REPORT;
use crate::spec::{EnumDenominator, SpecMetricSet, SpecReportFilter};

////////////////////////////////////////////////////////////////////////////////
// #region PercentageResolution

/// Graduation rate for one metric set.
///
/// Prefers the backend-supplied `porcentaje`. Otherwise divides `titulados` by
/// the denominator count; a zero denominator or zero `titulados` yields `0.0`.
/// That fallback cannot be told apart from a real 0% rate.
pub fn calculate_rate(metrics: &SpecMetricSet, denominator: EnumDenominator) -> f64 {
    if let Some(n_rate) = metrics.porcentaje {
        return n_rate;
    }

    let n_denominator = metrics.count_of(denominator);
    if n_denominator > 0 && metrics.titulados > 0 {
        (metrics.titulados as f64 / n_denominator as f64) * 100.0
    } else {
        0.0
    }
}

/// Format a rate with exactly two decimals.
pub fn format_rate(rate: f64) -> String {
    if !rate.is_finite() {
        return "0.00".to_string();
    }
    format!("{rate:.2}")
}

/// Resolve the displayed percentage, e.g. `"50.00%"`.
pub fn resolve_percentage(metrics: &SpecMetricSet, denominator: EnumDenominator) -> String {
    format!("{}%", format_rate(calculate_rate(metrics, denominator)))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Labels

/// Upper-cased entity label used by grouped headers and rows.
pub fn derive_upper_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// Export title carrying the reporting window when known.
pub fn derive_report_title(filter: &SpecReportFilter) -> String {
    match (filter.date_start, filter.date_end) {
        (Some(date_start), Some(date_end)) => {
            format!("{C_TITLE_REPORT} ({date_start} a {date_end})")
        }
        (Some(date_start), None) => format!("{C_TITLE_REPORT} (desde {date_start})"),
        (None, Some(date_end)) => format!("{C_TITLE_REPORT} (hasta {date_end})"),
        (None, None) => C_TITLE_REPORT.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn metrics(ingreso: u64, egreso: u64, titulados: u64) -> SpecMetricSet {
        SpecMetricSet {
            ingreso,
            egreso,
            titulados,
            porcentaje: None,
        }
    }

    #[test]
    fn resolve_percentage_divides_by_selected_denominator() {
        assert_eq!(
            resolve_percentage(&metrics(100, 80, 40), EnumDenominator::Egreso),
            "50.00%"
        );
        assert_eq!(
            resolve_percentage(&metrics(100, 80, 40), EnumDenominator::Ingreso),
            "40.00%"
        );
    }

    #[test]
    fn resolve_percentage_degrades_to_zero() {
        assert_eq!(
            resolve_percentage(&metrics(100, 0, 40), EnumDenominator::Egreso),
            "0.00%"
        );
        assert_eq!(
            resolve_percentage(&metrics(100, 80, 0), EnumDenominator::Egreso),
            "0.00%"
        );
    }

    #[test]
    fn resolve_percentage_prefers_backend_rate() {
        let m = SpecMetricSet {
            porcentaje: Some(33.3333),
            ..metrics(3, 3, 3)
        };
        assert_eq!(resolve_percentage(&m, EnumDenominator::Egreso), "33.33%");
    }

    #[test]
    fn report_title_includes_window() {
        let filter = SpecReportFilter {
            date_start: NaiveDate::from_ymd_opt(2020, 1, 1),
            date_end: NaiveDate::from_ymd_opt(2024, 12, 31),
            career_ids: vec![],
        };
        assert_eq!(
            derive_report_title(&filter),
            "Reporte de titulación (2020-01-01 a 2024-12-31)"
        );
        assert_eq!(
            derive_report_title(&SpecReportFilter::default()),
            "Reporte de titulación"
        );
    }
}
