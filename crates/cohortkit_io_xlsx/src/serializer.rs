//! Presentation model to spreadsheet document serializer.
//!
//! Pure and order-stable: the grid follows the ordered column groups and rows
//! of the model, never map iteration order.

use cohortkit_report::{EnumHeaderLayout, SpecPresentationModel};
use log::debug;

use crate::spec::{
    EnumSheetCell, SpecMergeRange, SpecSheetExportOptions, SpecSpreadsheetDocument,
    XlsxExportError,
};
use crate::util::{
    calculate_column_width, convert_cell_value, estimate_text_width, normalize_cell_text,
    validate_grid_limits, validate_policy_width,
};

////////////////////////////////////////////////////////////////////////////////
// #region Serialize

/// Serialize `model` into a literal grid with merges and column widths.
///
/// An empty row set is valid and yields the title and header rows only.
pub fn serialize_presentation_model(
    model: &SpecPresentationModel,
    options: &SpecSheetExportOptions,
) -> Result<SpecSpreadsheetDocument, XlsxExportError> {
    validate_policy_width(&options.policy_width)?;

    let n_cols = 1 + model.width_data();
    let n_rows_header = match model.layout {
        EnumHeaderLayout::Grouped => 2,
        EnumHeaderLayout::Flat => 1,
    };
    let n_rows_title = usize::from(options.title.is_some());
    validate_grid_limits(n_rows_title + n_rows_header + model.rows.len(), n_cols)?;

    let mut l_grid: Vec<Vec<EnumSheetCell>> = Vec::new();
    let mut l_merges: Vec<SpecMergeRange> = Vec::new();

    if let Some(c_title) = &options.title {
        let mut l_row = vec![EnumSheetCell::empty(); n_cols];
        l_row[0] = EnumSheetCell::Text(c_title.clone());
        l_grid.push(l_row);
        l_merges.push(SpecMergeRange {
            row_idx_start: 0,
            col_idx_start: 0,
            row_idx_end: 0,
            col_idx_end: n_cols - 1,
        });
    }

    let row_idx_header = l_grid.len();
    if model.layout == EnumHeaderLayout::Grouped {
        l_grid.push(derive_group_header_row(model, &options.index_label));
        l_merges.push(SpecMergeRange {
            row_idx_start: row_idx_header,
            col_idx_start: 0,
            row_idx_end: row_idx_header + 1,
            col_idx_end: 0,
        });
        l_merges.extend(plan_group_merges(model, row_idx_header));
    }
    l_grid.push(derive_sub_column_header_row(model, &options.index_label));

    for row in &model.rows {
        let mut l_row = Vec::with_capacity(n_cols);
        l_row.push(EnumSheetCell::Text(normalize_cell_text(&row.label)));
        for group in &model.column_groups {
            for sub_column in &group.sub_columns {
                let cell = row
                    .get(&group.key, &sub_column.key)
                    .map(convert_cell_value)
                    .unwrap_or_else(EnumSheetCell::empty);
                l_row.push(cell);
            }
        }
        l_grid.push(l_row);
    }

    let column_widths = plan_column_widths(model, options);

    debug!(
        "serialize: rows={} cols={} merges={}",
        l_grid.len(),
        n_cols,
        l_merges.len()
    );

    Ok(SpecSpreadsheetDocument {
        grid: l_grid,
        merges: l_merges,
        column_widths,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Headers

/// Index label, then each group label once per subcolumn it spans.
fn derive_group_header_row(model: &SpecPresentationModel, index_label: &str) -> Vec<EnumSheetCell> {
    let mut l_row = vec![EnumSheetCell::Text(index_label.to_string())];
    for group in &model.column_groups {
        for _ in &group.sub_columns {
            l_row.push(EnumSheetCell::Text(group.label.clone()));
        }
    }
    l_row
}

fn derive_sub_column_header_row(
    model: &SpecPresentationModel,
    index_label: &str,
) -> Vec<EnumSheetCell> {
    let mut l_row = vec![EnumSheetCell::Text(index_label.to_string())];
    for group in &model.column_groups {
        for sub_column in &group.sub_columns {
            l_row.push(EnumSheetCell::Text(sub_column.label.clone()));
        }
    }
    l_row
}

/// Horizontal merges for groups spanning more than one subcolumn.
fn plan_group_merges(model: &SpecPresentationModel, row_idx: usize) -> Vec<SpecMergeRange> {
    let mut l_merges = Vec::new();
    let mut col_idx = 1;
    for group in &model.column_groups {
        let n_span = group.sub_columns.len();
        if n_span > 1 {
            l_merges.push(SpecMergeRange {
                row_idx_start: row_idx,
                col_idx_start: col_idx,
                row_idx_end: row_idx,
                col_idx_end: col_idx + n_span - 1,
            });
        }
        col_idx += n_span;
    }
    l_merges
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Widths

fn plan_column_widths(model: &SpecPresentationModel, options: &SpecSheetExportOptions) -> Vec<usize> {
    let policy = &options.policy_width;
    let mut l_widths = Vec::with_capacity(1 + model.width_data());

    let n_len_index = model
        .rows
        .iter()
        .map(|row| estimate_text_width(&normalize_cell_text(&row.label)))
        .fold(estimate_text_width(&options.index_label), usize::max);
    l_widths.push(calculate_column_width(
        n_len_index,
        policy.width_index_min,
        policy.width_index_max,
        policy.width_padding,
    ));

    for group in &model.column_groups {
        for sub_column in &group.sub_columns {
            let n_len = model
                .rows
                .iter()
                .filter_map(|row| row.get(&group.key, &sub_column.key))
                .map(|value| estimate_text_width(&convert_cell_value(value).to_display_string()))
                .fold(estimate_text_width(&sub_column.label), usize::max);
            l_widths.push(calculate_column_width(
                n_len,
                policy.width_data_min,
                policy.width_data_max,
                policy.width_padding,
            ));
        }
    }

    l_widths
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cohortkit_report::{
        EnumCellValue, EnumColumnAlign, SpecColumnGroup, SpecPresentationRow, SpecSubColumn,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spec::SpecColumnWidthPolicy;

    fn sub(key: &str, label: &str) -> SpecSubColumn {
        SpecSubColumn {
            key: key.to_string(),
            label: label.to_string(),
            align: EnumColumnAlign::Center,
        }
    }

    fn text(s: &str) -> EnumSheetCell {
        EnumSheetCell::Text(s.to_string())
    }

    fn grouped_model() -> SpecPresentationModel {
        let mut dict_isc = BTreeMap::new();
        dict_isc.insert("egreso".to_string(), EnumCellValue::Integer(80));
        dict_isc.insert("titulados".to_string(), EnumCellValue::Text("—".to_string()));
        let mut dict_totals = BTreeMap::new();
        dict_totals.insert("titulados".to_string(), EnumCellValue::Integer(40));

        let mut cells = BTreeMap::new();
        cells.insert("isc".to_string(), dict_isc);
        cells.insert("totales".to_string(), dict_totals);

        SpecPresentationModel {
            layout: EnumHeaderLayout::Grouped,
            column_groups: vec![
                SpecColumnGroup {
                    key: "isc".to_string(),
                    label: "ISC".to_string(),
                    sub_columns: vec![sub("egreso", "Egreso"), sub("titulados", "Titulados")],
                },
                SpecColumnGroup {
                    key: "totales".to_string(),
                    label: "TOTALES".to_string(),
                    sub_columns: vec![sub("titulados", "Titulados")],
                },
            ],
            rows: vec![SpecPresentationRow {
                key: "g1".to_string(),
                label: "2019".to_string(),
                cells,
            }],
        }
    }

    fn options_with_title() -> SpecSheetExportOptions {
        SpecSheetExportOptions {
            title: Some("Reporte".to_string()),
            index_label: "GENERACIÓN".to_string(),
            ..SpecSheetExportOptions::default()
        }
    }

    #[test]
    fn grouped_grid_repeats_group_labels_under_merges() {
        let document = serialize_presentation_model(&grouped_model(), &options_with_title()).unwrap();
        let empty = EnumSheetCell::empty();

        assert_eq!(
            document.grid,
            vec![
                vec![text("Reporte"), empty.clone(), empty.clone(), empty.clone()],
                vec![text("GENERACIÓN"), text("ISC"), text("ISC"), text("TOTALES")],
                vec![
                    text("GENERACIÓN"),
                    text("Egreso"),
                    text("Titulados"),
                    text("Titulados"),
                ],
                vec![
                    text("2019"),
                    EnumSheetCell::Number(80.0),
                    empty,
                    EnumSheetCell::Number(40.0),
                ],
            ]
        );
    }

    #[test]
    fn merges_cover_title_index_and_multi_column_groups_only() {
        let document = serialize_presentation_model(&grouped_model(), &options_with_title()).unwrap();

        assert_eq!(
            document.merges,
            vec![
                SpecMergeRange {
                    row_idx_start: 0,
                    col_idx_start: 0,
                    row_idx_end: 0,
                    col_idx_end: 3,
                },
                SpecMergeRange {
                    row_idx_start: 1,
                    col_idx_start: 0,
                    row_idx_end: 2,
                    col_idx_end: 0,
                },
                SpecMergeRange {
                    row_idx_start: 1,
                    col_idx_start: 1,
                    row_idx_end: 1,
                    col_idx_end: 2,
                },
            ]
        );
    }

    #[test]
    fn serializing_twice_is_identical() {
        let model = grouped_model();
        let options = options_with_title();
        let first = serialize_presentation_model(&model, &options).unwrap();
        let second = serialize_presentation_model(&model, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn placeholders_never_reach_the_grid() {
        let document =
            serialize_presentation_model(&grouped_model(), &SpecSheetExportOptions::default())
                .unwrap();
        let if_has_dash = document.grid.iter().flatten().any(|cell| {
            matches!(cell, EnumSheetCell::Text(s) if s == "—" || s == "-")
        });
        assert!(!if_has_dash);
    }

    #[test]
    fn empty_rows_yield_header_rows_only() {
        let mut model = grouped_model();
        model.rows.clear();
        let document = serialize_presentation_model(&model, &options_with_title()).unwrap();
        assert_eq!(document.height(), 3);
        assert_eq!(document.width(), 4);
    }

    #[test]
    fn flat_layout_has_single_header_row_and_title_merge_only() {
        let mut model = grouped_model();
        model.layout = EnumHeaderLayout::Flat;
        let document = serialize_presentation_model(&model, &options_with_title()).unwrap();

        assert_eq!(document.height(), 3);
        assert_eq!(
            document.grid[1],
            vec![
                text("GENERACIÓN"),
                text("Egreso"),
                text("Titulados"),
                text("Titulados"),
            ]
        );
        assert_eq!(document.merges.len(), 1);
    }

    #[test]
    fn column_widths_are_clamped_per_column_kind() {
        let mut model = grouped_model();
        model.rows[0].label = "x".repeat(60);
        let document = serialize_presentation_model(&model, &options_with_title()).unwrap();
        // index clamps to 50; "Egreso"/"Titulados" pad to 8/11, data min is 10
        assert_eq!(document.column_widths, vec![50, 10, 11, 11]);
    }

    #[test]
    fn inverted_width_policy_is_rejected() {
        let options = SpecSheetExportOptions {
            policy_width: SpecColumnWidthPolicy {
                width_data_min: 40,
                width_data_max: 30,
                ..SpecColumnWidthPolicy::default()
            },
            ..SpecSheetExportOptions::default()
        };
        let err = serialize_presentation_model(&grouped_model(), &options).unwrap_err();
        assert!(matches!(err, XlsxExportError::InvalidOptions(_)));
    }
}
