//! Plain table export from a Polars `DataFrame`.

use std::collections::BTreeMap;

use cohortkit_report::{
    C_KEY_FLAT_GROUP, EnumCellValue, EnumColumnAlign, EnumHeaderLayout, SpecColumnGroup,
    SpecPresentationModel, SpecPresentationRow, SpecSubColumn,
};
use log::debug;
use polars::prelude::{AnyValue, DataFrame};

use crate::serializer::serialize_presentation_model;
use crate::spec::{SpecSheetExportOptions, SpecSpreadsheetDocument, XlsxExportError};

/// Flat presentation model: `col_index` as row labels, other columns as subcolumns.
///
/// Null values are omitted from the row's cells.
pub fn derive_presentation_model_from_dataframe(
    df: &DataFrame,
    col_index: &str,
) -> Result<SpecPresentationModel, XlsxExportError> {
    let l_cols = df.get_columns();
    let Some(n_idx_index) = l_cols.iter().position(|c_col| c_col.name().as_str() == col_index)
    else {
        return Err(XlsxExportError::ColumnNotFound(col_index.to_string()));
    };

    let l_cols_idx_data: Vec<usize> = (0..l_cols.len()).filter(|n| *n != n_idx_index).collect();
    let l_sub_columns: Vec<SpecSubColumn> = l_cols_idx_data
        .iter()
        .map(|n_idx| {
            let c_col = &l_cols[*n_idx];
            SpecSubColumn {
                key: c_col.name().to_string(),
                label: c_col.name().to_string(),
                align: if c_col.dtype().is_numeric() {
                    EnumColumnAlign::Right
                } else {
                    EnumColumnAlign::Left
                },
            }
        })
        .collect();

    let mut l_rows = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let label = derive_text_from_any_value(l_cols[n_idx_index].get(row_idx)?);

        let mut dict_cells = BTreeMap::new();
        for (n_idx, sub_column) in l_cols_idx_data.iter().zip(&l_sub_columns) {
            if let Some(value) = derive_cell_value_from_any_value(l_cols[*n_idx].get(row_idx)?) {
                dict_cells.insert(sub_column.key.clone(), value);
            }
        }

        let mut cells = BTreeMap::new();
        cells.insert(C_KEY_FLAT_GROUP.to_string(), dict_cells);
        l_rows.push(SpecPresentationRow {
            key: row_idx.to_string(),
            label,
            cells,
        });
    }

    debug!(
        "dataframe model: index={col_index:?} sub_columns={} rows={}",
        l_sub_columns.len(),
        l_rows.len()
    );

    Ok(SpecPresentationModel {
        layout: EnumHeaderLayout::Flat,
        column_groups: vec![SpecColumnGroup {
            key: C_KEY_FLAT_GROUP.to_string(),
            label: String::new(),
            sub_columns: l_sub_columns,
        }],
        rows: l_rows,
    })
}

/// Serialize `df` with `col_index` as the index column.
///
/// `options.index_label` falls back to the column name when empty.
pub fn serialize_dataframe(
    df: &DataFrame,
    col_index: &str,
    options: &SpecSheetExportOptions,
) -> Result<SpecSpreadsheetDocument, XlsxExportError> {
    let model = derive_presentation_model_from_dataframe(df, col_index)?;
    if options.index_label.is_empty() {
        let options = SpecSheetExportOptions {
            index_label: col_index.to_string(),
            ..options.clone()
        };
        return serialize_presentation_model(&model, &options);
    }
    serialize_presentation_model(&model, options)
}

fn derive_text_from_any_value(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(val) => val.to_string(),
        AnyValue::StringOwned(val) => val.to_string(),
        _ => value.to_string(),
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> Option<EnumCellValue> {
    let cell = match value {
        AnyValue::Null => return None,
        AnyValue::String(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::Text(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt32(val) => EnumCellValue::Number(f64::from(val)),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(f64::from(val)),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(f64::from(val)),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::Text(value.to_string()),
    };
    Some(cell)
}
