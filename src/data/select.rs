use crate::config::FillConfig;

use super::model::{ColumnData, Table};
use super::schema::Side;

// ---------------------------------------------------------------------------
// Column selection: which columns each fill stage may touch
// ---------------------------------------------------------------------------

/// Float columns the team/season imputer works on, in table order.
///
/// A column passes when:
/// * it holds floats,
/// * its name contains none of `excluded_markers` (pitcher statistics),
/// * it is not listed in `excluded_columns`,
/// * it carries a `home_` or `away_` prefix, so its team column is known.
pub fn team_stat_columns(table: &Table, config: &FillConfig) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|col| matches!(col.data, ColumnData::Float(_)))
        .filter(|col| {
            !config
                .excluded_markers
                .iter()
                .any(|marker| col.name.contains(marker.as_str()))
        })
        .filter(|col| !config.excluded_columns.iter().any(|ex| *ex == col.name))
        .filter(|col| {
            let sided = Side::of_column(&col.name).is_some();
            if !sided {
                log::debug!("{}: no side prefix, left for the mean fill", col.name);
            }
            sided
        })
        .map(|col| col.name.clone())
        .collect()
}

/// Float columns that still contain at least one missing value.
pub fn float_columns_with_gaps(table: &Table) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|col| match &col.data {
            ColumnData::Float(values) => values.iter().any(Option::is_none),
            _ => false,
        })
        .map(|col| col.name.clone())
        .collect()
}
