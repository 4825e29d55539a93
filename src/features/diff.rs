use std::collections::BTreeSet;

use crate::data::model::{Column, Table};
use crate::data::schema::Side;
use crate::error::Result;

/// For every suffix shared by a numeric `home_*` and `away_*` column, add
/// `diff_<suffix>` = home − away. Missing on either side gives a missing
/// difference. Returns the new column names, in suffix order.
pub fn add_diff_features(table: &mut Table) -> Result<Vec<String>> {
    let suffixes = |side: Side| -> BTreeSet<String> {
        table
            .columns()
            .iter()
            .filter(|c| c.data.numeric().is_some())
            .filter_map(|c| c.name.strip_prefix(side.prefix()).map(str::to_string))
            .collect()
    };
    let home = suffixes(Side::Home);
    let away = suffixes(Side::Away);

    let mut added = Vec::new();
    for suffix in home.intersection(&away) {
        let lookup = |side: Side| {
            table
                .column(&format!("{}{suffix}", side.prefix()))
                .and_then(|c| c.data.numeric())
                .unwrap_or_default()
        };
        let (h, a) = (lookup(Side::Home), lookup(Side::Away));
        let diff = h
            .iter()
            .zip(&a)
            .map(|(h, a)| h.zip(*a).map(|(h, a)| h - a))
            .collect();

        let name = format!("diff_{suffix}");
        table.push_column(Column::float(name.as_str(), diff))?;
        added.push(name);
    }

    log::debug!("added {} diff features", added.len());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_numeric_suffixes_only() {
        let mut table = Table::from_columns(vec![
            Column::float("home_runs_mean", vec![Some(5.0), None]),
            Column::float("away_runs_mean", vec![Some(3.5), Some(1.0)]),
            Column::integer("home_team_rest", vec![Some(2), Some(1)]),
            Column::integer("away_team_rest", vec![Some(1), Some(3)]),
            Column::float("home_only_mean", vec![Some(1.0), Some(1.0)]),
            Column::string("home_team_abbr", vec![Some("A"), Some("B")]),
            Column::string("away_team_abbr", vec![Some("B"), Some("A")]),
        ])
        .unwrap();

        let added = add_diff_features(&mut table).unwrap();
        assert_eq!(added, vec!["diff_runs_mean", "diff_team_rest"]);
        assert_eq!(table.floats("diff_runs_mean").unwrap(), &[Some(1.5), None]);
        assert_eq!(table.floats("diff_team_rest").unwrap(), &[Some(1.0), Some(-2.0)]);
        assert!(!table.has_column("diff_team_abbr"));
    }
}
