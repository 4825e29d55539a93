use std::collections::HashMap;

use crate::data::model::Table;
use crate::data::schema::{self, Side};
use crate::error::{Error, Result};

/// What one statistic-column pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatFill {
    pub filled: usize,
    /// Gaps with no same-team, same-season donor.
    pub still_missing: usize,
}

/// Running sum and count of donor values for one (team, season).
#[derive(Debug, Clone, Copy, Default)]
struct Donors {
    sum: f64,
    count: usize,
}

impl Donors {
    fn mean(self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Group the present values of `values` by (team, season), in row order.
///
/// Rows with no team or no season are never donors: nothing can match them.
fn donor_index<'a>(
    teams: &'a [Option<String>],
    seasons: &[Option<i64>],
    values: &[Option<f64>],
) -> HashMap<(&'a str, i64), Donors> {
    let mut index: HashMap<(&str, i64), Donors> = HashMap::new();
    for ((team, season), value) in teams.iter().zip(seasons).zip(values) {
        if let (Some(team), Some(season), Some(value)) = (team, season, value) {
            let donors = index.entry((team.as_str(), *season)).or_default();
            donors.sum += value;
            donors.count += 1;
        }
    }
    index
}

/// Fill gaps in one statistic column with the mean of the same column over
/// rows where the same team played on the same side in the same season.
///
/// The column's side comes from its name prefix: `home_*` columns are keyed
/// by `home_team_abbr`, `away_*` by `away_team_abbr`. Donors are the values
/// present before this pass; a row never donates to itself because it is
/// only filled when its own value is missing. No other column is read or
/// written besides the team column and `season`.
pub fn fill_stat(table: &mut Table, column: &str) -> Result<StatFill> {
    let side = Side::of_column(column).ok_or_else(|| Error::UnsidedColumn(column.to_string()))?;

    let fills: Vec<(usize, Option<f64>)> = {
        let teams = table.strings(side.team_column())?;
        let seasons = table.integers(schema::SEASON)?;
        let values = table.floats(column)?;
        let index = donor_index(teams, seasons, values);

        values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.is_none())
            .map(|(row, _)| {
                let key = teams[row].as_deref().zip(seasons[row]);
                let mean = key.and_then(|k| index.get(&k)).map(|d| d.mean());
                (row, mean)
            })
            .collect()
    };

    let mut outcome = StatFill::default();
    let values = table.floats_mut(column)?;
    for (row, mean) in fills {
        match mean {
            Some(mean) => {
                values[row] = Some(mean);
                outcome.filled += 1;
            }
            None => outcome.still_missing += 1,
        }
    }

    log::debug!(
        "{column}: filled {}, still missing {}",
        outcome.filled,
        outcome.still_missing
    );
    Ok(outcome)
}
