use chrono::{Datelike, NaiveDate};

use crate::config::MalformedSeasonPolicy;
use crate::data::model::{Column, ColumnData, ColumnKind, Table};
use crate::data::schema;
use crate::error::{Error, Result};

/// Where a row's season came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonSource {
    Existing,
    Date,
    HomeTeamSeason,
    AwayTeamSeason,
}

/// Per-source counts from one resolver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonOutcome {
    pub kept: usize,
    pub from_date: usize,
    pub from_home_team_season: usize,
    pub from_away_team_season: usize,
    /// Composite strings that did not end in a year.
    pub malformed: usize,
    pub unresolved: usize,
}

impl SeasonOutcome {
    fn record(&mut self, source: Option<SeasonSource>) {
        match source {
            Some(SeasonSource::Existing) => self.kept += 1,
            Some(SeasonSource::Date) => self.from_date += 1,
            Some(SeasonSource::HomeTeamSeason) => self.from_home_team_season += 1,
            Some(SeasonSource::AwayTeamSeason) => self.from_away_team_season += 1,
            None => self.unresolved += 1,
        }
    }
}

/// The last four characters of a `"<team><year>"` string, read as a year.
/// `None` unless they are exactly four ASCII digits.
pub fn trailing_year(composite: &str) -> Option<i64> {
    let tail: Vec<char> = composite.chars().rev().take(4).collect();
    if tail.len() < 4 || !tail.iter().all(char::is_ascii_digit) {
        return None;
    }
    tail.iter().rev().collect::<String>().parse().ok()
}

/// Read-only views of every column a season can come from.
struct SeasonSources<'a> {
    season: &'a [Option<i64>],
    date: Option<&'a [Option<NaiveDate>]>,
    home_team_season: Option<&'a [Option<String>]>,
    away_team_season: Option<&'a [Option<String>]>,
}

/// An absent optional column is fine; one of the wrong kind is not.
fn optional<T>(lookup: Result<T>) -> Result<Option<T>> {
    match lookup {
        Ok(v) => Ok(Some(v)),
        Err(Error::MissingColumn(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

impl<'a> SeasonSources<'a> {
    fn from_table(table: &'a Table) -> Result<Self> {
        Ok(SeasonSources {
            season: table.integers(schema::SEASON)?,
            date: optional(table.dates(schema::DATE))?,
            home_team_season: optional(table.strings(schema::HOME_TEAM_SEASON))?,
            away_team_season: optional(table.strings(schema::AWAY_TEAM_SEASON))?,
        })
    }

    /// First source that yields a season for `row`, in priority order.
    fn resolve(
        &self,
        row: usize,
        policy: MalformedSeasonPolicy,
        outcome: &mut SeasonOutcome,
    ) -> Result<Option<(i64, SeasonSource)>> {
        if let Some(season) = self.season[row] {
            return Ok(Some((season, SeasonSource::Existing)));
        }
        if let Some(date) = self.date.and_then(|d| d[row]) {
            return Ok(Some((i64::from(date.year()), SeasonSource::Date)));
        }

        let composites = [
            (
                self.home_team_season,
                schema::HOME_TEAM_SEASON,
                SeasonSource::HomeTeamSeason,
            ),
            (
                self.away_team_season,
                schema::AWAY_TEAM_SEASON,
                SeasonSource::AwayTeamSeason,
            ),
        ];
        for (values, column, source) in composites {
            let Some(value) = values.and_then(|v| v[row].as_deref()) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            match trailing_year(value) {
                Some(year) => return Ok(Some((year, source))),
                None => {
                    outcome.malformed += 1;
                    if policy == MalformedSeasonPolicy::Fail {
                        return Err(Error::MalformedSeason {
                            row,
                            column: column.to_string(),
                            value: value.to_string(),
                        });
                    }
                    log::debug!("row {row}: '{value}' in {column} has no trailing year");
                }
            }
        }
        Ok(None)
    }
}

/// Fill missing seasons from, in order: the date's year, the home
/// team-season string, the away team-season string. Rows with no usable
/// source stay missing and are counted as unresolved.
///
/// A table without a `season` column gets an all-missing one first.
pub fn resolve_seasons(table: &mut Table, policy: MalformedSeasonPolicy) -> Result<SeasonOutcome> {
    if !table.has_column(schema::SEASON) {
        let nulls = ColumnData::nulls(ColumnKind::Integer, table.n_rows());
        table.push_column(Column::new(schema::SEASON, nulls))?;
    }

    let mut outcome = SeasonOutcome::default();
    let resolved = {
        let sources = SeasonSources::from_table(table)?;
        let mut resolved = Vec::with_capacity(table.n_rows());
        for row in 0..table.n_rows() {
            let found = sources.resolve(row, policy, &mut outcome)?;
            outcome.record(found.map(|(_, source)| source));
            resolved.push(found.map(|(season, _)| season));
        }
        resolved
    };
    *table.integers_mut(schema::SEASON)? = resolved;

    if outcome.unresolved > 0 {
        log::warn!("season: unable to infer {} rows", outcome.unresolved);
    }
    log::info!(
        "season: kept {}, from date {}, from home team-season {}, from away team-season {}",
        outcome.kept,
        outcome.from_date,
        outcome.from_home_team_season,
        outcome.from_away_team_season
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_row_table() -> Table {
        Table::from_columns(vec![
            Column::integer("season", vec![Some(2021), None, None, None, None]),
            Column::date(
                "date",
                vec![None, NaiveDate::from_ymd_opt(2022, 5, 17), None, None, None],
            ),
            Column::string(
                "home_team_season",
                vec![None, None, Some("Team_2019"), None, None],
            ),
            Column::string(
                "away_team_season",
                vec![None, None, None, Some("Team_2020"), None],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_each_source_in_priority_order() {
        let mut table = five_row_table();
        let outcome = resolve_seasons(&mut table, MalformedSeasonPolicy::default()).unwrap();
        assert_eq!(
            table.integers("season").unwrap(),
            &[Some(2021), Some(2022), Some(2019), Some(2020), None]
        );
        assert_eq!(
            outcome,
            SeasonOutcome {
                kept: 1,
                from_date: 1,
                from_home_team_season: 1,
                from_away_team_season: 1,
                malformed: 0,
                unresolved: 1,
            }
        );
    }

    #[test]
    fn existing_season_wins_over_other_sources() {
        let mut table = Table::from_columns(vec![
            Column::integer("season", vec![Some(2018)]),
            Column::date("date", vec![NaiveDate::from_ymd_opt(2022, 5, 17)]),
            Column::string("home_team_season", vec![Some("NYY2019")]),
        ])
        .unwrap();
        resolve_seasons(&mut table, MalformedSeasonPolicy::default()).unwrap();
        assert_eq!(table.integers("season").unwrap(), &[Some(2018)]);
    }

    #[test]
    fn date_wins_over_composite_strings() {
        let mut table = Table::from_columns(vec![
            Column::integer("season", vec![None]),
            Column::date("date", vec![NaiveDate::from_ymd_opt(2022, 5, 17)]),
            Column::string("home_team_season", vec![Some("NYY2019")]),
        ])
        .unwrap();
        resolve_seasons(&mut table, MalformedSeasonPolicy::default()).unwrap();
        assert_eq!(table.integers("season").unwrap(), &[Some(2022)]);
    }

    #[test]
    fn malformed_home_string_falls_through_to_away() {
        let mut table = Table::from_columns(vec![
            Column::integer("season", vec![None, None]),
            Column::string("home_team_season", vec![Some("NYY20X9"), Some("BOS")]),
            Column::string("away_team_season", vec![Some("BOS2017"), None]),
        ])
        .unwrap();
        let outcome = resolve_seasons(&mut table, MalformedSeasonPolicy::FallThrough).unwrap();
        assert_eq!(table.integers("season").unwrap(), &[Some(2017), None]);
        assert_eq!(outcome.malformed, 2);
        assert_eq!(outcome.unresolved, 1);
    }

    #[test]
    fn malformed_string_fails_under_strict_policy() {
        let mut table = Table::from_columns(vec![
            Column::integer("season", vec![None]),
            Column::string("home_team_season", vec![Some("NYY20X9")]),
        ])
        .unwrap();
        let err = resolve_seasons(&mut table, MalformedSeasonPolicy::Fail).unwrap_err();
        match err {
            Error::MalformedSeason { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "home_team_season");
                assert_eq!(value, "NYY20X9");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_season_column_is_created() {
        let mut table = Table::from_columns(vec![Column::string(
            "away_team_season",
            vec![Some("LAD2016"), None],
        )])
        .unwrap();
        let outcome = resolve_seasons(&mut table, MalformedSeasonPolicy::default()).unwrap();
        assert_eq!(table.integers("season").unwrap(), &[Some(2016), None]);
        assert_eq!(outcome.unresolved, 1);
    }

    #[test]
    fn trailing_year_needs_four_digits() {
        assert_eq!(trailing_year("Team_2019"), Some(2019));
        assert_eq!(trailing_year("2019"), Some(2019));
        assert_eq!(trailing_year("019"), None);
        assert_eq!(trailing_year("NYY20X9"), None);
        assert_eq!(trailing_year("Équipe-2020"), Some(2020));
    }
}
