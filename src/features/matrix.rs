use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::model::{ColumnData, Table};
use crate::data::schema;
use crate::error::{Error, Result};

use super::diff::add_diff_features;
use super::encode::LabelEncoder;

/// Identifier and composite columns that never become features.
pub const DROPPED_COLUMNS: [&str; 6] = [
    schema::ID,
    schema::DATE,
    schema::HOME_PITCHER,
    schema::AWAY_PITCHER,
    schema::HOME_TEAM_SEASON,
    schema::AWAY_TEAM_SEASON,
];

pub const ENCODED_HOME_TEAM: &str = "abbr_home_team";
pub const ENCODED_AWAY_TEAM: &str = "abbr_away_team";

/// Dense model input: one row per game, missing values as NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    /// 1 when the home team won; present for training tables only.
    pub labels: Option<Vec<u8>>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    fn select(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            feature_names: self.feature_names.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: self
                .labels
                .as_ref()
                .map(|labels| indices.iter().map(|&i| labels[i]).collect()),
        }
    }

    /// Shuffle rows with `seed` and hold out `ceil(n * test_size)` of them.
    /// Returns `(train, test)`.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> (FeatureMatrix, FeatureMatrix) {
        let n = self.n_rows();
        let n_test = ((n as f64 * test_size.clamp(0.0, 1.0)).ceil() as usize).min(n);

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        let (test, train) = order.split_at(n_test);
        (self.select(train), self.select(test))
    }

    /// Write the matrix as CSV, label last when present. NaN is an empty field.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut header: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        if self.labels.is_some() {
            header.push(schema::HOME_TEAM_WIN);
        }
        writer.write_record(&header).context("writing header")?;

        for (i, row) in self.rows.iter().enumerate() {
            let mut record: Vec<String> = row
                .iter()
                .map(|v| if v.is_nan() { String::new() } else { v.to_string() })
                .collect();
            if let Some(labels) = &self.labels {
                record.push(labels[i].to_string());
            }
            writer
                .write_record(&record)
                .with_context(|| format!("writing row {i}"))?;
        }
        writer.flush().context("flushing feature CSV")?;
        Ok(())
    }
}

/// Fit a team encoder on the home team column and build a labelled matrix.
pub fn prepare_training(table: &Table, diff_features: bool) -> Result<(FeatureMatrix, LabelEncoder)> {
    let encoder = LabelEncoder::fit(
        table
            .strings(schema::HOME_TEAM_ABBR)?
            .iter()
            .flatten()
            .map(String::as_str),
    );
    let matrix = build(table, &encoder, true, diff_features)?;
    Ok((matrix, encoder))
}

/// Build an unlabelled matrix with an encoder fitted on the training table.
pub fn prepare_inference(
    table: &Table,
    encoder: &LabelEncoder,
    diff_features: bool,
) -> Result<FeatureMatrix> {
    build(table, encoder, false, diff_features)
}

fn build(
    table: &Table,
    encoder: &LabelEncoder,
    training: bool,
    diff_features: bool,
) -> Result<FeatureMatrix> {
    let mut work = table.clone();
    if diff_features {
        add_diff_features(&mut work)?;
    }

    let labels = if training {
        let wins = work.bools(schema::HOME_TEAM_WIN)?;
        let labels = wins
            .iter()
            .enumerate()
            .map(|(row, win)| win.map(u8::from).ok_or(Error::MissingLabel(row)))
            .collect::<Result<Vec<u8>>>()?;
        Some(labels)
    } else {
        None
    };

    let skipped = |name: &str| {
        DROPPED_COLUMNS.contains(&name)
            || name == schema::HOME_TEAM_WIN
            || name == schema::HOME_TEAM_ABBR
            || name == schema::AWAY_TEAM_ABBR
    };

    let mut names = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();
    for col in work.columns().iter().filter(|c| !skipped(c.name.as_str())) {
        let values: Vec<f64> = match &col.data {
            ColumnData::Bool(v) => v
                .iter()
                .map(|b| b.map_or(f64::NAN, |b| f64::from(u8::from(b))))
                .collect(),
            other => other
                .numeric()
                .ok_or_else(|| Error::UnsupportedFeature {
                    column: col.name.clone(),
                    kind: other.kind(),
                })?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect(),
        };
        names.push(col.name.clone());
        columns.push(values);
    }

    for (source, encoded) in [
        (schema::HOME_TEAM_ABBR, ENCODED_HOME_TEAM),
        (schema::AWAY_TEAM_ABBR, ENCODED_AWAY_TEAM),
    ] {
        let codes = work
            .strings(source)?
            .iter()
            .map(|abbr| match abbr {
                Some(abbr) => encoder.transform(abbr).map(|code| code as f64),
                None => Ok(f64::NAN),
            })
            .collect::<Result<Vec<f64>>>()?;
        names.push(encoded.to_string());
        columns.push(codes);
    }

    let rows: Vec<Vec<f64>> = (0..work.n_rows())
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect();

    log::info!(
        "features: {} rows x {} columns{}",
        work.n_rows(),
        names.len(),
        if training { ", labelled" } else { "" }
    );
    Ok(FeatureMatrix {
        feature_names: names,
        rows,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use chrono::NaiveDate;

    fn filled_games() -> Table {
        Table::from_columns(vec![
            Column::string("id", vec![Some("1"), Some("2"), Some("3")]),
            Column::string("home_team_abbr", vec![Some("NYY"), Some("BOS"), Some("NYY")]),
            Column::string("away_team_abbr", vec![Some("BOS"), Some("NYY"), Some("BOS")]),
            Column::date("date", vec![NaiveDate::from_ymd_opt(2021, 4, 1); 3]),
            Column::boolean("is_night_game", vec![Some(true), Some(false), Some(true)]),
            Column::boolean("home_team_win", vec![Some(true), Some(false), Some(false)]),
            Column::string("home_pitcher", vec![Some("p1"), Some("p2"), Some("p3")]),
            Column::string("away_pitcher", vec![Some("p4"), Some("p5"), Some("p6")]),
            Column::integer("season", vec![Some(2021); 3]),
            Column::float("home_runs_mean", vec![Some(4.0), Some(3.0), None]),
            Column::float("away_runs_mean", vec![Some(2.0), Some(5.0), Some(1.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn training_matrix_layout() {
        let (matrix, encoder) = prepare_training(&filled_games(), false).unwrap();
        assert_eq!(encoder.classes(), &["BOS", "NYY"]);
        assert_eq!(
            matrix.feature_names,
            vec![
                "is_night_game",
                "season",
                "home_runs_mean",
                "away_runs_mean",
                "abbr_home_team",
                "abbr_away_team",
            ]
        );
        assert_eq!(matrix.labels, Some(vec![1, 0, 0]));
        assert_eq!(&matrix.rows[0], &[1.0, 2021.0, 4.0, 2.0, 1.0, 0.0]);
        assert!(matrix.rows[2][2].is_nan());
    }

    #[test]
    fn diff_features_are_included_on_request() {
        let (matrix, _) = prepare_training(&filled_games(), true).unwrap();
        let idx = matrix
            .feature_names
            .iter()
            .position(|n| n == "diff_runs_mean")
            .unwrap();
        assert_eq!(matrix.rows[1][idx], -2.0);
    }

    #[test]
    fn inference_rejects_unseen_team() {
        let encoder = LabelEncoder::fit(["NYY"]);
        let err = prepare_inference(&filled_games(), &encoder, false).unwrap_err();
        assert!(matches!(err, Error::UnseenLabel { .. }));
    }

    #[test]
    fn inference_has_no_labels() {
        let encoder = LabelEncoder::fit(["NYY", "BOS"]);
        let matrix = prepare_inference(&filled_games(), &encoder, false).unwrap();
        assert!(matrix.labels.is_none());
        assert_eq!(matrix.n_rows(), 3);
    }

    #[test]
    fn missing_label_is_an_error() {
        let mut table = filled_games();
        table
            .push_column(Column::boolean("home_team_win", vec![Some(true), None, Some(true)]))
            .unwrap();
        assert!(matches!(
            prepare_training(&table, false),
            Err(Error::MissingLabel(1))
        ));
    }

    #[test]
    fn string_leftover_is_unsupported() {
        let mut table = filled_games();
        table
            .push_column(Column::string("venue", vec![Some("x"); 3]))
            .unwrap();
        assert!(matches!(
            prepare_training(&table, false),
            Err(Error::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let matrix = FeatureMatrix {
            feature_names: vec!["x".into()],
            rows: (0..10).map(|i| vec![i as f64]).collect(),
            labels: Some((0..10).map(|i| (i % 2) as u8).collect()),
        };
        let (train, test) = matrix.train_test_split(0.2, 64);
        assert_eq!(train.n_rows(), 8);
        assert_eq!(test.n_rows(), 2);

        let (train_again, _) = matrix.train_test_split(0.2, 64);
        assert_eq!(train, train_again);

        let mut seen: Vec<f64> = train.rows.iter().chain(&test.rows).map(|r| r[0]).collect();
        seen.sort_by(f64::total_cmp);
        assert_eq!(seen, (0..10).map(|i| i as f64).collect::<Vec<_>>());
        for (row, label) in train.rows.iter().zip(train.labels.as_ref().unwrap()) {
            assert_eq!((row[0] as u8) % 2, *label);
        }
    }

    #[test]
    fn csv_output_has_label_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let (matrix, _) = prepare_training(&filled_games(), false).unwrap();
        matrix.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("is_night_game,season,home_runs_mean,away_runs_mean,abbr_home_team,abbr_away_team,home_team_win")
        );
        assert_eq!(lines.nth(2), Some("1,2021,,1,1,0,0"));
    }
}
