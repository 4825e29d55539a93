use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::schema;

/// What to do with a composite team-season string that does not end in a
/// four-digit year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedSeasonPolicy {
    /// Treat the string as absent and try the next season source.
    #[default]
    FallThrough,
    /// Abort the whole run.
    Fail,
}

/// Knobs for the imputation pipeline. Every field has a default, so a JSON
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Substrings marking pitcher statistics, which are never imputed by
    /// team and season.
    pub excluded_markers: Vec<String>,
    /// Float columns skipped by the team/season imputer.
    pub excluded_columns: Vec<String>,
    /// Boolean column filled by weighted random draws.
    pub indicator_column: String,
    /// Columns removed once filling is done.
    pub drop_columns: Vec<String>,
    pub malformed_season: MalformedSeasonPolicy,
    /// Seed for the indicator draws; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            excluded_markers: vec!["pitcher".into(), "pitching".into()],
            excluded_columns: vec![
                schema::SEASON.into(),
                schema::HOME_TEAM_REST.into(),
                schema::AWAY_TEAM_REST.into(),
            ],
            indicator_column: schema::IS_NIGHT_GAME.into(),
            drop_columns: vec![
                schema::HOME_TEAM_SEASON.into(),
                schema::AWAY_TEAM_SEASON.into(),
            ],
            malformed_season: MalformedSeasonPolicy::default(),
            seed: None,
        }
    }
}

impl FillConfig {
    /// Read a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FillConfig =
            serde_json::from_str(r#"{ "malformed_season": "fail", "seed": 7 }"#).unwrap();
        assert_eq!(cfg.malformed_season, MalformedSeasonPolicy::Fail);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.indicator_column, "is_night_game");
        assert_eq!(cfg.excluded_markers, vec!["pitcher", "pitching"]);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fill.json");
        std::fs::write(&path, r#"{ "drop_columns": [] }"#).unwrap();
        let cfg = FillConfig::from_path(&path).unwrap();
        assert!(cfg.drop_columns.is_empty());
        assert_eq!(cfg.malformed_season, MalformedSeasonPolicy::FallThrough);
    }
}
