use super::model::ColumnKind;

// ---------------------------------------------------------------------------
// Column names the pipeline knows about
// ---------------------------------------------------------------------------

pub const ID: &str = "id";
pub const SEASON: &str = "season";
pub const DATE: &str = "date";
pub const HOME_TEAM_ABBR: &str = "home_team_abbr";
pub const AWAY_TEAM_ABBR: &str = "away_team_abbr";
pub const HOME_TEAM_SEASON: &str = "home_team_season";
pub const AWAY_TEAM_SEASON: &str = "away_team_season";
pub const HOME_PITCHER: &str = "home_pitcher";
pub const AWAY_PITCHER: &str = "away_pitcher";
pub const HOME_TEAM_REST: &str = "home_team_rest";
pub const AWAY_TEAM_REST: &str = "away_team_rest";
pub const IS_NIGHT_GAME: &str = "is_night_game";
pub const HOME_TEAM_WIN: &str = "home_team_win";

/// Columns whose kind is fixed regardless of what the values look like.
/// Everything else is inferred by the loader.
pub fn known_kind(column: &str) -> Option<ColumnKind> {
    match column {
        SEASON => Some(ColumnKind::Integer),
        DATE => Some(ColumnKind::Date),
        IS_NIGHT_GAME | HOME_TEAM_WIN => Some(ColumnKind::Bool),
        ID | HOME_TEAM_ABBR | AWAY_TEAM_ABBR | HOME_PITCHER | AWAY_PITCHER
        | HOME_TEAM_SEASON | AWAY_TEAM_SEASON => Some(ColumnKind::String),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Side – which team a statistic column describes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// Side of a statistic column, taken from its `home_` / `away_` prefix.
    pub fn of_column(column: &str) -> Option<Side> {
        if column.starts_with("home_") {
            Some(Side::Home)
        } else if column.starts_with("away_") {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Side::Home => "home_",
            Side::Away => "away_",
        }
    }

    /// Column holding this side's team abbreviation.
    pub fn team_column(self) -> &'static str {
        match self {
            Side::Home => HOME_TEAM_ABBR,
            Side::Away => AWAY_TEAM_ABBR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_comes_from_prefix_only() {
        assert_eq!(Side::of_column("home_stat_mean"), Some(Side::Home));
        assert_eq!(Side::of_column("away_stat_mean"), Some(Side::Away));
        assert_eq!(Side::of_column("stat_home_mean"), None);
        assert_eq!(Side::Away.team_column(), AWAY_TEAM_ABBR);
    }

    #[test]
    fn known_kinds() {
        assert_eq!(known_kind("season"), Some(ColumnKind::Integer));
        assert_eq!(known_kind("home_team_season"), Some(ColumnKind::String));
        assert_eq!(known_kind("home_batting_avg_mean"), None);
    }
}
