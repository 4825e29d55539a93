//! Missing-value imputation for game tables.
//!
//! Stages run in this order, each mutating the table in place:
//! ```text
//!   season    resolve `season` from season → date → home/away team-season
//!      │
//!      ▼
//!   stats     per statistic column: same team, same side, same season mean
//!      │
//!      ▼
//!   residual  indicator draws → table-wide float means → drop columns
//! ```
//! The statistic stage reads `season`, so it must run after the resolver.

pub mod residual;
pub mod season;
pub mod stats;

use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::FillConfig;
use crate::data::loader;
use crate::data::model::Table;
use crate::data::select;
use crate::error::{Error, Result};

pub use residual::{IndicatorFill, MeanFill};
pub use season::{SeasonOutcome, SeasonSource};
pub use stats::StatFill;

/// Everything the pipeline did to one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    pub season: SeasonOutcome,
    pub stats: Vec<(String, StatFill)>,
    /// `None` when the indicator column is absent.
    pub indicator: Option<IndicatorFill>,
    pub means: MeanFill,
    pub dropped: Vec<String>,
}

/// Run every stage over `table`.
pub fn fill_table<R: Rng + ?Sized>(
    table: &mut Table,
    config: &FillConfig,
    rng: &mut R,
) -> Result<FillReport> {
    let season_outcome = season::resolve_seasons(table, config.malformed_season)?;

    let columns = select::team_stat_columns(table, config);
    log::info!("team stats: {} columns to fill", columns.len());
    let mut stat_fills = Vec::with_capacity(columns.len());
    for column in columns {
        let outcome = stats::fill_stat(table, &column)?;
        stat_fills.push((column, outcome));
    }

    let indicator = match residual::fill_indicator(table, &config.indicator_column, rng) {
        Ok(fill) => Some(fill),
        Err(Error::MissingColumn(name)) => {
            log::warn!("{name}: indicator column not present, skipped");
            None
        }
        Err(e) => return Err(e),
    };
    let means = residual::fill_float_means(table)?;
    let dropped = residual::drop_columns(table, &config.drop_columns);

    Ok(FillReport {
        season: season_outcome,
        stats: stat_fills,
        indicator,
        means,
        dropped,
    })
}

/// Random source for the indicator draws: seeded when the config has a seed.
pub fn rng_for(config: &FillConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Load a table from `path` and run the full pipeline over it.
pub fn load_and_fill(path: &Path, config: &FillConfig) -> anyhow::Result<(Table, FillReport)> {
    let mut table = loader::load_file(path)?;
    let mut rng = rng_for(config);
    let report = fill_table(&mut table, config, &mut rng)
        .with_context(|| format!("filling {}", path.display()))?;
    Ok((table, report))
}
