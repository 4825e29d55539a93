use rand::Rng;

use crate::data::model::Table;
use crate::data::select;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFill {
    /// Share of `true` among the observed values; `None` when nothing was
    /// observed, in which case no gaps are filled.
    pub true_ratio: Option<f64>,
    pub filled: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeanFill {
    /// Columns that had gaps, with the table-wide mean written into them.
    pub filled: Vec<(String, f64)>,
    /// Columns with no values at all; left missing.
    pub all_missing: Vec<String>,
}

/// Fill gaps in a boolean column by independent draws that come up `true`
/// with the column's observed true-ratio.
pub fn fill_indicator<R: Rng + ?Sized>(
    table: &mut Table,
    column: &str,
    rng: &mut R,
) -> Result<IndicatorFill> {
    let values = table.bools_mut(column)?;

    let observed = values.iter().flatten().count();
    if observed == 0 {
        log::warn!("{column}: no observed values, gaps left missing");
        return Ok(IndicatorFill::default());
    }
    let true_ratio = values.iter().flatten().filter(|&&b| b).count() as f64 / observed as f64;

    let mut filled = 0;
    for value in values.iter_mut().filter(|v| v.is_none()) {
        *value = Some(rng.gen_bool(true_ratio));
        filled += 1;
    }

    log::info!("{column}: drew {filled} values at true-ratio {true_ratio:.3}");
    Ok(IndicatorFill {
        true_ratio: Some(true_ratio),
        filled,
    })
}

/// Replace every remaining gap in a float column with that column's mean
/// over the whole table.
pub fn fill_float_means(table: &mut Table) -> Result<MeanFill> {
    let mut outcome = MeanFill::default();

    for name in select::float_columns_with_gaps(table) {
        let values = table.floats_mut(&name)?;
        let (sum, count) = values
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            log::warn!("{name}: no values to average, left missing");
            outcome.all_missing.push(name);
            continue;
        }
        let mean = sum / count as f64;
        for value in values.iter_mut().filter(|v| v.is_none()) {
            *value = Some(mean);
        }
        outcome.filled.push((name, mean));
    }

    log::info!(
        "mean fill: {} columns filled, {} with no values",
        outcome.filled.len(),
        outcome.all_missing.len()
    );
    Ok(outcome)
}

/// Remove the named columns that exist; returns the ones removed.
pub fn drop_columns(table: &mut Table, names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            let dropped = table.drop_column(name).is_some();
            if !dropped {
                log::debug!("{name}: not present, nothing to drop");
            }
            dropped
        })
        .cloned()
        .collect()
}
