use super::model::{ColumnKind, Table};

/// Missing-value figures for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingStat {
    pub column: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub percentage: f64,
}

impl MissingStat {
    pub fn any_missing(&self) -> bool {
        self.missing > 0
    }
}

/// Missing counts per column, most-missing first. Ties keep table order.
pub fn missing_report(table: &Table) -> Vec<MissingStat> {
    let n_rows = table.n_rows();
    let mut report: Vec<MissingStat> = table
        .columns()
        .iter()
        .map(|col| {
            let missing = col.data.missing_count();
            let percentage = if n_rows == 0 {
                0.0
            } else {
                missing as f64 / n_rows as f64 * 100.0
            };
            MissingStat {
                column: col.name.clone(),
                kind: col.data.kind(),
                missing,
                percentage,
            }
        })
        .collect();
    report.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    report
}
