use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use super::loader::EPOCH_DAYS_FROM_CE;
use super::model::{ColumnData, Table};

/// Persist a table.  Dispatch by extension: `.csv` or `.parquet` / `.pq`.
pub fn write_file(table: &Table, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    match ext.as_str() {
        "csv" => write_csv(table, path),
        "parquet" | "pq" => write_parquet(table, path),
        other => bail!("Unsupported output extension: .{other}"),
    }
    .with_context(|| format!("writing {}", path.display()))?;

    log::info!("wrote {} rows to {}", table.n_rows(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Missing values are empty fields; booleans are `True` / `False` so the
/// file reads back the same way in pandas.
fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;

    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|col| csv_field(&col.data, row))
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn csv_field(data: &ColumnData, row: usize) -> String {
    match data {
        ColumnData::Float(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
        ColumnData::Integer(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
        ColumnData::Bool(v) => match v[row] {
            Some(true) => "True".to_string(),
            Some(false) => "False".to_string(),
            None => String::new(),
        },
        ColumnData::String(v) => v[row].clone().unwrap_or_default(),
        ColumnData::Date(v) => v[row]
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

fn epoch_days(d: NaiveDate) -> i32 {
    chrono::Datelike::num_days_from_ce(&d) - EPOCH_DAYS_FROM_CE
}

fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(table.n_cols());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.n_cols());

    for col in table.columns() {
        let (data_type, array): (DataType, ArrayRef) = match &col.data {
            ColumnData::Float(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
            ColumnData::Integer(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
            ColumnData::Bool(v) => (DataType::Boolean, Arc::new(BooleanArray::from(v.clone()))),
            ColumnData::String(v) => (
                DataType::Utf8,
                Arc::new(StringArray::from(
                    v.iter().map(|s| s.as_deref()).collect::<Vec<_>>(),
                )),
            ),
            ColumnData::Date(v) => (
                DataType::Date32,
                Arc::new(Date32Array::from(
                    v.iter().map(|d| d.map(epoch_days)).collect::<Vec<_>>(),
                )),
            ),
        };
        fields.push(Field::new(col.name.as_str(), data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::Column;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::string("id", vec![Some("007"), Some("008")]),
            Column::integer("season", vec![Some(2021), None]),
            Column::date("date", vec![NaiveDate::from_ymd_opt(2021, 4, 1), None]),
            Column::boolean("is_night_game", vec![Some(false), None]),
            Column::float("home_runs_mean", vec![Some(4.25), None]),
        ])
        .unwrap()
    }

    #[test]
    fn csv_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("games.csv");
        let table = sample();
        write_file(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("id,season,date,is_night_game,home_runs_mean\n"));
        assert!(text.contains("007,2021,2021-04-01,False,4.25\n"));

        assert_eq!(load_file(&path).unwrap(), table);
    }

    #[test]
    fn parquet_without_rows_keeps_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        let table = Table::from_columns(vec![
            Column::string("id", vec![]),
            Column::integer("season", vec![]),
            Column::float("home_runs_mean", vec![]),
        ])
        .unwrap();
        write_file(&table, &path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.column_names(), vec!["id", "season", "home_runs_mean"]);
        assert!(loaded.is_empty());
        assert_eq!(loaded, table);
    }

    #[test]
    fn parquet_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.parquet");
        let table = sample();
        write_file(&table, &path).unwrap();
        assert_eq!(load_file(&path).unwrap(), table);
    }
}
