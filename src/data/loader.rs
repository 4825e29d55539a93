use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
    Int32Array, Int64Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, Column, ColumnData, ColumnKind, Table};
use super::schema;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a game table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one game per line (what pandas `to_csv` writes)
/// * `.json`    – `[{ "season": 2021, "home_team_abbr": "NYY", ... }, ...]`
/// * `.parquet` – flat columns of strings, ints, floats, bools, dates or timestamps
///
/// Schema conformance is not checked here beyond settling each column's type.
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::info!("loading {}", path.display());
    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Settle raw cells into typed columns. Known columns get their fixed kind,
/// the rest are inferred from their values.
fn build_table(columns: Vec<(String, Vec<Cell>)>) -> Result<Table> {
    let mut built = Vec::with_capacity(columns.len());
    for (name, cells) in columns {
        let kind = schema::known_kind(&name).unwrap_or_else(|| ColumnKind::infer(&cells));
        let data = ColumnData::from_cells(kind, &name, cells)?;
        built.push(Column::new(name, data));
    }
    Ok(Table::from_columns(built)?)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<(String, Vec<Cell>)> =
        headers.into_iter().map(|h| (h, Vec::new())).collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, (_, cells)) in columns.iter_mut().enumerate() {
            cells.push(Cell::text(record.get(col_idx).unwrap_or("")));
        }
    }

    build_table(columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// A key missing from a record is a missing value.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<(String, Vec<Cell>)> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !columns.iter().any(|(name, _)| name == key) {
                columns.push((key.clone(), vec![Cell::Null; i]));
            }
        }
        for (name, cells) in columns.iter_mut() {
            cells.push(obj.get(name.as_str()).map_or(Cell::Null, json_to_cell));
        }
    }

    build_table(columns)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::text(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per table column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), and by this crate's writer.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // Columns come from the file schema so a file without rows keeps them.
    let mut columns: Vec<(String, Vec<Cell>)> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, (name, cells)) in columns.iter_mut().enumerate() {
            let col = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                let cell = extract_cell(col, row)
                    .with_context(|| format!("Row {row}: failed to read '{name}'"))?;
                cells.push(cell);
            }
        }
    }

    build_table(columns)
}

// -- Parquet / Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::text(downcast::<StringArray>(col)?.value(row)),
        DataType::LargeUtf8 => Cell::text(col.as_string::<i64>().value(row)),
        DataType::Int32 => Cell::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Cell::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => Cell::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => Cell::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => Cell::Bool(downcast::<BooleanArray>(col)?.value(row)),
        DataType::Date32 => {
            let days = downcast::<Date32Array>(col)?.value(row);
            Cell::Date(date_from_epoch_days(days).context("date out of range")?)
        }
        DataType::Date64 => {
            let ms = downcast::<Date64Array>(col)?.value(row);
            Cell::Date(date_from_timestamp(ms, TimeUnit::Millisecond)?)
        }
        // pandas writes datetime64 columns as nanosecond timestamps. Only
        // the calendar day is kept, taken in UTC.
        DataType::Timestamp(unit, _) => {
            let value = match unit {
                TimeUnit::Second => downcast::<TimestampSecondArray>(col)?.value(row),
                TimeUnit::Millisecond => downcast::<TimestampMillisecondArray>(col)?.value(row),
                TimeUnit::Microsecond => downcast::<TimestampMicrosecondArray>(col)?.value(row),
                TimeUnit::Nanosecond => downcast::<TimestampNanosecondArray>(col)?.value(row),
            };
            Cell::Date(date_from_timestamp(value, *unit)?)
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}

fn date_from_timestamp(value: i64, unit: TimeUnit) -> Result<NaiveDate> {
    let datetime = match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
    };
    datetime
        .map(|dt| dt.date_naive())
        .with_context(|| format!("timestamp {value} ({unit:?}) out of range"))
}

/// Days since 1970-01-01, as Arrow's `Date32` stores them.
pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

pub(crate) const EPOCH_DAYS_FROM_CE: i32 = 719_163;
