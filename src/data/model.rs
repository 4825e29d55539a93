use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Cell – a single value as read from a source file
// ---------------------------------------------------------------------------

/// A dynamically-typed value mirroring what a dataframe reader would see
/// before a column dtype is settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    /// A raw text field, kept as text until its column kind is settled.
    /// Empty text and `NaN` are `Null`.
    pub fn text(raw: &str) -> Cell {
        let s = raw.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") {
            Cell::Null
        } else {
            Cell::String(raw.to_string())
        }
    }

    /// Guess the type of a raw text field. Empty text is `Null`.
    pub fn guess(raw: &str) -> Cell {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(v) = s.parse::<f64>() {
            return Cell::Float(v);
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return Cell::Bool(s.eq_ignore_ascii_case("true"));
        }
        Cell::String(s.to_string())
    }

    /// `Null` and NaN floats both count as missing.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    fn into_float(self) -> std::result::Result<f64, Cell> {
        match self {
            Cell::Float(v) => Ok(v),
            Cell::Integer(i) => Ok(i as f64),
            Cell::String(s) => {
                let parsed = s.trim().parse::<f64>();
                parsed.map_err(|_| Cell::String(s))
            }
            other => Err(other),
        }
    }

    fn into_integer(self) -> std::result::Result<i64, Cell> {
        fn integral(v: f64) -> Option<i64> {
            (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
        }
        match self {
            Cell::Integer(i) => Ok(i),
            Cell::Float(v) => integral(v).ok_or(Cell::Float(v)),
            Cell::String(s) => {
                let t = s.trim();
                let parsed = t
                    .parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().and_then(integral));
                parsed.ok_or(Cell::String(s))
            }
            other => Err(other),
        }
    }

    fn into_bool(self) -> std::result::Result<bool, Cell> {
        match self {
            Cell::Bool(b) => Ok(b),
            Cell::Integer(0) => Ok(false),
            Cell::Integer(1) => Ok(true),
            Cell::Float(v) if v == 0.0 || v == 1.0 => Ok(v == 1.0),
            Cell::String(s) => {
                let t = s.trim();
                if t.eq_ignore_ascii_case("true") || t == "1" {
                    Ok(true)
                } else if t.eq_ignore_ascii_case("false") || t == "0" {
                    Ok(false)
                } else {
                    Err(Cell::String(s))
                }
            }
            other => Err(other),
        }
    }

    fn into_string(self) -> std::result::Result<String, Cell> {
        match self {
            Cell::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    /// Integers are epoch milliseconds, as pandas `to_json` writes dates.
    fn into_date(self) -> std::result::Result<NaiveDate, Cell> {
        match self {
            Cell::Date(d) => Ok(d),
            Cell::Integer(ms) => DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.date_naive())
                .ok_or(Cell::Integer(ms)),
            Cell::String(s) => parse_date(&s).ok_or(Cell::String(s)),
            other => Err(other),
        }
    }
}

/// Parse a calendar date, accepting a bare date or a date with a time part.
/// The time may carry fractional seconds and a trailing `Z`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    let s = s.strip_suffix('Z').unwrap_or(s);
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

// ---------------------------------------------------------------------------
// ColumnKind / ColumnData – typed storage for one column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Float,
    Integer,
    Bool,
    String,
    Date,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Float => "float",
            ColumnKind::Integer => "integer",
            ColumnKind::Bool => "bool",
            ColumnKind::String => "string",
            ColumnKind::Date => "date",
        };
        f.write_str(name)
    }
}

impl ColumnKind {
    /// Infer a column kind from its cells.
    ///
    /// A numeric column is only `Integer` when every row holds an integer;
    /// a single gap turns it into `Float`. A column with no values at all is
    /// `Float`.
    pub fn infer(cells: &[Cell]) -> ColumnKind {
        let present: Vec<Cell> = cells
            .iter()
            .map(|c| match c {
                Cell::String(s) => Cell::guess(s),
                other => other.clone(),
            })
            .filter(|c| !c.is_null())
            .collect();
        if present.is_empty() {
            return ColumnKind::Float;
        }
        if present.iter().all(|c| matches!(c, Cell::Bool(_))) {
            return ColumnKind::Bool;
        }
        if present.iter().all(|c| matches!(c, Cell::Date(_))) {
            return ColumnKind::Date;
        }
        if present
            .iter()
            .all(|c| matches!(c, Cell::Integer(_) | Cell::Float(_)))
        {
            let complete = present.len() == cells.len();
            if complete && present.iter().all(|c| matches!(c, Cell::Integer(_))) {
                return ColumnKind::Integer;
            }
            return ColumnKind::Float;
        }
        ColumnKind::String
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Bool(Vec<Option<bool>>),
    String(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    /// Settle raw cells into a typed column of `kind`.
    pub fn from_cells(kind: ColumnKind, column: &str, cells: Vec<Cell>) -> Result<Self> {
        fn settle<T>(
            column: &str,
            kind: ColumnKind,
            cells: Vec<Cell>,
            convert: fn(Cell) -> std::result::Result<T, Cell>,
        ) -> Result<Vec<Option<T>>> {
            cells
                .into_iter()
                .enumerate()
                .map(|(row, cell)| {
                    if cell.is_null() {
                        return Ok(None);
                    }
                    convert(cell).map(Some).map_err(|cell| Error::Coerce {
                        row,
                        column: column.to_string(),
                        value: cell.to_string(),
                        kind,
                    })
                })
                .collect()
        }

        Ok(match kind {
            ColumnKind::Float => ColumnData::Float(settle(column, kind, cells, Cell::into_float)?),
            ColumnKind::Integer => {
                ColumnData::Integer(settle(column, kind, cells, Cell::into_integer)?)
            }
            ColumnKind::Bool => ColumnData::Bool(settle(column, kind, cells, Cell::into_bool)?),
            ColumnKind::String => {
                ColumnData::String(settle(column, kind, cells, Cell::into_string)?)
            }
            ColumnKind::Date => ColumnData::Date(settle(column, kind, cells, Cell::into_date)?),
        })
    }

    /// An all-missing column of `len` rows.
    pub fn nulls(kind: ColumnKind, len: usize) -> Self {
        match kind {
            ColumnKind::Float => ColumnData::Float(vec![None; len]),
            ColumnKind::Integer => ColumnData::Integer(vec![None; len]),
            ColumnKind::Bool => ColumnData::Bool(vec![None; len]),
            ColumnKind::String => ColumnData::String(vec![None; len]),
            ColumnKind::Date => ColumnData::Date(vec![None; len]),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Bool(_) => ColumnKind::Bool,
            ColumnData::String(_) => ColumnKind::String,
            ColumnData::Date(_) => ColumnKind::Date,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::String(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Float(v) => v[row].is_none(),
            ColumnData::Integer(v) => v[row].is_none(),
            ColumnData::Bool(v) => v[row].is_none(),
            ColumnData::String(v) => v[row].is_none(),
            ColumnData::Date(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }

    /// Float and integer columns as `f64`s; `None` for other kinds.
    pub fn numeric(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnData::Float(v) => Some(v.clone()),
            ColumnData::Integer(v) => Some(v.iter().map(|x| x.map(|i| i as f64)).collect()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Column::new(name, ColumnData::Float(values))
    }

    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Column::new(name, ColumnData::Integer(values))
    }

    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Column::new(name, ColumnData::Bool(values))
    }

    pub fn string(name: impl Into<String>, values: Vec<Option<&str>>) -> Self {
        let owned = values.into_iter().map(|v| v.map(str::to_string)).collect();
        Column::new(name, ColumnData::String(owned))
    }

    pub fn date(name: impl Into<String>, values: Vec<Option<NaiveDate>>) -> Self {
        Column::new(name, ColumnData::Date(values))
    }
}

/// One game per row, columns in source order. Rows are never added or
/// removed once the table is built; columns may be added, replaced or dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |c| c.data.len());
        for column in &columns {
            if column.data.len() != n_rows {
                return Err(Error::RowCount {
                    column: column.name.clone(),
                    expected: n_rows,
                    actual: column.data.len(),
                });
            }
        }
        Ok(Table { columns, n_rows })
    }

    /// Number of rows (games).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Append a column, or replace the column of the same name in place.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.columns.is_empty() {
            self.n_rows = column.data.len();
        } else if column.data.len() != self.n_rows {
            return Err(Error::RowCount {
                column: column.name,
                expected: self.n_rows,
                actual: column.data.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Remove a column by name, returning it if it existed.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    fn lookup(&self, name: &str) -> Result<&ColumnData> {
        self.column(name)
            .map(|c| &c.data)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut ColumnData> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.data)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    fn kind_error(name: &str, expected: ColumnKind, data: &ColumnData) -> Error {
        Error::ColumnKind {
            column: name.to_string(),
            expected,
            actual: data.kind(),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.lookup(name)? {
            ColumnData::Float(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Float, other)),
        }
    }

    pub fn floats_mut(&mut self, name: &str) -> Result<&mut Vec<Option<f64>>> {
        match self.lookup_mut(name)? {
            ColumnData::Float(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Float, other)),
        }
    }

    pub fn integers(&self, name: &str) -> Result<&[Option<i64>]> {
        match self.lookup(name)? {
            ColumnData::Integer(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Integer, other)),
        }
    }

    pub fn integers_mut(&mut self, name: &str) -> Result<&mut Vec<Option<i64>>> {
        match self.lookup_mut(name)? {
            ColumnData::Integer(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Integer, other)),
        }
    }

    pub fn bools(&self, name: &str) -> Result<&[Option<bool>]> {
        match self.lookup(name)? {
            ColumnData::Bool(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Bool, other)),
        }
    }

    pub fn bools_mut(&mut self, name: &str) -> Result<&mut Vec<Option<bool>>> {
        match self.lookup_mut(name)? {
            ColumnData::Bool(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Bool, other)),
        }
    }

    pub fn strings(&self, name: &str) -> Result<&[Option<String>]> {
        match self.lookup(name)? {
            ColumnData::String(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::String, other)),
        }
    }

    pub fn dates(&self, name: &str) -> Result<&[Option<NaiveDate>]> {
        match self.lookup(name)? {
            ColumnData::Date(v) => Ok(v),
            other => Err(Self::kind_error(name, ColumnKind::Date, other)),
        }
    }
}
