//! Data layer: table model, schema knowledge, loading and persisting.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  raw cells → typed columns (schema kinds, inference)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  Vec<Column>, one game per row
//!   └──────────┘
//!        │   ◄── select: which columns each fill stage may touch
//!        ▼
//!   ┌──────────┐
//!   │  writer   │  Table → .csv / .parquet
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod schema;
pub mod select;
pub mod summary;
pub mod writer;
