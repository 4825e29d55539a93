//! Turning a filled game table into classifier input.
//!
//! ```text
//!   Table ──► diff (optional) ──► matrix: drop ids, label, encode teams
//!                                     │
//!                                     ▼
//!                              FeatureMatrix ──► train/test split, CSV
//! ```

pub mod diff;
pub mod encode;
pub mod matrix;

pub use encode::LabelEncoder;
pub use matrix::{prepare_inference, prepare_training, FeatureMatrix};
