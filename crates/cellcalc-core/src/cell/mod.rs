//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellError`] - The error classification stored with a cell
//! - [`Cell`] - A cell's formula, value and error
//! - [`CellStore`] - Lookup of cells by label

mod address;
mod storage;
mod value;

pub use address::{is_valid_cell_label, CellAddress};
pub use storage::{Cell, CellStore};
pub use value::CellError;
