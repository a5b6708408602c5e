//! # cellcalc-core
//!
//! Core data structures for the cellcalc formula engine.
//!
//! This crate provides the types shared by the evaluator and its host:
//! - [`CellAddress`] - A1-style cell addressing and label validation
//! - [`Cell`] - A stored cell record (formula tokens, value, error)
//! - [`CellError`] - The error classification attached to a cell
//! - [`CellStore`] - Read-only lookup of cells by label
//! - [`Sheet`] - An in-memory [`CellStore`]
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_core::{CellStore, Sheet};
//!
//! let mut sheet = Sheet::new();
//! sheet.set_formula("A1", ["2", "+", "3"]).unwrap();
//!
//! let cell = sheet.cell("A1").unwrap();
//! assert_eq!(cell.formula(), ["2", "+", "3"]);
//! ```

pub mod cell;
pub mod error;
pub mod sheet;

// Re-exports for convenience
pub use cell::{is_valid_cell_label, Cell, CellAddress, CellError, CellStore};
pub use error::{Error, Result};
pub use sheet::Sheet;

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;
