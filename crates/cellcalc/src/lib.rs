//! # cellcalc
//!
//! Spreadsheet formula evaluation.
//!
//! cellcalc evaluates the four arithmetic operators and parentheses over
//! numbers and cell references, reporting a [`CellError`] whenever a
//! formula cannot be evaluated cleanly.
//!
//! ## Features
//!
//! - Lexing and classification of formula tokens
//! - Stack-machine evaluation with operator precedence
//! - Cell reference resolution with error propagation
//! - Whole-sheet recalculation in dependency order with cycle detection
//!
//! ## Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_formula("A1", tokenize("=2").unwrap()).unwrap();
//! sheet.set_formula("B1", tokenize("=(A1+4)*3").unwrap()).unwrap();
//!
//! let stats = sheet.calculate();
//! assert_eq!(stats.cells_calculated, 2);
//! assert_eq!(sheet.cell("B1").unwrap().value(), 18.0);
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{CalculationOptions, CalculationStats, SheetCalculationExt};

// Re-export core types
pub use cellcalc_core::{
    is_valid_cell_label, Cell, CellAddress, CellError, CellStore, Error, Result, Sheet,
};

// Re-export formula types
pub use cellcalc_formula::{
    evaluate, resolve_reference, tokenize, EvaluationOutcome, Formula, FormulaError,
    FormulaResult, Operator, Token,
};
