//! # cellcalc-formula
//!
//! Formula tokens and evaluation for cellcalc.
//!
//! This crate provides:
//! - Formula lexing (text → raw tokens)
//! - Token classification (raw tokens → [`Token`])
//! - Evaluation of a token sequence against a [`CellStore`](cellcalc_core::CellStore)
//! - Dependency tracking for recalculation order
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_core::Sheet;
//! use cellcalc_formula::{evaluate, Formula};
//!
//! let formula = Formula::parse("=(3+4)*2").unwrap();
//! let outcome = evaluate(formula.tokens(), &Sheet::new());
//! assert_eq!(outcome.value(), 14.0);
//! assert!(outcome.error().is_none());
//! ```

pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod token;

pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, resolve_reference, EvaluationOutcome};
pub use lexer::tokenize;
pub use token::{Formula, Operator, Token};
