//! Prelude module - common imports for cellcalc users
//!
//! ```rust
//! use cellcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Cell types
    Cell,
    CellAddress,
    CellError,
    // Traits
    CellStore,
    SheetCalculationExt,
    // Error types
    Error,
    Result,
    // Formula types
    evaluate,
    tokenize,
    EvaluationOutcome,
    Formula,
    Token,
    // Main types
    Sheet,
};
