//! Cell error values

use std::fmt;

/// Error classification attached to a cell after evaluation
///
/// Every kind carries a default numeric result ([`CellError::default_value`]),
/// so an errored cell still has a well-defined value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #EMPTY! - The formula has no tokens
    EmptyFormula,
    /// #ERR! - The token sequence does not form an expression
    InvalidFormula,
    /// #PAREN! - A parenthesis pair with nothing inside
    MissingParentheses,
    /// #DIV/0! - Division by zero
    DivideByZero,
    /// #REF! - Reference to a cell without a formula
    InvalidCell,
    /// #OP! - An operator without enough operands
    InvalidOperator,
    /// #CIRC! - The cell takes part in a reference cycle
    CircularReference,
    /// Error text that did not originate here, kept verbatim
    Other(String),
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &str {
        match self {
            CellError::EmptyFormula => "#EMPTY!",
            CellError::InvalidFormula => "#ERR!",
            CellError::MissingParentheses => "#PAREN!",
            CellError::DivideByZero => "#DIV/0!",
            CellError::InvalidCell => "#REF!",
            CellError::InvalidOperator => "#OP!",
            CellError::CircularReference => "#CIRC!",
            CellError::Other(text) => text,
        }
    }

    /// Parse an error string
    ///
    /// The empty string means "no error". Unknown text is kept as
    /// [`CellError::Other`].
    pub fn parse(s: &str) -> Option<Self> {
        let error = match s {
            "" => return None,
            "#EMPTY!" => CellError::EmptyFormula,
            "#ERR!" => CellError::InvalidFormula,
            "#PAREN!" => CellError::MissingParentheses,
            "#DIV/0!" => CellError::DivideByZero,
            "#REF!" => CellError::InvalidCell,
            "#OP!" => CellError::InvalidOperator,
            "#CIRC!" => CellError::CircularReference,
            other => CellError::Other(other.to_string()),
        };
        Some(error)
    }

    /// The numeric result reported alongside this error
    pub fn default_value(&self) -> f64 {
        match self {
            CellError::DivideByZero => f64::INFINITY,
            _ => 0.0,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CellError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CellError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        CellError::parse(&text)
            .ok_or_else(|| serde::de::Error::custom("empty error text is not an error"))
    }
}
