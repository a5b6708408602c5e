//! Cell records and the store lookup trait

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::CellError;

/// Complete data for a single cell
///
/// The formula is kept as the raw token text it was entered with; value and
/// error hold the outcome of the last evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    #[cfg_attr(feature = "serde", serde(default))]
    formula: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default, with = "value_serde"))]
    value: f64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    error: Option<CellError>,
}

impl Cell {
    /// Create a cell holding a formula that has not been evaluated yet
    pub fn new<I, S>(formula: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formula: formula.into_iter().map(Into::into).collect(),
            value: 0.0,
            error: None,
        }
    }

    /// Create a cell with an already known value and error
    pub fn with_result<I, S>(formula: I, value: f64, error: Option<CellError>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cell = Self::new(formula);
        cell.set_result(value, error);
        cell
    }

    /// The raw formula tokens (empty when the cell has no formula)
    pub fn formula(&self) -> &[String] {
        &self.formula
    }

    /// The last evaluated value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The last evaluation error, if any
    pub fn error(&self) -> Option<&CellError> {
        self.error.as_ref()
    }

    /// Check if the cell has no formula tokens
    pub fn has_empty_formula(&self) -> bool {
        self.formula.is_empty()
    }

    /// Store an evaluation outcome, leaving the formula untouched
    pub fn set_result(&mut self, value: f64, error: Option<CellError>) {
        self.value = value;
        self.error = error;
    }

    /// Replace the formula and reset the stored outcome
    pub fn set_formula<I, S>(&mut self, formula: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self = Self::new(formula);
    }
}

/// JSON has no infinity or NaN, so non-finite values travel as `"inf"`,
/// `"-inf"` and `"NaN"`
#[cfg(feature = "serde")]
mod value_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(text) => text
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid cell value '{}'", text))),
        }
    }
}

/// Read access to cells by label
///
/// Implementations return `None` for labels they hold no cell for; callers
/// treat that like a cell with an empty formula.
pub trait CellStore {
    /// Look up a cell by its label (e.g. "A1")
    fn cell(&self, label: &str) -> Option<&Cell>;
}

impl<T: CellStore + ?Sized> CellStore for &T {
    fn cell(&self, label: &str) -> Option<&Cell> {
        (**self).cell(label)
    }
}

impl<S: BuildHasher> CellStore for HashMap<String, Cell, S> {
    fn cell(&self, label: &str) -> Option<&Cell> {
        self.get(label)
    }
}

impl CellStore for BTreeMap<String, Cell> {
    fn cell(&self, label: &str) -> Option<&Cell> {
        self.get(label)
    }
}
