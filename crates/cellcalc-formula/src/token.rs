//! Formula token types

use std::fmt;

use cellcalc_core::is_valid_cell_label;

use crate::error::FormulaResult;
use crate::lexer::tokenize;

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Parse an operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    /// The operator's symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// Binding strength: `*` and `/` bind tighter than `+` and `-`
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One classified unit of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Reference to another cell, by label
    CellRef(String),
    /// Binary operator
    Operator(Operator),
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// Text that is none of the above
    Unknown(String),
}

impl Token {
    /// Classify one raw token
    ///
    /// # Example
    /// ```rust
    /// use cellcalc_formula::{Operator, Token};
    ///
    /// assert_eq!(Token::classify("2.5"), Token::Number(2.5));
    /// assert_eq!(Token::classify("A1"), Token::CellRef("A1".into()));
    /// assert_eq!(Token::classify("*"), Token::Operator(Operator::Multiply));
    /// assert_eq!(Token::classify("?"), Token::Unknown("?".into()));
    /// ```
    pub fn classify(text: &str) -> Self {
        match text {
            "(" => return Token::LeftParen,
            ")" => return Token::RightParen,
            _ => {}
        }

        if let Some(op) = Operator::from_symbol(text) {
            Token::Operator(op)
        } else if let Some(n) = parse_number(text) {
            Token::Number(n)
        } else if is_valid_cell_label(text) {
            Token::CellRef(text.to_string())
        } else {
            Token::Unknown(text.to_string())
        }
    }

    /// Check if this is one of the four operators
    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Operator(_))
    }

    /// The numeric value of a number token
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The label of a cell-reference token
    pub fn as_cell_ref(&self) -> Option<&str> {
        match self {
            Token::CellRef(label) => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::CellRef(label) => f.write_str(label),
            Token::Operator(op) => write!(f, "{}", op),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Unknown(text) => f.write_str(text),
        }
    }
}

/// Numeric literal parsing; the spelled-out `inf` and `NaN` forms are not
/// numbers here
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// An ordered sequence of classified tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formula {
    tokens: Vec<Token>,
}

impl Formula {
    /// Classify a sequence of raw tokens
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|t| Token::classify(t.as_ref())).collect()
    }

    /// Lex and classify formula text (a leading `=` is optional)
    pub fn parse(text: &str) -> FormulaResult<Self> {
        Ok(Self::from_raw(tokenize(text)?))
    }

    /// The classified tokens
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the formula has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Labels of every cell this formula refers to, in order of appearance
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(Token::as_cell_ref)
    }
}

impl FromIterator<Token> for Formula {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl AsRef<[Token]> for Formula {
    fn as_ref(&self) -> &[Token] {
        &self.tokens
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}
