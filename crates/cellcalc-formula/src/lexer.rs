//! Formula lexer
//!
//! Splits formula text into raw token strings. Classification into
//! [`Token`](crate::Token)s happens separately, so a lexed formula can be
//! stored verbatim in a cell.

use crate::error::{FormulaError, FormulaResult};

/// Split formula text into raw tokens
///
/// A leading `=` is optional and whitespace between tokens is ignored.
///
/// # Example
/// ```rust
/// use cellcalc_formula::tokenize;
///
/// let tokens = tokenize("=(A1 + 2.5) * 3").unwrap();
/// assert_eq!(tokens, ["(", "A1", "+", "2.5", ")", "*", "3"]);
/// ```
pub fn tokenize(formula: &str) -> FormulaResult<Vec<String>> {
    let formula = formula.trim();
    let formula = formula.strip_prefix('=').unwrap_or(formula);

    let mut lexer = Lexer::new(formula);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token.to_string());
    }
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> FormulaResult<Option<&'a str>> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(None);
        };
        let start = self.pos;

        match c {
            '+' | '-' | '*' | '/' | '(' | ')' => self.advance(),
            c if c.is_ascii_digit() || c == '.' => self.scan_number(),
            c if c.is_ascii_alphabetic() => {
                self.advance_while(|c| c.is_ascii_alphanumeric());
            }
            found => {
                return Err(FormulaError::Lex {
                    position: start,
                    found,
                })
            }
        }

        let input = self.input;
        Ok(Some(&input[start..self.pos]))
    }

    fn scan_number(&mut self) {
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        // Exponent only when digits follow, so "2E" stays a malformed number
        // instead of swallowing a label
        let rest = &self.input[self.pos..];
        let mut chars = rest.chars();
        if matches!(chars.next(), Some('e' | 'E')) {
            let mut exponent_len = 1;
            let mut next = chars.next();
            if matches!(next, Some('+' | '-')) {
                exponent_len += 1;
                next = chars.next();
            }
            if next.is_some_and(|c| c.is_ascii_digit()) {
                self.pos += exponent_len;
                self.advance_while(|c| c.is_ascii_digit());
            }
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}
