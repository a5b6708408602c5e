//! Formula evaluator
//!
//! Evaluates a classified token sequence with a two-stack machine: one stack
//! of values and one of pending operators and open parentheses. Evaluation
//! never fails outright; every problem is reported as a [`CellError`] next
//! to a defined numeric value.

use cellcalc_core::{CellError, CellStore};

use crate::token::{Operator, Token};

/// The result of evaluating one formula
///
/// Always a value paired with an optional error. Some errors keep a
/// meaningful value: a repaired formula still reports what it computed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutcome {
    value: f64,
    error: Option<CellError>,
}

impl EvaluationOutcome {
    /// A successful evaluation
    pub fn ok(value: f64) -> Self {
        Self { value, error: None }
    }

    /// A failed evaluation carrying the error's default value
    pub fn failed(error: CellError) -> Self {
        Self {
            value: error.default_value(),
            error: Some(error),
        }
    }

    /// An outcome with an explicit value and optional error
    pub fn new(value: f64, error: Option<CellError>) -> Self {
        Self { value, error }
    }

    /// The numeric result
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The error, if evaluation did not succeed cleanly
    pub fn error(&self) -> Option<&CellError> {
        self.error.as_ref()
    }

    /// Check if there is no error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Split into value and error
    pub fn into_parts(self) -> (f64, Option<CellError>) {
        (self.value, self.error)
    }
}

/// Evaluate a formula against a cell store
///
/// # Example
/// ```rust
/// use cellcalc_core::{CellError, Sheet};
/// use cellcalc_formula::{evaluate, Formula};
///
/// let sheet = Sheet::new();
///
/// let formula = Formula::from_raw(["3", "+", "4", "*", "2"]);
/// assert_eq!(evaluate(formula.tokens(), &sheet).value(), 11.0);
///
/// let formula = Formula::from_raw(["8", "/", "0"]);
/// let outcome = evaluate(formula.tokens(), &sheet);
/// assert_eq!(outcome.error(), Some(&CellError::DivideByZero));
/// assert_eq!(outcome.value(), f64::INFINITY);
/// ```
pub fn evaluate<S>(formula: &[Token], cells: &S) -> EvaluationOutcome
where
    S: CellStore + ?Sized,
{
    if formula.is_empty() {
        log::trace!("empty formula");
        return EvaluationOutcome::failed(CellError::EmptyFormula);
    }

    // A dangling trailing operator is dropped and evaluation goes on with
    // the error already flagged.
    let (tokens, repair) = match formula {
        [.., penultimate, last]
            if formula.len() > 3 && last.is_operator() && !penultimate.is_operator() =>
        {
            log::trace!("dropping trailing operator {}", last);
            (&formula[..formula.len() - 1], Some(CellError::InvalidFormula))
        }
        _ => (formula, None),
    };

    if matches!(tokens, [Token::LeftParen, Token::RightParen]) {
        log::trace!("empty parentheses");
        return EvaluationOutcome::failed(CellError::MissingParentheses);
    }

    // Only looks at the untruncated tail, so a repaired formula never hits it
    if repair.is_none() && ends_with_division_by_zero(tokens) {
        log::trace!("division by a literal zero");
        return EvaluationOutcome::failed(CellError::DivideByZero);
    }

    if !tokens
        .iter()
        .any(|t| matches!(t, Token::Number(_) | Token::CellRef(_)))
    {
        log::trace!("formula has no operands");
        return EvaluationOutcome::failed(CellError::InvalidFormula);
    }

    let mut machine = StackMachine::new(repair);

    for token in tokens {
        match token {
            Token::Number(n) => machine.values.push(*n),
            Token::CellRef(label) => match resolve_reference(label, cells) {
                Ok(value) => machine.values.push(value),
                Err(error) => {
                    log::debug!("reference {} resolved to {}", label, error);
                    return EvaluationOutcome::new(0.0, Some(error));
                }
            },
            Token::LeftParen => machine.operators.push(Pending::Group),
            Token::RightParen => machine.close_group(),
            Token::Operator(op) => machine.push_operator(*op),
            Token::Unknown(text) => {
                log::trace!("unknown token {:?}", text);
                return EvaluationOutcome::new(0.0, Some(CellError::InvalidFormula));
            }
        }
    }

    machine.drain();
    machine.finish(&tokens[0])
}

/// Resolve a cell reference to its value
///
/// A stored error propagates as-is, except that a referenced cell whose own
/// formula is empty reads as [`CellError::InvalidCell`]. Cells missing from
/// the store count as empty.
pub fn resolve_reference<S>(label: &str, cells: &S) -> Result<f64, CellError>
where
    S: CellStore + ?Sized,
{
    let Some(cell) = cells.cell(label) else {
        return Err(CellError::InvalidCell);
    };

    match cell.error() {
        Some(CellError::EmptyFormula) | None => {}
        Some(error) => return Err(error.clone()),
    }

    if cell.has_empty_formula() {
        return Err(CellError::InvalidCell);
    }

    Ok(cell.value())
}

fn ends_with_division_by_zero(tokens: &[Token]) -> bool {
    matches!(
        tokens,
        [.., Token::Operator(Operator::Divide), Token::Number(n)] if *n == 0.0
    )
}

/// Entry on the operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Operator(Operator),
    /// An open parenthesis
    Group,
}

impl Pending {
    fn precedence(&self) -> u8 {
        match self {
            Pending::Operator(op) => op.precedence(),
            Pending::Group => 0,
        }
    }
}

/// Per-call evaluation state
///
/// `error` holds the most recent problem; later problems overwrite earlier
/// ones and the machine keeps running on whatever is left on the stacks.
struct StackMachine {
    values: Vec<f64>,
    operators: Vec<Pending>,
    error: Option<CellError>,
}

impl StackMachine {
    fn new(error: Option<CellError>) -> Self {
        Self {
            values: Vec::new(),
            operators: Vec::new(),
            error,
        }
    }

    /// `)`: apply operators down to the matching `(`, then discard it
    fn close_group(&mut self) {
        while self
            .operators
            .last()
            .is_some_and(|top| *top != Pending::Group)
        {
            self.apply_top();
        }
        // no-op when there is no `(` left
        self.operators.pop();
    }

    fn push_operator(&mut self, op: Operator) {
        while self
            .operators
            .last()
            .is_some_and(|top| top.precedence() >= op.precedence())
        {
            self.apply_top();
        }
        self.operators.push(Pending::Operator(op));
    }

    fn drain(&mut self) {
        while !self.operators.is_empty() {
            self.apply_top();
        }
    }

    /// Pop one operator and its two operands, push the result
    ///
    /// Whatever was popped is lost when the step fails.
    fn apply_top(&mut self) {
        let pending = self.operators.pop();
        let rhs = self.values.pop();
        let lhs = self.values.pop();

        let (Some(pending), Some(lhs), Some(rhs)) = (pending, lhs, rhs) else {
            self.error = Some(CellError::InvalidOperator);
            return;
        };

        match pending {
            Pending::Operator(Operator::Add) => self.values.push(lhs + rhs),
            Pending::Operator(Operator::Subtract) => self.values.push(lhs - rhs),
            Pending::Operator(Operator::Multiply) => self.values.push(lhs * rhs),
            Pending::Operator(Operator::Divide) if rhs == 0.0 => {
                self.error = Some(CellError::DivideByZero);
            }
            Pending::Operator(Operator::Divide) => self.values.push(lhs / rhs),
            Pending::Group => self.error = Some(CellError::InvalidOperator),
        }
    }

    fn finish(self, first: &Token) -> EvaluationOutcome {
        match self.values.as_slice() {
            [value] if !value.is_nan() => EvaluationOutcome::new(*value, self.error),
            [_] => {
                let error = self.error.unwrap_or(CellError::InvalidFormula);
                let value = first.as_number().unwrap_or(f64::NAN);
                EvaluationOutcome::new(value, Some(error))
            }
            // any other count reports 0, even for a division failure
            _ => EvaluationOutcome::new(
                0.0,
                Some(self.error.unwrap_or(CellError::InvalidFormula)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Formula;
    use cellcalc_core::{Cell, Sheet};
    use pretty_assertions::assert_eq;

    fn eval_with(raw: &[&str], sheet: &Sheet) -> EvaluationOutcome {
        let formula = Formula::from_raw(raw);
        evaluate(formula.tokens(), sheet)
    }

    fn eval(raw: &[&str]) -> EvaluationOutcome {
        eval_with(raw, &Sheet::new())
    }

    fn sheet_with(label: &str, cell: Cell) -> Sheet {
        let mut sheet = Sheet::new();
        sheet.insert(label, cell).unwrap();
        sheet
    }

    #[test]
    fn test_evaluate_number() {
        assert_eq!(eval(&["42"]), EvaluationOutcome::ok(42.0));
        assert_eq!(eval(&["3.25"]), EvaluationOutcome::ok(3.25));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval(&["3", "+", "4"]), EvaluationOutcome::ok(7.0));
        assert_eq!(eval(&["10", "-", "3"]), EvaluationOutcome::ok(7.0));
        assert_eq!(eval(&["4", "*", "5"]), EvaluationOutcome::ok(20.0));
        assert_eq!(eval(&["20", "/", "8"]), EvaluationOutcome::ok(2.5));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval(&["3", "+", "4", "*", "2"]), EvaluationOutcome::ok(11.0));
        assert_eq!(
            eval(&["(", "3", "+", "4", ")", "*", "2"]),
            EvaluationOutcome::ok(14.0)
        );
        assert_eq!(
            eval(&["2", "+", "3", "*", "4", "-", "5"]),
            EvaluationOutcome::ok(9.0)
        );
    }

    #[test]
    fn test_evaluate_left_associative() {
        assert_eq!(eval(&["10", "-", "4", "-", "3"]), EvaluationOutcome::ok(3.0));
        assert_eq!(eval(&["24", "/", "4", "/", "3"]), EvaluationOutcome::ok(2.0));
        assert_eq!(
            eval(&["10", "-", "(", "4", "-", "3", ")"]),
            EvaluationOutcome::ok(9.0)
        );
    }

    #[test]
    fn test_evaluate_nested_parentheses() {
        assert_eq!(
            eval(&["(", "(", "1", "+", "2", ")", "*", "(", "3", "+", "4", ")", ")"]),
            EvaluationOutcome::ok(21.0)
        );
    }

    #[test]
    fn test_empty_formula() {
        assert_eq!(eval(&[]), EvaluationOutcome::failed(CellError::EmptyFormula));
        assert_eq!(eval(&[]).value(), 0.0);
    }

    #[test]
    fn test_missing_parentheses() {
        let outcome = eval(&["(", ")"]);
        assert_eq!(outcome.error(), Some(&CellError::MissingParentheses));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_divide_by_literal_zero_at_tail() {
        for raw in [
            &["1", "/", "0"][..],
            &["(", "1", "+", "2", ")", "/", "0"],
            &["/", "0"],
            &["5", "/", "0.0"],
        ] {
            let outcome = eval(raw);
            assert_eq!(outcome.error(), Some(&CellError::DivideByZero), "{raw:?}");
            assert_eq!(outcome.value(), f64::INFINITY);
        }
    }

    #[test]
    fn test_divide_by_computed_zero() {
        // the short value stack left by the failed division is reported
        // through the wrong-count path: the division error with value 0
        let outcome = eval(&["6", "/", "(", "3", "-", "3", ")"]);
        assert_eq!(outcome.error(), Some(&CellError::DivideByZero));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_divide_by_zero_mid_formula_keeps_running() {
        // 2/0 fails and drops both operands; evaluation continues with 1 + 3
        let outcome = eval(&["1", "2", "/", "0", "+", "3"]);
        assert_eq!(outcome.value(), 4.0);
        assert_eq!(outcome.error(), Some(&CellError::DivideByZero));
    }

    #[test]
    fn test_trailing_operator_is_repaired() {
        let outcome = eval(&["1", "+", "2", "+"]);
        assert_eq!(outcome.value(), 3.0);
        assert_eq!(outcome.error(), Some(&CellError::InvalidFormula));
    }

    #[test]
    fn test_repaired_formula_skips_tail_division_check() {
        // after dropping the "+" the tail is "/ 0", which is then caught by
        // the runtime check instead of the lexical one
        let outcome = eval(&["4", "/", "0", "+"]);
        assert_eq!(outcome.error(), Some(&CellError::DivideByZero));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_short_trailing_operator_is_not_repaired() {
        // three tokens or fewer are left alone
        let outcome = eval(&["1", "+", "+"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidOperator));
        let outcome = eval(&["1", "+"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidOperator));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_double_trailing_operator_is_not_repaired() {
        let outcome = eval(&["1", "+", "2", "*", "/"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidOperator));
    }

    #[test]
    fn test_no_operands() {
        for raw in [&["+"][..], &["(", "+", ")"], &["*", "*", "*", "*"], &["?"]] {
            let outcome = eval(raw);
            assert_eq!(outcome.error(), Some(&CellError::InvalidFormula), "{raw:?}");
            assert_eq!(outcome.value(), 0.0);
        }
    }

    #[test]
    fn test_unknown_token_aborts() {
        let outcome = eval(&["1", "+", "SUM"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidFormula));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_unbalanced_close_paren_is_ignored() {
        assert_eq!(eval(&["1", "+", "2", ")"]), EvaluationOutcome::ok(3.0));
        assert_eq!(eval(&[")", "5"]), EvaluationOutcome::ok(5.0));
    }

    #[test]
    fn test_unclosed_open_paren() {
        // the leftover "(" consumes the result during the drain
        let outcome = eval(&["(", "3", "+", "4"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidOperator));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_too_many_values() {
        let outcome = eval(&["1", "2"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidFormula));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_nan_result_reports_first_token() {
        let sheet = sheet_with("A1", Cell::with_result(["x"], f64::INFINITY, None));

        let outcome = eval_with(&["2", "*", "A1", "-", "A1"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::InvalidFormula));
        assert_eq!(outcome.value(), 2.0);

        let outcome = eval_with(&["A1", "-", "A1"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::InvalidFormula));
        assert!(outcome.value().is_nan());
    }

    #[test]
    fn test_cell_reference() {
        let sheet = sheet_with("A1", Cell::with_result(["2"], 2.0, None));
        assert_eq!(eval_with(&["A1", "+", "5"], &sheet), EvaluationOutcome::ok(7.0));
        assert_eq!(eval_with(&["a1", "*", "a1"], &sheet), EvaluationOutcome::ok(4.0));
    }

    #[test]
    fn test_reference_to_empty_formula() {
        let sheet = sheet_with("A1", Cell::new(Vec::<String>::new()));
        let outcome = eval_with(&["A1", "+", "5"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::InvalidCell));
        assert_eq!(outcome.value(), 0.0);

        // an empty cell that was itself evaluated carries EmptyFormula
        let sheet = sheet_with(
            "A1",
            Cell::with_result(Vec::<String>::new(), 0.0, Some(CellError::EmptyFormula)),
        );
        let outcome = eval_with(&["A1", "+", "5"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::InvalidCell));
    }

    #[test]
    fn test_reference_to_missing_cell() {
        let outcome = eval(&["B7", "+", "1"]);
        assert_eq!(outcome.error(), Some(&CellError::InvalidCell));
    }

    #[test]
    fn test_reference_error_propagates_verbatim() {
        let sheet = sheet_with(
            "A1",
            Cell::with_result(["x"], 9.0, Some(CellError::Other("Foo".into()))),
        );
        let outcome = eval_with(&["A1", "+", "5"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::Other("Foo".into())));
        assert_eq!(outcome.value(), 0.0);

        let sheet = sheet_with(
            "A1",
            Cell::with_result(["1", "/", "0"], f64::INFINITY, Some(CellError::DivideByZero)),
        );
        let outcome = eval_with(&["A1", "+", "5"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::DivideByZero));
        assert_eq!(outcome.value(), 0.0);
    }

    #[test]
    fn test_reference_error_stops_evaluation() {
        // the unknown token after the bad reference is never reached
        let sheet = sheet_with(
            "A1",
            Cell::with_result(["x"], 0.0, Some(CellError::CircularReference)),
        );
        let outcome = eval_with(&["A1", "+", "?"], &sheet);
        assert_eq!(outcome.error(), Some(&CellError::CircularReference));
    }

    #[test]
    fn test_only_references() {
        let mut sheet = Sheet::new();
        sheet.insert("A1", Cell::with_result(["1"], 1.0, None)).unwrap();
        sheet.insert("A2", Cell::with_result(["2"], 2.0, None)).unwrap();
        assert_eq!(eval_with(&["A1", "+", "A2"], &sheet), EvaluationOutcome::ok(3.0));
        assert_eq!(eval_with(&["A2"], &sheet), EvaluationOutcome::ok(2.0));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let sheet = sheet_with("A1", Cell::with_result(["2"], 2.0, None));
        let raw = ["(", "A1", "+", "4", ")", "*", "3", "/", "2"];
        let first = eval_with(&raw, &sheet);
        let second = eval_with(&raw, &sheet);
        assert_eq!(first, second);
        assert_eq!(first, EvaluationOutcome::ok(9.0));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = EvaluationOutcome::failed(CellError::DivideByZero);
        assert!(!outcome.is_ok());
        assert_eq!(
            outcome.into_parts(),
            (f64::INFINITY, Some(CellError::DivideByZero))
        );
        assert!(EvaluationOutcome::ok(1.0).is_ok());
    }
}
