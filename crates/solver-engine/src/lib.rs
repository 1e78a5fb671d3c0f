//! # solver-engine
//!
//! Symbolic mathematics engine behind the expression evaluation service.
//!
//! This crate provides:
//! - Expression parsing in SymPy-style notation
//! - Priority-ordered classification of parsed expressions
//! - Numeric evaluation, symbolic simplification, and calculus
//!   (differentiation and rule-based integration)
//!
//! The entry point is [`solve`], which applies the evaluation policy and
//! returns either the rendered result or a [`SolveError`] the transport
//! layer can map to a client or server error. The crate has no HTTP
//! dependency so the policy is testable on its own.

pub mod ast;
pub mod calculus;
pub mod error;
pub mod numeric;
pub mod parser;
pub mod simplify;

pub use ast::Expr;
pub use error::{EvalError, ParseError, SolveError};

/// Expression shape, in evaluation-priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprClass {
    /// Top-level node is an integral or derivative; carry it out
    Calculus,
    /// Pure number: no free symbols, only known functions
    Numeric,
    /// Contains at least one free symbol; simplify symbolically
    Symbolic,
    /// No free symbols but not recognized as numeric (e.g. an
    /// uninterpreted function over constants); numeric evaluation is
    /// attempted and may fail
    Other,
}

/// Classify a parsed expression
///
/// The checks are mutually exclusive and applied in priority order:
/// calculus operator first, then pure number, then symbolic, with a
/// numeric-evaluation fallback for everything else.
pub fn classify(expr: &Expr) -> ExprClass {
    match expr {
        Expr::Integral { .. } | Expr::Derivative { .. } => ExprClass::Calculus,
        _ if expr.is_constant() => ExprClass::Numeric,
        _ if !expr.free_symbols().is_empty() => ExprClass::Symbolic,
        _ => ExprClass::Other,
    }
}

/// Parse and evaluate expression text
///
/// Applies the four-branch evaluation policy:
/// 1. a top-level calculus operator is carried out and the result
///    rendered symbolically,
/// 2. a pure number is evaluated to a 15-significant-digit float string,
/// 3. an expression with free symbols is simplified and rendered,
/// 4. anything else falls back to numeric evaluation.
pub fn solve(input: &str) -> Result<String, SolveError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(SolveError::EmptyExpression);
    }

    let expr = parser::parse(text)?;

    let rendered = match classify(&expr) {
        ExprClass::Calculus => simplify::simplify(&calculus::doit(&expr)?).to_string(),
        ExprClass::Numeric | ExprClass::Other => numeric::format_float(numeric::eval(&expr)?),
        ExprClass::Symbolic => simplify::simplify(&expr).to_string(),
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_priority_order() {
        let integral = parser::parse("Integral(x**2, x)").unwrap();
        assert_eq!(classify(&integral), ExprClass::Calculus);

        let number = parser::parse("2 + 2").unwrap();
        assert_eq!(classify(&number), ExprClass::Numeric);

        let symbolic = parser::parse("x + 1").unwrap();
        assert_eq!(classify(&symbolic), ExprClass::Symbolic);

        // No free symbols, but not a recognized number either
        let opaque = parser::parse("f(2)").unwrap();
        assert_eq!(classify(&opaque), ExprClass::Other);
    }

    #[test]
    fn numeric_branch_formats_floats() {
        assert_eq!(solve("2+2").unwrap(), "4.00000000000000");
        assert_eq!(solve("1/2").unwrap(), "0.500000000000000");
        assert_eq!(solve("2*pi").unwrap(), "6.28318530717959");
    }

    #[test]
    fn symbolic_branch_simplifies() {
        assert_eq!(solve("x^2 + 2*x + 1").unwrap(), "x**2 + 2*x + 1");
        assert_eq!(solve("x + x").unwrap(), "2*x");
    }

    #[test]
    fn calculus_branch_carries_out_operators() {
        assert_eq!(solve("Integral(x**2, x)").unwrap(), "x**3/3");
        assert_eq!(solve("Integral(x**2, (x, 0, 1))").unwrap(), "1/3");
        assert_eq!(solve("Derivative(x**2, x)").unwrap(), "2*x");
    }

    #[test]
    fn fallback_branch_errors_on_opaque_functions() {
        assert!(matches!(
            solve("f(2)").unwrap_err(),
            SolveError::Eval(EvalError::UnknownFunction(_))
        ));
    }

    #[test]
    fn empty_input_is_a_client_error() {
        assert_eq!(solve("   ").unwrap_err(), SolveError::EmptyExpression);
    }

    #[test]
    fn malformed_syntax_is_a_parse_error() {
        assert!(matches!(solve("2+*").unwrap_err(), SolveError::Parse(_)));
    }

    #[test]
    fn evaluation_is_deterministic() {
        assert_eq!(solve("Integral(x**2, x)"), solve("Integral(x**2, x)"));
        assert_eq!(solve("sin(1) + cos(1)"), solve("sin(1) + cos(1)"));
    }
}
