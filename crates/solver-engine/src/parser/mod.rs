//! Expression text parsing
//!
//! Tokenizes the input and runs a Pratt parser over the token stream.
//! The grammar follows SymPy notation: `**` (or `^`) for powers,
//! function-call syntax for elementary functions, and
//! `Integral(f, x)` / `Integral(f, (x, a, b))` / `Derivative(f, x)`
//! for calculus operators.

mod pratt;
mod tokens;

use crate::ast::Expr;
use crate::error::ParseError;

/// Parse expression text into an [`Expr`]
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokens::tokenize(input)?;
    pratt::parse_expression(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let expr = parse("x**2 + 2*x + 1").unwrap();
        assert_eq!(expr.to_string(), "x**2 + 2*x + 1");
    }

    #[test]
    fn empty_input_is_error() {
        assert_eq!(parse("").unwrap_err(), ParseError::UnexpectedEnd);
    }
}
