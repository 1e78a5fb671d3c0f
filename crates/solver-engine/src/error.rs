//! Error types for parsing and evaluation

use thiserror::Error;

/// Errors produced while tokenizing or parsing expression text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Input ended where more tokens were expected
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A token appeared where it is not allowed
    #[error("expected {expected}, got '{got}'")]
    UnexpectedToken { expected: String, got: String },

    /// A numeric literal could not be parsed
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// A character outside the expression grammar
    #[error("unexpected character '{ch}' at position {pos}")]
    UnknownCharacter { ch: char, pos: usize },

    /// A known function was called with the wrong number of arguments
    #[error("{name} expects {expected} argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Malformed Integral/Derivative arguments
    #[error("{0}")]
    InvalidCalculusArgs(String),
}

/// Errors produced while evaluating a parsed expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Numeric evaluation reached an unbound variable
    #[error("expression contains free symbol '{0}'")]
    FreeSymbol(String),

    /// A function call the engine cannot evaluate
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// An operation outside the engine's capabilities
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Overflow, division by zero, or domain error
    #[error("evaluation did not produce a finite number")]
    NotFinite,
}

/// Top-level error for [`crate::solve`]
///
/// The HTTP transport maps [`SolveError::EmptyExpression`] and
/// [`SolveError::Parse`] to client errors (400) and [`SolveError::Eval`]
/// to server errors (500).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// Input was empty after trimming
    #[error("expression is empty")]
    EmptyExpression,

    /// Input could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The parsed expression could not be evaluated
    #[error(transparent)]
    Eval(#[from] EvalError),
}
