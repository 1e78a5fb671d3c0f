//! Pratt parser building the expression tree from tokens

use crate::ast::{Constant, Expr, KNOWN_FUNCTIONS};
use crate::error::ParseError;
use crate::parser::tokens::{Operator, Token};

// Unary minus binds between Mul (20) and Pow (30), so -x**2 parses
// as -(x**2) rather than (-x)**2
const UNARY_PRECEDENCE: u8 = 25;

/// Parse a token stream into a single expression
pub(crate) fn parse_expression(tokens: &[Token]) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEnd);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr(0)?;

    if let Some(extra) = parser.current() {
        return Err(ParseError::UnexpectedToken {
            expected: "end of input".to_string(),
            got: extra.describe(),
        });
    }

    if matches!(expr, Expr::Tuple(_)) {
        return Err(ParseError::UnexpectedToken {
            expected: "an expression".to_string(),
            got: expr.to_string(),
        });
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect_right_paren(&mut self) -> Result<(), ParseError> {
        match self.current() {
            Some(Token::RightParen) => {
                self.advance();
                Ok(())
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "')'".to_string(),
                got: other.describe(),
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while let Some(token) = self.current() {
            let precedence = match token {
                Token::Operator(op) => op.precedence(),
                _ => break,
            };

            if precedence < min_precedence {
                break;
            }

            left = self.parse_infix(left, precedence)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().ok_or(ParseError::UnexpectedEnd)?.clone();

        match token {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }

            Token::Identifier(name) => {
                self.advance();

                if let Some(Token::LeftParen) = self.current() {
                    self.advance();
                    let args = self.parse_arguments()?;
                    self.expect_right_paren()?;
                    build_call(&name, args)
                } else {
                    Ok(match name.as_str() {
                        "pi" => Expr::Constant(Constant::Pi),
                        "E" => Expr::Constant(Constant::E),
                        _ => Expr::Symbol(name),
                    })
                }
            }

            Token::Operator(Operator::Sub) => {
                self.advance();
                let expr = self.parse_expr(UNARY_PRECEDENCE)?;
                Ok(Expr::neg(expr))
            }

            Token::Operator(Operator::Add) => {
                self.advance();
                self.parse_expr(UNARY_PRECEDENCE)
            }

            Token::LeftParen => {
                self.advance();
                let first = self.parse_expr(0)?;

                // A comma inside parentheses forms a tuple, used only as
                // Integral/Derivative variable specifications
                if let Some(Token::Comma) = self.current() {
                    let mut items = vec![first];
                    while let Some(Token::Comma) = self.current() {
                        self.advance();
                        items.push(self.parse_expr(0)?);
                    }
                    self.expect_right_paren()?;
                    Ok(Expr::Tuple(items))
                } else {
                    self.expect_right_paren()?;
                    Ok(first)
                }
            }

            other => Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                got: other.describe(),
            }),
        }
    }

    fn parse_infix(&mut self, left: Expr, precedence: u8) -> Result<Expr, ParseError> {
        let token = self.current().ok_or(ParseError::UnexpectedEnd)?.clone();

        match token {
            Token::Operator(op) => {
                self.advance();

                // Power is right associative, the rest left
                let next_precedence = if op == Operator::Pow {
                    precedence
                } else {
                    precedence + 1
                };

                let right = self.parse_expr(next_precedence)?;

                Ok(match op {
                    Operator::Add => Expr::add(left, right),
                    Operator::Sub => Expr::sub(left, right),
                    Operator::Mul => Expr::mul(left, right),
                    Operator::Div => Expr::div(left, right),
                    Operator::Pow => Expr::pow(left, right),
                })
            }

            other => Err(ParseError::UnexpectedToken {
                expected: "an operator".to_string(),
                got: other.describe(),
            }),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if let Some(Token::RightParen) = self.current() {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr(0)?);

            match self.current() {
                Some(Token::Comma) => self.advance(),
                Some(Token::RightParen) => break,
                Some(other) => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "',' or ')'".to_string(),
                        got: other.describe(),
                    });
                }
                None => return Err(ParseError::UnexpectedEnd),
            }
        }

        Ok(args)
    }
}

/// Build a function-call node, turning `Integral`/`integrate` and
/// `Derivative`/`diff` into explicit calculus nodes
fn build_call(name: &str, args: Vec<Expr>) -> Result<Expr, ParseError> {
    match name {
        "Integral" | "integrate" => build_integral(args),
        "Derivative" | "diff" => build_derivative(args),
        _ => {
            if KNOWN_FUNCTIONS.contains(&name) && args.len() != 1 {
                return Err(ParseError::WrongArity {
                    name: name.to_string(),
                    expected: 1,
                    got: args.len(),
                });
            }
            for arg in &args {
                if matches!(arg, Expr::Tuple(_)) {
                    return Err(ParseError::UnexpectedToken {
                        expected: "an expression".to_string(),
                        got: arg.to_string(),
                    });
                }
            }
            Ok(Expr::Function {
                name: name.to_string(),
                args,
            })
        }
    }
}

fn build_integral(mut args: Vec<Expr>) -> Result<Expr, ParseError> {
    if args.is_empty() || args.len() > 2 {
        return Err(ParseError::InvalidCalculusArgs(
            "Integral expects an integrand and an optional variable specification".to_string(),
        ));
    }

    let spec = if args.len() == 2 { args.pop() } else { None };
    let Some(integrand) = args.pop() else {
        return Err(ParseError::UnexpectedEnd);
    };

    let (var, bounds) = match spec {
        None => (infer_variable(&integrand, "integration")?, None),
        Some(Expr::Symbol(name)) => (name, None),
        Some(Expr::Tuple(items)) => {
            let mut items = items.into_iter();
            match (items.next(), items.next(), items.next(), items.next()) {
                (Some(Expr::Symbol(name)), Some(lower), Some(upper), None) => {
                    (name, Some(Box::new((lower, upper))))
                }
                _ => {
                    return Err(ParseError::InvalidCalculusArgs(
                        "Integral bounds must be written (variable, lower, upper)".to_string(),
                    ));
                }
            }
        }
        Some(other) => {
            return Err(ParseError::InvalidCalculusArgs(format!(
                "invalid integration variable '{other}'"
            )));
        }
    };

    Ok(Expr::Integral {
        integrand: Box::new(integrand),
        var,
        bounds,
    })
}

fn build_derivative(mut args: Vec<Expr>) -> Result<Expr, ParseError> {
    if args.is_empty() || args.len() > 3 {
        return Err(ParseError::InvalidCalculusArgs(
            "Derivative expects an expression, an optional variable, and an optional order"
                .to_string(),
        ));
    }

    let mut order = 1u32;
    if args.len() == 3 {
        match args.pop().and_then(|arg| arg.as_number()) {
            Some(n) if n.fract() == 0.0 && n >= 1.0 && n <= u32::MAX as f64 => {
                order = n as u32;
            }
            _ => {
                return Err(ParseError::InvalidCalculusArgs(
                    "derivative order must be a positive integer".to_string(),
                ));
            }
        }
    }

    let spec = if args.len() == 2 { args.pop() } else { None };
    let Some(inner) = args.pop() else {
        return Err(ParseError::UnexpectedEnd);
    };

    let var = match spec {
        None => infer_variable(&inner, "differentiation")?,
        Some(Expr::Symbol(name)) => name,
        Some(other) => {
            return Err(ParseError::InvalidCalculusArgs(format!(
                "invalid differentiation variable '{other}'"
            )));
        }
    };

    Ok(Expr::Derivative {
        inner: Box::new(inner),
        var,
        order,
    })
}

/// When the variable argument is omitted, use the body's single free
/// symbol; ambiguous or constant bodies are an error
fn infer_variable(body: &Expr, operation: &str) -> Result<String, ParseError> {
    let symbols = body.free_symbols();
    let mut iter = symbols.into_iter();
    match (iter.next(), iter.next()) {
        (Some(name), None) => Ok(name),
        _ => Err(ParseError::InvalidCalculusArgs(format!(
            "cannot infer the {operation} variable; specify it explicitly"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokens::tokenize;

    fn parse(input: &str) -> Result<Expr, ParseError> {
        parse_expression(&tokenize(input).unwrap())
    }

    #[test]
    fn parse_number() {
        assert_eq!(parse("3.14").unwrap(), Expr::Number(3.14));
    }

    #[test]
    fn parse_precedence() {
        // x + 2*3 groups the product
        match parse("x + 2*3").unwrap() {
            Expr::Add(left, right) => {
                assert!(matches!(*left, Expr::Symbol(_)));
                assert!(matches!(*right, Expr::Mul(_, _)));
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        // 2**3**2 == 2**(3**2)
        match parse("2**3**2").unwrap() {
            Expr::Pow(base, exp) => {
                assert_eq!(*base, Expr::Number(2.0));
                assert!(matches!(*exp, Expr::Pow(_, _)));
            }
            other => panic!("expected Pow, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_below_power() {
        // -x**2 == -(x**2)
        match parse("-x**2").unwrap() {
            Expr::Mul(sign, inner) => {
                assert_eq!(*sign, Expr::Number(-1.0));
                assert!(matches!(*inner, Expr::Pow(_, _)));
            }
            other => panic!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn parse_indefinite_integral() {
        let expr = parse("Integral(x**2, x)").unwrap();
        match expr {
            Expr::Integral { var, bounds, .. } => {
                assert_eq!(var, "x");
                assert!(bounds.is_none());
            }
            other => panic!("expected Integral, got {other:?}"),
        }
    }

    #[test]
    fn parse_definite_integral() {
        let expr = parse("Integral(x**2, (x, 0, 1))").unwrap();
        match expr {
            Expr::Integral { var, bounds, .. } => {
                assert_eq!(var, "x");
                let bounds = bounds.expect("definite");
                assert_eq!(bounds.0, Expr::Number(0.0));
                assert_eq!(bounds.1, Expr::Number(1.0));
            }
            other => panic!("expected Integral, got {other:?}"),
        }
    }

    #[test]
    fn parse_derivative_with_order() {
        let expr = parse("Derivative(x**3, x, 2)").unwrap();
        match expr {
            Expr::Derivative { var, order, .. } => {
                assert_eq!(var, "x");
                assert_eq!(order, 2);
            }
            other => panic!("expected Derivative, got {other:?}"),
        }
    }

    #[test]
    fn integral_variable_is_inferred() {
        let expr = parse("integrate(y**2)").unwrap();
        match expr {
            Expr::Integral { var, .. } => assert_eq!(var, "y"),
            other => panic!("expected Integral, got {other:?}"),
        }
    }

    #[test]
    fn dangling_operator_is_error() {
        let err = parse("2+*").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(parse("2 2").is_err());
    }

    #[test]
    fn bare_tuple_is_rejected() {
        assert!(parse("(1, 2)").is_err());
    }

    #[test]
    fn wrong_arity_for_known_function() {
        let err = parse("sin(x, y)").unwrap_err();
        assert!(matches!(err, ParseError::WrongArity { .. }));
    }
}
