//! Numeric evaluation of constant expressions

use crate::ast::Expr;
use crate::calculus;
use crate::error::EvalError;

/// Evaluate a constant expression to a finite f64
pub fn eval(expr: &Expr) -> Result<f64, EvalError> {
    let value = eval_inner(expr)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NotFinite)
    }
}

fn eval_inner(expr: &Expr) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Constant(c) => Ok(c.value()),
        Expr::Symbol(name) => Err(EvalError::FreeSymbol(name.clone())),
        Expr::Add(a, b) => Ok(eval_inner(a)? + eval_inner(b)?),
        Expr::Sub(a, b) => Ok(eval_inner(a)? - eval_inner(b)?),
        Expr::Mul(a, b) => Ok(eval_inner(a)? * eval_inner(b)?),
        Expr::Div(a, b) => Ok(eval_inner(a)? / eval_inner(b)?),
        Expr::Pow(a, b) => Ok(eval_inner(a)?.powf(eval_inner(b)?)),
        Expr::Function { name, args } => eval_function(name, args),
        // Nested calculus nodes are carried out, then evaluated
        Expr::Integral { .. } | Expr::Derivative { .. } => {
            let done = calculus::doit(expr)?;
            eval_inner(&done)
        }
        Expr::Tuple(_) => Err(EvalError::Unsupported(
            "tuples cannot be evaluated".to_string(),
        )),
    }
}

fn eval_function(name: &str, args: &[Expr]) -> Result<f64, EvalError> {
    let arg = match args {
        [single] => eval_inner(single)?,
        _ => return Err(EvalError::UnknownFunction(name.to_string())),
    };

    match name {
        "sin" => Ok(arg.sin()),
        "cos" => Ok(arg.cos()),
        "tan" => Ok(arg.tan()),
        "exp" => Ok(arg.exp()),
        // log is natural log, SymPy convention
        "ln" | "log" => Ok(arg.ln()),
        "sqrt" => Ok(arg.sqrt()),
        "abs" => Ok(arg.abs()),
        other => Err(EvalError::UnknownFunction(other.to_string())),
    }
}

/// Render a value with 15 significant digits, SymPy `evalf` style
///
/// Positional notation (`4.00000000000000`, `0.500000000000000`) inside a
/// reasonable exponent range, scientific (`1.00000000000000e+20`) outside.
pub fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let formatted = format!("{:.14e}", value.abs());

    let Some((mantissa, exp_text)) = formatted.split_once('e') else {
        return format!("{value}");
    };
    let Ok(exp) = exp_text.parse::<i32>() else {
        return format!("{value}");
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (0..=14).contains(&exp) {
        let split = (exp + 1) as usize;
        format!("{sign}{}.{}", &digits[..split], &digits[split..])
    } else if (-4..0).contains(&exp) {
        let zeros = "0".repeat((-exp - 1) as usize);
        format!("{sign}0.{zeros}{digits}")
    } else {
        let exp_sign = if exp < 0 { "-" } else { "+" };
        format!(
            "{sign}{}.{}e{exp_sign}{}",
            &digits[..1],
            &digits[1..],
            exp.abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_text(input: &str) -> f64 {
        eval(&parse(input).unwrap()).unwrap()
    }

    #[test]
    fn evaluates_arithmetic() {
        assert_eq!(eval_text("2+2"), 4.0);
        assert_eq!(eval_text("2*3 + 4/2"), 8.0);
        assert_eq!(eval_text("2**10"), 1024.0);
    }

    #[test]
    fn evaluates_functions_and_constants() {
        assert!((eval_text("sin(pi)")).abs() < 1e-12);
        assert!((eval_text("ln(E)") - 1.0).abs() < 1e-12);
        assert_eq!(eval_text("sqrt(16)"), 4.0);
    }

    #[test]
    fn evaluates_nested_definite_integral() {
        // Integral(x, (x, 0, 1)) + 1 == 1.5
        let v = eval_text("Integral(x, (x, 0, 1)) + 1");
        assert!((v - 1.5).abs() < 1e-12);
    }

    #[test]
    fn free_symbol_is_error() {
        let err = eval(&parse("x + 1").unwrap()).unwrap_err();
        assert_eq!(err, EvalError::FreeSymbol("x".to_string()));
    }

    #[test]
    fn division_by_zero_is_not_finite() {
        let err = eval(&parse("1/0").unwrap()).unwrap_err();
        assert_eq!(err, EvalError::NotFinite);
    }

    #[test]
    fn unknown_function_is_error() {
        let err = eval(&parse("foo(2)").unwrap()).unwrap_err();
        assert_eq!(err, EvalError::UnknownFunction("foo".to_string()));
    }

    #[test]
    fn formats_fifteen_significant_digits() {
        assert_eq!(format_float(4.0), "4.00000000000000");
        assert_eq!(format_float(0.5), "0.500000000000000");
        assert_eq!(format_float(-2.5), "-2.50000000000000");
        assert_eq!(format_float(0.0), "0");
    }

    #[test]
    fn formats_two_pi() {
        assert_eq!(
            format_float(2.0 * std::f64::consts::PI),
            "6.28318530717959"
        );
    }

    #[test]
    fn formats_small_values_positionally() {
        assert_eq!(format_float(0.01), "0.0100000000000000");
        assert_eq!(format_float(0.0001), "0.000100000000000000");
    }

    #[test]
    fn formats_extreme_exponents_scientifically() {
        assert_eq!(format_float(1e20), "1.00000000000000e+20");
        assert_eq!(format_float(1e-5), "1.00000000000000e-5");
    }
}
