//! Calculus operators: differentiation and integration
//!
//! `doit` carries out a top-level `Integral`/`Derivative` node the way
//! SymPy's `doit()` forces an unevaluated operator. Integration is
//! rule-based (linearity, power rule, a table of elementary forms);
//! anything outside those rules is an evaluation error, surfaced by the
//! transport as a server error.

use crate::ast::Expr;
use crate::error::EvalError;
use crate::simplify::simplify;

/// Carry out a calculus node; non-calculus expressions pass through
pub fn doit(expr: &Expr) -> Result<Expr, EvalError> {
    match expr {
        Expr::Integral {
            integrand,
            var,
            bounds,
        } => {
            let antiderivative = integrate(&simplify(integrand), var)?;
            match bounds {
                None => Ok(simplify(&antiderivative)),
                Some(b) => {
                    let upper = antiderivative.substitute(var, &b.1);
                    let lower = antiderivative.substitute(var, &b.0);
                    Ok(simplify(&Expr::sub(upper, lower)))
                }
            }
        }
        Expr::Derivative { inner, var, order } => {
            let mut result = simplify(inner);
            for _ in 0..*order {
                result = differentiate(&result, var)?;
            }
            Ok(simplify(&result))
        }
        other => Ok(other.clone()),
    }
}

/// Differentiate `expr` with respect to `var`
pub fn differentiate(expr: &Expr, var: &str) -> Result<Expr, EvalError> {
    match expr {
        Expr::Number(_) | Expr::Constant(_) => Ok(Expr::Number(0.0)),
        Expr::Symbol(name) => Ok(Expr::Number(if name == var { 1.0 } else { 0.0 })),
        Expr::Add(a, b) => Ok(Expr::add(
            differentiate(a, var)?,
            differentiate(b, var)?,
        )),
        Expr::Sub(a, b) => Ok(Expr::sub(
            differentiate(a, var)?,
            differentiate(b, var)?,
        )),
        Expr::Mul(a, b) => {
            // Product rule
            let da = differentiate(a, var)?;
            let db = differentiate(b, var)?;
            Ok(Expr::add(
                Expr::mul(da, (**b).clone()),
                Expr::mul((**a).clone(), db),
            ))
        }
        Expr::Div(a, b) => {
            // Quotient rule
            let da = differentiate(a, var)?;
            let db = differentiate(b, var)?;
            let numerator = Expr::sub(
                Expr::mul(da, (**b).clone()),
                Expr::mul((**a).clone(), db),
            );
            let denominator = Expr::pow((**b).clone(), Expr::Number(2.0));
            Ok(Expr::div(numerator, denominator))
        }
        Expr::Pow(base, exp) => differentiate_power(base, exp, var),
        Expr::Function { name, args } => differentiate_function(name, args, var),
        Expr::Integral { .. } | Expr::Derivative { .. } => Err(EvalError::Unsupported(
            "cannot differentiate an unevaluated calculus operator".to_string(),
        )),
        Expr::Tuple(_) => Err(EvalError::Unsupported(
            "cannot differentiate a tuple".to_string(),
        )),
    }
}

fn differentiate_power(base: &Expr, exp: &Expr, var: &str) -> Result<Expr, EvalError> {
    let db = differentiate(base, var)?;

    if let Some(n) = exp.as_number() {
        // d/dx u**n == n * u**(n-1) * u'
        return Ok(Expr::mul(
            Expr::mul(
                Expr::Number(n),
                Expr::pow(base.clone(), Expr::Number(n - 1.0)),
            ),
            db,
        ));
    }

    if !exp.free_symbols().contains(var) {
        // Constant (symbolic) exponent behaves like the numeric case
        return Ok(Expr::mul(
            Expr::mul(
                exp.clone(),
                Expr::pow(
                    base.clone(),
                    Expr::sub(exp.clone(), Expr::Number(1.0)),
                ),
            ),
            db,
        ));
    }

    // General case: d/dx u**v == u**v * (v' * ln(u) + v * u'/u)
    let de = differentiate(exp, var)?;
    let term = Expr::add(
        Expr::mul(de, Expr::func("ln", base.clone())),
        Expr::mul(exp.clone(), Expr::div(db, base.clone())),
    );
    Ok(Expr::mul(
        Expr::pow(base.clone(), exp.clone()),
        term,
    ))
}

fn differentiate_function(name: &str, args: &[Expr], var: &str) -> Result<Expr, EvalError> {
    let arg = match args {
        [single] => single,
        _ => {
            return Err(EvalError::Unsupported(format!(
                "cannot differentiate '{name}'"
            )));
        }
    };
    let du = differentiate(arg, var)?;

    let outer = match name {
        "sin" => Expr::func("cos", arg.clone()),
        "cos" => Expr::neg(Expr::func("sin", arg.clone())),
        "tan" => Expr::div(
            Expr::Number(1.0),
            Expr::pow(Expr::func("cos", arg.clone()), Expr::Number(2.0)),
        ),
        "exp" => Expr::func("exp", arg.clone()),
        "ln" | "log" => Expr::div(Expr::Number(1.0), arg.clone()),
        "sqrt" => Expr::div(
            Expr::Number(1.0),
            Expr::mul(Expr::Number(2.0), Expr::func("sqrt", arg.clone())),
        ),
        other => {
            return Err(EvalError::Unsupported(format!(
                "cannot differentiate '{other}'"
            )));
        }
    };

    Ok(Expr::mul(outer, du))
}

/// Integrate `expr` with respect to `var`
///
/// Handles linearity, the power rule (including `1/x`), exponentials with
/// linear arguments, and sine/cosine with linear arguments. Everything
/// else is unsupported.
pub fn integrate(expr: &Expr, var: &str) -> Result<Expr, EvalError> {
    // Integrand independent of the variable: c dx == c*x
    if !expr.free_symbols().contains(var) {
        return Ok(Expr::mul(expr.clone(), Expr::symbol(var)));
    }

    match expr {
        Expr::Symbol(name) if name == var => Ok(Expr::div(
            Expr::pow(Expr::symbol(var), Expr::Number(2.0)),
            Expr::Number(2.0),
        )),
        Expr::Add(a, b) => Ok(Expr::add(integrate(a, var)?, integrate(b, var)?)),
        Expr::Sub(a, b) => Ok(Expr::sub(integrate(a, var)?, integrate(b, var)?)),
        Expr::Mul(a, b) => {
            // Pull constant factors out of the integral
            if !a.free_symbols().contains(var) {
                return Ok(Expr::mul((**a).clone(), integrate(b, var)?));
            }
            if !b.free_symbols().contains(var) {
                return Ok(Expr::mul((**b).clone(), integrate(a, var)?));
            }
            Err(EvalError::Unsupported(format!(
                "cannot integrate product '{expr}'"
            )))
        }
        Expr::Div(a, b) => {
            if !b.free_symbols().contains(var) {
                return Ok(Expr::div(integrate(a, var)?, (**b).clone()));
            }
            if !a.free_symbols().contains(var) {
                // c / u(x) with power-rule denominators; simplifying the
                // inverted power collapses (x**n)**(-1) to x**(-n) first
                let inverted = simplify(&Expr::pow((**b).clone(), Expr::Number(-1.0)));
                let integrated = integrate_power(&inverted, var)?;
                return Ok(Expr::mul((**a).clone(), integrated));
            }
            Err(EvalError::Unsupported(format!(
                "cannot integrate quotient '{expr}'"
            )))
        }
        Expr::Pow(..) => integrate_power(expr, var),
        Expr::Function { name, args } => integrate_function(name, args, var),
        other => Err(EvalError::Unsupported(format!(
            "cannot integrate '{other}'"
        ))),
    }
}

/// Power rule, after normalizing `u**(-1)`-style inputs
fn integrate_power(expr: &Expr, var: &str) -> Result<Expr, EvalError> {
    let (base, n) = match expr {
        Expr::Pow(base, exp) => match exp.as_number() {
            Some(n) => (base, n),
            None => {
                // a**x == a**x / ln(a) for constant base
                if !base.free_symbols().contains(var)
                    && **exp == Expr::Symbol(var.to_string())
                {
                    return Ok(Expr::div(
                        expr.clone(),
                        Expr::func("ln", (**base).clone()),
                    ));
                }
                return Err(EvalError::Unsupported(format!(
                    "cannot integrate '{expr}'"
                )));
            }
        },
        _ => {
            return Err(EvalError::Unsupported(format!(
                "cannot integrate '{expr}'"
            )));
        }
    };

    if **base != Expr::Symbol(var.to_string()) {
        return Err(EvalError::Unsupported(format!(
            "cannot integrate '{expr}'"
        )));
    }

    if n == -1.0 {
        // 1/x dx == ln(|x|)
        return Ok(Expr::func("ln", Expr::func("abs", Expr::symbol(var))));
    }

    Ok(Expr::div(
        Expr::pow(Expr::symbol(var), Expr::Number(n + 1.0)),
        Expr::Number(n + 1.0),
    ))
}

fn integrate_function(name: &str, args: &[Expr], var: &str) -> Result<Expr, EvalError> {
    let arg = match args {
        [single] => single,
        _ => {
            return Err(EvalError::Unsupported(format!(
                "cannot integrate '{name}'"
            )));
        }
    };

    // Table entries require a linear inner argument a*x + b
    let slope = linear_slope(arg, var).ok_or_else(|| {
        EvalError::Unsupported(format!("cannot integrate '{name}({arg})'"))
    })?;

    let result = match name {
        "sin" => Expr::neg(Expr::div(
            Expr::func("cos", arg.clone()),
            slope,
        )),
        "cos" => Expr::div(Expr::func("sin", arg.clone()), slope),
        "exp" => Expr::div(Expr::func("exp", arg.clone()), slope),
        other => {
            return Err(EvalError::Unsupported(format!(
                "cannot integrate '{other}({arg})'"
            )));
        }
    };

    Ok(result)
}

/// If `expr` is linear in `var` with nonzero constant slope, return the
/// slope expression
fn linear_slope(expr: &Expr, var: &str) -> Option<Expr> {
    let derivative = simplify(&differentiate(expr, var).ok()?);
    if derivative.free_symbols().contains(var) || derivative.is_num(0.0) {
        return None;
    }
    Some(derivative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn done(input: &str) -> String {
        doit(&parse(input).unwrap()).unwrap().to_string()
    }

    #[test]
    fn indefinite_power_integral() {
        assert_eq!(done("Integral(x**2, x)"), "x**3/3");
        assert_eq!(done("Integral(x, x)"), "x**2/2");
    }

    #[test]
    fn integral_is_linear() {
        assert_eq!(done("Integral(3*x**2 + 2*x, x)"), "x**3 + x**2");
    }

    #[test]
    fn integral_of_constant() {
        assert_eq!(done("Integral(5, x)"), "5*x");
    }

    #[test]
    fn reciprocal_integral_is_logarithmic() {
        assert_eq!(done("Integral(1/x, x)"), "ln(abs(x))");
    }

    #[test]
    fn definite_integral_is_exact() {
        assert_eq!(done("Integral(x**2, (x, 0, 1))"), "1/3");
        assert_eq!(done("Integral(x, (x, 0, 2))"), "2");
    }

    #[test]
    fn trig_and_exp_table() {
        assert_eq!(done("Integral(cos(x), x)"), "sin(x)");
        assert_eq!(done("Integral(exp(2*x), x)"), "exp(2*x)/2");
    }

    #[test]
    fn derivative_power_rule() {
        assert_eq!(done("Derivative(x**2, x)"), "2*x");
        assert_eq!(done("diff(x**3 + x, x)"), "3*x**2 + 1");
    }

    #[test]
    fn higher_order_derivative() {
        assert_eq!(done("Derivative(x**3, x, 2)"), "6*x");
    }

    #[test]
    fn chain_rule_through_elementary_functions() {
        assert_eq!(done("diff(sin(x**2), x)"), "2*x*cos(x**2)");
        assert_eq!(done("diff(exp(3*x), x)"), "3*exp(3*x)");
    }

    #[test]
    fn unsupported_integral_is_an_error() {
        let expr = parse("Integral(exp(x**2), x)").unwrap();
        assert!(matches!(
            doit(&expr),
            Err(EvalError::Unsupported(_))
        ));
    }
}
