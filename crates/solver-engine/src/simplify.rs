//! Symbolic simplification
//!
//! Bottom-up rewriting to a canonical form: constant folding, identity
//! elimination, like-term collection over flattened sums, and
//! like-factor collection over flattened products. Runs to a fixed
//! point with an iteration cap.

use std::cmp::Ordering;

use crate::ast::{Constant, Expr};

const MAX_PASSES: usize = 12;

/// Simplify an expression to canonical form
pub fn simplify(expr: &Expr) -> Expr {
    let mut current = expr.clone();
    for _ in 0..MAX_PASSES {
        let next = simplify_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn simplify_once(expr: &Expr) -> Expr {
    match expr {
        Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) => expr.clone(),
        Expr::Add(..) | Expr::Sub(..) => rebuild_sum(expr),
        Expr::Mul(..) => rebuild_product(expr),
        Expr::Div(a, b) => simplify_div(simplify_once(a), simplify_once(b)),
        Expr::Pow(a, b) => simplify_pow(simplify_once(a), simplify_once(b)),
        Expr::Function { name, args } => {
            let args: Vec<Expr> = args.iter().map(simplify_once).collect();
            simplify_function(name, args)
        }
        Expr::Integral {
            integrand,
            var,
            bounds,
        } => Expr::Integral {
            integrand: Box::new(simplify_once(integrand)),
            var: var.clone(),
            bounds: bounds
                .as_ref()
                .map(|b| Box::new((simplify_once(&b.0), simplify_once(&b.1)))),
        },
        Expr::Derivative { inner, var, order } => Expr::Derivative {
            inner: Box::new(simplify_once(inner)),
            var: var.clone(),
            order: *order,
        },
        Expr::Tuple(items) => Expr::Tuple(items.iter().map(simplify_once).collect()),
    }
}

fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 1e15
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

// ---------------------------------------------------------------------------
// Sums

fn rebuild_sum(expr: &Expr) -> Expr {
    let mut raw = Vec::new();
    flatten_sum(expr, 1.0, &mut raw);

    let mut constant = 0.0;
    let mut terms: Vec<(Expr, f64)> = Vec::new();

    for (term, sign) in raw {
        let (coeff, base) = split_coefficient(&term);
        let coeff = coeff * sign;
        match base {
            None => constant += coeff,
            Some(base) => match terms.iter_mut().find(|(b, _)| *b == base) {
                Some((_, c)) => *c += coeff,
                None => terms.push((base, coeff)),
            },
        }
    }

    terms.retain(|(_, c)| *c != 0.0);
    terms.sort_by(|a, b| {
        degree(&b.0)
            .partial_cmp(&degree(&a.0))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.to_string().cmp(&b.0.to_string()))
    });

    let mut result: Option<Expr> = None;
    for (base, coeff) in terms {
        let term = attach_coefficient(coeff, base);
        result = Some(match result {
            None => term,
            Some(acc) => Expr::add(acc, term),
        });
    }

    match result {
        None => Expr::Number(constant),
        Some(acc) if constant == 0.0 => acc,
        Some(acc) => Expr::add(acc, Expr::Number(constant)),
    }
}

fn flatten_sum(expr: &Expr, sign: f64, out: &mut Vec<(Expr, f64)>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_sum(a, sign, out);
            flatten_sum(b, sign, out);
        }
        Expr::Sub(a, b) => {
            flatten_sum(a, sign, out);
            flatten_sum(b, -sign, out);
        }
        other => out.push((simplify_once(other), sign)),
    }
}

/// Split a term into its numeric coefficient and symbolic base
fn split_coefficient(term: &Expr) -> (f64, Option<Expr>) {
    match term {
        Expr::Number(n) => (*n, None),
        Expr::Mul(..) => {
            let mut factors = Vec::new();
            flatten_product(term, &mut factors);

            let mut coeff = 1.0;
            let mut rest = Vec::new();
            for factor in factors {
                match factor.as_number() {
                    Some(n) => coeff *= n,
                    None => rest.push(factor),
                }
            }

            let base = rest
                .into_iter()
                .reduce(Expr::mul);
            (coeff, base)
        }
        other => (1.0, Some(other.clone())),
    }
}

fn attach_coefficient(coeff: f64, base: Expr) -> Expr {
    if coeff == 1.0 {
        base
    } else if coeff == -1.0 {
        Expr::neg(base)
    } else {
        Expr::mul(Expr::Number(coeff), base)
    }
}

/// Polynomial-style ordering key so `x**2 + 2*x + 1` keeps descending
/// degree order
fn degree(expr: &Expr) -> f64 {
    match expr {
        Expr::Symbol(_) | Expr::Function { .. } => 1.0,
        Expr::Pow(base, exp) => match exp.as_number() {
            Some(n) => n * degree(base).max(1.0),
            None => 1.0,
        },
        Expr::Mul(a, b) => degree(a).max(degree(b)),
        Expr::Div(a, _) => degree(a),
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Products

fn rebuild_product(expr: &Expr) -> Expr {
    let mut factors = Vec::new();
    flatten_product(expr, &mut factors);

    // The numeric coefficient is kept as an exact num/den pair so
    // 3 * (x**3/3) cancels to x**3 instead of drifting through floats
    let mut coeff_num = 1.0;
    let mut coeff_den = 1.0;
    let mut bases: Vec<(Expr, f64)> = Vec::new();

    for factor in &factors {
        accumulate_factor(factor, 1.0, &mut coeff_num, &mut coeff_den, &mut bases);
    }

    if coeff_num == 0.0 && coeff_den != 0.0 {
        return Expr::Number(0.0);
    }

    if is_integral(coeff_num) && is_integral(coeff_den) && coeff_den != 0.0 {
        let g = gcd(coeff_num as i64, coeff_den as i64).max(1) as f64;
        coeff_num /= g;
        coeff_den /= g;
        if coeff_den < 0.0 {
            coeff_num = -coeff_num;
            coeff_den = -coeff_den;
        }
    } else if coeff_den != 0.0 {
        coeff_num /= coeff_den;
        coeff_den = 1.0;
    }

    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for (base, exp) in bases {
        if exp == 0.0 {
            continue;
        }
        let (target, exp) = if exp > 0.0 {
            (&mut numerator, exp)
        } else {
            (&mut denominator, -exp)
        };
        target.push(if exp == 1.0 {
            base
        } else {
            Expr::pow(base, Expr::Number(exp))
        });
    }

    numerator.sort_by_key(product_sort_key);
    denominator.sort_by_key(product_sort_key);

    let numerator = match numerator.into_iter().reduce(Expr::mul) {
        Some(n) => attach_coefficient(coeff_num, n),
        None => Expr::Number(coeff_num),
    };
    let denominator = match (denominator.into_iter().reduce(Expr::mul), coeff_den != 1.0) {
        (None, false) => return numerator,
        (None, true) => Expr::Number(coeff_den),
        (Some(d), false) => d,
        (Some(d), true) => Expr::mul(Expr::Number(coeff_den), d),
    };
    Expr::div(numerator, denominator)
}

/// Fold one factor into the running coefficient and base/exponent map,
/// descending through nested products and quotients
fn accumulate_factor(
    factor: &Expr,
    sign: f64,
    coeff_num: &mut f64,
    coeff_den: &mut f64,
    bases: &mut Vec<(Expr, f64)>,
) {
    match factor {
        Expr::Mul(a, b) => {
            accumulate_factor(a, sign, coeff_num, coeff_den, bases);
            accumulate_factor(b, sign, coeff_num, coeff_den, bases);
        }
        Expr::Div(a, b) => {
            accumulate_factor(a, sign, coeff_num, coeff_den, bases);
            accumulate_factor(b, -sign, coeff_num, coeff_den, bases);
        }
        Expr::Number(n) => {
            if sign > 0.0 {
                *coeff_num *= n;
            } else {
                *coeff_den *= n;
            }
        }
        _ => {
            let (base, exp) = match factor {
                Expr::Pow(base, e) => match e.as_number() {
                    Some(n) => ((**base).clone(), n * sign),
                    None => (factor.clone(), sign),
                },
                _ => (factor.clone(), sign),
            };
            match bases.iter_mut().find(|(b, _)| *b == base) {
                Some((_, e)) => *e += exp,
                None => bases.push((base, exp)),
            }
        }
    }
}

/// Symbols and powers before function calls, then alphabetical, so a
/// product prints `2*x*cos(x**2)` rather than `2*cos(x**2)*x`
fn product_sort_key(expr: &Expr) -> (u8, String) {
    let class = match expr {
        Expr::Function { .. } => 1,
        _ => 0,
    };
    (class, expr.to_string())
}

fn flatten_product(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_product(a, out);
            flatten_product(b, out);
        }
        other => out.push(simplify_once(other)),
    }
}

// ---------------------------------------------------------------------------
// Quotients and powers

fn simplify_div(num: Expr, den: Expr) -> Expr {
    if den.is_num(1.0) {
        return num;
    }
    if den.is_num(-1.0) {
        return simplify_once(&Expr::neg(num));
    }
    if num.is_num(0.0) && !den.is_num(0.0) {
        return Expr::Number(0.0);
    }
    if num == den && num.as_number().is_none() {
        return Expr::Number(1.0);
    }

    if let (Some(a), Some(b)) = (num.as_number(), den.as_number()) {
        if b != 0.0 {
            if is_integral(a) && is_integral(b) {
                return reduce_fraction(a as i64, b as i64);
            }
            return Expr::Number(a / b);
        }
        return Expr::div(num, den);
    }

    // Fold nested quotients: (a/b)/c == a/(b*c), a/(b/c) == a*c/b
    if let Expr::Div(a, b) = num {
        return Expr::div(*a, Expr::mul(*b, den));
    }
    if let Expr::Div(a, b) = den {
        return Expr::div(Expr::mul(num, *b), *a);
    }

    // Cancel a shared integer factor between the numerator's
    // coefficient and an integer denominator: (2*x)/2 == x
    if let Some(b) = den.as_number() {
        if is_integral(b) {
            let (coeff, base) = split_coefficient(&num);
            if is_integral(coeff) {
                let g = gcd(coeff as i64, b as i64);
                if g > 1 {
                    let coeff = coeff / g as f64;
                    let b = b / g as f64;
                    let num = match base {
                        Some(base) => attach_coefficient(coeff, base),
                        None => Expr::Number(coeff),
                    };
                    return if b == 1.0 { num } else { Expr::div(num, Expr::Number(b)) };
                }
            }
        } else {
            // Non-integer divisor folds into the coefficient
            return Expr::mul(Expr::Number(1.0 / b), num);
        }
    }

    Expr::div(num, den)
}

/// Exact integer quotient, or a gcd-reduced fraction kept symbolic so
/// `Integral(x**2, (x, 0, 1))` renders `1/3` rather than a float
fn reduce_fraction(a: i64, b: i64) -> Expr {
    if b != 0 && a % b == 0 {
        return Expr::Number((a / b) as f64);
    }
    let g = gcd(a, b).max(1);
    let (mut a, mut b) = (a / g, b / g);
    if b < 0 {
        a = -a;
        b = -b;
    }
    Expr::div(Expr::Number(a as f64), Expr::Number(b as f64))
}

fn simplify_pow(base: Expr, exp: Expr) -> Expr {
    if exp.is_num(0.0) {
        return Expr::Number(1.0);
    }
    if exp.is_num(1.0) {
        return base;
    }
    if base.is_num(1.0) {
        return Expr::Number(1.0);
    }
    if base.is_num(0.0) {
        if let Some(n) = exp.as_number() {
            if n > 0.0 {
                return Expr::Number(0.0);
            }
        }
    }

    if let (Some(b), Some(e)) = (base.as_number(), exp.as_number()) {
        if is_integral(e) && e < 0.0 {
            return simplify_div(
                Expr::Number(1.0),
                simplify_pow(Expr::Number(b), Expr::Number(-e)),
            );
        }
        let folded = b.powf(e);
        if folded.is_finite() && folded.abs() < 1e15 {
            return Expr::Number(folded);
        }
    }

    // (x**m)**n == x**(m*n) for numeric exponents
    if let Expr::Pow(inner_base, inner_exp) = &base {
        if let (Some(m), Some(n)) = (inner_exp.as_number(), exp.as_number()) {
            return simplify_pow((**inner_base).clone(), Expr::Number(m * n));
        }
    }

    Expr::pow(base, exp)
}

// ---------------------------------------------------------------------------
// Elementary function folds

fn simplify_function(name: &str, args: Vec<Expr>) -> Expr {
    if let [arg] = args.as_slice() {
        match (name, arg) {
            ("abs", Expr::Number(n)) => return Expr::Number(n.abs()),
            ("sqrt", Expr::Number(n)) if *n >= 0.0 => {
                let root = n.sqrt();
                if is_integral(root) && root * root == *n {
                    return Expr::Number(root);
                }
            }
            ("exp", Expr::Number(n)) if *n == 0.0 => return Expr::Number(1.0),
            ("ln" | "log", Expr::Number(n)) if *n == 1.0 => return Expr::Number(0.0),
            ("ln" | "log", Expr::Constant(Constant::E)) => return Expr::Number(1.0),
            ("sin" | "tan", Expr::Number(n)) if *n == 0.0 => return Expr::Number(0.0),
            ("cos", Expr::Number(n)) if *n == 0.0 => return Expr::Number(1.0),
            ("sin" | "tan", Expr::Constant(Constant::Pi)) => return Expr::Number(0.0),
            ("cos", Expr::Constant(Constant::Pi)) => return Expr::Number(-1.0),
            _ => {}
        }
    }

    Expr::Function {
        name: name.to_string(),
        args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn simplified(input: &str) -> String {
        simplify(&parse(input).unwrap()).to_string()
    }

    #[test]
    fn additive_identities() {
        assert_eq!(simplified("x + 0"), "x");
        assert_eq!(simplified("x - x"), "0");
        assert_eq!(simplified("x + x"), "2*x");
    }

    #[test]
    fn multiplicative_identities() {
        assert_eq!(simplified("x*1"), "x");
        assert_eq!(simplified("x*0"), "0");
        assert_eq!(simplified("x*x"), "x**2");
        assert_eq!(simplified("x/1"), "x");
        assert_eq!(simplified("x/x"), "1");
    }

    #[test]
    fn power_identities() {
        assert_eq!(simplified("x**0"), "1");
        assert_eq!(simplified("x**1"), "x");
        assert_eq!(simplified("(x**2)**3"), "x**6");
    }

    #[test]
    fn polynomial_keeps_descending_degree_order() {
        assert_eq!(simplified("x**2 + 2*x + 1"), "x**2 + 2*x + 1");
        assert_eq!(simplified("1 + 2*x + x**2"), "x**2 + 2*x + 1");
    }

    #[test]
    fn like_terms_collect() {
        assert_eq!(simplified("2*x + 3*x"), "5*x");
        assert_eq!(simplified("x**2 + x**2"), "2*x**2");
        assert_eq!(simplified("3*x - 2*x"), "x");
    }

    #[test]
    fn constant_folding() {
        assert_eq!(simplified("x + 2*3"), "x + 6");
        assert_eq!(simplified("2**3 * x"), "8*x");
    }

    #[test]
    fn integer_fractions_stay_exact() {
        assert_eq!(simplified("x + 2/4"), "x + 1/2");
        assert_eq!(simplified("(2*x)/2"), "x");
        assert_eq!(simplified("4/2 + x"), "x + 2");
    }

    #[test]
    fn negative_exponents_move_to_denominator() {
        assert_eq!(simplified("x**2 * x**(-1)"), "x");
        assert_eq!(simplified("x * x**(-2)"), "1/x");
    }

    #[test]
    fn function_folds() {
        assert_eq!(simplified("sin(0) + x"), "x");
        assert_eq!(simplified("cos(pi)*x"), "-x");
        assert_eq!(simplified("sqrt(4)*x"), "2*x");
        assert_eq!(simplified("ln(E) + x"), "x + 1");
    }

    #[test]
    fn unknown_functions_are_preserved() {
        assert_eq!(simplified("f(x) + f(x)"), "2*f(x)");
    }
}
