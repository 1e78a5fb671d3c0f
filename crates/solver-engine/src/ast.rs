//! Expression tree for symbolic mathematics

use std::collections::BTreeSet;
use std::fmt;

/// Named mathematical constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    /// The circle constant
    Pi,
    /// Euler's number
    E,
}

impl Constant {
    /// Numeric value of the constant
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    /// Canonical name used by the parser and printer
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "E",
        }
    }
}

/// Elementary functions the engine can evaluate and differentiate
pub const KNOWN_FUNCTIONS: &[&str] = &["sin", "cos", "tan", "exp", "ln", "log", "sqrt", "abs"];

/// A parsed mathematical expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),

    /// Named constant (pi, E)
    Constant(Constant),

    /// Unbound variable
    Symbol(String),

    /// Addition
    Add(Box<Expr>, Box<Expr>),

    /// Subtraction
    Sub(Box<Expr>, Box<Expr>),

    /// Multiplication
    Mul(Box<Expr>, Box<Expr>),

    /// Division
    Div(Box<Expr>, Box<Expr>),

    /// Exponentiation
    Pow(Box<Expr>, Box<Expr>),

    /// Function call, elementary or uninterpreted
    Function { name: String, args: Vec<Expr> },

    /// Integral over `var`; definite when `bounds` is present
    Integral {
        integrand: Box<Expr>,
        var: String,
        bounds: Option<Box<(Expr, Expr)>>,
    },

    /// Derivative of `inner` with respect to `var`, `order` times
    Derivative {
        inner: Box<Expr>,
        var: String,
        order: u32,
    },

    /// Parenthesized comma list, only produced while parsing
    /// calculus bounds like `(x, 0, 1)`
    Tuple(Vec<Expr>),
}

impl Expr {
    pub fn number(n: f64) -> Self {
        Expr::Number(n)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Add(Box::new(left), Box::new(right))
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Expr::Sub(Box::new(left), Box::new(right))
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Expr::Mul(Box::new(left), Box::new(right))
    }

    pub fn div(left: Expr, right: Expr) -> Self {
        Expr::Div(Box::new(left), Box::new(right))
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn func(name: impl Into<String>, arg: Expr) -> Self {
        Expr::Function {
            name: name.into(),
            args: vec![arg],
        }
    }

    pub fn neg(expr: Expr) -> Self {
        Expr::mul(Expr::Number(-1.0), expr)
    }

    /// Numeric value if this node is a literal
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True when this node is the literal `n`
    pub fn is_num(&self, n: f64) -> bool {
        self.as_number() == Some(n)
    }

    /// Unbound variable names appearing anywhere in the expression
    ///
    /// Variables bound by a definite integral's own bounds still count as
    /// free inside the integrand; classification only needs the top-level
    /// answer, and [`Expr::is_constant`] handles bound variables itself.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Symbol(name) => {
                set.insert(name.clone());
            }
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
            Expr::Function { args, .. } => {
                for arg in args {
                    arg.collect_symbols(set);
                }
            }
            Expr::Integral {
                integrand,
                var,
                bounds,
            } => {
                let mut inner = BTreeSet::new();
                integrand.collect_symbols(&mut inner);
                if bounds.is_some() {
                    // Definite integration binds the variable
                    inner.remove(var);
                }
                set.extend(inner);
                if let Some(b) = bounds {
                    b.0.collect_symbols(set);
                    b.1.collect_symbols(set);
                }
            }
            Expr::Derivative { inner, .. } => inner.collect_symbols(set),
            Expr::Tuple(items) => {
                for item in items {
                    item.collect_symbols(set);
                }
            }
        }
    }

    /// True when the expression denotes a plain number: no free symbols
    /// and every function call is a known elementary function
    ///
    /// Definite integrals over constant bounds count as constant; an
    /// unevaluated indefinite integral or derivative does not.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Number(_) | Expr::Constant(_) => true,
            Expr::Symbol(_) => false,
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => a.is_constant() && b.is_constant(),
            Expr::Function { name, args } => {
                KNOWN_FUNCTIONS.contains(&name.as_str()) && args.iter().all(Expr::is_constant)
            }
            Expr::Integral {
                integrand,
                var,
                bounds: Some(bounds),
            } => {
                let inner = integrand.free_symbols();
                inner.iter().all(|s| s == var)
                    && bounds.0.is_constant()
                    && bounds.1.is_constant()
            }
            Expr::Integral { .. } | Expr::Derivative { .. } => false,
            Expr::Tuple(_) => false,
        }
    }

    /// Replace every occurrence of `var` with `value`
    pub fn substitute(&self, var: &str, value: &Expr) -> Expr {
        match self {
            Expr::Number(_) | Expr::Constant(_) => self.clone(),
            Expr::Symbol(name) => {
                if name == var {
                    value.clone()
                } else {
                    self.clone()
                }
            }
            Expr::Add(a, b) => Expr::add(a.substitute(var, value), b.substitute(var, value)),
            Expr::Sub(a, b) => Expr::sub(a.substitute(var, value), b.substitute(var, value)),
            Expr::Mul(a, b) => Expr::mul(a.substitute(var, value), b.substitute(var, value)),
            Expr::Div(a, b) => Expr::div(a.substitute(var, value), b.substitute(var, value)),
            Expr::Pow(a, b) => Expr::pow(a.substitute(var, value), b.substitute(var, value)),
            Expr::Function { name, args } => Expr::Function {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(var, value)).collect(),
            },
            Expr::Integral {
                integrand,
                var: ivar,
                bounds,
            } => {
                // The integration variable shadows outer substitution
                let integrand = if ivar == var {
                    integrand.clone()
                } else {
                    Box::new(integrand.substitute(var, value))
                };
                Expr::Integral {
                    integrand,
                    var: ivar.clone(),
                    bounds: bounds.as_ref().map(|b| {
                        Box::new((b.0.substitute(var, value), b.1.substitute(var, value)))
                    }),
                }
            }
            Expr::Derivative {
                inner,
                var: dvar,
                order,
            } => {
                let inner = if dvar == var {
                    inner.clone()
                } else {
                    Box::new(inner.substitute(var, value))
                };
                Expr::Derivative {
                    inner,
                    var: dvar.clone(),
                    order: *order,
                }
            }
            Expr::Tuple(items) => {
                Expr::Tuple(items.iter().map(|i| i.substitute(var, value)).collect())
            }
        }
    }
}

// Printing precedence levels, lowest binds loosest
const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_POWER: u8 = 3;
const PREC_ATOM: u8 = 4;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) => PREC_SUM,
        Expr::Mul(..) | Expr::Div(..) => PREC_PRODUCT,
        Expr::Pow(..) => PREC_POWER,
        Expr::Number(n) if *n < 0.0 => PREC_SUM,
        _ => PREC_ATOM,
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

fn write_prec(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Write `term` as a trailing summand, folding a leading negative
/// coefficient into the `-` sign so sums read `a - b` instead of
/// `a + -1*b`
fn write_summand(f: &mut fmt::Formatter<'_>, term: &Expr) -> fmt::Result {
    match term {
        Expr::Number(n) if *n < 0.0 => {
            write!(f, " - ")?;
            write_number(f, -n)
        }
        Expr::Mul(a, b) => match a.as_number() {
            Some(n) if n == -1.0 => {
                write!(f, " - ")?;
                write_prec(f, b, PREC_PRODUCT)
            }
            Some(n) if n < 0.0 => {
                write!(f, " - ")?;
                let positive = Expr::mul(Expr::Number(-n), (**b).clone());
                write_prec(f, &positive, PREC_PRODUCT)
            }
            _ => {
                write!(f, " + ")?;
                write_prec(f, term, PREC_SUM + 1)
            }
        },
        _ => {
            write!(f, " + ")?;
            write_prec(f, term, PREC_SUM + 1)
        }
    }
}

impl fmt::Display for Expr {
    /// SymPy-style rendering: `**` for powers, explicit `*`, function
    /// call syntax for unevaluated calculus nodes
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write_number(f, *n),
            Expr::Constant(c) => write!(f, "{}", c.name()),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Add(a, b) => {
                write_prec(f, a, PREC_SUM)?;
                write_summand(f, b)
            }
            Expr::Sub(a, b) => {
                write_prec(f, a, PREC_SUM)?;
                write!(f, " - ")?;
                write_prec(f, b, PREC_PRODUCT)
            }
            Expr::Mul(a, b) => {
                // A negative numeric coefficient folds into a leading sign
                match a.as_number() {
                    Some(n) if n == -1.0 => {
                        write!(f, "-")?;
                        return write_prec(f, b, PREC_PRODUCT);
                    }
                    Some(n) if n < 0.0 => {
                        write!(f, "-")?;
                        write_number(f, -n)?;
                        write!(f, "*")?;
                        return write_prec(f, b, PREC_PRODUCT);
                    }
                    _ => {}
                }
                write_prec(f, a, PREC_PRODUCT)?;
                write!(f, "*")?;
                write_prec(f, b, PREC_PRODUCT)
            }
            Expr::Div(a, b) => {
                if let Some(n) = a.as_number() {
                    if n < 0.0 {
                        write!(f, "-")?;
                        write_number(f, -n)?;
                        write!(f, "/")?;
                        return write_prec(f, b, PREC_POWER);
                    }
                }
                write_prec(f, a, PREC_PRODUCT)?;
                write!(f, "/")?;
                write_prec(f, b, PREC_POWER)
            }
            Expr::Pow(base, exp) => {
                write_prec(f, base, PREC_ATOM)?;
                write!(f, "**")?;
                write_prec(f, exp, PREC_ATOM)
            }
            Expr::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::Integral {
                integrand,
                var,
                bounds,
            } => match bounds {
                Some(b) => write!(f, "Integral({integrand}, ({var}, {}, {}))", b.0, b.1),
                None => write!(f, "Integral({integrand}, {var})"),
            },
            Expr::Derivative { inner, var, order } => {
                if *order == 1 {
                    write!(f, "Derivative({inner}, {var})")
                } else {
                    write!(f, "Derivative({inner}, {var}, {order})")
                }
            }
            Expr::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}
