use serde::{Deserialize, Serialize};

/// Byte range into the source formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (at {}..{})",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Scalar semantics of the operator. Division follows IEEE-754: a zero
    /// divisor yields ±Infinity or NaN, never an error.
    #[must_use]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Scalar `f64` comparison semantics: NaN compares false under every
    /// operator except `<>`.
    #[must_use]
    pub fn matches(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }
    }

    /// Comparison as a 1.0/0.0 flag, the shape comparisons take in formulas.
    #[must_use]
    pub fn flag(self, a: f64, b: f64) -> f64 {
        if self.matches(a, b) {
            1.0
        } else {
            0.0
        }
    }
}

/// A compiled formula.
///
/// Immutable after compilation; the optimizer consumes and rebuilds trees
/// rather than mutating shared ones, so a cached `Arc<Expr>` can be
/// evaluated concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Named operand, resolved against the caller's operand set at
    /// evaluation time.
    Ident(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Stable JSON serialization useful for debugging/tests.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Expr should be JSON-serializable")
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(_) | Expr::Ident(_) => u8::MAX,
            Expr::Unary { .. } => 50,
            Expr::Binary {
                op: BinaryOp::Mul | BinaryOp::Div,
                ..
            } => 40,
            Expr::Binary {
                op: BinaryOp::Add | BinaryOp::Sub,
                ..
            } => 30,
            Expr::Compare { .. } => 10,
        }
    }

    fn fmt_with(&self, f: &mut std::fmt::Formatter<'_>, parent: u8) -> std::fmt::Result {
        let prec = self.precedence();
        let wrap = prec < parent;
        if wrap {
            f.write_str("(")?;
        }
        match self {
            Expr::Number(n) => write!(f, "{n}")?,
            Expr::Ident(name) => f.write_str(name)?,
            Expr::Unary { op, expr } => {
                f.write_str(op.symbol())?;
                expr.fmt_with(f, prec)?;
            }
            Expr::Binary { op, left, right } => {
                left.fmt_with(f, prec)?;
                write!(f, " {} ", op.symbol())?;
                // Same-precedence operators associate to the left, so the
                // right child needs parentheses at equal precedence.
                right.fmt_with(f, prec + 1)?;
            }
            Expr::Compare { op, left, right } => {
                left.fmt_with(f, prec)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_with(f, prec + 1)?;
            }
        }
        if wrap {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Canonical text rendering of a compiled formula.
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_with(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;

    fn round_trip(src: &str) -> String {
        parse_formula(src).unwrap().to_string()
    }

    #[test]
    fn display_preserves_grouping() {
        assert_eq!(round_trip("a + b * c"), "a + b * c");
        assert_eq!(round_trip("(a + b) * c"), "(a + b) * c");
        assert_eq!(round_trip("a - (b - c)"), "a - (b - c)");
        assert_eq!(round_trip("a - b - c"), "a - b - c");
        assert_eq!(round_trip("-a * b"), "-a * b");
        assert_eq!(round_trip("-(a * b)"), "-(a * b)");
        assert_eq!(round_trip("a <= b + 1"), "a <= b + 1");
    }

    #[test]
    fn display_round_trips_through_the_parser() {
        for src in ["a*(b+c)/d - 2", "-(a+b) <> c", "1.5e3 / (x - -y)"] {
            let first = parse_formula(src).unwrap();
            let second = parse_formula(&first.to_string()).unwrap();
            assert_eq!(first, second);
        }
    }
}
