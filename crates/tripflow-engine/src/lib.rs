#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Formula compilation and evaluation over Tripflow zone systems, plus the
//! gravity-model balancer.
//!
//! A formula is a text expression over named operands — scalars,
//! [`ZoneVector`](tripflow_model::ZoneVector)s, and
//! [`OdMatrix`](tripflow_model::OdMatrix)es — using `+ - * /`, comparisons,
//! and parentheses. [`compile`] turns the text into an optimized [`Expr`]
//! once; [`evaluate`] walks it against an operand set, broadcasting scalars
//! across containers and delegating all bulk elementwise work to the
//! [`simd::kernels`] library. Hosts that evaluate the same formula
//! repeatedly keep an [`ExpressionCache`] so each distinct text is compiled
//! once.
//!
//! The [`solver`] module implements doubly-constrained gravity-model
//! balancing on the same containers and kernels, fanned out across origin
//! rows via a crate-local Rayon pool (the default `parallel` feature).
//!
//! ```
//! use tripflow_engine::{compile, evaluate, Operands, Value};
//! use tripflow_model::{ZoneIndex, ZoneVector};
//!
//! let zones = ZoneIndex::shared(vec![101, 102, 103]).unwrap();
//! let demand = ZoneVector::from_data(zones.clone(), vec![10.0, 20.0, 30.0]).unwrap();
//!
//! let expr = compile("demand * growth").unwrap();
//! let mut operands = Operands::new();
//! operands.insert("demand", demand);
//! operands.insert("growth", 1.5);
//!
//! match evaluate(&expr, &operands).unwrap() {
//!     Value::Vector(v) => assert_eq!(v.data(), &[15.0, 30.0, 45.0]),
//!     other => panic!("expected a vector, got a {}", other.kind()),
//! }
//! ```

pub mod ast;
pub mod eval;
pub mod optimize;
pub mod parser;
pub mod simd;
pub mod solver;
pub mod value;

mod parallel;

pub use ast::{BinaryOp, CompareOp, Expr, ParseError, Span, UnaryOp};
pub use eval::{evaluate, OperandResolver, Operands};
pub use value::{EvalError, Value};

use ahash::AHashMap;
use std::sync::Arc;

/// Compile a formula: lex, parse, and optimize.
pub fn compile(formula: &str) -> Result<Expr, ParseError> {
    Ok(optimize::optimize(parser::parse_formula(formula)?))
}

/// Compile-once cache keyed by formula text.
///
/// Compiled trees are handed out as `Arc<Expr>` so callers can evaluate
/// concurrently while the cache stays a plain single-writer map.
#[derive(Debug, Default)]
pub struct ExpressionCache {
    compiled: AHashMap<String, Arc<Expr>>,
}

impl ExpressionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `formula`, compiling on first sight.
    ///
    /// Parse errors are not cached; a failing formula is re-parsed on every
    /// call, which keeps error spans tied to the text actually supplied.
    pub fn compile_cached(&mut self, formula: &str) -> Result<Arc<Expr>, ParseError> {
        if let Some(expr) = self.compiled.get(formula) {
            return Ok(expr.clone());
        }
        let expr = Arc::new(compile(formula)?);
        self.compiled.insert(formula.to_string(), expr.clone());
        Ok(expr)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn clear(&mut self) {
        self.compiled.clear();
    }
}
