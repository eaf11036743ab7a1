//! Polymorphic formula evaluation.
//!
//! [`evaluate`] walks a compiled [`Expr`](crate::ast::Expr) against a set of
//! named operands and produces a tagged [`Value`](crate::value::Value),
//! broadcasting scalars across vectors and matrices. Container operands are
//! resolved by reference and only materialized when an operation produces a
//! new container, so evaluating `a + b` over two 10k-zone vectors allocates
//! exactly one result buffer.

mod evaluator;

pub use evaluator::evaluate;

use crate::value::Value;
use ahash::AHashMap;

/// Resolves operand names during evaluation.
///
/// The engine never parses configuration itself; a host hands it
/// already-typed values under the names its formulas use.
pub trait OperandResolver {
    fn resolve(&self, name: &str) -> Option<&Value>;
}

/// The standard operand set: an owned name → value map.
#[derive(Debug, Clone, Default)]
pub struct Operands {
    values: AHashMap<String, Value>,
}

impl Operands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

impl OperandResolver for Operands {
    fn resolve(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}
