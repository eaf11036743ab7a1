use thiserror::Error;
use tripflow_model::{OdMatrix, ZoneVector};

/// The result of evaluating a formula: a scalar, a demand vector, or an
/// origin-destination matrix. Vectors and matrices carry their zone index
/// handles, which is what shape checks compare.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Vector(ZoneVector),
    Matrix(OdMatrix),
}

impl Value {
    /// Shape name for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "scalar",
            Value::Vector(_) => "vector",
            Value::Matrix(_) => "matrix",
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&ZoneVector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_matrix(&self) -> Option<&OdMatrix> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<ZoneVector> for Value {
    fn from(value: ZoneVector) -> Self {
        Value::Vector(value)
    }
}

impl From<OdMatrix> for Value {
    fn from(value: OdMatrix) -> Self {
        Value::Matrix(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unknown operand `{0}`")]
    UnknownOperand(String),
    #[error("cannot apply `{op}` to a {left} and a {right}")]
    ShapeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("operands of `{op}` are indexed by different zone systems")]
    ZoneSystemMismatch { op: &'static str },
}
