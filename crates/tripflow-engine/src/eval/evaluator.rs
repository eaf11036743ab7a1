use crate::ast::{BinaryOp, CompareOp, Expr, UnaryOp};
use crate::eval::OperandResolver;
use crate::simd::kernels::{self, CmpOp};
use crate::value::{EvalError, Value};
use tripflow_model::{OdMatrix, ZoneVector};

/// A subtree result: either computed here, or a borrowed operand.
///
/// Borrowing keeps bare variable references free of copies; a deep clone
/// happens only when an operand itself is the final result.
enum Operand<'a> {
    Owned(Value),
    Borrowed(&'a Value),
}

impl Operand<'_> {
    fn as_value(&self) -> &Value {
        match self {
            Operand::Owned(v) => v,
            Operand::Borrowed(v) => v,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Operand::Owned(v) => v,
            Operand::Borrowed(v) => v.clone(),
        }
    }
}

/// Evaluate a compiled formula against named operands.
///
/// The walk holds no internal mutable state: re-evaluating the same tree
/// against identical operands yields identical results. Errors short-circuit
/// the enclosing operations without partial results.
pub fn evaluate<R: OperandResolver>(expr: &Expr, operands: &R) -> Result<Value, EvalError> {
    Ok(eval(expr, operands)?.into_value())
}

fn eval<'a, R: OperandResolver>(
    expr: &Expr,
    operands: &'a R,
) -> Result<Operand<'a>, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Operand::Owned(Value::Number(*n))),
        Expr::Ident(name) => operands
            .resolve(name)
            .map(Operand::Borrowed)
            .ok_or_else(|| EvalError::UnknownOperand(name.clone())),
        Expr::Unary { op, expr } => {
            let operand = eval(expr, operands)?;
            match op {
                UnaryOp::Plus => Ok(operand),
                UnaryOp::Minus => Ok(Operand::Owned(negate(operand.as_value()))),
            }
        }
        Expr::Binary { op, left, right } => {
            let left = eval(left, operands)?;
            let right = eval(right, operands)?;
            Ok(Operand::Owned(binary(
                *op,
                left.as_value(),
                right.as_value(),
            )?))
        }
        Expr::Compare { op, left, right } => {
            let left = eval(left, operands)?;
            let right = eval(right, operands)?;
            Ok(Operand::Owned(compare(
                *op,
                left.as_value(),
                right.as_value(),
            )?))
        }
    }
}

fn negate(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(-n),
        Value::Vector(v) => {
            let mut out = ZoneVector::zeros(v.zones().clone());
            kernels::neg_f64(out.data_mut(), v.data());
            Value::Vector(out)
        }
        Value::Matrix(m) => {
            let mut out = OdMatrix::zeros(m.rows().clone(), m.cols().clone());
            kernels::neg_f64(out.data_mut(), m.data());
            Value::Matrix(out)
        }
    }
}

/// The broadcasting table for arithmetic. Vector/matrix pairs must share
/// identical zone indices; a vector and a matrix never combine.
fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op.apply(*a, *b))),

        (Value::Number(s), Value::Vector(v)) => {
            let mut out = ZoneVector::zeros(v.zones().clone());
            scalar_lhs(op, out.data_mut(), *s, v.data());
            Ok(Value::Vector(out))
        }
        (Value::Vector(v), Value::Number(s)) => {
            let mut out = ZoneVector::zeros(v.zones().clone());
            scalar_rhs(op, out.data_mut(), v.data(), *s);
            Ok(Value::Vector(out))
        }
        (Value::Number(s), Value::Matrix(m)) => {
            let mut out = OdMatrix::zeros(m.rows().clone(), m.cols().clone());
            scalar_lhs(op, out.data_mut(), *s, m.data());
            Ok(Value::Matrix(out))
        }
        (Value::Matrix(m), Value::Number(s)) => {
            let mut out = OdMatrix::zeros(m.rows().clone(), m.cols().clone());
            scalar_rhs(op, out.data_mut(), m.data(), *s);
            Ok(Value::Matrix(out))
        }

        (Value::Vector(a), Value::Vector(b)) => {
            if !a.same_zones(b) {
                return Err(EvalError::ZoneSystemMismatch { op: op.symbol() });
            }
            let mut out = ZoneVector::zeros(a.zones().clone());
            elementwise(op, out.data_mut(), a.data(), b.data());
            Ok(Value::Vector(out))
        }
        (Value::Matrix(a), Value::Matrix(b)) => {
            if !a.same_shape(b) {
                return Err(EvalError::ZoneSystemMismatch { op: op.symbol() });
            }
            let mut out = OdMatrix::zeros(a.rows().clone(), a.cols().clone());
            elementwise(op, out.data_mut(), a.data(), b.data());
            Ok(Value::Matrix(out))
        }

        (Value::Vector(_), Value::Matrix(_)) | (Value::Matrix(_), Value::Vector(_)) => {
            Err(EvalError::ShapeMismatch {
                op: op.symbol(),
                left: left.kind(),
                right: right.kind(),
            })
        }
    }
}

/// Comparisons share the arithmetic broadcasting table and produce 1.0/0.0
/// flags in the broadcast shape.
fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let cmp = cmp_op(op);
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op.flag(*a, *b))),

        (Value::Number(s), Value::Vector(v)) => {
            let mut out = ZoneVector::zeros(v.zones().clone());
            kernels::scalar_cmp_f64(out.data_mut(), *s, v.data(), cmp);
            Ok(Value::Vector(out))
        }
        (Value::Vector(v), Value::Number(s)) => {
            let mut out = ZoneVector::zeros(v.zones().clone());
            kernels::cmp_scalar_f64(out.data_mut(), v.data(), *s, cmp);
            Ok(Value::Vector(out))
        }
        (Value::Number(s), Value::Matrix(m)) => {
            let mut out = OdMatrix::zeros(m.rows().clone(), m.cols().clone());
            kernels::scalar_cmp_f64(out.data_mut(), *s, m.data(), cmp);
            Ok(Value::Matrix(out))
        }
        (Value::Matrix(m), Value::Number(s)) => {
            let mut out = OdMatrix::zeros(m.rows().clone(), m.cols().clone());
            kernels::cmp_scalar_f64(out.data_mut(), m.data(), *s, cmp);
            Ok(Value::Matrix(out))
        }

        (Value::Vector(a), Value::Vector(b)) => {
            if !a.same_zones(b) {
                return Err(EvalError::ZoneSystemMismatch { op: op.symbol() });
            }
            let mut out = ZoneVector::zeros(a.zones().clone());
            kernels::cmp_f64(out.data_mut(), a.data(), b.data(), cmp);
            Ok(Value::Vector(out))
        }
        (Value::Matrix(a), Value::Matrix(b)) => {
            if !a.same_shape(b) {
                return Err(EvalError::ZoneSystemMismatch { op: op.symbol() });
            }
            let mut out = OdMatrix::zeros(a.rows().clone(), a.cols().clone());
            kernels::cmp_f64(out.data_mut(), a.data(), b.data(), cmp);
            Ok(Value::Matrix(out))
        }

        (Value::Vector(_), Value::Matrix(_)) | (Value::Matrix(_), Value::Vector(_)) => {
            Err(EvalError::ShapeMismatch {
                op: op.symbol(),
                left: left.kind(),
                right: right.kind(),
            })
        }
    }
}

fn elementwise(op: BinaryOp, out: &mut [f64], a: &[f64], b: &[f64]) {
    match op {
        BinaryOp::Add => kernels::add_f64(out, a, b),
        BinaryOp::Sub => kernels::sub_f64(out, a, b),
        BinaryOp::Mul => kernels::mul_f64(out, a, b),
        BinaryOp::Div => kernels::div_f64(out, a, b),
    }
}

fn scalar_rhs(op: BinaryOp, out: &mut [f64], a: &[f64], s: f64) {
    match op {
        BinaryOp::Add => kernels::add_scalar_f64(out, a, s),
        BinaryOp::Sub => kernels::sub_scalar_f64(out, a, s),
        BinaryOp::Mul => kernels::mul_scalar_f64(out, a, s),
        BinaryOp::Div => kernels::div_scalar_f64(out, a, s),
    }
}

fn scalar_lhs(op: BinaryOp, out: &mut [f64], s: f64, a: &[f64]) {
    match op {
        // Addition and multiplication commute with the scalar on either side.
        BinaryOp::Add => kernels::add_scalar_f64(out, a, s),
        BinaryOp::Mul => kernels::mul_scalar_f64(out, a, s),
        BinaryOp::Sub => kernels::scalar_sub_f64(out, s, a),
        BinaryOp::Div => kernels::scalar_div_f64(out, s, a),
    }
}

fn cmp_op(op: CompareOp) -> CmpOp {
    match op {
        CompareOp::Eq => CmpOp::Eq,
        CompareOp::Ne => CmpOp::Ne,
        CompareOp::Lt => CmpOp::Lt,
        CompareOp::Le => CmpOp::Le,
        CompareOp::Gt => CmpOp::Gt,
        CompareOp::Ge => CmpOp::Ge,
    }
}
