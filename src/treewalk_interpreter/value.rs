use super::errors::{EvalError, EvalResult};
use super::function::Function;
use crate::frontend::grammar::{InfixOperator, PrefixOperator};
use crate::frontend::span::Span;

use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(String),
    Function(Function),
    Unit,
}

impl Value {
    /// `false`, `0`, `""` and unit are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(
            self,
            Value::Boolean(false) | Value::Integer(0) | Value::Unit
        ) && !matches!(self, Value::String(s) if s.is_empty())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Unit => "unit",
        }
    }

    pub fn apply_infix_op(
        op: InfixOperator,
        lhs: Value,
        rhs: Value,
        span: Span,
    ) -> EvalResult<Value> {
        match op {
            InfixOperator::Add => checked_arithmetic(op, lhs, rhs, span, i64::checked_add),
            InfixOperator::Subtract => checked_arithmetic(op, lhs, rhs, span, i64::checked_sub),
            InfixOperator::Multiply => checked_arithmetic(op, lhs, rhs, span, i64::checked_mul),
            InfixOperator::Divide => {
                if matches!((&lhs, &rhs), (Value::Integer(_), Value::Integer(0))) {
                    return Err(EvalError::DivisionByZero { span });
                }
                checked_arithmetic(op, lhs, rhs, span, i64::checked_div)
            }
            InfixOperator::EqualTo => Ok(Value::Boolean(lhs == rhs)),
            InfixOperator::NotEqualTo => Ok(Value::Boolean(lhs != rhs)),
            InfixOperator::GreaterThan => comparison(op, lhs, rhs, span, |a, b| a > b),
            InfixOperator::GreaterEq => comparison(op, lhs, rhs, span, |a, b| a >= b),
            InfixOperator::LessThan => comparison(op, lhs, rhs, span, |a, b| a < b),
            InfixOperator::LessEq => comparison(op, lhs, rhs, span, |a, b| a <= b),
            // Both sides are already evaluated; these combine truthiness only.
            InfixOperator::And => Ok(Value::Boolean(lhs.is_truthy() && rhs.is_truthy())),
            InfixOperator::Or => Ok(Value::Boolean(lhs.is_truthy() || rhs.is_truthy())),
        }
    }

    pub fn apply_prefix_op(op: PrefixOperator, value: Value, span: Span) -> EvalResult<Value> {
        match op {
            PrefixOperator::Negate => match value {
                Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or(
                    EvalError::IntegerOverflow {
                        op: op.symbol(),
                        span,
                    },
                ),
                operand => Err(EvalError::IllegalPrefixOperation { op, operand, span }),
            },
            PrefixOperator::LogicalNot => Ok(Value::Boolean(!value.is_truthy())),
        }
    }
}

fn checked_arithmetic<F>(
    op: InfixOperator,
    lhs: Value,
    rhs: Value,
    span: Span,
    func: F,
) -> EvalResult<Value>
where
    F: Fn(i64, i64) -> Option<i64>,
{
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => {
            func(a, b).map(Value::Integer).ok_or(EvalError::IntegerOverflow {
                op: op.symbol(),
                span,
            })
        }
        (lhs, rhs) => Err(EvalError::IllegalInfixOperation { op, lhs, rhs, span }),
    }
}

fn comparison<F>(op: InfixOperator, lhs: Value, rhs: Value, span: Span, func: F) -> EvalResult<Value>
where
    F: Fn(i64, i64) -> bool,
{
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Boolean(func(a, b))),
        (lhs, rhs) => Err(EvalError::IllegalInfixOperation { op, lhs, rhs, span }),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Unit => f.write_str("unit"),
        }
    }
}
