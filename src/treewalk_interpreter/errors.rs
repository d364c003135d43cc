use super::value::Value;
use crate::frontend::grammar::{InfixOperator, PrefixOperator};
use crate::frontend::span::Span;

use thiserror::Error;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvalError {
    #[error("unbound identifier `{}` at {}", .name, .span)]
    UnboundIdentifier { name: String, span: Span },
    #[error("cannot apply prefix `{}` to {} at {}", .op.symbol(), .operand.type_name(), .span)]
    IllegalPrefixOperation {
        op: PrefixOperator,
        operand: Value,
        span: Span,
    },
    #[error("cannot apply `{}` to {} and {} at {}", .op.symbol(), .lhs.type_name(), .rhs.type_name(), .span)]
    IllegalInfixOperation {
        op: InfixOperator,
        lhs: Value,
        rhs: Value,
        span: Span,
    },
    #[error("{} is not callable at {}", .callee.type_name(), .span)]
    NotCallable { callee: Value, span: Span },
    #[error("function `{}` expects {} argument(s) but got {} at {}", .name, .expected, .got, .span)]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },
    #[error("division by zero at {}", .span)]
    DivisionByZero { span: Span },
    #[error("integer overflow in `{}` at {}", .op, .span)]
    IntegerOverflow { op: &'static str, span: Span },
    #[error("maximum call depth of {} exceeded at {}", .depth, .span)]
    StackOverflow { depth: usize, span: Span },
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::UnboundIdentifier { span, .. }
            | EvalError::IllegalPrefixOperation { span, .. }
            | EvalError::IllegalInfixOperation { span, .. }
            | EvalError::NotCallable { span, .. }
            | EvalError::WrongArity { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::IntegerOverflow { span, .. }
            | EvalError::StackOverflow { span, .. } => *span,
        }
    }
}

/// Non-local exits while walking the tree. `Return` unwinds to the nearest
/// function call or the program root and never escapes the interpreter.
#[derive(Debug)]
pub(super) enum Unwind {
    Error(EvalError),
    Return(Value),
}

pub(super) type ExecResult<T> = Result<T, Unwind>;

impl From<EvalError> for Unwind {
    fn from(error: EvalError) -> Self {
        Unwind::Error(error)
    }
}
