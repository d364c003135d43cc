use super::environment::Environment;
use super::errors::{EvalError, EvalResult};
use super::interpreter::Interpreter;
use super::value::Value;
use crate::frontend::grammar::FuncInfo;
use crate::frontend::span::Span;

use std::fmt;
use std::rc::Rc;
use tracing::trace;

struct FunctionData {
    info: Rc<FuncInfo>,
    closure: Environment,
}

/// A function value: its definition plus the scope it was defined in.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
    pub fn new(info: Rc<FuncInfo>, closure: Environment) -> Self {
        Function(Rc::new(FunctionData { info, closure }))
    }

    pub fn name(&self) -> &str {
        self.0
            .info
            .name
            .as_ref()
            .map_or("<anonymous>", |ident| ident.name.as_str())
    }

    pub fn arity(&self) -> usize {
        self.0.info.params.len()
    }

    /// Calls the function. The body runs in a fresh scope whose parent is the
    /// defining scope, not the caller's.
    pub fn execute(
        &self,
        args: Vec<Value>,
        interpreter: &mut Interpreter,
        call_span: Span,
    ) -> EvalResult<Value> {
        if args.len() != self.arity() {
            return Err(EvalError::WrongArity {
                name: self.name().to_owned(),
                expected: self.arity(),
                got: args.len(),
                span: call_span,
            });
        }

        let env = Environment::with_enclosing(&self.0.closure);
        for (param, arg) in self.0.info.params.iter().zip(args.into_iter()) {
            env.define(param.name.clone(), arg);
        }

        trace!(function = self.name(), "call");
        interpreter.call_body(&self.0.info.body, env, call_span)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.0.info.name {
            Some(name) => write!(f, "<function {}>", name.name),
            None => write!(f, "<function>"),
        }
    }
}

impl PartialEq<Function> for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Function {}
