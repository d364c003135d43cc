use super::environment::Environment;
use super::errors::{EvalError, EvalResult, ExecResult, Unwind};
use super::function::Function;
use super::value::Value;
use crate::frontend::grammar::{Block, Expr, ExprType, Literal, Program, Stmt, StmtType};
use crate::frontend::span::Span;
use crate::stack::ensure_sufficient_stack;

use std::rc::Rc;
use tracing::debug;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Nested calls beyond this depth fail with `EvalError::StackOverflow`.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Evaluates a program against a fresh global environment.
pub fn evaluate(program: &Program) -> EvalResult<Value> {
    Interpreter::new(InterpreterConfig::default()).eval_program(program)
}

pub struct Interpreter {
    env: Environment,
    globals: Environment,
    config: InterpreterConfig,
    call_depth: usize,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        let globals = Environment::new();

        Interpreter {
            env: globals.clone(),
            globals,
            config,
            call_depth: 0,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Runs `program` in the global environment. Bindings made by earlier
    /// programs on the same interpreter stay visible.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<Value> {
        self.env = self.globals.clone();
        self.call_depth = 0;

        debug!(statements = program.statements.len(), "evaluating program");
        match self.eval_statements(&program.statements) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(e)) => Err(e),
        }
    }

    fn swap_env(&mut self, mut env: Environment) -> Environment {
        std::mem::swap(&mut self.env, &mut env);
        env
    }

    fn eval_statements(&mut self, stmts: &[Stmt]) -> ExecResult<Value> {
        let mut last = Value::Unit;
        for stmt in stmts.iter() {
            last = self.eval_statement(stmt)?;
        }
        Ok(last)
    }

    fn eval_statement(&mut self, stmt: &Stmt) -> ExecResult<Value> {
        ensure_sufficient_stack(|| self.eval_statement_inner(stmt))
    }

    fn eval_statement_inner(&mut self, stmt: &Stmt) -> ExecResult<Value> {
        match &stmt.stmt {
            StmtType::Let(name, expr) => {
                let value = self.eval_expression(expr)?;
                self.env.define(name.name.clone(), value);
                Ok(Value::Unit)
            }
            StmtType::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Unit,
                };
                Err(Unwind::Return(value))
            }
            StmtType::Expression(expr) => self.eval_expression(expr),
            StmtType::Block(block) => {
                let env = Environment::with_enclosing(&self.env);
                self.eval_block(block, env)
            }
        }
    }

    /// Runs `block` in `env`, restoring the current environment afterwards
    /// whether the block finished, returned or failed.
    fn eval_block(&mut self, block: &Block, env: Environment) -> ExecResult<Value> {
        let prev_env = self.swap_env(env);
        let result = self.eval_statements(&block.statements);
        self.env = prev_env;
        result
    }

    fn eval_expression(&mut self, expr: &Expr) -> ExecResult<Value> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expr))
    }

    fn eval_expression_inner(&mut self, expr: &Expr) -> ExecResult<Value> {
        match &expr.expr {
            ExprType::Literal(l) => Ok(eval_literal(l)),
            ExprType::Identifier(ident) => match self.env.get(&ident.name) {
                Some(value) => Ok(value),
                None => Err(EvalError::UnboundIdentifier {
                    name: ident.name.clone(),
                    span: ident.span,
                }
                .into()),
            },
            ExprType::Prefix(op, operand) => {
                let value = self.eval_expression(operand)?;
                Ok(Value::apply_prefix_op(*op, value, expr.span)?)
            }
            ExprType::Infix(op, lhs, rhs) => {
                let lhs = self.eval_expression(lhs)?;
                let rhs = self.eval_expression(rhs)?;
                Ok(Value::apply_infix_op(*op, lhs, rhs, expr.span)?)
            }
            ExprType::If(condition, consequence, alternative) => {
                self.eval_if(condition, consequence, alternative.as_ref())
            }
            ExprType::Function(func_info) => {
                let function = Function::new(Rc::clone(func_info), self.env.clone());
                if let Some(name) = &func_info.name {
                    self.env
                        .define(name.name.clone(), Value::Function(function.clone()));
                }
                Ok(Value::Function(function))
            }
            ExprType::Call(callee, args) => self.eval_call(callee, args, expr.span),
        }
    }

    fn eval_if(
        &mut self,
        condition: &Expr,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> ExecResult<Value> {
        let branch = if self.eval_expression(condition)?.is_truthy() {
            consequence
        } else {
            match alternative {
                Some(alternative) => alternative,
                None => return Ok(Value::Unit),
            }
        };

        let env = Environment::with_enclosing(&self.env);
        self.eval_block(branch, env)
    }

    fn eval_call(&mut self, callee: &Expr, raw_args: &[Expr], span: Span) -> ExecResult<Value> {
        let function = match self.eval_expression(callee)? {
            Value::Function(function) => function,
            other => {
                return Err(EvalError::NotCallable {
                    callee: other,
                    span: callee.span,
                }
                .into())
            }
        };

        let mut args = Vec::with_capacity(raw_args.len());
        for raw_arg in raw_args.iter() {
            args.push(self.eval_expression(raw_arg)?);
        }

        Ok(function.execute(args, self, span)?)
    }

    /// Runs a function body in its call environment. A `return` inside the
    /// body stops here; the caller's environment is restored.
    pub(super) fn call_body(
        &mut self,
        body: &Block,
        env: Environment,
        span: Span,
    ) -> EvalResult<Value> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(EvalError::StackOverflow {
                depth: self.config.max_call_depth,
                span,
            });
        }

        self.call_depth += 1;
        let result = self.eval_block(body, env);
        self.call_depth -= 1;

        match result {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(e)) => Err(e),
        }
    }
}

fn eval_literal(l: &Literal) -> Value {
    match l {
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Str(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{parse, tokenize};

    fn program(source: &str) -> Program {
        parse(tokenize(source).unwrap()).unwrap()
    }

    fn eval(source: &str) -> EvalResult<Value> {
        evaluate(&program(source))
    }

    fn expect_values(tests: &[(&str, Value)]) {
        for (source, expected) in tests {
            match eval(source) {
                Ok(value) => assert_eq!(&value, expected, "for `{}`", source),
                Err(e) => panic!("expected `{}`, got error `{}` for `{}`", expected, e, source),
            }
        }
    }

    #[test]
    fn test_arithmetic_and_grouping() {
        expect_values(&[
            ("5", Value::Integer(5)),
            ("-5 + 10", Value::Integer(5)),
            ("2 * (5 + 10) / 3", Value::Integer(10)),
            ("(3 + 2) * 5", Value::Integer(25)),
            ("(3 + 2) * 5 == 25", Value::Boolean(true)),
            ("7 / 2", Value::Integer(3)),
            ("1 - 2 - 3", Value::Integer(-4)),
        ]);
    }

    #[test]
    fn test_booleans_and_comparisons() {
        expect_values(&[
            ("(3 > 2) != (2 > 3)", Value::Boolean(true)),
            ("1 <= 1", Value::Boolean(true)),
            ("2 >= 3", Value::Boolean(false)),
            ("true == true", Value::Boolean(true)),
            ("\"a\" == \"a\"", Value::Boolean(true)),
            ("1 == true", Value::Boolean(false)),
            ("!!!!!!!!0", Value::Boolean(false)),
            ("!\"\"", Value::Boolean(true)),
            ("5 && (0 || 8) && false", Value::Boolean(false)),
            ("false || (12 && 8)", Value::Boolean(true)),
        ]);
    }

    #[test]
    fn test_conditionals() {
        expect_values(&[
            ("if (4 > 4) { 4 + 8 } else { 9 + 9 }", Value::Integer(18)),
            ("if (4 > 4) { 4 + 8\n 3 * 3 } else { 9 + 9 }", Value::Integer(18)),
            ("if (1) { 10 }", Value::Integer(10)),
            ("if (0) { 10 }", Value::Unit),
            ("if (\"\") { 1 } else { 2 }", Value::Integer(2)),
            (
                "if(5 >= 14) { return 6 } else { if(8 <= 9) { return 7 } else { return 0 } }",
                Value::Integer(7),
            ),
        ]);
    }

    #[test]
    fn test_return_statements() {
        expect_values(&[
            ("3 * 3\nreturn 4 * 4\n5 * 5", Value::Integer(16)),
            (
                "if (4 > 2) { if (4 < 3) { return 4 } return 2 }",
                Value::Integer(2),
            ),
            ("return", Value::Unit),
            ("let f = function() { return; 1 }; f()", Value::Unit),
            (
                "let f = function(x) { if (x) { if (true) { return 1 } }; 2 }; f(true) + f(false)",
                Value::Integer(3),
            ),
        ]);
    }

    #[test]
    fn test_let_bindings_and_shadowing() {
        expect_values(&[
            (
                "let a = 27 \n if(a < 5) { return a } else { 3 } \n a * a",
                Value::Integer(729),
            ),
            ("let a = 5; let b = a; b", Value::Integer(5)),
            ("let a = 1; let a = a + 1; a", Value::Integer(2)),
            ("let a = 1; if (true) { let a = 2 }; a", Value::Integer(1)),
            ("let a = 1; { let a = 2; a }", Value::Integer(2)),
            ("let a = 1; { let a = 2 }; a", Value::Integer(1)),
            ("let a = 1", Value::Unit),
            ("", Value::Unit),
            ("let s = \"玛咖巴卡\"\nreturn s", Value::String("玛咖巴卡".to_owned())),
        ]);
    }

    #[test]
    fn test_functions_and_calls() {
        expect_values(&[
            (
                "let a = 5\nlet b = 10\nfunction foo(a, b) { return a - b }\nfoo(b, a)",
                Value::Integer(5),
            ),
            ("let add = function(x, y) { x + y }; add(5, add(5, 5))", Value::Integer(15)),
            ("function(x) { x * 2 }(4)", Value::Integer(8)),
            ("let noop = function() {}; noop()", Value::Unit),
        ]);
    }

    #[test]
    fn test_closures() {
        expect_values(&[
            (
                "let adder = function(x) { function(y) { x + y } }\n\
                 let addTwo = adder(2)\n\
                 addTwo(3)",
                Value::Integer(5),
            ),
            (
                "let x = 1\n\
                 let f = function() { x }\n\
                 let g = function() { let x = 100; f() }\n\
                 g()",
                Value::Integer(1),
            ),
            (
                "let counter = function(start) {\n\
                   let step = 10\n\
                   function(n) { start + step * n }\n\
                 }\n\
                 let a = counter(1); let b = counter(2)\n\
                 a(1) + b(2)",
                Value::Integer(33),
            ),
        ]);
    }

    #[test]
    fn test_recursion() {
        let fib = "function fib(n) { if (n < 2) { return 0 } if (n == 2) { return 1 } \
                   return fib(n - 1) + fib(n - 2) }";

        for (n, expected) in [(5, 3), (6, 5), (15, 377)] {
            let source = format!("{}\nfib({})", fib, n);
            assert_eq!(eval(&source), Ok(Value::Integer(expected)), "fib({})", n);
        }
    }

    #[test]
    fn test_named_function_value() {
        let value = eval("function twice(x) { x * 2 }").unwrap();
        assert_eq!(value.to_string(), "<function twice>");
        assert_eq!(eval("function twice(x) { x * 2 }; twice == twice"), Ok(Value::Boolean(true)));
        assert_eq!(
            eval("function() { 1 } == function() { 1 }"),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn test_unbound_identifier() {
        assert!(matches!(
            eval("a + b"),
            Err(EvalError::UnboundIdentifier { name, .. }) if name == "a"
        ));
        assert!(matches!(
            eval("if (true) { let inner = 1 }; inner"),
            Err(EvalError::UnboundIdentifier { name, .. }) if name == "inner"
        ));
    }

    #[test]
    fn test_logical_operators_evaluate_both_sides() {
        for source in ["false && nope", "true || nope", "nope && false"] {
            assert!(
                matches!(
                    eval(source),
                    Err(EvalError::UnboundIdentifier { name, .. }) if name == "nope"
                ),
                "{}",
                source
            );
        }
    }

    #[test]
    fn test_deep_blocks() {
        let depth = 5_000;
        let source = format!("{}1{}", "{".repeat(depth), "}".repeat(depth));
        assert_eq!(eval(&source), Ok(Value::Integer(1)));

        let source = format!("{}return 2{}", "{".repeat(depth), "}".repeat(depth));
        assert_eq!(eval(&source), Ok(Value::Integer(2)));
    }

    #[test]
    fn test_type_errors() {
        assert!(matches!(
            eval("\"a\" + 1"),
            Err(EvalError::IllegalInfixOperation { .. })
        ));
        assert!(matches!(
            eval("-true"),
            Err(EvalError::IllegalPrefixOperation { .. })
        ));
        assert!(matches!(
            eval("1 < \"b\""),
            Err(EvalError::IllegalInfixOperation { .. })
        ));
        assert!(matches!(eval("5(1)"), Err(EvalError::NotCallable { .. })));
        assert!(matches!(
            eval("10 / (5 - 5)"),
            Err(EvalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_wrong_arity() {
        assert_eq!(
            eval("function f(a, b) { a }\nf(1)").map_err(|e| e.to_string()),
            Err("function `f` expects 2 argument(s) but got 1 at 2:1".to_owned())
        );
    }

    #[test]
    fn test_arguments_evaluated_in_caller_scope() {
        expect_values(&[(
            "let x = 3; let f = function(x) { x }; f(x + 1)",
            Value::Integer(4),
        )]);
    }

    #[test]
    fn test_call_depth_limit() {
        let mut interpreter = Interpreter::new(InterpreterConfig { max_call_depth: 50 });
        let result = interpreter.eval_program(&program(
            "function down(n) { if (n == 0) { 0 } else { down(n - 1) } }\ndown(100)",
        ));
        assert!(matches!(result, Err(EvalError::StackOverflow { depth: 50, .. })));

        assert_eq!(
            interpreter.eval_program(&program("down(10)")),
            Ok(Value::Integer(0))
        );
    }

    #[test]
    fn test_deep_recursion_within_limit() {
        expect_values(&[(
            "function sum(n) { if (n == 0) { return 0 } return n + sum(n - 1) }\nsum(5000)",
            Value::Integer(12_502_500),
        )]);
    }

    #[test]
    fn test_globals_persist_between_programs() {
        let mut interpreter = Interpreter::new(InterpreterConfig::default());
        interpreter.eval_program(&program("let a = 2")).unwrap();
        assert!(interpreter.eval_program(&program("a + nope")).is_err());
        assert_eq!(
            interpreter.eval_program(&program("a * 21")),
            Ok(Value::Integer(42))
        );
        assert_eq!(interpreter.globals().local_names(), vec!["a".to_owned()]);
    }
}
