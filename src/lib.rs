//! A tree-walking interpreter for a small dynamically typed scripting
//! language with integers, booleans, strings, `let` bindings, `if`/`else`
//! expressions and first-class functions with closures.
//!
//! The pipeline is [`frontend::tokenize`], then [`frontend::parse`], then
//! [`treewalk_interpreter::evaluate`]. [`run`] chains the three and reports
//! which stage failed.

pub mod frontend;
mod stack;
pub mod treewalk_interpreter;

use frontend::span::CodePosition;
use frontend::{LexError, ParseError};
use treewalk_interpreter::{EvalError, Interpreter, InterpreterConfig, Value};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum InterpreterError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("eval error: {0}")]
    Eval(#[from] EvalError),
}

impl InterpreterError {
    pub fn position(&self) -> CodePosition {
        match self {
            InterpreterError::Lex(e) => e.position(),
            InterpreterError::Parse(e) => e.span.start_pos,
            InterpreterError::Eval(e) => e.span().start_pos,
        }
    }

    /// Formats the error followed by the offending source line and a caret
    /// under the error position.
    pub fn render(&self, source: &str) -> String {
        let position = self.position();
        let line = match position.line_no.checked_sub(1) {
            Some(idx) => source.lines().nth(idx),
            None => None,
        };

        match line {
            Some(line) => {
                let gutter = position.line_no.to_string();
                let caret_offset = position.column_no.saturating_sub(1);
                format!(
                    "{}\n{} | {}\n{} | {}^",
                    self,
                    gutter,
                    line,
                    " ".repeat(gutter.len()),
                    " ".repeat(caret_offset)
                )
            }
            None => self.to_string(),
        }
    }
}

/// Tokenizes, parses and evaluates `source` with the default configuration.
pub fn run(source: &str) -> Result<Value, InterpreterError> {
    run_with_config(source, InterpreterConfig::default())
}

pub fn run_with_config(source: &str, config: InterpreterConfig) -> Result<Value, InterpreterError> {
    run_in(&mut Interpreter::new(config), source)
}

/// Runs `source` on an existing interpreter so that global bindings carry
/// over between calls.
pub fn run_in(interpreter: &mut Interpreter, source: &str) -> Result<Value, InterpreterError> {
    let tokens = frontend::tokenize(source)?;
    debug!(tokens = tokens.len(), "lexed source");

    let program = frontend::parse(tokens)?;
    debug!(statements = program.statements.len(), "parsed program");

    let value = interpreter.eval_program(&program)?;
    debug!(value = %value, "evaluated program");

    Ok(value)
}
