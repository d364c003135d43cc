mod environment;
mod errors;
mod function;
mod interpreter;
mod value;

pub use environment::Environment;
pub use errors::{EvalError, EvalResult};
pub use function::Function;
pub use interpreter::{evaluate, Interpreter, InterpreterConfig, DEFAULT_MAX_CALL_DEPTH};
pub use value::Value;
