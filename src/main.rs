use clap::Parser;
use rusty_monkey::frontend;
use rusty_monkey::treewalk_interpreter::{
    Interpreter, InterpreterConfig, Value, DEFAULT_MAX_CALL_DEPTH,
};
use rusty_monkey::InterpreterError;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::{fs, process};

const EXIT_DATA_ERROR: i32 = 65;
const EXIT_SOFTWARE_ERROR: i32 = 70;
const EXIT_IO_ERROR: i32 = 74;

#[derive(Parser, Debug)]
#[clap(name = "rmonkey", version, about = "Runs a script, or starts a REPL without one")]
struct Args {
    /// Script file to run.
    script: Option<PathBuf>,

    /// Maximum depth of nested function calls.
    #[clap(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Print the token stream before evaluating.
    #[clap(long)]
    print_tokens: bool,

    /// Print the parsed program as s-expressions before evaluating.
    #[clap(long)]
    print_ast: bool,
}

fn main() {
    init_tracing();

    let args = Args::parse();
    let config = InterpreterConfig {
        max_call_depth: args.max_call_depth,
    };
    let mut interpreter = Interpreter::new(config);

    let result = match &args.script {
        Some(path) => run_file(&mut interpreter, path, &args),
        None => run_prompt(&mut interpreter, &args),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(EXIT_IO_ERROR);
    }
}

/// Logs go to stderr, only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_prompt(interpreter: &mut Interpreter, args: &Args) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock();

    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if lines.read_line(&mut input)? == 0 {
            println!();
            return Ok(());
        }

        match run(interpreter, &input, args) {
            Ok(Value::Unit) => {}
            Ok(value) => println!("{}", value),
            Err(e) => eprintln!("{}", e.render(&input)),
        }
    }
}

fn run_file(interpreter: &mut Interpreter, path: &Path, args: &Args) -> io::Result<()> {
    let contents = fs::read_to_string(path)?;

    match run(interpreter, &contents, args) {
        Ok(Value::Unit) => Ok(()),
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.render(&contents));
            let code = match e {
                InterpreterError::Lex(_) | InterpreterError::Parse(_) => EXIT_DATA_ERROR,
                InterpreterError::Eval(_) => EXIT_SOFTWARE_ERROR,
            };
            process::exit(code);
        }
    }
}

fn run(
    interpreter: &mut Interpreter,
    source: &str,
    args: &Args,
) -> Result<Value, InterpreterError> {
    let tokens = frontend::tokenize(source)?;
    if args.print_tokens {
        for token in tokens.iter() {
            let position = token.span.start_pos.to_string();
            println!("{:>7}  {:<18} {}", position, token.kind, token.text);
        }
    }

    let program = frontend::parse(tokens)?;
    if args.print_ast {
        println!("{}", program.ast_string());
    }

    Ok(interpreter.eval_program(&program)?)
}
