use rusty_monkey::{run, InterpreterError};

use regex::Regex;
use test_generator::test_resources;

#[derive(Debug, PartialEq)]
enum Outcome {
    Value(String),
    Error(&'static str, String),
}

#[test_resources("tests/scripts/**/*.monkey")]
fn test_script(file: &str) {
    let source = std::fs::read_to_string(file).unwrap();

    let expected = get_expected_outcome(&source);
    let actual = match run(&source) {
        Ok(value) => Outcome::Value(value.to_string()),
        Err(e) => {
            let stage = match e {
                InterpreterError::Lex(_) => "lex",
                InterpreterError::Parse(_) => "parse",
                InterpreterError::Eval(_) => "eval",
            };
            Outcome::Error(stage, e.to_string())
        }
    };

    match (&expected, &actual) {
        (Outcome::Error(stage, message), Outcome::Error(actual_stage, actual_message)) => {
            assert_eq!(stage, actual_stage, "in {}", file);
            assert!(
                actual_message.contains(message.as_str()),
                "in {}: `{}` does not mention `{}`",
                file,
                actual_message,
                message
            );
        }
        _ => assert_eq!(expected, actual, "in {}", file),
    }
}

/// Reads `// expect: <value>` or `// expect <stage> error: <message>` from
/// the script. The last matching line wins.
fn get_expected_outcome(source: &str) -> Outcome {
    let value_regexer = Regex::new(r"// expect: (.*)$").unwrap();
    let error_regexer = Regex::new(r"// expect (lex|parse|eval) error: (.*)$").unwrap();

    let mut expected = None;
    for line in source.lines() {
        if let Some(r) = value_regexer.captures(line) {
            expected = Some(Outcome::Value(r[1].trim().to_owned()));
        }
        if let Some(r) = error_regexer.captures(line) {
            let stage = match &r[1] {
                "lex" => "lex",
                "parse" => "parse",
                _ => "eval",
            };
            expected = Some(Outcome::Error(stage, r[2].trim().to_owned()));
        }
    }

    expected.expect("script has no expectation comment")
}
