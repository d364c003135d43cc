use super::span::{CodePosition, Span};
use super::token::TokenKind;

use std::fmt;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at {position}")]
    UnterminatedString { position: CodePosition },
    #[error("unrecognized character `{ch}` at {position}")]
    UnrecognizedCharacter { ch: char, position: CodePosition },
}

pub type LexResult<T> = Result<T, LexError>;

impl LexError {
    pub fn position(&self) -> CodePosition {
        match self {
            LexError::UnterminatedString { position }
            | LexError::UnrecognizedCharacter { position, .. } => *position,
        }
    }
}

/// The construct the parser was in the middle of when it failed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Item {
    LetName,
    LetStatement,
    If,
    Condition,
    IfBody,
    ElseBody,
    Grouping,
    FunctionKeyword,
    FunctionBody,
    ParameterList,
    ArgumentList,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Item::LetName => "after the name in a let statement",
            Item::LetStatement => "after `let`",
            Item::If => "after `if`",
            Item::Condition => "after the if condition",
            Item::IfBody => "before the if body",
            Item::ElseBody => "after `else`",
            Item::Grouping => "to close the parenthesized expression",
            Item::FunctionKeyword => "to open the parameter list",
            Item::FunctionBody => "before the function body",
            Item::ParameterList => "in the parameter list",
            Item::ArgumentList => "in the argument list",
        };
        f.write_str(text)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ParseErrorKind {
    #[error("expected {expected} {item}, but found {found}")]
    ExpectedToken {
        expected: TokenKind,
        item: Item,
        found: String,
    },
    #[error("expected identifier {item}, but found {found}")]
    ExpectedIdentifier { item: Item, found: String },
    #[error("expected expression, but found {found}")]
    ExpectedExpression { found: String },
    #[error("unclosed block, expected `}}` before end of input")]
    UnclosedBlock,
    #[error("integer literal `{0}` does not fit in 64 bits")]
    InvalidInteger(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }
}
