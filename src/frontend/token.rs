use super::span::Span;

use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Comma,
    Semicolon,

    // One or two character tokens.
    Bang,
    BangEq,
    Equals,
    DoubleEq,
    LeftAngle,
    LeftAngleEq,
    RightAngle,
    RightAngleEq,
    DoubleAmpersand,
    DoublePipe,

    // Literals.
    Identifier,
    Integer,
    String,

    // Keywords.
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    EndOfInput,
}

/// A lexeme together with its classification and location.
///
/// `text` is the exact source lexeme, except for string literals where it is
/// the body between the quotes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl TokenKind {
    /// Keyword kind for an identifier-shaped lexeme, if it is reserved.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "function" => TokenKind::Function,
            "let" => TokenKind::Let,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            _ => return None,
        };
        Some(kind)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Asterisk => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Bang => "`!`",
            TokenKind::BangEq => "`!=`",
            TokenKind::Equals => "`=`",
            TokenKind::DoubleEq => "`==`",
            TokenKind::LeftAngle => "`<`",
            TokenKind::LeftAngleEq => "`<=`",
            TokenKind::RightAngle => "`>`",
            TokenKind::RightAngleEq => "`>=`",
            TokenKind::DoubleAmpersand => "`&&`",
            TokenKind::DoublePipe => "`||`",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer literal",
            TokenKind::String => "string literal",
            TokenKind::Function => "`function`",
            TokenKind::Let => "`let`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::Return => "`return`",
            TokenKind::EndOfInput => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.describe())
    }
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Re-serializes the token the way it appeared in source.
    pub fn source_text(&self) -> String {
        match self.kind {
            TokenKind::String => format!("\"{}\"", self.text),
            _ => self.text.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Integer => {
                write!(f, "{} `{}`", self.kind, self.text)
            }
            TokenKind::String => write!(f, "string \"{}\"", self.text),
            kind => write!(f, "{}", kind),
        }
    }
}
