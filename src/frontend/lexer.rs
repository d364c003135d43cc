use super::cursor::Cursor;
use super::errors::{LexError, LexResult};
use super::span::Span;
use super::token::{Token, TokenKind};

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    finished: bool,
}

/// Tokenizes the whole source. The result always ends with a single
/// `EndOfInput` token.
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];

    loop {
        let token = lexer.next_token()?;
        let at_end = token.kind == TokenKind::EndOfInput;
        tokens.push(token);

        if at_end {
            return Ok(tokens);
        }
    }
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
            finished: false,
        }
    }

    /// Returns the next token. Keeps returning `EndOfInput` once the source
    /// is exhausted.
    pub fn next_token(&mut self) -> LexResult<Token> {
        loop {
            self.cursor.take_while(is_whitespace_char);

            let start_pos = self.cursor.position();
            let kind = self.lex_token()?;
            let end_pos = self.cursor.position();

            let kind = match kind {
                Some(kind) => kind,
                // Comment.
                None => continue,
            };

            let text = match kind {
                TokenKind::String => self
                    .cursor
                    .slice(start_pos.byte_pos + 1, end_pos.byte_pos - 1),
                _ => self.cursor.slice(start_pos.byte_pos, end_pos.byte_pos),
            };

            return Ok(Token::new(kind, text, Span::new(start_pos, end_pos)));
        }
    }

    fn lex_token(&mut self) -> LexResult<Option<TokenKind>> {
        let position = self.cursor.position();
        let ch = match self.cursor.take() {
            Some(ch) => ch,
            None => return Ok(Some(TokenKind::EndOfInput)),
        };

        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,

            // Slash can either be comment or division.
            '/' => {
                if self.cursor.take_if('/') {
                    self.cursor.take_while(|ch| ch != '\n');
                    return Ok(None);
                }
                TokenKind::Slash
            }

            '=' => self.look_for_second('=', TokenKind::Equals, TokenKind::DoubleEq),
            '!' => self.look_for_second('=', TokenKind::Bang, TokenKind::BangEq),
            '<' => self.look_for_second('=', TokenKind::LeftAngle, TokenKind::LeftAngleEq),
            '>' => self.look_for_second('=', TokenKind::RightAngle, TokenKind::RightAngleEq),

            // `&` and `|` only exist doubled.
            '&' | '|' => {
                if self.cursor.take_if(ch) {
                    if ch == '&' {
                        TokenKind::DoubleAmpersand
                    } else {
                        TokenKind::DoublePipe
                    }
                } else {
                    return Err(LexError::UnrecognizedCharacter { ch, position });
                }
            }

            '"' => {
                self.cursor.take_while(|ch| ch != '"');
                if !self.cursor.take_if('"') {
                    return Err(LexError::UnterminatedString { position });
                }
                TokenKind::String
            }

            _ if is_digit_char(ch) => {
                self.cursor.take_while(is_digit_char);
                TokenKind::Integer
            }

            _ if is_identifier_start(ch) => self.lex_identifier_or_kw(position.byte_pos),

            _ => return Err(LexError::UnrecognizedCharacter { ch, position }),
        };

        Ok(Some(kind))
    }

    /// Consumes `second` if it is next and returns `double`, else `single`.
    fn look_for_second(&mut self, second: char, single: TokenKind, double: TokenKind) -> TokenKind {
        if self.cursor.take_if(second) {
            double
        } else {
            single
        }
    }

    fn lex_identifier_or_kw(&mut self, start_idx: usize) -> TokenKind {
        self.cursor.take_while(is_identifier_char);

        let lexeme = self.cursor.slice(start_idx, self.cursor.offset());
        TokenKind::keyword(lexeme).unwrap_or(TokenKind::Identifier)
    }

    /// Returns an iterator version of the lexer. It yields the `EndOfInput`
    /// token once, or stops after the first error.
    pub fn iter(self) -> LexerIterator<'src> {
        LexerIterator { lexer: self }
    }
}

pub struct LexerIterator<'src> {
    lexer: Lexer<'src>,
}

impl<'src> Iterator for LexerIterator<'src> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.lexer.finished {
            return None;
        }

        let result = self.lexer.next_token();
        match &result {
            Ok(token) if token.kind != TokenKind::EndOfInput => {}
            _ => self.lexer.finished = true,
        }

        Some(result)
    }
}

fn is_whitespace_char(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_digit_char(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_char(ch: char) -> bool {
    is_identifier_start(ch) || is_digit_char(ch)
}
