use super::errors::{Item, ParseError, ParseErrorKind, ParseResult};
use super::grammar::{Block, Expr, ExprType, FuncInfo, Identifier, Literal, PrefixOperator};
use super::grammar::{Program, Stmt, StmtType};
use super::parser_utils::{ParserOperator, Precedence};
use super::span::Span;
use super::token::{Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

use std::rc::Rc;

/// Parses a complete token sequence into a `Program`.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: std::vec::IntoIter<Token>,
    current: Token,
    previous: Token,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end_of_input = Token::new(TokenKind::EndOfInput, "", Span::default());
        let mut tokens = tokens.into_iter();
        let current = tokens.next().unwrap_or_else(|| end_of_input.clone());

        Parser {
            tokens,
            current,
            previous: end_of_input,
        }
    }

    /// Advances the stream. Past the last token the stream keeps yielding
    /// `EndOfInput`.
    fn bump(&mut self) {
        let next = match self.tokens.next() {
            Some(token) => token,
            None => Token::new(TokenKind::EndOfInput, "", self.current.span),
        };
        self.previous = std::mem::replace(&mut self.current, next);
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consumes the current token if it has the given kind.
    fn check_consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            return true;
        }
        false
    }

    fn consume(&mut self, expected: TokenKind, item: Item) -> ParseResult<()> {
        if self.check_consume(expected) {
            Ok(())
        } else {
            Err(self.error_at_current(ParseErrorKind::ExpectedToken {
                expected,
                item,
                found: self.current.to_string(),
            }))
        }
    }

    fn error_at_current(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.current.span)
    }

    fn skip_semicolons(&mut self) {
        while self.check_consume(TokenKind::Semicolon) {}
    }

    /// Parses the program as a sequence of statements up to end of input.
    pub fn parse(mut self) -> ParseResult<Program> {
        let mut statements = vec![];

        loop {
            self.skip_semicolons();
            if self.check(TokenKind::EndOfInput) {
                break;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> ParseResult<Stmt> {
        let curr_span = self.current.span;

        let stmt_type = match self.current.kind {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::LeftBrace => {
                self.bump();
                StmtType::Block(self.parse_block_stmts(curr_span)?)
            }
            _ => StmtType::Expression(self.parse_expression()?),
        };

        Ok(Stmt::new(stmt_type, curr_span.extend(self.previous.span)))
    }

    fn parse_let(&mut self) -> ParseResult<StmtType> {
        self.bump();
        let name = self.parse_identifier(Item::LetStatement)?;
        self.consume(TokenKind::Equals, Item::LetName)?;
        let value = self.parse_expression()?;

        Ok(StmtType::Let(name, value))
    }

    fn parse_return(&mut self) -> ParseResult<StmtType> {
        self.bump();
        let value = match self.current.kind {
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::EndOfInput => None,
            _ => Some(self.parse_expression()?),
        };

        Ok(StmtType::Return(value))
    }

    /// Parses `{ <stmt>* }` where the opening brace is still the current token.
    fn parse_braced_block(&mut self, item: Item) -> ParseResult<Block> {
        let open_span = self.current.span;
        self.consume(TokenKind::LeftBrace, item)?;
        self.parse_block_stmts(open_span)
    }

    /// Parses block statements after the opening brace, up to and including
    /// the closing brace.
    fn parse_block_stmts(&mut self, open_span: Span) -> ParseResult<Block> {
        let mut statements = vec![];

        loop {
            self.skip_semicolons();
            match self.current.kind {
                TokenKind::RightBrace => {
                    self.bump();
                    break;
                }
                TokenKind::EndOfInput => {
                    return Err(ParseError::new(ParseErrorKind::UnclosedBlock, open_span));
                }
                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(Block::new(statements, open_span.extend(self.previous.span)))
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.run_pratt_parse_algo(Precedence::Lowest)
    }

    /// Pratt parsing algo.
    fn run_pratt_parse_algo(&mut self, min_precedence: Precedence) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| self.pratt_parse(min_precedence))
    }

    fn pratt_parse(&mut self, min_precedence: Precedence) -> ParseResult<Expr> {
        let prefix_op = match self.current.kind {
            TokenKind::Bang => Some(PrefixOperator::LogicalNot),
            TokenKind::Minus => Some(PrefixOperator::Negate),
            _ => None,
        };

        let mut lhs = match prefix_op {
            Some(op) => {
                let curr_span = self.current.span;
                self.bump();
                let operand = self.run_pratt_parse_algo(Precedence::Prefix)?;
                Expr::new(
                    ExprType::Prefix(op, Box::new(operand)),
                    curr_span.extend(self.previous.span),
                )
            }
            None => self.parse_primary()?,
        };

        while let Some(op) = ParserOperator::from_token(self.current.kind) {
            if !op.is_higher_precedence(min_precedence) {
                break;
            }

            self.bump();
            let lhs_span = lhs.span;

            let new_lhs = match op {
                ParserOperator::Infix(infix) => {
                    let rhs = self.run_pratt_parse_algo(op.precedence())?;
                    ExprType::Infix(infix, Box::new(lhs), Box::new(rhs))
                }
                ParserOperator::Call => {
                    let arguments =
                        self.parse_comma_sep(Item::ArgumentList, Self::parse_expression)?;
                    ExprType::Call(Box::new(lhs), arguments)
                }
            };

            lhs = Expr::new(new_lhs, lhs_span.extend(self.previous.span));
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        self.bump();
        let curr_span = self.previous.span;

        let expr = match self.previous.kind {
            TokenKind::Integer => {
                let text = &self.previous.text;
                match text.parse() {
                    Ok(n) => ExprType::Literal(Literal::Integer(n)),
                    Err(_) => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidInteger(text.clone()),
                            curr_span,
                        ))
                    }
                }
            }
            TokenKind::String => ExprType::Literal(Literal::Str(self.previous.text.clone())),
            TokenKind::True => ExprType::Literal(Literal::Boolean(true)),
            TokenKind::False => ExprType::Literal(Literal::Boolean(false)),
            TokenKind::Identifier => {
                ExprType::Identifier(Identifier::new(self.previous.text.clone(), curr_span))
            }
            TokenKind::LeftParen => {
                let sub_expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen, Item::Grouping)?;
                return Ok(sub_expr);
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::Function => ExprType::Function(Rc::new(self.parse_function()?)),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedExpression {
                        found: self.previous.to_string(),
                    },
                    curr_span,
                ))
            }
        };

        Ok(Expr::new(expr, curr_span.extend(self.previous.span)))
    }

    fn parse_if(&mut self) -> ParseResult<ExprType> {
        self.consume(TokenKind::LeftParen, Item::If)?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, Item::Condition)?;

        let consequence = self.parse_braced_block(Item::IfBody)?;
        let alternative = if self.check_consume(TokenKind::Else) {
            Some(self.parse_braced_block(Item::ElseBody)?)
        } else {
            None
        };

        Ok(ExprType::If(Box::new(condition), consequence, alternative))
    }

    fn parse_function(&mut self) -> ParseResult<FuncInfo> {
        let name = if self.check(TokenKind::Identifier) {
            Some(self.parse_identifier(Item::FunctionKeyword)?)
        } else {
            None
        };

        self.consume(TokenKind::LeftParen, Item::FunctionKeyword)?;
        let params =
            self.parse_comma_sep(Item::ParameterList, |this| {
                this.parse_identifier(Item::ParameterList)
            })?;
        let body = self.parse_braced_block(Item::FunctionBody)?;

        Ok(FuncInfo { name, params, body })
    }

    fn parse_identifier(&mut self, item: Item) -> ParseResult<Identifier> {
        if self.check_consume(TokenKind::Identifier) {
            Ok(Identifier::new(
                self.previous.text.clone(),
                self.previous.span,
            ))
        } else {
            Err(self.error_at_current(ParseErrorKind::ExpectedIdentifier {
                item,
                found: self.current.to_string(),
            }))
        }
    }

    /// Parses a comma separated list after its opening parenthesis, up to and
    /// including the closing one. A trailing comma is allowed.
    fn parse_comma_sep<T, F>(&mut self, item: Item, parser: F) -> ParseResult<Vec<T>>
    where
        F: Fn(&mut Parser) -> ParseResult<T>,
    {
        let mut items = vec![];
        if self.check_consume(TokenKind::RightParen) {
            return Ok(items);
        }

        items.push(parser(self)?);

        while !self.check_consume(TokenKind::RightParen) {
            self.consume(TokenKind::Comma, item)?;
            if self.check_consume(TokenKind::RightParen) {
                break;
            }
            items.push(parser(self)?);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    fn parse_source(source: &str) -> ParseResult<Program> {
        parse(tokenize(source).unwrap())
    }

    fn ast(source: &str) -> String {
        match parse_source(source) {
            Ok(program) => program.ast_string(),
            Err(e) => panic!("failed to parse `{}`: {}", source, e),
        }
    }

    fn error_kind(source: &str) -> ParseErrorKind {
        match parse_source(source) {
            Ok(program) => panic!("expected error, got `{}`", program.ast_string()),
            Err(e) => e.kind,
        }
    }

    #[test]
    fn test_precedence() {
        let cases = [
            ("a + b * c", "(+ a (* b c))"),
            ("a * b + c", "(+ (* a b) c)"),
            ("-a * b", "(* (- a) b)"),
            ("!-a", "(! (- a))"),
            ("a + b(c) * d", "(+ a (* (call b c) d))"),
            ("-f(x)", "(- (call f x))"),
            ("5 < 4 != 3 > 4", "(!= (< 5 4) (> 3 4))"),
            ("a <= b == c >= d", "(== (<= a b) (>= c d))"),
            (
                "a || b && c == d < e + f",
                "(|| a (&& b (== c (< d (+ e f)))))",
            ),
            ("a && b || c && d", "(|| (&& a b) (&& c d))"),
            ("(a + b) * c", "(* (+ a b) c)"),
            ("(3 > 2) != (2 > 3)", "(!= (> 3 2) (> 2 3))"),
        ];

        for (source, expected) in cases {
            assert_eq!(ast(source), expected, "for `{}`", source);
        }
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(ast("a - b - c"), "(- (- a b) c)");
        assert_eq!(ast("a / b * c"), "(* (/ a b) c)");
        assert_eq!(ast("a == b != c"), "(!= (== a b) c)");
        assert_eq!(ast("a || b || c"), "(|| (|| a b) c)");
        assert_eq!(ast("f(a)(b)"), "(call (call f a) b)");
    }

    #[test]
    fn test_statements() {
        assert_eq!(ast("let a = 1; return a;a"), "(let a 1)\n(return a)\na");
        assert_eq!(ast("18;99"), "18\n99");
        assert_eq!(ast("-18"), "(- 18)");
        assert_eq!(ast("tre false true"), "tre\nfalse\ntrue");
        assert_eq!(ast("{ let a = 1 }"), "{(let a 1)}");
        assert_eq!(ast(";;1;;"), "1");
        assert_eq!(ast(""), "");
    }

    #[test]
    fn test_return_without_value() {
        assert_eq!(ast("return"), "(return)");
        assert_eq!(ast("return;"), "(return)");
        assert_eq!(ast("{ return }"), "{(return)}");
        assert_eq!(ast("return 8 + 9"), "(return (+ 8 9))");
    }

    #[test]
    fn test_if_expression() {
        assert_eq!(
            ast("if (x < y) { x } else { y }"),
            "(if (< x y) {x} {y})"
        );
        assert_eq!(
            ast("if (a * b) { a + b; 1 }"),
            "(if (* a b) {(+ a b) 1})"
        );
        assert_eq!(
            ast("if (a) { if (b) { return 4 } return 2 }"),
            "(if a {(if b {(return 4)}) (return 2)})"
        );
    }

    #[test]
    fn test_function_literals() {
        assert_eq!(
            ast("function(x, y) { x + y; }"),
            "(function (x y) {(+ x y)})"
        );
        assert_eq!(ast("function() { 1 }"), "(function () {1})");
        assert_eq!(
            ast("function fib(n) { return n }"),
            "(function fib(n) {(return n)})"
        );
        assert_eq!(
            ast("function(b, c){}(b, c);"),
            "(call (function (b c) {}) b c)"
        );
        assert_eq!(ast("f()"), "(call f)");
        assert_eq!(ast("f(1, 2,)"), "(call f 1 2)");
    }

    #[test]
    fn test_literal_values() {
        let program = parse_source("\"hi there\"; 42").unwrap();
        let literals: Vec<_> = program
            .statements
            .iter()
            .map(|stmt| match &stmt.stmt {
                StmtType::Expression(Expr {
                    expr: ExprType::Literal(l),
                    ..
                }) => l.clone(),
                other => panic!("unexpected statement {:?}", other),
            })
            .collect();

        assert_eq!(
            literals,
            vec![Literal::Str("hi there".to_owned()), Literal::Integer(42)]
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "let f = function(a) { if (a > 1) { a * f(a - 1) } else { 1 } }; f(5)";
        assert_eq!(parse_source(source), parse_source(source));
    }

    #[test]
    fn test_spans() {
        let program = parse_source("let a = 1 +\n  2").unwrap();
        let span = program.statements[0].span;
        assert_eq!(span.start_pos.line_no, 1);
        assert_eq!(span.end_pos.line_no, 2);
        assert_eq!(span.end_pos.column_no, 4);
    }

    #[test]
    fn test_let_errors() {
        assert!(matches!(
            error_kind("let = 5"),
            ParseErrorKind::ExpectedIdentifier {
                item: Item::LetStatement,
                ..
            }
        ));
        assert!(matches!(
            error_kind("let a 5"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::Equals,
                item: Item::LetName,
                ..
            }
        ));
        assert!(matches!(
            error_kind("let a ="),
            ParseErrorKind::ExpectedExpression { .. }
        ));
    }

    #[test]
    fn test_if_errors() {
        assert!(matches!(
            error_kind("if x { 1 }"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::LeftParen,
                item: Item::If,
                ..
            }
        ));
        assert!(matches!(
            error_kind("if (x) 1"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::LeftBrace,
                item: Item::IfBody,
                ..
            }
        ));
        assert!(matches!(
            error_kind("if (x) { 1 } else 2"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::LeftBrace,
                item: Item::ElseBody,
                ..
            }
        ));
    }

    #[test]
    fn test_parenthesis_errors() {
        assert!(matches!(
            error_kind("(1 + 2"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::RightParen,
                item: Item::Grouping,
                ..
            }
        ));
        assert_eq!(
            error_kind("1 + 2)"),
            ParseErrorKind::ExpectedExpression {
                found: "`)`".to_owned()
            }
        );
        assert!(matches!(
            error_kind("f(1 2)"),
            ParseErrorKind::ExpectedToken {
                expected: TokenKind::Comma,
                item: Item::ArgumentList,
                ..
            }
        ));
        assert!(matches!(
            error_kind("function(a, 1) {}"),
            ParseErrorKind::ExpectedIdentifier {
                item: Item::ParameterList,
                ..
            }
        ));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_source("if (x) {\n  1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedBlock);
        assert_eq!(err.span.start_pos.line_no, 1);
        assert_eq!(err.span.start_pos.column_no, 8);

        assert_eq!(
            error_kind("function() { 1"),
            ParseErrorKind::UnclosedBlock
        );
    }

    #[test]
    fn test_invalid_integer() {
        assert_eq!(
            error_kind("99999999999999999999"),
            ParseErrorKind::InvalidInteger("99999999999999999999".to_owned())
        );
    }

    #[test]
    fn test_error_message() {
        let err = parse_source("let a 5").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected `=` after the name in a let statement, but found integer literal `5` at 1:7"
        );
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 5_000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(ast(&source), "1");
    }

    #[test]
    fn test_deep_block_nesting() {
        let depth = 5_000;
        let source = format!("{}1{}", "{".repeat(depth), "}".repeat(depth));
        assert_eq!(ast(&source), source);
    }
}
