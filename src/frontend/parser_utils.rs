use super::grammar::InfixOperator;
use super::token::TokenKind;

/// Operators that continue an expression once its left-hand side is parsed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParserOperator {
    Infix(InfixOperator),
    Call,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Precedence {
    // Lowest precedence
    Lowest,
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    Addition,
    Multiplication,
    Prefix,
    Call, // Highest precedence
}

impl ParserOperator {
    pub fn from_token(kind: TokenKind) -> Option<ParserOperator> {
        let op = match kind {
            TokenKind::Plus => InfixOperator::Add,
            TokenKind::Minus => InfixOperator::Subtract,
            TokenKind::Asterisk => InfixOperator::Multiply,
            TokenKind::Slash => InfixOperator::Divide,
            TokenKind::DoubleEq => InfixOperator::EqualTo,
            TokenKind::BangEq => InfixOperator::NotEqualTo,
            TokenKind::RightAngle => InfixOperator::GreaterThan,
            TokenKind::RightAngleEq => InfixOperator::GreaterEq,
            TokenKind::LeftAngle => InfixOperator::LessThan,
            TokenKind::LeftAngleEq => InfixOperator::LessEq,
            TokenKind::DoubleAmpersand => InfixOperator::And,
            TokenKind::DoublePipe => InfixOperator::Or,
            TokenKind::LeftParen => return Some(ParserOperator::Call),
            _ => return None,
        };
        Some(ParserOperator::Infix(op))
    }

    /// Every operator is left-associative, so an operator only binds when it
    /// is strictly tighter than the current frame's minimum.
    pub fn is_higher_precedence(&self, min_precedence: Precedence) -> bool {
        self.precedence() > min_precedence
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            ParserOperator::Infix(op) => match op {
                InfixOperator::Add | InfixOperator::Subtract => Precedence::Addition,
                InfixOperator::Multiply | InfixOperator::Divide => Precedence::Multiplication,
                InfixOperator::EqualTo | InfixOperator::NotEqualTo => Precedence::Equality,
                InfixOperator::GreaterEq
                | InfixOperator::LessEq
                | InfixOperator::GreaterThan
                | InfixOperator::LessThan => Precedence::Comparison,
                InfixOperator::And => Precedence::LogicalAnd,
                InfixOperator::Or => Precedence::LogicalOr,
            },
            ParserOperator::Call => Precedence::Call,
        }
    }
}
