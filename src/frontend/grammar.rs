use super::span::Span;
use crate::stack::ensure_sufficient_stack;

use std::mem;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOperator {
    Negate,
    LogicalNot,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterEq,
    LessThan,
    LessEq,
    And,
    Or,
}

/// Root of every parsed source text.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub stmt: StmtType,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtType {
    Let(Identifier, Expr),
    Return(Option<Expr>),
    Expression(Expr),
    Block(Block),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub expr: ExprType,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprType {
    Literal(Literal),
    Identifier(Identifier),
    Prefix(PrefixOperator, Box<Expr>),
    Infix(InfixOperator, Box<Expr>, Box<Expr>),
    If(Box<Expr>, Block, Option<Block>),
    Function(Rc<FuncInfo>),
    Call(Box<Expr>, Vec<Expr>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FuncInfo {
    pub name: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Literal {
    Integer(i64),
    Boolean(bool),
    Str(String),
}

impl PrefixOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            PrefixOperator::LogicalNot => "!",
            PrefixOperator::Negate => "-",
        }
    }
}

impl InfixOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::EqualTo => "==",
            InfixOperator::NotEqualTo => "!=",
            InfixOperator::GreaterThan => ">",
            InfixOperator::GreaterEq => ">=",
            InfixOperator::LessThan => "<",
            InfixOperator::LessEq => "<=",
            InfixOperator::And => "&&",
            InfixOperator::Or => "||",
        }
    }
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl Stmt {
    pub fn new(stmt: StmtType, span: Span) -> Self {
        Stmt { stmt, span }
    }

    pub fn ast_string(&self) -> String {
        ensure_sufficient_stack(|| self.ast_string_inner())
    }

    fn ast_string_inner(&self) -> String {
        match &self.stmt {
            StmtType::Let(name, value) => format!("(let {} {})", name.name, value.ast_string()),
            StmtType::Return(Some(value)) => format!("(return {})", value.ast_string()),
            StmtType::Return(None) => "(return)".to_owned(),
            StmtType::Expression(expr) => expr.ast_string(),
            StmtType::Block(block) => block.ast_string(),
        }
    }
}

impl Block {
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Block { statements, span }
    }

    pub fn ast_string(&self) -> String {
        let stmts: Vec<_> = self.statements.iter().map(Stmt::ast_string).collect();
        format!("{{{}}}", stmts.join(" "))
    }
}

impl Program {
    /// One s-expression per statement, separated by newlines.
    pub fn ast_string(&self) -> String {
        let stmts: Vec<_> = self.statements.iter().map(Stmt::ast_string).collect();
        stmts.join("\n")
    }
}

impl Expr {
    pub fn new(expr: ExprType, span: Span) -> Self {
        Expr { expr, span }
    }

    pub fn ast_string(&self) -> String {
        ensure_sufficient_stack(|| self.ast_string_inner())
    }

    fn ast_string_inner(&self) -> String {
        match &self.expr {
            ExprType::Literal(l) => match l {
                Literal::Integer(n) => n.to_string(),
                Literal::Boolean(b) => b.to_string(),
                Literal::Str(s) => format!("\"{}\"", s),
            },
            ExprType::Identifier(ident) => ident.name.clone(),
            ExprType::Prefix(op, expr) => format!("({} {})", op.symbol(), expr.ast_string()),
            ExprType::Infix(op, lhs, rhs) => format!(
                "({} {} {})",
                op.symbol(),
                lhs.ast_string(),
                rhs.ast_string()
            ),
            ExprType::If(condition, consequence, alternative) => match alternative {
                Some(alternative) => format!(
                    "(if {} {} {})",
                    condition.ast_string(),
                    consequence.ast_string(),
                    alternative.ast_string()
                ),
                None => format!(
                    "(if {} {})",
                    condition.ast_string(),
                    consequence.ast_string()
                ),
            },
            ExprType::Function(func) => {
                let params: Vec<_> = func.params.iter().map(|p| p.name.as_str()).collect();
                let name = func.name.as_ref().map_or("", |n| n.name.as_str());
                format!(
                    "(function {}({}) {})",
                    name,
                    params.join(" "),
                    func.body.ast_string()
                )
            }
            ExprType::Call(callee, args) => {
                let mut parts = vec!["call".to_owned(), callee.ast_string()];
                parts.extend(args.iter().map(Expr::ast_string));
                format!("({})", parts.join(" "))
            }
        }
    }
}

impl ExprType {
    fn is_leaf(&self) -> bool {
        matches!(self, ExprType::Literal(_) | ExprType::Identifier(_))
    }
}

// Deeply nested trees are freed with an explicit work list. The derived drop
// glue would recurse once per level and overflow the stack.
impl Drop for Expr {
    fn drop(&mut self) {
        if self.expr.is_leaf() {
            return;
        }
        let mut teardown = Teardown::default();
        teardown.detach_expr(self);
        teardown.run();
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if self.statements.is_empty() {
            return;
        }
        let mut teardown = Teardown::default();
        teardown.detach_block(self);
        teardown.run();
    }
}

/// Nodes whose children have not been detached yet.
#[derive(Default)]
struct Teardown {
    exprs: Vec<Expr>,
    blocks: Vec<Block>,
}

impl Teardown {
    fn run(mut self) {
        loop {
            if let Some(mut expr) = self.exprs.pop() {
                self.detach_expr(&mut expr);
            } else if let Some(mut block) = self.blocks.pop() {
                self.detach_block(&mut block);
            } else {
                break;
            }
        }
    }

    /// Leaves `expr` as a leaf, moving its children onto the work list.
    fn detach_expr(&mut self, expr: &mut Expr) {
        let placeholder = ExprType::Literal(Literal::Boolean(false));
        match mem::replace(&mut expr.expr, placeholder) {
            ExprType::Literal(_) | ExprType::Identifier(_) => {}
            ExprType::Prefix(_, operand) => self.exprs.push(*operand),
            ExprType::Infix(_, lhs, rhs) => {
                self.exprs.push(*lhs);
                self.exprs.push(*rhs);
            }
            ExprType::If(condition, consequence, alternative) => {
                self.exprs.push(*condition);
                self.blocks.push(consequence);
                self.blocks.extend(alternative);
            }
            // A body still shared with a live function value is freed with it.
            ExprType::Function(info) => {
                if let Ok(info) = Rc::try_unwrap(info) {
                    self.blocks.push(info.body);
                }
            }
            ExprType::Call(callee, args) => {
                self.exprs.push(*callee);
                self.exprs.extend(args);
            }
        }
    }

    fn detach_block(&mut self, block: &mut Block) {
        for stmt in mem::take(&mut block.statements) {
            match stmt.stmt {
                StmtType::Let(_, expr)
                | StmtType::Expression(expr)
                | StmtType::Return(Some(expr)) => self.exprs.push(expr),
                StmtType::Return(None) => {}
                StmtType::Block(inner) => self.blocks.push(inner),
            }
        }
    }
}
