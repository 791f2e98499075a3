// Small statement IR for generated fragments. Shape handlers build these;
// `render` turns them into text. Nothing here knows about shapes.

use crate::position::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(String),
    Position(Position),
    /// String literal, quoted on render.
    Str(String),
    /// Emitted verbatim: accessor paths, type codes, `null`, class literals.
    Raw(String),
    Call { receiver: Option<Box<Expr>>, method: String, args: Vec<Expr> },
    New { ty: String, args: Vec<Expr> },
    Cast { ty: String, expr: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Declare { ty: String, name: String, init: Option<Expr> },
    Assign { target: String, value: Expr },
    /// `try (ResultSet cursor = source) { while (cursor != null && cursor.next()) { body } }`
    CursorLoop { cursor: String, source: Expr, body: Vec<Stmt> },
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    pub fn null() -> Self {
        Self::Raw("null".to_string())
    }

    /// `receiver.method(args)`
    pub fn call(receiver: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call { receiver: Some(Box::new(receiver)), method: method.into(), args }
    }

    /// `Class.method(args)`
    pub fn static_call(class: &str, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Self::var(class), method, args)
    }

    pub fn new_instance(ty: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::New { ty: ty.into(), args }
    }

    pub fn cast(ty: impl Into<String>, expr: Expr) -> Self {
        Self::Cast { ty: ty.into(), expr: Box::new(expr) }
    }
}

impl Stmt {
    pub fn call(receiver: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Expr(Expr::call(receiver, method, args))
    }

    pub fn declare(ty: impl Into<String>, name: impl Into<String>, init: Expr) -> Self {
        Self::Declare { ty: ty.into(), name: name.into(), init: Some(init) }
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::Assign { target: target.into(), value }
    }
}
