//! Java text rendering for the fragment IR.
use super::ir::{Expr, Stmt};

const INDENT: &str = "    ";

/// Line writer with an indentation level; one visit method per IR node.
#[derive(Debug, Default)]
pub struct JavaWriter {
    out: String,
    indent: usize,
}

impl JavaWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One line at the current indentation; blank lines carry no indent.
    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Re-indent already rendered text, one line at a time.
    pub fn text(&mut self, rendered: &str) {
        for line in rendered.lines() {
            self.line(line);
        }
    }

    pub fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    pub fn visit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    pub fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.line(&format!("{};", render_expr(expr))),
            Stmt::Declare { ty, name, init: Some(init) } => {
                self.line(&format!("{ty} {name} = {};", render_expr(init)))
            }
            Stmt::Declare { ty, name, init: None } => self.line(&format!("{ty} {name};")),
            Stmt::Assign { target, value } => self.line(&format!("{target} = {};", render_expr(value))),
            Stmt::CursorLoop { cursor, source, body } => {
                self.line(&format!("try (ResultSet {cursor} = {}) {{", render_expr(source)));
                self.nested(|w| {
                    w.line(&format!("while ({cursor} != null && {cursor}.next()) {{"));
                    w.nested(|w| w.visit_stmts(body));
                    w.line("}");
                });
                self.line("}");
            }
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Var(name) => name.clone(),
        Expr::Position(position) => position.to_string(),
        Expr::Str(text) => format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"")),
        Expr::Raw(text) => text.clone(),
        Expr::Call { receiver, method, args } => {
            let args = render_args(args);
            match receiver {
                Some(receiver) => format!("{}.{method}({args})", render_expr(receiver)),
                None => format!("{method}({args})"),
            }
        }
        Expr::New { ty, args } => format!("new {ty}({})", render_args(args)),
        Expr::Cast { ty, expr } => format!("({ty}) {}", render_expr(expr)),
    }
}

fn render_args(args: &[Expr]) -> String {
    args.iter().map(render_expr).collect::<Vec<_>>().join(", ")
}

/// Render a statement list at indentation level zero.
pub fn render_stmts(stmts: &[Stmt]) -> String {
    let mut writer = JavaWriter::new();
    writer.visit_stmts(stmts);
    writer.finish()
}
