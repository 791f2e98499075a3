//! Output registration, one statement per declared output in declaration order.
use crate::classify::Shape;
use crate::config::GenOptions;
use crate::position::CallableKind;
use crate::signature::ReturnElementInfo;

use super::ir::{Expr, Stmt};

/// Type code for one output: the scalar's own code, or the override/cursor
/// code for row-based shapes.
pub fn type_code(element: &ReturnElementInfo, opts: &GenOptions) -> String {
    if element.shape().is_row_based() {
        return match element.composed_class() {
            Some(class) => opts.composed_type_code(class).to_string(),
            None => opts.cursor_type_code.clone(),
        };
    }
    let ty = element.ty();
    let kind = match element.shape() {
        Shape::OptionalScalar => ty.wrapped().and_then(|inner| inner.scalar_kind()),
        _ => ty.scalar_kind(),
    };
    kind.map(|k| k.sql_type().to_string()).unwrap_or_else(|| opts.cursor_type_code.clone())
}

pub fn registration_statements(
    elements: &[ReturnElementInfo],
    kind: CallableKind,
    opts: &GenOptions,
) -> Vec<Stmt> {
    let count = elements.len();
    elements
        .iter()
        .enumerate()
        .map(|(i, element)| {
            Stmt::call(
                Expr::var(&opts.statement_var),
                "registerOutParameter",
                vec![
                    Expr::Position(kind.registration_position(&opts.position_var, i, count)),
                    Expr::raw(type_code(element, opts)),
                ],
            )
        })
        .collect()
}
