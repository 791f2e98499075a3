//! Value transforms applied around binds and reads.
//!
//! Priority on both sides: date/time leaves go through their named conversion
//! helper, single characters travel as strings, everything else passes through.
use crate::scalar::{Getter, ScalarKind};

use super::ir::Expr;

/// Value handed to the setter for a leaf of `kind`.
pub fn write_value(kind: ScalarKind, value: Expr, conversions: &str) -> Expr {
    if let Some(temporal) = kind.temporal() {
        return Expr::static_call(conversions, temporal.write_fn(), vec![value]);
    }
    match kind {
        ScalarKind::Char => Expr::static_call("String", "valueOf", vec![value]),
        _ => value,
    }
}

/// Read a leaf of `kind` from `source` (statement or row cursor) at `key`
/// (position or column alias), undoing [`write_value`].
pub fn read_value(kind: ScalarKind, source: Expr, key: Expr, conversions: &str) -> Expr {
    let raw = match kind.getter() {
        Getter::Named(method) => Expr::call(source, method, vec![key]),
        Getter::Typed(boxed) => Expr::call(source, "getObject", vec![key, Expr::raw(format!("{boxed}.class"))]),
    };
    if let Some(temporal) = kind.temporal() {
        return Expr::static_call(conversions, temporal.read_fn(), vec![raw]);
    }
    match kind {
        ScalarKind::Char => Expr::static_call(conversions, "toChar", vec![raw]),
        _ => raw,
    }
}
