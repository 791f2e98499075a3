//! Parameter binding: one bind statement per scalar leaf, in call order.
use crate::classify::{Shape, classify};
use crate::config::GenOptions;
use crate::descriptor::TypeDescriptor;
use crate::error::{GenErrorKind, Result};
use crate::flatten::flatten;
use crate::naming::snake_case;
use crate::position::CallableKind;
use crate::scalar::ScalarKind;
use crate::signature::{ComposedElementInfo, Param};

use super::convert::write_value;
use super::ir::{Expr, Stmt};

/// A scalar value bound at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindLeaf {
    /// Named-notation argument in the call string.
    pub arg_name: String,
    pub kind: ScalarKind,
    /// Accessor path to the value, already unwrapped for optionals.
    pub value: Expr,
}

/// Leaves of one parameter: the parameter itself when scalar, every scalar
/// leaf of its field tree when composed.
pub fn bind_leaves(param: &Param, info: &ComposedElementInfo) -> Result<Vec<BindLeaf>> {
    match info.element.shape {
        Shape::Scalar | Shape::OptionalScalar => {
            let arg = param.arg.as_deref().unwrap_or(&param.name);
            let optional = info.element.shape == Shape::OptionalScalar;
            Ok(vec![scalar_leaf(snake_case(arg), &param.ty, Expr::var(&param.name), optional)?])
        }
        Shape::Composed => {
            let Some(fields) = &info.fields else {
                return Err(GenErrorKind::UnknownType { ty: param.ty.to_string() });
            };
            flatten(&param.name, fields, &info.nested)
                .into_iter()
                .map(|leaf| {
                    scalar_leaf(snake_case(&leaf.field.name), &leaf.field.ty, Expr::raw(leaf.path), leaf.optional)
                })
                .collect()
        }
        Shape::OptionalComposed | Shape::CollectionOfComposed => Err(GenErrorKind::unsupported(
            param.ty.name(),
            format!("parameter `{}` cannot be bound", param.name),
        )),
    }
}

/// `optional` marks a value that evaluates to an `Optional`; it is bound as
/// `value.orElse(null)`.
fn scalar_leaf(arg_name: String, ty: &TypeDescriptor, value: Expr, optional: bool) -> Result<BindLeaf> {
    let kind = match classify(ty)? {
        Shape::Scalar => ty.scalar_kind(),
        Shape::OptionalScalar => ty.wrapped().and_then(TypeDescriptor::scalar_kind),
        _ => None,
    };
    let kind = kind.ok_or_else(|| {
        GenErrorKind::unsupported(ty.name(), format!("`{arg_name}` is not a bindable scalar leaf"))
    })?;
    let value = if optional { Expr::call(value, "orElse", vec![Expr::null()]) } else { value };
    Ok(BindLeaf { arg_name, kind, value })
}

/// `stmt.setX(position, value);` for every leaf.
pub fn bind_statements(leaves: &[BindLeaf], kind: CallableKind, opts: &GenOptions) -> Vec<Stmt> {
    leaves
        .iter()
        .map(|leaf| {
            Stmt::call(
                Expr::var(&opts.statement_var),
                leaf.kind.setter(),
                vec![
                    Expr::Position(kind.bind_position(&opts.position_var)),
                    write_value(leaf.kind, leaf.value.clone(), &opts.conversions_class),
                ],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::render::render_stmts;
    use crate::descriptor::{ClassDescriptor, ClassIndex, ClassKind, DeclaredField, MethodDescriptor, TypeId};
    use crate::fields::{FieldCache, FieldExtractor};
    use crate::signature::resolve_element;
    use pretty_assertions::assert_eq;

    fn param(name: &str, ty: &str) -> Param {
        Param { name: name.into(), ty: TypeDescriptor::parse(ty).unwrap(), arg: None }
    }

    fn leaves_for(provider: &ClassIndex, p: &Param) -> Result<Vec<BindLeaf>> {
        let mut cache = FieldCache::new();
        let mut extractor = FieldExtractor::new(provider, &mut cache);
        let info = resolve_element(&mut extractor, &p.ty, &p.name)?;
        bind_leaves(p, &info)
    }

    #[test]
    fn scalar_text_param_binds_without_wrapper() {
        let p = param("lastName", "java.lang.String");
        let leaves = leaves_for(&ClassIndex::new(), &p).unwrap();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].arg_name, "last_name");
        let text = render_stmts(&bind_statements(&leaves, CallableKind::Procedure, &GenOptions::default()));
        assert_eq!(text, "stmt.setString(idx++, lastName);\n");
    }

    #[test]
    fn optional_date_param_unwraps_then_converts() {
        let p = param("since", "java.util.Optional<java.time.LocalDate>");
        let leaves = leaves_for(&ClassIndex::new(), &p).unwrap();
        let text = render_stmts(&bind_statements(&leaves, CallableKind::Function, &GenOptions::default()));
        assert_eq!(text, "stmt.setDate(++idx, SqlConversions.toSqlDate(since.orElse(null)));\n");
    }

    #[test]
    fn record_param_binds_each_leaf_in_order() {
        let provider: ClassIndex = [ClassDescriptor {
            name: TypeId::new("com.acme.Person"),
            kind: ClassKind::Record,
            no_arg_constructor: false,
            fields: vec![
                DeclaredField { name: "firstName".into(), ty: TypeDescriptor::class("java.lang.String"), public: false },
                DeclaredField { name: "age".into(), ty: TypeDescriptor::class("int"), public: false },
            ],
            methods: vec![
                MethodDescriptor { name: "firstName".into(), params: 0 },
                MethodDescriptor { name: "age".into(), params: 0 },
            ],
        }]
        .into_iter()
        .collect();
        let leaves = leaves_for(&provider, &param("person", "com.acme.Person")).unwrap();
        let text = render_stmts(&bind_statements(&leaves, CallableKind::Procedure, &GenOptions::default()));
        assert_eq!(
            text,
            "stmt.setString(idx++, person.firstName());\nstmt.setObject(idx++, person.age());\n"
        );
        let args: Vec<_> = leaves.iter().map(|l| l.arg_name.as_str()).collect();
        assert_eq!(args, ["first_name", "age"]);
    }

    #[test]
    fn optional_record_field_binds_through_map() {
        let provider: ClassIndex = [
            ClassDescriptor {
                name: TypeId::new("com.acme.Person"),
                kind: ClassKind::Bean,
                no_arg_constructor: true,
                fields: vec![DeclaredField {
                    name: "home".into(),
                    ty: TypeDescriptor::parse("java.util.Optional<com.acme.Address>").unwrap(),
                    public: false,
                }],
                methods: vec![MethodDescriptor { name: "getHome".into(), params: 0 }],
            },
            ClassDescriptor {
                name: TypeId::new("com.acme.Address"),
                kind: ClassKind::Record,
                no_arg_constructor: false,
                fields: vec![
                    DeclaredField { name: "city".into(), ty: TypeDescriptor::class("java.lang.String"), public: false },
                    DeclaredField { name: "zip".into(), ty: TypeDescriptor::class("int"), public: false },
                ],
                methods: vec![
                    MethodDescriptor { name: "city".into(), params: 0 },
                    MethodDescriptor { name: "zip".into(), params: 0 },
                ],
            },
        ]
        .into_iter()
        .collect();
        let leaves = leaves_for(&provider, &param("person", "com.acme.Person")).unwrap();
        let text = render_stmts(&bind_statements(&leaves, CallableKind::Procedure, &GenOptions::default()));
        assert_eq!(
            text,
            "stmt.setString(idx++, person.getHome().map(Address::city).orElse(null));\n\
             stmt.setObject(idx++, person.getHome().map(Address::zip).orElse(null));\n"
        );
    }

    #[test]
    fn collection_param_is_rejected() {
        let provider: ClassIndex = [ClassDescriptor {
            name: TypeId::new("com.acme.Person"),
            kind: ClassKind::Bean,
            no_arg_constructor: true,
            fields: Vec::new(),
            methods: Vec::new(),
        }]
        .into_iter()
        .collect();
        let err = leaves_for(&provider, &param("people", "java.util.List<com.acme.Person>")).unwrap_err();
        assert!(matches!(err, GenErrorKind::UnsupportedShape { .. }));
    }
}
