//! Accessor-path flattening of a nested field tree.
use std::collections::VecDeque;

use crate::classify::{Shape, classify};
use crate::descriptor::FieldDescriptor;
use crate::fields::{ClassFields, NestedFieldIndex};

pub const PATH_SEPARATOR: &str = ".";

/// A leaf reachable from the root, with the full accessor path to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLeaf {
    pub field: FieldDescriptor,
    /// e.g. `person.getAddress().city()` or `person.getHome().map(Address::city)`
    pub path: String,
    /// Field names from the root's direct field down to this leaf.
    pub trail: Vec<String>,
    /// The path evaluates to an `Optional`, either because the leaf is one or
    /// because an optional record sits above it.
    pub optional: bool,
}

struct Pending<'f> {
    field: &'f FieldDescriptor,
    owner: &'f ClassFields,
    parent_path: String,
    trail: Vec<String>,
    in_optional: bool,
}

/// Breadth-first walk from `root`'s direct fields. A composed or optional
/// composed field whose class appears in `index` is expanded; anything else
/// ends the branch and becomes a leaf, in the order it was dequeued.
///
/// Below an optional record the path continues with `map`/`flatMap`, so a
/// missing record yields an empty leaf instead of a null dereference.
pub fn flatten(root: &str, class: &ClassFields, index: &NestedFieldIndex) -> Vec<FlatLeaf> {
    let mut queue: VecDeque<Pending<'_>> = class
        .fields
        .iter()
        .map(|field| Pending {
            field,
            owner: class,
            parent_path: root.to_string(),
            trail: Vec::new(),
            in_optional: false,
        })
        .collect();
    let mut out = Vec::new();

    while let Some(Pending { field, owner, parent_path, mut trail, in_optional }) = queue.pop_front() {
        let path = format!("{parent_path}{}", segment(field, owner, in_optional));
        trail.push(field.name.clone());
        let optional = in_optional || field.ty.is_wrapped();

        let expandable = matches!(classify(&field.ty), Ok(Shape::Composed | Shape::OptionalComposed));
        let nested = expandable
            .then(|| field.ty.nested_class().and_then(|id| index.get(id)))
            .flatten();
        match nested {
            Some(nested) => {
                for child in &nested.fields {
                    queue.push_back(Pending {
                        field: child,
                        owner: nested,
                        parent_path: path.clone(),
                        trail: trail.clone(),
                        in_optional: optional,
                    });
                }
            }
            None => out.push(FlatLeaf { field: field.clone(), path, trail, optional }),
        }
    }
    out
}

/// `.getName()` / `.name`, or `.map(Owner::getName)` / `.flatMap(...)` /
/// `.map(v -> v.name)` inside an optional chain.
fn segment(field: &FieldDescriptor, owner: &ClassFields, in_optional: bool) -> String {
    if !in_optional {
        return format!("{PATH_SEPARATOR}{}", field.read_accessor());
    }
    let op = if field.ty.is_wrapped() { "flatMap" } else { "map" };
    let mapper = match &field.getter {
        Some(getter) => format!("{}::{getter}", owner.class.simple_name()),
        None => format!("v -> v{PATH_SEPARATOR}{}", field.name),
    };
    format!("{PATH_SEPARATOR}{op}({mapper})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        ClassDescriptor, ClassIndex, ClassKind, DeclaredField, MethodDescriptor, TypeDescriptor, TypeId,
    };
    use crate::fields::{FieldCache, FieldExtractor};

    fn class(name: &str, kind: ClassKind, fields: &[(&str, &str)]) -> ClassDescriptor {
        let methods = fields
            .iter()
            .map(|(f, _)| MethodDescriptor {
                name: match kind {
                    ClassKind::Record => f.to_string(),
                    ClassKind::Bean => format!("get{}", crate::naming::capitalize(f)),
                },
                params: 0,
            })
            .collect();
        ClassDescriptor {
            name: TypeId::new(name),
            kind,
            no_arg_constructor: true,
            fields: fields
                .iter()
                .map(|(f, t)| DeclaredField {
                    name: f.to_string(),
                    ty: TypeDescriptor::parse(t).unwrap(),
                    public: false,
                })
                .collect(),
            methods,
        }
    }

    #[test]
    fn flattens_nested_records_breadth_first() {
        let provider: ClassIndex = [
            class(
                "com.acme.Person",
                ClassKind::Bean,
                &[("name", "java.lang.String"), ("address", "com.acme.Address"), ("age", "int")],
            ),
            class("com.acme.Address", ClassKind::Record, &[("city", "java.lang.String"), ("geo", "com.acme.Geo")]),
            class("com.acme.Geo", ClassKind::Record, &[("lat", "double"), ("lon", "double")]),
        ]
        .into_iter()
        .collect();
        let mut cache = FieldCache::new();
        let (root, index) = FieldExtractor::new(&provider, &mut cache)
            .extract_tree(&TypeId::new("com.acme.Person"))
            .unwrap();

        let leaves = flatten("person", &root, &index);
        let paths: Vec<_> = leaves.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "person.getName()",
                "person.getAge()",
                "person.getAddress().city()",
                "person.getAddress().geo().lat()",
                "person.getAddress().geo().lon()",
            ]
        );
        assert_eq!(leaves[3].trail, ["address", "geo", "lat"]);
    }

    #[test]
    fn ordering_is_stable_across_runs() {
        let provider: ClassIndex = [class(
            "com.acme.Person",
            ClassKind::Record,
            &[("firstName", "java.lang.String"), ("age", "int")],
        )]
        .into_iter()
        .collect();
        let mut cache = FieldCache::new();
        let (root, index) = FieldExtractor::new(&provider, &mut cache)
            .extract_tree(&TypeId::new("com.acme.Person"))
            .unwrap();
        let first = flatten("p", &root, &index);
        let second = flatten("p", &root, &index);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].field.name, "firstName");
    }

    #[test]
    fn wrapped_fields_are_leaves() {
        let provider: ClassIndex = [class(
            "com.acme.Query",
            ClassKind::Bean,
            &[("since", "java.util.Optional<java.time.LocalDate>")],
        )]
        .into_iter()
        .collect();
        let mut cache = FieldCache::new();
        let (root, index) = FieldExtractor::new(&provider, &mut cache)
            .extract_tree(&TypeId::new("com.acme.Query"))
            .unwrap();
        let leaves = flatten("q", &root, &index);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].path, "q.getSince()");
        assert!(leaves[0].optional);
    }

    #[test]
    fn optional_records_continue_through_map() {
        let provider: ClassIndex = [
            class(
                "com.acme.Person",
                ClassKind::Bean,
                &[("name", "java.lang.String"), ("home", "java.util.Optional<com.acme.Address>")],
            ),
            class(
                "com.acme.Address",
                ClassKind::Record,
                &[("city", "java.lang.String"), ("zip", "java.util.Optional<java.lang.String>")],
            ),
        ]
        .into_iter()
        .collect();
        let mut cache = FieldCache::new();
        let (root, index) = FieldExtractor::new(&provider, &mut cache)
            .extract_tree(&TypeId::new("com.acme.Person"))
            .unwrap();

        let leaves = flatten("person", &root, &index);
        let paths: Vec<_> = leaves.iter().map(|l| (l.path.as_str(), l.optional)).collect();
        assert_eq!(
            paths,
            [
                ("person.getName()", false),
                ("person.getHome().map(Address::city)", true),
                ("person.getHome().flatMap(Address::zip)", true),
            ]
        );
        assert_eq!(leaves[1].trail, ["home", "city"]);
    }
}
