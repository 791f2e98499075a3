//! Static type and class descriptors.
//!
//! The generator never looks at a live object model. Everything it knows about
//! a type comes from these values, handed over by a [`DescriptorProvider`].
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GenErrorKind, Result};
use crate::naming::simple_name;
use crate::scalar::ScalarKind;

// ------------------------------- Types ----------------------------------- //

/// Stable identity of a raw (non-generic) class, keyed by canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn simple_name(&self) -> &str {
        simple_name(&self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of generic carrier a wrapped type sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Optional,
    Collection,
    Other,
}

impl Carrier {
    pub fn of(raw: &TypeId) -> Self {
        match raw.as_str() {
            "java.util.Optional" | "Optional" => Self::Optional,
            "java.util.List" | "java.util.Collection" | "java.util.Set" | "List" | "Collection"
            | "Set" => Self::Collection,
            _ => Self::Other,
        }
    }
}

/// A type as seen by the generator: canonical name, raw handle and, for
/// `Optional<T>`/`List<T>`-like types, the wrapped element type.
///
/// `scalar` and `wrapped` are never both set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeDescriptor {
    name: String,
    raw: TypeId,
    wrapped: Option<Box<TypeDescriptor>>,
    scalar: Option<ScalarKind>,
}

impl TypeDescriptor {
    /// A non-generic type. Scalar-ness comes from the canonical name.
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        let scalar = ScalarKind::from_canonical(&name);
        Self { raw: TypeId(name.clone()), name, wrapped: None, scalar }
    }

    /// `carrier<inner>`; rejects a scalar carrier.
    pub fn wrapping(carrier: impl Into<String>, inner: TypeDescriptor) -> Result<Self> {
        let carrier = carrier.into();
        let name = format!("{carrier}<{}>", inner.name);
        if ScalarKind::from_canonical(&carrier).is_some() {
            return Err(GenErrorKind::malformed(name, "a scalar type cannot carry a type argument"));
        }
        Ok(Self { name, raw: TypeId(carrier), wrapped: Some(Box::new(inner)), scalar: None })
    }

    /// Parse `com.acme.Person`, `java.util.List<com.acme.Person>`, …
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let Some(open) = text.find('<') else {
            check_ident(text)?;
            return Ok(Self::class(text));
        };
        if !text.ends_with('>') {
            return Err(GenErrorKind::malformed(text, "unclosed type argument"));
        }
        let raw = text[..open].trim();
        let inner = &text[open + 1..text.len() - 1];
        check_ident(raw)?;
        if has_top_level_comma(inner) {
            return Err(GenErrorKind::malformed(text, "at most one type argument is supported"));
        }
        let inner = Self::parse(inner).map_err(|err| match err {
            GenErrorKind::MalformedType { reason, .. } => GenErrorKind::malformed(text, reason),
            other => other,
        })?;
        Self::wrapping(raw, inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn raw(&self) -> &TypeId {
        &self.raw
    }
    pub fn wrapped(&self) -> Option<&TypeDescriptor> {
        self.wrapped.as_deref()
    }
    pub fn is_scalar(&self) -> bool {
        self.scalar.is_some()
    }
    pub fn is_wrapped(&self) -> bool {
        self.wrapped.is_some()
    }
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        self.scalar
    }
    pub fn carrier(&self) -> Option<Carrier> {
        self.wrapped.as_ref().map(|_| Carrier::of(&self.raw))
    }

    /// Class whose fields must be extracted to read or write this type, if any.
    /// Looks through carriers; `None` for scalars and carriers of scalars.
    pub fn nested_class(&self) -> Option<&TypeId> {
        if self.is_scalar() {
            return None;
        }
        match self.wrapped() {
            Some(inner) => inner.nested_class(),
            None => Some(&self.raw),
        }
    }

    /// Rendering for generated source: simple names, scalars boxed.
    pub fn java_type(&self) -> String {
        if let Some(kind) = self.scalar {
            return kind.java_type().to_string();
        }
        match self.wrapped() {
            Some(inner) => format!("{}<{}>", self.raw.simple_name(), inner.java_type()),
            None => self.raw.simple_name().to_string(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = GenErrorKind;
    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TypeDescriptor> for String {
    fn from(value: TypeDescriptor) -> Self {
        value.name
    }
}

fn check_ident(text: &str) -> Result<()> {
    let valid = !text.is_empty()
        && !text.starts_with('.')
        && !text.ends_with('.')
        && text.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if valid { Ok(()) } else { Err(GenErrorKind::malformed(text, "not a type name")) }
}

fn has_top_level_comma(s: &str) -> bool {
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

// ------------------------------ Classes ---------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Immutable record: one reader per component, built through its canonical constructor.
    Record,
    /// Mutable class: zero-argument constructor plus getter/setter pairs.
    #[default]
    Bean,
}

/// A field as declared on the class, before accessor matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: TypeId,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default = "default_true")]
    pub no_arg_constructor: bool,
    #[serde(default)]
    pub fields: Vec<DeclaredField>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

fn default_true() -> bool {
    true
}

impl ClassDescriptor {
    pub fn method(&self, name: &str, params: usize) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name && m.params == params)
    }
}

/// Field after accessor matching. Extracted once per class and cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Getter or record reader; `None` means direct field access.
    pub getter: Option<String>,
    pub setter: Option<String>,
    pub public: bool,
}

impl FieldDescriptor {
    /// Accessor segment appended to a path: `getName()`, `name()` or `name`.
    pub fn read_accessor(&self) -> String {
        match &self.getter {
            Some(getter) => format!("{getter}()"),
            None => self.name.clone(),
        }
    }
}

// ------------------------------ Provider --------------------------------- //

/// Source of class descriptors. The core never depends on anything richer.
pub trait DescriptorProvider {
    fn class(&self, id: &TypeId) -> Option<&ClassDescriptor>;
}

/// In-memory provider keyed by class name. Serialized as a plain list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ClassDescriptor>", into = "Vec<ClassDescriptor>")]
pub struct ClassIndex {
    classes: IndexMap<TypeId, ClassDescriptor>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, class: ClassDescriptor) {
        self.classes.insert(class.name.clone(), class);
    }
    pub fn len(&self) -> usize {
        self.classes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }
    /// Add every class of `other`; a later definition replaces an earlier one.
    pub fn extend(&mut self, other: ClassIndex) {
        self.classes.extend(other.classes);
    }
}

impl From<Vec<ClassDescriptor>> for ClassIndex {
    fn from(classes: Vec<ClassDescriptor>) -> Self {
        classes.into_iter().collect()
    }
}

impl From<ClassIndex> for Vec<ClassDescriptor> {
    fn from(index: ClassIndex) -> Self {
        index.classes.into_values().collect()
    }
}

impl FromIterator<ClassDescriptor> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = ClassDescriptor>>(iter: I) -> Self {
        let mut index = Self::new();
        for class in iter {
            index.insert(class);
        }
        index
    }
}

impl DescriptorProvider for ClassIndex {
    fn class(&self, id: &TypeId) -> Option<&ClassDescriptor> {
        self.classes.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_wrapped_types() {
        let person = TypeDescriptor::parse("com.acme.Person").unwrap();
        assert!(!person.is_scalar());
        assert!(!person.is_wrapped());
        assert_eq!(person.raw().as_str(), "com.acme.Person");

        let list = TypeDescriptor::parse("java.util.List< com.acme.Person >").unwrap();
        assert!(list.is_wrapped());
        assert_eq!(list.name(), "java.util.List<com.acme.Person>");
        assert_eq!(list.carrier(), Some(Carrier::Collection));
        assert_eq!(list.wrapped().unwrap().raw().as_str(), "com.acme.Person");
        assert_eq!(list.java_type(), "List<Person>");
    }

    #[test]
    fn scalar_and_wrapped_are_exclusive() {
        let err = TypeDescriptor::parse("int<java.lang.String>").unwrap_err();
        assert!(matches!(err, GenErrorKind::MalformedType { .. }));

        let text = TypeDescriptor::parse("java.lang.String").unwrap();
        assert!(text.is_scalar());
        assert!(!text.is_wrapped());
        assert_eq!(text.java_type(), "String");
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "java.util.List<", "java.util.Map<A, B>", "a b", "List<>"] {
            assert!(
                matches!(TypeDescriptor::parse(bad), Err(GenErrorKind::MalformedType { .. })),
                "expected `{bad}` to be rejected"
            );
        }
    }

    #[test]
    fn nested_class_looks_through_carriers() {
        let opt = TypeDescriptor::parse("java.util.Optional<com.acme.Address>").unwrap();
        assert_eq!(opt.nested_class().map(TypeId::as_str), Some("com.acme.Address"));
        let opt_scalar = TypeDescriptor::parse("java.util.Optional<int>").unwrap();
        assert_eq!(opt_scalar.nested_class(), None);
        assert_eq!(TypeDescriptor::class("long").nested_class(), None);
    }

    #[test]
    fn deserializes_from_string() {
        let field: DeclaredField =
            serde_json::from_str(r#"{"name":"age","type":"int"}"#).unwrap();
        assert_eq!(field.ty.scalar_kind(), Some(ScalarKind::Int));
        assert!(!field.public);
    }

    #[test]
    fn read_accessor_prefers_getter() {
        let mut field = FieldDescriptor {
            name: "age".into(),
            ty: TypeDescriptor::class("int"),
            getter: Some("getAge".into()),
            setter: None,
            public: false,
        };
        assert_eq!(field.read_accessor(), "getAge()");
        field.getter = None;
        assert_eq!(field.read_accessor(), "age");
    }
}
