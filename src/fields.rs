//! Field extraction with a run-scoped, write-once cache.
//!
//! `extract` turns a class descriptor into its ordered field list, matching
//! accessors by convention, and recurses into every non-scalar field so the
//! whole reachable graph ends up in the cache. `extract_tree` additionally
//! gathers the [`NestedFieldIndex`] slice for one root.
use std::rc::Rc;

use indexmap::IndexMap;

use crate::descriptor::{ClassDescriptor, ClassKind, DescriptorProvider, FieldDescriptor, TypeId};
use crate::error::{GenErrorKind, Result};
use crate::naming::capitalize;

/// Ordered fields of one class, plus how instances of it are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFields {
    pub class: TypeId,
    pub kind: ClassKind,
    pub fields: Vec<FieldDescriptor>,
}

impl ClassFields {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub type FieldList = Rc<ClassFields>;

// -------------------------------- Cache ---------------------------------- //

/// type → field list. Entries are written once and never invalidated.
#[derive(Debug, Default)]
pub struct FieldCache {
    entries: IndexMap<TypeId, FieldList>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, class: &TypeId) -> Option<&FieldList> {
        self.entries.get(class)
    }
    pub fn contains(&self, class: &TypeId) -> bool {
        self.entries.contains_key(class)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    fn insert_once(&mut self, class: TypeId, fields: FieldList) -> FieldList {
        self.entries.entry(class).or_insert(fields).clone()
    }
}

/// Field lists of every class reachable from one root, keyed by class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedFieldIndex {
    entries: IndexMap<TypeId, FieldList>,
}

impl NestedFieldIndex {
    pub fn get(&self, class: &TypeId) -> Option<&FieldList> {
        self.entries.get(class)
    }
    pub fn contains(&self, class: &TypeId) -> bool {
        self.entries.contains_key(class)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn classes(&self) -> impl Iterator<Item = &TypeId> {
        self.entries.keys()
    }
}

// ------------------------------ Extractor -------------------------------- //

pub struct FieldExtractor<'a, P: ?Sized> {
    provider: &'a P,
    cache: &'a mut FieldCache,
}

impl<'a, P: DescriptorProvider + ?Sized> FieldExtractor<'a, P> {
    pub fn new(provider: &'a P, cache: &'a mut FieldCache) -> Self {
        Self { provider, cache }
    }

    /// Ordered fields of `class`, served from the cache after the first call.
    pub fn extract(&mut self, class: &TypeId) -> Result<FieldList> {
        let mut in_progress = Vec::new();
        self.extract_guarded(class, &mut in_progress)
    }

    /// Fields of `root` plus the index of every class nested below it.
    pub fn extract_tree(&mut self, root: &TypeId) -> Result<(FieldList, NestedFieldIndex)> {
        let fields = self.extract(root)?;
        let mut index = NestedFieldIndex::default();
        self.collect_nested(&fields, &mut index)?;
        Ok((fields, index))
    }

    fn collect_nested(&mut self, parent: &ClassFields, index: &mut NestedFieldIndex) -> Result<()> {
        for field in &parent.fields {
            let Some(target) = field.ty.nested_class() else { continue };
            if index.contains(target) {
                continue;
            }
            let nested = self.extract(target)?;
            index.entries.insert(target.clone(), nested.clone());
            self.collect_nested(&nested, index)?;
        }
        Ok(())
    }

    fn extract_guarded(&mut self, class: &TypeId, in_progress: &mut Vec<TypeId>) -> Result<FieldList> {
        if let Some(hit) = self.cache.get(class) {
            tracing::trace!(%class, "field cache hit");
            return Ok(hit.clone());
        }
        if in_progress.contains(class) {
            return Err(GenErrorKind::CyclicType { ty: class.to_string() });
        }
        let descriptor = self
            .provider
            .class(class)
            .ok_or_else(|| GenErrorKind::UnknownType { ty: class.to_string() })?;

        let kind = descriptor.kind;
        let fields = match kind {
            ClassKind::Record => record_fields(descriptor)?,
            ClassKind::Bean => bean_fields(descriptor)?,
        };

        in_progress.push(class.clone());
        for field in &fields {
            if let Some(target) = field.ty.nested_class() {
                self.extract_guarded(target, in_progress)?;
            }
        }
        in_progress.pop();

        tracing::debug!(%class, fields = fields.len(), "extracted fields");
        let list = Rc::new(ClassFields { class: class.clone(), kind, fields });
        Ok(self.cache.insert_once(class.clone(), list))
    }
}

/// Each record component is read through the record's own reader method.
fn record_fields(class: &ClassDescriptor) -> Result<Vec<FieldDescriptor>> {
    class
        .fields
        .iter()
        .map(|declared| {
            let reader = class.method(&declared.name, 0).ok_or_else(|| {
                GenErrorKind::MissingRecordAccessor {
                    class: class.name.to_string(),
                    field: declared.name.clone(),
                }
            })?;
            Ok(FieldDescriptor {
                name: declared.name.clone(),
                ty: declared.ty.clone(),
                getter: Some(reader.name.clone()),
                setter: None,
                public: declared.public,
            })
        })
        .collect()
}

/// Getter/setter pairs matched by `get`/`is`/`set` + capitalized field name.
///
/// The constructor check comes first and is fatal. A field without a getter is
/// only a warning: kept for direct access when public, dropped otherwise.
fn bean_fields(class: &ClassDescriptor) -> Result<Vec<FieldDescriptor>> {
    if !class.no_arg_constructor {
        return Err(GenErrorKind::MissingConstructor { class: class.name.to_string() });
    }
    let mut out = Vec::with_capacity(class.fields.len());
    for declared in &class.fields {
        let suffix = capitalize(&declared.name);
        let getter = class
            .methods
            .iter()
            .find(|m| {
                m.params == 0
                    && (m.name.strip_prefix("get") == Some(suffix.as_str())
                        || m.name.strip_prefix("is") == Some(suffix.as_str()))
            })
            .map(|m| m.name.clone());
        let setter = class
            .methods
            .iter()
            .find(|m| m.params == 1 && m.name.strip_prefix("set") == Some(suffix.as_str()))
            .map(|m| m.name.clone());

        if getter.is_none() {
            if declared.public {
                tracing::warn!(class = %class.name, field = %declared.name, "no getter, using direct field access");
            } else {
                tracing::warn!(class = %class.name, field = %declared.name, "no getter and not public, field dropped");
                continue;
            }
        }
        out.push(FieldDescriptor {
            name: declared.name.clone(),
            ty: declared.ty.clone(),
            getter,
            setter,
            public: declared.public,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassIndex, DeclaredField, MethodDescriptor, TypeDescriptor};

    fn field(name: &str, ty: &str, public: bool) -> DeclaredField {
        DeclaredField { name: name.into(), ty: TypeDescriptor::parse(ty).unwrap(), public }
    }

    fn methods(names: &[(&str, usize)]) -> Vec<MethodDescriptor> {
        names.iter().map(|(n, p)| MethodDescriptor { name: n.to_string(), params: *p }).collect()
    }

    fn person_bean() -> ClassDescriptor {
        ClassDescriptor {
            name: TypeId::new("com.acme.Person"),
            kind: ClassKind::Bean,
            no_arg_constructor: true,
            fields: vec![
                field("firstName", "java.lang.String", false),
                field("active", "boolean", false),
                field("address", "com.acme.Address", false),
                field("nickname", "java.lang.String", true),
                field("secret", "java.lang.String", false),
            ],
            methods: methods(&[
                ("getFirstName", 0),
                ("setFirstName", 1),
                ("isActive", 0),
                ("setActive", 1),
                ("getAddress", 0),
                ("setAddress", 1),
            ]),
        }
    }

    fn address_record() -> ClassDescriptor {
        ClassDescriptor {
            name: TypeId::new("com.acme.Address"),
            kind: ClassKind::Record,
            no_arg_constructor: false,
            fields: vec![field("city", "java.lang.String", false), field("zip", "int", false)],
            methods: methods(&[("city", 0), ("zip", 0)]),
        }
    }

    #[test]
    fn bean_accessors_are_matched_by_convention() {
        let provider: ClassIndex = [person_bean(), address_record()].into_iter().collect();
        let mut cache = FieldCache::new();
        let fields = FieldExtractor::new(&provider, &mut cache)
            .extract(&TypeId::new("com.acme.Person"))
            .unwrap();

        let names: Vec<_> = fields.fields.iter().map(|f| f.name.as_str()).collect();
        // `secret` has no getter and is private: dropped.
        assert_eq!(names, ["firstName", "active", "address", "nickname"]);
        assert_eq!(fields.field("active").unwrap().getter.as_deref(), Some("isActive"));
        assert_eq!(fields.field("nickname").unwrap().getter, None);
        assert_eq!(fields.field("firstName").unwrap().setter.as_deref(), Some("setFirstName"));
        // nested record extracted transitively
        assert!(cache.contains(&TypeId::new("com.acme.Address")));
    }

    #[test]
    fn record_components_use_reader_methods() {
        let provider: ClassIndex = [address_record()].into_iter().collect();
        let mut cache = FieldCache::new();
        let fields = FieldExtractor::new(&provider, &mut cache)
            .extract(&TypeId::new("com.acme.Address"))
            .unwrap();
        assert_eq!(fields.kind, ClassKind::Record);
        assert_eq!(fields.fields[0].read_accessor(), "city()");
        assert_eq!(fields.fields[1].setter, None);
    }

    #[test]
    fn record_without_reader_is_fatal() {
        let mut record = address_record();
        record.methods.retain(|m| m.name != "zip");
        let provider: ClassIndex = [record].into_iter().collect();
        let mut cache = FieldCache::new();
        let err = FieldExtractor::new(&provider, &mut cache)
            .extract(&TypeId::new("com.acme.Address"))
            .unwrap_err();
        assert_eq!(
            err,
            GenErrorKind::MissingRecordAccessor { class: "com.acme.Address".into(), field: "zip".into() }
        );
    }

    #[test]
    fn bean_without_constructor_is_fatal_before_fields() {
        let mut bean = person_bean();
        bean.no_arg_constructor = false;
        // Address is unknown: would fail differently if fields were processed first.
        let provider: ClassIndex = [bean].into_iter().collect();
        let mut cache = FieldCache::new();
        let err = FieldExtractor::new(&provider, &mut cache)
            .extract(&TypeId::new("com.acme.Person"))
            .unwrap_err();
        assert_eq!(err, GenErrorKind::MissingConstructor { class: "com.acme.Person".into() });
        assert!(cache.is_empty());
    }

    #[test]
    fn second_extraction_is_served_from_cache() {
        let provider: ClassIndex = [person_bean(), address_record()].into_iter().collect();
        let mut cache = FieldCache::new();
        let id = TypeId::new("com.acme.Person");
        let first = FieldExtractor::new(&provider, &mut cache).extract(&id).unwrap();
        let second = FieldExtractor::new(&provider, &mut cache).extract(&id).unwrap();
        assert_eq!(first, second);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn tree_index_covers_wrapped_fields() {
        let team = ClassDescriptor {
            name: TypeId::new("com.acme.Team"),
            kind: ClassKind::Bean,
            no_arg_constructor: true,
            fields: vec![
                field("lead", "java.util.Optional<com.acme.Person>", false),
                field("name", "java.lang.String", false),
            ],
            methods: methods(&[("getLead", 0), ("getName", 0)]),
        };
        let provider: ClassIndex = [team, person_bean(), address_record()].into_iter().collect();
        let mut cache = FieldCache::new();
        let (root, index) = FieldExtractor::new(&provider, &mut cache)
            .extract_tree(&TypeId::new("com.acme.Team"))
            .unwrap();
        assert_eq!(root.fields.len(), 2);
        let classes: Vec<_> = index.classes().map(TypeId::as_str).collect();
        assert_eq!(classes, ["com.acme.Person", "com.acme.Address"]);
    }

    #[test]
    fn cycles_are_rejected() {
        let node = ClassDescriptor {
            name: TypeId::new("com.acme.Node"),
            kind: ClassKind::Bean,
            no_arg_constructor: true,
            fields: vec![field("next", "com.acme.Node", false)],
            methods: methods(&[("getNext", 0)]),
        };
        let provider: ClassIndex = [node].into_iter().collect();
        let mut cache = FieldCache::new();
        let err = FieldExtractor::new(&provider, &mut cache)
            .extract(&TypeId::new("com.acme.Node"))
            .unwrap_err();
        assert_eq!(err, GenErrorKind::CyclicType { ty: "com.acme.Node".into() });
    }
}
