//! Callable signatures and the element infos resolved from them.
//!
//! A signature arrives from upstream discovery as plain data. Resolution
//! classifies every element, extracts the fields it needs and, for returns,
//! assigns extraction positions and links multi-output elements to the
//! synthetic parent aggregate they are assembled into.
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classify::{Shape, classify, composed_class};
use crate::descriptor::{DescriptorProvider, TypeDescriptor, TypeId};
use crate::error::{GenErrorKind, Result};
use crate::fields::{FieldExtractor, FieldList, NestedFieldIndex};
use crate::naming::snake_case;
use crate::position::{CallableKind, Position};

// ------------------------------- Inputs ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Declared call-argument name; defaults to `name`.
    #[serde(default)]
    pub arg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Declared output name (alias); also the generated local's name.
    pub name: String,
    /// Field of the parent aggregate this output fills, for multi-output callables.
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableSignature {
    pub name: String,
    pub kind: CallableKind,
    /// Disambiguates overloads: `name_suffix` in the call string.
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub params: Vec<Param>,
    /// Declared return type, `None` for void.
    #[serde(default)]
    pub returns: Option<TypeDescriptor>,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

impl CallableSignature {
    /// Output counts must agree with the callable kind and return type.
    pub fn validate_cardinality(&self) -> Result<()> {
        let count = self.outputs.len();
        if self.kind == CallableKind::Function && count != 1 {
            return Err(GenErrorKind::cardinality(format!(
                "a function declares exactly one output, found {count}"
            )));
        }
        match (&self.returns, count) {
            (None, n) if n > 0 => Err(GenErrorKind::cardinality(format!(
                "{n} output(s) declared for a void return"
            ))),
            (Some(ty), 0) => Err(GenErrorKind::cardinality(format!(
                "return type `{ty}` declared without any output"
            ))),
            _ => Ok(()),
        }
    }

    /// Call-string tokens for the outputs, after the parameter tokens. A
    /// function's single output is the leading `? =` instead.
    pub fn output_args(&self) -> Vec<String> {
        match self.kind {
            CallableKind::Function => Vec::new(),
            CallableKind::Procedure => self.outputs.iter().map(|o| snake_case(&o.name)).collect(),
        }
    }

    /// Routine name as called: `name` or `name_suffix`.
    pub fn call_name(&self) -> String {
        match self.suffix.as_deref().filter(|s| !s.is_empty()) {
            Some(suffix) => format!("{}_{suffix}", self.name),
            None => self.name.clone(),
        }
    }
}

/// `{ [? = ]call [pkg.]name(arg => ?,...) }`
pub fn call_string(kind: CallableKind, package: Option<&str>, call_name: &str, args: &[String]) -> String {
    let lead = match kind {
        CallableKind::Function => "? = ",
        CallableKind::Procedure => "",
    };
    let package = package
        .filter(|p| !p.is_empty())
        .map(|p| format!("{p}."))
        .unwrap_or_default();
    let args = args.iter().map(|a| format!("{a} => ?")).collect::<Vec<_>>().join(",");
    format!("{{ {lead}call {package}{call_name}({args}) }}")
}

// ---------------------------- Element infos ------------------------------ //

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub ty: TypeDescriptor,
    pub name: String,
    pub shape: Shape,
}

/// An element plus the fields needed to bind or rebuild it.
/// `fields` is `None` for scalar shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedElementInfo {
    pub element: ElementInfo,
    pub fields: Option<FieldList>,
    pub nested: NestedFieldIndex,
}

/// The composite value a multi-output callable returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentAggregate {
    pub element: ElementInfo,
    pub fields: FieldList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnElementInfo {
    pub composed: ComposedElementInfo,
    pub output_name: String,
    /// Where this output is read back after execution.
    pub position: Position,
    pub parent: Option<Rc<ParentAggregate>>,
    /// Field of `parent` this output fills.
    pub target: Option<String>,
}

impl ReturnElementInfo {
    pub fn shape(&self) -> Shape {
        self.composed.element.shape
    }
    pub fn ty(&self) -> &TypeDescriptor {
        &self.composed.element.ty
    }
    pub fn composed_class(&self) -> Option<&TypeId> {
        composed_class(self.ty(), self.shape())
    }
}

// ------------------------------ Resolution ------------------------------- //

pub fn resolve_element<P: DescriptorProvider + ?Sized>(
    extractor: &mut FieldExtractor<'_, P>,
    ty: &TypeDescriptor,
    name: &str,
) -> Result<ComposedElementInfo> {
    let shape = classify(ty)?;
    let (fields, nested) = match composed_class(ty, shape) {
        Some(class) => {
            let (fields, nested) = extractor.extract_tree(class)?;
            (Some(fields), nested)
        }
        None => (None, NestedFieldIndex::default()),
    };
    Ok(ComposedElementInfo {
        element: ElementInfo { ty: ty.clone(), name: name.to_string(), shape },
        fields,
        nested,
    })
}

/// Resolve the declared outputs. Assumes cardinality was validated.
///
/// A single output takes the return type as-is. Several outputs each take the
/// type of the parent field they target (explicit `target`, else the output
/// name). Two outputs landing on the same composed class, where either one
/// lacks an explicit target, is a redundant-type error.
pub fn resolve_returns<P: DescriptorProvider + ?Sized>(
    extractor: &mut FieldExtractor<'_, P>,
    sig: &CallableSignature,
    position_var: &str,
) -> Result<Vec<ReturnElementInfo>> {
    let Some(ret) = &sig.returns else {
        return Ok(Vec::new());
    };
    let count = sig.outputs.len();
    let position = |i: usize| sig.kind.extraction_position(position_var, count - 1 - i);

    if let [output] = sig.outputs.as_slice() {
        let composed = resolve_element(extractor, ret, &output.name)?;
        return Ok(vec![ReturnElementInfo {
            composed,
            output_name: output.name.clone(),
            position: position(0),
            parent: None,
            target: None,
        }]);
    }

    let parent_shape = classify(ret)?;
    if parent_shape != Shape::Composed {
        return Err(GenErrorKind::unsupported(
            ret.name(),
            "several outputs need a plain composed return type to aggregate into",
        ));
    }
    let parent_fields = extractor.extract(ret.raw())?;
    let parent = Rc::new(ParentAggregate {
        element: ElementInfo { ty: ret.clone(), name: ret.raw().simple_name().to_string(), shape: parent_shape },
        fields: parent_fields,
    });

    // composed class → whether its first output named an explicit target
    let mut seen_classes: IndexMap<TypeId, bool> = IndexMap::new();
    let mut seen_targets: Vec<&str> = Vec::new();
    let mut out = Vec::with_capacity(count);

    for (i, output) in sig.outputs.iter().enumerate() {
        let target = output.target.as_deref().unwrap_or(&output.name);
        let field = parent.fields.field(target).ok_or_else(|| GenErrorKind::UnknownTargetField {
            output: output.name.clone(),
            field: target.to_string(),
            parent: ret.to_string(),
        })?;
        if seen_targets.contains(&target) {
            return Err(GenErrorKind::RedundantType { ty: field.ty.to_string() });
        }
        seen_targets.push(target);

        let composed = resolve_element(extractor, &field.ty, &output.name)?;
        if let Some(class) = composed_class(&composed.element.ty, composed.element.shape) {
            let explicit = output.target.is_some();
            match seen_classes.get(class) {
                Some(&first_explicit) if !(first_explicit && explicit) => {
                    return Err(GenErrorKind::RedundantType { ty: class.to_string() });
                }
                Some(_) => {}
                None => {
                    seen_classes.insert(class.clone(), explicit);
                }
            }
        }

        out.push(ReturnElementInfo {
            composed,
            output_name: output.name.clone(),
            position: position(i),
            parent: Some(parent.clone()),
            target: Some(field.name.clone()),
        });
    }
    Ok(out)
}
