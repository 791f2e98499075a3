//! Shape classification. Every parameter, field and output is one of five shapes.
use crate::descriptor::{Carrier, TypeDescriptor, TypeId};
use crate::error::{GenErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Composed,
    OptionalScalar,
    OptionalComposed,
    CollectionOfComposed,
}

impl Shape {
    /// Shapes that are read from a row cursor rather than a single slot.
    pub fn is_row_based(self) -> bool {
        matches!(self, Self::Composed | Self::OptionalComposed | Self::CollectionOfComposed)
    }
}

/// Order matters: scalar, then plain composed, then by carrier kind.
pub fn classify(ty: &TypeDescriptor) -> Result<Shape> {
    if ty.is_scalar() {
        return Ok(Shape::Scalar);
    }
    let Some(inner) = ty.wrapped() else {
        return Ok(Shape::Composed);
    };
    if inner.is_wrapped() {
        return Err(GenErrorKind::unsupported(ty.name(), "nested carriers are not supported"));
    }
    match (ty.carrier(), inner.is_scalar()) {
        (Some(Carrier::Optional), true) => Ok(Shape::OptionalScalar),
        (Some(Carrier::Optional), false) => Ok(Shape::OptionalComposed),
        (Some(Carrier::Collection), true) => {
            Err(GenErrorKind::unsupported(ty.name(), "collections of scalars are not supported"))
        }
        (Some(Carrier::Collection), false) => Ok(Shape::CollectionOfComposed),
        _ => Err(GenErrorKind::unsupported(
            ty.name(),
            format!("`{}` is neither an optional nor a collection carrier", ty.raw()),
        )),
    }
}

/// The record/bean class a row-based shape is reconstructed into.
pub fn composed_class(ty: &TypeDescriptor, shape: Shape) -> Option<&TypeId> {
    match shape {
        Shape::Composed => Some(ty.raw()),
        Shape::OptionalComposed | Shape::CollectionOfComposed => ty.wrapped().map(|inner| inner.raw()),
        Shape::Scalar | Shape::OptionalScalar => None,
    }
}
