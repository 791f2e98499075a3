//! Generation errors.
//!
//! Every rule violation is fatal for the callable being generated, except a
//! field that has no usable accessor: that one is logged and dropped during
//! field extraction and never surfaces here.
use thiserror::Error;

pub type Result<T, E = GenErrorKind> = std::result::Result<T, E>;

/// What went wrong, independent of which callable it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenErrorKind {
    #[error("unsupported shape `{ty}`: {reason}")]
    UnsupportedShape { ty: String, reason: String },

    #[error("class `{class}` has no zero-argument constructor")]
    MissingConstructor { class: String },

    #[error("record `{class}` has no accessor for component `{field}`")]
    MissingRecordAccessor { class: String, field: String },

    #[error("redundant type `{ty}`: used more than once in the return signature without a target field")]
    RedundantType { ty: String },

    #[error("cardinality mismatch: {reason}")]
    Cardinality { reason: String },

    #[error("no class descriptor for `{ty}`")]
    UnknownType { ty: String },

    #[error("output `{output}` targets field `{field}`, which `{parent}` does not declare")]
    UnknownTargetField { output: String, field: String, parent: String },

    #[error("malformed type `{text}`: {reason}")]
    MalformedType { text: String, reason: String },

    #[error("cyclic type graph through `{ty}`")]
    CyclicType { ty: String },
}

impl GenErrorKind {
    pub fn unsupported(ty: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedShape { ty: ty.into(), reason: reason.into() }
    }

    pub fn cardinality(reason: impl Into<String>) -> Self {
        Self::Cardinality { reason: reason.into() }
    }

    pub fn malformed(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedType { text: text.into(), reason: reason.into() }
    }

    /// Attach the name of the callable that was being generated.
    pub fn in_callable(self, callable: impl Into<String>) -> GenError {
        GenError { callable: callable.into(), kind: self }
    }
}

/// A fatal error scoped to one callable. Sibling callables are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callable `{callable}`: {kind}")]
pub struct GenError {
    pub callable: String,
    pub kind: GenErrorKind,
}
