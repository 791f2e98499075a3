//! JSON model: generation options, class descriptors and the units whose
//! callables get generated.
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codegen::{CallableFragments, Generator};
use crate::config::GenOptions;
use crate::descriptor::{ClassDescriptor, ClassIndex, DescriptorProvider, TypeId};
use crate::error::GenError;
use crate::fields::FieldCache;
use crate::signature::CallableSignature;

// ------------------------------- Types ----------------------------------- //

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    pub options: GenOptions,
    pub classes: ClassIndex,
    pub units: Vec<Unit>,
}

/// An enclosing class whose callables all live in one database package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub callables: Vec<CallableSignature>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },
}

pub type CallableResult<'m> = (&'m CallableSignature, Result<CallableFragments, GenError>);

/// Generation results of one unit, one entry per callable in declaration order.
#[derive(Debug)]
pub struct UnitOutput<'m> {
    pub unit: &'m Unit,
    pub results: Vec<CallableResult<'m>>,
}

impl UnitOutput<'_> {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, result)| result.is_err()).count()
    }
}

// ---------------------------- Implementation ----------------------------- //

impl Model {
    pub fn from_json_str(src: &str) -> Result<Self, ModelError> {
        from_str_with_path(src)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        from_slice_with_path(bytes)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;
        let model = Self::from_json_slice(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            classes = model.classes.len(),
            units = model.units.len(),
            "model loaded"
        );
        Ok(model)
    }

    /// Fold another model into this one. Classes are merged by name (later
    /// wins), units are appended, and this model's options are kept.
    pub fn merge(&mut self, other: Model) {
        self.classes.extend(other.classes);
        self.units.extend(other.units);
    }

    /// Generate every callable of `unit`. A failure is scoped to its callable.
    pub fn generate_unit<'m>(&'m self, cache: &mut FieldCache, unit: &'m Unit) -> UnitOutput<'m> {
        let mut generator = Generator::new(&self.classes, cache, &self.options);
        let results = generator.generate_all(unit.package.as_deref(), &unit.callables);
        UnitOutput { unit, results }
    }

    /// Generate every unit against one shared field cache.
    pub fn generate(&self) -> Vec<UnitOutput<'_>> {
        let mut cache = FieldCache::new();
        self.units.iter().map(|unit| self.generate_unit(&mut cache, unit)).collect()
    }
}

impl DescriptorProvider for Model {
    fn class(&self, id: &TypeId) -> Option<&ClassDescriptor> {
        self.classes.class(id)
    }
}

// --------------------------- Internal helpers ---------------------------- //

fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ModelError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(path_error)
}

fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ModelError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(de).map_err(path_error)
}

fn path_error(err: serde_path_to_error::Error<serde_json::Error>) -> ModelError {
    ModelError::Parse { path: err.path().to_string(), message: err.into_inner().to_string() }
}
