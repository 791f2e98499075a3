//! Callable-statement code generation.
//!
//! Given static descriptors of the types in a stored-routine signature,
//! `procbind` produces the Java JDBC fragments a data-access method needs:
//! parameter binds, output registrations, result extraction and the call
//! string.
//!
//! Pipeline: classify each type into a [`classify::Shape`], extract and cache
//! the fields of every composed class ([`fields`]), flatten parameter trees
//! into bind leaves ([`flatten`]), then emit fragment IR per callable
//! ([`codegen`]) and render it to text.
use std::sync::Once;

pub mod classify;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod fields;
pub mod flatten;
pub mod model;
pub mod naming;
pub mod position;
pub mod scalar;
pub mod signature;
pub mod template;

pub use codegen::{CallableFragments, CallablePlan, Generator};
pub use config::GenOptions;
pub use descriptor::{ClassDescriptor, ClassIndex, DescriptorProvider, TypeDescriptor, TypeId};
pub use error::{GenError, GenErrorKind};
pub use fields::FieldCache;
pub use model::Model;
pub use signature::CallableSignature;

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber once. Honors `RUST_LOG`, `warn` otherwise.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
