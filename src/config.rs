//! Generation options. Every field has a default so a model file may omit
//! `options` entirely or set only what it needs.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::TypeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOptions {
    /// Local holding the `CallableStatement`.
    pub statement_var: String,
    /// Local holding the current call position.
    pub position_var: String,
    /// Prefix for row-cursor locals (`rs`, `rs1`, …).
    pub cursor_var: String,
    /// Class providing the date/time and character conversion helpers.
    pub conversions_class: String,
    /// Registration type code for composed outputs with no override.
    pub cursor_type_code: String,
    /// Registration type code per composed class.
    pub type_codes: IndexMap<TypeId, String>,
    /// Local holding the aggregate of a multi-output callable.
    pub aggregate_var: String,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            statement_var: "stmt".to_string(),
            position_var: "idx".to_string(),
            cursor_var: "rs".to_string(),
            conversions_class: "SqlConversions".to_string(),
            cursor_type_code: "Types.REF_CURSOR".to_string(),
            type_codes: IndexMap::new(),
            aggregate_var: "result".to_string(),
        }
    }
}

impl GenOptions {
    /// Type code for a composed class, falling back to the generic cursor code.
    pub fn composed_type_code(&self, class: &TypeId) -> &str {
        self.type_codes.get(class).map(String::as_str).unwrap_or(&self.cursor_type_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_keep_defaults() {
        let opts: GenOptions = serde_json::from_str(r#"{"statement_var":"cs"}"#).unwrap();
        assert_eq!(opts.statement_var, "cs");
        assert_eq!(opts.position_var, "idx");
        assert_eq!(opts.cursor_type_code, "Types.REF_CURSOR");
    }

    #[test]
    fn type_code_override_wins() {
        let mut opts = GenOptions::default();
        opts.type_codes.insert(TypeId::new("com.acme.Point"), "Types.STRUCT".into());
        assert_eq!(opts.composed_type_code(&TypeId::new("com.acme.Point")), "Types.STRUCT");
        assert_eq!(opts.composed_type_code(&TypeId::new("com.acme.Person")), "Types.REF_CURSOR");
    }
}
