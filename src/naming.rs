//! Identifier helpers shared by extraction and emission.
use once_cell::sync::Lazy;
use regex::Regex;

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static regex"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex"));

/// `firstName` → `first_name`, `HTTPStatus` → `http_status`.
pub fn snake_case(name: &str) -> String {
    let s = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let s = CAMEL_BOUNDARY.replace_all(&s, "${1}_${2}");
    s.replace(['-', ' '], "_").to_lowercase()
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `save_person_v2` → `savePersonV2`. Already-camel input passes through.
pub fn camel_case(name: &str) -> String {
    let mut parts = name.split(['_', '-', ' ']).filter(|p| !p.is_empty());
    let Some(first) = parts.next() else {
        return String::new();
    };
    let mut out = decapitalize(first);
    for part in parts {
        out.push_str(&capitalize(&part.to_lowercase()));
    }
    out
}

/// `savePerson` → `SAVE_PERSON`.
pub fn constant_case(name: &str) -> String {
    snake_case(name).to_uppercase()
}

/// Last segment of a dotted class name (`com.acme.Person` → `Person`).
pub fn simple_name(canonical: &str) -> &str {
    canonical.rsplit('.').next().unwrap_or(canonical)
}

/// Best-effort Java identifier for a local derived from a declared name.
pub fn local_ident(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let ident = decapitalize(cleaned.trim_matches('_'));
    match ident.chars().next() {
        None => "value".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{ident}"),
        Some(_) => ident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_camel_and_acronyms() {
        assert_eq!(snake_case("firstName"), "first_name");
        assert_eq!(snake_case("dateOfBirth"), "date_of_birth");
        assert_eq!(snake_case("HTTPStatus"), "http_status");
        assert_eq!(snake_case("age"), "age");
        assert_eq!(snake_case("p_id"), "p_id");
    }

    #[test]
    fn case_helpers() {
        assert_eq!(capitalize("firstName"), "FirstName");
        assert_eq!(decapitalize("Person"), "person");
        assert_eq!(simple_name("com.acme.Person"), "Person");
        assert_eq!(simple_name("int"), "int");
    }

    #[test]
    fn method_and_constant_names() {
        assert_eq!(camel_case("save_person"), "savePerson");
        assert_eq!(camel_case("find_by_ID"), "findById");
        assert_eq!(camel_case("listMembers"), "listMembers");
        assert_eq!(constant_case("save_person_v2"), "SAVE_PERSON_V2");
        assert_eq!(constant_case("listMembers"), "LIST_MEMBERS");
    }

    #[test]
    fn local_ident_sanitizes() {
        assert_eq!(local_ident("Person"), "person");
        assert_eq!(local_ident("total-count"), "total_count");
        assert_eq!(local_ident("1st"), "_1st");
        assert_eq!(local_ident(""), "value");
    }
}
