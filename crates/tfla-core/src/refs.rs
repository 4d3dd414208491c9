//! Textual reference scanning over configuration values

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static MODULE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmodule\.([A-Za-z0-9_-]+)\b").expect("module reference pattern is valid")
});

/// Prefixes of references that never name a resource.
const NON_RESOURCE_PREFIXES: &[&str] = &[
    "var.",
    "local.",
    "data.",
    "module.",
    "path.",
    "each.",
    "count.",
    "self.",
    "terraform.",
];

/// Every distinct `module.<name>` identifier occurring in string leaves of
/// `value`, recursing through arrays and objects. Other leaves are skipped.
pub fn find_module_refs(value: &Value) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    walk(value, &mut refs);
    refs
}

fn walk(value: &Value, refs: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => {
            for cap in MODULE_REF_RE.captures_iter(s) {
                refs.insert(cap[1].to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|v| walk(v, refs)),
        Value::Object(map) => map.values().for_each(|v| walk(v, refs)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Strip `${ ... }` wrappers and surrounding whitespace.
pub fn normalize_reference(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    inner.trim().to_string()
}

/// `<name>` of a `module.<name>[.attr...]` reference.
pub fn module_reference_name(reference: &str) -> Option<&str> {
    let rest = reference.strip_prefix("module.")?;
    let name = rest.split(&['.', '['][..]).next()?;
    (!name.is_empty()).then_some(name)
}

/// `type.name` of a bare resource reference such as `aws_s3_bucket.logs.arn`.
pub fn resource_reference_name(reference: &str) -> Option<String> {
    if NON_RESOURCE_PREFIXES.iter().any(|p| reference.starts_with(p)) {
        return None;
    }
    let mut parts = reference.split('.');
    let resource_type = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next()?.split('[').next().filter(|s| !s.is_empty())?;
    Some(format!("{resource_type}.{name}"))
}
