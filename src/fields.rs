//! Ordered name/value pairs handed to the template renderer.
//!
//! Every name is always emitted: absent integer fields become `-1`,
//! absent text fields become the empty string. Templates can therefore
//! reference any field without caring which grammar branch matched.

use crate::describe::Description;

/// Format a parsed description as the stable set of template values.
pub fn field_values(desc: &Description) -> Vec<(&'static str, String)> {
    vec![
        ("FULL", text(desc.full())),
        ("FULL_EXTRA", text(desc.full_extra())),
        ("MAJOR", int(desc.major)),
        ("MINOR", int(desc.minor)),
        ("PATCH", int(desc.patch)),
        ("EXTRA", text(desc.extra.clone())),
        ("REVISION", int(desc.revision)),
        ("COMMITS", int(desc.commits)),
        ("SHA", text(desc.sha.clone())),
        ("DIRTY", desc.dirty.to_string()),
        ("ANY", desc.any()),
    ]
}

fn int(value: Option<u32>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => "-1".to_string(),
    }
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}
