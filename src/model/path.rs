//! Path templates: `{name}` placeholders and their router-native form.

use regex::Regex;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([\w_]+)\}").expect("placeholder pattern is valid"))
}

/// Placeholder names in declaration order, e.g. `/study/{study_id}` -> `["study_id"]`.
pub fn placeholders(path: &str) -> Vec<&str> {
    placeholder_re()
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// The placeholder name when `segment` is exactly `{name}`.
pub fn segment_placeholder(segment: &str) -> Option<&str> {
    let name = segment.strip_prefix('{')?.strip_suffix('}')?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// Rewrite brace placeholders into axum's `:name` segments.
pub fn router_path(path: &str) -> String {
    placeholder_re().replace_all(path, ":$1").into_owned()
}
