//! Track name and filename derivation for definition files.

use crate::graph::HubPortCode;

/// Maximum track name length shown on the hub.
pub const TRACK_NAME_LEN: usize = 12;

/// Extension of definition files.
pub const DEFINITION_EXTENSION: &str = "txt";

/// Derives the hub track name from an instrument name.
///
/// Whitespace is removed, the `_{code}` suffix appended when the instrument
/// has several routes, and the result truncated to 12 characters.
pub fn track_name(name: &str, suffix: Option<HubPortCode>) -> String {
    let mut base: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(code) = suffix {
        base.push('_');
        base.push_str(&code.to_string());
    }
    base.chars().take(TRACK_NAME_LEN).collect()
}

/// Derives the definition filename from an instrument name.
///
/// Every character outside `[A-Za-z0-9]` becomes an underscore.
pub fn filename(name: &str, suffix: Option<HubPortCode>) -> String {
    let mut base = name.to_string();
    if let Some(code) = suffix {
        base.push('_');
        base.push_str(&code.to_string());
    }
    let sanitized: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.{}", sanitized, DEFINITION_EXTENSION)
}

/// Makes `candidate` unique among `taken` by inserting `_2`, `_3`, ... before
/// the extension.
pub fn dedupe_filename(candidate: String, taken: &[String]) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }
    let stem = candidate
        .strip_suffix(&format!(".{}", DEFINITION_EXTENSION))
        .unwrap_or(&candidate)
        .to_string();
    (2..)
        .map(|n| format!("{}_{}.{}", stem, n, DEFINITION_EXTENSION))
        .find(|name| !taken.contains(name))
        .unwrap_or(candidate)
}
