use crate::ConfigMap;

/// Parse a config document into a `ConfigMap`.
///
/// Line continuations are joined first, then each logical line is either
/// skipped (empty, comment, no assignment) or split at its first
/// assignment operator. `KEY += VALUE` accumulates, `KEY = VALUE`
/// overwrites; either form establishes a key on first occurrence.
pub fn parse(text: &str) -> ConfigMap {
    let mut map = ConfigMap::new();
    let joined = strip_continuations(text);
    for line in joined.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || !line.contains('=') {
            continue;
        }
        // a '+=' line also contains '=', so it has to be checked first.
        if let Some((key, value)) = line.split_once("+=") {
            map.append(key.trim(), value.trim());
        } else if let Some((key, value)) = line.split_once('=') {
            map.set(key.trim(), value.trim());
        }
    }
    map
}

/// Delete every backslash-newline sequence (tolerating CRs in between),
/// joining the physical lines around it.
fn strip_continuations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('\\') {
        let after = &rest[pos + 1..];
        if let Some(stripped) = after.trim_start_matches('\r').strip_prefix('\n') {
            out.push_str(&rest[..pos]);
            rest = stripped;
        } else {
            out.push_str(&rest[..=pos]);
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
