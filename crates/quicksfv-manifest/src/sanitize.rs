/// Normalize a manifest path to `/`-separated form.
///
/// Backslashes become `/`, empty and `.` components are dropped. `..` is kept
/// as written; resolvers decide whether it may escape their root. Returns
/// `None` when nothing remains.
pub fn normalize_entry_path(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.is_empty() {
        return None;
    }

    let mut path = parts.join("/");
    if raw.starts_with('/') {
        path.insert(0, '/');
    }
    Some(path)
}

/// True when `path` stays inside whatever root it is resolved against.
pub fn is_enclosed(path: &str) -> bool {
    !path.starts_with('/')
        && !path.split('/').any(|part| part == "..")
        && !looks_like_drive(path)
}

fn looks_like_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
