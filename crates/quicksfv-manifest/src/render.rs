use std::fmt::Write;

use crate::entry::ManifestEntry;

/// Render entries as an SFV listing, one `PATH HEX` line each.
pub fn render_sfv(entries: &[ManifestEntry]) -> String {
    let mut out = String::from("; generated by quicksfv\n");
    for entry in entries {
        let _ = writeln!(out, "{} {}", entry.path(), entry.expected());
    }
    out
}

/// Render entries in `sha1sum` layout, `HEX  PATH` lines.
pub fn render_hash_list(entries: &[ManifestEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}  {}", entry.expected(), entry.path());
    }
    out
}
