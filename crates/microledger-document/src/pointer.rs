//! JSON pointer construction (RFC 6901)

/// Escape one reference token: `~` becomes `~0`, `/` becomes `~1`
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Append an escaped token to a pointer
pub fn join(base: &str, segment: &str) -> String {
    format!("{base}/{}", escape_segment(segment))
}
