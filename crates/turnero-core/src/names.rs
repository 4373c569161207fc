//! Display-name normalization.

/// Trim a name and collapse internal whitespace runs to single spaces.
///
/// Returns `None` when nothing is left, which every operation treats as an
/// absent name.
pub fn normalize(raw: &str) -> Option<String> {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.is_empty() { None } else { Some(joined) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses() {
        assert_eq!(normalize("  Bob   Lee ").as_deref(), Some("Bob Lee"));
        assert_eq!(normalize("Ana\t\n María").as_deref(), Some("Ana María"));
        assert_eq!(normalize("Ana").as_deref(), Some("Ana"));
    }

    #[test]
    fn blank_is_absent() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   \t "), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["  a  b  ", "x", "\u{a0}José\u{2003}Luis ", "   ", "uno dos  tres"] {
            let once = normalize(raw);
            let twice = once.as_deref().and_then(normalize);
            assert_eq!(once, twice, "input {raw:?}");
        }
    }
}
