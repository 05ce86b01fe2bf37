//! Deterministic, filesystem-safe artifact names.

/// Join name parts into a filesystem-safe slug.
///
/// Parts are joined with `_` and every character outside `[A-Za-z0-9.]` is
/// replaced by `_`. The same parts always produce the same slug, which is
/// the artifact store's whole deduplication strategy.
///
/// ```
/// use droidmirror_artifact::slug;
///
/// let name = slug(&["org.example.app", "arm64-v8a", "5.0+", "480dpi", "b123", "----", "2.0.1"]);
/// assert_eq!(name, "org.example.app_arm64_v8a_5.0__480dpi_b123______2.0.1");
/// ```
pub fn slug(parts: &[&str]) -> String {
    parts
        .join("_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_deterministic() {
        let parts = ["org.example.app", "arm64-v8a", "5.0+", "480dpi", "b1", "----", "1.0"];
        assert_eq!(slug(&parts), slug(&parts));
    }

    #[rstest]
    #[case(&["a/b", "c"], "a_b_c")]
    #[case(&["..", ".."], ".._..")]
    #[case(&["white space", "tab\there"], "white_space_tab_here")]
    #[case(&["héllo"], "h_llo")]
    fn test_hostile_characters_are_neutralized(#[case] parts: &[&str], #[case] expected: &str) {
        let out = slug(parts);
        assert!(!out.contains('/') && !out.contains('\\'));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_distinct_versions_distinct_slugs() {
        let v1 = slug(&["org.example.app", "arm64-v8a", "5.0+", "480dpi", "b1", "----", "1.0"]);
        let v2 = slug(&["org.example.app", "arm64-v8a", "5.0+", "480dpi", "b2", "----", "1.1"]);
        assert_ne!(v1, v2);
    }
}
