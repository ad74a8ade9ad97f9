use std::sync::OnceLock;

use regex::Regex;

pub fn sanitize_text(text: &str) -> String {
    static SANITIZE_TEXT_REGEXP: OnceLock<regex::Regex> = OnceLock::new();
    let re = SANITIZE_TEXT_REGEXP.get_or_init(|| Regex::new(r#"[\n\t\s]+"#).unwrap());

    re.replace_all(text, " ").into_owned().trim().into()
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_collapse_whitespace() {
        assert_eq!(sanitize_text("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn should_match_ignoring_case() {
        assert!(contains_ignore_case("Ação e Aventura", "AVENTURA"));
        assert!(!contains_ignore_case("Drama", "comédia"));
    }
}
