//! Term and intent-pattern matching shared by the classifier and the
//! entity extractor.

use regex::Regex;

/// Terms this short (in characters) only match as whole words, so "up"
/// never fires inside "update" or "upgrade".
pub const WHOLE_WORD_MAX_LEN: usize = 4;

/// Lower-case, trim, and collapse internal whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether `term` occurs in `haystack`.
///
/// Short terms need whole-word containment; longer ones match as plain
/// substrings so "update" still covers "updated" and "updates". Both sides
/// are compared lower-cased.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    if term.chars().count() <= WHOLE_WORD_MAX_LEN {
        contains_whole_word(&haystack, &term)
    } else {
        haystack.contains(&term)
    }
}

/// Whether `word` occurs in `haystack` bounded by non-word characters.
pub fn contains_whole_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, matched)| {
        let end = start + matched.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A wildcard phrasing template compiled to a case-insensitive regex.
///
/// `*` matches one run of word characters; literal text matches as written.
/// The match is anchored on word boundaries so "is * up" does not fire on
/// "this thing update".
#[derive(Debug, Clone)]
pub struct IntentPattern {
    template: String,
    regex: Regex,
}

impl IntentPattern {
    pub fn compile(template: &str) -> Result<Self, regex::Error> {
        let normalized = normalize_query(template);
        let body = normalized
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\w+");

        let edge = |c: Option<char>| c.is_some_and(|c| c == '*' || is_word_char(c));
        let mut source = String::from("(?i)");
        if edge(normalized.chars().next()) {
            source.push_str(r"\b");
        }
        source.push_str(&body);
        if edge(normalized.chars().next_back()) {
            source.push_str(r"\b");
        }

        Ok(Self {
            template: template.to_string(),
            regex: Regex::new(&source)?,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_match(&self, query: &str) -> bool {
        self.regex.is_match(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize_query("  Is   the Fleet UP?\n"), "is the fleet up?");
    }

    #[test]
    fn short_terms_need_word_boundaries() {
        assert!(!contains_term("last upgrade yesterday", "up"));
        assert!(!contains_term("any update pending", "up"));
        assert!(contains_term("is the server up?", "up"));
        assert!(contains_term("up and running", "up"));
    }

    #[test]
    fn long_terms_match_as_substrings() {
        assert!(contains_term("last upgrade yesterday", "upgrade"));
        assert!(contains_term("last upgrade yesterday", "yesterday"));
        assert!(contains_term("which hosts were updated", "update"));
        assert!(contains_term("how many hosts", "how many"));
    }

    #[test]
    fn term_comparison_ignores_case() {
        assert!(contains_term("Show HOSTS", "hosts"));
        assert!(!contains_term("show hosts", "HOST"));
        assert!(contains_term("show the host list", "HOST"));
    }

    #[test]
    fn empty_term_never_matches() {
        assert!(!contains_term("anything", ""));
        assert!(!contains_term("anything", "   "));
    }

    #[test]
    fn whole_word_handles_punctuation_and_edges() {
        assert!(contains_whole_word("up", "up"));
        assert!(contains_whole_word("(up)", "up"));
        assert!(!contains_whole_word("up_time", "up"));
        assert!(contains_whole_word("setup up", "up"));
    }

    #[test]
    fn wildcard_matches_a_word_run() {
        let p = IntentPattern::compile("is * working").unwrap();
        assert!(p.is_match("is nginx working?"));
        assert!(p.is_match("IS backend WORKING"));
        assert!(!p.is_match("is working"));
        assert!(!p.is_match("is the backend working"));
    }

    #[test]
    fn wildcard_respects_word_boundaries() {
        let p = IntentPattern::compile("is * up").unwrap();
        assert!(p.is_match("is nginx up"));
        // Hyphenated names are not a single run of word characters.
        assert!(!p.is_match("is web-01 up"));
        assert!(!p.is_match("this thing update"));
    }

    #[test]
    fn leading_and_trailing_wildcards() {
        let p = IntentPattern::compile("* health").unwrap();
        assert!(p.is_match("what is the system health"));
        assert!(!p.is_match("health"));

        let p = IntentPattern::compile("recent *").unwrap();
        assert!(p.is_match("show recent updates"));
        assert_eq!(p.template(), "recent *");
    }

    #[test]
    fn literal_template_without_wildcard() {
        let p = IntentPattern::compile("system status").unwrap();
        assert!(p.is_match("what's the system status?"));
        assert!(!p.is_match("system statuses"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = IntentPattern::compile("what is c++ *").unwrap();
        assert!(p.is_match("what is c++ version"));
        assert!(!p.is_match("what is cc version"));
    }
}
