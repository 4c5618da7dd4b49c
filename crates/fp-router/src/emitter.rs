//! Offline renderers for a routing config: JSON document, standalone Rust
//! dispatch source, and a Markdown usage summary.

use std::collections::HashSet;
use std::fmt::Write as _;

use fp_protocol::routing::{RoutingConfig, RoutingRule};

use crate::error::{RouterError, RouterResult};
use crate::matcher::WHOLE_WORD_MAX_LEN;

/// The config document as pretty-printed JSON.
pub fn render_config_json(config: &RoutingConfig) -> RouterResult<String> {
    config
        .to_json_pretty()
        .map_err(|e| RouterError::Render(e.to_string()))
}

/// A self-contained Rust module: one `classify_<category>` per rule and a
/// `dispatch` that tries them in priority order.
///
/// The generated matcher applies the same short-term whole-word rule as
/// [`crate::matcher::contains_term`]. Intent patterns are matched token by
/// token, with `*` standing for a single word.
pub fn render_dispatch_source(config: &RoutingConfig) -> String {
    let idents = rule_idents(&config.rules);
    let mut out = String::new();

    let _ = writeln!(out, "// Generated routing dispatch. Do not edit by hand.");
    let _ = writeln!(
        out,
        "// Rules: {} | endpoints: {} | generated at {}",
        config.rules.len(),
        config.metadata.total_endpoints,
        config.metadata.generated_at.to_rfc3339()
    );
    out.push('\n');
    out.push_str(&support_source());

    for (rule, ident) in config.rules.iter().zip(&idents) {
        out.push('\n');
        out.push_str(&classify_fn_source(rule, ident));
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "/// Category of the first matching rule, in priority order."
    );
    let _ = writeln!(out, "pub fn dispatch(query: &str) -> Option<&'static str> {{");
    let _ = writeln!(out, "    let query = normalize(query);");
    let _ = writeln!(out, "    if query.is_empty() {{");
    let _ = writeln!(out, "        return None;");
    let _ = writeln!(out, "    }}");
    for (rule, ident) in config.rules.iter().zip(&idents) {
        let _ = writeln!(out, "    if classify_{ident}(&query) {{");
        let _ = writeln!(out, "        return Some({:?});", rule.category);
        let _ = writeln!(out, "    }}");
    }
    let _ = writeln!(out, "    None");
    let _ = writeln!(out, "}}");
    out
}

fn classify_fn_source(rule: &RoutingRule, ident: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "/// `{}` (priority {}, confidence {:.2}).",
        rule.category, rule.priority, rule.confidence
    );
    let _ = writeln!(out, "pub fn classify_{ident}(query: &str) -> bool {{");
    let _ = writeln!(out, "    const KEYWORDS: &[&str] = &{};", str_slice(&rule.keywords));
    let _ = writeln!(
        out,
        "    const PATTERNS: &[&str] = &{};",
        str_slice(&rule.intent_patterns)
    );
    let _ = writeln!(
        out,
        "    const NEGATIVE: &[&str] = &{};",
        str_slice(&rule.negative_keywords)
    );
    let _ = writeln!(
        out,
        "    if NEGATIVE.iter().any(|k| contains_term(query, k)) {{"
    );
    let _ = writeln!(out, "        return false;");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(
        out,
        "    KEYWORDS.iter().any(|k| contains_term(query, k))"
    );
    let _ = writeln!(
        out,
        "        || PATTERNS.iter().any(|p| matches_pattern(query, p))"
    );
    let _ = writeln!(out, "}}");
    out
}

fn support_source() -> String {
    format!(
        r#"const WHOLE_WORD_MAX_LEN: usize = {WHOLE_WORD_MAX_LEN};

fn normalize(query: &str) -> String {{
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}}

fn is_word_char(c: char) -> bool {{
    c.is_alphanumeric() || c == '_'
}}

/// Short terms match whole words only; longer terms match as substrings.
pub fn contains_term(haystack: &str, term: &str) -> bool {{
    let term = term.trim().to_lowercase();
    if term.is_empty() {{
        return false;
    }}
    if term.chars().count() > WHOLE_WORD_MAX_LEN {{
        return haystack.contains(&term);
    }}
    haystack.match_indices(term.as_str()).any(|(start, m)| {{
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }})
}}

fn words(text: &str) -> Vec<&str> {{
    text.split(|c: char| !is_word_char(c)).filter(|w| !w.is_empty()).collect()
}}

/// Token-level match of a phrasing template; `*` stands for one word.
pub fn matches_pattern(query: &str, pattern: &str) -> bool {{
    let query = words(query);
    let pattern: Vec<&str> = pattern.split_whitespace().collect();
    if pattern.is_empty() || pattern.len() > query.len() {{
        return false;
    }}
    query.windows(pattern.len()).any(|window| {{
        window.iter().zip(&pattern).all(|(w, p)| *p == "*" || w == p)
    }})
}}
"#
    )
}

/// A Markdown table of the rules plus usage notes.
pub fn render_rule_summary(config: &RoutingConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Routing rules");
    out.push('\n');
    let _ = writeln!(
        out,
        "Generated at {} from {} endpoint(s){}.",
        config.metadata.generated_at.to_rfc3339(),
        config.metadata.total_endpoints,
        config
            .metadata
            .api_version
            .as_deref()
            .map(|v| format!(", API version {v}"))
            .unwrap_or_default()
    );
    out.push('\n');
    let _ = writeln!(
        out,
        "| priority | category | confidence | keywords | endpoints |"
    );
    let _ = writeln!(out, "|---|---|---|---|---|");
    for rule in &config.rules {
        let endpoints = rule.endpoint_ids();
        let _ = writeln!(
            out,
            "| {} | `{}` | {:.2} | {} | {} |",
            rule.priority,
            rule.category,
            rule.confidence,
            md_list(&rule.keywords),
            if endpoints.is_empty() {
                "-".to_string()
            } else {
                md_list(&endpoints)
            },
        );
    }

    for rule in &config.rules {
        out.push('\n');
        let _ = writeln!(out, "## `{}`", rule.category);
        out.push('\n');
        if !rule.intent_patterns.is_empty() {
            let _ = writeln!(out, "Phrasings: {}", md_list(&rule.intent_patterns));
        }
        if !rule.negative_keywords.is_empty() {
            let _ = writeln!(out, "Excluded by: {}", md_list(&rule.negative_keywords));
        }
        for endpoint in &rule.endpoints {
            let _ = writeln!(
                out,
                "- `{} {}`{}",
                endpoint.method,
                endpoint.path,
                endpoint
                    .summary
                    .as_deref()
                    .map(|s| format!(": {s}"))
                    .unwrap_or_default()
            );
        }
    }

    if !config.fallback_suggestions.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "## Fallback suggestions");
        out.push('\n');
        for suggestion in &config.fallback_suggestions {
            let _ = writeln!(out, "- {suggestion}");
        }
    }

    out.push('\n');
    let _ = writeln!(out, "## Usage");
    out.push('\n');
    let _ = writeln!(
        out,
        "Include `generated_router.rs` as a module and call `dispatch(query)`; it returns the category of the first matching rule or `None`."
    );
    out
}

/// Lower-case snake identifier for a category, `_`-prefixed if it would
/// start with a digit.
pub fn rust_ident(category: &str) -> String {
    let mut ident: String = category
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// One identifier per rule; collisions get a numeric suffix.
fn rule_idents(rules: &[RoutingRule]) -> Vec<String> {
    let mut seen = HashSet::new();
    rules
        .iter()
        .map(|rule| {
            let base = rust_ident(&rule.category);
            let mut ident = base.clone();
            let mut n = 2;
            while !seen.insert(ident.clone()) {
                ident = format!("{base}_{n}");
                n += 1;
            }
            ident
        })
        .collect()
}

fn str_slice(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("{s:?}")).collect();
    format!("[{}]", quoted.join(", "))
}

fn md_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("`{}`", s.replace('|', "\\|")))
        .collect::<Vec<_>>()
        .join(", ")
}
