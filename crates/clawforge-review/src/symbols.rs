use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn diff_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:---|\+\+\+) [ab]/(.+)$").unwrap())
}

fn import_specifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:import\s+(?:[^'"]*?\s+from\s+)?|require\(|import\()['"]([^'"]+)['"]\)?"#).unwrap()
    })
}

fn symbol_mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Za-z][A-Za-z0-9]*\b").unwrap())
}

/// Short, common words that happen to match the camelCase/PascalCase shape
/// but carry no identifying information on their own.
const SYMBOL_BLOCKLIST: &[&str] = &["get", "set", "new", "old", "use", "mod", "pub", "let", "for", "The", "And"];

/// Normalizes a path-like specifier: backslashes become forward slashes,
/// a leading `./` is stripped. Returns `None` if the specifier contains a
/// `..` path segment or starts with `/` (absolute).
fn normalize_relative_path(raw: &str) -> Option<String> {
    let slashed = raw.replace('\\', "/");
    if slashed.starts_with('/') {
        return None;
    }
    if slashed.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(slashed.strip_prefix("./").unwrap_or(&slashed).to_string())
}

/// Extracts every repo-relative path named in unified-diff `--- a/X` /
/// `+++ b/X` headers, excluding `/dev/null`.
pub fn extract_diff_paths(diff_text: &str) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    for line in diff_text.lines() {
        let Some(captures) = diff_header_re().captures(line) else { continue };
        let raw = &captures[1];
        if raw == "/dev/null" {
            continue;
        }
        if let Some(normalized) = normalize_relative_path(raw) {
            paths.insert(normalized);
        }
    }
    paths
}

/// Extracts module specifiers referenced via `import ... from "..."`,
/// `require("...")`, and dynamic `import("...")`. Relative specifiers are
/// normalized and rejected if they escape the repo root; external
/// (non-relative) specifiers pass through unchanged.
pub fn extract_import_specifiers(diff_text: &str) -> BTreeSet<String> {
    let mut specifiers = BTreeSet::new();
    for captures in import_specifier_re().captures_iter(diff_text) {
        let raw = &captures[1];
        if raw.starts_with('/') || raw.split('/').any(|segment| segment == "..") {
            continue;
        }
        if raw.starts_with("./") {
            if let Some(normalized) = normalize_relative_path(raw) {
                specifiers.insert(normalized);
            }
        } else {
            specifiers.insert(raw.to_string());
        }
    }
    specifiers
}

/// Best-effort extraction of PascalCase/camelCase identifier mentions,
/// length >= 3, excluding a fixed blocklist of short common words.
pub fn extract_symbol_mentions(diff_text: &str) -> BTreeSet<String> {
    let mut symbols = BTreeSet::new();
    for mat in symbol_mention_re().find_iter(diff_text) {
        let word = mat.as_str();
        if word.len() < 3 {
            continue;
        }
        if SYMBOL_BLOCKLIST.contains(&word) {
            continue;
        }
        let is_pascal = word.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        let is_camel = word.chars().next().is_some_and(|c| c.is_ascii_lowercase())
            && word.chars().any(|c| c.is_ascii_uppercase());
        if is_pascal || is_camel {
            symbols.insert(word.to_string());
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_sides_of_a_diff_header() {
        let diff = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,2 +1,2 @@\n-old\n+new\n";
        let paths = extract_diff_paths(diff);
        assert!(paths.contains("src/lib.rs"));
    }

    #[test]
    fn dev_null_is_excluded() {
        let diff = "--- /dev/null\n+++ b/src/new_file.rs\n";
        let paths = extract_diff_paths(diff);
        assert!(!paths.contains("/dev/null"));
        assert!(paths.contains("src/new_file.rs"));
    }

    #[test]
    fn no_extracted_path_escapes_the_repo_root() {
        let diff = "--- a/../secrets.env\n+++ b/../secrets.env\n";
        let paths = extract_diff_paths(diff);
        assert!(paths.is_empty());
    }

    #[test]
    fn relative_import_specifier_is_normalized() {
        let diff = "+import { helper } from \"./utils/helper\";\n";
        let specifiers = extract_import_specifiers(diff);
        assert!(specifiers.contains("utils/helper"));
    }

    #[test]
    fn external_import_specifier_passes_through_unchanged() {
        let diff = "+const fs = require(\"node:fs\");\n";
        let specifiers = extract_import_specifiers(diff);
        assert!(specifiers.contains("node:fs"));
    }

    #[test]
    fn escaping_import_specifier_is_rejected() {
        let diff = "+import x from \"../../etc/passwd\";\n";
        let specifiers = extract_import_specifiers(diff);
        assert!(specifiers.is_empty());
    }

    #[test]
    fn camel_and_pascal_case_mentions_are_found_and_short_words_are_not() {
        let diff = "+fn computePlanHash(plan: ExecutionPlan) -> String {\n+    let x = get(plan);\n";
        let symbols = extract_symbol_mentions(diff);
        assert!(symbols.contains("computePlanHash"));
        assert!(symbols.contains("ExecutionPlan"));
        assert!(!symbols.contains("get"));
    }
}
