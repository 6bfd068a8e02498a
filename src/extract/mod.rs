//! Target-name extraction from free-form toolchain output.
//!
//! The pipeline is a pure function of its input text:
//!
//! 1. Split into lines, trim, skip blanks.
//! 2. Capture a candidate list with the first matching line pattern.
//! 3. Run the cleanup transforms over the capture.
//! 4. Tokenize with the first separator that yields a real list.
//! 5. Keep tokens that pass axis validation, deduplicated.
//!
//! Extraction is best-effort; the reference catalog covers what it misses.

pub mod rules;

use std::collections::HashSet;

use crate::core::Axis;

pub use rules::{Cleanup, ExtractionRules, Validator};

use rules::MIN_LIST_TOKENS;

/// Extract validated target names for `axis` using the built-in rules.
///
/// Names are lowercase and unique, in first-seen order.
pub fn extract(text: &str, axis: Axis) -> Vec<String> {
    extract_with(ExtractionRules::builtin(), text, axis)
}

/// Extract validated target names using an explicit rule set.
pub fn extract_with(rules: &ExtractionRules, text: &str, axis: Axis) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(captured) = rules.capture(line) else {
            continue;
        };

        let cleaned = rules.clean(captured);
        for token in tokenize(&cleaned, &rules.separators) {
            let token = token.to_lowercase();
            if rules.validator.accepts(&token, axis) && seen.insert(token.clone()) {
                names.push(token);
            }
        }
    }

    names
}

/// Split a cleaned list into tokens.
///
/// Separators are tried in priority order; the first one present that
/// yields more than two tokens wins. Whitespace splitting is the fallback.
/// Anything shorter is not a list and yields nothing.
pub fn tokenize<'a>(input: &'a str, separators: &[&str]) -> Vec<&'a str> {
    for sep in separators {
        if !input.contains(sep) {
            continue;
        }
        let tokens: Vec<&str> = input
            .split(sep)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() > MIN_LIST_TOKENS {
            return tokens.into_iter().filter(|t| t.len() > 1).collect();
        }
    }

    let words: Vec<&str> = input.split_whitespace().collect();
    if words.len() > MIN_LIST_TOKENS {
        return words;
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIM_OS_ERROR: &str = "\
Hint: used config file '/etc/nim/nim.cfg' [Conf]
Error: unknown OS: 'invalid'. Available options are: DOS, Windows, OS2, Linux, MorphOS, SkyOS, Solaris, Irix, NetBSD, FreeBSD, OpenBSD, DragonFly, MacOSX, Haiku, Android, Standalone
";

    const NIM_CPU_ERROR: &str = "\
Error: unknown CPU: 'invalid'. Available options are: i386, m68k, alpha, powerpc, powerpc64, amd64, arm, arm64, riscv64, wasm32
";

    #[test]
    fn test_extract_os_from_error_output() {
        let names = extract(NIM_OS_ERROR, Axis::Os);

        assert!(names.contains(&"linux".to_string()));
        assert!(names.contains(&"windows".to_string()));
        assert!(names.contains(&"netbsd".to_string()));
        assert!(names.contains(&"macosx".to_string()));
        // os2 does not look like an OS identifier to the validator
        assert!(!names.contains(&"os2".to_string()));
        // Noise words are stripped before tokenizing
        assert!(!names.contains(&"available".to_string()));
        assert!(!names.contains(&"options".to_string()));
    }

    #[test]
    fn test_extract_cpu_from_error_output() {
        let names = extract(NIM_CPU_ERROR, Axis::Cpu);

        assert_eq!(
            names,
            [
                "i386", "m68k", "alpha", "powerpc", "powerpc64", "amd64", "arm", "arm64",
                "riscv64", "wasm32"
            ]
        );
    }

    #[test]
    fn test_extract_deduplicates_case_insensitively() {
        let text = "supported targets: linux, windows, haiku\nvalid options: LINUX, Windows, qnx";
        let names = extract(text, Axis::Os);

        assert_eq!(names, ["linux", "windows", "haiku", "qnx"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let first = extract(NIM_OS_ERROR, Axis::Os);
        let second = extract(NIM_OS_ERROR, Axis::Os);

        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_ignores_short_lists() {
        let text = "\
Usage:
  nim command [options] [projectfile] [arguments]
one of: linux, windows
--os: linux";

        assert!(extract(text, Axis::Os).is_empty());
    }

    #[test]
    fn test_extract_empty_input() {
        assert!(extract("", Axis::Os).is_empty());
        assert!(extract("\n\n   \n", Axis::Cpu).is_empty());
    }

    #[test]
    fn test_tokenize_separator_priority() {
        let seps = rules::SEPARATORS;
        assert_eq!(tokenize("a1|b2|c3", seps), ["a1", "b2", "c3"]);
        assert_eq!(tokenize("aa;bb;cc;dd", seps), ["aa", "bb", "cc", "dd"]);
        // A single space-separated pair is not a list
        assert!(tokenize("linux windows", seps).is_empty());
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        let seps = rules::SEPARATORS;
        assert_eq!(tokenize("linux x windows haiku", seps), [
            "linux", "windows", "haiku"
        ]);
    }

    #[test]
    fn test_extract_with_custom_rules() {
        let rules = ExtractionRules::from_patterns(&[r"(?i)^targets=(.+)$"], &[r"[,\s]+"]).unwrap();
        let names = extract_with(&rules, "targets=amd64,arm64,riscv64", Axis::Cpu);

        assert_eq!(names, ["amd64", "arm64", "riscv64"]);
    }
}
