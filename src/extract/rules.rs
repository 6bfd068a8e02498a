//! The extraction rule table.
//!
//! Rules are data: an ordered list of line patterns, an ordered list of
//! cleanup transforms, the separator priority list, and per-axis validation
//! patterns. The pipeline in [`super`] only interprets them.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::Axis;

/// Line patterns, highest priority first. The last capture group of the
/// first pattern that matches a line is the candidate list.
const LINE_PATTERNS: &[&str] = &[
    r"(?i)(available|valid|supported)\s+.*?(?:options|targets|platforms).*?[:]\s*(.+)",
    r"(?i)one\s+of[:]\s*(.+)",
    r"(?i)(?:options|targets)\s+are[:]\s*(.+)",
    r"(?i)--(?:os|cpu)[:]\s*(.+)",
    r"(?i)(?:^|\s)([a-z0-9_]+(?:[,\s|;]+[a-z0-9_]+){3,})",
];

/// Noise removed from a captured list before tokenizing, applied in order.
const BLANKING_PATTERNS: &[&str] = &[
    r"\b(?:or|and|the|a|an|options|are|targets|platforms|available|supported|valid|one|of)\b",
    r"[:\.,;]+",
    r"\s+",
];

/// Candidate separators, highest priority first.
pub const SEPARATORS: &[&str] = &[", ", " ", ",", "|", ";", "\t"];

/// A tokenization is only accepted when it yields more than this many tokens.
pub const MIN_LIST_TOKENS: usize = 2;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 20;

const NAME_PATTERN: &str = r"^[a-z0-9_]+$";
const OS_PATTERN: &str = r"^(linux|windows|macos|freebsd|android|ios|.*bsd|.*nix|.*os)$|^[a-z]+$";
const CPU_PATTERN: &str =
    r"^(i386|amd64|x86|arm|mips|sparc|powerpc|riscv|wasm|alpha).*$|^[a-z0-9]+$";

static DEFAULT_RULES: LazyLock<ExtractionRules> = LazyLock::new(|| {
    ExtractionRules::from_patterns(LINE_PATTERNS, BLANKING_PATTERNS)
        .expect("built-in extraction patterns are valid")
});

/// A single text-normalization step applied to a captured list.
#[derive(Debug, Clone)]
pub enum Cleanup {
    /// Lowercase and trim.
    Normalize,
    /// Replace every match with a single space.
    Blank(Regex),
}

impl Cleanup {
    pub fn apply(&self, input: &str) -> String {
        match self {
            Cleanup::Normalize => input.trim().to_lowercase(),
            Cleanup::Blank(re) => re.replace_all(input, " ").into_owned(),
        }
    }
}

/// Accepts or rejects tokenized candidates for an axis.
#[derive(Debug, Clone)]
pub struct Validator {
    name: Regex,
    os: Regex,
    cpu: Regex,
}

impl Validator {
    fn new() -> Result<Self, regex::Error> {
        Ok(Validator {
            name: Regex::new(NAME_PATTERN)?,
            os: Regex::new(OS_PATTERN)?,
            cpu: Regex::new(CPU_PATTERN)?,
        })
    }

    /// Whether `token` looks like a valid name on `axis`.
    pub fn accepts(&self, token: &str, axis: Axis) -> bool {
        if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&token.len()) {
            return false;
        }
        if !self.name.is_match(token) {
            return false;
        }
        match axis {
            Axis::Os => self.os.is_match(token),
            Axis::Cpu => self.cpu.is_match(token),
        }
    }
}

/// The complete declarative rule set.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub patterns: Vec<Regex>,
    pub cleanups: Vec<Cleanup>,
    pub separators: Vec<&'static str>,
    pub validator: Validator,
}

impl ExtractionRules {
    /// The built-in rules tuned for nim's help and error output.
    pub fn builtin() -> &'static ExtractionRules {
        &DEFAULT_RULES
    }

    /// Build a rule set from line patterns and blanking patterns.
    ///
    /// The cleanup list always starts with [`Cleanup::Normalize`], followed
    /// by one [`Cleanup::Blank`] per blanking pattern.
    pub fn from_patterns(patterns: &[&str], blanking: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cleanups = vec![Cleanup::Normalize];
        for pattern in blanking {
            cleanups.push(Cleanup::Blank(Regex::new(pattern)?));
        }

        Ok(ExtractionRules {
            patterns,
            cleanups,
            separators: SEPARATORS.to_vec(),
            validator: Validator::new()?,
        })
    }

    /// Captured list from the first pattern that matches `line`.
    pub fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(line)?;
            caps.get(caps.len() - 1).map(|m| m.as_str())
        })
    }

    /// Run every cleanup transform in order.
    pub fn clean(&self, captured: &str) -> String {
        self.cleanups
            .iter()
            .fold(captured.to_string(), |acc, step| step.apply(&acc))
    }
}
