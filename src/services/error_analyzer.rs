//! Regex-based error classification.
//!
//! Rules are checked in order; the first match decides the category.
//! Locations are read from the common `file:line:col`, `file(line,col)` and
//! `line N, column M` shapes.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::models::{ErrorAnalysis, ErrorCategory};
use crate::domain::ports::ErrorAnalyzer;

const MAX_ROOT_CAUSE_CHARS: usize = 200;

struct CategoryRule {
    category: ErrorCategory,
    pattern: Regex,
    suggestion: &'static str,
}

static CATEGORY_RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    let rule = |category: ErrorCategory, pattern: &str, suggestion: &'static str| CategoryRule {
        category,
        pattern: Regex::new(pattern).expect("valid category regex"),
        suggestion,
    };
    vec![
        rule(
            ErrorCategory::Configuration,
            r"(?i)(environment variable|\benv\b|api[_ ]key|config(uration)?\b|tsconfig|invalid option|missing (setting|credential))",
            "Check configuration values and environment variables; code changes alone will not fix this.",
        ),
        rule(
            ErrorCategory::Import,
            r"(?i)(cannot find module|module not found|failed to resolve import|no exported member|unresolved import|could not resolve|\bimport\b)",
            "Fix the import path or the imported name, or add the missing dependency.",
        ),
        rule(
            ErrorCategory::Syntax,
            r"(?i)(syntaxerror|syntax error|unexpected (token|end of input|eof)|unterminated|expected [';:)\]}]|parse error|parsing error)",
            "Fix the malformed syntax near the reported location.",
        ),
        rule(
            ErrorCategory::Type,
            r"(?i)(\bTS\d{4}\b|is not assignable|does not exist on type|type mismatch|mismatched types|expected type|incompatible types?)",
            "Align the value with the declared type or widen the type.",
        ),
        rule(
            ErrorCategory::Reference,
            r"(?i)(referenceerror|is not defined|cannot find name|undefined variable|undeclared|not found in this scope)",
            "Declare the missing identifier or fix its spelling.",
        ),
        rule(
            ErrorCategory::Runtime,
            r"(?i)(typeerror|rangeerror|cannot read propert|undefined is not|null pointer|\bpanic|stack overflow|out of memory|uncaught|exception)",
            "Guard the failing operation against unexpected values at runtime.",
        ),
    ]
});

static COLON_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+):(\d+)").expect("valid colon location regex"));
static PAREN_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+),\s*(\d+)\)").expect("valid paren location regex"));
static WORD_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bline\s+(\d+)(?:\s*,?\s*(?:column|col)\s+(\d+))?")
        .expect("valid word location regex")
});

const UNKNOWN_SUGGESTION: &str = "Inspect the full error output and regenerate the affected code.";

/// Default `ErrorAnalyzer`: keyword rules plus location extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternErrorAnalyzer;

impl PatternErrorAnalyzer {
    /// Create an analyzer with the built-in rules.
    pub fn new() -> Self {
        Self
    }

    /// First matching category, or `Unknown`.
    pub fn categorize(&self, message: &str) -> (ErrorCategory, &'static str) {
        CATEGORY_RULES
            .iter()
            .find(|rule| rule.pattern.is_match(message))
            .map_or((ErrorCategory::Unknown, UNKNOWN_SUGGESTION), |rule| {
                (rule.category, rule.suggestion)
            })
    }

    /// `(line, column)` if the message carries a location.
    pub fn locate(&self, message: &str) -> (Option<u32>, Option<u32>) {
        for pattern in [&*COLON_LOCATION, &*PAREN_LOCATION] {
            if let Some(caps) = pattern.captures(message) {
                return (parse_number(caps.get(1)), parse_number(caps.get(2)));
            }
        }
        WORD_LOCATION
            .captures(message)
            .map_or((None, None), |caps| {
                (parse_number(caps.get(1)), parse_number(caps.get(2)))
            })
    }
}

fn parse_number(m: Option<regex::Match<'_>>) -> Option<u32> {
    m.and_then(|m| m.as_str().parse().ok())
}

fn root_cause(message: &str) -> String {
    let first_line = message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    first_line.chars().take(MAX_ROOT_CAUSE_CHARS).collect()
}

impl ErrorAnalyzer for PatternErrorAnalyzer {
    fn analyze(&self, message: &str) -> ErrorAnalysis {
        let (category, suggestion) = self.categorize(message);
        let (line, column) = self.locate(message);
        ErrorAnalysis {
            category,
            root_cause: root_cause(message),
            suggestion: suggestion.to_string(),
            line,
            column,
        }
    }
}
