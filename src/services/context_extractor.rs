//! Line-window context extraction for incremental fixes.
//!
//! The window around an error grows with each iteration so a repeated
//! failure sees more of the surrounding code. Token counts use a
//! 4 chars/token heuristic.

use crate::domain::models::{CodeError, ContextConfig, ContextWindow};
use crate::domain::ports::ContextExtractor;

/// Approximate characters per token (conservative heuristic).
const CHARS_PER_TOKEN: usize = 4;

/// Estimate the number of tokens in a string using the chars/token heuristic.
pub fn estimate_tokens(text: &str) -> u64 {
    text.len().div_ceil(CHARS_PER_TOKEN) as u64
}

/// Default `ContextExtractor`: a symmetric window of lines around the error.
#[derive(Debug, Clone, Default)]
pub struct LineWindowExtractor {
    config: ContextConfig,
}

impl LineWindowExtractor {
    /// Create an extractor with the given window limits.
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Lines either side of the error for a 1-based iteration.
    pub fn radius_for(&self, iteration: u32) -> u32 {
        let growth = self
            .config
            .growth_per_iteration
            .saturating_mul(iteration.saturating_sub(1));
        self.config
            .base_radius
            .saturating_add(growth)
            .min(self.config.max_radius)
    }
}

impl ContextExtractor for LineWindowExtractor {
    fn extract(&self, code: &str, error: &CodeError, iteration: u32) -> ContextWindow {
        let lines: Vec<&str> = code.lines().collect();
        let total = lines.len() as u32;
        if total == 0 {
            return ContextWindow {
                snippet: String::new(),
                start_line: 0,
                end_line: 0,
                estimated_tokens: 0,
            };
        }

        let (start_line, end_line) = match error.line {
            Some(line) => {
                let line = line.clamp(1, total);
                let radius = self.radius_for(iteration);
                (
                    line.saturating_sub(radius).max(1),
                    line.saturating_add(radius).min(total),
                )
            }
            None => (1, total.min(self.config.unlocated_line_limit.max(1))),
        };

        let snippet = lines[(start_line - 1) as usize..end_line as usize].join("\n");
        let estimated_tokens = estimate_tokens(&snippet);
        ContextWindow {
            snippet,
            start_line,
            end_line,
            estimated_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(lines: u32) -> String {
        (1..=lines)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn error_at(line: Option<u32>) -> CodeError {
        CodeError {
            message: "boom".to_string(),
            line,
            column: None,
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_radius_grows_and_caps() {
        let extractor = LineWindowExtractor::default();
        assert_eq!(extractor.radius_for(1), 10);
        assert_eq!(extractor.radius_for(2), 15);
        assert_eq!(extractor.radius_for(3), 20);
        assert_eq!(extractor.radius_for(100), 40);
    }

    #[test]
    fn test_window_around_error() {
        let extractor = LineWindowExtractor::default();
        let window = extractor.extract(&code(100), &error_at(Some(50)), 1);
        assert_eq!(window.start_line, 40);
        assert_eq!(window.end_line, 60);
        assert!(window.snippet.starts_with("line 40"));
        assert!(window.snippet.ends_with("line 60"));
        assert_eq!(window.estimated_tokens, estimate_tokens(&window.snippet));
    }

    #[test]
    fn test_window_widens_on_later_iterations() {
        let extractor = LineWindowExtractor::default();
        let first = extractor.extract(&code(100), &error_at(Some(50)), 1);
        let third = extractor.extract(&code(100), &error_at(Some(50)), 3);
        assert!(third.start_line < first.start_line);
        assert!(third.end_line > first.end_line);
        assert!(third.estimated_tokens > first.estimated_tokens);
    }

    #[test]
    fn test_window_clamps_to_file() {
        let extractor = LineWindowExtractor::default();
        let window = extractor.extract(&code(5), &error_at(Some(3)), 1);
        assert_eq!((window.start_line, window.end_line), (1, 5));

        let past_end = extractor.extract(&code(5), &error_at(Some(99)), 1);
        assert_eq!(past_end.end_line, 5);
    }

    #[test]
    fn test_unlocated_error_sends_head_of_file() {
        let extractor = LineWindowExtractor::new(ContextConfig {
            unlocated_line_limit: 20,
            ..ContextConfig::default()
        });
        let window = extractor.extract(&code(100), &error_at(None), 1);
        assert_eq!((window.start_line, window.end_line), (1, 20));
    }

    #[test]
    fn test_empty_code() {
        let extractor = LineWindowExtractor::default();
        let window = extractor.extract("", &error_at(Some(1)), 1);
        assert!(window.snippet.is_empty());
        assert_eq!(window.estimated_tokens, 0);
    }
}
