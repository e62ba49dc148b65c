//! Tab/space conversion of a single text blob.
//!
//! Two sweeps run in order over the whole text:
//! 1. leading indentation, anchored at line start, sized by `indent_size`
//! 2. in-line runs anywhere in the text, sized by `tab_size`
//!
//! The second sweep sees the output of the first. Every matched run counts
//! as one replacement regardless of how many characters it spans.

use regex::{Captures, Regex};
use thiserror::Error;

use crate::app::models::{Operation, Settings};

/// Largest indent or tab size accepted, in columns.
pub const MAX_UNIT_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Size {size} is larger than the maximum of {max} columns")]
    SizeTooLarge { size: usize, max: usize },
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Result of converting one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    /// Number of runs replaced across both sweeps.
    pub indents: usize,
}

#[derive(Debug)]
struct Pass {
    pattern: Regex,
    unit: usize,
}

impl Pass {
    fn build(operation: Operation, unit: usize, anchored: bool) -> Result<Self, TransformError> {
        if unit > MAX_UNIT_SIZE {
            return Err(TransformError::SizeTooLarge {
                size: unit,
                max: MAX_UNIT_SIZE,
            });
        }
        let anchor = if anchored { "(?m)^" } else { "" };
        let body = match operation {
            Operation::ToSpaces => r"\t+".to_string(),
            Operation::ToTabs => format!("(?: {{{unit}}})+"),
        };
        Ok(Self {
            pattern: Regex::new(&format!("{anchor}{body}"))?,
            unit,
        })
    }

    fn run(&self, operation: Operation, text: &str) -> (String, usize) {
        let mut count = 0;
        let unit = self.unit;
        let replaced = self.pattern.replace_all(text, |caps: &Captures<'_>| {
            count += 1;
            let run = caps[0].len();
            match operation {
                Operation::ToSpaces => " ".repeat(run * unit),
                Operation::ToTabs => "\t".repeat(run / unit),
            }
        });
        (replaced.into_owned(), count)
    }
}

/// Compiled conversion for one set of [`Settings`], reusable across documents.
#[derive(Debug)]
pub struct Transformer {
    operation: Operation,
    leading: Option<Pass>,
    inline: Option<Pass>,
}

impl Transformer {
    /// Fails when a size used by an enabled sweep exceeds [`MAX_UNIT_SIZE`].
    pub fn new(settings: &Settings) -> Result<Self, TransformError> {
        let leading = if settings.indent_size > 0 {
            Some(Pass::build(settings.operation, settings.indent_size, true)?)
        } else {
            None
        };
        let inline = if !settings.indent_only && settings.tab_size > 0 {
            Some(Pass::build(settings.operation, settings.tab_size, false)?)
        } else {
            None
        };
        Ok(Self {
            operation: settings.operation,
            leading,
            inline,
        })
    }

    pub fn apply(&self, text: &str) -> Transformed {
        let mut current = text.to_string();
        let mut indents = 0;
        for pass in [&self.leading, &self.inline].into_iter().flatten() {
            let (next, count) = pass.run(self.operation, &current);
            if count > 0 {
                current = next;
                indents += count;
            }
        }
        Transformed {
            text: current,
            indents,
        }
    }
}

/// One-shot helper for callers converting a single blob.
pub fn transform(settings: &Settings, text: &str) -> Result<Transformed, TransformError> {
    Ok(Transformer::new(settings)?.apply(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indent_only(operation: Operation, size: usize) -> Settings {
        Settings::new(operation, size, size, true)
    }

    fn all_runs(operation: Operation, indent: usize, tab: usize) -> Settings {
        Settings::new(operation, indent, tab, false)
    }

    #[test]
    fn leading_tabs_become_spaces() {
        let out = transform(&indent_only(Operation::ToSpaces, 4), "\tfoo\n\t\tbar\n").unwrap();
        assert_eq!(out.text, "    foo\n        bar\n");
        assert_eq!(out.indents, 2);
    }

    #[test]
    fn leading_spaces_become_tabs() {
        let out = transform(&indent_only(Operation::ToTabs, 4), "    foo\n").unwrap();
        assert_eq!(out.text, "\tfoo\n");
        assert_eq!(out.indents, 1);
    }

    #[test]
    fn short_leading_run_is_untouched() {
        let out = transform(&all_runs(Operation::ToTabs, 4, 4), "   foo\n").unwrap();
        assert_eq!(out.text, "   foo\n");
        assert_eq!(out.indents, 0);
    }

    #[test]
    fn partial_indent_remainder_is_preserved() {
        let out = transform(&indent_only(Operation::ToTabs, 4), "          x\n").unwrap();
        assert_eq!(out.text, "\t\t  x\n");
        assert_eq!(out.indents, 1);
    }

    #[test]
    fn mixed_run_stops_at_first_other_character() {
        let out = transform(&indent_only(Operation::ToSpaces, 2), "\t \tx\n").unwrap();
        assert_eq!(out.text, "   \tx\n");
        assert_eq!(out.indents, 1);
    }

    #[test]
    fn empty_text_is_a_noop() {
        let out = transform(&all_runs(Operation::ToSpaces, 4, 4), "").unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.indents, 0);
    }

    #[test]
    fn zero_sizes_disable_both_passes() {
        let out = transform(&all_runs(Operation::ToSpaces, 0, 0), "\ta\tb\n").unwrap();
        assert_eq!(out.text, "\ta\tb\n");
        assert_eq!(out.indents, 0);
    }

    #[test]
    fn indent_only_leaves_inline_tabs() {
        let out = transform(&indent_only(Operation::ToSpaces, 4), "\ta\tb\n").unwrap();
        assert_eq!(out.text, "    a\tb\n");
        assert_eq!(out.indents, 1);
    }

    #[test]
    fn inline_pass_uses_tab_size() {
        let out = transform(&all_runs(Operation::ToSpaces, 4, 2), "\ta\t\tb\n").unwrap();
        assert_eq!(out.text, "    a    b\n");
        assert_eq!(out.indents, 2);
    }

    #[test]
    fn inline_pass_sees_leading_pass_output() {
        // Leading remainder of two spaces is picked up again by the in-line sweep.
        let out = transform(&all_runs(Operation::ToTabs, 4, 2), "      x  y\n").unwrap();
        assert_eq!(out.text, "\t\tx\ty\n");
        assert_eq!(out.indents, 3);
    }

    #[test]
    fn converting_twice_is_idempotent() {
        let settings = all_runs(Operation::ToSpaces, 4, 4);
        let once = transform(&settings, "\tfoo\n\t\tbar\tbaz\n").unwrap();
        let twice = transform(&settings, &once.text).unwrap();
        assert_eq!(twice.text, once.text);
        assert_eq!(twice.indents, 0);
    }

    #[test]
    fn whole_multiple_indentation_round_trips() {
        let original = "fn main() {\n\tif x {\n\t\ty();\n\t}\n}\n";
        let spaced = transform(&indent_only(Operation::ToSpaces, 4), original).unwrap();
        let tabbed = transform(&indent_only(Operation::ToTabs, 4), &spaced.text).unwrap();
        assert_eq!(tabbed.text, original);

        let back = transform(&indent_only(Operation::ToSpaces, 4), &tabbed.text).unwrap();
        assert_eq!(back.text, spaced.text);
    }

    #[test]
    fn crlf_line_starts_are_recognised() {
        let out = transform(&indent_only(Operation::ToSpaces, 2), "a\r\n\tb\r\n").unwrap();
        assert_eq!(out.text, "a\r\n  b\r\n");
        assert_eq!(out.indents, 1);
    }

    #[test]
    fn huge_indent_size_is_rejected_for_spaces() {
        let err = Transformer::new(&indent_only(Operation::ToSpaces, usize::MAX)).unwrap_err();
        assert!(matches!(
            err,
            TransformError::SizeTooLarge { size: usize::MAX, max: MAX_UNIT_SIZE }
        ));
    }

    #[test]
    fn huge_indent_size_is_rejected_for_tabs() {
        let err = Transformer::new(&indent_only(Operation::ToTabs, usize::MAX)).unwrap_err();
        assert!(matches!(err, TransformError::SizeTooLarge { .. }));
    }

    #[test]
    fn huge_tab_size_is_rejected_only_when_inline_pass_runs() {
        assert!(Transformer::new(&Settings::new(Operation::ToSpaces, 4, usize::MAX, true)).is_ok());
        assert!(matches!(
            transform(&all_runs(Operation::ToSpaces, 4, usize::MAX), "\ta\tb\n"),
            Err(TransformError::SizeTooLarge { .. })
        ));
    }

    #[test]
    fn largest_accepted_size_still_converts() {
        let out = transform(&indent_only(Operation::ToSpaces, MAX_UNIT_SIZE), "\tx\n").unwrap();
        assert_eq!(out.text.len(), MAX_UNIT_SIZE + 2);
        assert_eq!(out.indents, 1);
    }

    #[test]
    fn transformer_is_reusable() {
        let transformer = Transformer::new(&indent_only(Operation::ToTabs, 2)).unwrap();
        assert_eq!(transformer.apply("  a\n").indents, 1);
        assert_eq!(transformer.apply("    b\n").text, "\t\tb\n");
    }
}
