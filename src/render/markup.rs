//! Block classifier for markup documents
//!
//! Lines are classified one at a time, top to bottom. The only state carried between lines is whether a fenced code block is open.

use std::sync::LazyLock;

use regex::Regex;
use crate::{Formatter, Justification, Style};
use super::{Receipt, inline::{leaves_code_open, parse_wrapped, rewrite_links}};

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.\s+(.*)$").expect("Invalid regex")
});

const BULLET: &str = "• ";
const QUOTE: &str = "│ ";

pub(super) fn render_markup(receipt: &mut Receipt, formatter: &Formatter, text: &str) {
    let mut in_code_block = false;

    for line in text.lines() {
        if line.trim().starts_with("```") {
            in_code_block = !in_code_block;
            receipt.blank();
            continue;
        }

        if in_code_block {
            // Verbatim, never wrapped
            receipt.plain(format!("  {}", line));
            continue;
        }

        let stripped = line.trim_start();
        if stripped.is_empty() {
            receipt.blank();
            continue;
        }

        if let Some(title) = stripped.strip_prefix("# ") {
            let title = match title.trim() {
                "" => "Untitled",
                title => title
            };
            receipt.styled(Style::double(Justification::Left), formatter.truncate(title));
            receipt.blank();
        } else if let Some(title) = stripped.strip_prefix("## ").or_else(|| stripped.strip_prefix("### ")) {
            let title = rewrite_links(title);
            for mut segments in parse_wrapped(&wrap_inline(formatter, &title, |f, text| f.wrap(text))) {
                for segment in segments.iter_mut() {
                    segment.bold = true;
                }
                receipt.segments(&segments);
            }
        } else if let Some(quote) = stripped.strip_prefix("> ") {
            for wrapped in formatter.hanging(QUOTE, quote.trim()) {
                receipt.plain(wrapped);
            }
        } else if matches!(stripped.trim_end(), "---" | "***" | "___") {
            receipt.plain(formatter.rule());
        } else if let Some(item) = stripped.strip_prefix("- ").or_else(|| stripped.strip_prefix("* ")) {
            let item = rewrite_links(item.trim());
            for segments in parse_wrapped(&wrap_inline(formatter, &item, |f, text| f.hanging(BULLET, text))) {
                receipt.segments(&segments);
            }
        } else if let Some(caps) = NUMBERED.captures(stripped) {
            // The number is kept as written, lists are not renumbered
            let prefix = format!("{}. ", &caps[1]);
            let item = rewrite_links(caps[2].trim());
            for segments in parse_wrapped(&wrap_inline(formatter, &item, |f, text| f.hanging(&prefix, text))) {
                receipt.segments(&segments);
            }
        } else if is_table_row(stripped) {
            receipt.plain(formatter.table_row(stripped.trim_end()));
        } else {
            // Links are rewritten before wrapping, so that a link split across lines still reads right
            let paragraph = rewrite_links(stripped);
            for segments in parse_wrapped(&wrap_inline(formatter, &paragraph, |f, text| f.wrap(text))) {
                receipt.segments(&segments);
            }
        }
    }
}

/// Wraps text that gets inline-parsed afterwards
///
/// A code span left open at the end of the text is closed with an extra backtick. When the last line has no room for it, the whole text is wrapped one column narrower.
fn wrap_inline<F>(formatter: &Formatter, text: &str, layout: F) -> Vec<String>
where F: Fn(&Formatter, &str) -> Vec<String> {
    let lines = layout(formatter, text);
    let width = formatter.width();
    let no_room = lines.last().is_some_and(|line| line.chars().count() >= width);
    if width > 1 && no_room && leaves_code_open(text) {
        layout(&Formatter::new(width - 1), text)
    } else {
        lines
    }
}

/// Starts and ends with a bar, with at least one more bar in between
fn is_table_row(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3
        && line.starts_with('|')
        && line.ends_with('|')
        && line[1..line.len() - 1].contains('|')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Instruction;
    use crate::preview::plain_text;
    use pretty_assertions::assert_eq;

    fn lines(text: &str, columns: usize) -> Vec<String> {
        let mut receipt = Receipt::default();
        render_markup(&mut receipt, &Formatter::new(columns), text);
        plain_text(&receipt.instructions).lines().map(String::from).collect()
    }

    #[test]
    fn table_detection() {
        assert!(is_table_row("| a | b |"));
        assert!(is_table_row("|a|b|  "));
        assert!(!is_table_row("|"));
        assert!(!is_table_row("||"));
        assert!(!is_table_row("| lonely |"));
    }

    #[test]
    fn headings() {
        assert_eq!(
            vec!["A very long", "", "Sub heading", "Third"],
            lines("# A very long title that is cut\n## Sub heading\n### Third", 11)
        );
        assert_eq!(vec!["Untitled", ""], lines("#  ", 20));
    }

    #[test]
    fn first_level_heading_is_double_size() {
        let mut receipt = Receipt::default();
        render_markup(&mut receipt, &Formatter::new(20), "# Hi");
        assert_eq!(Instruction::style(Style::double(Justification::Left)), receipt.instructions[0]);
        assert_eq!(Instruction::text("Hi\n"), receipt.instructions[1]);
    }

    #[test]
    fn lower_headings_are_bold_and_parsed() {
        let mut receipt = Receipt::default();
        render_markup(&mut receipt, &Formatter::new(20), "### a *b*");
        assert_eq!(
            vec![
                Instruction::style(Style::text(true, false)),
                Instruction::text("a "),
                Instruction::style(Style::text(true, true)),
                Instruction::text("b"),
                Instruction::style(Style::default()),
                Instruction::text("\n")
            ],
            receipt.instructions
        );
    }

    #[test]
    fn bullets_use_a_hanging_indent() {
        assert_eq!(
            vec!["• one two", "  three", "• four"],
            lines("- one two three\n* four", 10)
        );
    }

    #[test]
    fn numbers_are_preserved() {
        assert_eq!(
            vec!["3. go", "   home", "10. x"],
            lines("3. go home\n10. x", 7)
        );
    }

    #[test]
    fn quotes_and_rules() {
        assert_eq!(
            vec!["│ to be or", "  not", "----------"],
            lines("> to be or not\n***", 10)
        );
    }

    #[test]
    fn fenced_code_is_verbatim() {
        assert_eq!(
            vec!["", "  let x = **1**;           // no wrap", "", "b"],
            lines("```rust\nlet x = **1**;           // no wrap\n```\nb", 10)
        );
    }

    #[test]
    fn links_survive_wrapping() {
        assert_eq!(
            vec!["• read the", "  manual", "  (https://m.io)"],
            lines("- read [the manual](https://m.io)", 12)
        );
    }

    #[test]
    fn code_spans_cut_by_the_wrap_stay_in_width() {
        assert_eq!(vec!["`abcdefghi", "jk`"], lines("`abcdefghi jk`", 10));
        assert_eq!(vec!["• `run", "  make`"], lines("- `run make`", 7));
    }

    #[test]
    fn open_code_span_gets_room_to_close() {
        // At 10 columns "`ab cdefgh" would fill the line, leaving no room for the closing backtick
        assert_eq!(vec!["`ab", "cdefgh`"], lines("`ab cdefgh", 10));
        assert_eq!(vec!["`ab`"], lines("`ab", 10));
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(vec!["a", "", "b"], lines("a\n\n b", 10));
    }
}
