//! Inline emphasis scanner
//!
//! A single left to right pass over a run of text. The scanner keeps three flags (bold, italic and inline code) and emits a [StyledSegment] every time one of them changes. Receipt printers have no italics, so italic text comes out underlined.
//!
//! | Markup | Effect |
//! |--------|--------|
//! | `**text**`, `__text__` | bold |
//! | `*text*`, `_text_` | underline |
//! | `` `code` `` | plain text, backticks kept |
//! | `\*` | literal character |
//! | `[text](url)` | `text (url)` |
//! | `![alt](url)` | `alt: url`, or `url` without alt text |

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Serialize, Deserialize};

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("Invalid regex")
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Invalid regex")
});

/// A run of text sharing one style, the unit a rendered line is made of
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub bold: bool,
    pub underline: bool
}

impl StyledSegment {
    pub fn new<A: Into<String>>(text: A, bold: bool, underline: bool) -> StyledSegment {
        StyledSegment {
            text: text.into(),
            bold,
            underline
        }
    }

    pub fn plain<A: Into<String>>(text: A) -> StyledSegment {
        StyledSegment::new(text, false, false)
    }

    pub fn bold<A: Into<String>>(text: A) -> StyledSegment {
        StyledSegment::new(text, true, false)
    }
}

/// Rewrites images and links into printable text
pub(super) fn rewrite_links(text: &str) -> String {
    let text = IMAGE.replace_all(text, |caps: &Captures| {
        let alt = caps[1].trim();
        let url = caps[2].trim();
        if alt.is_empty() {
            url.to_string()
        } else {
            format!("{}: {}", alt, url)
        }
    });
    LINK.replace_all(&text, |caps: &Captures| {
        format!("{} ({})", caps[1].trim(), caps[2].trim())
    }).into_owned()
}

/// Scanner state
#[derive(Default)]
struct Scanner {
    segments: Vec<StyledSegment>,
    buffer: String,
    bold: bool,
    italic: bool,
    code: bool
}

impl Scanner {
    /// Emits the buffered text with the current style
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        let segment = if self.code {
            StyledSegment::plain(text)
        } else {
            StyledSegment::new(text, self.bold, self.italic)
        };
        self.segments.push(segment);
    }

    fn backtick(&mut self) {
        self.flush();
        self.code = !self.code;
        self.segments.push(StyledSegment::plain("`"));
    }

    /// Scans a run of text, leaving the style flags as they are at its end
    fn scan(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek().is_some() => {
                    if let Some(escaped) = chars.next() {
                        self.buffer.push(escaped);
                    }
                },
                '`' => self.backtick(),
                _ if self.code => self.buffer.push(c),
                '*' | '_' if chars.peek() == Some(&c) => {
                    chars.next();
                    self.flush();
                    self.bold = !self.bold;
                },
                '*' | '_' => {
                    self.flush();
                    self.italic = !self.italic;
                },
                _ => self.buffer.push(c)
            }
        }
        self.flush();
    }

    /// Closes an open code span visually
    fn close_code(&mut self) {
        if self.code {
            self.segments.push(StyledSegment::plain("`"));
            self.code = false;
        }
    }
}

/// Splits a run of text into styled segments
///
/// Same-style neighbours are not merged, each toggle starts a new segment. An unterminated code span gets its closing backtick; unterminated emphasis simply lasts until the end of the text.
///
/// ```rust
/// use quest_printer::render::{parse_inline, StyledSegment};
///
/// assert_eq!(
///     vec![
///         StyledSegment::new("bold", true, false),
///         StyledSegment::new(" and ", false, false),
///         StyledSegment::new("em", false, true)
///     ],
///     parse_inline("**bold** and *em*")
/// );
/// ```
pub fn parse_inline(text: &str) -> Vec<StyledSegment> {
    let mut scanner = Scanner::default();
    scanner.scan(&rewrite_links(text));
    scanner.close_code();
    scanner.segments
}

/// Parses the wrapped lines of one block, one line at a time
///
/// Emphasis starts over on every line. A code span cut by the wrap carries on into the next line, and only gets closed at the end of the block, so that no line grows past the width it was wrapped to.
pub(super) fn parse_wrapped(lines: &[String]) -> Vec<Vec<StyledSegment>> {
    let mut in_code = false;
    let mut parsed = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let mut scanner = Scanner {
            code: in_code,
            ..Scanner::default()
        };
        scanner.scan(line);
        if index + 1 == lines.len() {
            scanner.close_code();
        }
        in_code = scanner.code;
        parsed.push(scanner.segments);
    }
    parsed
}

/// True when the text ends inside a code span, which then needs a closing backtick
pub(super) fn leaves_code_open(text: &str) -> bool {
    let mut scanner = Scanner::default();
    scanner.scan(text);
    scanner.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(vec![StyledSegment::plain("just words")], parse_inline("just words"));
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn underscores_work_like_asterisks() {
        assert_eq!(
            vec![
                StyledSegment::new("a", true, false),
                StyledSegment::plain(" "),
                StyledSegment::new("b", false, true)
            ],
            parse_inline("__a__ _b_")
        );
    }

    #[test]
    fn nested_bold_and_italic() {
        assert_eq!(
            vec![
                StyledSegment::new("x ", true, false),
                StyledSegment::new("y", true, true),
                StyledSegment::new(" z", true, false)
            ],
            parse_inline("**x *y* z**")
        );
    }

    #[test]
    fn code_spans_are_not_scanned() {
        assert_eq!(
            vec![
                StyledSegment::plain("run "),
                StyledSegment::plain("`"),
                StyledSegment::plain("make **all**"),
                StyledSegment::plain("`")
            ],
            parse_inline("run `make **all**`")
        );
    }

    #[test]
    fn unterminated_code_gets_closed() {
        assert_eq!(
            vec![
                StyledSegment::plain("`"),
                StyledSegment::plain("open"),
                StyledSegment::plain("`")
            ],
            parse_inline("`open")
        );
    }

    #[test]
    fn wrapped_code_spans_carry_over() {
        let lines = vec!["say `a".to_string(), "b` *c*".to_string()];
        assert_eq!(
            vec![
                vec![
                    StyledSegment::plain("say "),
                    StyledSegment::plain("`"),
                    StyledSegment::plain("a")
                ],
                vec![
                    StyledSegment::plain("b"),
                    StyledSegment::plain("`"),
                    StyledSegment::plain(" "),
                    StyledSegment::new("c", false, true)
                ]
            ],
            parse_wrapped(&lines)
        );
        // Still open at the end of the block
        assert_eq!(StyledSegment::plain("`"), parse_wrapped(&["`x".to_string()])[0][2]);
        assert!(leaves_code_open("a `b"));
        assert!(!leaves_code_open("a \\`b"));
    }

    #[test]
    fn escapes_are_literal() {
        assert_eq!(vec![StyledSegment::plain("2*3*4 \\")], parse_inline("2\\*3\\*4 \\"));
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            vec![StyledSegment::plain("see docs (https://d.io) or logo: https://i.io/l.png")],
            parse_inline("see [docs](https://d.io) or ![logo](https://i.io/l.png)")
        );
        assert_eq!(vec![StyledSegment::plain("https://i.io")], parse_inline("![](https://i.io)"));
    }

    #[test]
    fn consecutive_toggles_are_not_merged() {
        let segments = parse_inline("a**b**c");
        assert_eq!(3, segments.len());
        assert_eq!(StyledSegment::new("b", true, false), segments[1]);
    }
}
