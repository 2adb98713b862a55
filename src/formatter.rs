/// Helper structure to lay text out in a fixed number of columns
///
/// The Formatter never breaks a word nor inserts hyphens: lines are filled greedily with whole words, and a word longer than the width sits alone in its own line. Widths are counted in characters, not bytes.
#[derive(Clone, Debug)]
pub struct Formatter {
    /// Width to use for formatting
    width: usize
}

impl Formatter {
    /// Creates a new formatter for the given number of columns
    pub fn new(width: usize) -> Formatter {
        Formatter {
            width: width.max(1)
        }
    }

    /// Width used by this formatter
    pub fn width(&self) -> usize {
        self.width
    }

    /// Splits a string by whitespaces, according to the given width
    ///
    /// Runs of whitespace collapse into a single space. An empty or blank string gives no lines at all.
    ///
    /// ```rust
    /// use quest_printer::Formatter;
    ///
    /// let formatter = Formatter::new(16);
    /// let res = formatter.wrap("Sentence with   two lines.");
    /// assert_eq!(vec!["Sentence with", "two lines."], res);
    /// ```
    pub fn wrap<A: AsRef<str>>(&self, source: A) -> Vec<String> {
        self.wrap_indented(source, "", "")
    }

    /// Wraps with a prefix on the first line, and a hanging indent of the same length on the rest
    ///
    /// ```rust
    /// use quest_printer::Formatter;
    ///
    /// let formatter = Formatter::new(13);
    /// let res = formatter.hanging("12. ", "Water all the plants");
    /// assert_eq!(vec!["12. Water all", "    the", "    plants"], res);
    /// ```
    pub fn hanging<A: AsRef<str>, B: AsRef<str>>(&self, prefix: A, source: B) -> Vec<String> {
        let prefix = prefix.as_ref();
        let indent = " ".repeat(prefix.chars().count());
        self.wrap_indented(source, prefix, &indent)
    }

    /// Wraps with explicit indents for the first and the following lines
    ///
    /// Indents count towards the width.
    pub fn wrap_indented<A: AsRef<str>>(&self, source: A, initial_indent: &str, subsequent_indent: &str) -> Vec<String> {
        let mut broken_lines = Vec::new();
        let mut current_line = String::new();
        let mut current_width = 0;
        // Words already placed in the current line
        let mut words_in_line = 0;

        for word in source.as_ref().split_whitespace() {
            let num_chars = word.chars().count();
            if words_in_line > 0 && current_width + 1 + num_chars > self.width {
                broken_lines.push(std::mem::take(&mut current_line));
                words_in_line = 0;
            }
            if words_in_line == 0 {
                // First word of the line, it goes in even if it does not fit
                let indent = if broken_lines.is_empty() { initial_indent } else { subsequent_indent };
                current_line.push_str(indent);
                current_line.push_str(word);
                current_width = indent.chars().count() + num_chars;
            } else {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += 1 + num_chars;
            }
            words_in_line += 1;
        }
        if words_in_line > 0 {
            broken_lines.push(current_line);
        }
        broken_lines
    }

    /// Keeps at most `width` characters of the string
    pub fn truncate<A: AsRef<str>>(&self, source: A) -> String {
        source.as_ref().chars().take(self.width).collect()
    }

    /// A full-width horizontal rule
    pub fn rule(&self) -> String {
        "-".repeat(self.width)
    }

    /// Formats a markup table row into equally sized, left-justified cells
    ///
    /// Leading and trailing bars are dropped before splitting, cells get trimmed. Each cell is at least 3 characters wide; if that does not fit, the row is cut at the width.
    ///
    /// ```rust
    /// use quest_printer::Formatter;
    ///
    /// let formatter = Formatter::new(20);
    /// assert_eq!("|a       |bb      |", formatter.table_row("| a | bb |"));
    /// ```
    pub fn table_row<A: AsRef<str>>(&self, source: A) -> String {
        let cells: Vec<&str> = source.as_ref()
            .trim_matches('|')
            .split('|')
            .map(str::trim)
            .collect();
        let separators = cells.len() + 1;
        let cell_width = (self.width.saturating_sub(separators) / cells.len().max(1)).max(3);

        let mut row = String::from("|");
        for cell in cells {
            let cell: String = cell.chars().take(cell_width).collect();
            row += &format!("{:<1$}|", cell, cell_width);
        }
        self.truncate(row)
    }
}
