//! Document to command stream rendering
//!
//! Rendering is a pure function of the document, the options and the column count of the printer: no device is involved, the result is a `Vec<Instruction>` ready to be streamed with [Printer::instructions](crate::Printer::instructions) or flattened with [preview::plain_text](crate::preview::plain_text).
//!
//! ```rust
//! use quest_printer::{Document, Instruction, render};
//!
//! let instructions = render::render(&Document::markup("Hello **there**"), 32);
//! // Every receipt ends with a cut
//! assert_eq!(Some(&Instruction::Cut), instructions.last());
//! ```

pub use self::inline::{parse_inline, StyledSegment};

mod inline;
mod markup;
mod quest;

use serde::{Serialize, Deserialize};
use rand::seq::IndexedRandom;
use crate::{
    Document, Formatter, Instruction, Style
};

/// Encouragement printed at the bottom of every quest
pub const CLOSING_LINES: &[&str] = &[
    "Start tiny. Momentum does the rest.",
    "One small step is still a step.",
    "Progress over perfection.",
    "You're already closer than before.",
    "Tiny actions. Big wins.",
    "Breathe. Start with the smallest thing.",
    "Done is better than perfect.",
    "You got this. Begin now.",
    "Tap the smallest domino."
];

/// How quest steps are prefixed
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStyle {
    /// `1. `, `2. `, ...
    #[default]
    Numbered,
    /// `[ ] ` in front of every step
    Checkbox
}

/// Layout switches for quest documents. Markup documents ignore them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RenderOptions {
    pub step_style: StepStyle,
    /// Prints the "Start now" block when there is something to put in it
    pub include_activation: bool,
    /// Concrete cue for the activation block
    pub cue_text: Option<String>,
    /// Suggested timer for the activation block. Not enforced in any way
    pub timer_minutes: Option<u32>,
    /// Printed as a qr code under the closing line
    pub qr_link: Option<String>,
    pub show_time_estimates: bool
}

impl Default for RenderOptions {
    fn default() -> RenderOptions {
        RenderOptions {
            step_style: StepStyle::Numbered,
            include_activation: true,
            cue_text: None,
            timer_minutes: None,
            qr_link: None,
            show_time_estimates: false
        }
    }
}

/// Chooses the closing line out of [CLOSING_LINES]
pub type ClosingPicker = Box<dyn Fn(&'static [&'static str]) -> &'static str + Send + Sync>;

fn random_closing_line(pool: &'static [&'static str]) -> &'static str {
    pool.choose(&mut rand::rng()).copied().unwrap_or_default()
}

/// Renders documents for a printer of a given width
pub struct Renderer {
    formatter: Formatter,
    options: RenderOptions,
    closing_picker: ClosingPicker
}

impl Renderer {
    /// Renderer with default options and a random closing line
    pub fn new(columns: usize) -> Renderer {
        Renderer {
            formatter: Formatter::new(columns),
            options: RenderOptions::default(),
            closing_picker: Box::new(random_closing_line)
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Renderer {
        self.options = options;
        self
    }

    /// Replaces the random choice of the closing line
    ///
    /// ```rust
    /// use quest_printer::{Document, Quest, preview};
    /// use quest_printer::render::Renderer;
    ///
    /// let renderer = Renderer::new(42).with_closing_picker(|pool| pool[0]);
    /// let text = preview::plain_text(&renderer.render(&Document::quest(Quest::new("Tea"))));
    /// assert!(text.contains("Start tiny. Momentum does the rest."));
    /// ```
    pub fn with_closing_picker<F>(mut self, picker: F) -> Renderer
    where F: Fn(&'static [&'static str]) -> &'static str + Send + Sync + 'static {
        self.closing_picker = Box::new(picker);
        self
    }

    pub fn columns(&self) -> usize {
        self.formatter.width()
    }

    pub fn render(&self, document: &Document) -> Vec<Instruction> {
        let mut receipt = Receipt::default();
        match document {
            Document::Quest{quest} => quest::render_quest(
                &mut receipt,
                &self.formatter,
                &self.options,
                quest,
                (self.closing_picker)(CLOSING_LINES)
            ),
            Document::Markup{text} => markup::render_markup(&mut receipt, &self.formatter, text)
        }
        receipt.footer();
        receipt.instructions
    }
}

/// Renders a document with default options
pub fn render(document: &Document, columns: usize) -> Vec<Instruction> {
    Renderer::new(columns).render(document)
}

/// Command stream under construction
#[derive(Default)]
pub(crate) struct Receipt {
    instructions: Vec<Instruction>
}

impl Receipt {
    fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// One line of segments, each with its own style command, closed by a style reset
    fn segments(&mut self, segments: &[StyledSegment]) {
        for segment in segments {
            self.push(Instruction::style(Style::text(segment.bold, segment.underline)));
            if !segment.text.is_empty() {
                self.push(Instruction::text(segment.text.as_str()));
            }
        }
        self.push(Instruction::style(Style::default()));
        self.push(Instruction::text("\n"));
    }

    fn plain<A: Into<String>>(&mut self, text: A) {
        self.segments(&[StyledSegment::plain(text)]);
    }

    /// A single line in a given style, then back to the default
    fn styled<A: Into<String>>(&mut self, style: Style, text: A) {
        let mut content: String = text.into();
        content.push('\n');
        self.push(Instruction::style(style));
        self.push(Instruction::text(content));
        self.push(Instruction::style(Style::default()));
    }

    fn blank(&mut self) {
        self.push(Instruction::text("\n"));
    }

    /// Padding, the audible alert and the cut that close every receipt
    fn footer(&mut self) {
        self.blank();
        self.push(Instruction::Beep{times: 1, duration: 2});
        self.blank();
        self.push(Instruction::Cut);
    }
}
