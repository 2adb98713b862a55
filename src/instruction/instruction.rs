extern crate serde;
extern crate codepage_437;

use codepage_437::CP437_CONTROL;
use crate::command::Command;
use serde::{Serialize, Deserialize};
use super::Justification;

/// Text style applied by the printer to everything written after it
///
/// Maps to a bold, underline, character size and justification command sequence. The default style is the one the printer starts with: regular weight, no underline, single size, left aligned.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Style {
    pub bold: bool,
    pub underline: bool,
    /// Horizontal magnification, from 1 to 8
    pub width: u8,
    /// Vertical magnification, from 1 to 8
    pub height: u8,
    pub justification: Justification
}

impl Default for Style {
    fn default() -> Style {
        Style {
            bold: false,
            underline: false,
            width: 1,
            height: 1,
            justification: Justification::Left
        }
    }
}

impl Style {
    /// Plain text with a given weight and underline
    pub fn text(bold: bool, underline: bool) -> Style {
        Style {
            bold,
            underline,
            ..Style::default()
        }
    }

    /// Bold text with both scales doubled
    pub fn double(justification: Justification) -> Style {
        Style {
            bold: true,
            width: 2,
            height: 2,
            justification,
            ..Style::default()
        }
    }

    pub fn with_justification(mut self, justification: Justification) -> Style {
        self.justification = justification;
        self
    }

    /// Command sequence that sets every attribute of the style
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut res = Vec::new();
        res.append(&mut Command::Justify{justification: self.justification}.as_bytes());
        res.append(&mut if self.bold { Command::BoldOn } else { Command::BoldOff }.as_bytes());
        res.append(&mut if self.underline { Command::Underline1Dot } else { Command::UnderlineOff }.as_bytes());
        res.append(&mut Command::CharacterSize{width: self.width, height: self.height}.as_bytes());
        res
    }
}

/// One element of the command stream produced by the renderer
///
/// A rendered document is a plain `Vec<Instruction>`. Instructions are serializable, so a rendered receipt can be stored or shipped elsewhere and streamed to a printer later with [Printer::instructions](crate::Printer::instructions).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind")]
pub enum Instruction {
    /// Changes the style for the following text
    Style {
        style: Style
    },
    /// Raw text, newlines included
    Text {
        content: String
    },
    /// Jumps a number of lines
    Feed {
        lines: u8
    },
    /// Audible alert. Best effort, not every printer has a buzzer
    Beep {
        times: u8,
        duration: u8
    },
    /// Prints a QR code. Best effort
    QrCode {
        content: String
    },
    /// Cuts the paper in place. Best effort
    Cut
}

impl Instruction {
    pub fn style(style: Style) -> Instruction {
        Instruction::Style{style}
    }

    pub fn text<A: Into<String>>(content: A) -> Instruction {
        Instruction::Text{content: content.into()}
    }

    /// Returns true for instructions whose failure must not abort a print
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Instruction::Beep{..} | Instruction::QrCode{..} | Instruction::Cut)
    }
}

/// Encodes text into code page 437, the table selected on every connection.
///
/// Characters without a glyph get a close ascii substitute, or `?` as a last resort, so that generated text never aborts a print.
pub fn encode_text(content: &str) -> Vec<u8> {
    let mut res = Vec::with_capacity(content.len());
    for c in content.chars() {
        if let Some(byte) = CP437_CONTROL.encode(c) {
            res.push(byte);
            continue;
        }
        match c {
            // Glyphs that only exist in the control range of the table
            '•' => res.push(0xf9),
            '→' => res.push(b'>'),
            '—' | '–' | '‒' | '−' => res.push(b'-'),
            '‘' | '’' | '‚' => res.push(b'\''),
            '“' | '”' | '„' => res.push(b'"'),
            '…' => res.extend_from_slice(b"..."),
            _ => res.push(b'?')
        }
    }
    res
}
