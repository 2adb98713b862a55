extern crate serde;

use super::{CodeTable, Font};
use crate::instruction::Justification;
use serde::{Serialize, Deserialize};

/// Raw esc/pos commands understood by the supported printers
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Command {
    /// Feeds 0x96 vertical spaces and performs a partial cut. Equivalent to GS V A
    Cut,
    /// Clears the print buffer and restores the power-on settings. Equivalent to ESC @
    Reset,
    /// Selects a different code table, Equivalent to ESC t
    SelectCodeTable {
        code_table: CodeTable
    },
    /// Sets up a font. Equivalent to ESC M
    SelectFont {
        font: Font
    },
    UnderlineOff,
    Underline1Dot,
    /// Equivalent to ESC E 1
    BoldOn,
    BoldOff,
    /// Equivalent to ESC a
    Justify {
        justification: Justification
    },
    /// Character magnification, both scales go from 1 to 8. Equivalent to GS !
    CharacterSize {
        width: u8,
        height: u8
    },
    /// Prints the buffer and feeds `lines` lines. Equivalent to ESC d
    Feed {
        lines: u8
    },
    /// Sounds the buzzer `times` times, `duration` in units of 100ms. Equivalent to ESC B
    Beep {
        times: u8,
        duration: u8
    },
    /// Header of a raster bit image, equivalent to GS v 0 with normal density.
    ///
    /// The header must be followed by `width_bytes * height` bytes of image data.
    RasterImage {
        width_bytes: u16,
        height: u16
    }
}

impl Command {
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Command::Cut => vec![0x1d, 0x56, 0x41, 0x96],
            Command::Reset => vec![0x1b, 0x40],
            Command::SelectCodeTable{code_table} => {
                let mut res = vec![0x1b, 0x74];
                res.append(&mut code_table.as_bytes());
                res
            },
            Command::SelectFont{font} => {
                let mut res = vec![0x1b, 0x4d];
                res.append(&mut font.as_bytes());
                res
            },
            Command::UnderlineOff => vec![0x1b, 0x2d, 0x00],
            Command::Underline1Dot => vec![0x1b, 0x2d, 0x01],
            Command::BoldOn => vec![0x1b, 0x45, 0x01],
            Command::BoldOff => vec![0x1b, 0x45, 0x00],
            Command::Justify{justification} => vec![0x1b, 0x61, justification.as_byte()],
            Command::CharacterSize{width, height} => {
                // Magnification is stored as (scale - 1), width on the high nibble
                let w = (*width).clamp(1, 8) - 1;
                let h = (*height).clamp(1, 8) - 1;
                vec![0x1d, 0x21, (w << 4) | h]
            },
            Command::Feed{lines} => vec![0x1b, 0x64, *lines],
            Command::Beep{times, duration} => vec![0x1b, 0x42, *times, *duration],
            Command::RasterImage{width_bytes, height} => {
                let [xl, xh] = width_bytes.to_le_bytes();
                let [yl, yh] = height.to_le_bytes();
                vec![0x1d, 0x76, 0x30, 0x00, xl, xh, yl, yh]
            }
        }
    }
}
