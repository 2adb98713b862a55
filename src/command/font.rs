extern crate serde;

use serde::{Serialize, Deserialize};

/// Character fonts of a receipt printer
///
/// Font A is the regular 12x24 dot font every printer ships with, Font B the condensed 9x17 one. Column widths are tracked per font in the [PrinterProfile](crate::PrinterProfile).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Font {
    FontA,
    FontB
}

impl Font {
    /// Argument for the `ESC M` command
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Font::FontA => vec![0x00],
            Font::FontB => vec![0x01]
        }
    }
}
