extern crate serde;

use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right
}

impl Justification {
    /// Argument for the `ESC a` command
    pub fn as_byte(&self) -> u8 {
        match self {
            Justification::Left => 0x00,
            Justification::Center => 0x01,
            Justification::Right => 0x02
        }
    }
}
