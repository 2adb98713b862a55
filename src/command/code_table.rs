extern crate serde;

use serde::{Serialize, Deserialize};

/// Character code tables, selected with `ESC t`
///
/// Text is always encoded as code page 437 before being sent, so [Pc437](CodeTable::Pc437) is the one selected on every fresh connection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum CodeTable {
    /// PC437, USA and standard Europe
    Pc437
}

impl CodeTable {
    /// Returns the byte representation of the esc/pos command
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            CodeTable::Pc437 => vec![0x00]
        }
    }
}
