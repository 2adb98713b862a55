pub use self::instruction::{Instruction, Style, encode_text};
pub use self::document::{Document, Quest, Step};
pub use self::justification::{Justification};
pub use self::qr_image::qr_feed;

mod instruction;
mod document;
mod justification;
mod qr_image;
