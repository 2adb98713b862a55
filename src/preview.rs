//! Console preview of a rendered receipt

use crate::Instruction;

/// Flattens a command stream into the text the receipt would show
///
/// Feeds become newlines. Styles, beeps, cuts and qr codes leave no trace.
///
/// ```rust
/// use quest_printer::{Document, preview, render};
///
/// let instructions = render::render(&Document::markup("- milk\n- eggs"), 20);
/// assert_eq!("• milk\n• eggs\n\n\n", preview::plain_text(&instructions));
/// ```
pub fn plain_text(instructions: &[Instruction]) -> String {
    let mut res = String::new();
    for instruction in instructions {
        match instruction {
            Instruction::Text{content} => res.push_str(content),
            Instruction::Feed{lines} => {
                for _ in 0..*lines {
                    res.push('\n');
                }
            },
            _ => ()
        }
    }
    res
}
