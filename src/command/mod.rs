pub use self::font::Font;
pub use self::command::Command;
pub use self::code_table::CodeTable;

mod code_table;
mod command;
mod font;
