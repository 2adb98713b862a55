//! Library for printing quests and markup receipts on esc/pos thermal printers
//!
//! A [Document] is either a [Quest] (a task broken down into tiny steps) or markdown-like text. Documents are rendered into a plain command stream (a `Vec<Instruction>`) for a given number of columns, and streamed to a [Printer].
//!
//! ```rust
//! use quest_printer::{Document, Quest, Step, preview, render};
//!
//! let quest = Quest::new("Clean the desk")
//!     .with_steps(vec![Step::new("Throw away the empty cups"), Step::new("Stack the papers")]);
//! // 32 columns, the usual for 58mm paper
//! let instructions = render::render(&Document::quest(quest), 32);
//! let text = preview::plain_text(&instructions);
//! assert!(text.contains("1. Throw away the empty cups"));
//! ```
//!
//! Rendering never touches a device, which keeps it easy to test and to preview on a terminal.
//!
//! ## Printer Details
//!
//! A printer is reached through a [PrinterTarget]: either a destination registered in the print spooler, or a vendor and product id on the usb bus. Both vendor and product id should be found in the maker's website, or sometimes they get printed in test prints (which usually occur if you hold the feed button on the printer). If you are running linux, then one way to get these values is by executing the `lsusb` command. The [discovery] module can also find them for you.
//!
//! ```rust,no_run
//! use quest_printer::{Printer, PrinterTarget, Document};
//!
//! let mut printer = Printer::open(&PrinterTarget::bus(0x0416, 0x5011))?;
//! printer.print_document(&Document::markup("Hello, **world**!"), &Default::default())?;
//! printer.close();
//! # Ok::<(), quest_printer::Error>(())
//! ```
//!
//! Usb printers are notoriously picky to open (kernel drivers holding the device, unusual endpoint numbers), so bus targets go through the [Negotiator](crate::printer::Negotiator), which tries several configurations before giving up. The paper details (columns and dots) come from the [PrinterProfile] of a known [PrinterModel], or from the defaults.
//!
//! ### Print queue
//!
//! Long running services should not print in the request path. The [PrintQueue](crate::queue::PrintQueue) takes [PrintJob]s without blocking, and prints them one at a time on a supervised worker.
//!
//! All the document and target structures implement both Serialize, and Deserialize from [serde](https://docs.rs/serde), so jobs can be stored or sent elsewhere before printing.

pub use printer::{Printer, PrinterProfile, PrinterProfileBuilder, PrinterModel, PrinterTarget, Transport};
pub use instruction::{Instruction, Style, Justification, Document, Quest, Step};
pub use render::{Renderer, RenderOptions, StepStyle, StyledSegment};
pub use queue::{PrintJob, PrintQueue};
pub use formatter::Formatter;
pub use error::{Error, Result};

/// Contains raw esc/pos commands
pub mod command;
/// Connections to printers, and the usb negotiation ladder
pub mod printer;
pub mod render;
pub mod preview;
pub mod discovery;
pub mod queue;

mod instruction;
mod formatter;
mod error;
