pub use self::printer_profile::{PrinterProfile, PrinterProfileBuilder, DEFAULT_COLUMNS};
pub use self::printer_model::PrinterModel;
pub use self::printer_target::PrinterTarget;
pub use self::negotiator::{Negotiator, UsbBackend, OpenAttempt, InterfaceEndpoints, remediation_hint};
pub use self::usb_printer::{RusbBackend, UsbConnection};
pub use self::spooler::{SpoolerConnection, list_destinations};

mod printer_profile;
mod printer_model;
mod printer_target;
mod negotiator;
mod usb_printer;
mod spooler;

use crate::{
    Document,
    Instruction,
    Style,
    Error,
    Result,
    command::{Command, CodeTable, Font},
    instruction::{encode_text, qr_feed},
    render::{Renderer, RenderOptions}
};

use log::{debug, info, warn};

/// Byte sink behind a [Printer](crate::Printer)
///
/// Implemented by the usb and spooler connections. Anything else that takes bytes (a file, a test buffer) can implement it as well.
pub trait Transport: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Releases the underlying device. Called once, on every exit path
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Main quest-printer structure
///
/// The printer represents an open, validated connection to a thermal printer. It is owned by whoever opened it, and closed either explicitly with [close](Printer::close) or when dropped.
///
/// ```rust,no_run
/// use quest_printer::{Printer, PrinterTarget, Document};
///
/// let mut printer = Printer::open(&PrinterTarget::bus(0x04b8, 0x0e15))?;
/// printer.print_document(&Document::markup("# Hello\n\nFrom **rust**"), &Default::default())?;
/// printer.close();
/// # Ok::<(), quest_printer::Error>(())
/// ```
pub struct Printer {
    transport: Box<dyn Transport>,
    profile: PrinterProfile,
    closed: bool
}

impl Printer {
    /// Wraps a transport, and sends the initialization sequence
    ///
    /// The printer gets reset, and code page 437 is selected so that [print](Printer::print) can encode text.
    pub fn new<T: Transport + 'static>(transport: T, profile: PrinterProfile) -> Result<Printer> {
        let mut printer = Printer {
            transport: Box::new(transport),
            profile,
            closed: false
        };
        let mut feed = Command::Reset.as_bytes();
        feed.append(&mut Command::SelectCodeTable{code_table: CodeTable::Pc437}.as_bytes());
        feed.append(&mut Command::SelectFont{font: Font::FontA}.as_bytes());
        printer.raw(&feed)?;
        Ok(printer)
    }

    /// Resolves a target into a live printer
    ///
    /// Spooler targets are opened directly. Bus targets go through the [Negotiator](crate::printer::Negotiator), and adopt the profile of a known [PrinterModel](crate::PrinterModel) when the ids match.
    pub fn open(target: &PrinterTarget) -> Result<Printer> {
        match target {
            PrinterTarget::Spooler{name} => {
                let connection = SpoolerConnection::open(name)?;
                info!("Opened {}", target);
                Printer::new(connection, PrinterProfile::default())
            },
            PrinterTarget::Bus{vendor_id, product_id} => {
                let profile = PrinterModel::profile_for(*vendor_id, *product_id);
                let connection = Negotiator::new(RusbBackend::new()?)
                    .with_timeout(profile.timeout())
                    .connect(*vendor_id, *product_id)?;
                Printer::new(connection, profile)
            }
        }
    }

    pub fn profile(&self) -> &PrinterProfile {
        &self.profile
    }

    /// Character width used to render documents for this printer
    pub fn columns(&self) -> usize {
        self.profile.columns()
    }

    /// Sends raw information to the printer
    ///
    /// As simple as it sounds
    pub fn raw<A: AsRef<[u8]>>(&mut self, bytes: A) -> Result<()> {
        if self.closed {
            return Err(Error::WriteFailure("connection already closed".to_string()));
        }
        self.transport.write(bytes.as_ref())
    }

    /// Print some text, encoded in code page 437. No newline is added.
    pub fn print<A: AsRef<str>>(&mut self, content: A) -> Result<()> {
        self.raw(encode_text(content.as_ref()))
    }

    pub fn set_style(&mut self, style: &Style) -> Result<()> {
        self.raw(style.as_bytes())
    }

    /// Prints the buffer and jumps `lines` lines
    pub fn feed(&mut self, lines: u8) -> Result<()> {
        self.raw(Command::Feed{lines}.as_bytes())
    }

    /// Cuts the paper, in case the instruction is supported by the printer
    ///
    /// Failures are logged and swallowed.
    pub fn cut(&mut self) {
        if let Err(e) = self.raw(Command::Cut.as_bytes()) {
            warn!("Cut failed, ignoring: {}", e);
        }
    }

    /// Sounds the buzzer, if there is one. Failures are logged and swallowed.
    pub fn beep(&mut self, times: u8, duration: u8) {
        if let Err(e) = self.raw(Command::Beep{times, duration}.as_bytes()) {
            warn!("Beep failed, ignoring: {}", e);
        }
    }

    /// Prints `content` as a qr code sized to the profile's width. Failures are logged and swallowed.
    pub fn try_qr<A: AsRef<str>>(&mut self, content: A) {
        let res = qr_feed(content.as_ref(), self.profile.width())
            .and_then(|feed| self.raw(feed));
        if let Err(e) = res {
            warn!("Qr code failed, ignoring: {}", e);
        }
    }

    /// Print an instruction
    ///
    /// Failures of [best effort](crate::Instruction::is_best_effort) instructions are logged and swallowed.
    pub fn instruction(&mut self, instruction: &Instruction) -> Result<()> {
        let res = match instruction {
            Instruction::Style{style} => self.set_style(style),
            Instruction::Text{content} => self.print(content),
            Instruction::Feed{lines} => self.feed(*lines),
            Instruction::Beep{times, duration} => self.raw(Command::Beep{times: *times, duration: *duration}.as_bytes()),
            Instruction::QrCode{content} => {
                let width = self.profile.width();
                qr_feed(content, width).and_then(|feed| self.raw(feed))
            },
            Instruction::Cut => self.raw(Command::Cut.as_bytes())
        };
        match res {
            Err(e) if instruction.is_best_effort() => {
                warn!("{:?} failed, ignoring: {}", instruction, e);
                Ok(())
            },
            res => res
        }
    }

    /// Streams a command stream, stopping at the first failed write
    ///
    /// The remainder of the stream is abandoned, and the error is reported as [WriteFailure](crate::Error::WriteFailure).
    pub fn instructions(&mut self, instructions: &[Instruction]) -> Result<()> {
        for (index, instruction) in instructions.iter().enumerate() {
            if let Err(e) = self.instruction(instruction) {
                return Err(match e {
                    Error::WriteFailure(_) => e,
                    other => Error::WriteFailure(format!(
                        "instruction {} of {}: {}", index + 1, instructions.len(), other
                    ))
                });
            }
        }
        Ok(())
    }

    /// Renders a document with this printer's width, and prints it
    pub fn print_document(&mut self, document: &Document, options: &RenderOptions) -> Result<()> {
        let instructions = Renderer::new(self.columns())
            .with_options(options.clone())
            .render(document);
        debug!("Streaming {} instructions", instructions.len());
        self.instructions(&instructions)
    }

    /// Releases the connection. Failures are logged and swallowed.
    pub fn close(mut self) {
        if let Err(e) = self.release() {
            warn!("Could not close the printer connection: {}", e);
        }
    }

    /// Releases the connection, reporting a failed close
    ///
    /// Spooler connections only submit the job when closed, so this is where their print failures show up.
    pub fn finish(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.transport.close()
    }
}

impl Drop for Printer {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Could not close the printer connection: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Transport that records everything, and fails the writes whose index is listed
    #[derive(Clone, Default)]
    pub(crate) struct RecordingTransport {
        pub writes: Arc<Mutex<Vec<Vec<u8>>>>,
        pub closes: Arc<Mutex<usize>>,
        pub failing: Vec<usize>,
        /// Close fails the way a rejected spooler submission does
        pub failing_close: bool,
        calls: Arc<Mutex<usize>>
    }

    impl RecordingTransport {
        pub fn failing(failing: Vec<usize>) -> RecordingTransport {
            RecordingTransport {
                failing,
                ..RecordingTransport::default()
            }
        }

        pub fn rejecting_close() -> RecordingTransport {
            RecordingTransport {
                failing_close: true,
                ..RecordingTransport::default()
            }
        }

        pub fn bytes(&self) -> Vec<u8> {
            self.writes.lock().unwrap().concat()
        }
    }

    impl Transport for RecordingTransport {
        fn write(&mut self, bytes: &[u8]) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            let call = *calls;
            *calls += 1;
            if self.failing.contains(&call) {
                return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged")));
            }
            self.writes.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            *self.closes.lock().unwrap() += 1;
            if self.failing_close {
                return Err(Error::WriteFailure("lp exited with 1: no such destination".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn opening_sends_the_initialization() {
        let transport = RecordingTransport::default();
        let _printer = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        assert_eq!(vec![0x1b, 0x40, 0x1b, 0x74, 0x00, 0x1b, 0x4d, 0x00], transport.bytes());
    }

    #[test]
    fn best_effort_failures_are_swallowed() {
        // Write 0 is the initialization, 1 the beep, 2 the cut
        let transport = RecordingTransport::failing(vec![1, 2]);
        let mut printer = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        let instructions = vec![
            Instruction::Beep{times: 1, duration: 2},
            Instruction::Cut,
            Instruction::text("ok")
        ];
        assert!(printer.instructions(&instructions).is_ok());
        assert_eq!(b"ok".to_vec(), transport.writes.lock().unwrap()[1]);
    }

    #[test]
    fn write_failures_abandon_the_stream() {
        let transport = RecordingTransport::failing(vec![2]);
        let mut printer = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        let instructions = vec![
            Instruction::text("a"),
            Instruction::text("b"),
            Instruction::text("c")
        ];
        match printer.instructions(&instructions) {
            Err(Error::WriteFailure(message)) => assert!(message.starts_with("instruction 2 of 3")),
            other => panic!("Unexpected result {:?}", other)
        }
        // Only the initialization and "a" made it
        assert_eq!(2, transport.writes.lock().unwrap().len());
    }

    #[test]
    fn closes_exactly_once() {
        let transport = RecordingTransport::default();
        let printer = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        printer.close();
        assert_eq!(1, *transport.closes.lock().unwrap());

        {
            let _dropped = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        }
        assert_eq!(2, *transport.closes.lock().unwrap());
    }

    #[test]
    fn finish_reports_a_failed_close() {
        let transport = RecordingTransport::rejecting_close();
        let printer = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        assert!(matches!(printer.finish(), Err(Error::WriteFailure(_))));
        // Not closed a second time on drop
        assert_eq!(1, *transport.closes.lock().unwrap());

        let printer = Printer::new(RecordingTransport::default(), PrinterProfile::default()).unwrap();
        assert!(printer.finish().is_ok());
    }

    #[test]
    fn qr_codes_are_raster_images() {
        let transport = RecordingTransport::default();
        let mut printer = Printer::new(transport.clone(), PrinterProfile::default()).unwrap();
        printer.try_qr("https://example.com");
        let writes = transport.writes.lock().unwrap();
        assert_eq!(&[0x1d, 0x76, 0x30, 0x00], &writes[1][3..7]);
    }

    #[test]
    fn documents_are_rendered_with_the_profile_width() {
        let transport = RecordingTransport::default();
        let profile = PrinterProfile::builder().with_font_width(Font::FontA, 10).build();
        let mut printer = Printer::new(transport.clone(), profile).unwrap();
        printer.print_document(&Document::markup("---"), &RenderOptions::default()).unwrap();
        let bytes = transport.bytes();
        assert!(bytes.windows(10).any(|window| window == b"----------"));
        assert!(!bytes.windows(11).any(|window| window == b"-----------"));
    }
}
