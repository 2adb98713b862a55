use std::collections::HashMap;
use std::time::Duration;
use crate::command::Font;

/// Columns used when the profile knows nothing about the default font
pub const DEFAULT_COLUMNS: u8 = 42;

/// Details required to lay out and stream a receipt
///
/// A profile says nothing about how to reach the printer, that is the job of the [PrinterTarget](crate::PrinterTarget). It only describes the paper: how many characters fit per font, how many dots fit for raster images, and how long a bulk write may take.
#[derive(Clone, Debug, PartialEq)]
pub struct PrinterProfile {
    /// Paper width, in characters, for each font
    pub (crate) columns_per_font: HashMap<Font, u8>,
    /// Total printer width in dots, for qr codes
    pub (crate) width: u16,
    /// Bounds every write, validation writes included
    pub (crate) timeout: Duration
}

impl Default for PrinterProfile {
    fn default() -> PrinterProfile {
        PrinterProfile::builder().build()
    }
}

impl PrinterProfile {
    /// Creates a [PrinterProfileBuilder](crate::PrinterProfileBuilder)
    ///
    /// ```rust
    /// use quest_printer::PrinterProfile;
    ///
    /// let printer_profile = PrinterProfile::builder().build();
    /// assert_eq!(42, printer_profile.columns());
    /// assert_eq!(384, printer_profile.width());
    /// ```
    pub fn builder() -> PrinterProfileBuilder {
        PrinterProfileBuilder::new()
    }

    /// Characters per line with the default font
    pub fn columns(&self) -> usize {
        self.columns_for(Font::FontA) as usize
    }

    /// Characters per line for a given font, falling back to [DEFAULT_COLUMNS]
    pub fn columns_for(&self, font: Font) -> u8 {
        self.columns_per_font.get(&font).copied().unwrap_or(DEFAULT_COLUMNS)
    }

    /// Printable width, in dots
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Helper structure to create a [PrinterProfile](crate::PrinterProfile)
///
/// Builder pattern for the [PrinterProfile](crate::PrinterProfile) structure.
pub struct PrinterProfileBuilder {
    /// Columns that each font spans at maximum
    columns_per_font: HashMap<Font, u8>,
    /// Width, in dots, of the printer
    width: u16,
    timeout: Duration
}

impl Default for PrinterProfileBuilder {
    fn default() -> PrinterProfileBuilder {
        PrinterProfileBuilder::new()
    }
}

impl PrinterProfileBuilder {
    /// Creates a new builder
    ///
    /// No font widths are loaded, so [columns](PrinterProfile::columns) answers [DEFAULT_COLUMNS] until [with_font_width](PrinterProfileBuilder::with_font_width) is called. Width defaults to 384 dots, the usual for 58mm printers, and the timeout to 2 seconds.
    pub fn new() -> PrinterProfileBuilder {
        PrinterProfileBuilder {
            columns_per_font: HashMap::new(),
            width: 384,
            timeout: Duration::from_secs(2)
        }
    }

    /// Adds a specific pixel width for the printer (required for printing qr codes)
    ///
    /// ```rust
    /// use quest_printer::PrinterProfileBuilder;
    /// let printer_profile = PrinterProfileBuilder::new()
    ///     .with_width(576)
    ///     .build();
    /// assert_eq!(576, printer_profile.width());
    /// ```
    pub fn with_width(mut self, width: u16) -> PrinterProfileBuilder {
        self.width = width;
        self
    }

    /// Adds a specific width per font
    ///
    /// FontA usually has 32 characters of width for 58mm paper printers, and 48 for 80mm paper. You can also look for the specsheet, or do trial and error.
    /// ```rust
    /// use quest_printer::{PrinterProfileBuilder, command::Font};
    /// let printer_profile = PrinterProfileBuilder::new()
    ///     .with_font_width(Font::FontA, 32)
    ///     .build();
    /// assert_eq!(32, printer_profile.columns());
    /// ```
    pub fn with_font_width(mut self, font: Font, width: u8) -> PrinterProfileBuilder {
        self.columns_per_font.insert(font, width);
        self
    }

    /// Adds a bulk write timeout
    ///
    /// USB devices might fail to write to the bulk endpoint. In such a case, a timeout must be provided to know when to stop waiting for the buffer to flush to the printer.
    pub fn with_timeout(mut self, timeout: Duration) -> PrinterProfileBuilder {
        self.timeout = timeout;
        self
    }

    /// Build the `PrinterProfile` that lies beneath the builder
    pub fn build(self) -> PrinterProfile {
        PrinterProfile {
            columns_per_font: self.columns_per_font,
            width: self.width,
            timeout: self.timeout
        }
    }
}
