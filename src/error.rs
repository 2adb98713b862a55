use thiserror::Error;

/// Errors that this crate throws.
#[derive(Debug, Error)]
pub enum Error {
    /// Error related to rusb
    #[error("rusb error: {0}")]
    Usb(#[from] rusb::Error),
    /// Error coming from the operating system, mostly from the spooler backend
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The qr code could not be built from the given data
    #[error("qr error: {0}")]
    Qr(#[from] qrcode::types::QrError),
    /// Discovery did not yield a single printer
    #[error("no suitable printer was found")]
    NoPrinterFound,
    /// Every configuration of the connection ladder was tried without success
    #[error("{hint}\nLast errors: {}", .attempts.join("; "))]
    ConnectionFailed {
        vendor_id: u16,
        product_id: u16,
        /// Tail of the per-attempt error messages
        attempts: Vec<String>,
        /// Remediation advice for the current platform
        hint: String
    },
    /// The spooler backend is not present on this host
    #[error("spooler backend unavailable: {0}")]
    SpoolerUnavailable(String),
    /// A document could not be turned into device commands
    #[error("could not render document: {0}")]
    RenderError(String),
    /// The device stopped accepting data in the middle of a job
    #[error("write to printer failed: {0}")]
    WriteFailure(String),
    /// A printer target descriptor could not be interpreted
    #[error("invalid printer target: {0}")]
    InvalidTarget(String),
    /// The print queue no longer accepts jobs
    #[error("the print queue is closed")]
    QueueClosed
}

/// Shorthand for results carrying this crate's [Error](crate::Error)
pub type Result<T> = std::result::Result<T, Error>;
