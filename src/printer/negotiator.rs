//! Fallback ladder to open usb printers
//!
//! USB printer class devices are often grabbed by a generic kernel driver, or expose their endpoints under vendor specific numbers. Instead of a single open call, the [Negotiator] walks an ordered list of [OpenAttempt]s and returns the first connection that both opens and accepts an `ESC @` write.

use std::time::Duration;
use log::{debug, info};
use crate::{
    Error, Result,
    command::Command
};
use super::Transport;

/// Per-attempt errors kept in [ConnectionFailed](crate::Error::ConnectionFailed)
pub const REPORTED_ATTEMPTS: usize = 5;

/// Configurations tried by the last rung of the ladder
const GRID_CONFIGURATIONS: [u8; 2] = [1, 2];
const GRID_INTERFACES: [u8; 2] = [0, 1];
const GRID_IN_ENDPOINTS: [u8; 3] = [0x81, 0x82, 0x83];
const GRID_OUT_ENDPOINT: u8 = 0x01;

/// One way of opening a usb printer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenAttempt {
    /// Plain open, whatever the device exposes by default
    Default,
    /// Plain open, detaching the kernel driver bound to the device first
    DetachDriver,
    /// Explicit configuration, interface and endpoints, with the kernel driver detached
    Explicit {
        configuration: u8,
        interface: u8,
        out_endpoint: u8,
        in_endpoint: Option<u8>
    }
}

impl std::fmt::Display for OpenAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenAttempt::Default => write!(f, "default"),
            OpenAttempt::DetachDriver => write!(f, "detach_kernel_driver"),
            OpenAttempt::Explicit{configuration, interface, out_endpoint, in_endpoint} => write!(
                f,
                "cfg {} iface {} out 0x{:02x} in 0x{:02x}",
                configuration, interface, out_endpoint, in_endpoint.unwrap_or(0)
            )
        }
    }
}

/// Endpoints declared by one interface of a device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceEndpoints {
    /// Configuration value, as used to select the configuration
    pub configuration: u8,
    pub interface: u8,
    pub out_endpoint: Option<u8>,
    pub in_endpoint: Option<u8>
}

/// Access to the usb bus, as needed by the [Negotiator]
pub trait UsbBackend {
    type Connection: Transport;

    /// Declared interfaces of the device, across every configuration
    fn interfaces(&self, vendor_id: u16, product_id: u16) -> Result<Vec<InterfaceEndpoints>>;

    /// Opens the device as the attempt says. Writes on the connection must give up after `timeout`.
    ///
    /// Only writes are bounded, the validation write included. Opening, detaching the kernel driver, selecting the configuration and claiming the interface are synchronous control requests with no caller-supplied timeout in rusb, so a device that hangs there stalls the attempt.
    fn open(&self, vendor_id: u16, product_id: u16, attempt: &OpenAttempt, timeout: Duration) -> Result<Self::Connection>;
}

/// Builds the full ladder for a device with the given interfaces
///
/// Default open, driver detachment, one explicit attempt per interface with an out endpoint, and finally a fixed grid of common layouts.
fn build_ladder(interfaces: &[InterfaceEndpoints]) -> Vec<OpenAttempt> {
    let mut ladder = vec![OpenAttempt::Default, OpenAttempt::DetachDriver];
    for endpoints in interfaces {
        if let Some(out_endpoint) = endpoints.out_endpoint {
            ladder.push(OpenAttempt::Explicit {
                configuration: endpoints.configuration,
                interface: endpoints.interface,
                out_endpoint,
                in_endpoint: endpoints.in_endpoint
            });
        }
    }
    for configuration in GRID_CONFIGURATIONS {
        for interface in GRID_INTERFACES {
            for in_endpoint in GRID_IN_ENDPOINTS {
                ladder.push(OpenAttempt::Explicit {
                    configuration,
                    interface,
                    out_endpoint: GRID_OUT_ENDPOINT,
                    in_endpoint: Some(in_endpoint)
                });
            }
        }
    }
    ladder
}

/// Remediation advice for a usb printer that could not be opened
pub fn remediation_hint(vendor_id: u16, product_id: u16) -> String {
    if cfg!(target_os = "linux") {
        format!(
            "Failed to open USB printer. Ensure permissions (udev rule), and that the 'usblp' kernel driver is not binding to the device. \
            You can test temporarily with: 'sudo modprobe -r usblp' and replug, or create a udev rule like:\n\
            SUBSYSTEM==\"usb\", ATTR{{idVendor}}==\"{:04x}\", ATTR{{idProduct}}==\"{:04x}\", MODE=\"0666\"\n\
            Then: 'sudo udevadm control --reload-rules && sudo udevadm trigger' and replug the printer.",
            vendor_id, product_id
        )
    } else if cfg!(target_os = "windows") {
        format!(
            "Failed to open USB printer {:04x}:{:04x}. Direct access needs a WinUSB compatible driver bound to the device, \
            otherwise print through the spooler by selecting the printer by name.",
            vendor_id, product_id
        )
    } else {
        format!(
            "Failed to open USB printer {:04x}:{:04x}. Check that the current user may access the device, and that no other driver claimed it.",
            vendor_id, product_id
        )
    }
}

/// Turns a bus target into a validated connection
pub struct Negotiator<B> {
    backend: B,
    timeout: Duration
}

impl<B: UsbBackend> Negotiator<B> {
    /// Negotiator with a 2 seconds bound on every open and validation write
    pub fn new(backend: B) -> Negotiator<B> {
        Negotiator {
            backend,
            timeout: Duration::from_secs(2)
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Negotiator<B> {
        self.timeout = timeout;
        self
    }

    /// The ordered list of attempts for a device with the given interfaces
    ///
    /// ```rust
    /// use quest_printer::printer::{Negotiator, OpenAttempt, RusbBackend};
    ///
    /// let ladder = Negotiator::<RusbBackend>::ladder(&[]);
    /// assert_eq!(OpenAttempt::Default, ladder[0]);
    /// assert_eq!(OpenAttempt::DetachDriver, ladder[1]);
    /// // Followed by the 2 x 2 x 3 grid
    /// assert_eq!(14, ladder.len());
    /// ```
    pub fn ladder(interfaces: &[InterfaceEndpoints]) -> Vec<OpenAttempt> {
        build_ladder(interfaces)
    }

    /// Walks the ladder until one attempt opens and validates
    ///
    /// Fails with [ConnectionFailed](crate::Error::ConnectionFailed) once every attempt failed, carrying the last [REPORTED_ATTEMPTS] error messages.
    pub fn connect(&self, vendor_id: u16, product_id: u16) -> Result<B::Connection> {
        let mut errors = Vec::new();
        let interfaces = match self.backend.interfaces(vendor_id, product_id) {
            Ok(interfaces) => interfaces,
            Err(e) => {
                errors.push(format!("descriptor scan: {}", e));
                Vec::new()
            }
        };

        for attempt in build_ladder(&interfaces) {
            debug!("Opening 0x{:04x}:0x{:04x} with {}", vendor_id, product_id, attempt);
            match self.open_validated(vendor_id, product_id, &attempt) {
                Ok(connection) => {
                    info!("Opened usb printer 0x{:04x}:0x{:04x} ({})", vendor_id, product_id, attempt);
                    return Ok(connection);
                },
                Err(e) => {
                    debug!("Attempt {} failed: {}", attempt, e);
                    errors.push(format!("{}: {}", attempt, e));
                }
            }
        }

        let tail = errors.split_off(errors.len().saturating_sub(REPORTED_ATTEMPTS));
        Err(Error::ConnectionFailed {
            vendor_id,
            product_id,
            attempts: tail,
            hint: remediation_hint(vendor_id, product_id)
        })
    }

    fn open_validated(&self, vendor_id: u16, product_id: u16, attempt: &OpenAttempt) -> Result<B::Connection> {
        let mut connection = self.backend.open(vendor_id, product_id, attempt, self.timeout)?;
        if let Err(e) = connection.write(&Command::Reset.as_bytes()) {
            if let Err(close_error) = connection.close() {
                debug!("Closing the rejected handle failed: {}", close_error);
            }
            return Err(e);
        }
        Ok(connection)
    }
}
