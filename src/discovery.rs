//! Finding printers attached to the host, and choosing one
//!
//! Discovery never needs a live connection: it only produces [PrinterTarget]s. Targets are resolved in one of two ways:
//!
//! * Interactively, with [select_target], which auto-selects a lonely candidate and prompts with a numbered menu otherwise.
//! * Non-interactively, with [resolve_with], in order of precedence: the environment override, the first spooler printer, the first usb printer.
//!
//! The environment override is read from these variables:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `RQS_PRINTER_KIND` | `spooler` (or `win32`) or `usb` |
//! | `RQS_PRINTER_NAME` | Spooler destination, for the `spooler` kind |
//! | `RQS_USB_VID` / `RQS_USB_PID` | Vendor and product id, `0x` prefixed hex or decimal, for the `usb` kind |
//!
//! An incomplete or unparsable override is ignored.

use std::io::{BufRead, Write};
use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, UsbContext};
use serde::{Serialize, Deserialize};
use crate::{
    Error, Result, PrinterTarget,
    printer::{RusbBackend, list_destinations}
};

/// USB class code for printers
pub const PRINTER_CLASS: u8 = 0x07;

pub const KIND_VAR: &str = "RQS_PRINTER_KIND";
pub const NAME_VAR: &str = "RQS_PRINTER_NAME";
pub const VENDOR_ID_VAR: &str = "RQS_USB_VID";
pub const PRODUCT_ID_VAR: &str = "RQS_USB_PID";

/// A printer found on the usb bus
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BusPrinter {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Empty when the device would not tell
    pub manufacturer: String,
    /// Empty when the device would not tell
    pub product: String
}

impl BusPrinter {
    pub fn target(&self) -> PrinterTarget {
        PrinterTarget::bus(self.vendor_id, self.product_id)
    }

    /// Human readable description, as shown in the selection menu
    pub fn label(&self) -> String {
        let or_unknown = |value: &str| if value.is_empty() { "Unknown".to_string() } else { value.to_string() };
        format!(
            "{} - {} (VID=0x{:04x}, PID=0x{:04x})",
            or_unknown(&self.manufacturer), or_unknown(&self.product), self.vendor_id, self.product_id
        )
    }
}

/// Source of printer candidates
pub trait PrinterDiscovery {
    /// Spooler destinations, deduplicated, in enumeration order
    fn spooler_printers(&self) -> Vec<String>;
    /// Usb devices of the printer class
    fn bus_printers(&self) -> Vec<BusPrinter>;
}

/// Discovery against the host's spooler and usb bus
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemDiscovery;

impl PrinterDiscovery for SystemDiscovery {
    fn spooler_printers(&self) -> Vec<String> {
        list_spooler_printers()
    }

    fn bus_printers(&self) -> Vec<BusPrinter> {
        list_bus_printers()
    }
}

/// Printers registered in the spooler. An absent spooler gives an empty list.
pub fn list_spooler_printers() -> Vec<String> {
    match list_destinations() {
        Ok(names) => names,
        Err(e) => {
            debug!("No spooler printers: {}", e);
            Vec::new()
        }
    }
}

/// Printers attached to the usb bus. Bus failures give an empty list.
pub fn list_bus_printers() -> Vec<BusPrinter> {
    match scan_bus() {
        Ok(printers) => printers,
        Err(e) => {
            debug!("No usb printers: {}", e);
            Vec::new()
        }
    }
}

fn scan_bus() -> Result<Vec<BusPrinter>> {
    let backend = RusbBackend::new()?;
    let mut printers = Vec::new();
    for device in backend.context().devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(descriptor) => descriptor,
            Err(_) => continue
        };
        if !is_printer(&device, &descriptor) {
            continue;
        }
        let (manufacturer, product) = device_strings(&device, &descriptor);
        printers.push(BusPrinter {
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
            manufacturer,
            product
        });
    }
    Ok(printers)
}

/// Printer class at the device level, or in any interface
fn is_printer(device: &Device<Context>, descriptor: &DeviceDescriptor) -> bool {
    if descriptor.class_code() == PRINTER_CLASS {
        return true;
    }
    (0..descriptor.num_configurations())
        .filter_map(|index| device.config_descriptor(index).ok())
        .any(|config| config.interfaces().any(|interface| {
            interface.descriptors().any(|setting| setting.class_code() == PRINTER_CLASS)
        }))
}

fn device_strings(device: &Device<Context>, descriptor: &DeviceDescriptor) -> (String, String) {
    match device.open() {
        Ok(handle) => (
            handle.read_manufacturer_string_ascii(descriptor).unwrap_or_default(),
            handle.read_product_string_ascii(descriptor).unwrap_or_default()
        ),
        Err(_) => (String::new(), String::new())
    }
}

/// Parses a usb id, either `0x` prefixed hex or decimal
///
/// ```rust
/// use quest_printer::discovery::parse_id;
///
/// assert_eq!(Some(0x0416), parse_id("0x0416"));
/// assert_eq!(Some(0x0416), parse_id(" 0X0416 "));
/// assert_eq!(Some(1046), parse_id("1046"));
/// assert_eq!(None, parse_id("0416h"));
/// ```
pub fn parse_id(raw: &str) -> Option<u16> {
    let raw = raw.trim().to_lowercase();
    match raw.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok()
    }
}

/// Reads the override from the process environment
pub fn target_from_env() -> Option<PrinterTarget> {
    target_from_vars(|key| std::env::var(key).ok())
}

/// Reads the override through a variable lookup
pub fn target_from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Option<PrinterTarget> {
    let kind = var(KIND_VAR)?.trim().to_lowercase();
    match kind.as_str() {
        "" => None,
        "spooler" | "win32" => var(NAME_VAR)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .map(PrinterTarget::spooler),
        "usb" => {
            let vendor_id = parse_id(&var(VENDOR_ID_VAR)?)?;
            let product_id = parse_id(&var(PRODUCT_ID_VAR)?)?;
            Some(PrinterTarget::bus(vendor_id, product_id))
        },
        other => {
            debug!("Ignoring unknown printer kind {:?}", other);
            None
        }
    }
}

/// Prompts with a numbered menu. Blank or invalid input selects nothing.
fn choose<R: BufRead, W: Write>(title: &str, labels: &[String], input: &mut R, output: &mut W) -> Result<Option<usize>> {
    match labels.len() {
        0 => Ok(None),
        1 => {
            info!("Using printer: {}", labels[0]);
            Ok(Some(0))
        },
        count => {
            writeln!(output, "{}", title)?;
            for (index, label) in labels.iter().enumerate() {
                writeln!(output, "  {}. {}", index + 1, label)?;
            }
            write!(output, "Select a printer by number (or press Enter to cancel): ")?;
            output.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            match line.trim().parse::<usize>() {
                Ok(number) if (1..=count).contains(&number) => Ok(Some(number - 1)),
                _ => Ok(None)
            }
        }
    }
}

/// Interactive selection, spooler printers first, then usb printers
///
/// Returns `None` when nothing was found or selected, which interactive callers should treat as fatal.
pub fn select_target<D, R, W>(discovery: &D, mut input: R, mut output: W) -> Result<Option<PrinterTarget>>
where D: PrinterDiscovery, R: BufRead, W: Write {
    let names = discovery.spooler_printers();
    if let Some(index) = choose("Select a spooler printer:", &names, &mut input, &mut output)? {
        return Ok(Some(PrinterTarget::spooler(names[index].as_str())));
    }
    if !names.is_empty() {
        info!("No spooler printer selected, trying direct usb access");
    }

    let printers = discovery.bus_printers();
    let labels: Vec<String> = printers.iter().map(BusPrinter::label).collect();
    Ok(choose("Multiple USB printers detected:", &labels, &mut input, &mut output)?
        .map(|index| printers[index].target()))
}

/// Non-interactive selection: override, then first spooler printer, then first usb printer
pub fn resolve_with<D: PrinterDiscovery>(discovery: &D, override_target: Option<PrinterTarget>) -> Result<PrinterTarget> {
    if let Some(target) = override_target {
        info!("Using {} from the environment", target);
        return Ok(target);
    }
    if let Some(name) = discovery.spooler_printers().into_iter().next() {
        info!("Using the first spooler printer, {}", name);
        return Ok(PrinterTarget::spooler(name));
    }
    if let Some(printer) = discovery.bus_printers().first() {
        info!("Using the first usb printer, {}", printer.label());
        return Ok(printer.target());
    }
    Err(Error::NoPrinterFound)
}

/// Resolves the printer to use on this host
///
/// Interactive resolution prompts on the terminal. Either way, finding nothing is [NoPrinterFound](crate::Error::NoPrinterFound).
pub fn resolve_target(interactive: bool) -> Result<PrinterTarget> {
    if interactive {
        let stdin = std::io::stdin();
        select_target(&SystemDiscovery, stdin.lock(), std::io::stdout())?
            .ok_or(Error::NoPrinterFound)
    } else {
        resolve_with(&SystemDiscovery, target_from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct FakeDiscovery {
        spooler: Vec<String>,
        bus: Vec<BusPrinter>
    }

    impl PrinterDiscovery for FakeDiscovery {
        fn spooler_printers(&self) -> Vec<String> {
            self.spooler.clone()
        }

        fn bus_printers(&self) -> Vec<BusPrinter> {
            self.bus.clone()
        }
    }

    fn bus_printer(vendor_id: u16, product_id: u16) -> BusPrinter {
        BusPrinter {
            vendor_id,
            product_id,
            manufacturer: String::new(),
            product: "POS58".to_string()
        }
    }

    fn select(discovery: &FakeDiscovery, input: &str) -> (Option<PrinterTarget>, String) {
        let mut output = Vec::new();
        let target = select_target(discovery, Cursor::new(input), &mut output).unwrap();
        (target, String::from_utf8(output).unwrap())
    }

    #[test]
    fn lonely_candidate_is_auto_selected() {
        let discovery = FakeDiscovery {
            bus: vec![bus_printer(0x0416, 0x5011)],
            ..FakeDiscovery::default()
        };
        let (target, output) = select(&discovery, "");
        assert_eq!(Some(PrinterTarget::bus(0x0416, 0x5011)), target);
        assert!(output.is_empty());
    }

    #[test]
    fn menu_is_one_based() {
        let discovery = FakeDiscovery {
            bus: vec![bus_printer(0x0416, 0x5011), bus_printer(0x04b8, 0x0e15)],
            ..FakeDiscovery::default()
        };
        let (target, output) = select(&discovery, "2\n");
        assert_eq!(Some(PrinterTarget::bus(0x04b8, 0x0e15)), target);
        assert!(output.contains("  1. Unknown - POS58 (VID=0x0416, PID=0x5011)"));
        assert!(output.contains("  2. Unknown - POS58 (VID=0x04b8, PID=0x0e15)"));
    }

    #[test]
    fn blank_or_invalid_input_selects_nothing() {
        let discovery = FakeDiscovery {
            bus: vec![bus_printer(1, 1), bus_printer(2, 2)],
            ..FakeDiscovery::default()
        };
        assert_eq!(None, select(&discovery, "\n").0);
        assert_eq!(None, select(&discovery, "3\n").0);
        assert_eq!(None, select(&discovery, "0\n").0);
        assert_eq!(None, select(&discovery, "two\n").0);
        assert_eq!(None, select(&FakeDiscovery::default(), "1\n").0);
    }

    #[test]
    fn declined_spooler_falls_back_to_the_bus() {
        let discovery = FakeDiscovery {
            spooler: vec!["Kitchen".to_string(), "Office".to_string()],
            bus: vec![bus_printer(0x0416, 0x5011)]
        };
        assert_eq!(Some(PrinterTarget::spooler("Office")), select(&discovery, "2\n").0);
        // Blank on the spooler menu, then the only usb printer is taken
        assert_eq!(Some(PrinterTarget::bus(0x0416, 0x5011)), select(&discovery, "\n").0);
    }

    #[test]
    fn non_interactive_precedence() {
        let discovery = FakeDiscovery {
            spooler: vec!["Kitchen".to_string()],
            bus: vec![bus_printer(0x0416, 0x5011)]
        };
        let forced = PrinterTarget::bus(1, 2);
        assert_eq!(forced.clone(), resolve_with(&discovery, Some(forced)).unwrap());
        assert_eq!(PrinterTarget::spooler("Kitchen"), resolve_with(&discovery, None).unwrap());

        let bus_only = FakeDiscovery {
            bus: vec![bus_printer(0x0416, 0x5011), bus_printer(1, 1)],
            ..FakeDiscovery::default()
        };
        assert_eq!(PrinterTarget::bus(0x0416, 0x5011), resolve_with(&bus_only, None).unwrap());

        assert!(matches!(resolve_with(&FakeDiscovery::default(), None), Err(Error::NoPrinterFound)));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn environment_override() {
        assert_eq!(
            Some(PrinterTarget::bus(0x0416, 20497)),
            target_from_vars(vars(&[(KIND_VAR, "USB"), (VENDOR_ID_VAR, "0x0416"), (PRODUCT_ID_VAR, "20497")]))
        );
        assert_eq!(
            Some(PrinterTarget::spooler("Kitchen")),
            target_from_vars(vars(&[(KIND_VAR, "win32"), (NAME_VAR, "Kitchen")]))
        );
        // Incomplete or unparsable overrides are ignored
        assert_eq!(None, target_from_vars(vars(&[(KIND_VAR, "usb"), (VENDOR_ID_VAR, "0x0416")])));
        assert_eq!(None, target_from_vars(vars(&[(KIND_VAR, "usb"), (VENDOR_ID_VAR, "zz"), (PRODUCT_ID_VAR, "1")])));
        assert_eq!(None, target_from_vars(vars(&[(KIND_VAR, "spooler"), (NAME_VAR, "  ")])));
        assert_eq!(None, target_from_vars(vars(&[(KIND_VAR, "network")])));
        assert_eq!(None, target_from_vars(vars(&[])));
    }
}
