use serde::{Serialize, Deserialize};

/// Describes how to reach a printer, not a live connection
///
/// Targets are plain values: they can be stored, sent along with a job, and resolved into a [Printer](crate::Printer) later by the [Negotiator](crate::printer::Negotiator) or the spooler.
///
/// ```rust
/// use quest_printer::PrinterTarget;
///
/// let target = PrinterTarget::bus(0x04b8, 0x0e15);
/// assert_eq!("usb printer 0x04b8:0x0e15", target.to_string());
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "kind")]
pub enum PrinterTarget {
    /// Printer registered in the operating system's print spooler
    Spooler {
        name: String
    },
    /// Printer attached to the usb bus
    Bus {
        vendor_id: u16,
        product_id: u16
    }
}

impl PrinterTarget {
    pub fn spooler<A: Into<String>>(name: A) -> PrinterTarget {
        PrinterTarget::Spooler{name: name.into()}
    }

    pub fn bus(vendor_id: u16, product_id: u16) -> PrinterTarget {
        PrinterTarget::Bus{vendor_id, product_id}
    }
}

impl std::fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrinterTarget::Spooler{name} => write!(f, "spooler printer \"{}\"", name),
            PrinterTarget::Bus{vendor_id, product_id} => write!(f, "usb printer 0x{:04x}:0x{:04x}", vendor_id, product_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_tagged() {
        let json = serde_json::to_string(&PrinterTarget::spooler("Kitchen")).unwrap();
        assert_eq!(r#"{"kind":"Spooler","name":"Kitchen"}"#, json);
        let target: PrinterTarget = serde_json::from_str(r#"{"kind":"Bus","vendor_id":1046,"product_id":20497}"#).unwrap();
        assert_eq!(PrinterTarget::bus(0x0416, 0x5011), target);
    }

    #[test]
    fn partial_descriptors_are_rejected() {
        assert!(serde_json::from_str::<PrinterTarget>(r#"{"kind":"Bus","vendor_id":1046}"#).is_err());
        assert!(serde_json::from_str::<PrinterTarget>(r#"{"name":"Kitchen"}"#).is_err());
    }
}
