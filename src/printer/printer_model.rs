use super::PrinterProfile;
use crate::command::Font;

/// Printers known to this library
///
/// Probably needs updates. Bus connections to a known model adopt its profile, anything else gets the default one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrinterModel {
    /// ZKTeco mini printer
    ZKTeco,
    /// Epson most used printer
    TMT20
}

impl PrinterModel {
    /// Every known model, in lookup order
    pub const ALL: [PrinterModel; 2] = [PrinterModel::TMT20, PrinterModel::ZKTeco];

    /// Get the vendor and product id of the current model
    pub fn vp_id(&self) -> (u16, u16) {
        match self {
            PrinterModel::ZKTeco => (0x6868, 0x0200),
            PrinterModel::TMT20 => (0x04b8, 0x0e15)
        }
    }

    /// Finds the model with the given ids
    pub fn from_ids(vendor_id: u16, product_id: u16) -> Option<PrinterModel> {
        PrinterModel::ALL.iter().copied().find(|model| model.vp_id() == (vendor_id, product_id))
    }

    /// Profile for a usb printer, the model's one if the ids are known
    ///
    /// ```rust
    /// use quest_printer::PrinterModel;
    ///
    /// assert_eq!(48, PrinterModel::profile_for(0x04b8, 0x0e15).columns());
    /// assert_eq!(42, PrinterModel::profile_for(0x0416, 0x5011).columns());
    /// ```
    pub fn profile_for(vendor_id: u16, product_id: u16) -> PrinterProfile {
        PrinterModel::from_ids(vendor_id, product_id)
            .map(|model| model.profile())
            .unwrap_or_default()
    }

    /// Obtain the full details of the printer, to make an easy print
    pub fn profile(&self) -> PrinterProfile {
        match self {
            PrinterModel::ZKTeco => PrinterProfile::builder()
                .with_font_width(Font::FontA, 32)
                .with_width(384)
                .build(),
            PrinterModel::TMT20 => PrinterProfile::builder()
                .with_font_width(Font::FontA, 48)
                .with_width(576)
                .build()
        }
    }
}
