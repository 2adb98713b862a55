extern crate qrcode;

use qrcode::{Color, QrCode};
use crate::{
    Error, Result,
    command::Command
};
use super::Justification;

/// Dots used for each qr module, when the printer is wide enough
pub const MODULE_DOTS: usize = 4;

/// Builds the byte feed to print `content` as a centered qr code
///
/// The code is rasterized as a single `GS v 0` image. Module size starts at [MODULE_DOTS] and shrinks until the image fits in `printer_width` dots.
pub fn qr_feed(content: &str, printer_width: u16) -> Result<Vec<u8>> {
    let code = QrCode::new(content.as_bytes())?;
    let modules = code.width();

    let mut module_dots = MODULE_DOTS;
    while module_dots > 1 && modules * module_dots > printer_width as usize {
        module_dots -= 1;
    }
    let side = modules * module_dots;
    if side > printer_width as usize {
        return Err(Error::RenderError(format!(
            "qr code needs {} dots but the printer only has {}", side, printer_width
        )));
    }

    // Each raster row is packed 8 dots per byte, most significant bit first
    let width_bytes = (side + 7) / 8;
    let mut raster = vec![0u8; width_bytes * side];
    for y in 0..side {
        for x in 0..side {
            if code[(x / module_dots, y / module_dots)] == Color::Dark {
                raster[y * width_bytes + x / 8] |= 0x80 >> (x % 8);
            }
        }
    }

    let mut feed = Command::Justify{justification: Justification::Center}.as_bytes();
    feed.append(&mut Command::RasterImage{
        width_bytes: width_bytes as u16,
        height: side as u16
    }.as_bytes());
    feed.append(&mut raster);
    feed.push(b'\n');
    feed.append(&mut Command::Justify{justification: Justification::Left}.as_bytes());
    Ok(feed)
}
