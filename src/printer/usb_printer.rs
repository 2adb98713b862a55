use std::time::Duration;
use log::{debug, warn};
use rusb::{Context, Device, DeviceHandle, Direction, TransferType, UsbContext};
use crate::{Error, Result};
use super::{InterfaceEndpoints, OpenAttempt, Transport, UsbBackend};

/// [UsbBackend](crate::printer::UsbBackend) over libusb, through rusb
pub struct RusbBackend {
    context: Context
}

impl RusbBackend {
    pub fn new() -> Result<RusbBackend> {
        Ok(RusbBackend {
            context: Context::new()?
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn find_device(&self, vendor_id: u16, product_id: u16) -> Result<Device<Context>> {
        for device in self.context.devices()?.iter() {
            let descriptor = device.device_descriptor()?;
            if descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id {
                return Ok(device);
            }
        }
        // No printer was found with such vid and pid
        Err(Error::Usb(rusb::Error::NoDevice))
    }
}

/// First bulk out endpoint of interface 0, in the active configuration
fn default_out_endpoint(device: &Device<Context>) -> Result<u8> {
    let config_descriptor = device.active_config_descriptor()?;
    for interface in config_descriptor.interfaces().filter(|interface| interface.number() == 0) {
        for descriptor in interface.descriptors() {
            for endpoint in descriptor.endpoint_descriptors() {
                if let (TransferType::Bulk, Direction::Out) = (endpoint.transfer_type(), endpoint.direction()) {
                    return Ok(endpoint.address());
                }
            }
        }
    }
    Err(Error::Usb(rusb::Error::NotFound))
}

fn detach_kernel_driver(handle: &mut DeviceHandle<Context>, interface: u8) -> Result<()> {
    match handle.kernel_driver_active(interface) {
        Ok(true) => {
            // The kernel is active, we have to detach it
            handle.detach_kernel_driver(interface)?;
            debug!("Detached kernel driver from interface {}", interface);
        },
        Ok(false) => (),
        Err(e) => warn!("Could not find out if kernel driver is active, might encounter a problem soon: {}", e)
    }
    Ok(())
}

impl UsbBackend for RusbBackend {
    type Connection = UsbConnection;

    fn interfaces(&self, vendor_id: u16, product_id: u16) -> Result<Vec<InterfaceEndpoints>> {
        let device = self.find_device(vendor_id, product_id)?;
        let device_descriptor = device.device_descriptor()?;
        let mut res = Vec::new();
        for index in 0..device_descriptor.num_configurations() {
            let config_descriptor = device.config_descriptor(index)?;
            for interface in config_descriptor.interfaces() {
                for descriptor in interface.descriptors() {
                    let mut out_endpoint = None;
                    let mut in_endpoint = None;
                    for endpoint in descriptor.endpoint_descriptors() {
                        if endpoint.transfer_type() != TransferType::Bulk {
                            continue;
                        }
                        match endpoint.direction() {
                            Direction::Out => out_endpoint = out_endpoint.or(Some(endpoint.address())),
                            Direction::In => in_endpoint = in_endpoint.or(Some(endpoint.address()))
                        }
                    }
                    res.push(InterfaceEndpoints {
                        configuration: config_descriptor.number(),
                        interface: descriptor.interface_number(),
                        out_endpoint,
                        in_endpoint
                    });
                }
            }
        }
        Ok(res)
    }

    fn open(&self, vendor_id: u16, product_id: u16, attempt: &OpenAttempt, timeout: Duration) -> Result<UsbConnection> {
        let device = self.find_device(vendor_id, product_id)?;
        let mut handle = device.open()?;
        let (interface, endpoint) = match attempt {
            OpenAttempt::Default => (0, default_out_endpoint(&device)?),
            OpenAttempt::DetachDriver => {
                detach_kernel_driver(&mut handle, 0)?;
                (0, default_out_endpoint(&device)?)
            },
            OpenAttempt::Explicit{configuration, interface, out_endpoint, ..} => {
                detach_kernel_driver(&mut handle, *interface)?;
                if handle.active_configuration()? != *configuration {
                    handle.set_active_configuration(*configuration)?;
                }
                (*interface, *out_endpoint)
            }
        };
        // Now we claim the interface
        handle.claim_interface(interface)?;
        Ok(UsbConnection {
            handle,
            interface,
            endpoint,
            timeout
        })
    }
}

/// Claimed interface of a usb printer, writing to its bulk out endpoint
pub struct UsbConnection {
    handle: DeviceHandle<Context>,
    interface: u8,
    /// Bulk write endpoint
    endpoint: u8,
    /// Time to wait before giving up writing to the bulk endpoint
    timeout: Duration
}

impl Transport for UsbConnection {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0;
        while offset < bytes.len() {
            let written = self.handle.write_bulk(self.endpoint, &bytes[offset..], self.timeout)?;
            if written == 0 {
                return Err(Error::WriteFailure(format!(
                    "endpoint 0x{:02x} accepted no data", self.endpoint
                )));
            }
            offset += written;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.handle.release_interface(self.interface)?;
        Ok(())
    }
}
