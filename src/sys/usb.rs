use std::fmt;
use std::time::Duration;

use rusb::{Context, Device, DeviceHandle, Direction, UsbContext};

use crate::{DeviceConfiguration, Error, Result};

// hosts without a usable USB stack fail here rather than panicking in the global context
fn usb_context() -> Result<Context> {
    Ok(Context::new()?)
}

fn access_error(error: rusb::Error, bus: u8, address: u8) -> Error {
    match error {
        rusb::Error::Access => Error::PermissionDenied { bus, address },
        error => Error::from(error),
    }
}

fn find_device(context: &Context, config: &DeviceConfiguration) -> Result<Device<Context>> {
    for device in context.devices()?.iter() {
        let descriptor = device.device_descriptor()?;
        if descriptor.vendor_id() == config.vendor_id &&
                descriptor.product_id() == config.product_id {
            return Ok(device)
        }
    }
    Err(Error::NotFound)
}

// Returns `(out, in)` endpoint addresses; the first endpoint of each direction wins.
fn find_endpoints(device: &Device<Context>, interface: u8, setting: u8) -> Result<(u8, u8)> {
    let config_descriptor = device.active_config_descriptor()?;
    let descriptor = config_descriptor.interfaces()
        .filter(|candidate| candidate.number() == interface)
        .flat_map(|candidate| candidate.descriptors())
        .find(|candidate| candidate.setting_number() == setting)
        .ok_or(Error::EndpointUnavailable)?;
    let endpoint = |direction: Direction| {
        descriptor.endpoint_descriptors()
            .find(|endpoint| endpoint.direction() == direction)
            .map(|endpoint| endpoint.address())
    };
    match (endpoint(Direction::Out), endpoint(Direction::In)) {
        (Some(endpoint_out), Some(endpoint_in)) => Ok((endpoint_out, endpoint_in)),
        _ => Err(Error::EndpointUnavailable),
    }
}

pub struct LightmeterDriverImpl {
    handle: DeviceHandle<Context>,
    interface: u8,
    endpoint_out: u8,
    endpoint_in: u8,
    timeout: Duration,
}

impl fmt::Debug for LightmeterDriverImpl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LightmeterDriverImpl")
            .field("interface", &self.interface)
            .field("endpoint_out", &format_args!("{:#04x}", self.endpoint_out))
            .field("endpoint_in", &format_args!("{:#04x}", self.endpoint_in))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LightmeterDriverImpl {
    pub fn open(config: &DeviceConfiguration) -> Result<LightmeterDriverImpl> {
        let context = usb_context()?;
        let device = find_device(&context, config)?;
        let (bus, address) = (device.bus_number(), device.address());
        log::debug!("found {:04x}:{:04x} on bus {:03} address {:03}",
            config.vendor_id, config.product_id, bus, address);
        // permission problems surface either when opening or when configuring the device
        let access = |error: rusb::Error| access_error(error, bus, address);

        let handle = device.open().map_err(access)?;
        if let Err(error) = handle.set_auto_detach_kernel_driver(true) {
            log::debug!("kernel driver auto-detach unavailable: {}", error);
        }
        handle.set_active_configuration(config.configuration).map_err(access)?;

        let (interface, setting) = config.interface;
        let (endpoint_out, endpoint_in) = find_endpoints(&device, interface, setting)?;
        handle.claim_interface(interface).map_err(access)?;
        if setting != 0 {
            handle.set_alternate_setting(interface, setting)?;
        }

        log::info!("opened lightmeter at /dev/bus/usb/{:03}/{:03} (out {:#04x}, in {:#04x})",
            bus, address, endpoint_out, endpoint_in);
        Ok(LightmeterDriverImpl {
            handle,
            interface,
            endpoint_out,
            endpoint_in,
            timeout: config.timeout,
        })
    }
}

impl super::Driver for LightmeterDriverImpl {
    fn write(&self, data: &[u8]) -> Result<usize> {
        log::trace!("write_bulk({:#04x}, {:02x?})", self.endpoint_out, data);
        Ok(self.handle.write_bulk(self.endpoint_out, data, self.timeout)?)
    }

    fn read(&self, data: &mut [u8]) -> Result<usize> {
        let count = self.handle.read_bulk(self.endpoint_in, data, self.timeout)?;
        log::trace!("read_bulk({:#04x}) = {:02x?}", self.endpoint_in, &data[..count]);
        Ok(count)
    }
}

impl Drop for LightmeterDriverImpl {
    fn drop(&mut self) {
        match self.handle.release_interface(self.interface) {
            Ok(()) => log::info!("released lightmeter interface {}", self.interface),
            Err(error) => log::warn!("error releasing interface {}: {}", self.interface, error),
        }
    }
}
