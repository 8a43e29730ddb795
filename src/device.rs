use chrono::Utc;

use crate::{DeviceConfiguration, Reading, Result};
use crate::calibration::lux_from_channels;
use crate::protocol::{decode_temperature, Command, LightFrame, ProtocolError};
use crate::protocol::{LIGHT_RESPONSE_LEN, TEMPERATURE_RESPONSE_LEN};
use crate::sys::Driver;

/// An open session with the instrument. The endpoints are released when it is dropped.
#[derive(Debug)]
pub struct Device<D: Driver> {
    driver: D,
}

impl Device<crate::sys::imp::LightmeterDriverImpl> {
    pub fn open(config: &DeviceConfiguration) -> Result<Device<crate::sys::imp::LightmeterDriverImpl>> {
        let driver = crate::sys::imp::LightmeterDriverImpl::open(config)?;
        Ok(Device { driver })
    }
}

impl<D: Driver> Device<D> {
    pub fn from_driver(driver: D) -> Device<D> {
        Device { driver }
    }

    /// Releases the endpoints.
    pub fn close(self) {
        drop(self)
    }

    // `N` is the buffer size; the exchange must also match the length the protocol defines
    fn command<const N: usize>(&mut self, command: Command) -> Result<[u8; N]> {
        let expected = command.response_len();
        let written = self.driver.write(&[command.opcode()])?;
        if written != 1 {
            return Err(ProtocolError::ShortWrite { command, written }.into())
        }
        let mut response = [0u8; N];
        let received = self.driver.read(&mut response[..])?;
        if received != expected || received != N {
            return Err(ProtocolError::ShortRead { command, expected, received }.into())
        }
        log::trace!("command({:?}) = {:02x?}", command, response);
        Ok(response)
    }

    pub fn read_temperature(&mut self) -> Result<f64> {
        let response = self.command::<TEMPERATURE_RESPONSE_LEN>(Command::Temperature)?;
        let temperature = decode_temperature(response);
        log::debug!("read_temperature() = {}", temperature);
        Ok(temperature)
    }

    pub fn read_light(&mut self) -> Result<LightFrame> {
        let response = self.command::<LIGHT_RESPONSE_LEN>(Command::Light)?;
        let frame = LightFrame::decode(response)?;
        log::debug!("read_light() = {:?}", frame);
        Ok(frame)
    }

    /// Performs one full sampling cycle. A failure of either command discards the whole cycle.
    pub fn read(&mut self) -> Result<Reading> {
        let instant = Utc::now();
        let temperature = self.read_temperature()?;
        let frame = self.read_light()?;
        let daylight = lux_from_channels(frame.channel0, frame.channel1)?;
        Ok(Reading::new(instant, frame.light_level(), daylight, temperature, frame.is_ok()))
    }
}
