use crate::{DeviceConfiguration, Error, Result};

/// Stands in for the USB driver when the crate is built without the `hardware` feature.
#[derive(Debug)]
pub struct LightmeterDriverImpl;

impl LightmeterDriverImpl {
    pub fn open(_config: &DeviceConfiguration) -> Result<LightmeterDriverImpl> {
        Err(Error::NotFound)
    }
}

impl super::Driver for LightmeterDriverImpl {
    fn write(&self, _data: &[u8]) -> Result<usize> {
        Err(Error::NotFound)
    }

    fn read(&self, _data: &mut [u8]) -> Result<usize> {
        Err(Error::NotFound)
    }
}
