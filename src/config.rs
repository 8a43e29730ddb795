//! Identification of the instrument on the bus and run-time tunables.

use std::time::Duration;

use crate::{Error, Result};

/// How to find and talk to the instrument.
///
/// The lightmeter identifies itself as a Microchip PICDEM demo board, so the vendor and product
/// ids are not unique to it; the first matching device on the bus is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfiguration {
    pub vendor_id: u16,
    pub product_id: u16,
    pub configuration: u8,
    /// Interface number and alternate setting.
    pub interface: (u8, u8),
    /// Timeout of each individual bulk transfer.
    pub timeout: Duration,
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self {
            vendor_id: 0x04d8,
            product_id: 0x000c,
            configuration: 1,
            interface: (0, 0),
            timeout: Duration::from_millis(1000),
        }
    }
}

/// Converts a sampling interval in (possibly fractional) minutes into a `Duration`.
pub fn sampling_interval(minutes: f64) -> Result<Duration> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(Error::InvalidInterval(minutes))
    }
    Duration::try_from_secs_f64(minutes * 60.0).map_err(|_| Error::InvalidInterval(minutes))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_identity() {
        let config = DeviceConfiguration::default();
        assert_eq!((config.vendor_id, config.product_id), (0x04d8, 0x000c));
        assert_eq!(config.configuration, 1);
        assert_eq!(config.interface, (0, 0));
    }

    #[test]
    fn test_interval_fractional() {
        assert_eq!(sampling_interval(1.0).unwrap(), Duration::from_secs(60));
        assert_eq!(sampling_interval(0.5).unwrap(), Duration::from_secs(30));
        assert_eq!(sampling_interval(0.0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_interval_invalid() {
        assert!(matches!(sampling_interval(-1.0), Err(Error::InvalidInterval(_))));
        assert!(matches!(sampling_interval(f64::NAN), Err(Error::InvalidInterval(_))));
        assert!(matches!(sampling_interval(f64::INFINITY), Err(Error::InvalidInterval(_))));
    }
}
