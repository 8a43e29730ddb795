//! Converts the two channels of the TAOS TSL2560/TSL2561 daylight sensor into lux.

use crate::{Error, Result};

/// Calibration of Lightmeter Mark 2.3 No. L001 against a Voltcraft handheld lux meter.
const LUX_FACTOR: f64 = 21.0;

/// Manufacturer's IR correction for the visible-light channel, selected by the channel ratio
/// `ch1 / ch0`. Each row applies to ratios above the previous row's bound and up to and including
/// its own bound; ratios above the last bound read as 0 lux.
const CHANNEL_RATIO_FITS: [(f64, fn(f64, f64) -> f64); 4] = [
    (0.50, |ch0, ch1| 0.0304  * ch0 - 0.062  * ch0 * (ch1 / ch0).powf(1.4)),
    (0.61, |ch0, ch1| 0.0224  * ch0 - 0.031  * ch1),
    (0.80, |ch0, ch1| 0.0128  * ch0 - 0.0153 * ch1),
    (1.30, |ch0, ch1| 0.00146 * ch0 - 0.00112 * ch1),
];

/// Illuminance in lux for the given daylight sensor counts.
///
/// The result is not clamped: some channel ratios near the fit boundaries yield negative values,
/// and these are returned as is.
pub fn lux_from_channels(channel0: u16, channel1: u16) -> Result<f64> {
    if channel0 == 0 {
        return Err(Error::Calibration)
    }
    let (ch0, ch1) = (channel0 as f64, channel1 as f64);
    let ratio = ch1 / ch0;
    let lux = CHANNEL_RATIO_FITS.iter()
        .find(|&&(upper_bound, _)| ratio <= upper_bound)
        .map_or(0.0, |&(_, fit)| fit(ch0, ch1));
    log::debug!("lux_from_channels({}, {}): ratio = {:.3}, lux = {}",
        channel0, channel1, ratio, lux * LUX_FACTOR);
    Ok(lux * LUX_FACTOR)
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_second_branch() {
        assert_close(lux_from_channels(50, 30).unwrap(), 3.99);
    }

    #[test]
    fn test_zero_channel0() {
        assert!(matches!(lux_from_channels(0, 0), Err(Error::Calibration)));
        assert!(matches!(lux_from_channels(0, 100), Err(Error::Calibration)));
    }

    #[test]
    fn test_dark_channel1() {
        assert_close(lux_from_channels(1000, 0).unwrap(), 0.0304 * 1000.0 * 21.0);
    }

    #[test]
    fn test_first_branch_boundary() {
        // ratio exactly 0.5 belongs to the first fit
        let expected = (0.0304 * 200.0 - 0.062 * 200.0 * 0.5f64.powf(1.4)) * 21.0;
        assert_close(lux_from_channels(200, 100).unwrap(), expected);
    }

    #[test]
    fn test_upper_boundaries_inclusive() {
        // ratio 0.61
        assert_close(lux_from_channels(100, 61).unwrap(), (0.0224 * 100.0 - 0.031 * 61.0) * 21.0);
        // ratio 0.80
        assert_close(lux_from_channels(100, 80).unwrap(), (0.0128 * 100.0 - 0.0153 * 80.0) * 21.0);
        // ratio 1.30
        assert_close(lux_from_channels(100, 130).unwrap(),
            (0.00146 * 100.0 - 0.00112 * 130.0) * 21.0);
    }

    #[test]
    fn test_just_above_boundary() {
        // ratio 0.62 falls in the third fit
        assert_close(lux_from_channels(100, 62).unwrap(), (0.0128 * 100.0 - 0.0153 * 62.0) * 21.0);
    }

    #[test]
    fn test_infrared_dominated() {
        assert_eq!(lux_from_channels(100, 131).unwrap(), 0.0);
        assert_eq!(lux_from_channels(1, 65535).unwrap(), 0.0);
    }
}
