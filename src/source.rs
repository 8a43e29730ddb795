//! Where readings come from: the instrument, or a generator of plausible fake readings.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Device, DeviceConfiguration, Reading, Result};
use crate::sys::Driver;

pub trait Sampler {
    /// Takes one complete reading.
    fn sample(&mut self) -> Result<Reading>;
}

impl<D: Driver> Sampler for crate::device::Device<D> {
    fn sample(&mut self) -> Result<Reading> {
        self.read()
    }
}

/// Generates uniformly distributed readings without touching any hardware.
#[derive(Debug)]
pub struct SyntheticSource<R: Rng = StdRng> {
    rng: R,
}

impl SyntheticSource {
    pub fn new() -> SyntheticSource {
        SyntheticSource::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> SyntheticSource {
        SyntheticSource::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SyntheticSource<R> {
    pub fn with_rng(rng: R) -> SyntheticSource<R> {
        SyntheticSource { rng }
    }
}

impl<R: Rng> Sampler for SyntheticSource<R> {
    fn sample(&mut self) -> Result<Reading> {
        let instant = Utc::now();
        Ok(Reading::new(instant,
            self.rng.gen_range(1000..100000),
            self.rng.gen_range(1..1000) as f64,
            self.rng.gen_range(-20..40) as f64,
            self.rng.gen_bool(0.5)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Hardware,
    Synthetic,
}

#[derive(Debug)]
pub enum Source {
    Hardware(Device),
    Synthetic(SyntheticSource),
}

impl Source {
    pub fn open(kind: SourceKind, config: &DeviceConfiguration) -> Result<Source> {
        match kind {
            SourceKind::Hardware => Ok(Source::Hardware(Device::open(config)?)),
            SourceKind::Synthetic => {
                log::info!("using synthetic readings instead of hardware");
                Ok(Source::Synthetic(SyntheticSource::new()))
            }
        }
    }

    /// Releases the instrument, if there is one.
    pub fn close(self) {
        match self {
            Self::Hardware(device) => device.close(),
            Self::Synthetic(_) => (),
        }
    }
}

impl Sampler for Source {
    fn sample(&mut self) -> Result<Reading> {
        match self {
            Self::Hardware(device) => device.sample(),
            Self::Synthetic(synthetic) => synthetic.sample(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_synthetic_ranges() {
        let mut source = SyntheticSource::seeded(0);
        let mut statuses = [false; 2];
        for _ in 0..1000 {
            let reading = source.sample().unwrap();
            assert!((1000..100000).contains(&reading.light_level()));
            assert!((1.0..1000.0).contains(&reading.daylight()));
            assert!((-20.0..40.0).contains(&reading.temperature()));
            assert_eq!(reading.temperature().fract(), 0.0);
            statuses[reading.status() as usize] = true;
        }
        assert_eq!(statuses, [true, true]);
    }

    #[test]
    fn test_synthetic_seeded_repeatable() {
        let mut a = SyntheticSource::seeded(42);
        let mut b = SyntheticSource::seeded(42);
        for _ in 0..10 {
            let (a, b) = (a.sample().unwrap(), b.sample().unwrap());
            assert_eq!(a.light_level(), b.light_level());
            assert_eq!(a.temperature(), b.temperature());
        }
    }

    #[test]
    fn test_synthetic_source_kind() {
        let source = Source::open(SourceKind::Synthetic, &DeviceConfiguration::default()).unwrap();
        assert!(matches!(source, Source::Synthetic(_)));
    }

    #[test]
    fn test_device_sampler() {
        use crate::device::test::MockDriver;
        let mut device = crate::device::Device::from_driver(
            MockDriver::with_responses(&[&[0x80, 0x2c], &[0x00, 0x7d, 5, 100, 0, 10, 0]]));
        let reading = device.sample().unwrap();
        assert_eq!(reading.temperature(), (16 + 44 * 32) as f64 / 16.0);
        assert_eq!(reading.light_level(), 32000);
        assert!(!reading.status());
    }

    #[test]
    fn test_with_rng_generator() {
        let mut source = SyntheticSource::with_rng(rand::rngs::mock::StepRng::new(0, 1));
        let reading = source.sample().unwrap();
        assert!((1000..100000).contains(&reading.light_level()));
        assert!((-20.0..40.0).contains(&reading.temperature()));
    }

    #[test]
    fn test_close_synthetic() {
        let mut source = Source::open(SourceKind::Synthetic, &DeviceConfiguration::default()).unwrap();
        assert!(source.sample().is_ok());
        source.close();
    }
}
