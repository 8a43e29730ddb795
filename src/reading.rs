use chrono::{DateTime, SubsecRound, Utc};

/// A timestamped lightmeter reading.
///
/// Readings are created once per sampling cycle and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    utc: DateTime<Utc>,
    unix: i64,
    light_level: u32,
    daylight: f64,
    temperature: f64,
    status: bool,
}

impl Reading {
    /// Assembles a reading sampled at `instant`, which is truncated to whole seconds so that
    /// the calendar timestamp and the UNIX epoch describe the same moment.
    pub fn new(instant: DateTime<Utc>, light_level: u32, daylight: f64, temperature: f64,
               status: bool) -> Reading {
        let utc = instant.trunc_subsecs(0);
        Reading { utc, unix: utc.timestamp(), light_level, daylight, temperature, status }
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }

    pub fn unix(&self) -> i64 {
        self.unix
    }

    /// Light level in counts, scaled by the measurement range but otherwise uncalibrated.
    pub fn light_level(&self) -> u32 {
        self.light_level
    }

    /// Daylight sensor reading in lux.
    pub fn daylight(&self) -> f64 {
        self.daylight
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// `true` if the light sensor was not saturated.
    pub fn status(&self) -> bool {
        self.status
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncates_to_seconds() {
        let instant = Utc.timestamp_opt(1_700_000_000, 999_999_999).unwrap();
        let reading = Reading::new(instant, 100, 3.99, 16.0, true);
        assert_eq!(reading.unix(), 1_700_000_000);
        assert_eq!(reading.utc(), Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert_eq!(reading.utc().timestamp(), reading.unix());
    }

    #[test]
    fn test_before_epoch_floors() {
        let instant = Utc.timestamp_opt(-2, 500_000_000).unwrap();
        let reading = Reading::new(instant, 0, 0.0, 0.0, false);
        assert_eq!(reading.unix(), -2);
    }
}
