//! Command framing and response decoding for the lightmeter firmware.
//!
//! Every exchange is a single opcode byte on the OUT endpoint answered by a fixed-length report
//! on the IN endpoint.

/// Raw counts at or above this value mean the light sensor is saturated.
pub const SATURATION_COUNTS: u16 = 32000;

pub const TEMPERATURE_RESPONSE_LEN: usize = 2;
pub const LIGHT_RESPONSE_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Temperature,
    Light,
}

impl Command {
    pub fn opcode(self) -> u8 {
        match self {
            Self::Temperature => b'T',
            Self::Light       => b'L',
        }
    }

    pub fn response_len(self) -> usize {
        match self {
            Self::Temperature => TEMPERATURE_RESPONSE_LEN,
            Self::Light       => LIGHT_RESPONSE_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("write of {command:?} command accepted {written} bytes")]
    ShortWrite { command: Command, written: usize },
    #[error("{command:?} response was {received} bytes, expected {expected}")]
    ShortRead { command: Command, expected: usize, received: usize },
    #[error("invalid measurement range index {0}")]
    InvalidRange(u8),
}

/// Decodes the temperature report into degrees Celsius.
///
/// The low 3 bits of the first byte are status bits and are discarded. The remaining bits of
/// the first byte count in units of 1/16 °C and the second byte counts in units of 2 °C; the two
/// are summed rather than concatenated, which is how the instrument is calibrated.
pub fn decode_temperature(raw: [u8; TEMPERATURE_RESPONSE_LEN]) -> f64 {
    ((raw[0] >> 3) as u32 + raw[1] as u32 * 32) as f64 / 16.0
}

/// Auto-ranging setting of the light sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    X120,
    X8,
    X4,
    X2,
    X1,
}

impl Range {
    pub const ALL: [Range; 5] = [Self::X120, Self::X8, Self::X4, Self::X2, Self::X1];

    pub fn from_index(index: u8) -> Result<Range, ProtocolError> {
        match index {
            1 => Ok(Self::X120),
            2 => Ok(Self::X8),
            3 => Ok(Self::X4),
            4 => Ok(Self::X2),
            5 => Ok(Self::X1),
            _ => Err(ProtocolError::InvalidRange(index)),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::X120 => 1,
            Self::X8   => 2,
            Self::X4   => 3,
            Self::X2   => 4,
            Self::X1   => 5,
        }
    }

    pub fn factor(self) -> u32 {
        match self {
            Self::X120 => 120,
            Self::X8   => 8,
            Self::X4   => 4,
            Self::X2   => 2,
            Self::X1   => 1,
        }
    }
}

/// Decoded light report: the main sensor count plus both channels of the daylight sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightFrame {
    pub raw_reading: u16,
    pub range: Range,
    pub channel0: u16,
    pub channel1: u16,
}

impl LightFrame {
    pub fn decode(raw: [u8; LIGHT_RESPONSE_LEN]) -> Result<LightFrame, ProtocolError> {
        Ok(LightFrame {
            raw_reading: u16::from_le_bytes([raw[0], raw[1]]),
            range: Range::from_index(raw[2])?,
            channel0: u16::from_le_bytes([raw[3], raw[4]]),
            channel1: u16::from_le_bytes([raw[5], raw[6]]),
        })
    }

    pub fn light_level(&self) -> u32 {
        self.raw_reading as u32 * self.range.factor()
    }

    /// Saturation is judged on the raw count, before range scaling.
    pub fn is_ok(&self) -> bool {
        self.raw_reading < SATURATION_COUNTS
    }
}
