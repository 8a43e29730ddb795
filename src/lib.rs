mod sys;
mod config;
mod protocol;
mod calibration;
mod reading;
mod device;
mod source;
mod format;
mod table;
mod scheduler;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("device not connected")]
    NotFound,
    #[error("access denied to device on bus {bus} at address {address}")]
    PermissionDenied { bus: u8, address: u8 },
    #[error("unable to open endpoints")]
    EndpointUnavailable,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("invalid daysensor channel ratio: channel 0 count is zero")]
    Calibration,
    #[error("invalid sampling interval: {0} minutes")]
    InvalidInterval(f64),
    #[cfg(feature = "hardware")]
    #[error("USB error: {0}")]
    Usb(#[source] rusb::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// For `PermissionDenied`, the device node whose permissions need adjusting.
    pub fn device_node(&self) -> Option<String> {
        match self {
            Self::PermissionDenied { bus, address } =>
                Some(format!("/dev/bus/usb/{:03}/{:03}", bus, address)),
            _ => None
        }
    }
}

#[cfg(feature = "hardware")]
impl From<rusb::Error> for Error {
    fn from(error: rusb::Error) -> Self {
        match error {
            rusb::Error::NoDevice => Error::NotFound,
            error => Error::Usb(error),
        }
    }
}

pub type Result<T> =
    core::result::Result<T, Error>;

pub use config::{
    DeviceConfiguration,
    sampling_interval,
};

pub use protocol::{
    Command,
    ProtocolError,
    Range,
    LightFrame,
    decode_temperature,
};

pub use calibration::lux_from_channels;

pub use reading::Reading;

pub use sys::Driver;

pub type Device =
    device::Device<crate::sys::imp::LightmeterDriverImpl>;

pub use source::{
    Sampler,
    SourceKind,
    Source,
    SyntheticSource,
};

pub use format::{
    OutputFormat,
    RecordWriter,
};

pub use table::{
    FieldDescriptor,
    TableSchema,
    TableWriter,
    shorten_field_names,
};

pub use scheduler::Scheduler;
