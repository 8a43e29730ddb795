use crate::Result;

/// A pair of bulk endpoints: commands go out on one, responses come back on the other.
pub trait Driver {
    /// Writes `data` to the OUT endpoint and returns the number of bytes accepted.
    fn write(&self, data: &[u8]) -> Result<usize>;
    /// Reads one transfer from the IN endpoint into `data` and returns its length.
    fn read(&self, data: &mut [u8]) -> Result<usize>;
}

#[cfg(feature = "hardware")]
#[path = "usb.rs"]
pub mod imp;

#[cfg(not(feature = "hardware"))]
#[path = "stub.rs"]
pub mod imp;
