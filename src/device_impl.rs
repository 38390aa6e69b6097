use crate::{calibration::CalibrationData, hw_def::I2cAddr, types::*};

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// BME280 device driver
///
/// Owns the bus and delay provider together with everything the driver knows
/// about the device: chip id, calibration, settings and the last samples.
#[derive(Debug)]
pub struct Bme280<I2C, Delay> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
    pub(crate) i2c_addr: I2cAddr,
    pub(crate) retry: RetryPolicy,
    pub(crate) chip_id: Option<u8>,
    pub(crate) calib: CalibrationData,
    pub(crate) settings: Settings,
    pub(crate) raw: RawSample,
    pub(crate) data: Option<CompensatedSample>,
}

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// identity register never read back as a BME280 within the retry bound
    DeviceNotFound,
    /// the NVM copy after reset did not finish within the retry bound
    NvmCopyFailed,
    /// I²C communication error part way through bring-up
    CommFail(E),
    /// a setting value outside its register encoding
    InvalidConfig,
    /// no calibration loaded; `init` has not completed
    Uninitialized,
    /// a forced conversion did not finish within the retry bound
    Timeout,
}
impl<E> From<OutOfRange> for Error<E> {
    fn from(_: OutOfRange) -> Self {
        Error::InvalidConfig
    }
}
impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {e:?}"),
            Error::DeviceNotFound => write!(f, "BME280 not found"),
            Error::NvmCopyFailed => write!(f, "NVM copy did not complete"),
            Error::CommFail(e) => write!(f, "communication failed during bring-up: {e:?}"),
            Error::InvalidConfig => write!(f, "invalid configuration value"),
            Error::Uninitialized => write!(f, "device not initialized"),
            Error::Timeout => write!(f, "measurement timed out"),
        }
    }
}
