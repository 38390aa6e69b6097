//! Register map and fixed protocol constants of the BME280.

#[cfg(feature = "defmt")]
use defmt::Format;

/// 7-bit I²C address of the device, selected by the SDO pin strap
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum I2cAddr {
    /// SDO tied to GND
    #[default]
    Primary,
    /// SDO tied to VDDIO
    Secondary,
}
impl I2cAddr {
    /// Get the address as a u8
    pub fn as_u8(&self) -> u8 {
        match self {
            I2cAddr::Primary => 0x76,
            I2cAddr::Secondary => 0x77,
        }
    }
}

/// Value of the identity register for a BME280
pub const CHIP_ID_BME280: u8 = 0x60;
/// Writing this to the reset register triggers a power-on reset
pub const SOFT_RESET_COMMAND: u8 = 0xB6;

pub(crate) const REG_CHIP_ID: u8 = 0xD0;
pub(crate) const REG_RESET: u8 = 0xE0;
pub(crate) const REG_CTRL_HUM: u8 = 0xF2;
pub(crate) const REG_STATUS: u8 = 0xF3;
pub(crate) const REG_CTRL_MEAS: u8 = 0xF4;
pub(crate) const REG_CONFIG: u8 = 0xF5;
pub(crate) const REG_DATA: u8 = 0xF7;
pub(crate) const REG_CALIB_TEMP_PRESS: u8 = 0x88;
pub(crate) const REG_CALIB_HUM: u8 = 0xE1;

/// Set on the register pointer of a multi-byte read to request auto-increment
pub(crate) const BURST_READ_FLAG: u8 = 0x80;

pub(crate) const DATA_LEN: usize = 8;
pub(crate) const CALIB_TEMP_PRESS_LEN: usize = 26;
pub(crate) const CALIB_HUM_LEN: usize = 7;

// ctrl_hum
pub(crate) const CTRL_HUM_OSRS_H_MASK: u8 = 0x07;
pub(crate) const CTRL_HUM_OSRS_H_LSBIT: u8 = 0;
// ctrl_meas
pub(crate) const CTRL_MEAS_OSRS_T_MASK: u8 = 0xE0;
pub(crate) const CTRL_MEAS_OSRS_T_LSBIT: u8 = 5;
pub(crate) const CTRL_MEAS_OSRS_P_MASK: u8 = 0x1C;
pub(crate) const CTRL_MEAS_OSRS_P_LSBIT: u8 = 2;
pub(crate) const CTRL_MEAS_MODE_MASK: u8 = 0x03;
pub(crate) const CTRL_MEAS_MODE_LSBIT: u8 = 0;
// config
pub(crate) const CONFIG_T_SB_MASK: u8 = 0xE0;
pub(crate) const CONFIG_T_SB_LSBIT: u8 = 5;
pub(crate) const CONFIG_FILTER_MASK: u8 = 0x1C;
pub(crate) const CONFIG_FILTER_LSBIT: u8 = 2;
pub(crate) const CONFIG_SPI3W_EN_MASK: u8 = 0x01;
pub(crate) const CONFIG_SPI3W_EN_LSBIT: u8 = 0;
// status
pub(crate) const STATUS_FIELD_LSBIT_MEASURING: u8 = 3;
pub(crate) const STATUS_FIELD_LSBIT_IM_UPDATE: u8 = 0;

/// Time from a soft reset until the NVM copy may be polled
pub(crate) const STARTUP_DELAY_MS: u32 = 2;

/// Compensated output limits
pub(crate) const TEMPERATURE_MIN: i32 = -4000;
pub(crate) const TEMPERATURE_MAX: i32 = 8500;
pub(crate) const PRESSURE_MIN: u32 = 30000;
pub(crate) const PRESSURE_MAX: u32 = 110000;
pub(crate) const HUMIDITY_MAX: u32 = 102400;
pub(crate) const HUMIDITY_INTERMEDIATE_MAX: i32 = 419430400;
