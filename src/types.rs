use crate::hw_def::*;

use core::{fmt, ops::BitOr};

#[cfg(feature="defmt")]
use defmt::Format;

/// A raw register value that does not encode any setting
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutOfRange(pub u8);

/// Sensor power mode, bits [1:0] of ctrl_meas
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// no measurements, lowest power; the state after reset
    #[default]
    Sleep,
    /// one measurement, then back to sleep
    Forced,
    /// continuous measurements separated by the standby time
    Normal,
}
impl Mode {
    /// Register bits for this mode
    pub fn bits(&self) -> u8 {
        match self {
            Mode::Sleep => 0b00,
            Mode::Forced => 0b01,
            Mode::Normal => 0b11,
        }
    }
}
impl TryFrom<u8> for Mode {
    type Error = OutOfRange;
    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0b00 => Ok(Mode::Sleep),
            0b01 | 0b10 => Ok(Mode::Forced),
            0b11 => Ok(Mode::Normal),
            _ => Err(OutOfRange(bits)),
        }
    }
}

/// Oversampling of one measurement channel
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Oversampling {
    /// channel not measured; the output reads 0x80000 (0x8000 for humidity)
    #[default]
    Skipped,
    /// 1 sample
    X1,
    /// 2 samples
    X2,
    /// 4 samples
    X4,
    /// 8 samples
    X8,
    /// 16 samples
    X16,
}
impl Oversampling {
    /// Register bits for this oversampling
    pub fn bits(&self) -> u8 {
        match self {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 3,
            Oversampling::X8 => 4,
            Oversampling::X16 => 5,
        }
    }
    /// Number of ADC samples averaged per measurement
    pub fn samples(&self) -> u32 {
        match self {
            Oversampling::Skipped => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }
}
impl TryFrom<u8> for Oversampling {
    type Error = OutOfRange;
    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0 => Ok(Oversampling::Skipped),
            1 => Ok(Oversampling::X1),
            2 => Ok(Oversampling::X2),
            3 => Ok(Oversampling::X4),
            4 => Ok(Oversampling::X8),
            5 => Ok(Oversampling::X16),
            _ => Err(OutOfRange(bits)),
        }
    }
}

/// IIR filter time constant
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Filter {
    /// filter off
    #[default]
    Off,
    /// coefficient 2
    Coeff2,
    /// coefficient 4
    Coeff4,
    /// coefficient 8
    Coeff8,
    /// coefficient 16
    Coeff16,
}
impl Filter {
    /// Register bits for this filter setting
    pub fn bits(&self) -> u8 {
        match self {
            Filter::Off => 0,
            Filter::Coeff2 => 1,
            Filter::Coeff4 => 2,
            Filter::Coeff8 => 3,
            Filter::Coeff16 => 4,
        }
    }
}
impl TryFrom<u8> for Filter {
    type Error = OutOfRange;
    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0 => Ok(Filter::Off),
            1 => Ok(Filter::Coeff2),
            2 => Ok(Filter::Coeff4),
            3 => Ok(Filter::Coeff8),
            4 => Ok(Filter::Coeff16),
            _ => Err(OutOfRange(bits)),
        }
    }
}

/// Inactive duration between measurements in normal mode
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StandbyTime {
    /// 0.5 ms
    #[default]
    Ms0_5,
    /// 62.5 ms
    Ms62_5,
    /// 125 ms
    Ms125,
    /// 250 ms
    Ms250,
    /// 500 ms
    Ms500,
    /// 1000 ms
    Ms1000,
    /// 10 ms
    Ms10,
    /// 20 ms
    Ms20,
}
impl StandbyTime {
    /// Register bits for this standby time
    pub fn bits(&self) -> u8 {
        match self {
            StandbyTime::Ms0_5 => 0,
            StandbyTime::Ms62_5 => 1,
            StandbyTime::Ms125 => 2,
            StandbyTime::Ms250 => 3,
            StandbyTime::Ms500 => 4,
            StandbyTime::Ms1000 => 5,
            StandbyTime::Ms10 => 6,
            StandbyTime::Ms20 => 7,
        }
    }
}
impl TryFrom<u8> for StandbyTime {
    type Error = OutOfRange;
    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            0 => Ok(StandbyTime::Ms0_5),
            1 => Ok(StandbyTime::Ms62_5),
            2 => Ok(StandbyTime::Ms125),
            3 => Ok(StandbyTime::Ms250),
            4 => Ok(StandbyTime::Ms500),
            5 => Ok(StandbyTime::Ms1000),
            6 => Ok(StandbyTime::Ms10),
            7 => Ok(StandbyTime::Ms20),
            _ => Err(OutOfRange(bits)),
        }
    }
}

/// Mirror of the device's ctrl_hum, ctrl_meas and config registers
///
/// The default is the device's power-on state.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Settings {
    /// power mode
    pub mode: Mode,
    /// pressure oversampling
    pub osr_p: Oversampling,
    /// temperature oversampling
    pub osr_t: Oversampling,
    /// humidity oversampling
    pub osr_h: Oversampling,
    /// IIR filter coefficient
    pub filter: Filter,
    /// standby time in normal mode
    pub standby_time: StandbyTime,
    /// 3-wire SPI interface enabled
    pub spi3w_enabled: bool,
}
impl Settings {
    /// Worst-case duration of one conversion with these oversampling settings, in microseconds
    pub fn max_measurement_time_us(&self) -> u32 {
        let mut t_us = 1250 + 2300 * self.osr_t.samples();
        if self.osr_p != Oversampling::Skipped {
            t_us += 2300 * self.osr_p.samples() + 575;
        }
        if self.osr_h != Oversampling::Skipped {
            t_us += 2300 * self.osr_h.samples() + 575;
        }
        t_us
    }
}

/// Bounds on the retry loops used while bringing the device up and measuring
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// reads of the identity register before giving up
    pub identify_attempts: u8,
    /// delay between identity reads
    pub identify_delay_ms: u32,
    /// status polls waiting for the NVM copy after reset
    pub nvm_poll_attempts: u8,
    /// delay before each status poll
    pub nvm_poll_delay_ms: u32,
    /// status polls waiting for a forced conversion to finish
    pub measure_poll_attempts: u8,
    /// delay between those polls
    pub measure_poll_delay_ms: u32,
}
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            identify_attempts: 5,
            identify_delay_ms: 1,
            nvm_poll_attempts: 5,
            nvm_poll_delay_ms: 2,
            measure_poll_attempts: 10,
            measure_poll_delay_ms: 1,
        }
    }
}

/// Uncompensated ADC counts from one burst read of the data registers
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RawSample {
    /// 20-bit pressure count
    pub pressure: u32,
    /// 20-bit temperature count
    pub temperature: u32,
    /// 16-bit humidity count
    pub humidity: u32,
}
impl From<&[u8; DATA_LEN]> for RawSample {
    fn from(buf: &[u8; DATA_LEN]) -> Self {
        Self {
            pressure: concat_20bit(buf[0], buf[1], buf[2]),
            temperature: concat_20bit(buf[3], buf[4], buf[5]),
            humidity: (buf[6] as u32) << 8 | buf[7] as u32,
        }
    }
}

fn concat_20bit(msb: u8, lsb: u8, xlsb: u8) -> u32 {
    (msb as u32) << 12 | (lsb as u32) << 4 | (xlsb as u32) >> 4
}

/// Calibrated output of one measurement cycle
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CompensatedSample {
    /// hundredths of a degree centigrade, in [-4000, 8500]
    pub temperature: i32,
    /// pascal, in [30000, 110000]
    pub pressure: u32,
    /// 1/1024 %RH, in [0, 102400]
    pub humidity: u32,
}
impl CompensatedSample {
    /// Get temperature in Centigrade
    pub fn celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }
    /// Get pressure in hectopascal
    pub fn hectopascals(&self) -> f32 {
        self.pressure as f32 / 100.0
    }
    /// Get relative humidity in percent
    pub fn humidity_percent(&self) -> f32 {
        self.humidity as f32 / 1024.0
    }
}

/// Selects which channels a measurement cycle compensates
///
/// Pressure and humidity both need the fine temperature, so temperature is
/// compensated whenever any channel is selected.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Compensate(u8);
impl Compensate {
    /// pressure
    pub const PRESS: Compensate = Compensate(1);
    /// temperature
    pub const TEMP: Compensate = Compensate(1 << 1);
    /// humidity
    pub const HUM: Compensate = Compensate(1 << 2);
    /// all three channels
    pub const ALL: Compensate = Compensate(0x07);

    /// Raw selection bits
    pub fn bits(&self) -> u8 {
        self.0
    }
    /// True if every channel in `other` is selected
    pub fn contains(&self, other: Compensate) -> bool {
        self.0 & other.0 == other.0
    }
    /// True if no channel is selected
    pub fn is_empty(&self) -> bool {
        self.0 & Self::ALL.0 == 0
    }
}
impl BitOr for Compensate {
    type Output = Compensate;
    fn bitor(self, rhs: Self) -> Self::Output {
        Compensate(self.0 | rhs.0)
    }
}

/// Status bits from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusBits {
    raw: u8,
    /// a conversion is running
    pub measuring: bool,
    /// NVM data are being copied to the image registers
    pub im_update: bool,
}
impl From<u8> for StatusBits {
    fn from(raw: u8) -> Self {
        Self {
            raw,
            measuring: (raw >> STATUS_FIELD_LSBIT_MEASURING) & 1 != 0,
            im_update: (raw >> STATUS_FIELD_LSBIT_IM_UPDATE) & 1 != 0,
        }
    }
}
impl StatusBits {
    /// Get the raw status bits
    pub fn raw(&self) -> u8 {
        self.raw
    }
}
impl fmt::Display for StatusBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusBits {{ 0x{:02x}; ", self.raw)?;
        if self.measuring {
            write!(f, "measuring ")?;
        }
        if self.im_update {
            write!(f, "im_update ")?;
        }
        write!(f, "}}")
    }
}
