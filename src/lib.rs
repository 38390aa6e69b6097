//! This is a platform-agnostic Rust driver for the Bosch BME280 combined pressure, temperature
//! and humidity sensor using the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//!
//! This driver allows you to:
//! - Bring the sensor up: identify it, soft reset it, wait for the NVM copy and load its
//!   factory calibration, all with bounded retries.
//! - Set pressure, temperature and humidity oversampling.
//! - Set the power mode (sleep, forced, normal).
//! - Set the IIR filter coefficient and the normal-mode standby time.
//! - Enable/disable the 3-wire SPI interface.
//! - Read the power mode and the status bits.
//! - Trigger a forced measurement or read the latest normal-mode measurement, compensated with
//!   the reference fixed-point algorithm.
//!
//! This driver does not yet support the following device features:
//! - SPI transport.
//! - Floating point or 64-bit compensation variants.
//!
//! ## Features
//!
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Units
//!
//! - Temperature: hundredths of a degree centigrade (2508 = 25.08 °C)
//! - Pressure: pascal (100654 = 1006.54 hPa)
//! - Humidity: 1/1024 %RH (56317 = 54.99 %RH)
//!
//! Datasheet:
//!   [BME280](https://www.bosch-sensortec.com/media/boschsensortec/downloads/datasheets/bst-bme280-ds002.pdf)
//!
//! To use this driver, import this crate and an `embedded_hal` implementation, then instantiate
//! the device.
//!
//! ## Example:
//!
//! ```ignore
//! use bme280_core::{Bme280, Compensate, I2cAddr, Oversampling};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//!
//! let mut bme280 = Bme280::new(i2c, delay, I2cAddr::Primary);
//! bme280.init().unwrap();
//! bme280.set_humidity_oversampling(Oversampling::X1).unwrap();
//! bme280.set_temperature_oversampling(Oversampling::X1).unwrap();
//! bme280.set_pressure_oversampling(Oversampling::X1).unwrap();
//!
//! loop {
//!     match bme280.measure(Compensate::ALL) {
//!         Ok(sample) => println!("{:0.2} °C, {:0.2} hPa, {:0.1} %RH",
//!             sample.celsius(),
//!             sample.hectopascals(),
//!             sample.humidity_percent()),
//!         // a failed read means the device needs a fresh bring-up
//!         Err(_) => {
//!             let settings = *bme280.settings();
//!             if bme280.init().is_ok() {
//!                 bme280.configure(&settings).ok();
//!             }
//!         }
//!     }
//!
//!     // Platform-specific: sleep a while
//!     sleep_secs(60);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![no_std]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

mod calibration;
mod compensation;
mod device_impl;
mod hw_def;
mod types;

pub use crate::{calibration::*, device_impl::*, hw_def::{I2cAddr, CHIP_ID_BME280, SOFT_RESET_COMMAND}, types::*};
use crate::hw_def::*;

use embedded_hal::{delay::DelayNs, i2c::I2c};

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        use defmt::{debug, trace, warn};
    } else if #[cfg(feature = "log")] {
        use log::{debug, trace, warn};
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {{
                let _ = format_args!($($arg)*);
            }};
        }
        macro_rules! debug {
            ($($arg:tt)*) => {{
                let _ = format_args!($($arg)*);
            }};
        }
        macro_rules! warn {
            ($($arg:tt)*) => {{
                let _ = format_args!($($arg)*);
            }};
        }
    }
}

impl<E> Error<E> {
    fn into_comm_fail(self) -> Self {
        match self {
            Error::I2c(e) => Error::CommFail(e),
            other => other,
        }
    }
}

impl<I2C, Delay, E> Bme280<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new BME280 driver instance
    ///
    /// No bus traffic happens until [`init`](Self::init).
    pub fn new(i2c: I2C, delay: Delay, i2c_addr: I2cAddr) -> Self {
        Self {
            i2c,
            delay,
            i2c_addr,
            retry: RetryPolicy::default(),
            chip_id: None,
            calib: CalibrationData::default(),
            settings: Settings::default(),
            raw: RawSample::default(),
            data: None,
        }
    }

    /// Replace the retry bounds used by bring-up and forced measurements
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Destroy the driver and give back the bus and delay
    pub fn release(self) -> (I2C, Delay) {
        (self.i2c, self.delay)
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.i2c_addr.as_u8(), &[reg], &mut buf)
            .map_err(Error::I2c)?;
        Ok(buf[0])
    }

    // every byte but the last is ACKed and the stop is sent on failure too;
    // both are part of the HAL's write_read contract
    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .write_read(self.i2c_addr.as_u8(), &[reg | BURST_READ_FLAG], buf)
            .map_err(Error::I2c)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(self.i2c_addr.as_u8(), &[reg, value])
            .map_err(Error::I2c)
    }

    /// Read `reg`, replace the bits under `mask` with `bits` and write it back
    ///
    /// Returns the value the register held before the write.
    fn update_register(&mut self, reg: u8, mask: u8, bits: u8) -> Result<u8, Error<E>> {
        let current = self.read_register(reg)?;
        let value = (current & !mask) | (bits & mask);
        trace!("bme280::update_register(): reg={:#x} {:#x} -> {:#x}", reg, current, value);
        self.write_register(reg, value)?;
        Ok(current)
    }

    /// Bring the device to a known state
    ///
    /// Checks the chip id, soft resets the device, waits for the NVM copy to
    /// finish and loads the calibration data. Settings go back to the power-on
    /// defaults and previous samples are discarded. Calling this again repeats
    /// the full sequence.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.chip_id = None;
        self.data = None;
        self.raw = RawSample::default();

        let chip_id = self.identify()?;
        debug!("bme280::init(): found chip id {:#x}", chip_id);

        self.write_register(REG_RESET, SOFT_RESET_COMMAND)
            .map_err(Error::into_comm_fail)?;
        self.settings = Settings::default();

        self.wait_for_nvm_copy().map_err(Error::into_comm_fail)?;
        debug!("bme280::init(): NVM copy done");

        self.calib = self.load_calibration().map_err(Error::into_comm_fail)?;
        debug!("bme280::init(): calibration loaded");

        self.chip_id = Some(chip_id);
        Ok(())
    }

    fn identify(&mut self) -> Result<u8, Error<E>> {
        for attempt in 1..=self.retry.identify_attempts {
            match self.read_register(REG_CHIP_ID) {
                Ok(CHIP_ID_BME280) => return Ok(CHIP_ID_BME280),
                Ok(id) => {
                    warn!("bme280::identify(): attempt {}: unexpected chip id {:#x}", attempt, id);
                }
                Err(_) => {
                    trace!("bme280::identify(): attempt {}: no response", attempt);
                }
            }
            if attempt < self.retry.identify_attempts {
                self.delay.delay_ms(self.retry.identify_delay_ms);
            }
        }
        warn!("bme280::identify(): giving up after {} attempts", self.retry.identify_attempts);
        Err(Error::DeviceNotFound)
    }

    fn wait_for_nvm_copy(&mut self) -> Result<(), Error<E>> {
        self.delay.delay_ms(STARTUP_DELAY_MS);
        for _ in 0..self.retry.nvm_poll_attempts {
            if !self.read_status()?.im_update {
                return Ok(());
            }
            self.delay.delay_ms(self.retry.nvm_poll_delay_ms);
        }
        Err(Error::NvmCopyFailed)
    }

    fn load_calibration(&mut self) -> Result<CalibrationData, Error<E>> {
        let mut temp_press = [0u8; CALIB_TEMP_PRESS_LEN];
        self.read_registers(REG_CALIB_TEMP_PRESS, &mut temp_press)?;
        let mut hum = [0u8; CALIB_HUM_LEN];
        self.read_registers(REG_CALIB_HUM, &mut hum)?;
        Ok(CalibrationData::from_registers(&temp_press, &hum))
    }

    /// Set humidity oversampling
    ///
    /// ctrl_hum only takes effect after a write to ctrl_meas, so ctrl_meas is
    /// written back with its current value. If that fails, ctrl_hum is
    /// restored so a later ctrl_meas write can not latch the new value.
    pub fn set_humidity_oversampling(&mut self, osr: Oversampling) -> Result<(), Error<E>> {
        let ctrl_hum = self.update_register(REG_CTRL_HUM, CTRL_HUM_OSRS_H_MASK, osr.bits() << CTRL_HUM_OSRS_H_LSBIT)?;
        let latched = self
            .read_register(REG_CTRL_MEAS)
            .and_then(|ctrl_meas| self.write_register(REG_CTRL_MEAS, ctrl_meas));
        if let Err(e) = latched {
            warn!("bme280::set_humidity_oversampling(): ctrl_meas latch failed, restoring ctrl_hum");
            // the latch error is the one reported even if the restore fails too
            let _ = self.write_register(REG_CTRL_HUM, ctrl_hum);
            return Err(e);
        }
        self.settings.osr_h = osr;
        Ok(())
    }

    /// Set temperature oversampling
    pub fn set_temperature_oversampling(&mut self, osr: Oversampling) -> Result<(), Error<E>> {
        self.update_register(REG_CTRL_MEAS, CTRL_MEAS_OSRS_T_MASK, osr.bits() << CTRL_MEAS_OSRS_T_LSBIT)?;
        self.settings.osr_t = osr;
        Ok(())
    }

    /// Set pressure oversampling
    pub fn set_pressure_oversampling(&mut self, osr: Oversampling) -> Result<(), Error<E>> {
        self.update_register(REG_CTRL_MEAS, CTRL_MEAS_OSRS_P_MASK, osr.bits() << CTRL_MEAS_OSRS_P_LSBIT)?;
        self.settings.osr_p = osr;
        Ok(())
    }

    /// Set the power mode
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<E>> {
        self.update_register(REG_CTRL_MEAS, CTRL_MEAS_MODE_MASK, mode.bits() << CTRL_MEAS_MODE_LSBIT)?;
        self.settings.mode = mode;
        Ok(())
    }

    /// Set the power mode from its raw 2-bit encoding
    ///
    /// Values above 3 are rejected without touching the bus.
    pub fn set_mode_bits(&mut self, bits: u8) -> Result<(), Error<E>> {
        let mode = Mode::try_from(bits)?;
        self.set_mode(mode)
    }

    /// Put the device in sleep mode
    pub fn set_sleep_mode(&mut self) -> Result<(), Error<E>> {
        self.set_mode(Mode::Sleep)
    }

    /// Put the device in forced mode, starting one conversion
    pub fn set_forced_mode(&mut self) -> Result<(), Error<E>> {
        self.set_mode(Mode::Forced)
    }

    /// Put the device in normal mode
    pub fn set_normal_mode(&mut self) -> Result<(), Error<E>> {
        self.set_mode(Mode::Normal)
    }

    /// Set the inactive time between normal-mode conversions
    pub fn set_standby_time(&mut self, standby_time: StandbyTime) -> Result<(), Error<E>> {
        self.update_register(REG_CONFIG, CONFIG_T_SB_MASK, standby_time.bits() << CONFIG_T_SB_LSBIT)?;
        self.settings.standby_time = standby_time;
        Ok(())
    }

    /// Set the IIR filter coefficient
    pub fn set_filter(&mut self, filter: Filter) -> Result<(), Error<E>> {
        self.update_register(REG_CONFIG, CONFIG_FILTER_MASK, filter.bits() << CONFIG_FILTER_LSBIT)?;
        self.settings.filter = filter;
        Ok(())
    }

    /// Enable the 3-wire SPI interface
    pub fn enable_spi3w(&mut self) -> Result<(), Error<E>> {
        self.set_spi3w(true)
    }

    /// Disable the 3-wire SPI interface
    pub fn disable_spi3w(&mut self) -> Result<(), Error<E>> {
        self.set_spi3w(false)
    }

    fn set_spi3w(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.update_register(REG_CONFIG, CONFIG_SPI3W_EN_MASK, (enabled as u8) << CONFIG_SPI3W_EN_LSBIT)?;
        self.settings.spi3w_enabled = enabled;
        Ok(())
    }

    /// Apply every field of `settings`
    ///
    /// The device is put to sleep first because config writes may be ignored
    /// in normal mode; the requested mode is set last.
    pub fn configure(&mut self, settings: &Settings) -> Result<(), Error<E>> {
        self.set_sleep_mode()?;
        self.set_humidity_oversampling(settings.osr_h)?;
        self.set_temperature_oversampling(settings.osr_t)?;
        self.set_pressure_oversampling(settings.osr_p)?;
        self.set_standby_time(settings.standby_time)?;
        self.set_filter(settings.filter)?;
        self.set_spi3w(settings.spi3w_enabled)?;
        self.set_mode(settings.mode)
    }

    /// Read the power mode from the device
    pub fn read_mode(&mut self) -> Result<Mode, Error<E>> {
        let ctrl_meas = self.read_register(REG_CTRL_MEAS)?;
        let mode = Mode::try_from((ctrl_meas & CTRL_MEAS_MODE_MASK) >> CTRL_MEAS_MODE_LSBIT)?;
        self.settings.mode = mode;
        Ok(mode)
    }

    /// Read the status register
    pub fn read_status(&mut self) -> Result<StatusBits, Error<E>> {
        Ok(StatusBits::from(self.read_register(REG_STATUS)?))
    }

    /// Read the data registers and compensate the selected channels
    ///
    /// Returns the latest conversion without starting a new one.
    pub fn read_data(&mut self, select: Compensate) -> Result<CompensatedSample, Error<E>> {
        if self.chip_id.is_none() {
            return Err(Error::Uninitialized);
        }
        let mut buf = [0u8; DATA_LEN];
        self.read_registers(REG_DATA, &mut buf)?;
        self.raw = RawSample::from(&buf);

        let mut data = self.data.unwrap_or_default();
        self.calib.compensate(&self.raw, select, &mut data);
        self.data = Some(data);
        Ok(data)
    }

    /// Measure and compensate the selected channels
    ///
    /// In sleep or forced mode this triggers a forced conversion and waits for
    /// it; in normal mode it reads the latest conversion.
    pub fn measure(&mut self, select: Compensate) -> Result<CompensatedSample, Error<E>> {
        if self.chip_id.is_none() {
            return Err(Error::Uninitialized);
        }
        if self.settings.mode != Mode::Normal {
            self.set_forced_mode()?;
            self.delay.delay_us(self.settings.max_measurement_time_us());
            let converted = self.wait_for_conversion();
            // the device drops back to sleep on its own after a forced conversion
            self.settings.mode = Mode::Sleep;
            converted?;
        }
        self.read_data(select)
    }

    fn wait_for_conversion(&mut self) -> Result<(), Error<E>> {
        for _ in 0..self.retry.measure_poll_attempts {
            if !self.read_status()?.measuring {
                return Ok(());
            }
            self.delay.delay_ms(self.retry.measure_poll_delay_ms);
        }
        warn!("bme280::wait_for_conversion(): still measuring");
        Err(Error::Timeout)
    }

    /// Chip id read during the last successful [`init`](Self::init)
    pub fn chip_id(&self) -> Option<u8> {
        self.chip_id
    }

    /// Settings as last written to the device
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Calibration loaded by the last successful [`init`](Self::init)
    pub fn calibration(&self) -> Option<&CalibrationData> {
        self.chip_id.map(|_| &self.calib)
    }

    /// Raw counts from the last data read
    pub fn raw_sample(&self) -> &RawSample {
        &self.raw
    }

    /// Last compensated sample, if a measurement ran since the last [`init`](Self::init)
    pub fn last_sample(&self) -> Option<&CompensatedSample> {
        self.data.as_ref()
    }
}
