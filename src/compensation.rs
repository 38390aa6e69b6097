//! Fixed-point compensation of raw ADC counts.
//!
//! Integer arithmetic only; divisions truncate toward zero and intermediate
//! products wrap at 32 bits so every input produces a value.

use crate::{
    calibration::CalibrationData,
    hw_def::*,
    types::{CompensatedSample, Compensate, RawSample},
};

impl CalibrationData {
    /// Compensate the selected channels of `raw` into `out`
    ///
    /// Temperature runs first whenever anything is selected, refreshing the
    /// fine temperature that pressure and humidity read. Channels that are not
    /// selected keep their previous value in `out`.
    pub fn compensate(&mut self, raw: &RawSample, select: Compensate, out: &mut CompensatedSample) {
        if select.is_empty() {
            return;
        }
        out.temperature = self.compensate_temperature(raw.temperature);
        if select.contains(Compensate::PRESS) {
            out.pressure = self.compensate_pressure(raw.pressure);
        }
        if select.contains(Compensate::HUM) {
            out.humidity = self.compensate_humidity(raw.humidity);
        }
    }

    /// Hundredths of °C; also stores the fine temperature
    pub(crate) fn compensate_temperature(&mut self, adc_t: u32) -> i32 {
        let t1 = self.dig_t1 as i32;
        let t2 = self.dig_t2 as i32;
        let t3 = self.dig_t3 as i32;

        let var1 = ((adc_t / 8) as i32).wrapping_sub(t1 * 2);
        let var1 = var1.wrapping_mul(t2) / 2048;
        let var2 = ((adc_t / 16) as i32).wrapping_sub(t1);
        let var2 = (var2.wrapping_mul(var2) / 4096).wrapping_mul(t3) / 16384;
        self.t_fine = var1.wrapping_add(var2);

        let temperature = self.t_fine.wrapping_mul(5).wrapping_add(128) / 256;
        temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)
    }

    /// Pascal; needs a fresh fine temperature
    pub(crate) fn compensate_pressure(&self, adc_p: u32) -> u32 {
        let var1 = self.t_fine / 2 - 64000;
        let var2 = ((var1 / 4).wrapping_mul(var1 / 4) / 2048).wrapping_mul(self.dig_p6 as i32);
        let var2 = var2.wrapping_add(var1.wrapping_mul(self.dig_p5 as i32).wrapping_mul(2));
        let var2 = (var2 / 4).wrapping_add((self.dig_p4 as i32) * 65536);
        let var3 = (self.dig_p3 as i32).wrapping_mul((var1 / 4).wrapping_mul(var1 / 4) / 8192) / 8;
        let var4 = (self.dig_p2 as i32).wrapping_mul(var1) / 2;
        let var1 = var3.wrapping_add(var4) / 262144;
        let var1 = (32768 + var1).wrapping_mul(self.dig_p1 as i32) / 32768;

        // the datasheet defines a zero denominator as the lower limit
        if var1 == 0 {
            return PRESSURE_MIN;
        }

        let var5 = 1048576u32.wrapping_sub(adc_p);
        let mut pressure = var5.wrapping_sub((var2 / 4096) as u32).wrapping_mul(3125);
        if pressure < 0x8000_0000 {
            pressure = (pressure << 1) / var1 as u32;
        } else {
            pressure = (pressure / var1 as u32).wrapping_mul(2);
        }
        let var1 = (self.dig_p9 as i32).wrapping_mul(((pressure / 8).wrapping_mul(pressure / 8) / 8192) as i32) / 4096;
        let var2 = ((pressure / 4) as i32).wrapping_mul(self.dig_p8 as i32) / 8192;
        let pressure = (pressure as i32).wrapping_add(var1.wrapping_add(var2).wrapping_add(self.dig_p7 as i32) / 16) as u32;

        pressure.clamp(PRESSURE_MIN, PRESSURE_MAX)
    }

    /// 1/1024 %RH; needs a fresh fine temperature
    pub(crate) fn compensate_humidity(&self, adc_h: u32) -> u32 {
        let var1 = self.t_fine.wrapping_sub(76800);
        let var2 = (adc_h as i32).wrapping_mul(16384);
        let var3 = (self.dig_h4 as i32).wrapping_mul(1048576);
        let var4 = (self.dig_h5 as i32).wrapping_mul(var1);
        let var5 = var2.wrapping_sub(var3).wrapping_sub(var4).wrapping_add(16384) / 32768;
        let var2 = var1.wrapping_mul(self.dig_h6 as i32) / 1024;
        let var3 = var1.wrapping_mul(self.dig_h3 as i32) / 2048;
        let var4 = (var2.wrapping_mul(var3.wrapping_add(32768)) / 1024).wrapping_add(2097152);
        let var2 = var4.wrapping_mul(self.dig_h2 as i32).wrapping_add(8192) / 16384;
        let var3 = var5.wrapping_mul(var2);
        let var4 = ((var3 / 32768).wrapping_mul(var3 / 32768)) / 128;
        let var5 = var3.wrapping_sub(var4.wrapping_mul(self.dig_h1 as i32) / 16);
        let var5 = var5.clamp(0, HUMIDITY_INTERMEDIATE_MAX);

        ((var5 / 4096) as u32).min(HUMIDITY_MAX)
    }
}
