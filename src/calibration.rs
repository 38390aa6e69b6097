//! Factory calibration coefficients and their register layout.
//!
//! The two calibration blocks share a byte: the last byte of the
//! temperature/pressure block at 0x88 is `dig_H1`, the first humidity
//! coefficient. The remaining humidity coefficients live at 0xE1, where
//! `dig_H4` and `dig_H5` are 12-bit signed values packed across three bytes.

use crate::hw_def::{CALIB_HUM_LEN, CALIB_TEMP_PRESS_LEN};

#[cfg(feature="defmt")]
use defmt::Format;

/// Per-device compensation coefficients read from the sensor's NVM
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CalibrationData {
    /// temperature coefficient T1
    pub dig_t1: u16,
    /// temperature coefficient T2
    pub dig_t2: i16,
    /// temperature coefficient T3
    pub dig_t3: i16,
    /// pressure coefficient P1
    pub dig_p1: u16,
    /// pressure coefficient P2
    pub dig_p2: i16,
    /// pressure coefficient P3
    pub dig_p3: i16,
    /// pressure coefficient P4
    pub dig_p4: i16,
    /// pressure coefficient P5
    pub dig_p5: i16,
    /// pressure coefficient P6
    pub dig_p6: i16,
    /// pressure coefficient P7
    pub dig_p7: i16,
    /// pressure coefficient P8
    pub dig_p8: i16,
    /// pressure coefficient P9
    pub dig_p9: i16,
    /// humidity coefficient H1
    pub dig_h1: u8,
    /// humidity coefficient H2
    pub dig_h2: i16,
    /// humidity coefficient H3
    pub dig_h3: u8,
    /// humidity coefficient H4 (12-bit signed)
    pub dig_h4: i16,
    /// humidity coefficient H5 (12-bit signed)
    pub dig_h5: i16,
    /// humidity coefficient H6
    pub dig_h6: i8,
    /// fine temperature left behind by the last temperature compensation
    pub(crate) t_fine: i32,
}

impl CalibrationData {
    /// Parse the 26-byte block at 0x88 and the 7-byte block at 0xE1
    pub fn from_registers(
        temp_press: &[u8; CALIB_TEMP_PRESS_LEN],
        hum: &[u8; CALIB_HUM_LEN],
    ) -> Self {
        Self {
            dig_t1: u16_le(temp_press, 0),
            dig_t2: i16_le(temp_press, 2),
            dig_t3: i16_le(temp_press, 4),
            dig_p1: u16_le(temp_press, 6),
            dig_p2: i16_le(temp_press, 8),
            dig_p3: i16_le(temp_press, 10),
            dig_p4: i16_le(temp_press, 12),
            dig_p5: i16_le(temp_press, 14),
            dig_p6: i16_le(temp_press, 16),
            dig_p7: i16_le(temp_press, 18),
            dig_p8: i16_le(temp_press, 20),
            dig_p9: i16_le(temp_press, 22),
            // byte 24 (0xA0) is reserved
            dig_h1: temp_press[25],
            dig_h2: i16_le(hum, 0),
            dig_h3: hum[2],
            dig_h4: i12_packed_h4(hum[3], hum[4]),
            dig_h5: i12_packed_h5(hum[4], hum[5]),
            dig_h6: hum[6] as i8,
            t_fine: 0,
        }
    }

    /// Fine temperature from the most recent temperature compensation
    pub fn t_fine(&self) -> i32 {
        self.t_fine
    }
}

pub(crate) fn u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

pub(crate) fn i16_le(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// H4: signed byte 0xE4 as bits [11:4], low nibble of 0xE5 as bits [3:0]
pub(crate) fn i12_packed_h4(msb: u8, shared: u8) -> i16 {
    (msb as i8 as i16) * 16 | (shared & 0x0F) as i16
}

/// H5: signed byte 0xE6 as bits [11:4], high nibble of 0xE5 as bits [3:0]
pub(crate) fn i12_packed_h5(shared: u8, msb: u8) -> i16 {
    (msb as i8 as i16) * 16 | (shared >> 4) as i16
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Calibration block from a datasheet-style example device
    pub(crate) const TEMP_PRESS_BLOCK: [u8; CALIB_TEMP_PRESS_LEN] = [
        0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B,
        0x8C, 0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17, 0x00, 0x4B,
    ];
    pub(crate) const HUM_BLOCK: [u8; CALIB_HUM_LEN] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];

    pub(crate) fn example_calibration() -> CalibrationData {
        CalibrationData {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
            dig_h1: 75,
            dig_h2: 362,
            dig_h3: 0,
            dig_h4: 313,
            dig_h5: 50,
            dig_h6: 30,
            t_fine: 0,
        }
    }

    #[test]
    fn parse_example_blocks() {
        assert_eq!(
            CalibrationData::from_registers(&TEMP_PRESS_BLOCK, &HUM_BLOCK),
            example_calibration()
        );
    }

    #[test]
    fn h1_is_last_byte_of_first_block() {
        let mut temp_press = TEMP_PRESS_BLOCK;
        temp_press[24] = 0xAA;
        temp_press[25] = 0xC8;
        let calib = CalibrationData::from_registers(&temp_press, &HUM_BLOCK);
        assert_eq!(calib.dig_h1, 200);
        assert_eq!(calib.dig_p9, 6000);
    }

    #[test]
    fn packed_h4_h5_share_middle_byte() {
        // 0xE4 = 0x13, 0xE5 = 0x29, 0xE6 = 0x03
        assert_eq!(i12_packed_h4(0x13, 0x29), 0x139);
        assert_eq!(i12_packed_h5(0x29, 0x03), 0x032);
    }

    #[test]
    fn packed_h4_h5_negative() {
        // all ones is -1, not 0xFFF
        assert_eq!(i12_packed_h4(0xFF, 0x0F), -1);
        assert_eq!(i12_packed_h5(0xF0, 0xFF), -1);
        assert_eq!(i12_packed_h4(0x80, 0x00), -2048);
        assert_eq!(i12_packed_h5(0x00, 0x80), -2048);
        assert_eq!(i12_packed_h4(0xFE, 0xF5), -27);
        assert_eq!(i12_packed_h5(0xF5, 0xFE), -17);

        let calib = CalibrationData::from_registers(
            &TEMP_PRESS_BLOCK,
            &[0x00, 0x80, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
        );
        assert_eq!(calib.dig_h2, i16::MIN);
        assert_eq!(calib.dig_h3, 255);
        assert_eq!(calib.dig_h4, -1);
        assert_eq!(calib.dig_h5, -1);
        assert_eq!(calib.dig_h6, -1);
    }

    #[test]
    fn little_endian_fields() {
        let buf = [0x34, 0x12, 0xFE, 0xFF];
        assert_eq!(u16_le(&buf, 0), 0x1234);
        assert_eq!(i16_le(&buf, 2), -2);
    }
}
