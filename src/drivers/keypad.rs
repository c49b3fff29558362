// RobotClass MechMod keypad (3x4 switch matrix behind an I2C MCU)
//
// The scanner reports all keys as a 16-bit little-endian bitmap, bit b
// being key b in row-major order. Reads are a register write, a 1ms
// settle while the MCU latches the answer, then a separate read.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;

pub const DEFAULT_ADDR: u8 = 0x22;
pub const DEFAULT_COLS: u8 = 3;
pub const DEFAULT_ROWS: u8 = 4;

const SETTLE_MS: u32 = 1;

mod reg {
    pub const GET_STATE: u8 = 0xA0;
    pub const SET_LED: u8 = 0xB0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub col: u8,
    pub row: u8,
}

/// One scan of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    bits: u16,
    cols: u8,
    rows: u8,
}

impl KeyState {
    pub const fn raw(&self) -> u16 {
        self.bits
    }

    pub fn is_pressed(&self, col: u8, row: u8) -> bool {
        if col >= self.cols || row >= self.rows {
            return false;
        }
        let idx = row as u32 * self.cols as u32 + col as u32;
        idx < 16 && self.bits & (1 << idx) != 0
    }

    /// Pressed keys, row by row, left to right.
    pub fn pressed(self) -> impl Iterator<Item = Key> {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| Key { col, row }))
            .filter(move |k| self.is_pressed(k.col, k.row))
    }

    pub fn count(&self) -> usize {
        self.pressed().count()
    }
}

pub struct KeyPad<I2C, D> {
    dev: I2cDevice<I2C>,
    delay: D,
    cols: u8,
    rows: u8,
}

impl<I2C, D> KeyPad<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::new_with_layout(i2c, delay, DEFAULT_ADDR, DEFAULT_COLS, DEFAULT_ROWS)
    }

    pub fn new_with_layout(i2c: I2C, delay: D, addr: u8, cols: u8, rows: u8) -> Self {
        Self {
            dev: I2cDevice::new(i2c, addr),
            delay,
            cols,
            rows,
        }
    }

    pub fn state_raw(&mut self) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.dev.write_then_read(
            &[reg::GET_STATE, 0x00, 0x00],
            &mut self.delay,
            SETTLE_MS,
            &mut buf,
        )?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn state(&mut self) -> Result<KeyState, I2C::Error> {
        Ok(KeyState {
            bits: self.state_raw()?,
            cols: self.cols,
            rows: self.rows,
        })
    }

    pub fn set_led(&mut self, on: bool) -> Result<(), I2C::Error> {
        self.dev.write(&[reg::SET_LED, on as u8, 0x00])
    }

    pub fn release(self) -> (I2C, D) {
        (self.dev.release(), self.delay)
    }
}
