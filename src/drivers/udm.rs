// RobotClass UDM ultrasonic ranger
//
// Same read protocol as the keypad: register write, 1ms while the MCU
// prepares the reply, then a separate read.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;

pub const DEFAULT_ADDR: u8 = 0x34;

const SETTLE_MS: u32 = 1;

mod reg {
    pub const GET_SENSOR: u8 = 0xB0;
    pub const GET_VERSION: u8 = 0xB1;
    pub const SET_FILTER: u8 = 0xC0;
}

pub struct Udm<I2C, D> {
    dev: I2cDevice<I2C>,
    delay: D,
}

impl<I2C, D> Udm<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::new_with_addr(i2c, delay, DEFAULT_ADDR)
    }

    pub fn new_with_addr(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            dev: I2cDevice::new(i2c, addr),
            delay,
        }
    }

    /// Last measured distance as reported by the sensor.
    pub fn distance(&mut self) -> Result<u16, I2C::Error> {
        let buf = self.read_register(reg::GET_SENSOR)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn version(&mut self) -> Result<u8, I2C::Error> {
        // second byte is unused
        Ok(self.read_register(reg::GET_VERSION)?[0])
    }

    /// Enable the on-board smoothing filter.
    pub fn filter_set(&mut self) -> Result<(), I2C::Error> {
        self.dev.write(&[reg::SET_FILTER, 0x01])
    }

    pub fn filter_unset(&mut self) -> Result<(), I2C::Error> {
        self.dev.write(&[reg::SET_FILTER, 0x00])
    }

    pub fn release(self) -> (I2C, D) {
        (self.dev.release(), self.delay)
    }

    fn read_register(&mut self, register: u8) -> Result<[u8; 2], I2C::Error> {
        let mut buf = [0u8; 2];
        self.dev
            .write_then_read(&[register], &mut self.delay, SETTLE_MS, &mut buf)?;
        Ok(buf)
    }
}
