// RobotClass joystick-slider, two 16-bit axes behind an I2C MCU

use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;

pub const DEFAULT_ADDR: u8 = 0x20;

const GET_SENSOR: u8 = 0xBA;

pub struct Slider<I2C> {
    dev: I2cDevice<I2C>,
}

impl<I2C: I2c> Slider<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_addr(i2c, DEFAULT_ADDR)
    }

    pub fn new_with_addr(i2c: I2C, addr: u8) -> Self {
        Self {
            dev: I2cDevice::new(i2c, addr),
        }
    }

    /// Raw (x, y) position.
    pub fn xy(&mut self) -> Result<(u16, u16), I2C::Error> {
        let mut buf = [0u8; 4];
        self.dev.write_stop_read(&[GET_SENSOR], &mut buf)?;
        Ok((
            u16::from_le_bytes([buf[0], buf[1]]),
            u16::from_le_bytes([buf[2], buf[3]]),
        ))
    }

    pub fn release(self) -> I2C {
        self.dev.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;

    #[test]
    fn axes_little_endian() {
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDR, vec![0xBA]),
            I2cTransaction::read(DEFAULT_ADDR, vec![0xFF, 0x03, 0x00, 0x02]),
            I2cTransaction::write(0x21, vec![0xBA]),
            I2cTransaction::read(0x21, vec![0x00, 0x00, 0xFF, 0xFF]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let mut slider = Slider::new(i2c.clone());
        assert_eq!(slider.xy().unwrap(), (1023, 512));

        let mut other = Slider::new_with_addr(slider.release(), 0x21);
        assert_eq!(other.xy().unwrap(), (0, u16::MAX));
        i2c.done();
    }

    #[test]
    fn nack_propagates() {
        let expectations = [
            I2cTransaction::write(DEFAULT_ADDR, vec![0xBA]),
            I2cTransaction::read(DEFAULT_ADDR, vec![0; 4]).with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut slider = Slider::new(i2c.clone());

        assert_eq!(slider.xy(), Err(ErrorKind::Other));
        i2c.done();
    }
}
