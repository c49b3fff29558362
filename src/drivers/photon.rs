// RobotClass Photon display module
//
// A small screen with its own page/widget firmware. The host addresses
// widgets by index and pushes typed values; the module formats them.
// Each value type has its own command and frame layout, see Value.

use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;
use crate::error::Error;

pub const DEFAULT_ADDR: u8 = 0x25;

/// Longest text a single frame carries.
pub const MAX_TEXT_LEN: usize = 30;

const FRAME_LEN: usize = 2 + MAX_TEXT_LEN;

pub const DEFAULT_WIDTH: u8 = 4;
pub const DEFAULT_PRECISION: u8 = 2;

#[allow(dead_code)]
mod cmd {
    pub const RESET: u8 = 0xF0;

    // events/errors reported by the module
    pub const ACK: u8 = 0xA0;
    pub const EVENT_PUSH: u8 = 0xA1;
    pub const EVENT_POP: u8 = 0xA2;
    pub const PAGE: u8 = 0xA3;
    pub const VERSION: u8 = 0xA4;
    pub const ERR_PAGE_N: u8 = 0xB0;
    pub const ERR_ITEM_N: u8 = 0xB1;

    pub const SET_INT: u8 = 0xC0;
    pub const SET_FLOAT: u8 = 0xC1;
    pub const SET_STR: u8 = 0xC2;
    pub const SET_PAGE: u8 = 0xC3;
    pub const GET_VERSION: u8 = 0xD0;
    pub const GET_PAGE: u8 = 0xD1;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// `[0xC0, idx, i32 LE]`
    Int(i32),
    /// `[0xC1, idx, width, precision, f32 LE]`
    Float { value: f32, width: u8, precision: u8 },
    /// `[0xC2, idx, utf8...]`
    Text(&'a str),
}

impl Value<'_> {
    /// Float with the module's default 4.2 formatting.
    pub fn float(value: f32) -> Self {
        Value::Float {
            value,
            width: DEFAULT_WIDTH,
            precision: DEFAULT_PRECISION,
        }
    }

    // returns the frame length
    fn encode(&self, idx: u8, frame: &mut [u8; FRAME_LEN]) -> Result<usize, &'static str> {
        match *self {
            Value::Int(v) => {
                frame[..2].copy_from_slice(&[cmd::SET_INT, idx]);
                frame[2..6].copy_from_slice(&v.to_le_bytes());
                Ok(6)
            }
            Value::Float {
                value,
                width,
                precision,
            } => {
                frame[..4].copy_from_slice(&[cmd::SET_FLOAT, idx, width, precision]);
                frame[4..8].copy_from_slice(&value.to_le_bytes());
                Ok(8)
            }
            Value::Text(s) => {
                let bytes = s.as_bytes();
                if bytes.len() > MAX_TEXT_LEN {
                    return Err("text longer than 30 bytes");
                }
                frame[..2].copy_from_slice(&[cmd::SET_STR, idx]);
                frame[2..2 + bytes.len()].copy_from_slice(bytes);
                Ok(2 + bytes.len())
            }
        }
    }
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::float(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Text(s)
    }
}

pub struct Photon<I2C> {
    dev: I2cDevice<I2C>,
}

impl<I2C: I2c> Photon<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_addr(i2c, DEFAULT_ADDR)
    }

    pub fn new_with_addr(i2c: I2C, addr: u8) -> Self {
        Self {
            dev: I2cDevice::new(i2c, addr),
        }
    }

    pub fn set_value<'v>(
        &mut self,
        idx: u8,
        value: impl Into<Value<'v>>,
    ) -> Result<(), Error<I2C::Error>> {
        let mut frame = [0u8; FRAME_LEN];
        let len = value
            .into()
            .encode(idx, &mut frame)
            .map_err(Error::InvalidArgument)?;
        self.dev.write(&frame[..len]).map_err(Error::Bus)
    }

    pub fn set_page(&mut self, idx: u8) -> Result<(), Error<I2C::Error>> {
        self.dev.write(&[cmd::SET_PAGE, idx]).map_err(Error::Bus)
    }

    pub fn version(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_u16(cmd::GET_VERSION)
    }

    pub fn page(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_u16(cmd::GET_PAGE)
    }

    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.dev.write(&[cmd::RESET]).map_err(Error::Bus)
    }

    pub fn release(self) -> I2C {
        self.dev.release()
    }

    fn read_u16(&mut self, command: u8) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.dev
            .write_stop_read(&[command], &mut buf)
            .map_err(Error::Bus)?;
        Ok(u16::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = DEFAULT_ADDR;

    #[test]
    fn int_value_frame() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0xC0, 0x02, 0xFE, 0xFF, 0xFF, 0xFF]),
            I2cTransaction::write(ADDR, vec![0xC0, 0x00, 0x10, 0x27, 0x00, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut ph = Photon::new(i2c.clone());

        ph.set_value(2, -2i32).unwrap();
        ph.set_value(0, Value::Int(10_000)).unwrap();
        i2c.done();
    }

    #[test]
    fn float_value_frame() {
        let mut frame = vec![0xC1, 0x01, 4, 2];
        frame.extend_from_slice(&1.5f32.to_le_bytes());
        let mut custom = vec![0xC1, 0x03, 6, 3];
        custom.extend_from_slice(&(-0.25f32).to_le_bytes());
        let expectations = [
            I2cTransaction::write(ADDR, frame),
            I2cTransaction::write(ADDR, custom),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut ph = Photon::new(i2c.clone());

        ph.set_value(1, 1.5f32).unwrap();
        ph.set_value(
            3,
            Value::Float {
                value: -0.25,
                width: 6,
                precision: 3,
            },
        )
        .unwrap();
        i2c.done();
    }

    #[test]
    fn text_value_frame() {
        let mut frame = vec![0xC2, 0x05];
        frame.extend_from_slice("t°=21".as_bytes());
        let expectations = [I2cTransaction::write(ADDR, frame)];
        let mut i2c = I2cMock::new(&expectations);
        let mut ph = Photon::new(i2c.clone());

        ph.set_value(5, "t°=21").unwrap();
        i2c.done();
    }

    #[test]
    fn text_at_limit_and_over() {
        let exact: String = core::iter::repeat_n('a', MAX_TEXT_LEN).collect();
        let mut frame = vec![0xC2, 0x00];
        frame.extend_from_slice(exact.as_bytes());
        let expectations = [I2cTransaction::write(ADDR, frame)];
        let mut i2c = I2cMock::new(&expectations);
        let mut ph = Photon::new(i2c.clone());

        ph.set_value(0, exact.as_str()).unwrap();
        let long: String = core::iter::repeat_n('a', MAX_TEXT_LEN + 1).collect();
        assert!(matches!(
            ph.set_value(0, long.as_str()),
            Err(Error::InvalidArgument(_))
        ));
        i2c.done();
    }

    #[test]
    fn page_version_reset() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0xC3, 0x02]),
            I2cTransaction::write(ADDR, vec![0xD1]),
            I2cTransaction::read(ADDR, vec![0x02, 0x00]),
            I2cTransaction::write(ADDR, vec![0xD0]),
            I2cTransaction::read(ADDR, vec![0x03, 0x01]),
            I2cTransaction::write(ADDR, vec![0xF0]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut ph = Photon::new(i2c.clone());

        ph.set_page(2).unwrap();
        assert_eq!(ph.page().unwrap(), 2);
        assert_eq!(ph.version().unwrap(), 0x0103);
        ph.reset().unwrap();
        i2c.done();
    }

    #[test]
    fn value_conversions() {
        let values: Vec<Value> = vec![7i32.into(), 0.5f32.into(), "x".into()];
        assert_eq!(
            values,
            vec![
                Value::Int(7),
                Value::Float {
                    value: 0.5,
                    width: 4,
                    precision: 2
                },
                Value::Text("x"),
            ]
        );
    }
}
