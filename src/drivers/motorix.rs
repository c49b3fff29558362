// RobotClass Motorix dual DC motor driver
// Two H-bridges behind an I2C MCU clocked at 8MHz. Every frame is four
// bytes: command, motor index, two payload bytes.

use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;
use crate::error::Error;

pub const DEFAULT_ADDR: u8 = 0x50;

// PWM frequency * resolution must fit the MCU clock
pub const CLOCK_HZ: u32 = 8_000_000;

mod cmd {
    pub const CONFIG: u8 = 0xA0;
    pub const SET_DIR: u8 = 0xA5;
    pub const SET_PWM: u8 = 0xA6;
    pub const SET_LED: u8 = 0xA7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    A = 0,
    B = 1,
}

pub struct Motorix<I2C> {
    dev: I2cDevice<I2C>,
}

impl<I2C: I2c> Motorix<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_addr(i2c, DEFAULT_ADDR)
    }

    pub fn new_with_addr(i2c: I2C, addr: u8) -> Self {
        Self {
            dev: I2cDevice::new(i2c, addr),
        }
    }

    /// PWM carrier `freq` in Hz and duty resolution `res` (counts per
    /// period). Rejected when the pair exceeds the 8MHz MCU clock.
    pub fn config_pwm(&mut self, freq: u16, res: u8) -> Result<(), Error<I2C::Error>> {
        if freq as u32 * res as u32 > CLOCK_HZ {
            return Err(Error::InvalidArgument("PWM frequency * resolution exceeds 8MHz"));
        }
        let [lo, hi] = freq.to_le_bytes();
        self.dev
            .write(&[cmd::CONFIG, lo, hi, res])
            .map_err(Error::Bus)
    }

    /// Duty cycle, 0 up to the configured resolution.
    pub fn set_pwm(&mut self, motor: Motor, pwm: u16) -> Result<(), Error<I2C::Error>> {
        let [lo, hi] = pwm.to_le_bytes();
        self.dev
            .write(&[cmd::SET_PWM, motor as u8, lo, hi])
            .map_err(Error::Bus)
    }

    /// Bridge inputs as in the usual IN1/IN2 wiring. Both set reads as
    /// IN2 only.
    pub fn set_dir(&mut self, motor: Motor, in1: bool, in2: bool) -> Result<(), Error<I2C::Error>> {
        let v = if in2 {
            0b10
        } else if in1 {
            0b01
        } else {
            0b00
        };
        self.dev
            .write(&[cmd::SET_DIR, motor as u8, v, 0x00])
            .map_err(Error::Bus)
    }

    pub fn set_led(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        self.dev
            .write(&[cmd::SET_LED, on as u8, 0x00, 0x00])
            .map_err(Error::Bus)
    }

    pub fn release(self) -> I2C {
        self.dev.release()
    }
}
