// PCA9536 4-bit I2C GPIO expander
//
// Four register-mapped ports (input, output, polarity, configuration).
// Every pin operation is a read-modify-write of one bit against the
// chip, so pins changed by someone else on the bus are preserved.
// Channel<'_, I2C> borrows the driver, configures the pin as output and
// exposes it through the embedded-hal digital traits.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;
use crate::error::Error;

pub const DEFAULT_ADDR: u8 = 0x41;
pub const PIN_COUNT: u8 = 4;

mod reg {
    pub const INPUT_PORT: u8 = 0x00;
    pub const OUTPUT_PORT: u8 = 0x01;
    pub const POLARITY_INVERSION: u8 = 0x02;
    pub const CONFIGURATION: u8 = 0x03;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

pub struct Pca9536<I2C> {
    dev: I2cDevice<I2C>,
}

impl<I2C: I2c> Pca9536<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_addr(i2c, DEFAULT_ADDR)
    }

    pub fn new_with_addr(i2c: I2C, addr: u8) -> Self {
        Self {
            dev: I2cDevice::new(i2c, addr),
        }
    }

    pub fn set_direction(&mut self, pin: u8, dir: Direction) -> Result<(), Error<I2C::Error>> {
        // config bit set = input
        self.update_bit(reg::CONFIGURATION, pin, dir == Direction::Input)
    }

    pub fn direction(&mut self, pin: u8) -> Result<Direction, Error<I2C::Error>> {
        Ok(if self.read_bit(reg::CONFIGURATION, pin)? {
            Direction::Input
        } else {
            Direction::Output
        })
    }

    pub fn set_inverted(&mut self, pin: u8, inverted: bool) -> Result<(), Error<I2C::Error>> {
        self.update_bit(reg::POLARITY_INVERSION, pin, inverted)
    }

    pub fn is_inverted(&mut self, pin: u8) -> Result<bool, Error<I2C::Error>> {
        self.read_bit(reg::POLARITY_INVERSION, pin)
    }

    /// Input level of `pin`, after polarity inversion.
    pub fn read(&mut self, pin: u8) -> Result<bool, Error<I2C::Error>> {
        self.read_bit(reg::INPUT_PORT, pin)
    }

    pub fn write(&mut self, pin: u8, high: bool) -> Result<(), Error<I2C::Error>> {
        self.update_bit(reg::OUTPUT_PORT, pin, high)
    }

    /// Level last written to the output latch of `pin`.
    pub fn output_state(&mut self, pin: u8) -> Result<bool, Error<I2C::Error>> {
        self.read_bit(reg::OUTPUT_PORT, pin)
    }

    /// Borrow one pin as an embedded-hal pin. The pin is switched to
    /// output first; the chip powers up with every pin as input.
    pub fn channel(&mut self, pin: u8) -> Result<Channel<'_, I2C>, Error<I2C::Error>> {
        self.set_direction(pin, Direction::Output)?;
        Ok(Channel { pca: self, pin })
    }

    pub fn release(self) -> I2C {
        self.dev.release()
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.dev.write_stop_read(&[register], &mut buf).map_err(Error::Bus)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.dev.write(&[register, value]).map_err(Error::Bus)
    }

    fn read_bit(&mut self, register: u8, pin: u8) -> Result<bool, Error<I2C::Error>> {
        let m = mask::<I2C::Error>(pin)?;
        Ok(self.read_register(register)? & m != 0)
    }

    fn update_bit(&mut self, register: u8, pin: u8, set: bool) -> Result<(), Error<I2C::Error>> {
        let m = mask::<I2C::Error>(pin)?;
        let current = self.read_register(register)?;
        let next = if set { current | m } else { current & !m };
        self.write_register(register, next)
    }
}

fn mask<E>(pin: u8) -> Result<u8, Error<E>> {
    if pin < PIN_COUNT {
        Ok(1 << pin)
    } else {
        Err(Error::InvalidArgument("PCA9536 pin out of range 0..=3"))
    }
}

/// One expander pin, borrowed from the driver.
pub struct Channel<'a, I2C> {
    pca: &'a mut Pca9536<I2C>,
    pin: u8,
}

impl<I2C: I2c> Channel<'_, I2C> {
    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn set_direction(&mut self, dir: Direction) -> Result<(), Error<I2C::Error>> {
        self.pca.set_direction(self.pin, dir)
    }

    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Error<I2C::Error>> {
        self.pca.set_inverted(self.pin, inverted)
    }
}

impl<I2C: I2c> ErrorType for Channel<'_, I2C> {
    type Error = Error<I2C::Error>;
}

impl<I2C: I2c> InputPin for Channel<'_, I2C> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pca.read(self.pin)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pca.read(self.pin).map(|high| !high)
    }
}

impl<I2C: I2c> OutputPin for Channel<'_, I2C> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pca.write(self.pin, false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pca.write(self.pin, true)
    }
}

impl<I2C: I2c> StatefulOutputPin for Channel<'_, I2C> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.pca.output_state(self.pin)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.pca.output_state(self.pin).map(|high| !high)
    }
}
