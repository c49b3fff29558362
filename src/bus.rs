// Address-bound I2C handle used by the register-style drivers.
//
// write and write_read are one bus transaction each. write_stop_read and
// write_then_read are two: the write and the read are separate I2c calls
// with a STOP between them. Sharing a bus between several drivers goes
// through embedded-hal-bus: SharedBus borrows a RefCell for the length of
// one I2c call, CsSharedBus does the same inside a critical section.
// Either way the bus is released when the call returns, error or not, so
// a failed transfer never leaves it held. On a shared bus another device
// can therefore be addressed between the write and the read of a
// two-transaction method.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Bus shared between drivers running in one execution context.
pub type SharedBus<'a, I2C> = embedded_hal_bus::i2c::RefCellDevice<'a, I2C>;

/// Bus shared with interrupt handlers or other cores.
pub type CsSharedBus<'a, I2C> = embedded_hal_bus::i2c::CriticalSectionDevice<'a, I2C>;

/// Storage behind a [`CsSharedBus`]; can live in a `static`.
pub type CsBusCell<I2C> = critical_section::Mutex<RefCell<I2C>>;

pub const fn cs_bus_cell<I2C>(i2c: I2C) -> CsBusCell<I2C> {
    critical_section::Mutex::new(RefCell::new(i2c))
}

pub struct I2cDevice<I2C> {
    i2c: I2C,
    addr: SevenBitAddress,
}

impl<I2C: I2c> I2cDevice<I2C> {
    pub fn new(i2c: I2C, addr: SevenBitAddress) -> Self {
        Self { i2c, addr }
    }

    pub fn address(&self) -> SevenBitAddress {
        self.addr
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, bytes)
    }

    /// Write then read with a repeated start.
    pub fn write_read(&mut self, bytes: &[u8], buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.addr, bytes, buf)
    }

    /// Write, STOP, then read in a second transaction. For device MCUs
    /// that do not answer a repeated start.
    ///
    /// Not atomic on a [`SharedBus`] or [`CsSharedBus`]: the lock is
    /// dropped between the two transactions.
    pub fn write_stop_read(&mut self, bytes: &[u8], buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, bytes)?;
        self.i2c.read(self.addr, buf)
    }

    /// Write, wait `settle_ms`, then read in a second transaction. For
    /// device MCUs that need time to prepare the reply.
    ///
    /// Not atomic on a shared bus, same as [`Self::write_stop_read`]; the
    /// bus is free while the delay runs.
    pub fn write_then_read<D: DelayNs>(
        &mut self,
        bytes: &[u8],
        delay: &mut D,
        settle_ms: u32,
        buf: &mut [u8],
    ) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, bytes)?;
        delay.delay_ms(settle_ms);
        self.i2c.read(self.addr, buf)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}
