// Drivers for RobotClass I2C peripherals on embedded-hal 1.0
//
// bus:     address-bound I2C handle, shared-bus aliases
// error:   Error<E> for drivers that validate their arguments
// drivers: one module per peripheral (ST7032 LCD, keypad, LED gauge,
//          motor driver, PCA9536 expander, Photon display, slider,
//          ultrasonic ranger)
//
// Each driver owns its bus handle and delay. The bus and delay are
// supplied by the caller; to put several drivers on one bus, hand each
// a bus::SharedBus or bus::CsSharedBus.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod drivers;
pub mod error;

#[cfg(test)]
mod testutil;

pub use bus::I2cDevice;
pub use error::Error;
