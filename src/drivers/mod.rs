// Peripheral drivers, one module per device.
//
// Every driver is generic over embedded-hal's I2c (and DelayNs where the
// device needs settle time) and never constructs its own transport.
// Only st7032 keeps device state on the host; the rest are plain
// request/response register wrappers.

pub mod keypad;
pub mod ledgauge;
pub mod motorix;
pub mod pca9536;
pub mod photon;
pub mod slider;
pub mod st7032;
pub mod udm;
