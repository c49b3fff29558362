// RobotClass Omicron-16 LED ring gauge
//
// 16 RGB LEDs driven by an onboard MCU, fed from either its rotary
// encoder or a potentiometer. Writes are padded to four bytes and
// followed by a 1ms pause for the MCU to apply them. The signal source
// is read once at start-up; the button byte of a state read only means
// something in encoder mode.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::I2cDevice;
use crate::error::Error;

pub const DEFAULT_ADDR: u8 = 0x30;

const WRITE_SETTLE_MS: u32 = 1;

pub const BRIGHTNESS_MAX: u8 = 31;
pub const ENC_MAX_MAX: u8 = 14;
pub const POT_LPF_MIN: u8 = 1;
pub const POT_LPF_MAX: u8 = 16;

mod reg {
    pub const GET_VERSION: u8 = 0xB0;
    pub const GET_SRC: u8 = 0xB1;
    pub const GET_STATE: u8 = 0xB2;
    pub const SET_MODE: u8 = 0xC0;
    pub const SET_COLOR: u8 = 0xC1;
    pub const SET_BRIGHTNESS: u8 = 0xC2;
    pub const SET_POT_LPF: u8 = 0xC3;
    pub const SET_ENC_LIMIT: u8 = 0xC4;
    pub const SET_ENC_MAX: u8 = 0xC5;
    pub const INIT: u8 = 0xE0;
    pub const RESET: u8 = 0xE1;
    pub const RUN_TEST: u8 = 0xE2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Encoder,
    Potentiometer,
}

impl Source {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Source::Encoder,
            _ => Source::Potentiometer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// fill from zero up to the position
    Flood = 0,
    Level = 1,
    /// single LED at the position
    Point = 2,
}

/// Encoder step divider, 1..64 detents per count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncLimit {
    L1 = 0,
    L2 = 1,
    L4 = 2,
    L8 = 3,
    L16 = 4,
    L32 = 5,
    L64 = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeState {
    pub position: u16,
    /// `None` when the gauge follows the potentiometer
    pub button: Option<u8>,
}

pub struct LedGauge<I2C, D> {
    dev: I2cDevice<I2C>,
    delay: D,
    source: Source,
}

impl<I2C, D> LedGauge<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Reset the gauge to factory settings and read its signal source.
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<I2C::Error>> {
        Self::new_with_addr(i2c, delay, DEFAULT_ADDR)
    }

    pub fn new_with_addr(i2c: I2C, delay: D, addr: u8) -> Result<Self, Error<I2C::Error>> {
        let mut gauge = Self {
            dev: I2cDevice::new(i2c, addr),
            delay,
            source: Source::Encoder,
        };
        gauge.write_register(reg::INIT, 1)?;
        let mut src = [0u8; 1];
        gauge.read_register(reg::GET_SRC, &mut src)?;
        gauge.source = Source::from_raw(src[0]);
        log::debug!("ledgauge: init at {:#04x}, source {:?}", addr, gauge.source);
        Ok(gauge)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn test(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(reg::RUN_TEST, 1)
    }

    /// Zero the position counter.
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_register(reg::RESET, 1)
    }

    pub fn version(&mut self) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read_register(reg::GET_VERSION, &mut buf)?;
        Ok(buf[0])
    }

    pub fn state(&mut self) -> Result<GaugeState, Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.read_register(reg::GET_STATE, &mut buf)?;
        Ok(GaugeState {
            position: u16::from_le_bytes([buf[0], buf[1]]),
            button: match self.source {
                Source::Encoder => Some(buf[2]),
                Source::Potentiometer => None,
            },
        })
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<I2C::Error>> {
        self.write_register(reg::SET_MODE, mode as u8)
    }

    pub fn set_color(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error<I2C::Error>> {
        self.dev
            .write(&[reg::SET_COLOR, r, g, b])
            .map_err(Error::Bus)?;
        self.delay.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }

    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), Error<I2C::Error>> {
        if brightness > BRIGHTNESS_MAX {
            return Err(Error::InvalidArgument("brightness out of range 0..=31"));
        }
        self.write_register(reg::SET_BRIGHTNESS, brightness)
    }

    pub fn set_enc_limit(&mut self, limit: EncLimit) -> Result<(), Error<I2C::Error>> {
        self.write_register(reg::SET_ENC_LIMIT, limit as u8)
    }

    pub fn set_enc_max(&mut self, value: u8) -> Result<(), Error<I2C::Error>> {
        if value > ENC_MAX_MAX {
            return Err(Error::InvalidArgument("encoder max out of range 0..=14"));
        }
        self.write_register(reg::SET_ENC_MAX, value)
    }

    /// Potentiometer low-pass filter coefficient, 1..=16.
    pub fn set_pot_lpf(&mut self, value: u8) -> Result<(), Error<I2C::Error>> {
        if !(POT_LPF_MIN..=POT_LPF_MAX).contains(&value) {
            return Err(Error::InvalidArgument("potentiometer LPF out of range 1..=16"));
        }
        self.write_register(reg::SET_POT_LPF, value)
    }

    pub fn release(self) -> (I2C, D) {
        (self.dev.release(), self.delay)
    }

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.dev
            .write_stop_read(&[register, 0x00, 0x00, 0x00], buf)
            .map_err(Error::Bus)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.dev
            .write(&[register, value, 0x00, 0x00])
            .map_err(Error::Bus)?;
        self.delay.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Event, Recorder};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = DEFAULT_ADDR;

    fn init_tx(source: u8) -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write(ADDR, vec![0xE0, 0x01, 0x00, 0x00]),
            I2cTransaction::write(ADDR, vec![0xB1, 0x00, 0x00, 0x00]),
            I2cTransaction::read(ADDR, vec![source]),
        ]
    }

    fn gauge_with(source: u8, after: &[I2cTransaction]) -> (LedGauge<I2cMock, NoopDelay>, I2cMock) {
        let mut expectations = init_tx(source);
        expectations.extend_from_slice(after);
        let i2c = I2cMock::new(&expectations);
        let gauge = LedGauge::new(i2c.clone(), NoopDelay::new()).unwrap();
        (gauge, i2c)
    }

    #[test]
    fn init_reads_source() {
        let (enc, mut i2c) = gauge_with(0, &[]);
        assert_eq!(enc.source(), Source::Encoder);
        i2c.done();

        let (pot, mut i2c) = gauge_with(1, &[]);
        assert_eq!(pot.source(), Source::Potentiometer);
        i2c.done();
    }

    #[test]
    fn source_read_is_write_then_separate_read() {
        let rec = Recorder::with_replies(&[0x01]);
        LedGauge::new(rec.clone(), rec.clone()).unwrap();

        assert_eq!(
            rec.events(),
            vec![
                Event::write(ADDR, &[0xE0, 0x01, 0x00, 0x00]),
                Event::delay_ms(1),
                Event::write(ADDR, &[0xB1, 0x00, 0x00, 0x00]),
                Event::Read(ADDR, 1),
            ]
        );
    }

    #[test]
    fn writes_settle_for_a_millisecond() {
        let rec = Recorder::with_replies(&[0x00]);
        let mut gauge = LedGauge::new(rec.clone(), rec.clone()).unwrap();
        rec.clear();

        gauge.set_color(255, 0, 64).unwrap();
        gauge.set_mode(Mode::Point).unwrap();

        assert_eq!(
            rec.events(),
            vec![
                Event::write(ADDR, &[0xC1, 255, 0, 64]),
                Event::delay_ms(1),
                Event::write(ADDR, &[0xC0, 0x02, 0x00, 0x00]),
                Event::delay_ms(1),
            ]
        );
    }

    #[test]
    fn state_with_encoder_button() {
        let (mut gauge, mut i2c) = gauge_with(
            0,
            &[
                I2cTransaction::write(ADDR, vec![0xB2, 0, 0, 0]),
                I2cTransaction::read(ADDR, vec![0x0C, 0x00, 0x01]),
            ],
        );
        assert_eq!(
            gauge.state().unwrap(),
            GaugeState {
                position: 12,
                button: Some(1),
            }
        );
        i2c.done();
    }

    #[test]
    fn state_from_potentiometer_has_no_button() {
        let (mut gauge, mut i2c) = gauge_with(
            1,
            &[
                I2cTransaction::write(ADDR, vec![0xB2, 0, 0, 0]),
                I2cTransaction::read(ADDR, vec![0x00, 0x01, 0x01]),
            ],
        );
        assert_eq!(
            gauge.state().unwrap(),
            GaugeState {
                position: 256,
                button: None,
            }
        );
        i2c.done();
    }

    #[test]
    fn commands_and_version() {
        let (mut gauge, mut i2c) = gauge_with(
            0,
            &[
                I2cTransaction::write(ADDR, vec![0xE2, 0x01, 0x00, 0x00]),
                I2cTransaction::write(ADDR, vec![0xE1, 0x01, 0x00, 0x00]),
                I2cTransaction::write(ADDR, vec![0xB0, 0, 0, 0]),
                I2cTransaction::read(ADDR, vec![0x03]),
                I2cTransaction::write(ADDR, vec![0xC4, 0x04, 0x00, 0x00]),
            ],
        );
        gauge.test().unwrap();
        gauge.reset().unwrap();
        assert_eq!(gauge.version().unwrap(), 3);
        gauge.set_enc_limit(EncLimit::L16).unwrap();
        i2c.done();
    }

    #[test]
    fn range_checked_settings() {
        let (mut gauge, mut i2c) = gauge_with(
            0,
            &[
                I2cTransaction::write(ADDR, vec![0xC2, 31, 0x00, 0x00]),
                I2cTransaction::write(ADDR, vec![0xC5, 14, 0x00, 0x00]),
                I2cTransaction::write(ADDR, vec![0xC3, 1, 0x00, 0x00]),
                I2cTransaction::write(ADDR, vec![0xC3, 16, 0x00, 0x00]),
            ],
        );
        gauge.set_brightness(31).unwrap();
        gauge.set_enc_max(14).unwrap();
        gauge.set_pot_lpf(1).unwrap();
        gauge.set_pot_lpf(16).unwrap();
        i2c.done();
    }

    #[test]
    fn out_of_range_settings_send_nothing() {
        let (mut gauge, mut i2c) = gauge_with(0, &[]);
        assert!(matches!(
            gauge.set_brightness(32),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(gauge.set_enc_max(15), Err(Error::InvalidArgument(_))));
        assert!(matches!(gauge.set_pot_lpf(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(gauge.set_pot_lpf(17), Err(Error::InvalidArgument(_))));
        i2c.done();
    }

    #[test]
    fn init_bus_error() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![0xE0, 0x01, 0x00, 0x00]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let res = LedGauge::new(i2c.clone(), NoopDelay::new());
        assert!(matches!(res, Err(Error::Bus(ErrorKind::Other))));
        i2c.done();
    }
}
