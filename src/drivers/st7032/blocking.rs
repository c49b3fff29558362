// Blocking ST7032 driver. The two required waits (power-up, clear/home)
// block the calling thread; keep these calls off latency-sensitive paths.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::{
    CLEAR_HOME_MS, CONTROL_COMMAND, CONTROL_DATA, Config, DEFAULT_ADDR, GLYPH_ROWS,
    POWER_STABLE_MS, Registers, cgram_address, char_byte, check_glyph, cmd, contrast, flags,
    icon_address, scroll,
};

pub struct St7032<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
    regs: Registers,
}

impl<I2C, D> St7032<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Bring up the display at the default address (0x3E). Runs the full
    /// power-up sequence; a bus error part way through is returned as-is
    /// and leaves the chip half-configured.
    pub fn new(i2c: I2C, delay: D, config: Config) -> Result<Self, I2C::Error> {
        Self::new_with_addr(i2c, delay, DEFAULT_ADDR, config)
    }

    pub fn new_with_addr(i2c: I2C, delay: D, addr: u8, config: Config) -> Result<Self, I2C::Error> {
        let mut lcd = Self {
            i2c,
            delay,
            addr,
            regs: Registers::new(config),
        };
        lcd.init()?;
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), I2C::Error> {
        log::debug!(
            "st7032: init at {:#04x}, function {:#04x}",
            self.addr,
            self.regs.function()
        );

        for c in self.regs.power_up() {
            self.command(c)?;
        }
        self.delay.delay_ms(POWER_STABLE_MS);
        self.command(self.regs.function_set())?;

        self.set_display_control(flags::DISPLAY_ON | flags::CURSOR_OFF | flags::BLINK_OFF)?;
        self.clear()?;
        self.set_entry_mode(flags::ENTRY_LEFT | flags::ENTRY_SHIFT_DECREMENT)?;

        log::debug!("st7032: init done");
        Ok(())
    }

    // ── Shadow registers ────────────────────────────────────

    pub fn control_flags(&self) -> u8 {
        self.regs.control()
    }

    pub fn entry_flags(&self) -> u8 {
        self.regs.entry()
    }

    pub fn function_flags(&self) -> u8 {
        self.regs.function()
    }

    /// Last row passed to `set_cursor` (0 after clear/home).
    pub fn current_line(&self) -> u8 {
        self.regs.current_line()
    }

    pub fn set_display_control(&mut self, bits: u8) -> Result<(), I2C::Error> {
        let c = self.regs.set_control(bits);
        self.command(c)
    }

    pub fn reset_display_control(&mut self, bits: u8) -> Result<(), I2C::Error> {
        let c = self.regs.reset_control(bits);
        self.command(c)
    }

    pub fn set_entry_mode(&mut self, bits: u8) -> Result<(), I2C::Error> {
        let c = self.regs.set_entry(bits);
        self.command(c)
    }

    pub fn reset_entry_mode(&mut self, bits: u8) -> Result<(), I2C::Error> {
        let c = self.regs.reset_entry(bits);
        self.command(c)
    }

    // ── Extended instruction table ──────────────────────────

    /// Contrast 0..=63; higher bits are dropped.
    pub fn set_contrast(&mut self, level: u8) -> Result<(), I2C::Error> {
        self.command(self.regs.extended_function_set())?;
        for c in contrast(level) {
            self.command(c)?;
        }
        self.command(self.regs.function_set())
    }

    pub fn set_icon(&mut self, addr: u8, bits: u8) -> Result<(), I2C::Error> {
        self.command(self.regs.extended_function_set())?;
        self.command(icon_address(addr))?;
        self.write_data(bits)?;
        self.command(self.regs.function_set())
    }

    // ── High level commands ─────────────────────────────────

    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(cmd::CLEAR_DISPLAY)?;
        self.delay.delay_ms(CLEAR_HOME_MS);
        self.regs.home();
        Ok(())
    }

    pub fn home(&mut self) -> Result<(), I2C::Error> {
        self.command(cmd::RETURN_HOME)?;
        self.delay.delay_ms(CLEAR_HOME_MS);
        self.regs.home();
        Ok(())
    }

    /// Move the cursor. Rows past the last line clamp to it; columns are
    /// not checked against the panel width.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), I2C::Error> {
        let c = self.regs.set_cursor(col, row);
        self.command(c)
    }

    pub fn no_display(&mut self) -> Result<(), I2C::Error> {
        self.reset_display_control(flags::DISPLAY_ON)
    }

    pub fn display(&mut self) -> Result<(), I2C::Error> {
        self.set_display_control(flags::DISPLAY_ON)
    }

    pub fn no_cursor(&mut self) -> Result<(), I2C::Error> {
        self.reset_display_control(flags::CURSOR_ON)
    }

    pub fn cursor(&mut self) -> Result<(), I2C::Error> {
        self.set_display_control(flags::CURSOR_ON)
    }

    pub fn no_blink(&mut self) -> Result<(), I2C::Error> {
        self.reset_display_control(flags::BLINK_ON)
    }

    pub fn blink(&mut self) -> Result<(), I2C::Error> {
        self.set_display_control(flags::BLINK_ON)
    }

    // scroll without touching DDRAM
    pub fn scroll_display_left(&mut self) -> Result<(), I2C::Error> {
        self.command(scroll(flags::MOVE_LEFT))
    }

    pub fn scroll_display_right(&mut self) -> Result<(), I2C::Error> {
        self.command(scroll(flags::MOVE_RIGHT))
    }

    pub fn left_to_right(&mut self) -> Result<(), I2C::Error> {
        self.set_entry_mode(flags::ENTRY_LEFT)
    }

    pub fn right_to_left(&mut self) -> Result<(), I2C::Error> {
        self.reset_entry_mode(flags::ENTRY_LEFT)
    }

    // right-justify text from the cursor
    pub fn autoscroll(&mut self) -> Result<(), I2C::Error> {
        self.set_entry_mode(flags::ENTRY_SHIFT_INCREMENT)
    }

    pub fn no_autoscroll(&mut self) -> Result<(), I2C::Error> {
        self.reset_entry_mode(flags::ENTRY_SHIFT_INCREMENT)
    }

    /// Load a custom glyph into CGRAM slot 0..=7 (masked). Writes at most
    /// seven rows; a shorter slice writes fewer.
    pub fn create_char(&mut self, slot: u8, glyph: &[u8]) -> Result<(), I2C::Error> {
        check_glyph(glyph);
        self.command(cgram_address(slot))?;
        for &row in glyph.iter().take(GLYPH_ROWS) {
            self.write_data(row)?;
        }
        Ok(())
    }

    pub fn write(&mut self, text: &str) -> Result<(), I2C::Error> {
        for c in text.chars() {
            self.write_data(char_byte(c))?;
        }
        Ok(())
    }

    /// `write` followed by a NUL data byte.
    pub fn println(&mut self, text: &str) -> Result<(), I2C::Error> {
        self.write(text)?;
        self.write_data(0)
    }

    // ── Wire primitives ─────────────────────────────────────

    pub fn command(&mut self, value: u8) -> Result<(), I2C::Error> {
        log::trace!("st7032: cmd {:#04x}", value);
        self.i2c.write(self.addr, &[CONTROL_COMMAND, value])
    }

    pub fn write_data(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[CONTROL_DATA, value])
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> fmt::Write for St7032<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s).map_err(|_| fmt::Error)
    }
}
