// ST7032 character LCD controller, I2C, 8-bit interface
// Tested on the RobotClass FSTN 1602 module (16x2, 3.3V).
//
// Framing: [0x00, cmd] for an instruction, [0x40, byte] for a DDRAM or
// CGRAM data write. One bus transaction per pair, no batching.
//
// Display-control and entry-mode registers are write-only on the chip.
// The driver keeps shadow copies and re-sends the whole register on every
// bit change; nothing is read back, so a lost write leaves shadow and
// device apart until the register is written again.
//
// Bias, oscillator, follower and contrast live in the extended
// instruction table (IS=1). Every extended access is bracketed by an
// extended function-set and a normal function-set.

mod blocking;

#[cfg(feature = "async")]
mod asynch;

pub use blocking::St7032;

#[cfg(feature = "async")]
pub use asynch::St7032Async;

pub const DEFAULT_ADDR: u8 = 0x3E;

/// Rows per custom glyph written by `create_char`.
pub const GLYPH_ROWS: usize = 7;

/// DDRAM base address of each logical row.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

pub(crate) const CONTROL_COMMAND: u8 = 0x00;
pub(crate) const CONTROL_DATA: u8 = 0x40;

// power rails need >200ms after the follower is switched on
pub(crate) const POWER_STABLE_MS: u32 = 200;
// clear and return-home run ~1.5ms on the chip
pub(crate) const CLEAR_HOME_MS: u32 = 2;

#[allow(dead_code)]
pub(crate) mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const RETURN_HOME: u8 = 0x02;
    pub const ENTRY_MODE_SET: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const CURSOR_SHIFT: u8 = 0x10;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_CGRAM_ADDR: u8 = 0x40;
    pub const SET_DDRAM_ADDR: u8 = 0x80;

    // extended instruction table (IS=1)
    pub const EX_SET_BIAS_OSC: u8 = 0x10;
    pub const EX_SET_ICON_RAM_ADDR: u8 = 0x40;
    pub const EX_POWER_ICON_CONTRAST_H: u8 = 0x50;
    pub const EX_FOLLOWER_CONTROL: u8 = 0x60;
    pub const EX_CONTRAST_SET_L: u8 = 0x70;
}

/// Register flag bits, for `set_display_control`, `set_entry_mode`
/// and friends.
pub mod flags {
    // entry mode
    pub const ENTRY_RIGHT: u8 = 0x00;
    pub const ENTRY_LEFT: u8 = 0x02;
    pub const ENTRY_SHIFT_INCREMENT: u8 = 0x01;
    pub const ENTRY_SHIFT_DECREMENT: u8 = 0x00;

    // display on/off control
    pub const DISPLAY_ON: u8 = 0x04;
    pub const DISPLAY_OFF: u8 = 0x00;
    pub const CURSOR_ON: u8 = 0x02;
    pub const CURSOR_OFF: u8 = 0x00;
    pub const BLINK_ON: u8 = 0x01;
    pub const BLINK_OFF: u8 = 0x00;

    // display/cursor shift
    pub const DISPLAY_MOVE: u8 = 0x08;
    pub const CURSOR_MOVE: u8 = 0x00;
    pub const MOVE_RIGHT: u8 = 0x04;
    pub const MOVE_LEFT: u8 = 0x00;

    // function set
    pub const EIGHT_BIT_MODE: u8 = 0x10;
    pub const TWO_LINE: u8 = 0x08;
    pub const ONE_LINE: u8 = 0x00;
    pub const DOTS_5X10: u8 = 0x04;
    pub const DOTS_5X8: u8 = 0x00;
    pub const EX_INSTRUCTION: u8 = 0x01;

    // bias / oscillator (extended)
    pub const BIAS_1_4: u8 = 0x08;
    pub const BIAS_1_5: u8 = 0x00;
    pub const OSC_347HZ: u8 = 0x07;

    // power / icon / contrast high (extended)
    pub const ICON_ON: u8 = 0x08;
    pub const BOOST_ON: u8 = 0x04;

    // follower control (extended)
    pub const FOLLOWER_ON: u8 = 0x08;
    pub const RAB_2_00: u8 = 0x04;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lines {
    One,
    #[default]
    Two,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Font {
    #[default]
    Dots5x8,
    /// 10-pixel font; only honoured on one-line displays
    Dots5x10,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub lines: Lines,
    pub font: Font,
}

impl Config {
    /// `lines` above 1 selects two-line mode; `dot_size` requests the
    /// 5x10 font.
    pub const fn new(lines: u8, dot_size: bool) -> Self {
        Self {
            lines: if lines > 1 { Lines::Two } else { Lines::One },
            font: if dot_size { Font::Dots5x10 } else { Font::Dots5x8 },
        }
    }

    pub const fn line_count(&self) -> u8 {
        match self.lines {
            Lines::One => 1,
            Lines::Two => 2,
        }
    }

    pub const fn function_flags(&self) -> u8 {
        let mut bits = flags::EIGHT_BIT_MODE;
        if let Lines::Two = self.lines {
            bits |= flags::TWO_LINE;
        }
        if let (Lines::One, Font::Dots5x10) = (self.lines, self.font) {
            bits |= flags::DOTS_5X10;
        }
        bits
    }
}

// Host-side shadow of the write-only registers plus the command
// encoding. Shared by the blocking and async drivers; no I/O here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Registers {
    function: u8,
    control: u8,
    entry: u8,
    lines: u8,
    current_line: u8,
}

impl Registers {
    pub(crate) const fn new(config: Config) -> Self {
        Self {
            function: config.function_flags(),
            control: 0,
            entry: 0,
            lines: config.line_count(),
            current_line: 0,
        }
    }

    pub(crate) const fn function(&self) -> u8 {
        self.function
    }

    pub(crate) const fn control(&self) -> u8 {
        self.control
    }

    pub(crate) const fn entry(&self) -> u8 {
        self.entry
    }

    pub(crate) const fn current_line(&self) -> u8 {
        self.current_line
    }

    pub(crate) const fn function_set(&self) -> u8 {
        cmd::FUNCTION_SET | self.function
    }

    pub(crate) const fn extended_function_set(&self) -> u8 {
        cmd::FUNCTION_SET | self.function | flags::EX_INSTRUCTION
    }

    // steps 1-4 of power-up, sent before the stabilisation wait
    pub(crate) const fn power_up(&self) -> [u8; 4] {
        [
            self.function_set(),
            self.extended_function_set(),
            cmd::EX_SET_BIAS_OSC | flags::BIAS_1_4 | flags::OSC_347HZ,
            cmd::EX_FOLLOWER_CONTROL | flags::FOLLOWER_ON | flags::RAB_2_00,
        ]
    }

    pub(crate) fn set_control(&mut self, bits: u8) -> u8 {
        self.control |= bits;
        cmd::DISPLAY_CONTROL | self.control
    }

    pub(crate) fn reset_control(&mut self, bits: u8) -> u8 {
        self.control &= !bits;
        cmd::DISPLAY_CONTROL | self.control
    }

    pub(crate) fn set_entry(&mut self, bits: u8) -> u8 {
        self.entry |= bits;
        cmd::ENTRY_MODE_SET | self.entry
    }

    pub(crate) fn reset_entry(&mut self, bits: u8) -> u8 {
        self.entry &= !bits;
        cmd::ENTRY_MODE_SET | self.entry
    }

    pub(crate) fn home(&mut self) {
        self.current_line = 0;
    }

    // Rows at or past the line count clamp to the last line. Columns are
    // not checked; the address wraps like the chip's 7-bit counter would.
    pub(crate) fn set_cursor(&mut self, col: u8, row: u8) -> u8 {
        let row = if row >= self.lines {
            let last = self.lines - 1;
            log::warn!("st7032: row {} out of range, clamped to {}", row, last);
            last
        } else {
            row
        };
        self.current_line = row;
        cmd::SET_DDRAM_ADDR | ROW_OFFSETS[row as usize].wrapping_add(col)
    }
}

pub(crate) const fn contrast(level: u8) -> [u8; 2] {
    [
        cmd::EX_CONTRAST_SET_L | (level & 0x0F),
        cmd::EX_POWER_ICON_CONTRAST_H | flags::ICON_ON | flags::BOOST_ON | ((level >> 4) & 0x03),
    ]
}

pub(crate) const fn cgram_address(slot: u8) -> u8 {
    cmd::SET_CGRAM_ADDR | ((slot & 0x07) << 3)
}

pub(crate) const fn icon_address(addr: u8) -> u8 {
    cmd::EX_SET_ICON_RAM_ADDR | (addr & 0x0F)
}

pub(crate) const fn scroll(direction: u8) -> u8 {
    cmd::CURSOR_SHIFT | flags::DISPLAY_MOVE | direction
}

// Each char goes out as its code point's low byte.
pub(crate) fn char_byte(c: char) -> u8 {
    (c as u32 & 0xFF) as u8
}

pub(crate) fn check_glyph(glyph: &[u8]) {
    if glyph.len() != GLYPH_ROWS {
        log::warn!(
            "st7032: glyph has {} rows, expected {}",
            glyph.len(),
            GLYPH_ROWS
        );
    }
}
