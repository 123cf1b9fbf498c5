use crate::error::Chip8Error;
use crate::memory::CHIP8_PROGRAM_ADDR;

/// number of general purpose registers, V0-VF
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as carry, borrow and collision flag
pub const FLAG_REGISTER: usize = 0xF;

/// The CHIP-8 machine state that isn't RAM. Only the interpreter mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    /// the "I" address register
    pub i: u16,
    pub pc: u16,
    /// one past the last byte of the loaded program
    pub program_end: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0x0000,
            pc: CHIP8_PROGRAM_ADDR,
            program_end: CHIP8_PROGRAM_ADDR as usize,
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    /// back to power-on state
    pub fn reset(&mut self) {
        *self = Registers::new();
    }

    pub fn get(&self, x: usize) -> Result<u8, Chip8Error> {
        self.v
            .get(x)
            .copied()
            .ok_or(Chip8Error::RegisterOutOfRange(x))
    }

    pub fn set(&mut self, x: usize, value: u8) -> Result<(), Chip8Error> {
        let reg = self
            .v
            .get_mut(x)
            .ok_or(Chip8Error::RegisterOutOfRange(x))?;
        *reg = value;
        Ok(())
    }

    /// store an ALU result and its flag. VF is written last, so if VX is VF
    /// the flag is what survives.
    pub fn set_with_flag(&mut self, x: usize, (value, flag): (u8, u8)) -> Result<(), Chip8Error> {
        self.set(x, value)?;
        self.v[FLAG_REGISTER] = flag;
        Ok(())
    }

    pub fn flag(&self) -> u8 {
        self.v[FLAG_REGISTER]
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = flag as u8;
    }

    /// count both timers down by one, stopping at zero. The host calls this
    /// at 60Hz; nothing inside the interpreter does.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
