//! # interpreter
//!
//! (from: https://en.wikipedia.org/wiki/CHIP-8)
//! The CHIP-8 virtual machine has:
//! ```text
//!  V0-VF  16 8bit general registers; VF doubles as carry/borrow/collision
//!  I      16bit address register
//!  PC     program counter                      -- 0x200
//!  SP     call stack of 16 return addresses    -- lives in RAM, see memory.rs
//!  DT     delay timer                          -- counted down by the host at 60Hz
//!  ST     sound timer                          -- ditto; nothing beeps here
//! ```
//!
//! Every instruction is two bytes, big-endian. The host drives the machine
//! one instruction at a time with `step()` and looks after timers and screen
//! refresh in between.

use crate::alu::{self, AluMode};
use crate::error::Chip8Error;
use crate::memory::{
    self, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_STACK_ADDR,
    CHIP8_STACK_CAPACITY,
};
use crate::opcode::{Opcode, OpcodeTable};
use crate::peripheral::Peripheral;
use crate::registers::Registers;
use crate::stack::Stack;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io;

const INSTRUCTION_SIZE: u16 = 2;

/// sprites are always a byte wide
const SPRITE_WIDTH: usize = 8;

/// Next instruction address. PC never wraps back to 0x000: it sticks at
/// 0xFFFF, which is always past the end of any program, so the next fetch halts.
fn advance(pc: u16) -> u16 {
    pc.saturating_add(INSTRUCTION_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running,
    /// PC ran past the end of the program; stays this way until the next
    /// reset or load
    Halted,
}

type Handler<'a, P> = fn(&mut Chip8Interpreter<'a, P>, Opcode) -> Result<(), Chip8Error>;

pub struct Chip8Interpreter<'a, P: Peripheral> {
    memory: &'a mut dyn MemoryMap,
    peripheral: P,
    registers: Registers,
    stack: Stack,
    state: ExecState,
    rng: SmallRng,
    instructions: OpcodeTable<Handler<'a, P>>,
}

impl<'a, P: Peripheral> Chip8Interpreter<'a, P> {
    pub fn new(memory: &'a mut dyn MemoryMap, peripheral: P) -> Result<Self, Chip8Error> {
        Self::with_rng(memory, peripheral, SmallRng::from_entropy())
    }

    /// same random numbers every run
    pub fn with_seed(
        memory: &'a mut dyn MemoryMap,
        peripheral: P,
        seed: u64,
    ) -> Result<Self, Chip8Error> {
        Self::with_rng(memory, peripheral, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(
        memory: &'a mut dyn MemoryMap,
        peripheral: P,
        rng: SmallRng,
    ) -> Result<Self, Chip8Error> {
        if memory.capacity() <= memory::CHIP8_PROGRAM_ADDR as usize {
            return Err(Chip8Error::InvalidCapacity(memory.capacity()));
        }
        memory::install_font(memory)?;
        log::info!("Chip8 initialised! Memory capacity: {}B", memory.capacity());
        Ok(Chip8Interpreter {
            memory,
            peripheral,
            registers: Registers::new(),
            stack: Stack::new(CHIP8_STACK_ADDR, CHIP8_STACK_CAPACITY),
            state: ExecState::Running,
            rng,
            instructions: Self::instruction_table(),
        })
    }

    fn instruction_table() -> OpcodeTable<Handler<'a, P>> {
        let mut t: OpcodeTable<Handler<'a, P>> = OpcodeTable::new();
        t.insert(0xF000, 0x0000, "SYS NNN", Self::op_0nnn);
        t.insert(0xFFFF, 0x00E0, "CLS", Self::op_00e0);
        t.insert(0xFFFF, 0x00EE, "RET", Self::op_00ee);
        t.insert(0xF000, 0x1000, "JP NNN", Self::op_1nnn);
        t.insert(0xF000, 0x2000, "CALL NNN", Self::op_2nnn);
        t.insert(0xF000, 0x3000, "SE VX, NN", Self::op_3xnn);
        t.insert(0xF000, 0x4000, "SNE VX, NN", Self::op_4xnn);
        t.insert(0xF000, 0x5000, "SE VX, VY", Self::op_5xy0);
        t.insert(0xF000, 0x6000, "LD VX, NN", Self::op_6xnn);
        t.insert(0xF000, 0x7000, "ADD VX, NN", Self::op_7xnn);
        t.insert(0xF00F, 0x8000, "LD VX, VY", Self::op_8xy0);
        t.insert(0xF00F, 0x8001, "OR VX, VY", Self::op_8xy1);
        t.insert(0xF00F, 0x8002, "AND VX, VY", Self::op_8xy2);
        t.insert(0xF00F, 0x8003, "XOR VX, VY", Self::op_8xy3);
        t.insert(0xF00F, 0x8004, "ADD VX, VY", Self::op_8xy4);
        t.insert(0xF00F, 0x8005, "SUB VX, VY", Self::op_8xy5);
        t.insert(0xF00F, 0x8006, "SHR VX", Self::op_8xy6);
        t.insert(0xF00F, 0x8007, "SUBN VX, VY", Self::op_8xy7);
        t.insert(0xF00F, 0x800E, "SHL VX", Self::op_8xye);
        t.insert(0xF000, 0x9000, "SNE VX, VY", Self::op_9xy0);
        t.insert(0xF000, 0xA000, "LD I, NNN", Self::op_annn);
        t.insert(0xF000, 0xB000, "JP V0, NNN", Self::op_bnnn);
        t.insert(0xF000, 0xC000, "RND VX, NN", Self::op_cxnn);
        t.insert(0xF000, 0xD000, "DRW VX, VY, N", Self::op_dxyn);
        t.insert(0xF0FF, 0xE09E, "SKP VX", Self::op_ex9e);
        t.insert(0xF0FF, 0xE0A1, "SKNP VX", Self::op_exa1);
        t.insert(0xF0FF, 0xF007, "LD VX, DT", Self::op_fx07);
        t.insert(0xF0FF, 0xF00A, "LD VX, K", Self::op_fx0a);
        t.insert(0xF0FF, 0xF015, "LD DT, VX", Self::op_fx15);
        t.insert(0xF0FF, 0xF018, "LD ST, VX", Self::op_fx18);
        t.insert(0xF0FF, 0xF01E, "ADD I, VX", Self::op_fx1e);
        t.insert(0xF0FF, 0xF029, "LD F, VX", Self::op_fx29);
        t.insert(0xF0FF, 0xF033, "LD B, VX", Self::op_fx33);
        t.insert(0xF0FF, 0xF055, "LD [I], VX", Self::op_fx55);
        t.insert(0xF0FF, 0xF065, "LD VX, [I]", Self::op_fx65);
        t
    }

    /// back to power-on state; RAM (and so the loaded program) is left alone
    /// but the program end marker is forgotten
    pub fn reset(&mut self) {
        log::debug!("reset");
        self.registers.reset();
        self.stack.clear();
        self.state = ExecState::Running;
    }

    /// reset, then load a chip8 program at 0x200. an oversized program is
    /// rejected before anything is touched
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        let end = memory::load_program(&mut *self.memory, program)?;
        self.reset();
        self.registers.program_end = end;
        log::debug!("loaded {} byte program, ends at {:04X}", program.len(), end);
        Ok(())
    }

    pub fn load_program_from(&mut self, reader: &mut dyn io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    /// fetch, decode and execute one instruction
    pub fn step(&mut self) -> Result<ExecState, Chip8Error> {
        if self.state == ExecState::Halted {
            return Ok(ExecState::Halted);
        }

        let pc = self.registers.pc;
        if pc as usize + INSTRUCTION_SIZE as usize > self.registers.program_end {
            log::debug!("PC {:04X} is past the end of the program, halting", pc);
            self.state = ExecState::Halted;
            return Ok(ExecState::Halted);
        }
        let opcode = Opcode(self.memory.get_word(pc)?);
        self.registers.pc = advance(pc);

        let decoded = self
            .instructions
            .decode(opcode)
            .map(|(mnemonic, handler)| (mnemonic, *handler));
        match decoded {
            Some((mnemonic, handler)) => {
                log::trace!("{:04X}: {}  {}", pc, opcode, mnemonic);
                handler(self, opcode)?;
            }
            None => {
                log::warn!("unknown instruction {} at {:04X}, skipping", opcode, pc);
            }
        }
        Ok(ExecState::Running)
    }

    /// step until halted or `max_steps` have run
    pub fn run(&mut self, max_steps: usize) -> Result<ExecState, Chip8Error> {
        for _ in 0..max_steps {
            if self.step()? == ExecState::Halted {
                return Ok(ExecState::Halted);
            }
        }
        Ok(self.state)
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn memory(&self) -> &dyn MemoryMap {
        &*self.memory
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    pub fn delay_timer(&self) -> u8 {
        self.registers.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.registers.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.registers.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.registers.sound_timer = value;
    }

    /// the host's 60Hz tick
    pub fn tick_timers(&mut self) {
        self.registers.tick_timers();
    }

    fn vx(&self, op: Opcode) -> Result<u8, Chip8Error> {
        self.registers.get(op.x())
    }

    fn vy(&self, op: Opcode) -> Result<u8, Chip8Error> {
        self.registers.get(op.y())
    }

    /// hop over exactly one instruction
    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc = advance(self.registers.pc);
        }
    }

    fn alu(&mut self, op: Opcode, mode: AluMode) -> Result<(), Chip8Error> {
        match alu::apply(mode, self.vx(op)?, self.vy(op)?) {
            (result, Some(flag)) => self.registers.set_with_flag(op.x(), (result, flag)),
            (result, None) => self.registers.set(op.x(), result),
        }
    }

    // RCA 1802 machine code; nothing to run it on
    fn op_0nnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        log::warn!("ignoring SYS {:03X}", op.addr());
        Ok(())
    }

    fn op_00e0(&mut self, _op: Opcode) -> Result<(), Chip8Error> {
        if let Err(e) = self.peripheral.clear_display() {
            log::warn!("failed to clear the screen: {}", e);
        }
        Ok(())
    }

    fn op_00ee(&mut self, _op: Opcode) -> Result<(), Chip8Error> {
        self.registers.pc = self.stack.pop(&*self.memory)?;
        Ok(())
    }

    fn op_1nnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.pc = op.addr();
        Ok(())
    }

    // PC has already moved past this instruction, so that's the return address
    fn op_2nnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.stack.push(&mut *self.memory, self.registers.pc)?;
        self.registers.pc = op.addr();
        Ok(())
    }

    fn op_3xnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let vx = self.vx(op)?;
        self.skip_if(vx == op.byte());
        Ok(())
    }

    fn op_4xnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let vx = self.vx(op)?;
        self.skip_if(vx != op.byte());
        Ok(())
    }

    fn op_5xy0(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let (vx, vy) = (self.vx(op)?, self.vy(op)?);
        self.skip_if(vx == vy);
        Ok(())
    }

    fn op_6xnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.set(op.x(), op.byte())
    }

    // carry flag is not changed
    fn op_7xnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let vx = self.vx(op)?;
        self.registers.set(op.x(), vx.wrapping_add(op.byte()))
    }

    fn op_8xy0(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Load)
    }

    fn op_8xy1(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Or)
    }

    fn op_8xy2(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::And)
    }

    fn op_8xy3(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Xor)
    }

    fn op_8xy4(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Add)
    }

    fn op_8xy5(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Sub)
    }

    fn op_8xy6(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Shr)
    }

    fn op_8xy7(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::SubN)
    }

    fn op_8xye(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.alu(op, AluMode::Shl)
    }

    fn op_9xy0(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let (vx, vy) = (self.vx(op)?, self.vy(op)?);
        self.skip_if(vx != vy);
        Ok(())
    }

    fn op_annn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.i = op.addr();
        Ok(())
    }

    fn op_bnnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.pc = op.addr() + self.registers.v[0] as u16;
        Ok(())
    }

    fn op_cxnn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let random: u8 = self.rng.gen();
        self.registers.set(op.x(), random & op.byte())
    }

    /// XOR an 8xN sprite from I onto the screen at (VX, VY). VF ends up 1 if
    /// any lit pixel got turned off. I is left alone.
    fn op_dxyn(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let x = self.vx(op)? as usize;
        let y = self.vy(op)? as usize;
        let sprite = self
            .memory
            .get_ro_slice(self.registers.i, op.nibble() as usize)?;

        let mut collision = false;
        let mut failure = None;
        for (row, bits) in sprite.iter().enumerate() {
            for col in 0..SPRITE_WIDTH {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                match self.peripheral.xor_pixel(x + col, y + row) {
                    Ok(turned_off) => collision |= turned_off,
                    Err(e) => failure = Some(e),
                }
            }
        }
        if let Some(e) = failure {
            log::warn!("failed to draw sprite at ({}, {}): {}", x, y, e);
        }
        self.registers.set_flag(collision);
        Ok(())
    }

    fn op_ex9e(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let pressed = self.peripheral.is_key_pressed(self.vx(op)? & 0xF)?;
        self.skip_if(pressed);
        Ok(())
    }

    fn op_exa1(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let pressed = self.peripheral.is_key_pressed(self.vx(op)? & 0xF)?;
        self.skip_if(!pressed);
        Ok(())
    }

    fn op_fx07(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.set(op.x(), self.registers.delay_timer)
    }

    /// Blocks until the key named by VX is down. Nothing else happens while
    /// waiting; the only way out early is the peripheral failing the query.
    fn op_fx0a(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let key = self.vx(op)? & 0xF;
        log::debug!("waiting for key {:X}", key);
        while !self.peripheral.is_key_pressed(key)? {
            spin_sleep::sleep(self.peripheral.key_poll_interval());
        }
        Ok(())
    }

    fn op_fx15(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.delay_timer = self.vx(op)?;
        Ok(())
    }

    fn op_fx18(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.sound_timer = self.vx(op)?;
        Ok(())
    }

    fn op_fx1e(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        self.registers.i = self.registers.i.wrapping_add(self.vx(op)? as u16);
        Ok(())
    }

    fn op_fx29(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let digit = (self.vx(op)? & 0xF) as u16;
        self.registers.i = CHIP8_FONT_ADDR + digit * CHIP8_FONT_GLYPH_BYTES;
        Ok(())
    }

    fn op_fx33(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let value = self.vx(op)?;
        self.memory
            .get_rw_slice(self.registers.i, 3)?
            .copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
        Ok(())
    }

    // V0 to VX *inclusive*
    fn op_fx55(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let count = op.x() + 1;
        self.memory
            .get_rw_slice(self.registers.i, count)?
            .copy_from_slice(&self.registers.v[..count]);
        Ok(())
    }

    fn op_fx65(&mut self, op: Opcode) -> Result<(), Chip8Error> {
        let count = op.x() + 1;
        let bytes = self.memory.get_ro_slice(self.registers.i, count)?;
        self.registers.v[..count].copy_from_slice(bytes);
        Ok(())
    }
}
