use crate::error::Chip8Error;
use crate::memory::MemoryMap;

/// Call stack of return addresses. There's no backing store of its own; it's
/// a window of `capacity` big-endian words over RAM starting at `base`, which
/// is where the COSMAC VIP kept it too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    base: u16,
    capacity: usize,
    depth: usize,
}

const WORD_BYTES: usize = 2;

impl Stack {
    pub fn new(base: u16, capacity: usize) -> Self {
        Stack {
            base,
            capacity,
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// forget everything on the stack; RAM is left as it was
    pub fn clear(&mut self) {
        self.depth = 0;
    }

    fn slot_addr(&self, slot: usize) -> Result<u16, Chip8Error> {
        let addr = self.base as usize + slot * WORD_BYTES;
        u16::try_from(addr).map_err(|_| Chip8Error::AddressOutOfRange {
            addr,
            len: WORD_BYTES,
            capacity: crate::memory::CHIP8_MAX_RAM_SIZE_BYTES,
        })
    }

    pub fn push(&mut self, memory: &mut dyn MemoryMap, value: u16) -> Result<(), Chip8Error> {
        if self.depth >= self.capacity {
            return Err(Chip8Error::StackOverflow {
                capacity: self.capacity,
            });
        }
        memory.set_word(self.slot_addr(self.depth)?, value)?;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self, memory: &dyn MemoryMap) -> Result<u16, Chip8Error> {
        if self.depth == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        let value = memory.get_word(self.slot_addr(self.depth - 1)?)?;
        self.depth -= 1;
        Ok(value)
    }
}
