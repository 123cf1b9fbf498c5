use crate::error::Chip8Error;
use std::ops::Range;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the byte-addressable memory the interpreter runs against. All
/// accesses are bounds-checked; running off the end is an error, not a panic.
pub trait MemoryMap {
    /// how many bytes are addressable
    fn capacity(&self) -> usize;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error>;

    fn get_byte(&self, addr: u16) -> Result<u8, Chip8Error> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a big-endian two-byte word (instructions, stack)
    fn get_word(&self, addr: u16) -> Result<u16, Chip8Error> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    fn set_word(&mut self, addr: u16, value: u16) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, 2)?
            .copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }
}

/// Defines the CHIP-8 memory map used by this interpreter:
///   0x0000-0x004f  font glyphs, 5 bytes per hex digit
///   0x0050-0x015f  unused interpreter area
///   0x0160-0x017f  call stack, 16 big-endian words
///   0x0180-0x01ff  unused interpreter area
///   0x0200-...     program, up to the end of RAM
///
/// chip-8 programs *should* not access the interpreter area directly
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

/// how much RAM we have by default
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// 16-bit addressing caps how much RAM is any use
pub const CHIP8_MAX_RAM_SIZE_BYTES: usize = 0x10000;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the call stack lives, and how many return addresses it holds
pub const CHIP8_STACK_ADDR: u16 = 0x0160;
pub const CHIP8_STACK_CAPACITY: usize = 16;

pub const CHIP8_FONT_ADDR: u16 = 0x0000;
/// bytes per font glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

impl MemoryMap for Chip8MemoryMap {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let range = self.range(addr, len)?;
        Ok(&self.bytes[range])
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error> {
        let range = self.range(addr, len)?;
        Ok(&mut self.bytes[range])
    }
}

impl Chip8MemoryMap {
    /// 4K of zeroed RAM
    pub fn new() -> Self {
        Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        }
    }

    /// RAM of a host-chosen size; has to have room past the program origin
    /// and fit in 16-bit addressing
    pub fn with_capacity(capacity: usize) -> Result<Self, Chip8Error> {
        if capacity <= CHIP8_PROGRAM_ADDR as usize || capacity > CHIP8_MAX_RAM_SIZE_BYTES {
            return Err(Chip8Error::InvalidCapacity(capacity));
        }
        Ok(Chip8MemoryMap {
            bytes: vec![0u8; capacity].into_boxed_slice(),
        })
    }

    fn range(&self, addr: u16, len: usize) -> Result<Range<usize>, Chip8Error> {
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(Chip8Error::AddressOutOfRange {
                addr: start,
                len,
                capacity: self.bytes.len(),
            }),
        }
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

/// copy a program in at 0x200, returning the address one past its last byte
pub fn load_program(memory: &mut dyn MemoryMap, program: &[u8]) -> Result<usize, Chip8Error> {
    let required = CHIP8_PROGRAM_ADDR as usize + program.len();
    if required > memory.capacity() {
        return Err(Chip8Error::MemoryInsufficient {
            required,
            capacity: memory.capacity(),
        });
    }
    memory.write(program, CHIP8_PROGRAM_ADDR)?;
    Ok(required)
}

/// bake the hex digit glyphs into the bottom of RAM
pub fn install_font(memory: &mut dyn MemoryMap) -> Result<(), Chip8Error> {
    memory.write(&CHIP8_CONTEMPORARY_FONT, CHIP8_FONT_ADDR)
}

pub const CHIP8_CONTEMPORARY_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..], [0; 0x1000]);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 8).unwrap();
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0).unwrap();
        assert_eq!(m.get_word(0x4).unwrap(), 0x0405);
    }

    #[test]
    fn test_set_word_big_endian() {
        let mut m = Chip8MemoryMap::new();
        m.set_word(0x300, 0xabcd).unwrap();
        assert_eq!(m.get_ro_slice(0x300, 2).unwrap(), &[0xab, 0xcd]);
    }

    #[test]
    fn test_write_too_much_errors() {
        let mut dst = Chip8MemoryMap::new();
        let res = dst.write(&[0; 8], 4089);
        assert!(matches!(
            res,
            Err(Chip8Error::AddressOutOfRange {
                addr: 4089,
                len: 8,
                capacity: 4096
            })
        ));
    }

    #[test]
    fn test_read_past_end_errors() {
        let m = Chip8MemoryMap::new();
        assert!(m.get_byte(0x0fff).is_ok());
        assert!(m.get_word(0x0fff).is_err());
        assert!(m.get_byte(0xffff).is_err());
    }

    #[test]
    fn test_capacity_must_exceed_origin() {
        assert!(matches!(
            Chip8MemoryMap::with_capacity(0x200),
            Err(Chip8Error::InvalidCapacity(0x200))
        ));
        assert!(Chip8MemoryMap::with_capacity(0x10001).is_err());
        assert_eq!(Chip8MemoryMap::with_capacity(0x201).unwrap().capacity(), 0x201);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let end = load_program(&mut dst, &[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        assert_eq!(end, 0x202);
        Ok(())
    }

    #[test]
    fn test_program_load_fills_memory_exactly() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::with_capacity(0x204)?;
        assert_eq!(load_program(&mut dst, &[1, 2, 3, 4])?, 0x204);
        Ok(())
    }

    #[test]
    fn test_program_load_too_big() {
        let mut dst = Chip8MemoryMap::with_capacity(0x204).unwrap();
        let res = load_program(&mut dst, &[0; 5]);
        assert!(matches!(
            res,
            Err(Chip8Error::MemoryInsufficient {
                required: 0x205,
                capacity: 0x204
            })
        ));
    }

    #[test]
    fn test_font_layout() -> Result<(), Chip8Error> {
        let mut m = Chip8MemoryMap::new();
        install_font(&mut m)?;
        // glyph for 'A' starts at 10 * 5
        assert_eq!(m.get_ro_slice(50, 5)?, &[0xF0, 0x90, 0xF0, 0x90, 0x90]);
        assert_eq!(m.get_byte(80)?, 0);
        Ok(())
    }

    #[test]
    fn test_mem_layout() {
        // stack sits in the interpreter area, clear of both font and program
        let stack_end = CHIP8_STACK_ADDR as usize + 2 * CHIP8_STACK_CAPACITY;
        assert!(CHIP8_STACK_ADDR as usize >= CHIP8_CONTEMPORARY_FONT.len());
        assert!(stack_end <= CHIP8_PROGRAM_ADDR as usize);
    }
}
