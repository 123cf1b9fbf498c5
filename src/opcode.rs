use std::collections::HashMap;
use std::fmt;

/// A raw 16-bit instruction word. Operand symbols follow the usual notation:
///  NNN: address
///  NN:  8-bit constant
///  N:   4-bit constant
///  X/Y: 4-bit register identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    /// instructions are stored big-endian
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Opcode(u16::from_be_bytes([hi, lo]))
    }

    pub fn addr(self) -> u16 {
        self.0 & 0x0FFF
    }

    pub fn byte(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn nibble(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn x(self) -> usize {
        ((self.0 >> 8) & 0xF) as usize
    }

    pub fn y(self) -> usize {
        ((self.0 >> 4) & 0xF) as usize
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// Masks tried in turn when decoding: fully literal opcodes, then the family
/// nibble, then family + low nibble, then family + low byte. The order
/// matters; 8XY0 and 8XY1 share a family and only the third mask tells them
/// apart.
pub const OPCODE_MASKS: [u16; 4] = [0xFFFF, 0xF000, 0xF00F, 0xF0FF];

/// Opcode lookup. Each entry is registered under the mask that identifies it,
/// so `0x8000` under `0xF00F` means "8XY0" and never swallows 8XY4.
pub struct OpcodeTable<T> {
    entries: HashMap<(u16, u16), (&'static str, T)>,
}

impl<T> OpcodeTable<T> {
    pub fn new() -> Self {
        OpcodeTable {
            entries: HashMap::new(),
        }
    }

    /// register `handler` for opcodes where `opcode & mask == pattern`
    pub fn insert(&mut self, mask: u16, pattern: u16, mnemonic: &'static str, handler: T) {
        debug_assert!(OPCODE_MASKS.contains(&mask), "unsupported mask {:04X}", mask);
        self.entries
            .insert((mask, pattern & mask), (mnemonic, handler));
    }

    /// the first mask (in `OPCODE_MASKS` order) with a matching entry wins
    pub fn decode(&self, opcode: Opcode) -> Option<(&'static str, &T)> {
        OPCODE_MASKS.iter().find_map(|&mask| {
            self.entries
                .get(&(mask, opcode.0 & mask))
                .map(|(mnemonic, handler)| (*mnemonic, handler))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for OpcodeTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
