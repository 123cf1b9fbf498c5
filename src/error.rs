use std::io;
use thiserror::Error;

/// Everything that can abort an interpreter operation. Unknown opcodes and
/// display failures are not in here; those are logged and execution carries
/// on.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("memory insufficient: need {required} bytes, have {capacity}")]
    MemoryInsufficient { required: usize, capacity: usize },

    #[error("address 0x{addr:04x} (+{len}) is out of range for {capacity} bytes of memory")]
    AddressOutOfRange {
        addr: usize,
        len: usize,
        capacity: usize,
    },

    #[error("invalid register: V{0:X}")]
    RegisterOutOfRange(usize),

    #[error("stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize },

    #[error("stack underflow")]
    StackUnderflow,

    #[error("invalid memory capacity: {0} bytes")]
    InvalidCapacity(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}
