//!
//! ## Design
//!
//! * the interpreter is the whole machine: fetch, decode, execute over a
//!   flat byte memory, 16 registers, a call stack and two timers
//! * one instruction per `step()`; the host owns timing, timer countdown and
//!   screen refresh and does them between steps
//! * memory belongs to the host; the interpreter borrows it for its lifetime
//! * abstract display and input so can plug alternatives; starting with TUI
//!   in-console
//! * malformed programs give errors (stack over/underflow, running off the
//!   end of RAM), never panics; unknown opcodes are skipped
//!
//! Enums/traits to represent:
//!
//! * memory map
//!    - bounds-checked, host-sized, font baked in at 0x000
//! * instruction set
//!    - opcode table keyed by (mask, pattern), searched mask by mask
//! * the interpreter itself
//!    - pub .step() -> Running | Halted
//!    - pub .reset(), .load_program(bytes)
//! * peripheral, with trait for XOR-ing pixels, clearing, reading keys
//!    - provide an interface such that the interpreter doesn't need to know
//!      how the display works
//! * display, with trait for rendering a frame buffer
//! * input device, with trait for reading key-presses
//!
//! Model
//!
//! ```text
//! Host (main.rs)
//!  |-- memory, display, input -> peripheral
//!  |-- interpreter(memory, peripheral)
//!  `-- main loop, once per 60Hz frame
//!       |-- n x interpreter.step()
//!       |-- interpreter.tick_timers()
//!       |-- peripheral.refresh(); peripheral.input.flush_keys()
//!       `-- sleep out the rest of the frame
//! ```

pub mod alu;
pub mod display;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod peripheral;
pub mod registers;
pub mod stack;

pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, ExecState};
pub use memory::{Chip8MemoryMap, MemoryMap};
pub use peripheral::{Chip8Peripheral, Peripheral};
