use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// map of characters read from the keyboard to logical COSMAC keys, using the
/// left-hand side of a qwerty keyboard
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// reads keypresses
pub trait Input {
    /// get a list of all the mapped keys that have been pressed recently,
    /// without flushing them from the buffer
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// flush all the keypresses from the buffer
    fn flush_keys(&mut self) -> Result<(), io::Error>;

    /// has logical key 0x0-0xF been pressed recently
    fn is_key_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        Ok(self.peek_keys()?.contains(&key))
    }
}

/// simple implementation of Input, using STDIN in raw mode
pub struct StdinInput {
    buffer: Vec<u8>,
    keymap: HashMap<char, u8>,
    quit_requested: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            buffer: Vec::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit_requested: false,
        })
    }

    /// Esc has been pressed
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key) {
                        Some(mapped_key) => self.buffer.push(*mapped_key),
                        None => {
                            log::warn!("can't map {:?} to a COSMAC key", key);
                        }
                    },
                    KeyCode::Esc => self.quit_requested = true,
                    _ => {
                        log::debug!("unmapped key event received: {:?}", evt);
                    }
                },
                _ => {
                    log::trace!("non-key event received");
                }
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("couldn't restore terminal: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_stdin()?;
        Ok(self.buffer.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.read_stdin()?;
        self.buffer.clear();
        Ok(())
    }

    /// Esc turns into an error here, which is how a blocking key wait gets
    /// cancelled
    fn is_key_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        self.read_stdin()?;
        if self.quit_requested {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "quit requested while reading keys",
            ));
        }
        Ok(self.buffer.contains(&key))
    }
}

/// dummy Input implementation for testing
pub struct DummyInput {
    bytes: Vec<u8>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            bytes: Vec::from(keys),
        }
    }

    pub fn press(&mut self, key: u8) {
        self.bytes.push(key);
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        Ok(self.bytes.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.bytes.clear();
        Ok(())
    }
}
