use crate::display::{Display, FrameBuffer};
use crate::input::Input;
use std::io;
use std::time::Duration;

/// how long a blocking key wait sleeps between polls; one 60Hz frame
pub const KEY_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Everything the interpreter needs from the outside world: a screen to XOR
/// pixels onto and a 16-key pad. Clear/draw failures are logged by the
/// interpreter and otherwise ignored; a key query failure aborts the current
/// instruction.
pub trait Peripheral {
    fn clear_display(&mut self) -> Result<(), io::Error>;

    /// flip the pixel at (x, y), wrapping to the surface's own geometry.
    /// returns true if the pixel was lit and now isn't
    fn xor_pixel(&mut self, x: usize, y: usize) -> Result<bool, io::Error>;

    /// is logical key 0x0-0xF currently down
    fn is_key_pressed(&mut self, key: u8) -> Result<bool, io::Error>;

    fn key_poll_interval(&self) -> Duration {
        KEY_POLL_INTERVAL
    }
}

/// Ties a frame buffer to a `Display` and an `Input`. The interpreter draws
/// into the frame buffer; the host calls `refresh` whenever it wants the
/// display brought up to date.
pub struct Chip8Peripheral<D: Display, I: Input> {
    pub frame: FrameBuffer,
    pub display: D,
    pub input: I,
}

impl<D: Display, I: Input> Chip8Peripheral<D, I> {
    pub fn new(display: D, input: I) -> Self {
        Chip8Peripheral {
            frame: FrameBuffer::default(),
            display,
            input,
        }
    }

    pub fn refresh(&mut self) -> Result<(), io::Error> {
        self.display.draw(&self.frame)
    }
}

impl<D: Display, I: Input> Peripheral for Chip8Peripheral<D, I> {
    fn clear_display(&mut self) -> Result<(), io::Error> {
        self.frame.clear();
        Ok(())
    }

    fn xor_pixel(&mut self, x: usize, y: usize) -> Result<bool, io::Error> {
        Ok(self.frame.xor_pixel(x, y))
    }

    fn is_key_pressed(&mut self, key: u8) -> Result<bool, io::Error> {
        self.input.is_key_pressed(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;

    #[test]
    fn test_draws_into_frame() -> Result<(), io::Error> {
        let mut p = Chip8Peripheral::new(DummyDisplay::new(), DummyInput::new(&[]));
        assert!(!p.xor_pixel(1, 1)?);
        assert!(p.frame.get_pixel(1, 1));
        p.clear_display()?;
        assert_eq!(p.frame.lit_pixels(), 0);
        Ok(())
    }

    #[test]
    fn test_refresh_hits_display() -> Result<(), io::Error> {
        let mut p = Chip8Peripheral::new(DummyDisplay::new(), DummyInput::new(&[]));
        p.refresh()?;
        p.refresh()?;
        assert_eq!(p.display.frames_drawn, 2);
        Ok(())
    }

    #[test]
    fn test_keys_come_from_input() -> Result<(), io::Error> {
        let mut p = Chip8Peripheral::new(DummyDisplay::new(), DummyInput::new(&[0xe]));
        assert!(p.is_key_pressed(0xe)?);
        assert!(!p.is_key_pressed(0x1)?);
        assert_eq!(p.key_poll_interval(), Duration::from_millis(16));
        Ok(())
    }
}
