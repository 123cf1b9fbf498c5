use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// CHIP-8 screen geometry
pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Display is used by the host to put the interpreter's frame buffer on the
/// screen. It should abstract the implementation details, so a variety of
/// kinds of screen would work.
pub trait Display {
    /// draw the frame buffer based on internal resolution of display
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;
}

// store useful metadata about the screen: width, height, bitplanes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution(pub usize, pub usize, pub usize);

impl Resolution {
    pub fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    pub fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// One bit per pixel, rows packed MSB-first, the way sprites are laid out in
/// RAM. Coordinates wrap around at the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    resolution: Resolution,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let resolution = Resolution(width, height, 1);
        FrameBuffer {
            resolution,
            data: vec![0; resolution.byte_count()],
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    fn locate(&self, x: usize, y: usize) -> (usize, u8) {
        let index = (y % self.resolution.1) * self.resolution.0 + (x % self.resolution.0);
        (index / 8, 0x80 >> (index % 8))
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        let (byte, mask) = self.locate(x, y);
        self.data[byte] & mask != 0
    }

    /// flip a pixel; true if it was lit and now isn't
    pub fn xor_pixel(&mut self, x: usize, y: usize) -> bool {
        let (byte, mask) = self.locate(x, y);
        let was_set = self.data[byte] & mask != 0;
        self.data[byte] ^= mask;
        was_set
    }

    pub fn lit_pixels(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT)
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay { terminal })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let resolution = frame.resolution();
        // i don't know how to draw things that aren't mono
        if resolution.2 != 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "MonoTermDisplay can only render one bitplane",
            ));
        }
        let data = frame.as_bytes();

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // only the lit bitplane needs drawing over the black block
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay {
    pub frames_drawn: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay { frames_drawn: 0 }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        Ok(())
    }
}
