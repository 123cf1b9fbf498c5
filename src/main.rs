use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use simplelog::{Config, LevelFilter, WriteLogger};

use chip8::display::MonoTermDisplay;
use chip8::input::{Input, StdinInput};
use chip8::{Chip8Error, Chip8Interpreter, Chip8MemoryMap, Chip8Peripheral, ExecState};

/// timers and the screen both run at 60Hz
const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter in a terminal")]
struct Args {
    /// program to run, e.g. roms/trip8_demo.ch8
    program: PathBuf,

    /// bytes of RAM
    #[arg(long, default_value_t = chip8::memory::CHIP8_RAM_SIZE_BYTES)]
    memory: usize,

    /// instructions per second
    #[arg(long, default_value_t = 540)]
    hz: u32,

    /// stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// seed for RND, for repeatable runs
    #[arg(long)]
    seed: Option<u64>,

    /// the terminal is busy drawing, so logs go here
    #[arg(long, default_value = "chip8.log")]
    log_file: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|e| format!("bad log level {:?}: {}", args.log_level, e))?;
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&args.log_file)?,
    )?;

    // initialise
    let mut memory = Chip8MemoryMap::with_capacity(args.memory)?;
    let peripheral = Chip8Peripheral::new(MonoTermDisplay::new()?, StdinInput::new()?);
    let mut interpreter = match args.seed {
        Some(seed) => Chip8Interpreter::with_seed(&mut memory, peripheral, seed)?,
        None => Chip8Interpreter::new(&mut memory, peripheral)?,
    };

    // load a program
    let mut f = File::open(&args.program)?;
    interpreter.load_program_from(&mut f)?;

    let steps_per_frame = (args.hz / 60).max(1);
    let mut steps: u64 = 0;
    'frames: loop {
        let frame_start = Instant::now();
        for _ in 0..steps_per_frame {
            match interpreter.step() {
                Ok(ExecState::Running) => {}
                Ok(ExecState::Halted) => {
                    log::info!("program finished after {} instructions", steps);
                    break 'frames;
                }
                // Esc while waiting for a key
                Err(Chip8Error::Io(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    break 'frames;
                }
                Err(e) => {
                    log::error!("stopped at instruction {}: {}", steps, e);
                    return Err(e.into());
                }
            }
            steps += 1;
            if args.max_steps.map_or(false, |max| steps >= max) {
                log::info!("stopping after {} instructions", steps);
                break 'frames;
            }
        }
        interpreter.tick_timers();

        let peripheral = interpreter.peripheral_mut();
        if let Err(e) = peripheral.refresh() {
            log::warn!("failed to refresh the display: {}", e);
        }
        if peripheral.input.quit_requested() {
            break;
        }
        peripheral.input.flush_keys()?;

        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            spin_sleep::sleep(rest);
        }
    }

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    Ok(())
}
