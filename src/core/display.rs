//! The full-screen live display the Monitor renders its tick into.
//!
//! The original tool used `goncurses`; there is no Rust analogue of that
//! exact library in this stack, so the cursor-addressable full-screen
//! redraw is built directly on `crossterm`, which the rest of the pack
//! reaches for when a progress bar isn't the right shape.

use std::io::Write;

use crossterm::{cursor, terminal, QueueableCommand};

use crate::error::ReelcatError;

/// A full-screen, cursor-addressable output surface.
///
/// Implementations must tolerate being driven from a single thread (the
/// Monitor's own ticker task) and must treat `Clear`/`Write*`/`Flush` as a
/// single logical frame: nothing is required to reach the terminal until
/// `flush` is called.
pub trait Display: Send {
    /// Enter the display's drawing mode (e.g. alternate screen, raw mode).
    fn init(&mut self) -> Result<(), ReelcatError>;
    /// Erase the current frame's contents without presenting anything yet.
    fn clear(&mut self) -> Result<(), ReelcatError>;
    /// Append a line to the frame being built.
    fn write(&mut self, line: &str) -> Result<(), ReelcatError>;
    /// Present the accumulated frame.
    fn flush(&mut self) -> Result<(), ReelcatError>;
    /// Leave drawing mode, restoring the terminal to its prior state.
    fn close(&mut self) -> Result<(), ReelcatError>;
}

/// Renders each tick as a redrawn block at the top of the terminal.
pub struct TerminalDisplay {
    out: std::io::Stdout,
    lines: Vec<String>,
}

impl TerminalDisplay {
    /// Construct a display bound to the process's stdout.
    pub fn new() -> Self {
        TerminalDisplay {
            out: std::io::stdout(),
            lines: Vec::new(),
        }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TerminalDisplay {
    fn init(&mut self) -> Result<(), ReelcatError> {
        terminal::enable_raw_mode().map_err(|e| ReelcatError::DisplayInit(e.to_string()))?;
        self.out
            .queue(terminal::EnterAlternateScreen)
            .and_then(|o| o.queue(cursor::Hide))
            .map_err(|e| ReelcatError::DisplayInit(e.to_string()))?;
        self.out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ReelcatError> {
        self.lines.clear();
        Ok(())
    }

    fn write(&mut self, line: &str) -> Result<(), ReelcatError> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReelcatError> {
        self.out
            .queue(cursor::MoveTo(0, 0))
            .and_then(|o| o.queue(terminal::Clear(terminal::ClearType::All)))
            .map_err(ReelcatError::Io)?;
        for line in &self.lines {
            for segment in line.split('\n') {
                write!(self.out, "{segment}\r\n")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReelcatError> {
        let _ = self.out.queue(cursor::Show);
        let _ = self.out.queue(terminal::LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
        Ok(())
    }
}

/// Discards every frame. Used for `--dry-run` and non-interactive runs.
#[derive(Default)]
pub struct NoOpDisplay;

impl Display for NoOpDisplay {
    fn init(&mut self) -> Result<(), ReelcatError> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ReelcatError> {
        Ok(())
    }

    fn write(&mut self, _line: &str) -> Result<(), ReelcatError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReelcatError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReelcatError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_display_never_errors() {
        let mut display = NoOpDisplay;
        display.init().unwrap();
        display.clear().unwrap();
        display.write("hello").unwrap();
        display.flush().unwrap();
        display.close().unwrap();
    }
}
