use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::display::{CellBuffer, Display, DisplayEvent, EventSource, Rgb, Style};

/// Full-screen crossterm surface. Owns raw mode and the alternate screen for
/// as long as it lives.
pub struct TerminalDisplay {
    stdout: RawGuard<BufWriter<Stdout>>,
    buffer: CellBuffer,
    default_style: Style,
    output_buf: Vec<u8>,
}

impl TerminalDisplay {
    pub fn new(default_style: Style) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let stdout = RawGuard::enter(BufWriter::with_capacity(1024 * 64, stdout()))?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            stdout,
            buffer: CellBuffer::new(cols as i32, rows as i32),
            default_style,
            output_buf: Vec::with_capacity(cols as usize * rows as usize * 25),
        })
    }
}

fn write_fg(out: &mut Vec<u8>, color: Option<Rgb>) -> io::Result<()> {
    match color {
        Some((r, g, b)) => write!(out, "\x1b[38;2;{r};{g};{b}m"),
        None => write!(out, "\x1b[39m"),
    }
}

fn write_bg(out: &mut Vec<u8>, color: Option<Rgb>) -> io::Result<()> {
    match color {
        Some((r, g, b)) => write!(out, "\x1b[48;2;{r};{g};{b}m"),
        None => write!(out, "\x1b[49m"),
    }
}

impl Display for TerminalDisplay {
    fn size(&self) -> (i32, i32) {
        self.buffer.size()
    }

    fn set_cell(&mut self, x: i32, y: i32, glyph: char, combining: &[char], style: Style) {
        self.buffer.set_cell(x, y, glyph, combining, style);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn present(&mut self) -> io::Result<()> {
        let out = &mut self.output_buf;
        out.clear();
        out.extend_from_slice(b"\x1b[H"); // Move to home

        let (_, height) = self.buffer.size();
        let mut utf8 = [0u8; 4];

        for (y, row) in self.buffer.rows().enumerate() {
            // None forces the first cell of each row to emit its colors
            let mut prev_fg: Option<Option<Rgb>> = None;
            let mut prev_bg: Option<Option<Rgb>> = None;
            let mut skip = 0;

            for cell in row {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let style = cell.style.over(self.default_style);

                // Only emit color codes if changed
                if prev_fg != Some(style.fg) {
                    write_fg(out, style.fg)?;
                    prev_fg = Some(style.fg);
                }
                if prev_bg != Some(style.bg) {
                    write_bg(out, style.bg)?;
                    prev_bg = Some(style.bg);
                }

                out.extend_from_slice(cell.glyph.encode_utf8(&mut utf8).as_bytes());
                for mark in &cell.combining {
                    out.extend_from_slice(mark.encode_utf8(&mut utf8).as_bytes());
                }
                // Wide glyphs cover the following cell
                skip = cell.glyph.width().unwrap_or(1).saturating_sub(1);
            }
            out.extend_from_slice(b"\x1b[0m");
            if (y as i32) + 1 < height {
                out.extend_from_slice(b"\r\n");
            }
        }

        self.stdout.out.write_all(&self.output_buf)?;
        self.stdout.out.flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        debug!(cols, rows, "resynchronizing display");
        self.buffer.resize(cols as i32, rows as i32);
        execute!(self.stdout.out, Clear(ClearType::All))
    }
}

/// Owns the output once raw mode is on. Dropping it shows the cursor, leaves
/// the alternate screen and disables raw mode, including when setup fails
/// part way.
struct RawGuard<W: Write> {
    out: W,
}

impl<W: Write> RawGuard<W> {
    fn enter(out: W) -> io::Result<Self> {
        let mut guard = Self { out };
        execute!(guard.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(guard)
    }
}

impl<W: Write> Drop for RawGuard<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Terminal events from crossterm, reduced to what the render loop cares about.
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll_event(&mut self) -> io::Result<DisplayEvent> {
        loop {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    return Ok(DisplayEvent::KeyPressed);
                }
                Event::Resize(_, _) => return Ok(DisplayEvent::Resized),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Rejects the first write, then records everything.
    struct FailsOnce {
        failed: bool,
        written: Rc<RefCell<Vec<u8>>>,
    }

    impl Write for FailsOnce {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(io::Error::other("terminal went away"));
            }
            self.written.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_setup_still_restores_the_screen() {
        let written = Rc::new(RefCell::new(Vec::new()));
        let out = FailsOnce {
            failed: false,
            written: Rc::clone(&written),
        };

        assert!(RawGuard::enter(out).is_err());
        let text = String::from_utf8(written.borrow().clone()).unwrap();
        assert!(text.contains("\x1b[?25h"), "cursor not shown: {text:?}");
        assert!(text.contains("\x1b[?1049l"), "alternate screen not left: {text:?}");
    }

    #[test]
    fn dropping_the_guard_restores_the_screen() {
        let mut out = Vec::new();
        drop(RawGuard::enter(&mut out).unwrap());
        let text = String::from_utf8(out).unwrap();
        let entered = text.find("\x1b[?1049h").unwrap();
        let left = text.find("\x1b[?1049l").unwrap();
        assert!(entered < left);
    }
}
