use std::io;

use unicode_width::UnicodeWidthChar;

pub type Rgb = (u8, u8, u8);

/// Foreground/background pair for a cell. `None` defers to the display's
/// default style when the frame is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

impl Style {
    pub fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Fills unset colors from `base`.
    pub fn over(self, base: Style) -> Style {
        Style {
            fg: self.fg.or(base.fg),
            bg: self.bg.or(base.bg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub combining: Vec<char>,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            combining: Vec::new(),
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    KeyPressed,
    Resized,
}

/// Character-grid surface the effects draw on.
pub trait Display {
    fn size(&self) -> (i32, i32);
    fn set_cell(&mut self, x: i32, y: i32, glyph: char, combining: &[char], style: Style);
    fn clear(&mut self);
    fn present(&mut self) -> io::Result<()>;
    /// Re-reads the output device after a resize.
    fn sync(&mut self) -> io::Result<()>;
}

/// Blocking source of terminal events, polled from the input watcher thread.
pub trait EventSource {
    fn poll_event(&mut self) -> io::Result<DisplayEvent>;
}

/// In-memory cell grid. The terminal display renders from one of these, and
/// tests drive effects against it directly.
#[derive(Debug, Clone)]
pub struct CellBuffer {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width * height) as usize],
        }
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        *self = Self::new(width, height);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }
}

impl Display for CellBuffer {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn set_cell(&mut self, x: i32, y: i32, glyph: char, combining: &[char], style: Style) {
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.cells[idx];
            cell.glyph = glyph;
            cell.combining.clear();
            cell.combining.extend_from_slice(combining);
            cell.style = style;
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes `text` starting at (x, y), advancing by each glyph's cell width.
/// Zero-width code points are drawn as a space carrying the mark, so the
/// cursor still moves exactly one cell.
pub fn draw_str(display: &mut dyn Display, x: i32, y: i32, style: Style, text: &str) {
    let mut x = x;
    for c in text.chars() {
        match c.width() {
            Some(0) | None => {
                display.set_cell(x, y, ' ', &[c], style);
                x += 1;
            }
            Some(w) => {
                display.set_cell(x, y, c, &[], style);
                x += w as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_ignores_out_of_range() {
        let mut buf = CellBuffer::new(3, 2);
        buf.set_cell(-1, 0, 'x', &[], Style::default());
        buf.set_cell(3, 1, 'x', &[], Style::default());
        buf.set_cell(0, 2, 'x', &[], Style::default());
        assert!(buf.rows().flatten().all(|cell| cell.glyph == ' '));
    }

    #[test]
    fn draw_str_clips_at_left_edge() {
        let mut buf = CellBuffer::new(4, 1);
        draw_str(&mut buf, -2, 0, Style::default(), "abcd");
        let row: String = buf.rows().next().unwrap().iter().map(|c| c.glyph).collect();
        assert_eq!(row, "cd  ");
    }

    #[test]
    fn draw_str_turns_zero_width_into_combining() {
        let mut buf = CellBuffer::new(4, 1);
        draw_str(&mut buf, 0, 0, Style::default(), "a\u{301}b");
        let mark = buf.get(1, 0).unwrap();
        assert_eq!(mark.glyph, ' ');
        assert_eq!(mark.combining, vec!['\u{301}']);
        assert_eq!(buf.get(2, 0).unwrap().glyph, 'b');
    }

    #[test]
    fn draw_str_advances_two_cells_for_wide_glyphs() {
        let mut buf = CellBuffer::new(4, 1);
        draw_str(&mut buf, 0, 0, Style::default(), "日x");
        assert_eq!(buf.get(0, 0).unwrap().glyph, '日');
        assert_eq!(buf.get(2, 0).unwrap().glyph, 'x');
    }

    #[test]
    fn clear_resets_style() {
        let mut buf = CellBuffer::new(2, 2);
        buf.set_cell(1, 1, '#', &[], Style::default().fg((1, 2, 3)));
        buf.clear();
        assert_eq!(buf.get(1, 1), Some(&Cell::default()));
    }

    #[test]
    fn style_over_fills_unset_colors() {
        let base = Style::default().fg((9, 9, 9)).bg((1, 1, 1));
        let style = Style::default().fg((200, 0, 0)).over(base);
        assert_eq!(style.fg, Some((200, 0, 0)));
        assert_eq!(style.bg, Some((1, 1, 1)));
    }
}
