use super::{Effect, InputSpec, Inputs};
use crate::display::{Display, Rgb, Style, draw_str};
use crate::error::Result;
use crate::geometry::Point;

const MAX_SPLATS: usize = 1000;

struct PaintCell {
    pos: Point,
    glyph: &'static str,
}

struct Splat {
    color: Rgb,
    cells: Vec<PaintCell>,
}

impl Splat {
    /// Drips one cell onto a random in-bounds neighbor of the newest cell.
    fn spread(&mut self, rng: &mut fastrand::Rng, width: i32, height: i32) {
        let Some(last) = self.cells.last() else {
            return;
        };
        let options: Vec<Point> = last
            .pos
            .neighbors4()
            .into_iter()
            .filter(|p| p.in_bounds(width, height))
            .collect();
        if options.is_empty() {
            return;
        }

        let pos = options[rng.usize(..options.len())];
        self.cells.push(PaintCell {
            pos,
            glyph: random_glyph(rng),
        });
    }
}

// Mostly solid paint, some speckle
fn random_glyph(rng: &mut fastrand::Rng) -> &'static str {
    match rng.u32(..10) {
        9 => "+",
        5..=8 => "*",
        _ => "#",
    }
}

pub struct PollockEffect {
    rng: fastrand::Rng,
    width: i32,
    height: i32,
    splats: Vec<Splat>,
}

impl PollockEffect {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            width: 0,
            height: 0,
            splats: Vec::new(),
        }
    }

    fn new_splat(&mut self) -> Splat {
        let color = (self.rng.u8(..), self.rng.u8(..), self.rng.u8(..));
        let pos = Point::new(self.rng.i32(0..self.width), self.rng.i32(0..self.height));
        Splat {
            color,
            cells: vec![PaintCell {
                pos,
                glyph: random_glyph(&mut self.rng),
            }],
        }
    }
}

impl Effect for PollockEffect {
    fn inputs(&self) -> &'static [InputSpec] {
        &[]
    }

    fn initialize(&mut self, display: &dyn Display) {
        (self.width, self.height) = display.size();
    }

    fn set_inputs(&mut self, _inputs: &Inputs) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, display: &mut dyn Display) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Ok(());
        }

        if self.rng.bool() {
            let splat = self.new_splat();
            self.splats.push(splat);
        }
        if self.splats.len() > MAX_SPLATS {
            self.splats.remove(0);
        }

        for splat in &mut self.splats {
            if self.rng.u32(..10) < 5 {
                splat.spread(&mut self.rng, self.width, self.height);
            }

            let style = Style::default().fg(splat.color);
            for cell in &splat.cells {
                draw_str(display, cell.pos.x, cell.pos.y, style, cell.glyph);
            }
        }
        Ok(())
    }

    // Paint accumulates on the canvas
    fn clear(&mut self, _display: &mut dyn Display) {}
}
