use tracing::debug;

use super::patterns::{self, Pattern};
use super::{COLOR_INPUT, Effect, InputSpec, Inputs};
use crate::display::{Display, Rgb, Style, draw_str};
use crate::error::Result;

const INPUTS: &[InputSpec] = &[
    InputSpec {
        name: "seed",
        default: "rand",
        description: "seed state. Values: dragon, gun, r, pulsar, glider, noise, rand",
    },
    COLOR_INPUT,
];

// Neighbor offsets, paired by index
const NBR_X: [i32; 8] = [1, -1, 0, 1, -1, 0, 1, -1];
const NBR_Y: [i32; 8] = [0, 0, -1, -1, -1, 1, 1, 1];

// Two-tone palettes: [born or survived with 2, survived with 3]
const BLUE: [Rgb; 2] = [(0, 191, 255), (0, 0, 255)];
const GREEN: [Rgb; 2] = [(0, 128, 0), (218, 165, 32)];
const RED: [Rgb; 2] = [(255, 255, 0), (255, 0, 0)];
const WHITE: [Rgb; 2] = [(255, 255, 255), (255, 215, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seed {
    Dragon,
    Gun,
    Noise,
    RPentomino,
    Pulsar,
    Glider,
}

impl Seed {
    const ALL: [Seed; 6] = [
        Seed::Dragon,
        Seed::Gun,
        Seed::Noise,
        Seed::RPentomino,
        Seed::Pulsar,
        Seed::Glider,
    ];

    fn from_name(name: &str) -> Option<Seed> {
        match name {
            "dragon" => Some(Seed::Dragon),
            "gun" => Some(Seed::Gun),
            "noise" => Some(Seed::Noise),
            "r" => Some(Seed::RPentomino),
            "pulsar" => Some(Seed::Pulsar),
            "glider" => Some(Seed::Glider),
            _ => None,
        }
    }

    /// Smallest grid the pattern lays out on without overlapping itself.
    fn min_size(self) -> (i32, i32) {
        match self {
            Seed::Gun => (50, 42),
            Seed::Pulsar => (40, 40),
            Seed::Dragon => (26, 30),
            Seed::RPentomino => (15, 15),
            Seed::Glider => (10, 10),
            Seed::Noise => (0, 0),
        }
    }

    fn palette(self) -> [Rgb; 2] {
        match self {
            Seed::Pulsar | Seed::RPentomino => RED,
            Seed::Gun | Seed::Noise => BLUE,
            Seed::Dragon => GREEN,
            Seed::Glider => WHITE,
        }
    }
}

#[derive(Clone, Copy)]
enum Orientation {
    Normal,
    MirrorX,
    MirrorY,
    Transpose,
}

pub struct LifeEffect {
    rng: fastrand::Rng,
    width: i32,
    height: i32,
    // 1 = alive, 0 = dead between generations; neighbor tallies mid-update
    cells: Vec<i32>,
    use_color: bool,
    colors: [Rgb; 2],
}

impl LifeEffect {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            width: 0,
            height: 0,
            cells: Vec::new(),
            use_color: false,
            colors: BLUE,
        }
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        let x = x.rem_euclid(self.width);
        let y = y.rem_euclid(self.height);
        (y * self.width + x) as usize
    }

    fn choose_seed(&mut self, name: &str) -> Seed {
        let requested = if name == "rand" {
            Seed::ALL[self.rng.usize(..Seed::ALL.len())]
        } else {
            Seed::from_name(name).unwrap_or_else(|| {
                debug!(seed = name, "unknown life seed, using noise");
                Seed::Noise
            })
        };

        // Default to noise if the terminal is too small
        let (min_w, min_h) = requested.min_size();
        if self.width < min_w || self.height < min_h {
            debug!(
                ?requested,
                width = self.width,
                height = self.height,
                "grid too small for seed, using noise"
            );
            return Seed::Noise;
        }
        requested
    }

    fn stamp(&mut self, pattern: Pattern, x0: i32, y0: i32, orientation: Orientation) {
        let rows = pattern.len() as i32;
        for (py, row) in pattern.iter().enumerate() {
            let cols = row.len() as i32;
            for (px, c) in row.bytes().enumerate() {
                let (px, py) = (px as i32, py as i32);
                let (dx, dy) = match orientation {
                    Orientation::Normal => (px, py),
                    Orientation::MirrorX => (cols - 1 - px, py),
                    Orientation::MirrorY => (px, rows - 1 - py),
                    Orientation::Transpose => (py, px),
                };
                let idx = self.idx(x0 + dx, y0 + dy);
                self.cells[idx] = i32::from(c == b'O');
            }
        }
    }

    fn init_state(&mut self, seed: Seed) {
        self.cells.fill(0);
        if self.cells.is_empty() {
            return;
        }

        let (w, h) = (self.width, self.height);
        let (t_x, t_y) = (w / 3, h / 3);
        let (h_x, h_y) = (w / 2, h / 2);

        match seed {
            Seed::Pulsar => {
                // Some oscillators
                self.stamp(patterns::PULSAR, h_x - 15, h_y - 17, Orientation::Normal);
                if h_x / 2 > 10 {
                    self.stamp(patterns::PENTADECATHLON, h_x / 2, h_y, Orientation::Normal);
                    self.stamp(patterns::PENTADECATHLON, 3 * h_x / 2, h_y, Orientation::Normal);
                }
            }
            Seed::Gun => {
                // Colliding glider guns
                self.stamp(patterns::GLIDER_GUN, 5, 5, Orientation::Normal);
                self.stamp(patterns::GLIDER_GUN, w - 10, 5, Orientation::MirrorX);
            }
            Seed::Dragon => {
                let mut n = 5;
                while n + 20 < w {
                    if n % 2 == 0 {
                        self.stamp(patterns::DRAGON, n, 2 * n * t_y, Orientation::Normal);
                    } else {
                        self.stamp(patterns::DRAGON, n, n * t_y, Orientation::MirrorY);
                    }
                    n += 27;
                }
            }
            Seed::RPentomino => {
                // Chaotic
                self.stamp(patterns::R_PENTOMINO, t_x, h_y, Orientation::Normal);
                self.stamp(patterns::R_PENTOMINO, 2 * t_x, h_y, Orientation::Transpose);
            }
            Seed::Noise => {
                for cell in self.cells.iter_mut() {
                    *cell = i32::from(self.rng.u32(..10) < 2);
                }
            }
            Seed::Glider => {
                // Glider fleet
                let mut k = 2;
                while k + 3 < w {
                    let row = self.rng.i32(0..h);
                    self.stamp(patterns::GLIDER, k, row, Orientation::Normal);
                    k += 15;
                }
            }
        }
        self.colors = seed.palette();
    }

    /// Replaces every cell with its encoded tally: alive cells become
    /// 1 + live neighbors, dead cells become -live neighbors. Cells already
    /// tallied keep their sign, so one in-place pass reads the old generation.
    fn tally_neighbors(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.idx(x, y);
                let delta = if self.cells[idx] > 0 { 1 } else { -1 };
                for k in 0..8 {
                    if self.cells[self.idx(x + NBR_X[k], y + NBR_Y[k])] > 0 {
                        self.cells[idx] += delta;
                    }
                }
            }
        }
    }
}

impl Effect for LifeEffect {
    fn inputs(&self) -> &'static [InputSpec] {
        INPUTS
    }

    fn initialize(&mut self, display: &dyn Display) {
        let (width, height) = display.size();
        self.width = width.max(0);
        self.height = height.max(0);
        self.cells = vec![0; (self.width * self.height) as usize];
    }

    fn set_inputs(&mut self, inputs: &Inputs) -> Result<()> {
        self.use_color = inputs.color_enabled("color")?;
        let name = inputs.get("seed").to_ascii_lowercase();
        let seed = self.choose_seed(&name);
        debug!(?seed, "seeding life grid");
        self.init_state(seed);
        Ok(())
    }

    fn update(&mut self, display: &mut dyn Display) -> Result<()> {
        self.tally_neighbors();

        // Next generation
        let plain = Style::default();
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.idx(x, y);
                let (alive, glyph, style) = match self.cells[idx] {
                    -3 | 3 if self.use_color => (true, "*", plain.fg(self.colors[0])),
                    4 if self.use_color => (true, "#", plain.fg(self.colors[1])),
                    -3 | 3 | 4 => (true, "*", plain),
                    _ => (false, " ", plain),
                };
                self.cells[idx] = i32::from(alive);
                draw_str(display, x, y, style, glyph);
            }
        }
        Ok(())
    }

    // Every cell is redrawn each generation
    fn clear(&mut self, _display: &mut dyn Display) {}
}

#[cfg(test)]
impl LifeEffect {
    fn alive(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[self.idx(x, y)] > 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn set_alive(&mut self, x: i32, y: i32) {
        let idx = self.idx(x, y);
        self.cells[idx] = 1;
    }
}
