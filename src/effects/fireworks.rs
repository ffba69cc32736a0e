use super::{COLOR_INPUT, Effect, InputSpec, Inputs};
use crate::display::{Display, Rgb, Style, draw_str};
use crate::error::Result;
use crate::sprite::{Frame, Sprite};

const INPUTS: &[InputSpec] = &[COLOR_INPUT];

// Base color and its light variant, alternated by frame
const COLORS: [(Rgb, Rgb); 12] = [
    ((0, 0, 255), (173, 216, 230)),     // Blue
    ((255, 127, 80), (240, 128, 128)),  // Coral
    ((218, 165, 32), (250, 250, 210)),  // Goldenrod
    ((128, 128, 128), (211, 211, 211)), // Gray
    ((0, 128, 0), (144, 238, 144)),     // Green
    ((255, 192, 203), (255, 182, 193)), // Pink
    ((250, 128, 114), (255, 160, 122)), // Salmon
    ((46, 139, 87), (32, 178, 170)),    // Sea green
    ((0, 191, 255), (135, 206, 250)),   // Sky blue
    ((112, 128, 144), (119, 136, 153)), // Slate gray
    ((70, 130, 180), (176, 196, 222)),  // Steel blue
    ((255, 255, 0), (255, 255, 224)),   // Yellow
];

const PARENS_TRAIL: &[Frame] = &[&["("], &["|"], &[")"]];
const SPARKY_TRAIL: &[Frame] = &[&["*"], &["x"], &["."]];
const BANG_TRAIL: &[Frame] = &[&["i"], &["!"], &["|"]];

const TRAILS: [&[Frame]; 3] = [SPARKY_TRAIL, PARENS_TRAIL, BANG_TRAIL];

// Explosion frames are 13 columns by 5 rows, centered on column 6, row 2
const TINY_BOOMER: &[Frame] = &[
    &["", "", "      .", "", ""],
    &["", "      *", "", "", ""],
    &["", "     * *", "    * * *", "     * *", ""],
    &["    *   *", "", "   *     *", "", "    *   *"],
    &["", "", "", "", ""],
];

const BASIC_EXPLODE: &[Frame] = &[
    &["", "", "      *", "", ""],
    &["", "", "     ( )", "", ""],
    &["", "      ^", "     ( )", "      v", ""],
    &["", "    * ^ *", "   (     )", "    * v *", ""],
    &["   \\     /", "    *   *", "   (     )", "    *   *", "   /     \\"],
    &["   \\     /", "    *   *", "", "    *   *", "   /     \\"],
    &["   \\     /", "", "", "", "   /     \\"],
    &["", "", "", "", ""],
];

const SPARKLY: &[Frame] = &[
    &["", "     * *", "      *  *", "       *", ""],
    &["        *", "       *", "    * *  *", "       *  *", "    *"],
    &["  *    *   *", "     *   *", "    *  * *", "   *   *    *", "    *    *"],
    &["  * *      *", "     *   *", "       *    *", "   *   *    *", " *  *    *   *"],
    &["    *    *  *", "     *", "      *   * *", "   *   * *", " * *     *   *"],
    &["    *    *", "", "      *     *", "", " *       *   *"],
    &["", "", "", "", ""],
];

const EXPLOSIONS: [&[Frame]; 3] = [TINY_BOOMER, BASIC_EXPLODE, SPARKLY];

const EXPLOSION_CENTER: (i32, i32) = (6, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ascending,
    Exploding,
    Done,
}

struct Firework {
    colors: (Rgb, Rgb),
    trail: Sprite,
    explosion: Sprite,
    x: i32,
    y: i32,
    // Row at which the shell bursts
    burst_y: i32,
    phase: Phase,
}

impl Firework {
    fn random(rng: &mut fastrand::Rng, width: i32, height: i32) -> Self {
        Self {
            colors: COLORS[rng.usize(..COLORS.len())],
            trail: Sprite::looping(TRAILS[rng.usize(..TRAILS.len())]),
            explosion: Sprite::new(EXPLOSIONS[rng.usize(..EXPLOSIONS.len())]),
            x: rng.i32(5..width),
            y: height,
            burst_y: rng.i32(0..height - 8),
            phase: Phase::Ascending,
        }
    }

    fn step(&mut self) {
        match self.phase {
            Phase::Ascending => {
                if self.y <= self.burst_y {
                    self.phase = Phase::Exploding;
                } else {
                    self.y -= 1;
                }
            }
            Phase::Exploding => {
                if self.explosion.done() {
                    self.phase = Phase::Done;
                }
            }
            Phase::Done => {}
        }
    }

    fn done(&self) -> bool {
        self.phase == Phase::Done
    }

    fn draw(&mut self, display: &mut dyn Display, use_color: bool) {
        let sprite = match self.phase {
            Phase::Ascending => &mut self.trail,
            Phase::Exploding => &mut self.explosion,
            Phase::Done => return,
        };
        let Some(frame) = sprite.current() else {
            return;
        };

        let style = if !use_color {
            Style::default()
        } else if sprite.frame_index() % 2 == 1 {
            Style::default().fg(self.colors.1)
        } else {
            Style::default().fg(self.colors.0)
        };

        let (left, top) = match self.phase {
            Phase::Exploding => (self.x - EXPLOSION_CENTER.0, self.y - EXPLOSION_CENTER.1),
            _ => (self.x, self.y),
        };
        for (row, line) in frame.iter().enumerate() {
            // Blank art is transparent
            for (col, c) in line.char_indices() {
                if c != ' ' {
                    let glyph = &line[col..col + c.len_utf8()];
                    draw_str(display, left + col as i32, top + row as i32, style, glyph);
                }
            }
        }

        sprite.advance();
    }
}

pub struct FireworksEffect {
    rng: fastrand::Rng,
    color: bool,
    fireworks: Vec<Firework>,
}

impl FireworksEffect {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            color: false,
            fireworks: Vec::new(),
        }
    }
}

impl Effect for FireworksEffect {
    fn inputs(&self) -> &'static [InputSpec] {
        INPUTS
    }

    fn initialize(&mut self, _display: &dyn Display) {}

    fn set_inputs(&mut self, inputs: &Inputs) -> Result<()> {
        self.color = inputs.color_enabled("color")?;
        Ok(())
    }

    fn update(&mut self, display: &mut dyn Display) -> Result<()> {
        for firework in &mut self.fireworks {
            firework.step();
        }
        self.fireworks.retain(|firework| !firework.done());

        for firework in &mut self.fireworks {
            firework.draw(display, self.color);
        }

        let (width, height) = display.size();
        if width > 5 && height > 8 && self.rng.u32(..10) < 1 {
            let firework = Firework::random(&mut self.rng, width, height);
            self.fireworks.push(firework);
        }
        Ok(())
    }
}
