use super::{Effect, InputSpec, Inputs};
use crate::display::{Display, Style, draw_str};
use crate::error::{Error, Result};

const INPUTS: &[InputSpec] = &[
    InputSpec {
        name: "speed",
        default: "4",
        description: "how fast to fly through the stars",
    },
    InputSpec {
        name: "density",
        default: "300",
        description: "number of stars in flight",
    },
];

const NEAR: f64 = 0.1;
const FAR: f64 = 10.0;
// Terminal cells are about twice as tall as they are wide
const FONT_ASPECT: f64 = 0.5;
const FOV_DEGREES: f64 = 45.0;

/// Column-major 4x4 matrix.
type Matrix = [f64; 16];

#[rustfmt::skip]
fn perspective(fov: f64, aspect: f64, near: f64, far: f64) -> Matrix {
    let f = 1.0 / (fov * 0.5).tan();
    [
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (far + near) / (far - near), -1.0,
        0.0, 0.0, (2.0 * near * far) / (far - near), 0.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    // Homogeneous position, w = 1
    vec: [f64; 4],
}

impl Star {
    fn random(rng: &mut fastrand::Rng, aspect: f64) -> Self {
        Self {
            vec: [
                (rng.f64() * 2.0 - 1.0) * 4.0 * aspect,
                (rng.f64() * 2.0 - 1.0) * 4.0,
                -FAR,
                1.0,
            ],
        }
    }

    /// Normalized device coordinates after the perspective divide.
    fn project(&self, m: &Matrix) -> [f64; 3] {
        let v = &self.vec;
        let mut out = [0.0; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = v[0] * m[row] + v[1] * m[4 + row] + v[2] * m[8 + row] + v[3] * m[12 + row];
        }
        [out[0] / out[3], out[1] / out[3], out[2] / out[3]]
    }

    fn distance_squared(&self) -> f64 {
        self.vec[..3].iter().map(|c| c * c).sum()
    }
}

pub struct StarfieldEffect {
    rng: fastrand::Rng,
    width: i32,
    height: i32,
    aspect: f64,
    projection: Matrix,
    speed: f64,
    density: usize,
    stars: Vec<Star>,
}

impl StarfieldEffect {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            width: 0,
            height: 0,
            aspect: 1.0,
            projection: perspective(FOV_DEGREES.to_radians(), 1.0, NEAR, FAR),
            speed: 4.0,
            density: 300,
            stars: Vec::new(),
        }
    }

    /// Screen cell for a star, if it lands on the grid.
    fn screen_position(&self, star: &Star) -> Option<(i32, i32)> {
        let ndc = star.project(&self.projection);
        let x = ((ndc[0] + 1.0) * 0.5 * self.width as f64).floor();
        let y = ((-ndc[1] + 1.0) * 0.5 * self.height as f64).floor();
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (x, y) = (x as i32, y as i32);
        (x >= 0 && x < self.width && y >= 0 && y < self.height).then_some((x, y))
    }
}

fn appearance(distance_squared: f64) -> (&'static str, Style) {
    if distance_squared > 50.0 {
        (".", Style::default().fg((110, 110, 120)))
    } else if distance_squared > 20.0 {
        ("*", Style::default().fg((180, 180, 190)))
    } else {
        ("#", Style::default().fg((255, 255, 255)))
    }
}

impl Effect for StarfieldEffect {
    fn inputs(&self) -> &'static [InputSpec] {
        INPUTS
    }

    fn initialize(&mut self, display: &dyn Display) {
        (self.width, self.height) = display.size();
        self.aspect = if self.height > 0 {
            self.width as f64 / self.height as f64 * FONT_ASPECT
        } else {
            1.0
        };
        self.projection = perspective(FOV_DEGREES.to_radians(), self.aspect, NEAR, FAR);
    }

    fn set_inputs(&mut self, inputs: &Inputs) -> Result<()> {
        let speed = inputs.get("speed");
        self.speed = speed
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .ok_or_else(|| Error::option_parse("speed", speed, "expected a number"))?;

        let density = inputs.get("density");
        self.density = density
            .trim()
            .parse::<usize>()
            .map_err(|e| Error::option_parse("density", density, e.to_string()))?;
        Ok(())
    }

    fn update(&mut self, display: &mut dyn Display) -> Result<()> {
        while self.stars.len() < self.density {
            let star = Star::random(&mut self.rng, self.aspect);
            self.stars.push(star);
        }

        let step = self.speed * 0.04;
        let mut next = Vec::with_capacity(self.stars.len());
        for mut star in std::mem::take(&mut self.stars) {
            // Past the near plane, or somehow beyond the far one
            if star.vec[2] > -NEAR || star.vec[2] < -FAR {
                continue;
            }
            let Some((x, y)) = self.screen_position(&star) else {
                continue;
            };

            let (glyph, style) = appearance(star.distance_squared());
            draw_str(display, x, y, style, glyph);
            star.vec[2] += step;
            next.push(star);
        }
        self.stars = next;
        Ok(())
    }
}
