use super::{COLOR_INPUT, Effect, InputSpec, Inputs};
use crate::display::{Display, Rgb, Style, draw_str};
use crate::error::Result;
use crate::geometry::{Direction, Point};

const INPUTS: &[InputSpec] = &[COLOR_INPUT];

// Oldest pipes are dropped past this many
const MAX_PIPES: usize = 64;

struct Pipe {
    points: Vec<Point>,
    color: Rgb,
}

impl Pipe {
    fn heading(&self) -> Option<Direction> {
        match self.points.as_slice() {
            [.., prev, last] => prev.direction_to(*last),
            _ => None,
        }
    }

    fn previous_heading(&self) -> Option<Direction> {
        match self.points.as_slice() {
            [.., a, b, _] => a.direction_to(*b),
            _ => None,
        }
    }

    /// Cells the pipe may grow into next: in bounds, never back onto the
    /// previous point, and straight ahead only right after a bend.
    fn valid_moves(&self, width: i32, height: i32) -> Vec<Point> {
        let Some(&last) = self.points.last() else {
            return Vec::new();
        };
        let heading = self.heading();
        let just_turned = matches!(
            (self.previous_heading(), heading),
            (Some(before), Some(now)) if before != now
        );

        Direction::ALL
            .into_iter()
            .filter(|&dir| match heading {
                Some(now) if just_turned => dir == now,
                Some(now) => dir != now.opposite(),
                None => true,
            })
            .map(|dir| last.step(dir))
            .filter(|p| p.in_bounds(width, height))
            .filter(|p| self.points.len() < 2 || *p != self.points[self.points.len() - 2])
            .collect()
    }

    fn draw(&self, display: &mut dyn Display, style: Style) {
        for (i, point) in self.points.iter().enumerate() {
            let incoming = i.checked_sub(1).and_then(|j| self.points[j].direction_to(*point));
            let outgoing = self.points.get(i + 1).and_then(|next| point.direction_to(*next));
            draw_str(display, point.x, point.y, style, glyph(incoming, outgoing));
        }
    }
}

fn glyph(incoming: Option<Direction>, outgoing: Option<Direction>) -> &'static str {
    use Direction::*;

    match (incoming, outgoing) {
        (Some(a), Some(b)) if a == b => {
            if a.is_vertical() {
                "│"
            } else {
                "─"
            }
        }
        (Some(Up), Some(Right)) | (Some(Left), Some(Down)) => "┌",
        (Some(Up), Some(Left)) | (Some(Right), Some(Down)) => "┐",
        (Some(Down), Some(Right)) | (Some(Left), Some(Up)) => "└",
        (Some(Down), Some(Left)) | (Some(Right), Some(Up)) => "┘",
        (Some(dir), None) | (None, Some(dir)) => {
            if dir.is_vertical() {
                "│"
            } else {
                "─"
            }
        }
        _ => "•",
    }
}

pub struct PipesEffect {
    rng: fastrand::Rng,
    color: bool,
    pipes: Vec<Pipe>,
}

impl PipesEffect {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            color: false,
            pipes: Vec::new(),
        }
    }

    fn spawn(&mut self, width: i32, height: i32) {
        let origin = match self.rng.u8(..4) {
            0 => Point::new(self.rng.i32(0..width), 0),
            1 => Point::new(width - 1, self.rng.i32(0..height)),
            2 => Point::new(self.rng.i32(0..width), height - 1),
            _ => Point::new(0, self.rng.i32(0..height)),
        };
        let color = (self.rng.u8(..), self.rng.u8(..), self.rng.u8(..));
        self.pipes.push(Pipe {
            points: vec![origin],
            color,
        });
        if self.pipes.len() > MAX_PIPES {
            self.pipes.remove(0);
        }
    }
}

impl Effect for PipesEffect {
    fn inputs(&self) -> &'static [InputSpec] {
        INPUTS
    }

    fn initialize(&mut self, _display: &dyn Display) {}

    fn set_inputs(&mut self, inputs: &Inputs) -> Result<()> {
        self.color = inputs.color_enabled("color")?;
        Ok(())
    }

    fn update(&mut self, display: &mut dyn Display) -> Result<()> {
        let (width, height) = display.size();
        if width <= 0 || height <= 0 {
            return Ok(());
        }

        if self.rng.u32(..10) < 1 {
            self.spawn(width, height);
        }

        for pipe in &mut self.pipes {
            let moves = pipe.valid_moves(width, height);
            // A boxed-in pipe waits
            if !moves.is_empty() {
                let next = moves[self.rng.usize(..moves.len())];
                pipe.points.push(next);
            }
        }

        for pipe in &self.pipes {
            let style = if self.color {
                Style::default().fg(pipe.color)
            } else {
                Style::default()
            };
            pipe.draw(display, style);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::CellBuffer;
    use proptest::prelude::*;

    fn run_pipes(width: i32, height: i32, seed: u64, ticks: usize) -> PipesEffect {
        let mut buf = CellBuffer::new(width, height);
        let mut effect = PipesEffect::new(fastrand::Rng::with_seed(seed));
        effect.initialize(&buf);
        effect.set_inputs(&Inputs::parse(INPUTS, &[]).unwrap()).unwrap();
        for _ in 0..ticks {
            effect.update(&mut buf).unwrap();
        }
        effect
    }

    fn pipe(points: &[(i32, i32)]) -> Pipe {
        Pipe {
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            color: (0, 0, 0),
        }
    }

    #[test]
    fn pipes_start_on_an_edge() {
        let effect = run_pipes(20, 10, 3, 200);
        assert!(!effect.pipes.is_empty());
        for pipe in &effect.pipes {
            let origin = pipe.points[0];
            assert!(origin.x == 0 || origin.y == 0 || origin.x == 19 || origin.y == 9);
        }
    }

    #[test]
    fn must_go_straight_after_a_bend() {
        // Heading right, then turned down
        let p = pipe(&[(1, 1), (2, 1), (2, 2)]);
        assert_eq!(p.valid_moves(10, 10), vec![Point::new(2, 3)]);
    }

    #[test]
    fn straight_run_may_turn_but_not_reverse() {
        let p = pipe(&[(1, 5), (2, 5), (3, 5)]);
        let moves = p.valid_moves(10, 10);
        assert_eq!(moves.len(), 3);
        assert!(!moves.contains(&Point::new(2, 5)));
    }

    #[test]
    fn pipe_stalls_when_boxed_in() {
        // Just bent into the corner, straight ahead is off screen
        let p = pipe(&[(8, 0), (9, 0), (9, 1)]);
        assert_eq!(p.valid_moves(10, 2), Vec::<Point>::new());
    }

    #[test]
    fn oldest_pipe_is_evicted_past_the_cap() {
        let mut effect = PipesEffect::new(fastrand::Rng::with_seed(5));
        let tagged = |color: Rgb| Pipe {
            points: vec![Point::new(0, 0)],
            color,
        };
        effect.pipes.push(tagged((1, 1, 1)));
        effect.pipes.push(tagged((2, 2, 2)));
        while effect.pipes.len() < MAX_PIPES {
            effect.pipes.push(tagged((0, 0, 0)));
        }

        effect.spawn(20, 10);
        assert_eq!(effect.pipes.len(), MAX_PIPES);
        assert_eq!(effect.pipes[0].color, (2, 2, 2));
        assert!(effect.pipes.iter().all(|pipe| pipe.color != (1, 1, 1)));
        assert_eq!(effect.pipes[MAX_PIPES - 1].points.len(), 1);
    }

    #[test]
    fn bend_glyphs_follow_directions() {
        assert_eq!(glyph(Some(Direction::Right), Some(Direction::Down)), "┐");
        assert_eq!(glyph(Some(Direction::Down), Some(Direction::Right)), "└");
        assert_eq!(glyph(Some(Direction::Up), Some(Direction::Up)), "│");
        assert_eq!(glyph(None, None), "•");
    }

    #[test]
    fn monochrome_pipes_use_plain_style() {
        let mut buf = CellBuffer::new(15, 15);
        let mut effect = PipesEffect::new(fastrand::Rng::with_seed(8));
        effect.initialize(&buf);
        let args = vec!["--color".to_string(), "off".to_string()];
        effect.set_inputs(&Inputs::parse(INPUTS, &args).unwrap()).unwrap();
        for _ in 0..100 {
            effect.update(&mut buf).unwrap();
        }
        assert!(buf.rows().flatten().any(|cell| cell.glyph != ' '));
        assert!(buf.rows().flatten().all(|cell| cell.style.fg.is_none()));
    }

    proptest! {
        #[test]
        fn paths_never_backtrack(seed in any::<u64>(), width in 2i32..40, height in 2i32..25) {
            let effect = run_pipes(width, height, seed, 150);
            for pipe in &effect.pipes {
                for w in pipe.points.windows(3) {
                    prop_assert_ne!(w[2], w[0]);
                }
                for w in pipe.points.windows(2) {
                    prop_assert!(w[0].direction_to(w[1]).is_some());
                }
                for w in pipe.points.windows(4) {
                    let turned = w[0].direction_to(w[1]) != w[1].direction_to(w[2]);
                    if turned {
                        prop_assert_eq!(w[1].direction_to(w[2]), w[2].direction_to(w[3]));
                    }
                }
                for p in &pipe.points {
                    prop_assert!(p.in_bounds(width, height));
                }
            }
        }
    }
}
