use tracing::debug;
use unicode_width::UnicodeWidthStr;

use super::{Effect, InputSpec, Inputs};
use crate::display::{Display, Style, draw_str};
use crate::error::{Error, Result};
use crate::font;

const INPUTS: &[InputSpec] = &[
    InputSpec {
        name: "font",
        default: "slant",
        description: "FIGlet font to render the message in",
    },
    InputSpec {
        name: "message",
        default: "text is cool",
        description: "text to scroll across the screen",
    },
];

pub struct MarqueeEffect {
    rng: fastrand::Rng,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    // None until options are applied; an empty banner is valid
    banner: Option<Vec<String>>,
    banner_width: i32,
}

impl MarqueeEffect {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            rng,
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            banner: None,
            banner_width: 0,
        }
    }

    fn banner_height(&self) -> i32 {
        self.banner.as_ref().map_or(0, |banner| banner.len() as i32)
    }
}

impl Effect for MarqueeEffect {
    fn inputs(&self) -> &'static [InputSpec] {
        INPUTS
    }

    fn initialize(&mut self, display: &dyn Display) {
        (self.width, self.height) = display.size();
        self.x = self.width;
    }

    fn set_inputs(&mut self, inputs: &Inputs) -> Result<()> {
        let font = font::load(inputs.get("font"))?;
        let max_width = self.width.max(1) as usize;
        let banner = font.render(inputs.get("message"), max_width);
        self.banner_width = banner.iter().map(|line| line.width() as i32).max().unwrap_or(0);
        self.banner = Some(banner);

        self.x = self.width;
        self.y = ((self.height - self.banner_height()) / 2).max(0);
        debug!(
            lines = self.banner_height(),
            banner_width = self.banner_width,
            "rendered marquee banner"
        );
        Ok(())
    }

    fn update(&mut self, display: &mut dyn Display) -> Result<()> {
        if self.banner.is_none() {
            return Err(Error::NotConfigured("marquee"));
        }

        self.x -= 1;
        if self.x + self.banner_width < 0 {
            self.x = self.width;
            let room = (self.height - self.banner_height()).max(1);
            self.y = self.rng.i32(0..room);
        }

        for (i, line) in self.banner.iter().flatten().enumerate() {
            draw_str(display, self.x, self.y + i as i32, Style::default(), line);
        }
        Ok(())
    }
}
