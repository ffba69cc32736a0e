/// A frame is a block of ASCII art, one string per row.
pub type Frame = &'static [&'static str];

/// Frame sequence advanced one step per tick.
#[derive(Debug, Clone)]
pub struct Sprite {
    frames: &'static [Frame],
    frame: usize,
    looping: bool,
}

impl Sprite {
    pub fn new(frames: &'static [Frame]) -> Self {
        Self {
            frames,
            frame: 0,
            looping: false,
        }
    }

    pub fn looping(frames: &'static [Frame]) -> Self {
        Self {
            frames,
            frame: 0,
            looping: true,
        }
    }

    pub fn advance(&mut self) {
        if self.done() {
            return;
        }
        self.frame += 1;
        if self.looping && self.frame == self.frame_count() {
            self.frame = 0;
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// `None` once a non-looping sprite has played out.
    pub fn current(&self) -> Option<Frame> {
        self.frames.get(self.frame).copied()
    }

    pub fn done(&self) -> bool {
        self.frame == self.frame_count()
    }
}
