//! FIGlet fonts for the marquee banner.
//!
//! Parsing and glyph composition come from `figlet-rs`. This module adds the
//! built-in fonts, the font directory lookup and wrapping to the screen width.

use std::path::PathBuf;
use std::{env, fs, io};

use figlet_rs::FIGfont;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

const BUILTIN: &[(&str, &str)] = &[
    ("block", include_str!("../fonts/block.flf")),
    ("slant", include_str!("../fonts/slant.flf")),
    ("mini", include_str!("../fonts/mini.flf")),
];

const FONT_DIR_ENV: &str = "SCREENSAVER_FONT_DIR";
const DEFAULT_FONT_DIR: &str = "/usr/share/figlet";

// 95 printable ASCII glyphs plus the 7 Deutsch ones
const REQUIRED_GLYPHS: usize = 102;

pub struct Font {
    inner: FIGfont,
}

impl Font {
    pub fn parse(data: &str) -> Result<Font> {
        let data = data.trim_end();
        check_layout(data)?;
        let inner = FIGfont::from_content(data).map_err(Error::FontFormat)?;
        Ok(Font { inner })
    }

    /// The character actually drawn for `c`: itself, its uppercase form, or `?`.
    fn resolve(&self, c: char) -> Option<char> {
        [c, c.to_ascii_uppercase(), '?']
            .into_iter()
            .find(|candidate| self.inner.fonts.contains_key(&(*candidate as u32)))
    }

    fn glyph_width(&self, c: char) -> usize {
        self.inner
            .fonts
            .get(&(c as u32))
            .and_then(|glyph| glyph.characters.iter().map(|row| row.width()).max())
            .unwrap_or(0)
    }

    /// Lays `message` out as banner lines no wider than `max_width`, wrapping
    /// onto a new band of rows when the next glyph would not fit.
    pub fn render(&self, message: &str, max_width: usize) -> Vec<String> {
        let mut bands = Vec::new();
        let mut band = String::new();
        let mut band_width = 0;

        for c in message.chars().filter_map(|c| self.resolve(c)) {
            let width = self.glyph_width(c);
            if band_width > 0 && band_width + width > max_width {
                bands.push(std::mem::take(&mut band));
                band_width = 0;
            }
            band.push(c);
            band_width += width;
        }
        if !band.is_empty() {
            bands.push(band);
        }

        bands
            .iter()
            .filter_map(|band| self.inner.convert(band))
            .flat_map(|figure| {
                figure
                    .to_string()
                    .lines()
                    .map(|line| line.trim_end().to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Rejects files `FIGfont::from_content` cannot read: a bad header, fewer
/// than the required glyphs, rows too short to carry their end marks, or a
/// ragged code-tagged section.
fn check_layout(data: &str) -> Result<()> {
    let lines: Vec<&str> = data.lines().collect();
    let header = lines
        .first()
        .ok_or_else(|| Error::FontFormat("empty font file".into()))?;

    let fields: Vec<&str> = header.split(' ').collect();
    let signature = fields.first().copied().unwrap_or_default();
    if !signature.starts_with("flf2a") || signature.len() != 6 || !signature.is_ascii() {
        return Err(Error::FontFormat("missing flf2a signature".into()));
    }
    let number = |idx: usize, what: &str| -> Result<usize> {
        fields
            .get(idx)
            .and_then(|field| field.parse().ok())
            .ok_or_else(|| Error::FontFormat(format!("bad {what} in header")))
    };
    let height = number(1, "height")?;
    let comment_lines = number(5, "comment count")?;
    if height == 0 {
        return Err(Error::FontFormat("zero height".into()));
    }

    let body = lines.get(1 + comment_lines..).unwrap_or_default();
    if body.len() < REQUIRED_GLYPHS * height {
        return Err(Error::FontFormat("truncated glyph table".into()));
    }
    let (required, tagged) = body.split_at(REQUIRED_GLYPHS * height);
    if tagged.len() % (height + 1) != 0 {
        return Err(Error::FontFormat("ragged code-tagged glyphs".into()));
    }

    let rows = required
        .chunks(height)
        .chain(tagged.chunks(height + 1).map(|chunk| &chunk[1..]));
    for glyph in rows {
        for (i, row) in glyph.iter().enumerate() {
            let marks = if i + 1 == height && height > 1 { 2 } else { 1 };
            if row.len() < marks || !row.is_char_boundary(row.len() - marks) {
                return Err(Error::FontFormat("glyph row without end marks".into()));
            }
        }
    }
    Ok(())
}

/// Finds a font by name: built-in fonts first, then `<name>.flf` in the
/// font directory.
pub fn load(name: &str) -> Result<Font> {
    if let Some((_, data)) = BUILTIN.iter().find(|(builtin, _)| *builtin == name) {
        debug!(font = name, "using built-in font");
        return Font::parse(data);
    }

    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(Error::FontNotFound(name.to_string()));
    }

    let dir = env::var_os(FONT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_DIR));
    let path = dir.join(format!("{name}.flf"));
    match fs::read_to_string(&path) {
        Ok(data) => {
            debug!(font = name, path = %path.display(), "loading font file");
            Font::parse(&data)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(Error::FontNotFound(name.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}
