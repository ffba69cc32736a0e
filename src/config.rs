use anyhow::{Context, Result, bail};

use crate::display::Rgb;

pub const DEFAULT_EFFECT: &str = "fireworks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub effect: String,
    pub repository: Option<String>,
    pub list: bool,
    pub help: bool,
    pub bg_color: Option<Rgb>,
    pub effect_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            effect: DEFAULT_EFFECT.to_string(),
            repository: None,
            list: false,
            help: false,
            bg_color: None,
            effect_args: Vec::new(),
        }
    }
}

impl Config {
    /// Parses the command line, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut config = Config::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--" => {
                    config.effect_args = args[i + 1..].to_vec();
                    break;
                }
                "-s" | "--saver" => {
                    config.effect = value(args, i)?.to_string();
                    i += 2;
                }
                "-R" | "--repo" => {
                    config.repository = Some(value(args, i)?.to_string());
                    i += 2;
                }
                "--bg-color" => {
                    let hex = value(args, i)?;
                    let color = parse_hex_color(hex).with_context(|| {
                        format!("invalid hex color {hex:?}, expected RRGGBB (e.g. 1a1b26)")
                    })?;
                    config.bg_color = Some(color);
                    i += 2;
                }
                "-l" | "--list" => {
                    config.list = true;
                    i += 1;
                }
                "help" | "-h" | "--help" => {
                    config.help = true;
                    i += 1;
                }
                arg if arg.starts_with('-') => bail!("unknown option: {arg}"),
                arg => {
                    config.effect = arg.to_string();
                    i += 1;
                }
            }
        }

        Ok(config)
    }
}

fn value(args: &[String], i: usize) -> Result<&str> {
    match args.get(i + 1) {
        Some(value) => Ok(value),
        None => bail!("{} requires a value", args[i]),
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
