use std::collections::HashMap;

use tracing::debug;

use crate::display::Display;
use crate::error::{Error, Result};

pub mod fireworks;
pub mod life;
pub mod marquee;
mod patterns;
pub mod pipes;
pub mod pollock;
pub mod starfield;

/// One animation. The render loop calls `clear` then `update` once per tick.
pub trait Effect {
    /// Options this effect understands, with their defaults.
    fn inputs(&self) -> &'static [InputSpec];

    /// Captures whatever the effect needs from the display before options
    /// are applied (grid size, mostly).
    fn initialize(&mut self, display: &dyn Display);

    fn set_inputs(&mut self, inputs: &Inputs) -> Result<()>;

    fn update(&mut self, display: &mut dyn Display) -> Result<()>;

    /// Effects that keep their previous frame override this with a no-op.
    fn clear(&mut self, display: &mut dyn Display) {
        display.clear();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

pub const COLOR_INPUT: InputSpec = InputSpec {
    name: "color",
    default: "full",
    description: "whether to use full color or monochrome. Values: full, off",
};

/// Resolved effect options: every declared input has a value.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: HashMap<&'static str, String>,
}

impl Inputs {
    /// Parses `--key value` / `--key=value` pairs against `specs`. Keys the
    /// effect doesn't declare are skipped; undeclared keys keep their default.
    pub fn parse(specs: &'static [InputSpec], args: &[String]) -> Result<Self> {
        let mut values: HashMap<&'static str, String> = specs
            .iter()
            .map(|spec| (spec.name, spec.default.to_string()))
            .collect();

        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
                debug!(arg = %arg, "ignoring stray effect argument");
                continue;
            };

            let (key, value) = match flag.split_once('=') {
                Some((key, value)) => (key, value.to_string()),
                None => match args.next() {
                    Some(value) => (flag, value.clone()),
                    None => return Err(Error::option_parse(flag, "", "missing value")),
                },
            };

            match specs.iter().find(|spec| spec.name == key) {
                Some(spec) => {
                    values.insert(spec.name, value);
                }
                None => debug!(option = key, "ignoring unknown effect option"),
            }
        }

        Ok(Self { values })
    }

    /// Value for a declared input. Undeclared names read as empty.
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Reads a `full`/`off` toggle.
    pub fn color_enabled(&self, name: &str) -> Result<bool> {
        let value = self.get(name);
        match value.to_ascii_lowercase().as_str() {
            "full" => Ok(true),
            "off" => Ok(false),
            _ => Err(Error::option_parse(name, value, "expected full or off")),
        }
    }
}

pub type EffectFactory = fn(fastrand::Rng) -> Box<dyn Effect>;

pub struct EffectEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub create: EffectFactory,
}

pub const REGISTRY: &[EffectEntry] = &[
    EffectEntry {
        name: "marquee",
        description: "Scrolling banner text in a FIGlet font",
        create: |rng| Box::new(marquee::MarqueeEffect::new(rng)),
    },
    EffectEntry {
        name: "fireworks",
        description: "ASCII fireworks launching and bursting",
        create: |rng| Box::new(fireworks::FireworksEffect::new(rng)),
    },
    EffectEntry {
        name: "pipes",
        description: "Pipes growing from the screen edges",
        create: |rng| Box::new(pipes::PipesEffect::new(rng)),
    },
    EffectEntry {
        name: "life",
        description: "Conway's Game of Life on a wrapping grid",
        create: |rng| Box::new(life::LifeEffect::new(rng)),
    },
    EffectEntry {
        name: "starfield",
        description: "Flying through a 3D starfield",
        create: |rng| Box::new(starfield::StarfieldEffect::new(rng)),
    },
    EffectEntry {
        name: "pollock",
        description: "Paint splatters spreading across the screen",
        create: |rng| Box::new(pollock::PollockEffect::new(rng)),
    },
];

pub fn lookup(name: &str) -> Result<&'static EffectEntry> {
    REGISTRY
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| Error::UnknownEffect(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[InputSpec] = &[
        InputSpec {
            name: "speed",
            default: "4",
            description: "",
        },
        COLOR_INPUT,
    ];

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_keys_use_defaults() {
        let inputs = Inputs::parse(SPECS, &[]).unwrap();
        assert_eq!(inputs.get("speed"), "4");
        assert_eq!(inputs.get("color"), "full");
    }

    #[test]
    fn parses_both_flag_forms_and_skips_unknown_keys() {
        let inputs = Inputs::parse(
            SPECS,
            &args(&["--bogus", "1", "--speed", "9", "stray", "--color=off"]),
        )
        .unwrap();
        assert_eq!(inputs.get("speed"), "9");
        assert_eq!(inputs.get("color"), "off");
        assert_eq!(inputs.get("bogus"), "");
    }

    #[test]
    fn dangling_flag_is_an_error() {
        let err = Inputs::parse(SPECS, &args(&["--speed"])).unwrap_err();
        assert!(matches!(err, Error::OptionParse { ref option, .. } if option == "speed"));
    }

    #[test]
    fn color_toggle_rejects_other_values() {
        let inputs = Inputs::parse(SPECS, &args(&["--color", "OFF"])).unwrap();
        assert!(!inputs.color_enabled("color").unwrap());

        let inputs = Inputs::parse(SPECS, &args(&["--color", "rainbow"])).unwrap();
        assert!(inputs.color_enabled("color").is_err());
    }

    #[test]
    fn registry_lookup() {
        for entry in REGISTRY {
            assert_eq!(lookup(entry.name).unwrap().name, entry.name);
        }
        assert!(matches!(lookup("fire"), Err(Error::UnknownEffect(name)) if name == "fire"));
    }
}
