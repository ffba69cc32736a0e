use std::env;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod display;
mod driver;
mod effects;
mod error;
mod font;
mod geometry;
mod repo;
mod sprite;
mod terminal;

use config::Config;
use display::Style;
use terminal::{TerminalDisplay, TerminalEvents};

fn print_usage() {
    eprintln!("screensaver - Terminal screensaver with various effects");
    eprintln!();
    eprintln!("Usage: screensaver [EFFECT] [OPTIONS] [-- EFFECT OPTIONS]");
    eprintln!();
    eprintln!("Effects:");
    for entry in effects::REGISTRY {
        let default = if entry.name == config::DEFAULT_EFFECT { " (default)" } else { "" };
        eprintln!("  {:<10}{}{}", entry.name, entry.description, default);
    }
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --saver EFFECT      Effect to run");
    eprintln!("  -R, --repo OWNER/REPO   Repository context, skips asking gh");
    eprintln!("  -l, --list              List effects and their options");
    eprintln!("  --bg-color RRGGBB       Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  -h, --help              Show this help");
    eprintln!();
    eprintln!("Effect options follow `--`, e.g.");
    eprintln!("  screensaver marquee -- --message hello --font block");
    eprintln!();
    eprintln!("Press any key to exit");
}

fn print_list() {
    for entry in effects::REGISTRY {
        println!("{}: {}", entry.name, entry.description);
        let effect = (entry.create)(fastrand::Rng::new());
        for input in effect.inputs() {
            println!("  --{} (default {:?}): {}", input.name, input.default, input.description);
        }
    }
    println!();
    println!("Built-in fonts: {}", font::builtin_names().collect::<Vec<_>>().join(", "));
}

/// Logs go to the file named by SCREENSAVER_LOG, never the screen.
fn init_logging() -> anyhow::Result<()> {
    let Some(path) = env::var_os("SCREENSAVER_LOG") else {
        return Ok(());
    };
    let file = File::create(&path)
        .with_context(|| format!("opening log file {}", path.to_string_lossy()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(config: Config) -> anyhow::Result<()> {
    match config.repository {
        Some(repo) => info!(repo = %repo, "using repository from command line"),
        None => match repo::resolve() {
            Ok(repo) => info!(repo = %repo, "resolved repository"),
            Err(err) => warn!(error = %err, "continuing without a repository"),
        },
    }

    let mut default_style = Style::default();
    if let Some(color) = config.bg_color {
        default_style = default_style.bg(color);
    }

    let mut display = TerminalDisplay::new(default_style).context("setting up the terminal")?;
    let control = driver::spawn_input_watcher(TerminalEvents);
    let result = driver::run(
        &config.effect,
        &config.effect_args,
        &mut display,
        &control,
        fastrand::Rng::new(),
    );
    // Restore the terminal before anything is printed
    drop(display);

    result?;
    info!("quit");
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = match Config::parse(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if config.help {
        print_usage();
        return ExitCode::SUCCESS;
    }
    if config.list {
        print_list();
        return ExitCode::SUCCESS;
    }

    if let Err(err) = effects::lookup(&config.effect) {
        eprintln!("{err}");
        eprintln!();
        print_usage();
        return ExitCode::FAILURE;
    }

    if let Err(err) = init_logging() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("screensaver: {err:#}");
            ExitCode::FAILURE
        }
    }
}
