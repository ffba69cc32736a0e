//! Render loop: ticks the running effect and watches for input.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::display::{Display, DisplayEvent, EventSource};
use crate::effects::{self, Effect, Inputs};
use crate::error::{Error, Result};

pub const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    Resize,
}

/// Forwards terminal events to the render loop from a background thread.
/// The first key press ends the session; the thread exits with it.
pub fn spawn_input_watcher<E>(mut events: E) -> Receiver<Control>
where
    E: EventSource + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        loop {
            let control = match events.poll_event() {
                Ok(DisplayEvent::KeyPressed) => Control::Quit,
                Ok(DisplayEvent::Resized) => Control::Resize,
                Err(err) => {
                    error!(error = %err, "input watcher failed");
                    Control::Quit
                }
            };
            if tx.send(control).is_err() || control == Control::Quit {
                break;
            }
        }
    });
    rx
}

pub struct RenderLoop {
    tick: Duration,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::with_tick(TICK)
    }
}

impl RenderLoop {
    pub fn with_tick(tick: Duration) -> Self {
        Self { tick }
    }

    /// Runs until a quit arrives, the control channel closes, or the effect
    /// fails. Each tick is clear, update, present. Ticks fall on a fixed
    /// schedule; resizes in between don't push the next one back.
    pub fn run(
        &self,
        name: &'static str,
        effect: &mut dyn Effect,
        display: &mut dyn Display,
        control: &Receiver<Control>,
    ) -> Result<u64> {
        let mut ticks = 0;
        let mut deadline = Instant::now() + self.tick;
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            match control.recv_timeout(wait) {
                Ok(Control::Quit) => {
                    debug!("quit requested");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("input watcher gone");
                    break;
                }
                Ok(Control::Resize) => {
                    display.sync()?;
                }
                Err(RecvTimeoutError::Timeout) => {
                    effect.clear(display);
                    effect.update(display).map_err(|source| Error::Update {
                        effect: name,
                        source: Box::new(source),
                    })?;
                    display.present()?;
                    ticks += 1;
                    deadline += self.tick;
                    let now = Instant::now();
                    // After a stall, tick again one period from now instead of catching up
                    if deadline < now {
                        deadline = now + self.tick;
                    }
                }
            }
        }
        Ok(ticks)
    }
}

/// Builds the named effect, applies its options, and animates it on
/// `display` until the session ends.
pub fn run(
    name: &str,
    options: &[String],
    display: &mut dyn Display,
    control: &Receiver<Control>,
    rng: fastrand::Rng,
) -> Result<()> {
    run_with(&RenderLoop::default(), name, options, display, control, rng)
}

fn run_with(
    render_loop: &RenderLoop,
    name: &str,
    options: &[String],
    display: &mut dyn Display,
    control: &Receiver<Control>,
    rng: fastrand::Rng,
) -> Result<()> {
    let entry = effects::lookup(name)?;
    let mut effect = (entry.create)(rng);
    effect.initialize(display);

    let inputs = Inputs::parse(effect.inputs(), options)?;
    effect.set_inputs(&inputs)?;

    let (width, height) = display.size();
    info!(effect = entry.name, width, height, "starting effect");
    match render_loop.run(entry.name, effect.as_mut(), display, control) {
        Ok(ticks) => {
            info!(effect = entry.name, ticks, "effect stopped");
            Ok(())
        }
        Err(err) => {
            error!(effect = entry.name, error = %err, "effect aborted");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::CellBuffer;
    use crate::effects::InputSpec;
    use std::sync::mpsc::Sender;

    /// Counts ticks, optionally failing on one and quitting on another.
    struct Counter {
        updates: u32,
        clears: u32,
        fail_at: Option<u32>,
        quit_at: Option<(u32, Sender<Control>)>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                updates: 0,
                clears: 0,
                fail_at: None,
                quit_at: None,
            }
        }
    }

    impl Effect for Counter {
        fn inputs(&self) -> &'static [InputSpec] {
            &[]
        }

        fn initialize(&mut self, _display: &dyn Display) {}

        fn set_inputs(&mut self, _inputs: &Inputs) -> Result<()> {
            Ok(())
        }

        fn update(&mut self, _display: &mut dyn Display) -> Result<()> {
            self.updates += 1;
            if self.fail_at == Some(self.updates) {
                return Err(Error::NotConfigured("counter"));
            }
            if let Some((at, tx)) = &self.quit_at {
                if *at == self.updates {
                    tx.send(Control::Quit).unwrap();
                }
            }
            Ok(())
        }

        fn clear(&mut self, display: &mut dyn Display) {
            self.clears += 1;
            display.clear();
        }
    }

    fn fast() -> RenderLoop {
        RenderLoop::with_tick(Duration::from_millis(1))
    }

    #[test]
    fn quit_before_first_tick_skips_update() {
        let (tx, rx) = mpsc::channel();
        tx.send(Control::Quit).unwrap();
        let mut effect = Counter::new();
        let mut buf = CellBuffer::new(10, 10);

        let ticks = fast().run("counter", &mut effect, &mut buf, &rx).unwrap();
        assert_eq!(ticks, 0);
        assert_eq!(effect.updates, 0);
    }

    #[test]
    fn quit_after_some_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut effect = Counter::new();
        effect.quit_at = Some((5, tx));
        let mut buf = CellBuffer::new(10, 10);

        let ticks = fast().run("counter", &mut effect, &mut buf, &rx).unwrap();
        assert_eq!(ticks, 5);
        assert_eq!(effect.updates, 5);
        assert_eq!(effect.clears, 5);
    }

    #[test]
    fn resize_does_not_tick() {
        let (tx, rx) = mpsc::channel();
        tx.send(Control::Resize).unwrap();
        tx.send(Control::Quit).unwrap();
        let mut effect = Counter::new();
        let mut buf = CellBuffer::new(10, 10);

        let ticks = fast().run("counter", &mut effect, &mut buf, &rx).unwrap();
        assert_eq!(ticks, 0);
    }

    #[test]
    fn resize_burst_does_not_postpone_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut effect = Counter::new();
        let mut buf = CellBuffer::new(10, 10);
        let render_loop = RenderLoop::with_tick(Duration::from_millis(50));

        let sender = thread::spawn(move || {
            // A resize every 10ms for 300ms: without a fixed schedule no tick
            // would ever time out
            for _ in 0..30 {
                tx.send(Control::Resize).unwrap();
                thread::sleep(Duration::from_millis(10));
            }
            tx.send(Control::Quit).unwrap();
        });

        let ticks = render_loop.run("counter", &mut effect, &mut buf, &rx).unwrap();
        sender.join().unwrap();
        assert!(ticks >= 2, "only {ticks} ticks during a resize burst");
    }

    #[test]
    fn closed_channel_ends_the_loop() {
        let (tx, rx) = mpsc::channel::<Control>();
        drop(tx);
        let mut effect = Counter::new();
        let mut buf = CellBuffer::new(10, 10);

        assert_eq!(fast().run("counter", &mut effect, &mut buf, &rx).unwrap(), 0);
    }

    #[test]
    fn update_error_aborts_with_effect_name() {
        let (_tx, rx) = mpsc::channel();
        let mut effect = Counter::new();
        effect.fail_at = Some(3);
        let mut buf = CellBuffer::new(10, 10);

        let err = fast().run("counter", &mut effect, &mut buf, &rx).unwrap_err();
        let Error::Update { effect: name, source } = err else {
            panic!("expected an update error");
        };
        assert_eq!(name, "counter");
        assert!(matches!(*source, Error::NotConfigured(_)));
        assert_eq!(effect.updates, 3);
    }

    #[test]
    fn unknown_effect_fails_before_the_loop() {
        let (_tx, rx) = mpsc::channel();
        let mut buf = CellBuffer::new(10, 10);
        let rng = fastrand::Rng::with_seed(0);
        let err = run_with(&fast(), "screensaver", &[], &mut buf, &rx, rng).unwrap_err();
        assert!(matches!(err, Error::UnknownEffect(name) if name == "screensaver"));
    }

    #[test]
    fn bad_options_fail_before_the_loop() {
        let (_tx, rx) = mpsc::channel();
        let mut buf = CellBuffer::new(10, 10);
        let options = vec!["--density".to_string(), "lots".to_string()];
        let rng = fastrand::Rng::with_seed(0);
        let err = run_with(&fast(), "starfield", &options, &mut buf, &rx, rng).unwrap_err();
        assert!(matches!(err, Error::OptionParse { .. }));
        assert!(buf.rows().flatten().all(|cell| cell.glyph == ' '));
    }

    #[test]
    fn every_registered_effect_runs_until_quit() {
        for entry in effects::REGISTRY {
            let (tx, rx) = mpsc::channel();
            let mut buf = CellBuffer::new(60, 20);
            let mut effect = (entry.create)(fastrand::Rng::with_seed(7));
            effect.initialize(&buf);
            effect.set_inputs(&Inputs::parse(effect.inputs(), &[]).unwrap()).unwrap();

            for _ in 0..30 {
                effect.clear(&mut buf);
                effect.update(&mut buf).unwrap();
            }
            tx.send(Control::Quit).unwrap();
            assert_eq!(fast().run(entry.name, effect.as_mut(), &mut buf, &rx).unwrap(), 0);
        }
    }

    struct Scripted(Vec<DisplayEvent>);

    impl EventSource for Scripted {
        fn poll_event(&mut self) -> std::io::Result<DisplayEvent> {
            match self.0.pop() {
                Some(event) => Ok(event),
                None => Err(std::io::Error::other("script exhausted")),
            }
        }
    }

    #[test]
    fn watcher_maps_events_and_stops_at_first_key() {
        let rx = spawn_input_watcher(Scripted(vec![
            DisplayEvent::Resized,
            DisplayEvent::KeyPressed,
            DisplayEvent::Resized,
        ]));
        let seen: Vec<Control> = rx.iter().collect();
        assert_eq!(seen, vec![Control::Resize, Control::Quit]);
    }
}
