//! Top-level application loop.
//!
//! `AppState` owns the [`GestureEngine`] and the status line shown in the
//! overlay.  [`run`] wires a hand source, the speech thread, the input
//! backend and the visualizer together and drives one frame per iteration:
//! detection → classification → debounce → dispatch → render.

use std::sync::mpsc::{self, Sender};
use std::time::Instant;

use anyhow::{Context, Result};

use gesture_core::{
    Feedback, FrameOutcome, Gesture, GestureEngine, HandObservation, HandReport, InputSink, Mode,
};

use crate::input::open_input;
use crate::settings::{Settings, SourceKind};
use crate::source::{HandSource, JsonLinesSource, SimHandSource, SimInput};
use crate::speech::{CommandSpeech, NullSpeech, SpeechOut, Speaker};
use crate::visualizer::Visualizer;

pub const START_PHRASE: &str = "Gesture Control Started";
pub const EXIT_PHRASE:  &str = "Exiting gesture control";

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<I, F> {
    engine: GestureEngine<I, F>,
    last_action: Option<Gesture>,
    pub status: String,
}

impl<I: InputSink, F: Feedback> AppState<I, F> {
    pub fn new(input: I, feedback: F) -> Self {
        AppState {
            engine: GestureEngine::new(input, feedback),
            last_action: None,
            status: "Ready".to_string(),
        }
    }

    pub fn engine(&self) -> &GestureEngine<I, F> { &self.engine }

    pub fn announce(&self, phrase: &str) { self.engine.announce(phrase); }

    // ── process one frame ─────────────────────────────────────────────────

    pub fn handle_frame(&mut self, hands: &[HandObservation], now: Instant) -> Vec<HandReport> {
        let reports = self.engine.process_frame(hands, now);

        for r in &reports {
            if let FrameOutcome::Discrete(g) = r.outcome {
                self.last_action = Some(g);
            }
        }

        let current = if reports.is_empty() {
            "no hand".to_string()
        } else {
            reports.iter().map(describe).collect::<Vec<_>>().join(" | ")
        };
        self.status = match self.last_action {
            Some(g) => format!("{}   last: {}", current, g),
            None    => current,
        };
        reports
    }

    pub fn cursor_mode(&self) -> bool {
        self.engine.controller().mode() == Mode::CursorTracking
    }

    pub fn is_muted(&self) -> bool { self.engine.controller().is_muted() }
}

fn describe(report: &HandReport) -> String {
    match report.outcome {
        FrameOutcome::Continuous { target, .. } =>
            format!("move_cursor ({}, {})", target.x, target.y),
        FrameOutcome::Discrete(g)   => format!("{} !", g),
        FrameOutcome::Suppressed(g) => format!("{} (wait)", g),
        FrameOutcome::Idle          => "no gesture".to_string(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Backends
// ════════════════════════════════════════════════════════════════════════════

fn open_speech_output(settings: &Settings) -> Box<dyn SpeechOut> {
    if settings.speech_enabled {
        Box::new(CommandSpeech::new(settings.speech_command.clone(), settings.speech_args.clone()))
    } else {
        Box::new(NullSpeech)
    }
}

type OpenedSource = (Box<dyn HandSource>, Option<Sender<SimInput>>);

fn open_source(settings: &Settings) -> Result<OpenedSource> {
    let confidence = settings.min_detection_confidence;
    let mut sim_tx = None;
    let source: Box<dyn HandSource> = match settings.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel::<SimInput>();
            sim_tx = Some(tx);
            Box::new(SimHandSource::new(rx))
        }
        SourceKind::Stdin => Box::new(JsonLinesSource::stdin(confidence)),
        SourceKind::Command => {
            let cmd = settings.detector_command.as_deref()
                .context("no detector command configured")?;
            Box::new(JsonLinesSource::spawn(cmd, confidence)?)
        }
        #[cfg(feature = "leap")]
        SourceKind::Leap => Box::new(crate::source::LeapHandSource::open()?),
        #[cfg(not(feature = "leap"))]
        SourceKind::Leap => anyhow::bail!("LeapMotion support not compiled in"),
    };
    Ok((source, sim_tx))
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Announce start, pump frames from `source` until `q`, window close, end of
/// stream or a source error, then announce exit.
pub fn drive<I: InputSink, F: Feedback>(
    app: &mut AppState<I, F>,
    source: &mut dyn HandSource,
    mut vis: Option<&mut Visualizer>,
) {
    tracing::info!("Starting Gesture Control ({}). Press 'q' to quit.", source.name());
    app.announce(START_PHRASE);

    loop {
        if let Some(v) = vis.as_deref_mut() {
            if !v.poll_input() { break; }
        }

        let hands = match source.next_frame() {
            Ok(Some(hands)) => hands,
            Ok(None) => {
                tracing::warn!("{} ended — stopping", source.name());
                break;
            }
            Err(e) => {
                tracing::error!("{} failed: {:#}", source.name(), e);
                break;
            }
        };

        app.handle_frame(&hands, Instant::now());

        if let Some(v) = vis.as_deref_mut() {
            v.render(&hands, &app.status, app.cursor_mode(), app.is_muted());
        }
    }

    tracing::info!("Exiting gesture control");
    app.announce(EXIT_PHRASE);
}

/// Run the full application with the backends named in `settings`.
pub fn run(settings: Settings) -> Result<()> {
    settings.validate()?;

    let (mut source, sim_tx) = open_source(&settings)?;
    let mut vis = if settings.headless {
        None
    } else {
        Some(Visualizer::new(sim_tx)?)
    };

    let speaker = Speaker::spawn(open_speech_output(&settings));
    let input = open_input(settings.dry_run, settings.screen_size);
    let mut app = AppState::new(input, speaker);

    drive(&mut app, source.as_mut(), vis.as_mut());
    app.engine().feedback().quit();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    use gesture_core::landmark::{synthetic_hand, FingerStates};
    use gesture_core::{Landmark, ScreenSize};

    use crate::input::NullInput;

    #[derive(Default)]
    struct Heard(RefCell<Vec<String>>);

    impl Feedback for Heard {
        fn say(&self, phrase: &str) { self.0.borrow_mut().push(phrase.to_string()); }
    }

    fn make_app() -> AppState<NullInput, Heard> {
        AppState::new(NullInput::new(ScreenSize { width: 1000, height: 500 }), Heard::default())
    }

    fn pose(bits: [u8; 5], x: f32, y: f32) -> HandObservation {
        synthetic_hand(FingerStates::from_bits(bits), Landmark::new(x, y, 0.0))
    }

    #[test]
    fn empty_frame_reports_no_hand() {
        let mut app = make_app();
        app.handle_frame(&[], Instant::now());
        assert_eq!(app.status, "no hand");
    }

    #[test]
    fn action_sticks_in_status() {
        let mut app = make_app();
        let t0 = Instant::now();
        app.handle_frame(&[pose([1, 1, 1, 1, 0], 0.5, 0.4)], t0);
        assert_eq!(app.status, "next_slide !   last: next_slide");
        app.handle_frame(&[pose([1, 1, 1, 1, 0], 0.5, 0.4)], t0 + Duration::from_millis(30));
        assert_eq!(app.status, "next_slide (wait)   last: next_slide");
        assert_eq!(*app.engine().feedback().0.borrow(), vec!["Next slide".to_string()]);
    }

    #[test]
    fn cursor_mode_tracks_pointer() {
        let mut app = make_app();
        app.handle_frame(&[pose([0, 1, 0, 0, 0], 0.5, 0.5)], Instant::now());
        assert!(app.cursor_mode());
        assert_eq!(app.status, "move_cursor (500, 250)");
        app.handle_frame(&[], Instant::now());
        assert!(!app.cursor_mode());
    }

    #[test]
    fn mute_shows_in_state() {
        let mut app = make_app();
        app.handle_frame(&[pose([0, 0, 0, 0, 1], 0.5, 0.4)], Instant::now());
        assert!(app.is_muted());
    }

    #[test]
    fn announce_goes_to_feedback() {
        let app = make_app();
        app.announce(START_PHRASE);
        assert_eq!(*app.engine().feedback().0.borrow(), vec![START_PHRASE.to_string()]);
    }

    struct Broken;

    impl HandSource for Broken {
        fn next_frame(&mut self) -> Result<Option<Vec<HandObservation>>> {
            anyhow::bail!("camera unplugged")
        }
        fn name(&self) -> &'static str { "broken" }
    }

    #[test]
    fn end_of_stream_announces_exit() {
        let mut app = make_app();
        let lines = "{\"hands\":[]}\n{\"hands\":[]}\n";
        let mut source = JsonLinesSource::from_reader(std::io::Cursor::new(lines), 0.7);
        drive(&mut app, &mut source, None);
        assert_eq!(
            *app.engine().feedback().0.borrow(),
            vec![START_PHRASE.to_string(), EXIT_PHRASE.to_string()]
        );
        assert_eq!(app.status, "no hand");
    }

    #[test]
    fn source_failure_announces_exit() {
        let mut app = make_app();
        drive(&mut app, &mut Broken, None);
        assert_eq!(
            *app.engine().feedback().0.borrow(),
            vec![START_PHRASE.to_string(), EXIT_PHRASE.to_string()]
        );
    }

    #[test]
    fn headless_sim_fails_before_opening_anything() {
        let settings = Settings { headless: true, ..Settings::default() };
        assert!(run(settings).is_err());
    }
}
