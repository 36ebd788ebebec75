//! Runtime settings: an optional JSON file overlaid by command-line flags.
//!
//! Only the I/O surroundings are configurable.  Gesture thresholds, the
//! pattern table and the cooldown are fixed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use gesture_core::ScreenSize;

use crate::source::MIN_DETECTION_CONFIDENCE;
use crate::speech::default_speech_command;

// ════════════════════════════════════════════════════════════════════════════
// Command line
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Keyboard/mouse simulation in the overlay window.
    Sim,
    /// Detector JSON lines on standard input.
    Stdin,
    /// Detector JSON lines from a spawned command.
    Command,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

#[derive(Parser, Debug, Default)]
#[command(name = "gesture_control", about = "Control slides, volume and the mouse with hand gestures")]
pub struct Args {
    /// Where hand landmarks come from.
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Detector program for `--source command`.
    #[arg(long)]
    pub detector_cmd: Option<String>,

    /// Minimum detector score for a hand to be used.
    #[arg(long)]
    pub min_confidence: Option<f32>,

    /// Run without the overlay window.
    #[arg(long)]
    pub headless: bool,

    /// Recognize and announce, but don't inject any input.
    #[arg(long)]
    pub dry_run: bool,

    /// Disable spoken feedback.
    #[arg(long)]
    pub no_speech: bool,

    /// Screen size used for cursor mapping, e.g. 1920x1080.
    #[arg(long, value_parser = parse_screen)]
    pub screen: Option<ScreenSize>,

    /// JSON settings file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG is honored).
    #[arg(long)]
    pub debug: bool,
}

pub fn parse_screen(s: &str) -> Result<ScreenSize, String> {
    let (w, h) = s.split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{}'", w))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{}'", h))?;
    if width == 0 || height == 0 {
        return Err("screen size must be non-zero".into());
    }
    Ok(ScreenSize { width, height })
}

// ════════════════════════════════════════════════════════════════════════════
// Settings file
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debug_logging: bool,
    pub source: SourceKind,
    pub detector_command: Option<String>,
    pub min_detection_confidence: f32,
    pub headless: bool,
    pub dry_run: bool,
    pub speech_enabled: bool,
    pub speech_command: String,
    pub speech_args: Vec<String>,
    pub screen_size: Option<ScreenSize>,
}

impl Default for Settings {
    fn default() -> Self {
        let (speech_command, speech_args) = default_speech_command();
        Settings {
            debug_logging: false,
            source: SourceKind::Sim,
            detector_command: None,
            min_detection_confidence: MIN_DETECTION_CONFIDENCE,
            headless: false,
            dry_run: false,
            speech_enabled: true,
            speech_command,
            speech_args,
            screen_size: None,
        }
    }
}

impl Settings {
    /// Missing or empty file → defaults.  Any other read failure is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read settings file {}", path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Overlay command-line flags.
    pub fn apply_args(&mut self, args: &Args) {
        if args.debug { self.debug_logging = true; }
        if let Some(s) = args.source { self.source = s; }
        if let Some(cmd) = &args.detector_cmd {
            self.detector_command = Some(cmd.clone());
            if args.source.is_none() { self.source = SourceKind::Command; }
        }
        if let Some(c) = args.min_confidence { self.min_detection_confidence = c; }
        if args.headless { self.headless = true; }
        if args.dry_run { self.dry_run = true; }
        if args.no_speech { self.speech_enabled = false; }
        if let Some(s) = args.screen { self.screen_size = Some(s); }
    }

    /// Reject combinations the app can't run.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            bail!("min_detection_confidence must be within 0..=1, got {}", self.min_detection_confidence);
        }
        if self.source == SourceKind::Sim && self.headless {
            bail!("the simulation source needs the overlay window; drop --headless or pick another --source");
        }
        if self.source == SourceKind::Command && self.detector_command.is_none() {
            bail!("--source command needs --detector-cmd");
        }
        if self.source == SourceKind::Leap && !cfg!(feature = "leap") {
            bail!("LeapMotion support not compiled in; rebuild with --features leap");
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
