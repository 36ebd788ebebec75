//! # gesture_core
//!
//! Turns per-frame hand landmarks into discrete UI actions.
//!
//! ## Pipeline
//!
//! ```text
//! HandObservation ─► classify ─► Controller::step ─► dispatch / move_pointer
//!   (21 points)      (label)     (cooldown, mode)    (InputSink + Feedback)
//! ```
//!
//! ## Gesture → Action mapping
//!
//! | Fingers (T I M R P) | Gesture | Input | Phrase |
//! |---|---|---|---|
//! | 1 1 1 1 1 | `start_presentation` | F5 | "Starting presentation" |
//! | 0 0 0 0 0 / tips pinched | `stop_presentation` | Escape | "Stopping presentation" |
//! | 1 1 1 1 0 | `next_slide` | Right | "Next slide" |
//! | 1 1 0 0 1 | `previous_slide` | Left | "Previous slide" |
//! | 0 0 0 0 1 | `mute` | Mute key | "Muted" |
//! | 1 0 0 0 0 | `unmute` | Mute key | "Unmuted" |
//! | 1 1 0 0 0 | `volume_up` | Volume up | "Volume up" |
//! | 1 0 0 0 1 | `volume_down` | Volume down | "Volume down" |
//! | 1 1 1 0 0 | `double_click` | Double click | "Double click" |
//! | 0 0 1 1 1 | `right_click` | Right click | "Right click" |
//! | 0 1 0 0 0 | `move_cursor` | Pointer follows index tip | "Cursor control activated" on entry |
//!
//! `single_click` has a table row, but its pattern is shadowed by
//! `volume_up`.

pub mod landmark;
pub mod classifier;
pub mod controller;
pub mod dispatch;
pub mod engine;

pub use classifier::{classify, Gesture};
pub use controller::{Controller, FrameOutcome, Mode, COOLDOWN};
pub use dispatch::{Feedback, InputEvent, InputSink, Key};
pub use engine::{GestureEngine, HandReport};
pub use landmark::{HandObservation, Landmark, LandmarkError, ScreenPoint, ScreenSize};
