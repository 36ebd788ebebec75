//! # gesture_control
//!
//! Hand-gesture controller for presentations, media volume and the mouse,
//! with spoken feedback and a landmark overlay.  Recognition lives in
//! [`gesture_core`]; this crate wires it to landmark sources, OS input
//! injection, text-to-speech and a `minifb` window.
//!
//! ## Hand sources
//!
//! * `sim` (default), **simulation mode**: keys in the overlay pick a pose,
//!   the mouse moves the index fingertip.
//! * `stdin` / `command`, **detector mode**: one JSON object per frame from
//!   an external landmark detector (e.g. a MediaPipe camera script).
//! * `leap`, **hardware mode**: polls a LeapMotion controller via LeapC
//!   (`--features leap`).
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Pose | Gesture |
//! |---|---|---|
//! | `1` | 1 1 1 1 1 | start presentation |
//! | `2` | 0 0 0 0 0 | stop presentation |
//! | `3` | 1 1 1 1 0 | next slide |
//! | `4` | 1 1 0 0 1 | previous slide |
//! | `5` | 1 0 0 0 0 | unmute |
//! | `6` | 0 0 0 0 1 | mute |
//! | `7` | 1 1 0 0 0 | volume up |
//! | `8` | 1 0 0 0 1 | volume down |
//! | `9` | 1 1 1 0 0 | double click |
//! | `0` | 0 0 1 1 1 | right click |
//! | `C` | 0 1 0 0 0 | move cursor |
//! | `P` | pinch | stop presentation |
//! | `Space` | - | hand out of view |
//! | `Q` | - | quit |

pub mod source;
pub mod speech;
pub mod input;
pub mod visualizer;
pub mod settings;
pub mod logging;
pub mod app;
