//! Debounce & mode controller.
//!
//! Decides, for each classified hand, whether anything happens this frame:
//!
//! | Input | Outcome |
//! |---|---|
//! | `MoveCursor` | `Continuous`: pointer follows the index tip, no cooldown |
//! | discrete, cooldown open | `Discrete`: dispatch, restart the cooldown |
//! | discrete, cooldown running | `Suppressed` |
//! | `Mute` while muted / `Unmute` while unmuted | `Suppressed`, cooldown untouched |
//! | none | `Idle` |
//!
//! The cooldown is a timestamp comparison, not a timed state. Callers pass
//! the frame clock in so the controller can be driven with synthetic time.

use std::time::{Duration, Instant};

use crate::classifier::Gesture;
use crate::landmark::ScreenPoint;

/// Minimum interval between two dispatched discrete actions.
pub const COOLDOWN: Duration = Duration::from_secs(1);

/// Per-frame decision for one hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Cursor tracking: move the pointer to `target`. `activated` is set on
    /// the first frame of a cursor session where the cooldown is open.
    Continuous { target: ScreenPoint, activated: bool },
    /// Fire the action bound to this gesture.
    Discrete(Gesture),
    /// Recognized, but held back by the cooldown or the mute state.
    Suppressed(Gesture),
    /// Nothing recognized.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    CursorTracking,
}

/// Session state shared by every hand for the life of the process.
#[derive(Debug)]
pub struct Controller {
    last_action: Option<Instant>,
    is_muted: bool,
    cursor_mode_active: bool,
    /// Cursor session entered but not yet announced.
    activation_pending: bool,
}

impl Default for Controller {
    fn default() -> Self { Self::new() }
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            last_action: None,
            is_muted: false,
            cursor_mode_active: false,
            activation_pending: false,
        }
    }

    pub fn is_muted(&self) -> bool { self.is_muted }

    pub fn last_action(&self) -> Option<Instant> { self.last_action }

    pub fn mode(&self) -> Mode {
        if self.cursor_mode_active { Mode::CursorTracking } else { Mode::Idle }
    }

    /// True when more than [`COOLDOWN`] has passed since the last action.
    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_action {
            None => true,
            Some(t) => now.saturating_duration_since(t) > COOLDOWN,
        }
    }

    /// Run one hand's gesture through the gate.
    ///
    /// `pointer` is the hand's projected index fingertip; only cursor
    /// tracking uses it.
    pub fn step(&mut self, gesture: Option<Gesture>, pointer: ScreenPoint, now: Instant) -> FrameOutcome {
        let gesture = match gesture {
            Some(Gesture::MoveCursor) => return self.track_cursor(pointer, now),
            Some(g) => g,
            None => {
                self.leave_cursor_mode();
                return FrameOutcome::Idle;
            }
        };

        self.leave_cursor_mode();

        if !self.cooldown_elapsed(now) {
            return FrameOutcome::Suppressed(gesture);
        }

        match gesture {
            Gesture::Mute if self.is_muted => return FrameOutcome::Suppressed(gesture),
            Gesture::Unmute if !self.is_muted => return FrameOutcome::Suppressed(gesture),
            Gesture::Mute => self.is_muted = true,
            Gesture::Unmute => self.is_muted = false,
            _ => {}
        }

        self.last_action = Some(now);
        FrameOutcome::Discrete(gesture)
    }

    /// A frame without any hand ends cursor tracking.
    pub fn no_hands(&mut self) {
        self.leave_cursor_mode();
    }

    fn leave_cursor_mode(&mut self) {
        self.cursor_mode_active = false;
        self.activation_pending = false;
    }

    /// The notice fires on the first cursor frame with an open cooldown,
    /// which may be later than the frame that entered cursor mode.
    fn track_cursor(&mut self, target: ScreenPoint, now: Instant) -> FrameOutcome {
        if !self.cursor_mode_active {
            self.cursor_mode_active = true;
            self.activation_pending = true;
        }

        let activated = self.activation_pending && self.cooldown_elapsed(now);
        if activated {
            self.activation_pending = false;
            self.last_action = Some(now);
        }
        FrameOutcome::Continuous { target, activated }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
