//! Action dispatch: confirmed gesture → one injected input + one phrase.
//!
//! The input-injection and speech primitives live outside this crate and are
//! reached through [`InputSink`] and [`Feedback`]. Both are best-effort:
//! a failing injection is logged and dropped, speech is fire-and-forget.

use crate::classifier::Gesture;
use crate::landmark::{ScreenPoint, ScreenSize};

/// Keys the dispatcher can press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    F5,
    Escape,
    RightArrow,
    LeftArrow,
    VolumeMute,
    VolumeUp,
    VolumeDown,
}

/// Abstract input token handed to the injection primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Press(Key),
    Click,
    DoubleClick,
    RightClick,
    MoveTo(ScreenPoint),
}

/// Input-injection primitive.
pub trait InputSink {
    fn send(&mut self, event: InputEvent) -> anyhow::Result<()>;

    /// Screen the pointer moves across.
    fn screen_size(&self) -> ScreenSize;
}

impl<T: InputSink + ?Sized> InputSink for Box<T> {
    fn send(&mut self, event: InputEvent) -> anyhow::Result<()> { (**self).send(event) }
    fn screen_size(&self) -> ScreenSize { (**self).screen_size() }
}

/// Speech primitive. Must return without waiting for playback.
pub trait Feedback {
    fn say(&self, phrase: &str);
}

impl<T: Feedback + ?Sized> Feedback for Box<T> {
    fn say(&self, phrase: &str) { (**self).say(phrase) }
}

pub const CURSOR_ACTIVATED: &str = "Cursor control activated";

/// Input event and confirmation phrase for a discrete gesture.
/// `MoveCursor` has no binding; it streams pointer moves instead.
pub fn binding(gesture: Gesture) -> Option<(InputEvent, &'static str)> {
    use InputEvent::*;
    let bound = match gesture {
        Gesture::StartPresentation => (Press(Key::F5),         "Starting presentation"),
        Gesture::StopPresentation  => (Press(Key::Escape),     "Stopping presentation"),
        Gesture::NextSlide         => (Press(Key::RightArrow), "Next slide"),
        Gesture::PreviousSlide     => (Press(Key::LeftArrow),  "Previous slide"),
        Gesture::Mute              => (Press(Key::VolumeMute), "Muted"),
        Gesture::Unmute            => (Press(Key::VolumeMute), "Unmuted"),
        Gesture::VolumeUp          => (Press(Key::VolumeUp),   "Volume up"),
        Gesture::VolumeDown        => (Press(Key::VolumeDown), "Volume down"),
        Gesture::SingleClick       => (Click,                  "Click"),
        Gesture::DoubleClick       => (DoubleClick,            "Double click"),
        Gesture::RightClick        => (RightClick,             "Right click"),
        Gesture::MoveCursor        => return None,
    };
    Some(bound)
}

/// Perform the side effects bound to `gesture`.
pub fn dispatch<I, F>(gesture: Gesture, input: &mut I, feedback: &F)
where
    I: InputSink + ?Sized,
    F: Feedback + ?Sized,
{
    let Some((event, phrase)) = binding(gesture) else { return };
    if let Err(e) = input.send(event) {
        tracing::debug!("input injection for {} failed: {:#}", gesture, e);
    }
    feedback.say(phrase);
}

/// One pointer move toward `target`.
pub fn move_pointer<I: InputSink + ?Sized>(target: ScreenPoint, input: &mut I) {
    if let Err(e) = input.send(InputEvent::MoveTo(target)) {
        tracing::debug!("pointer move to ({}, {}) failed: {:#}", target.x, target.y, e);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        events: Vec<InputEvent>,
        fail: bool,
    }

    impl InputSink for Recorder {
        fn send(&mut self, event: InputEvent) -> anyhow::Result<()> {
            self.events.push(event);
            if self.fail { anyhow::bail!("display gone") }
            Ok(())
        }
        fn screen_size(&self) -> ScreenSize { ScreenSize { width: 100, height: 100 } }
    }

    #[derive(Default)]
    struct Voice(RefCell<Vec<String>>);

    impl Feedback for Voice {
        fn say(&self, phrase: &str) { self.0.borrow_mut().push(phrase.to_string()); }
    }

    #[test]
    fn every_discrete_gesture_is_bound() {
        for g in Gesture::ALL {
            assert_eq!(binding(g).is_some(), g.is_discrete(), "{}", g);
        }
    }

    #[test]
    fn binding_table() {
        use InputEvent::*;
        let expected = [
            (Gesture::StartPresentation, Press(Key::F5),         "Starting presentation"),
            (Gesture::StopPresentation,  Press(Key::Escape),     "Stopping presentation"),
            (Gesture::NextSlide,         Press(Key::RightArrow), "Next slide"),
            (Gesture::PreviousSlide,     Press(Key::LeftArrow),  "Previous slide"),
            (Gesture::Mute,              Press(Key::VolumeMute), "Muted"),
            (Gesture::Unmute,            Press(Key::VolumeMute), "Unmuted"),
            (Gesture::VolumeUp,          Press(Key::VolumeUp),   "Volume up"),
            (Gesture::VolumeDown,        Press(Key::VolumeDown), "Volume down"),
            (Gesture::SingleClick,       Click,                  "Click"),
            (Gesture::DoubleClick,       DoubleClick,            "Double click"),
            (Gesture::RightClick,        RightClick,             "Right click"),
        ];
        for (gesture, event, phrase) in expected {
            assert_eq!(binding(gesture), Some((event, phrase)), "{}", gesture);

            let mut input = Recorder::default();
            let voice = Voice::default();
            dispatch(gesture, &mut input, &voice);
            assert_eq!(input.events, vec![event]);
            assert_eq!(*voice.0.borrow(), vec![phrase.to_string()]);
        }
    }

    #[test]
    fn mute_and_unmute_share_the_key() {
        assert_eq!(binding(Gesture::Mute).map(|b| b.0), Some(InputEvent::Press(Key::VolumeMute)));
        assert_eq!(binding(Gesture::Unmute).map(|b| b.0), Some(InputEvent::Press(Key::VolumeMute)));
    }

    #[test]
    fn dispatch_sends_one_event_and_one_phrase() {
        let mut input = Recorder::default();
        let voice = Voice::default();
        dispatch(Gesture::RightClick, &mut input, &voice);
        assert_eq!(input.events, vec![InputEvent::RightClick]);
        assert_eq!(*voice.0.borrow(), vec!["Right click".to_string()]);
    }

    #[test]
    fn injection_failure_still_speaks() {
        let mut input = Recorder { fail: true, ..Default::default() };
        let voice = Voice::default();
        dispatch(Gesture::StartPresentation, &mut input, &voice);
        assert_eq!(input.events, vec![InputEvent::Press(Key::F5)]);
        assert_eq!(*voice.0.borrow(), vec!["Starting presentation".to_string()]);
    }

    #[test]
    fn move_cursor_dispatches_nothing() {
        let mut input = Recorder::default();
        let voice = Voice::default();
        dispatch(Gesture::MoveCursor, &mut input, &voice);
        assert!(input.events.is_empty());
        assert!(voice.0.borrow().is_empty());
    }
}
