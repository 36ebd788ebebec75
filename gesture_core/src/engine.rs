//! Per-frame pipeline: classify → controller → dispatch.
//!
//! `GestureEngine` owns the session [`Controller`] and the two collaborator
//! handles. The I/O loop calls [`GestureEngine::process_frame`] once per
//! detector frame; tests drive the same entry point with synthetic hands and
//! a synthetic clock.

use std::time::Instant;

use crate::classifier::{classify, Gesture};
use crate::controller::{Controller, FrameOutcome};
use crate::dispatch::{dispatch, move_pointer, Feedback, InputSink, CURSOR_ACTIVATED};
use crate::landmark::{HandObservation, ScreenPoint};

/// What happened to one hand in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandReport {
    pub gesture: Option<Gesture>,
    pub outcome: FrameOutcome,
}

pub struct GestureEngine<I, F> {
    controller: Controller,
    input: I,
    feedback: F,
}

impl<I: InputSink, F: Feedback> GestureEngine<I, F> {
    pub fn new(input: I, feedback: F) -> Self {
        GestureEngine { controller: Controller::new(), input, feedback }
    }

    pub fn controller(&self) -> &Controller { &self.controller }
    pub fn input(&self) -> &I { &self.input }
    pub fn feedback(&self) -> &F { &self.feedback }

    /// Speak a phrase outside the gesture path (start-up, shutdown).
    pub fn announce(&self, phrase: &str) {
        self.feedback.say(phrase);
    }

    /// Process every hand of one frame, in detector order.
    pub fn process_frame(&mut self, hands: &[HandObservation], now: Instant) -> Vec<HandReport> {
        if hands.is_empty() {
            self.controller.no_hands();
        }
        hands.iter().map(|h| self.process_hand(h, now)).collect()
    }

    pub fn process_hand(&mut self, hand: &HandObservation, now: Instant) -> HandReport {
        let gesture = classify(hand);
        let pointer = ScreenPoint::project(hand.index_tip(), self.input.screen_size());
        let outcome = self.controller.step(gesture, pointer, now);

        match outcome {
            FrameOutcome::Continuous { target, activated } => {
                if activated {
                    tracing::info!("Cursor mode activated");
                    self.feedback.say(CURSOR_ACTIVATED);
                }
                move_pointer(target, &mut self.input);
            }
            FrameOutcome::Discrete(g) => {
                tracing::info!("Gesture detected: {}", g);
                dispatch(g, &mut self.input, &self.feedback);
            }
            FrameOutcome::Suppressed(g) => {
                tracing::debug!("Gesture {} suppressed", g);
            }
            FrameOutcome::Idle => {}
        }

        HandReport { gesture, outcome }
    }
}
