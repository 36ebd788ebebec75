//! Gesture classification: one label (or none) per hand per frame.
//!
//! Two stages:
//!
//! 1. **Pinch override**: all five fingertips within [`CLUSTER_THRESHOLD`]
//!    of each other → `StopPresentation`, whatever the fingers look like.
//! 2. **Pattern table**: the finger state vector is matched against
//!    [`PATTERN_TABLE`] row by row; first exact match wins.
//!
//! The table binds `1,1,0,0,0` twice (`VolumeUp` then `SingleClick`); the
//! second row never matches.

use std::fmt;
use std::str::FromStr;

use crate::landmark::{FingerStates, HandObservation};

/// Fingertip cluster radius (normalized units) for the pinch override.
pub const CLUSTER_THRESHOLD: f32 = 0.07;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    StartPresentation,
    StopPresentation,
    NextSlide,
    PreviousSlide,
    Mute,
    Unmute,
    VolumeUp,
    VolumeDown,
    SingleClick,
    DoubleClick,
    RightClick,
    MoveCursor,
}

impl Gesture {
    pub const ALL: [Gesture; 12] = [
        Gesture::StartPresentation,
        Gesture::StopPresentation,
        Gesture::NextSlide,
        Gesture::PreviousSlide,
        Gesture::Mute,
        Gesture::Unmute,
        Gesture::VolumeUp,
        Gesture::VolumeDown,
        Gesture::SingleClick,
        Gesture::DoubleClick,
        Gesture::RightClick,
        Gesture::MoveCursor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::StartPresentation => "start_presentation",
            Gesture::StopPresentation  => "stop_presentation",
            Gesture::NextSlide         => "next_slide",
            Gesture::PreviousSlide     => "previous_slide",
            Gesture::Mute              => "mute",
            Gesture::Unmute            => "unmute",
            Gesture::VolumeUp          => "volume_up",
            Gesture::VolumeDown        => "volume_down",
            Gesture::SingleClick       => "single_click",
            Gesture::DoubleClick       => "double_click",
            Gesture::RightClick        => "right_click",
            Gesture::MoveCursor        => "move_cursor",
        }
    }

    /// Everything except `MoveCursor` is a one-shot action.
    pub fn is_discrete(self) -> bool {
        self != Gesture::MoveCursor
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("unknown gesture '{}'", s))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pattern table
// ════════════════════════════════════════════════════════════════════════════

/// Finger pattern → gesture, evaluated top to bottom.
pub const PATTERN_TABLE: [(FingerStates, Gesture); 12] = [
    (FingerStates::from_bits([1, 1, 1, 1, 1]), Gesture::StartPresentation),
    (FingerStates::from_bits([0, 0, 0, 0, 0]), Gesture::StopPresentation),
    (FingerStates::from_bits([1, 1, 1, 1, 0]), Gesture::NextSlide),
    (FingerStates::from_bits([1, 1, 0, 0, 1]), Gesture::PreviousSlide),
    (FingerStates::from_bits([1, 0, 0, 0, 0]), Gesture::Unmute),
    (FingerStates::from_bits([0, 0, 0, 0, 1]), Gesture::Mute),
    (FingerStates::from_bits([1, 1, 0, 0, 0]), Gesture::VolumeUp),
    (FingerStates::from_bits([1, 0, 0, 0, 1]), Gesture::VolumeDown),
    (FingerStates::from_bits([1, 1, 0, 0, 0]), Gesture::SingleClick),
    (FingerStates::from_bits([1, 1, 1, 0, 0]), Gesture::DoubleClick),
    (FingerStates::from_bits([0, 0, 1, 1, 1]), Gesture::RightClick),
    (FingerStates::from_bits([0, 1, 0, 0, 0]), Gesture::MoveCursor),
];

/// Table lookup for a finger state vector.
pub fn match_pattern(states: FingerStates) -> Option<Gesture> {
    PATTERN_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == states)
        .map(|&(_, gesture)| gesture)
}

/// Classify one hand.
pub fn classify(hand: &HandObservation) -> Option<Gesture> {
    if hand.tips_clustered(CLUSTER_THRESHOLD) {
        return Some(Gesture::StopPresentation);
    }
    match_pattern(hand.finger_states())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{pinched_hand, synthetic_hand, Landmark};

    fn hand(bits: [u8; 5]) -> HandObservation {
        synthetic_hand(FingerStates::from_bits(bits), Landmark::new(0.5, 0.4, 0.0))
    }

    #[test]
    fn table_rows_classify() {
        let cases = [
            ([1, 1, 1, 1, 1], Gesture::StartPresentation),
            ([0, 0, 0, 0, 0], Gesture::StopPresentation),
            ([1, 1, 1, 1, 0], Gesture::NextSlide),
            ([1, 1, 0, 0, 1], Gesture::PreviousSlide),
            ([1, 0, 0, 0, 0], Gesture::Unmute),
            ([0, 0, 0, 0, 1], Gesture::Mute),
            ([1, 1, 0, 0, 0], Gesture::VolumeUp),
            ([1, 0, 0, 0, 1], Gesture::VolumeDown),
            ([1, 1, 1, 0, 0], Gesture::DoubleClick),
            ([0, 0, 1, 1, 1], Gesture::RightClick),
            ([0, 1, 0, 0, 0], Gesture::MoveCursor),
        ];
        for (bits, expected) in cases {
            assert_eq!(classify(&hand(bits)), Some(expected), "pattern {:?}", bits);
        }
    }

    #[test]
    fn unlisted_pattern_is_none() {
        assert_eq!(classify(&hand([0, 1, 1, 0, 0])), None);
        assert_eq!(classify(&hand([0, 1, 0, 1, 0])), None);
    }

    #[test]
    fn duplicate_pattern_first_row_wins() {
        let states = FingerStates::from_bits([1, 1, 0, 0, 0]);
        assert_eq!(match_pattern(states), Some(Gesture::VolumeUp));
        // SingleClick has a row but can never be produced.
        for bits in 0u8..32 {
            let s = FingerStates([
                bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0, bits & 16 != 0,
            ]);
            assert_ne!(match_pattern(s), Some(Gesture::SingleClick));
        }
    }

    #[test]
    fn lookup_is_deterministic() {
        for &(pattern, _) in PATTERN_TABLE.iter() {
            assert_eq!(match_pattern(pattern), match_pattern(pattern));
        }
    }

    #[test]
    fn pinch_overrides_all_extended() {
        let h = pinched_hand(Landmark::new(0.5, 0.5, 0.0));
        // Vector alone would read as StartPresentation.
        assert_eq!(match_pattern(h.finger_states()), Some(Gesture::StartPresentation));
        assert_eq!(classify(&h), Some(Gesture::StopPresentation));
    }

    #[test]
    fn gesture_names_round_trip() {
        for g in Gesture::ALL {
            assert_eq!(g.as_str().parse::<Gesture>(), Ok(g));
        }
        assert!("wave".parse::<Gesture>().is_err());
    }

    #[test]
    fn only_move_cursor_is_continuous() {
        assert!(!Gesture::MoveCursor.is_discrete());
        assert_eq!(Gesture::ALL.iter().filter(|g| g.is_discrete()).count(), 11);
    }
}
