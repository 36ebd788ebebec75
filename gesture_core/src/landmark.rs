//! Landmark geometry: points, hand observations and the two primitive
//! measurements the classifier is built on.
//!
//! Index conventions follow the 21-point MediaPipe hand model:
//!
//! ```text
//!            8   12  16  20        tips
//!            7   11  15  19
//!        4   6   10  14  18        second joints (thumb: 3)
//!        3   5   9   13  17
//!         2
//!          1
//!            0                     wrist
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Number of points a detector reports per hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Fingertip indices, thumb to pinky.
pub const TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Joint each tip is compared against, thumb to pinky.
/// The thumb uses its IP joint, the other fingers their PIP joint.
pub const SECOND_JOINTS: [usize; 5] = [3, 6, 10, 14, 18];

/// Normalized vertical distance a tip must clear its second joint by.
pub const EXTENSION_MARGIN: f32 = 0.03;

/// Bone list of the 21-point hand skeleton, used for drawing.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One detector keypoint. `x`/`y` are normalized to the image (y grows
/// downward), `z` is depth relative to the wrist.  Deserializes straight
/// from the detector's `{"x":..,"y":..,"z":..}` objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

/// Planar distance between two landmarks; `z` is ignored.
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// True when `tip` sits above `second_joint` by more than `margin`.
///
/// Only detects "finger raised relative to the palm" for an upright hand.
/// Sideways or rotated hands read as flexed.
pub fn finger_extended(tip: &Landmark, second_joint: &Landmark, margin: f32) -> bool {
    tip.y < second_joint.y - margin
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LandmarkError {
    /// The detector delivered a point set that is not a full hand.
    WrongCount(usize),
}

impl fmt::Display for LandmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandmarkError::WrongCount(n) => write!(
                f, "expected {} hand landmarks, got {}", LANDMARK_COUNT, n
            ),
        }
    }
}

impl std::error::Error for LandmarkError {}

/// The 21 landmarks of one detected hand in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandObservation {
    pub fn new(points: Vec<Landmark>) -> Result<Self, LandmarkError> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|v: Vec<Landmark>| LandmarkError::WrongCount(v.len()))?;
        Ok(HandObservation { points })
    }

    pub fn from_array(points: [Landmark; LANDMARK_COUNT]) -> Self {
        HandObservation { points }
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn point(&self, index: usize) -> &Landmark { &self.points[index] }

    pub fn index_tip(&self) -> &Landmark { &self.points[INDEX_TIP] }

    pub fn tips(&self) -> [&Landmark; 5] {
        TIPS.map(|i| &self.points[i])
    }

    /// Extended / flexed per finger, thumb to pinky.
    pub fn finger_states(&self) -> FingerStates {
        let mut states = [false; 5];
        for (finger, (&tip, &joint)) in TIPS.iter().zip(SECOND_JOINTS.iter()).enumerate() {
            states[finger] =
                finger_extended(&self.points[tip], &self.points[joint], EXTENSION_MARGIN);
        }
        FingerStates(states)
    }

    /// True when every pair of fingertips is closer than `threshold`.
    pub fn tips_clustered(&self, threshold: f32) -> bool {
        let tips = self.tips();
        for i in 0..tips.len() {
            for j in (i + 1)..tips.len() {
                if distance(tips[i], tips[j]) > threshold {
                    return false;
                }
            }
        }
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// Finger state vector, thumb to pinky; `true` = extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    /// Build from a `[thumb, index, middle, ring, pinky]` 0/1 pattern.
    pub const fn from_bits(bits: [u8; 5]) -> Self {
        FingerStates([bits[0] != 0, bits[1] != 0, bits[2] != 0, bits[3] != 0, bits[4] != 0])
    }
}

impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, up) in self.0.iter().enumerate() {
            if i > 0 { write!(f, ",")?; }
            write!(f, "{}", if *up { 1 } else { 0 })?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Screen projection
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// Absolute pointer target in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    /// Scale a normalized landmark to the screen, truncating toward zero.
    pub fn project(point: &Landmark, screen: ScreenSize) -> Self {
        ScreenPoint {
            x: (point.x * screen.width as f32) as i32,
            y: (point.y * screen.height as f32) as i32,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic hands
// ════════════════════════════════════════════════════════════════════════════

/// Build an upright hand whose fingers are raised per `states`.
///
/// The palm spans roughly 0.3 normalized units; fingers are spread so no
/// two tips cluster. `index_tip` places the index fingertip, the rest of the
/// hand is translated to follow it. Used by simulators and tests.
pub fn synthetic_hand(states: FingerStates, index_tip: Landmark) -> HandObservation {
    // Finger base x offsets relative to the index finger column.
    const COLUMNS: [f32; 5] = [-0.10, 0.0, 0.05, 0.10, 0.15];
    const WRIST_Y: f32 = 0.90;
    const BASE_Y: f32 = 0.70;
    const JOINT_STEP: f32 = 0.06;

    let mut pts = [Landmark::default(); LANDMARK_COUNT];
    pts[WRIST] = Landmark::new(0.05, WRIST_Y, 0.0);

    // Thumb: 1..=4, other fingers: base at 5, 9, 13, 17.
    for (finger, &col) in COLUMNS.iter().enumerate() {
        let base = if finger == 0 { 1 } else { 1 + finger * 4 };
        let up = states.0[finger];
        for k in 0..4 {
            let idx = base + k;
            let y = if up {
                BASE_Y - JOINT_STEP * k as f32
            } else {
                // Curl back down past the second joint.
                BASE_Y - JOINT_STEP * [0.0, 1.0, 0.6, 0.2][k]
            };
            pts[idx] = Landmark::new(col, y, 0.0);
        }
    }

    // Translate so the index tip lands where requested.
    let dx = index_tip.x - pts[INDEX_TIP].x;
    let dy = index_tip.y - pts[INDEX_TIP].y;
    for p in pts.iter_mut() {
        p.x += dx;
        p.y += dy;
    }
    pts[INDEX_TIP] = index_tip;
    HandObservation::from_array(pts)
}

/// A hand with all five fingertips pinched together at `at`.
pub fn pinched_hand(at: Landmark) -> HandObservation {
    let mut hand = synthetic_hand(FingerStates::from_bits([1, 1, 1, 1, 1]), at);
    let offsets = [(-0.02, 0.01), (0.0, 0.0), (0.01, -0.01), (0.02, 0.0), (0.02, 0.02)];
    for (&tip, (ox, oy)) in TIPS.iter().zip(offsets) {
        hand.points[tip] = Landmark::new(at.x + ox, at.y + oy, 0.0);
    }
    hand
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 5.0);
        let b = Landmark::new(0.3, 0.4, -2.0);
        assert!((distance(&a, &b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn extension_needs_to_clear_margin() {
        let joint = Landmark::new(0.5, 0.5, 0.0);
        assert!(finger_extended(&Landmark::new(0.5, 0.40, 0.0), &joint, EXTENSION_MARGIN));
        // Above the joint, but inside the margin.
        assert!(!finger_extended(&Landmark::new(0.5, 0.48, 0.0), &joint, EXTENSION_MARGIN));
        // Below the joint.
        assert!(!finger_extended(&Landmark::new(0.5, 0.60, 0.0), &joint, EXTENSION_MARGIN));
    }

    #[test]
    fn observation_requires_21_points() {
        let err = HandObservation::new(vec![Landmark::default(); 20]).unwrap_err();
        assert_eq!(err, LandmarkError::WrongCount(20));
        assert!(HandObservation::new(vec![Landmark::default(); 21]).is_ok());
    }

    #[test]
    fn synthetic_hand_reproduces_every_pattern() {
        for bits in 0u8..32 {
            let states = FingerStates([
                bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0, bits & 16 != 0,
            ]);
            let hand = synthetic_hand(states, Landmark::new(0.5, 0.4, 0.0));
            assert_eq!(hand.finger_states(), states, "pattern {}", states);
        }
    }

    #[test]
    fn synthetic_hand_tips_are_spread() {
        let hand = synthetic_hand(FingerStates::from_bits([1, 1, 1, 1, 1]), Landmark::new(0.5, 0.4, 0.0));
        assert!(!hand.tips_clustered(0.07));
    }

    #[test]
    fn pinched_hand_clusters() {
        let hand = pinched_hand(Landmark::new(0.5, 0.5, 0.0));
        assert!(hand.tips_clustered(0.07));
    }

    #[test]
    fn synthetic_hand_follows_index_tip() {
        let at = Landmark::new(0.25, 0.35, 0.0);
        let hand = synthetic_hand(FingerStates::from_bits([0, 1, 0, 0, 0]), at);
        assert!((hand.index_tip().x - 0.25).abs() < 1e-6);
        assert!((hand.index_tip().y - 0.35).abs() < 1e-6);
    }

    #[test]
    fn projection_truncates() {
        let screen = ScreenSize { width: 1920, height: 1080 };
        let p = ScreenPoint::project(&Landmark::new(0.5, 0.25, 0.0), screen);
        assert_eq!(p, ScreenPoint { x: 960, y: 270 });
        let p = ScreenPoint::project(&Landmark::new(0.33333, 0.999, 0.0), screen);
        assert_eq!(p, ScreenPoint { x: 639, y: 1078 });
    }

    #[test]
    fn finger_states_display() {
        assert_eq!(FingerStates::from_bits([1, 0, 0, 1, 0]).to_string(), "1,0,0,1,0");
    }
}
