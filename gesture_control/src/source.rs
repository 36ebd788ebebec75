//! Hand sources: camera/detector input, from hardware, an external
//! landmark detector, or keyboard/mouse simulation.
//!
//! The public interface is [`HandSource::next_frame`], pulled once per loop
//! iteration.  Consumers don't need to know whether hands came from a real
//! detector or the simulator.

use std::io::{self, BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};

use anyhow::{Context, Result};
use serde::Deserialize;

use gesture_core::landmark::{pinched_hand, synthetic_hand, FingerStates};
use gesture_core::{HandObservation, Landmark};

/// Default detector score below which a hand is ignored.
pub const MIN_DETECTION_CONFIDENCE: f32 = 0.7;

/// Largest |x| or |y| a detector landmark may report.  Points slightly off
/// the image are normal; anything past this is a broken detector.
pub const MAX_COORDINATE: f32 = 10.0;

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait: unified interface for hw, detector and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver one frame's worth of hands.
pub trait HandSource {
    /// `Ok(Some(hands))` for a frame (possibly with no hands),
    /// `Ok(None)` once the stream has ended or the camera failed.
    fn next_frame(&mut self) -> Result<Option<Vec<HandObservation>>>;

    fn name(&self) -> &'static str;
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource: external landmark detector speaking JSON lines
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

fn full_score() -> f32 { 1.0 }

/// Parse one detector line into the hands worth classifying.
///
/// Hands under `min_confidence`, without exactly 21 landmarks, or with a
/// non-finite or far out-of-range coordinate are dropped; a detector-reported
/// error yields an empty frame.
pub fn parse_detection(line: &str, min_confidence: f32) -> Result<Vec<HandObservation>> {
    let det: DetectionJson = serde_json::from_str(line)
        .with_context(|| format!("malformed detector line: {}", line.trim()))?;

    if let Some(err) = det.error {
        tracing::warn!("detector error: {}", err);
        return Ok(Vec::new());
    }

    let mut hands = Vec::with_capacity(det.hands.len());
    for hand in det.hands {
        if hand.score < min_confidence {
            tracing::debug!("dropping {} hand, score {:.2}", hand.handedness, hand.score);
            continue;
        }
        if !hand.landmarks.iter().all(plausible) {
            tracing::warn!("dropping {} hand: landmark out of range", hand.handedness);
            continue;
        }
        match HandObservation::new(hand.landmarks) {
            Ok(obs) => hands.push(obs),
            Err(e)  => tracing::warn!("dropping {} hand: {}", hand.handedness, e),
        }
    }
    Ok(hands)
}

fn plausible(l: &Landmark) -> bool {
    l.x.is_finite() && l.y.is_finite() && l.z.is_finite()
        && l.x.abs() <= MAX_COORDINATE && l.y.abs() <= MAX_COORDINATE
}

/// Reads detector output line by line, from stdin or a child process.
pub struct JsonLinesSource {
    reader:         Box<dyn BufRead>,
    child:          Option<Child>,
    min_confidence: f32,
    line:           String,
}

impl JsonLinesSource {
    pub fn from_reader<R: BufRead + 'static>(reader: R, min_confidence: f32) -> Self {
        JsonLinesSource {
            reader: Box::new(reader),
            child: None,
            min_confidence,
            line: String::new(),
        }
    }

    pub fn stdin(min_confidence: f32) -> Self {
        Self::from_reader(BufReader::new(io::stdin()), min_confidence)
    }

    /// Start `command` (program followed by whitespace-separated arguments)
    /// and read its stdout.
    pub fn spawn(command: &str, min_confidence: f32) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next().context("empty detector command")?;

        tracing::info!("Starting hand detector: {}", command);
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start detector `{}`", program))?;

        let stdout = child.stdout.take().context("detector has no stdout")?;
        let mut source = Self::from_reader(BufReader::new(stdout), min_confidence);
        source.child = Some(child);
        Ok(source)
    }
}

impl HandSource for JsonLinesSource {
    fn next_frame(&mut self) -> Result<Option<Vec<HandObservation>>> {
        loop {
            self.line.clear();
            let n = self.reader.read_line(&mut self.line)
                .context("reading detector output")?;
            if n == 0 {
                return Ok(None);
            }
            if self.line.trim().is_empty() {
                continue;
            }
            return match parse_detection(&self.line, self.min_confidence) {
                Ok(hands) => Ok(Some(hands)),
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    Ok(Some(Vec::new()))
                }
            };
        }
    }

    fn name(&self) -> &'static str {
        if self.child.is_some() { "detector command" } else { "stdin" }
    }
}

impl Drop for JsonLinesSource {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions (mm, y up) are mapped onto the 21-point layout and
/// normalized so the tracking volume spans [0, 1] with y growing downward.
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    connection: leaprs::Connection,
}

#[cfg(feature = "leap")]
impl LeapHandSource {
    pub fn open() -> Result<Self> {
        use leaprs::{Connection, ConnectionConfig};
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| anyhow::anyhow!("failed to create LeapC connection: {:?}", e))?;
        connection.open()
            .map_err(|e| anyhow::anyhow!("failed to open LeapMotion device: {:?}", e))?;
        Ok(LeapHandSource { connection })
    }
}

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn next_frame(&mut self) -> Result<Option<Vec<HandObservation>>> {
        use leaprs::Event;

        // Tracking volume, mm.
        const HALF_WIDTH: f32 = 200.0;
        const FLOOR:      f32 = 100.0;
        const SPAN:       f32 = 400.0;

        let norm = |x: f32, y: f32, z: f32| Landmark::new(
            (x + HALF_WIDTH) / SPAN,
            1.0 - (y - FLOOR) / SPAN,
            z / SPAN,
        );

        let msg = match self.connection.poll(100) {
            Ok(m)  => m,
            Err(_) => return Ok(Some(Vec::new())),
        };

        let mut hands = Vec::new();
        if let Event::Tracking(frame) = msg.event() {
            for hand in frame.hands() {
                let digits: Vec<_> = hand.digits().collect();
                if digits.len() < 5 { continue; }

                let mut pts = Vec::with_capacity(21);
                let a = digits[1].metacarpal().prev_joint();
                let b = digits[4].metacarpal().prev_joint();
                pts.push(norm((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0));

                for digit in &digits {
                    for j in [
                        digit.proximal().prev_joint(),
                        digit.intermediate().prev_joint(),
                        digit.distal().prev_joint(),
                        digit.distal().next_joint(),
                    ] {
                        pts.push(norm(j.x, j.y, j.z));
                    }
                }
                if let Ok(obs) = HandObservation::new(pts) {
                    hands.push(obs);
                }
            }
        }
        Ok(Some(hands))
    }

    fn name(&self) -> &'static str { "LeapMotion" }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the overlay window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    /// Mouse position inside the overlay, normalized to [0, 1].
    Pointer { x: f32, y: f32 },
}

/// Simulated poses (mapped from minifb keys by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    /// Raise fingers per `[thumb, index, middle, ring, pinky]`.
    Fingers([u8; 5]),
    /// All fingertips pinched together.
    Pinch,
    /// Take the hand out of view.
    Withdraw,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SimPose {
    Fingers(FingerStates),
    Pinch,
}

/// Hand source driven by [`SimInput`] events from the visualizer's window.
///
/// Holds the last selected pose and re-emits it every frame with the index
/// fingertip under the mouse, so holding a pose behaves like a held hand.
pub struct SimHandSource {
    rx:      Receiver<SimInput>,
    pose:    Option<SimPose>,
    pointer: Landmark,
}

impl SimHandSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandSource {
            rx,
            pose: None,
            pointer: Landmark::new(0.5, 0.4, 0.0),
        }
    }
}

impl HandSource for SimHandSource {
    fn next_frame(&mut self) -> Result<Option<Vec<HandObservation>>> {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::KeyDown(SimKey::Fingers(bits))) =>
                    self.pose = Some(SimPose::Fingers(FingerStates::from_bits(bits))),
                Ok(SimInput::KeyDown(SimKey::Pinch))    => self.pose = Some(SimPose::Pinch),
                Ok(SimInput::KeyDown(SimKey::Withdraw)) => self.pose = None,
                Ok(SimInput::Pointer { x, y })          => self.pointer = Landmark::new(x, y, 0.0),
                Err(TryRecvError::Empty)                => break,
                Err(TryRecvError::Disconnected)         => return Ok(None),
            }
        }

        let hands = match self.pose {
            Some(SimPose::Fingers(states)) => vec![synthetic_hand(states, self.pointer)],
            Some(SimPose::Pinch)           => vec![pinched_hand(self.pointer)],
            None                           => Vec::new(),
        };
        Ok(Some(hands))
    }

    fn name(&self) -> &'static str { "keyboard simulation" }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
