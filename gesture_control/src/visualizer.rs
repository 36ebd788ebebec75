//! Software-rendered landmark overlay using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                               [CURSOR] [MUTE]│
//! │          skeleton + fingertip markers        │
//! │                                              │
//! │  status bar                                  │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The window also owns the keyboard: `q` quits, and in simulation mode the
//! pose keys and mouse position are forwarded as [`SimInput`] events.

use std::sync::mpsc::Sender;

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use gesture_core::landmark::{HAND_CONNECTIONS, TIPS};
use gesture_core::HandObservation;

use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 640;
pub const WIN_H:      usize = 480;
const STATUS_Y:       usize = WIN_H - 44;
const BG_COLOR:       u32   = 0xFF101018;
const BONE_COLOR:     u32   = 0xFFE0E0E0;
const JOINT_COLOR:    u32   = 0xFFFF3030;
const TIP_COLOR:      u32   = 0xFFFFFF00;
const TEXT_BG:        u32   = 0xFF0F3460;
const BADGE_ON:       u32   = 0xFF2E8B57;
const TIP_RADIUS:     isize = 10;
const JOINT_RADIUS:   isize = 3;
const FONT_SCALE:     usize = 2;

/// Key → simulated pose.  Rows follow the gesture table.
const SIM_KEYS: [(Key, SimKey); 13] = [
    (Key::Key1,  SimKey::Fingers([1, 1, 1, 1, 1])),
    (Key::Key2,  SimKey::Fingers([0, 0, 0, 0, 0])),
    (Key::Key3,  SimKey::Fingers([1, 1, 1, 1, 0])),
    (Key::Key4,  SimKey::Fingers([1, 1, 0, 0, 1])),
    (Key::Key5,  SimKey::Fingers([1, 0, 0, 0, 0])),
    (Key::Key6,  SimKey::Fingers([0, 0, 0, 0, 1])),
    (Key::Key7,  SimKey::Fingers([1, 1, 0, 0, 0])),
    (Key::Key8,  SimKey::Fingers([1, 0, 0, 0, 1])),
    (Key::Key9,  SimKey::Fingers([1, 1, 1, 0, 0])),
    (Key::Key0,  SimKey::Fingers([0, 0, 1, 1, 1])),
    (Key::C,     SimKey::Fingers([0, 1, 0, 0, 0])),
    (Key::P,     SimKey::Pinch),
    (Key::Space, SimKey::Withdraw),
];

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    /// Present in simulation mode only.
    sim_tx: Option<Sender<SimInput>>,
    last_pointer: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Smart Gesture Control",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("cannot open overlay window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            last_pointer: None,
        })
    }

    /// Poll keyboard/mouse.  Returns false when the user quit or closed the
    /// window.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }
        if self.window.is_key_pressed(Key::Q, KeyRepeat::No) { return false; }

        let Some(tx) = self.sim_tx.as_ref() else { return true };

        for (key, sim) in SIM_KEYS {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                let _ = tx.send(SimInput::KeyDown(sim));
            }
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            if self.last_pointer != Some((mx, my)) {
                self.last_pointer = Some((mx, my));
                let _ = tx.send(SimInput::Pointer {
                    x: mx / WIN_W as f32,
                    y: my / WIN_H as f32,
                });
            }
        }
        true
    }

    /// Render one frame.
    pub fn render(&mut self, hands: &[HandObservation], status: &str, cursor_mode: bool, muted: bool) {
        self.buf.fill(BG_COLOR);

        for hand in hands {
            self.draw_hand(hand);
        }

        // ── Mode badges ───────────────────────────────────────────────────
        if cursor_mode { self.draw_badge("CURSOR", WIN_W - 200); }
        if muted       { self.draw_badge("MUTED",  WIN_W - 90); }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(status, 10, STATUS_Y + 6, 0xFFEEEEEE);

        let legend = if self.sim_tx.is_some() {
            "1-9,0=poses  C=cursor  P=pinch  SPACE=no hand  Q=quit"
        } else {
            "Q=quit"
        };
        self.draw_label(legend, 10, WIN_H - 16, 0xFF888888);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Hand ──────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &HandObservation) {
        let px = |i: usize| {
            let p = hand.point(i);
            to_pixel(p.x, p.y)
        };

        for (a, b) in HAND_CONNECTIONS {
            let (x0, y0) = px(a);
            let (x1, y1) = px(b);
            self.draw_line(x0, y0, x1, y1, BONE_COLOR);
        }
        for i in 0..hand.points().len() {
            let (x, y) = px(i);
            self.fill_circle(x, y, JOINT_RADIUS, JOINT_COLOR);
        }
        for tip in TIPS {
            let (x, y) = px(tip);
            self.fill_circle(x, y, TIP_RADIUS, TIP_COLOR);
        }
    }

    fn draw_badge(&mut self, text: &str, x: usize) {
        let w = text.len() * 4 * FONT_SCALE + 12;
        self.fill_rect(x, 10, w, 22, BADGE_ON);
        self.draw_label(text, x + 6, 16, 0xFFFFFFFF);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            let start = row * WIN_W + x.min(WIN_W);
            let end   = row * WIN_W + (x + w).min(WIN_W);
            self.buf[start..end].fill(color);
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    /// Bresenham line.
    fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    fn fill_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 3×5 bitmap font, scaled by [`FONT_SCALE`].
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = glyph(ch);
            for row in 0..5 {
                let bits = (glyph >> (3 * (4 - row))) & 0o7;
                for col in 0..3 {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for sy in 0..FONT_SCALE {
                        for sx in 0..FONT_SCALE {
                            self.set_pixel(
                                (cx + col * FONT_SCALE + sx) as isize,
                                (y + row * FONT_SCALE + sy) as isize,
                                color,
                            );
                        }
                    }
                }
            }
            cx += 4 * FONT_SCALE;
            if cx + 4 * FONT_SCALE > WIN_W { break; }
        }
    }
}

/// Window pixel for a normalized point.  Off-screen points are pulled in to
/// within one window size of the frame so line drawing stays bounded.
fn to_pixel(x: f32, y: f32) -> (isize, isize) {
    (
        (x.clamp(-1.0, 2.0) * WIN_W as f32) as isize,
        (y.clamp(-1.0, 2.0) * WIN_H as f32) as isize,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font: one octal digit per row, top row first
// ────────────────────────────────────────────────────────────────────────────

const GLYPHS: [(char, u16); 48] = [
    ('0', 0o75557), ('1', 0o26227), ('2', 0o71747), ('3', 0o71717), ('4', 0o55711),
    ('5', 0o74717), ('6', 0o74757), ('7', 0o71111), ('8', 0o75757), ('9', 0o75717),
    ('A', 0o75755), ('B', 0o65656), ('C', 0o74447), ('D', 0o65556), ('E', 0o74747),
    ('F', 0o74744), ('G', 0o74557), ('H', 0o55755), ('I', 0o72227), ('J', 0o11157),
    ('K', 0o55655), ('L', 0o44447), ('M', 0o57555), ('N', 0o75555), ('O', 0o75557),
    ('P', 0o75744), ('Q', 0o75571), ('R', 0o65655), ('S', 0o74717), ('T', 0o72222),
    ('U', 0o55557), ('V', 0o55522), ('W', 0o55575), ('X', 0o55255), ('Y', 0o55722),
    ('Z', 0o71247), ('_', 0o00007), ('-', 0o00700), ('=', 0o07070), (':', 0o02020),
    ('.', 0o00002), (',', 0o00024), ('/', 0o11244), ('(', 0o12221), (')', 0o42224),
    ('\'', 0o22000), ('!', 0o22202), ('|', 0o22222),
];

fn glyph(c: char) -> u16 {
    if c == ' ' { return 0; }
    let c = c.to_ascii_uppercase();
    GLYPHS.iter()
        .find(|(g, _)| *g == c)
        .map(|&(_, bits)| bits)
        .unwrap_or(0o00200) // fallback dot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_lookup_is_case_insensitive() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph(' '), 0);
        assert_eq!(glyph('~'), 0o00200);
    }

    #[test]
    fn pixels_stay_near_the_window() {
        assert_eq!(to_pixel(0.5, 0.5), (320, 240));
        assert_eq!(to_pixel(1e9, -1e30), (2 * WIN_W as isize, -(WIN_H as isize)));
        assert_eq!(to_pixel(f32::NAN, f32::INFINITY), (0, 2 * WIN_H as isize));
    }

    #[test]
    fn every_sim_key_is_distinct() {
        for (i, (a, _)) in SIM_KEYS.iter().enumerate() {
            for (b, _) in &SIM_KEYS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
