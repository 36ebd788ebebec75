//! OS input injection: enigo backend and a logging null backend.

use anyhow::{anyhow, Result};
use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use gesture_core::{InputEvent, InputSink, Key, ScreenSize};

/// Fallback when the display size can't be queried.
pub const DEFAULT_SCREEN: ScreenSize = ScreenSize { width: 1920, height: 1080 };

// ── enigo backend ─────────────────────────────────────────────────────────

pub struct EnigoInput {
    enigo:  Enigo,
    screen: ScreenSize,
}

impl EnigoInput {
    /// Connect to the display server.  `screen` overrides the detected size.
    pub fn new(screen: Option<ScreenSize>) -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow!("enigo init failed: {:?}", e))?;

        let screen = match screen {
            Some(s) => s,
            None => match enigo.main_display() {
                Ok((w, h)) if w > 0 && h > 0 => ScreenSize { width: w as u32, height: h as u32 },
                other => {
                    tracing::warn!("[input] display size unavailable ({:?}) — assuming {}x{}",
                        other, DEFAULT_SCREEN.width, DEFAULT_SCREEN.height);
                    DEFAULT_SCREEN
                }
            },
        };
        tracing::info!("[input] screen {}x{}", screen.width, screen.height);
        Ok(EnigoInput { enigo, screen })
    }
}

fn enigo_key(key: Key) -> enigo::Key {
    match key {
        Key::F5         => enigo::Key::F5,
        Key::Escape     => enigo::Key::Escape,
        Key::RightArrow => enigo::Key::RightArrow,
        Key::LeftArrow  => enigo::Key::LeftArrow,
        Key::VolumeMute => enigo::Key::VolumeMute,
        Key::VolumeUp   => enigo::Key::VolumeUp,
        Key::VolumeDown => enigo::Key::VolumeDown,
    }
}

impl InputSink for EnigoInput {
    fn send(&mut self, event: InputEvent) -> Result<()> {
        let res = match event {
            InputEvent::Press(key) => self.enigo.key(enigo_key(key), Direction::Click),
            InputEvent::Click      => self.enigo.button(Button::Left, Direction::Click),
            InputEvent::RightClick => self.enigo.button(Button::Right, Direction::Click),
            InputEvent::DoubleClick => self.enigo.button(Button::Left, Direction::Click)
                .and_then(|_| self.enigo.button(Button::Left, Direction::Click)),
            InputEvent::MoveTo(p) => {
                let x = p.x.clamp(0, self.screen.width.saturating_sub(1) as i32);
                let y = p.y.clamp(0, self.screen.height.saturating_sub(1) as i32);
                self.enigo.move_mouse(x, y, Coordinate::Abs)
            }
        };
        res.map_err(|e| anyhow!("{:?}", e))
    }

    fn screen_size(&self) -> ScreenSize { self.screen }
}

// ── null backend (dry run, or no display) ─────────────────────────────────

pub struct NullInput {
    screen: ScreenSize,
}

impl NullInput {
    pub fn new(screen: ScreenSize) -> Self { NullInput { screen } }
}

impl InputSink for NullInput {
    fn send(&mut self, event: InputEvent) -> Result<()> {
        tracing::debug!("[input] (dry run) {:?}", event);
        Ok(())
    }

    fn screen_size(&self) -> ScreenSize { self.screen }
}

/// Open the real injection backend, falling back to [`NullInput`] with a
/// warning when the display can't be reached.
pub fn open_input(dry_run: bool, screen: Option<ScreenSize>) -> Box<dyn InputSink> {
    if dry_run {
        tracing::info!("[input] dry run — no input will be injected");
        return Box::new(NullInput::new(screen.unwrap_or(DEFAULT_SCREEN)));
    }
    match EnigoInput::new(screen) {
        Ok(input) => Box::new(input),
        Err(e) => {
            tracing::warn!("[input] {:#} — using null input", e);
            Box::new(NullInput::new(screen.unwrap_or(DEFAULT_SCREEN)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_core::ScreenPoint;

    #[test]
    fn dry_run_accepts_everything() {
        let screen = ScreenSize { width: 800, height: 600 };
        let mut input = open_input(true, Some(screen));
        assert_eq!(input.screen_size(), screen);
        assert!(input.send(InputEvent::Press(Key::F5)).is_ok());
        assert!(input.send(InputEvent::MoveTo(ScreenPoint { x: -5, y: 9000 })).is_ok());
    }

    #[test]
    fn dry_run_defaults_screen() {
        assert_eq!(open_input(true, None).screen_size(), DEFAULT_SCREEN);
    }
}
