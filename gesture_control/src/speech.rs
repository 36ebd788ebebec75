//! Spoken feedback on a background thread.
//!
//! Phrases are queued to one worker thread and handed to a speech engine
//! without waiting for playback.  Overlapping phrases may play at once.

use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use gesture_core::Feedback;

// ════════════════════════════════════════════════════════════════════════════
// SpeechCommand: sent to the worker thread
// ════════════════════════════════════════════════════════════════════════════

pub enum SpeechCommand {
    Say(String),
    /// Terminate the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// SpeechOut: abstraction over a TTS engine / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait SpeechOut: Send {
    /// Start speaking `phrase`; must not wait for it to finish.
    fn speak(&mut self, phrase: &str);

    /// Release finished playback resources.
    fn reap(&mut self) {}
}

// ── command backend ───────────────────────────────────────────────────────

/// Runs an external TTS program (`espeak`, `say`, …) once per phrase,
/// with the phrase as the last argument.
pub struct CommandSpeech {
    program: String,
    args:    Vec<String>,
    running: Vec<Child>,
    broken:  bool,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        CommandSpeech { program: program.into(), args, running: Vec::new(), broken: false }
    }
}

impl SpeechOut for CommandSpeech {
    fn speak(&mut self, phrase: &str) {
        if self.broken { return; }
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(phrase)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.running.push(child),
            Err(e) => {
                tracing::warn!("[speech] cannot run `{}`: {} — speech disabled", self.program, e);
                self.broken = true;
            }
        }
    }

    fn reap(&mut self) {
        self.running.retain_mut(|c| matches!(c.try_wait(), Ok(None)));
    }
}

// ── null backend (speech disabled) ────────────────────────────────────────

pub struct NullSpeech;
impl SpeechOut for NullSpeech {
    fn speak(&mut self, phrase: &str) {
        tracing::debug!("[speech] (silent) {}", phrase);
    }
}

/// Platform default speech program and its arguments (rate 150 wpm).
pub fn default_speech_command() -> (String, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("say".into(), vec!["-r".into(), "150".into()])
    } else {
        ("espeak".into(), vec!["-s".into(), "150".into()])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Speaker: handle to the worker thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the speech thread.  Implements [`Feedback`].
pub struct Speaker {
    cmd_tx: Sender<SpeechCommand>,
}

impl Speaker {
    /// Spawn the worker thread around `out`.
    pub fn spawn(out: Box<dyn SpeechOut>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SpeechCommand>();
        thread::spawn(move || speech_thread(out, cmd_rx));
        Speaker { cmd_tx }
    }

    /// Ask the thread to stop once its queue is drained.  Does not wait.
    pub fn quit(&self) { let _ = self.cmd_tx.send(SpeechCommand::Quit); }
}

impl Feedback for Speaker {
    fn say(&self, phrase: &str) {
        let _ = self.cmd_tx.send(SpeechCommand::Say(phrase.to_string()));
    }
}

fn speech_thread(mut out: Box<dyn SpeechOut>, cmd_rx: Receiver<SpeechCommand>) {
    const REAP_EVERY: Duration = Duration::from_millis(500);
    loop {
        match cmd_rx.recv_timeout(REAP_EVERY) {
            Ok(SpeechCommand::Say(phrase))             => out.speak(&phrase),
            Ok(SpeechCommand::Quit)                    => return,
            Err(RecvTimeoutError::Timeout)             => {}
            Err(RecvTimeoutError::Disconnected)        => return,
        }
        out.reap();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    struct Capture(Arc<Mutex<Vec<String>>>);

    impl SpeechOut for Capture {
        fn speak(&mut self, phrase: &str) {
            self.0.lock().unwrap().push(phrase.to_string());
        }
    }

    fn wait_for(log: &Arc<Mutex<Vec<String>>>, n: usize) {
        let start = Instant::now();
        while log.lock().unwrap().len() < n && start.elapsed() < Duration::from_secs(2) {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn phrases_reach_the_backend() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let speaker = Speaker::spawn(Box::new(Capture(log.clone())));
        speaker.say("Next slide");
        speaker.say("Muted");
        wait_for(&log, 2);
        assert_eq!(*log.lock().unwrap(), vec!["Next slide".to_string(), "Muted".to_string()]);
        speaker.quit();
    }

    struct Slow;

    impl SpeechOut for Slow {
        fn speak(&mut self, _phrase: &str) {
            thread::sleep(Duration::from_millis(300));
        }
    }

    #[test]
    fn say_does_not_wait_for_playback() {
        let speaker = Speaker::spawn(Box::new(Slow));
        let start = Instant::now();
        for _ in 0..5 {
            speaker.say("Volume up");
        }
        assert!(start.elapsed() < Duration::from_millis(200));
        speaker.quit();
    }

    #[test]
    fn say_after_quit_does_not_panic() {
        let speaker = Speaker::spawn(Box::new(NullSpeech));
        speaker.quit();
        thread::sleep(Duration::from_millis(20));
        speaker.say("Exiting gesture control");
    }

    #[test]
    fn missing_program_disables_speech() {
        let mut out = CommandSpeech::new("definitely-not-a-tts-binary-xyz", Vec::new());
        out.speak("hello");
        assert!(out.broken);
        out.speak("again");
        assert!(out.running.is_empty());
    }
}
