//! Background animated spinner (`spec.md` §4.3 step 1, §9 "Spinner
//! lifecycle across themes"). The rest of the core is single-threaded and
//! synchronous (`spec.md` §5), but animating a spinner while the main
//! thread is blocked in a socket read genuinely needs a second thread of
//! execution — this is the one place the workspace spawns a `std::thread`
//! rather than staying purely cooperative, grounded on the general
//! frame-tick idea in `codex-rs/tui/src/spinner.rs` (frames come from the
//! theme, selected by index) adapted from ratatui's render-tick model to a
//! plain interval thread since there is no redraw loop here to piggyback on.

use std::io::Write;
use std::io::stdout;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::ansi;
use crate::theme::Theme;

pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start animating with `theme`'s current frames. Recreates the
    /// background thread even if one is already running, so a theme change
    /// mid-spin never leaves stale glyphs in flight (`spec.md` §9).
    pub fn start(&mut self, theme: &Theme) {
        self.stop();
        let frames: Vec<String> = theme.spinner_frames.iter().map(|f| f.to_string()).collect();
        if frames.is_empty() {
            return;
        }
        let interval = Duration::from_millis(theme.spinner_interval_ms.max(30));
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = thread::spawn(move || {
            let mut idx = 0usize;
            while thread_running.load(Ordering::Relaxed) {
                let frame = &frames[idx % frames.len()];
                let mut out = stdout();
                let _ = write!(out, "\r{}{}", frame, ansi::CLEAR_TO_EOL);
                let _ = out.flush();
                idx = idx.wrapping_add(1);
                thread::sleep(interval);
            }
        });
        self.running = running;
        self.handle = Some(handle);
    }

    /// Stop the animation and erase whatever glyph is currently on screen.
    /// Idempotent: calling it when nothing is running is a no-op.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            let mut out = stdout();
            let _ = write!(out, "\r{}", ansi::CLEAR_TO_EOL);
            let _ = out.flush();
        }
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_running_until_started() {
        let spinner = Spinner::new();
        assert!(!spinner.is_running());
    }

    #[test]
    fn start_then_stop_leaves_it_not_running() {
        let mut spinner = Spinner::new();
        spinner.start(&Theme::by_name("bbs-classic").expect("built-in theme"));
        assert!(spinner.is_running());
        spinner.stop();
        assert!(!spinner.is_running());
    }

    #[test]
    fn restart_is_safe_while_already_running() {
        let mut spinner = Spinner::new();
        let theme = Theme::by_name("bbs-classic").expect("built-in theme");
        spinner.start(&theme);
        spinner.start(&theme);
        assert!(spinner.is_running());
        spinner.stop();
    }
}
