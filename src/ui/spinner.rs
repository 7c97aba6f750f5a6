//! Busy indicator drawn on the current line while a request is outstanding.
//!
//! The animation runs on its own thread and only ever rewrites its own line.
//! Nothing else should print while it is spinning.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use unicode_width::UnicodeWidthStr;

pub const SPINNER_GLYPHS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_MESSAGE: &str = "Processing...";
/// Blank columns written past the message on stop.
const CLEAR_PADDING: usize = 8;

pub struct BusyIndicator<W: Write + Send + 'static> {
    message: Arc<str>,
    writer: Arc<Mutex<W>>,
    spinning: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BusyIndicator<io::Stdout> {
    pub fn stdout(message: impl Into<String>) -> Self {
        Self::new(message, io::stdout())
    }
}

impl<W: Write + Send + 'static> BusyIndicator<W> {
    pub fn new(message: impl Into<String>, writer: W) -> Self {
        let message: String = message.into();
        Self {
            message: Arc::from(message),
            writer: Arc::new(Mutex::new(writer)),
            spinning: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.handle.is_some()
    }

    /// Begin animating. Does nothing if already spinning.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        self.spinning.store(true, Ordering::SeqCst);
        let spinning = Arc::clone(&self.spinning);
        let writer = Arc::clone(&self.writer);
        let message = Arc::clone(&self.message);

        self.handle = Some(thread::spawn(move || {
            // The first frame is always drawn, even if `stop` follows immediately.
            let mut frame = 0_usize;
            loop {
                {
                    let mut out = writer.lock().unwrap_or_else(PoisonError::into_inner);
                    let glyph = SPINNER_GLYPHS[frame % SPINNER_GLYPHS.len()];
                    let _ = write!(out, "\r{glyph} {message}");
                    let _ = out.flush();
                }
                frame = frame.wrapping_add(1);
                // Woken early by `stop`.
                thread::park_timeout(FRAME_INTERVAL);
                if !spinning.load(Ordering::SeqCst) {
                    break;
                }
            }
        }));
    }

    /// Stop animating, wait for the thread to finish, and blank the line.
    /// Safe to call when not spinning.
    pub fn stop(&mut self) -> io::Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.spinning.store(false, Ordering::SeqCst);
        handle.thread().unpark();
        if handle.join().is_err() {
            tracing::debug!("busy indicator thread panicked");
        }

        let mut out = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        write!(out, "\r{}\r", " ".repeat(self.clear_width()))?;
        out.flush()
    }

    /// Columns covered by the widest glyph, the separating space and the
    /// message, plus padding.
    fn clear_width(&self) -> usize {
        let glyph_width = SPINNER_GLYPHS
            .iter()
            .map(|glyph| glyph.width())
            .max()
            .unwrap_or(1);
        glyph_width + 1 + self.message.width() + CLEAR_PADDING
    }
}

impl<W: Write + Send + 'static> Drop for BusyIndicator<W> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Cloneable in-memory writer for observing indicator and loop output.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
