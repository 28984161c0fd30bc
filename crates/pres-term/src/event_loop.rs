// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — one key, one cycle.
//
// Bytes arrive from the background reader, the parser turns them into
// keys, and each key runs a full synchronous cycle: the application
// handles it, paints a fresh frame, and the renderer writes the rows that
// changed. Nothing is processed concurrently with a cycle.
//
// # Waiting
//
// The loop blocks on the reader channel. While the parser holds a partial
// sequence (a lone ESC) it waits at most `escape_timeout`, then flushes
// the pending bytes as literal keys. Otherwise it wakes every
// `idle_tick` only to notice a SIGWINCH.
//
// # Failed frames
//
// `App::paint` returns `Result`. A paint that runs off the frame is logged
// and the frame is dropped; the previous frame stays on screen and the
// next key paints again.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi;
use crate::frame::{FrameBuffer, FrameError};
use crate::input::{KeyEvent, Parser};
use crate::reader::TtyReader;
use crate::renderer::Renderer;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the loop after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// An application driven by [`EventLoop`].
///
/// Per key the loop calls [`on_key`](App::on_key), then
/// [`paint`](App::paint) on a cleared frame, then [`cursor`](App::cursor).
pub trait App {
    /// Handle one key. Return [`Action::Quit`] to leave the loop.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// The terminal was resized. The frame has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole screen into `frame`.
    ///
    /// # Errors
    ///
    /// [`FrameError`] when a paint call falls outside the frame; the loop
    /// skips the frame.
    fn paint(&mut self, frame: &mut FrameBuffer) -> Result<(), FrameError>;

    /// Where to show the hardware cursor, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long a lone ESC waits for the rest of a sequence.
    pub escape_timeout: Duration,
    /// Wake-up interval while idle, for resize detection.
    pub idle_tick: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout: Duration::from_millis(25),
            idle_tick: Duration::from_millis(100),
        }
    }
}

// ─── Drawing ─────────────────────────────────────────────────────────────────

/// Paint one frame and write it to `out`.
///
/// Returns `Ok(false)` when the paint failed and the frame was skipped.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub fn draw(
    app: &mut impl App,
    frame: &mut FrameBuffer,
    renderer: &mut Renderer,
    out: &mut impl Write,
) -> io::Result<bool> {
    frame.clear();
    if let Err(err) = app.paint(frame) {
        tracing::warn!(%err, "paint failed, frame skipped");
        return Ok(false);
    }

    renderer.render(frame);
    renderer.flush_to(out)?;

    if let Some((x, y)) = app.cursor() {
        ansi::cursor_to(out, x, y)?;
        ansi::cursor_show(out)?;
    } else {
        ansi::cursor_hide(out)?;
    }
    out.flush()?;
    Ok(true)
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer. [`run`](Self::run) returns when
/// the application quits or key input closes.
///
/// ```no_run
/// use pres_term::event_loop::{Action, App, EventLoop};
/// use pres_term::frame::{FrameBuffer, FrameError};
/// use pres_term::input::{KeyCode, KeyEvent};
///
/// struct Hello;
///
/// impl App for Hello {
///     fn on_key(&mut self, key: KeyEvent) -> Action {
///         if key.code == KeyCode::Char('q') { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, frame: &mut FrameBuffer) -> Result<(), FrameError> {
///         frame.put_str(0, 0, "hello", Default::default()).map(|_| ())
///     }
/// }
///
/// EventLoop::new()?.run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
    config: LoopConfig,
}

impl EventLoop {
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be opened.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// # Errors
    ///
    /// Returns an error if the terminal cannot be opened.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            renderer: Renderer::new(),
            config,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until quit, and restore the terminal on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, output or teardown fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        #[cfg(unix)]
        let spawned = TtyReader::spawn(self.terminal.input_fd());
        #[cfg(not(unix))]
        let spawned = TtyReader::spawn();

        let result = match spawned {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(err) => Err(err),
        };

        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        app.on_resize(size);
        draw(app, &mut frame, &mut self.renderer, &mut io::stdout())?;

        loop {
            let timeout = if self.parser.has_pending() {
                self.config.escape_timeout
            } else {
                self.config.idle_tick
            };

            let keys = match rx.recv_timeout(timeout) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("key input disconnected");
                    return Ok(());
                }
            };

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                frame.resize(new_size.cols, new_size.rows);
                self.renderer.force_redraw();
                app.on_resize(new_size);
                tracing::debug!(cols = new_size.cols, rows = new_size.rows, "resized");
                draw(app, &mut frame, &mut self.renderer, &mut io::stdout())?;
            }

            for key in keys {
                if app.on_key(key) == Action::Quit {
                    return Ok(());
                }
                draw(app, &mut frame, &mut self.renderer, &mut io::stdout())?;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
