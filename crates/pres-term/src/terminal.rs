// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, alternate screen, color scope and RAII
// cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and
// the raw fd write in the panic hook are POSIX interfaces with no safe
// wrapper in std. Each unsafe block is one call.
#![allow(unsafe_code)]
//
// pres reads the document from stdin when no files are given, so keys
// cannot come from stdin. The terminal opens the controlling tty
// (`/dev/tty`) for key input and raw mode, and falls back to stdin when
// there is no controlling tty. Output always goes to stdout.
//
// Cleanup runs on drop and from a panic hook. The hook writes a
// pre-built restore sequence straight to fd 1 so a panic while the
// stdout lock is held cannot deadlock, then restores termios from a
// global backup and hands over to the original hook.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Once;

#[cfg(unix)]
use std::os::unix::io::{AsRawFd, RawFd};
#[cfg(unix)]
use std::sync::Mutex;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the size cannot be queried (pipes, tests).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the size of the terminal on stdout via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether `fd` refers to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

/// Whether stdin is a terminal. When it isn't, the document is read from it.
#[must_use]
pub fn stdin_is_tty() -> bool {
    #[cfg(unix)]
    {
        is_tty(libc::STDIN_FILENO)
    }
    #[cfg(not(unix))]
    {
        false
    }
}

// ─── Color Scope ────────────────────────────────────────────────────────────

/// Scoped terminal color state.
///
/// Acquiring saves the terminal's current SGR state and selects the default
/// colors; dropping restores the saved state and resets attributes. Every
/// exit path that drops the guard, including unwinding, leaves the user's
/// colors as they were.
///
/// # Examples
///
/// ```
/// use pres_term::terminal::ColorSession;
///
/// let mut out = Vec::new();
/// {
///     let _colors = ColorSession::acquire(&mut out).unwrap();
/// }
/// assert_eq!(out, b"\x1b[#{\x1b[39;49m\x1b[#}\x1b[0m");
/// ```
pub struct ColorSession<W: Write> {
    out: W,
}

impl<W: Write> ColorSession<W> {
    /// Save the current colors and select the terminal defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequences cannot be written.
    pub fn acquire(mut out: W) -> io::Result<Self> {
        ansi::push_colors(&mut out)?;
        ansi::default_colors(&mut out)?;
        out.flush()?;
        Ok(Self { out })
    }

    /// The writer the session was acquired on.
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for ColorSession<W> {
    fn drop(&mut self) {
        let _ = ansi::pop_colors(&mut self.out);
        let _ = ansi::reset(&mut self.out);
        let _ = self.out.flush();
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Original termios and the fd it belongs to, for the panic hook.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSANOW, original);
            }
        }
    }
}

/// End synchronized output, restore saved colors, reset SGR, show the
/// cursor, leave the alternate screen. Alternate screen exit is last so
/// the shell content reappears clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[#}\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// [`enter`](Self::enter) switches to raw mode on the key input fd, the
/// alternate screen, and a [`ColorSession`]. Dropping the handle leaves
/// all three, in reverse order.
///
/// ```no_run
/// use pres_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // ... render frames, handle keys ...
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// The controlling tty, when it could be opened.
    tty: Option<File>,

    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    colors: Option<ColorSession<io::Stdout>>,

    size: Size,
    active: bool,
}

impl Terminal {
    /// Open the controlling tty and query the size. Does not enter raw mode.
    ///
    /// # Errors
    ///
    /// Infallible today: a missing `/dev/tty` falls back to stdin.
    pub fn new() -> io::Result<Self> {
        let tty = File::options()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(|err| tracing::debug!(%err, "no controlling tty, reading keys from stdin"))
            .ok();

        Ok(Self {
            tty,
            #[cfg(unix)]
            original_termios: None,
            colors: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        })
    }

    /// The fd keys are read from.
    #[cfg(unix)]
    #[must_use]
    pub fn input_fd(&self) -> RawFd {
        self.tty
            .as_ref()
            .map_or(libc::STDIN_FILENO, AsRawFd::as_raw_fd)
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after SIGWINCH.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode, the alternate screen and the color scope.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or terminal output fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        {
            let mut lock = io::stdout().lock();
            ansi::enter_alt_screen(&mut lock)?;
            ansi::clear_screen(&mut lock)?;
            lock.flush()?;
        }
        self.colors = Some(ColorSession::acquire(io::stdout())?);

        self.active = true;
        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal entered");
        Ok(())
    }

    /// Leave the color scope, the alternate screen and raw mode.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let mut lock = io::stdout().lock();
        ansi::end_sync(&mut lock)?;
        drop(lock);
        self.colors = None;

        let mut lock = io::stdout().lock();
        ansi::cursor_show(&mut lock)?;
        ansi::exit_alt_screen(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        tracing::debug!("terminal left");
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let fd = self.input_fd();
        if !is_tty(fd) {
            return Ok(());
        }

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some((fd, termios));
            }

            // cfmakeraw equivalent. ISIG is cleared, so Ctrl+C arrives as a
            // key and quits through the normal path.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            let fd = self.input_fd();
            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_session_restores_on_drop() {
        let mut out = Vec::new();
        {
            let mut session = ColorSession::acquire(&mut out).unwrap();
            session.writer().write_all(b"x").unwrap();
        }
        assert_eq!(out, b"\x1b[#{\x1b[39;49mx\x1b[#}\x1b[0m");
    }

    #[test]
    fn color_session_restores_on_unwind() {
        let mut out = Vec::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _session = ColorSession::acquire(&mut out).unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(out.ends_with(b"\x1b[#}\x1b[0m"));
    }

    #[test]
    fn emergency_restore_exits_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
        assert!(s.contains("\x1b[#}"), "must pop saved colors");
        assert!(s.contains("\x1b[?25h"), "must show cursor");
    }

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn terminal_new_is_inactive() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn terminal_leave_without_enter() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_refresh_size_caches() {
        let mut term = Terminal::new().unwrap();
        let s = term.refresh_size();
        assert_eq!(s, term.size());
    }
}
