// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background key reader — moves raw tty bytes into a channel.
//
// The thread does no parsing and touches no editor state. It polls the
// input fd with a short timeout, checks a stop flag between polls, and
// sends whatever `read()` returned. The event loop blocks on the channel,
// so the editor itself stays single-threaded.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[cfg(unix)]
use std::os::unix::io::RawFd;

/// A keypress is a few bytes; a burst of typing or a terminal paste fits.
const READ_BUF_SIZE: usize = 4096;

/// Stop-flag check interval, and so the worst-case shutdown latency.
const POLL_TIMEOUT_MS: i32 = 50;

/// Background reader thread for the key input fd.
///
/// The thread exits on EOF, on a read error, when the receiver is dropped,
/// or when [`stop`](Self::stop) is called. Dropping the reader stops it.
pub struct TtyReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl TtyReader {
    /// Spawn a reader on `fd`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    #[cfg(unix)]
    pub fn spawn(fd: RawFd) -> io::Result<(Self, Receiver<Vec<u8>>)> {
        Self::spawn_with(move |tx, stop| read_fd(fd, &tx, &stop))
    }

    /// Spawn a reader on stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    #[cfg(not(unix))]
    pub fn spawn() -> io::Result<(Self, Receiver<Vec<u8>>)> {
        Self::spawn_with(|tx, stop| read_stdin(&tx, &stop))
    }

    fn spawn_with<F>(body: F) -> io::Result<(Self, Receiver<Vec<u8>>)>
    where
        F: FnOnce(Sender<Vec<u8>>, Arc<AtomicBool>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("tty-reader".into())
            .spawn(move || body(tx, stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the thread and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TtyReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn read_fd(fd: RawFd, tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n <= 0 {
            tracing::debug!(n, "key input closed");
            break;
        }

        #[allow(clippy::cast_sign_loss)] // n > 0
        let chunk = buf[..n as usize].to_vec();
        if tx.send(chunk).is_err() {
            break;
        }
    }
}

#[cfg(not(unix))]
fn read_stdin(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];
    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
