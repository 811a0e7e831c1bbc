//! Redirects the process's stdout/stderr into pipes read by background
//! threads, so console output from elsewhere in the process can be shown
//! above the live render region instead of corrupting it.
//!
//! Grounded in straight libc fd-duplication (`dup`/`dup2`/`pipe`), the
//! standard Unix technique for intercepting a process's standard streams;
//! no example in the pack does this directly; this follows the shape
//! `libc`'s own documentation examples use.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

const READ_CHUNK: usize = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Which standard stream a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Stdout,
    Stderr,
}

/// One captured, newline-terminated line of console output.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub content: String,
    pub timestamp: SystemTime,
    pub source: Source,
}

fn make_pipe() -> Result<(RawFd, RawFd)> {
    let mut fds = [0i32; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error()).context("pipe() failed");
    }
    Ok((fds[0], fds[1]))
}

fn set_nonblocking(fd: RawFd) {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL, 0);
        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
    }
}

fn dup_fd(fd: RawFd) -> Result<RawFd> {
    let dup = unsafe { libc::dup(fd) };
    if dup < 0 {
        return Err(std::io::Error::last_os_error()).context("dup() failed");
    }
    Ok(dup)
}

fn dup2_fd(src: RawFd, dst: RawFd) -> Result<()> {
    let rc = unsafe { libc::dup2(src, dst) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error()).context("dup2() failed");
    }
    Ok(())
}

fn close_fd(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}

fn push_line(buffer: &Mutex<VecDeque<LogLine>>, max_len: usize, line: LogLine) {
    let mut buf = buffer.lock().expect("log buffer mutex poisoned");
    buf.push_back(line);
    while buf.len() > max_len {
        buf.pop_front();
    }
}

/// Reads one pipe's read end, splitting on newlines, until cancelled.
/// Flushes any trailing partial line (no closing newline) on cancellation.
fn reader_loop(read_fd: RawFd, source: Source, buffer: Arc<Mutex<VecDeque<LogLine>>>, max_len: usize, cancel: Arc<AtomicBool>) {
    set_nonblocking(read_fd);
    let mut rolling: Vec<u8> = Vec::new();
    loop {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let mut chunk = [0u8; READ_CHUNK];
        let n = unsafe { libc::read(read_fd, chunk.as_mut_ptr() as *mut libc::c_void, chunk.len()) };
        if n > 0 {
            rolling.extend_from_slice(&chunk[..n as usize]);
            while let Some(pos) = rolling.iter().position(|&b| b == b'\n') {
                let mut raw: Vec<u8> = rolling.drain(..=pos).collect();
                raw.pop(); // drop the newline itself
                let content = String::from_utf8_lossy(&raw).into_owned();
                if !content.is_empty() {
                    push_line(&buffer, max_len, LogLine { content, timestamp: SystemTime::now(), source });
                }
            }
        } else {
            std::thread::sleep(POLL_INTERVAL);
        }
    }
    if !rolling.is_empty() {
        let content = String::from_utf8_lossy(&rolling).into_owned();
        if !content.is_empty() {
            push_line(&buffer, max_len, LogLine { content, timestamp: SystemTime::now(), source });
        }
    }
}

struct ActiveSession {
    saved_stdout: RawFd,
    saved_stderr: RawFd,
    stdout_read: RawFd,
    stderr_read: RawFd,
    cancel: Arc<AtomicBool>,
    stdout_thread: std::thread::JoinHandle<()>,
    stderr_thread: std::thread::JoinHandle<()>,
    prev_sigpipe: libc::sighandler_t,
}

/// Redirects stdout/stderr into a bounded, shared log buffer while active.
/// Only one capture may be active on a given instance at a time;
/// `start_capture` is a no-op if already active.
pub struct ConsoleCapture {
    buffer: Arc<Mutex<VecDeque<LogLine>>>,
    max_buffer_size: usize,
    session: Mutex<Option<ActiveSession>>,
}

impl ConsoleCapture {
    pub fn new(max_buffer_size: usize) -> Self {
        Self { buffer: Arc::new(Mutex::new(VecDeque::new())), max_buffer_size, session: Mutex::new(None) }
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().expect("capture session mutex poisoned").is_some()
    }

    /// Begin redirecting stdout/stderr. No-op if already active.
    pub fn start_capture(&self) -> Result<()> {
        let mut session = self.session.lock().expect("capture session mutex poisoned");
        if session.is_some() {
            return Ok(());
        }

        let saved_stdout = dup_fd(libc::STDOUT_FILENO)?;
        let saved_stderr = dup_fd(libc::STDERR_FILENO)?;

        let (stdout_read, stdout_write) = make_pipe()?;
        let (stderr_read, stderr_write) = make_pipe()?;

        dup2_fd(stdout_write, libc::STDOUT_FILENO)?;
        dup2_fd(stderr_write, libc::STDERR_FILENO)?;
        close_fd(stdout_write);
        close_fd(stderr_write);

        let prev_sigpipe = unsafe { libc::signal(libc::SIGPIPE, libc::SIG_IGN) };

        let cancel = Arc::new(AtomicBool::new(false));
        let stdout_thread = {
            let buffer = Arc::clone(&self.buffer);
            let cancel = Arc::clone(&cancel);
            let max_len = self.max_buffer_size;
            std::thread::spawn(move || reader_loop(stdout_read, Source::Stdout, buffer, max_len, cancel))
        };
        let stderr_thread = {
            let buffer = Arc::clone(&self.buffer);
            let cancel = Arc::clone(&cancel);
            let max_len = self.max_buffer_size;
            std::thread::spawn(move || reader_loop(stderr_read, Source::Stderr, buffer, max_len, cancel))
        };

        *session = Some(ActiveSession {
            saved_stdout,
            saved_stderr,
            stdout_read,
            stderr_read,
            cancel,
            stdout_thread,
            stderr_thread,
            prev_sigpipe,
        });
        tracing::debug!("console capture started");
        Ok(())
    }

    /// Stop redirecting and restore the original descriptors. No-op if not
    /// active.
    pub fn stop_capture(&self) -> Result<()> {
        let mut session = self.session.lock().expect("capture session mutex poisoned");
        let Some(session) = session.take() else {
            return Ok(());
        };

        session.cancel.store(true, Ordering::Relaxed);
        let _ = session.stdout_thread.join();
        let _ = session.stderr_thread.join();

        dup2_fd(session.saved_stdout, libc::STDOUT_FILENO)?;
        dup2_fd(session.saved_stderr, libc::STDERR_FILENO)?;
        close_fd(session.saved_stdout);
        close_fd(session.saved_stderr);
        close_fd(session.stdout_read);
        close_fd(session.stderr_read);

        unsafe {
            libc::signal(libc::SIGPIPE, session.prev_sigpipe);
        }
        tracing::debug!("console capture stopped");
        Ok(())
    }

    /// A snapshot copy of the currently buffered lines, oldest first.
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.buffer.lock().expect("log buffer mutex poisoned").iter().cloned().collect()
    }

    pub fn clear_buffer(&self) {
        self.buffer.lock().expect("log buffer mutex poisoned").clear();
    }
}

impl Drop for ConsoleCapture {
    fn drop(&mut self) {
        let _ = self.stop_capture();
    }
}
