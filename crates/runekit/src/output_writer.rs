//! Single-writer, buffered terminal output. Everything that leaves the
//! process through the terminal descriptor goes through one
//! `OutputWriter`, shared (behind a lock) by the reconciler's render path
//! and `AlternateScreenBuffer`'s direct sequence writes.

use core_cell::Sink;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Buffers writes up to `capacity` bytes before flushing to `inner`.
pub struct OutputWriter<W: Write> {
    pub(crate) inner: W,
    buffer: Vec<u8>,
    capacity: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W, capacity: usize) -> Self {
        Self { inner, buffer: Vec::with_capacity(capacity), capacity }
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Write `seq` as a single unsplit write: flush whatever's buffered,
    /// then write `seq` directly rather than through the buffer, so it
    /// can never straddle a buffer boundary.
    pub fn write_atomic(&mut self, seq: &[u8]) -> io::Result<()> {
        self.flush_buffer()?;
        self.inner.write_all(seq)
    }
}

impl<W: Write> Sink for OutputWriter<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.buffer.len() + bytes.len() > self.capacity {
            self.flush_buffer()?;
        }
        if bytes.len() >= self.capacity {
            self.inner.write_all(bytes)
        } else {
            self.buffer.extend_from_slice(bytes);
            Ok(())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        self.inner.flush()
    }
}

/// A cloneable handle to a shared `OutputWriter`, so `FrameBuffer` can
/// hand one copy to the reconciler (as its `Sink`) while keeping another
/// for `AlternateScreenBuffer`'s direct atomic writes — both serialize
/// through the same underlying writer.
pub struct SharedWriter<W: Write> {
    pub(crate) inner: Arc<Mutex<OutputWriter<W>>>,
}

impl<W: Write> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<W: Write> SharedWriter<W> {
    pub fn new(inner: W, capacity: usize) -> Self {
        Self { inner: Arc::new(Mutex::new(OutputWriter::new(inner, capacity))) }
    }

    pub fn write_atomic(&self, seq: &[u8]) -> io::Result<()> {
        self.inner.lock().expect("output writer mutex poisoned").write_atomic(seq)
    }

    pub fn flush(&self) -> io::Result<()> {
        Sink::flush(&mut *self.inner.lock().expect("output writer mutex poisoned"))
    }
}

impl<W: Write> Sink for SharedWriter<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.lock().expect("output writer mutex poisoned").write(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        SharedWriter::flush(self)
    }
}
