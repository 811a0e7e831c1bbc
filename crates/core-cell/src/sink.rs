//! The output-encoder capability: anything that can absorb raw terminal
//! bytes. Production code writes through a descriptor-backed sink; tests
//! write through [`VecSink`] and assert on the bytes it collected.

/// A byte sink for rendered output. Implementations decide how (and
/// whether) a write failure is surfaced; the rendering core itself never
/// treats a failed write as fatal, so `write` returning `Err` just means
/// the bytes didn't land anywhere.
pub trait Sink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// An in-memory sink that never fails. Used by tests to inspect exactly
/// what bytes a render call produced.
#[derive(Debug, Default)]
pub struct VecSink(pub Vec<u8>);

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("sink content is always text")
    }
}

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.0.extend_from_slice(bytes);
        Ok(())
    }
}
