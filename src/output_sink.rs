//! Match output sinks.
//!
//! Workers format winner names into a per-worker batch of whole lines and
//! call `write_all(bytes)`; the sink takes its lock only around the actual
//! write, never while formatting. Batches from different workers serialize
//! at the byte level, so lines never interleave, but batch order across
//! workers is nondeterministic; the scan makes no ordering promise.
//!
//! `flush()` is called once, after every worker has joined. Sinks panic on
//! I/O errors (fail-fast; a half-written result set is useless), except
//! `BrokenPipe` on stdout, which is the normal end of `poolscan | head`.

use std::io::{self, BufWriter, ErrorKind, Write};
use std::sync::Mutex;

/// Buffer size for the stdout sink. Winners are sparse; 64 KiB keeps the
/// syscall count low without competing with the scan for cache.
const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

/// Shared sink for matching names.
///
/// Implementations must be `Send + Sync`; every worker thread writes to the
/// same instance.
pub trait OutputSink: Send + Sync {
    /// Write a batch of whole lines.
    fn write_all(&self, bytes: &[u8]);

    /// Flush buffered output. Call after workers have quiesced.
    fn flush(&self);
}

/// Stdout with internal buffering and a mutex around the write.
pub struct StdoutSink {
    out: Mutex<BufWriter<io::Stdout>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUF_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(cap, io::stdout())),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn write_all(&self, bytes: &[u8]) {
        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.write_all(bytes) {
            if e.kind() == ErrorKind::BrokenPipe {
                return;
            }
            panic!("stdout write failed: {}", e);
        }
    }

    fn flush(&self) {
        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.flush() {
            if e.kind() == ErrorKind::BrokenPipe {
                return;
            }
            panic!("stdout flush failed: {}", e);
        }
    }
}

/// Test sink: captures all bytes in memory; `take()` extracts them.
pub struct VecSink {
    buf: Mutex<Vec<u8>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self {
            buf: Mutex::new(Vec::new()),
        }
    }

    /// Extract captured bytes, leaving the buffer empty. Deterministic only
    /// after the scan has returned.
    pub fn take(&self) -> Vec<u8> {
        let mut guard = self.buf.lock().expect("vec sink mutex poisoned");
        std::mem::take(&mut *guard)
    }

    pub fn len(&self) -> usize {
        self.buf.lock().expect("vec sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for VecSink {
    fn write_all(&self, bytes: &[u8]) {
        self.buf
            .lock()
            .expect("vec sink mutex poisoned")
            .extend_from_slice(bytes);
    }

    fn flush(&self) {}
}

/// Discards everything; for benchmarking the scan without output cost.
pub struct NullSink;

impl NullSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for NullSink {
    fn write_all(&self, _bytes: &[u8]) {}

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn vec_sink_captures_and_clears() {
        let sink = VecSink::new();
        sink.write_all(b"alice\n");
        sink.write_all(b"bob\n");
        assert_eq!(sink.take(), b"alice\nbob\n");
        assert!(sink.is_empty());
    }

    #[test]
    fn concurrent_line_batches_never_interleave() {
        let sink = Arc::new(VecSink::new());
        let threads = 8;
        let writes = 500;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    let line = format!("worker-{t}\n");
                    for _ in 0..writes {
                        sink.write_all(line.as_bytes());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        sink.flush();
        let output = sink.take();
        let lines: Vec<&[u8]> = output
            .split(|&b| b == b'\n')
            .filter(|l| !l.is_empty())
            .collect();
        assert_eq!(lines.len(), threads * writes);
        for line in lines {
            let text = std::str::from_utf8(line).unwrap();
            assert!(text.starts_with("worker-"), "mangled line: {:?}", text);
        }
    }

    #[test]
    fn null_sink_discards() {
        let sink = NullSink::new();
        sink.write_all(b"gone");
        sink.flush();
    }

    #[test]
    fn stdout_sink_smoke() {
        let sink = StdoutSink::new();
        sink.write_all(b"");
        sink.flush();
    }
}
