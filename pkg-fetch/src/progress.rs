//! Progress/cancellation plumbing for [`crate::fetch`]: streams the resource to
//! `dest_fd` with progress callbacks.

use std::io;
use std::io::Write;

/// Wraps a [`Write`] destination, invoking `on_progress` with the cumulative byte count after
/// each chunk. Returning `false` from the callback aborts the transfer with
/// [`io::ErrorKind::Interrupted`], which [`crate::fetch`] turns into
/// [`crate::FetchOutcome::Cancel`].
pub struct CancelableWriter<'a, W> {
    inner: W,
    written: u64,
    on_progress: &'a mut dyn FnMut(u64) -> bool,
}

impl<'a, W: Write> CancelableWriter<'a, W> {
    /// Wraps `inner`, calling `on_progress(total_bytes_written)` after each successful write.
    pub fn new(inner: W, on_progress: &'a mut dyn FnMut(u64) -> bool) -> Self {
        Self { inner, written: 0, on_progress }
    }
}

impl<W: Write> Write for CancelableWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        if !(self.on_progress)(self.written) {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "fetch cancelled by caller"));
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A no-op progress callback for callers that don't need cancellation or reporting.
pub fn no_progress() -> impl FnMut(u64) -> bool {
    |_| true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancels_when_callback_returns_false() {
        let mut dest = Vec::new();
        let mut calls = 0;
        let mut on_progress = |_: u64| {
            calls += 1;
            calls < 2
        };
        let mut writer = CancelableWriter::new(&mut dest, &mut on_progress);
        writer.write_all(b"a").unwrap();
        let err = writer.write_all(b"b").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }
}
