//! A `Read` adapter that aborts a stalled transfer, standing in for libcurl's low-speed-limit
//! option ("throttle-kill via low-speed timeout").

use std::io;
use std::io::Read;
use std::time::Duration;
use std::time::Instant;

/// Wraps a reader, failing with [`io::ErrorKind::TimedOut`] once throughput has stayed below
/// `floor_bytes_per_sec` for `window`.
pub struct ThrottledReader<R> {
    inner: R,
    floor_bytes_per_sec: u64,
    window: Duration,
    since_last_progress: Instant,
    bytes_since_last_check: u64,
}

impl<R: Read> ThrottledReader<R> {
    /// Wraps `inner`, killing the transfer if it falls below `floor_bytes_per_sec` for a whole
    /// `window`.
    pub fn new(inner: R, floor_bytes_per_sec: u64, window: Duration) -> Self {
        Self {
            inner,
            floor_bytes_per_sec,
            window,
            since_last_progress: Instant::now(),
            bytes_since_last_check: 0,
        }
    }
}

impl<R: Read> Read for ThrottledReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.bytes_since_last_check += read as u64;

        let elapsed = self.since_last_progress.elapsed();
        if elapsed >= self.window {
            let rate = self.bytes_since_last_check / elapsed.as_secs().max(1);
            if rate < self.floor_bytes_per_sec {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("throughput {rate} B/s fell below the {} B/s floor", self.floor_bytes_per_sec),
                ));
            }
            self.since_last_progress = Instant::now();
            self.bytes_since_last_check = 0;
        }
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn passes_through_fast_reads() {
        let mut reader = ThrottledReader::new(Cursor::new(vec![1u8; 16]), 1, Duration::from_secs(3600));
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 16);
    }
}
