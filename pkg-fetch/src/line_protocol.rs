//! The line protocol shared by the SSH and TCP transports:
//! `get <relpath> <ims_epoch>\n` ⟶ `ok: <size>\n` + `size` raw bytes, or `ko:\n`.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;

use crate::Error;
use crate::FetchItem;
use crate::FetchOutcome;

/// Sends a `get` request for `item` over `stream` and copies the reply body into `dest`.
///
/// `transport` names the caller (`"ssh"` or `"tcp"`) for error messages only.
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if the server's reply line doesn't parse, or
/// [`Error::Io`] for read/write failures on `stream`/`dest`.
pub fn fetch_over_line_protocol<S: Read + Write>(
    mut stream: S,
    item: &FetchItem,
    dest: &mut impl Write,
    transport: &'static str,
) -> Result<FetchOutcome, Error> {
    let request = format!("get {} {}\n", item.relpath, item.mtime.unwrap_or(0));
    stream.write_all(request.as_bytes()).map_err(|source| Error::io("writing line-protocol request", source))?;

    let mut reader = BufReader::new(stream);
    let mut reply = String::new();
    reader.read_line(&mut reply).map_err(|source| Error::io("reading line-protocol reply", source))?;
    let reply = reply.trim_end();

    if reply == "ko:" {
        return Ok(FetchOutcome::NotFound);
    }
    let Some(size_str) = reply.strip_prefix("ok: ") else {
        return Err(Error::MalformedReply { transport, line: reply.to_string() });
    };
    let size: u64 = size_str
        .trim()
        .parse()
        .map_err(|_| Error::MalformedReply { transport, line: reply.to_string() })?;

    if size == 0 {
        return Ok(FetchOutcome::UpToDate);
    }

    let mut body = reader.take(size);
    std::io::copy(&mut body, dest).map_err(|source| Error::io("reading line-protocol body", source))?;
    Ok(FetchOutcome::Ok)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    struct Loopback {
        read: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.read.read(buf)
        }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn parses_ok_reply_and_copies_body() {
        let loopback = Loopback { read: Cursor::new(b"ok: 5\nhello".to_vec()), written: Vec::new() };
        let mut dest = Vec::new();
        let outcome = fetch_over_line_protocol(loopback, &FetchItem::new("pkg.tzst"), &mut dest, "tcp").unwrap();
        assert_eq!(outcome, FetchOutcome::Ok);
        assert_eq!(dest, b"hello");
    }

    #[test]
    fn zero_size_means_up_to_date() {
        let loopback = Loopback { read: Cursor::new(b"ok: 0\n".to_vec()), written: Vec::new() };
        let mut dest = Vec::new();
        let outcome = fetch_over_line_protocol(loopback, &FetchItem::new("pkg.tzst"), &mut dest, "tcp").unwrap();
        assert_eq!(outcome, FetchOutcome::UpToDate);
    }

    #[test]
    fn ko_reply_is_not_found() {
        let loopback = Loopback { read: Cursor::new(b"ko:\n".to_vec()), written: Vec::new() };
        let mut dest = Vec::new();
        let outcome = fetch_over_line_protocol(loopback, &FetchItem::new("pkg.tzst"), &mut dest, "tcp").unwrap();
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let loopback = Loopback { read: Cursor::new(b"garbage\n".to_vec()), written: Vec::new() };
        let mut dest = Vec::new();
        let err = fetch_over_line_protocol(loopback, &FetchItem::new("pkg.tzst"), &mut dest, "ssh").unwrap_err();
        assert!(matches!(err, Error::MalformedReply { transport: "ssh", .. }));
    }
}
