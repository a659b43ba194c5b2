//! Memory-mapping listing access
//!
//! Reads a `/proc/[pid]/maps` listing one line at a time without ever
//! buffering more than a fixed bound, and parses individual lines into
//! [`MappedRegion`]s for diagnostics.
//!
//! Lines longer than the bound cannot match and are not an error: the reader
//! consumes them to their end and reports them as [`MapsLine::Overlong`].

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read};
use std::path::PathBuf;

/// Listing of the calling process.
pub const SELF_MAPS_PATH: &str = "/proc/self/maps";

/// Longest line content (terminator excluded) that can still match.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Path of the mapping listing of `pid`.
pub fn maps_path_for_pid(pid: u32) -> PathBuf {
    PathBuf::from(format!("/proc/{}/maps", pid))
}

/// Information about a memory region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRegion {
    pub start: u64,
    pub end: u64,
    pub permissions: String,
    pub offset: u64,
    pub device: String,
    pub inode: u64,
    pub pathname: String,
}

impl MappedRegion {
    /// Parse a single line from /proc/[pid]/maps
    ///
    /// Pathnames may contain spaces (`/memfd:x (deleted)`), so everything
    /// after the inode field is kept as the pathname.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim();

        let range = next_field(&mut rest)?;
        let permissions = next_field(&mut rest)?;
        let offset = next_field(&mut rest)?;
        let device = next_field(&mut rest)?;
        let inode = next_field(&mut rest)?;

        let (start, end) = range.split_once('-')?;
        let start = u64::from_str_radix(start, 16).ok()?;
        let end = u64::from_str_radix(end, 16).ok()?;

        Some(Self {
            start,
            end,
            permissions: permissions.to_string(),
            offset: u64::from_str_radix(offset, 16).unwrap_or(0),
            device: device.to_string(),
            inode: inode.parse().unwrap_or(0),
            pathname: rest.to_string(),
        })
    }

    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// File-backed regions carry an absolute pathname.
    pub fn is_file_backed(&self) -> bool {
        self.pathname.starts_with('/')
    }
}

fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let line: &'a str = *rest;
    if line.is_empty() {
        return None;
    }
    let (field, tail) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    *rest = tail.trim_start();
    Some(field)
}

/// One line handed out by [`MapsReader`].
#[derive(Debug, PartialEq, Eq)]
pub enum MapsLine<'a> {
    /// Line content with its terminator stripped. `number` is 1-based.
    Entry { number: usize, bytes: &'a [u8] },
    /// Line longer than the reader's bound; its content was discarded.
    Overlong { number: usize },
}

/// Bounded line reader over a mapping listing.
pub struct MapsReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_line_len: usize,
    line_number: usize,
}

impl<R: BufRead> MapsReader<R> {
    pub fn new(inner: R, max_line_len: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(max_line_len.min(DEFAULT_MAX_LINE_LEN) + 2),
            max_line_len,
            line_number: 0,
        }
    }

    /// Read the next line, or `None` at end of listing.
    pub fn next_line(&mut self) -> io::Result<Option<MapsLine<'_>>> {
        self.buf.clear();

        // Room for the content bound plus a "\r\n" terminator
        let limit = self.max_line_len.saturating_add(2) as u64;
        let read = (&mut self.inner).take(limit).read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        let number = self.line_number;

        if self.buf.last() != Some(&b'\n') && read as u64 == limit {
            self.skip_rest_of_line()?;
            return Ok(Some(MapsLine::Overlong { number }));
        }

        let bytes = strip_terminator(&self.buf);
        if bytes.len() > self.max_line_len {
            return Ok(Some(MapsLine::Overlong { number }));
        }

        Ok(Some(MapsLine::Entry { number, bytes }))
    }

    /// Consume input up to and including the next newline.
    fn skip_rest_of_line(&mut self) -> io::Result<()> {
        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(());
            }

            match available.iter().position(|&b| b == b'\n') {
                Some(newline) => {
                    self.inner.consume(newline + 1);
                    return Ok(());
                }
                None => {
                    let len = available.len();
                    self.inner.consume(len);
                }
            }
        }
    }
}

/// Strip a single trailing "\n" or "\r\n".
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    match line {
        [rest @ .., b'\r', b'\n'] => rest,
        [rest @ .., b'\n'] => rest,
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn collect(input: &[u8], max_line_len: usize) -> Vec<Result<String, usize>> {
        let mut reader = MapsReader::new(Cursor::new(input.to_vec()), max_line_len);
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().unwrap() {
            lines.push(match line {
                MapsLine::Entry { bytes, .. } => Ok(String::from_utf8_lossy(bytes).into_owned()),
                MapsLine::Overlong { number } => Err(number),
            });
        }
        lines
    }

    #[test]
    fn test_parse_map_line() {
        let line = "7f1234560000-7f1234562000 r-xp 00000000 08:01 12345 /usr/lib/libfoo.so";
        let region = MappedRegion::parse(line).unwrap();

        assert_eq!(region.start, 0x7f1234560000);
        assert_eq!(region.end, 0x7f1234562000);
        assert_eq!(region.permissions, "r-xp");
        assert_eq!(region.device, "08:01");
        assert_eq!(region.inode, 12345);
        assert_eq!(region.pathname, "/usr/lib/libfoo.so");
        assert_eq!(region.size(), 0x2000);
        assert!(region.is_file_backed());
    }

    #[test]
    fn test_parse_anonymous_map() {
        let line = "7ffc12340000-7ffc12345000 rwxp 00000000 00:00 0";
        let region = MappedRegion::parse(line).unwrap();

        assert_eq!(region.permissions, "rwxp");
        assert!(region.pathname.is_empty());
        assert_eq!(region.inode, 0);
        assert!(!region.is_file_backed());
    }

    #[test]
    fn test_parse_padded_pathname_with_spaces() {
        let line = "7f0000000000-7f0000001000 r-xp 00000000 00:01 99                         /memfd:payload (deleted)";
        let region = MappedRegion::parse(line).unwrap();
        assert_eq!(region.pathname, "/memfd:payload (deleted)");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(MappedRegion::parse("").is_none());
        assert!(MappedRegion::parse("not a maps line").is_none());
        assert!(MappedRegion::parse("zz-10 r-xp 0 00:00 0").is_none());
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(b"abc\n"), b"abc");
        assert_eq!(strip_terminator(b"abc\r\n"), b"abc");
        assert_eq!(strip_terminator(b"abc"), b"abc");
        assert_eq!(strip_terminator(b"abc\n\n"), b"abc\n");
        assert_eq!(strip_terminator(b""), b"");
    }

    #[test]
    fn test_reader_lines_and_numbers() {
        let mut reader = MapsReader::new(Cursor::new(b"one\ntwo\r\nthree".to_vec()), 16);
        assert_eq!(
            reader.next_line().unwrap(),
            Some(MapsLine::Entry { number: 1, bytes: b"one" })
        );
        assert_eq!(
            reader.next_line().unwrap(),
            Some(MapsLine::Entry { number: 2, bytes: b"two" })
        );
        assert_eq!(
            reader.next_line().unwrap(),
            Some(MapsLine::Entry { number: 3, bytes: b"three" })
        );
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_reader_overlong_line_skipped() {
        let input = b"short\nthis line is far too long\nafter\n";
        assert_eq!(
            collect(input, 8),
            vec![Ok("short".to_string()), Err(2), Ok("after".to_string())]
        );
    }

    #[test]
    fn test_reader_bound_is_inclusive() {
        assert_eq!(collect(b"12345678\n", 8), vec![Ok("12345678".to_string())]);
        assert_eq!(collect(b"12345678\r\n", 8), vec![Ok("12345678".to_string())]);
        assert_eq!(collect(b"123456789\n", 8), vec![Err(1)]);
        assert_eq!(collect(b"1234567890", 8), vec![Err(1)]);
    }

    #[test]
    fn test_reader_overlong_across_small_buffer() {
        // Force the skip to span several fill_buf calls
        let mut input = vec![b'x'; 100];
        input.extend_from_slice(b"\nok\n");
        let mut reader = MapsReader::new(BufReader::with_capacity(4, Cursor::new(input)), 10);

        assert_eq!(reader.next_line().unwrap(), Some(MapsLine::Overlong { number: 1 }));
        assert_eq!(
            reader.next_line().unwrap(),
            Some(MapsLine::Entry { number: 2, bytes: b"ok" })
        );
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn test_reader_empty_input() {
        assert!(collect(b"", 8).is_empty());
    }

    #[test]
    fn test_maps_path_for_pid() {
        assert_eq!(maps_path_for_pid(42), PathBuf::from("/proc/42/maps"));
    }
}
