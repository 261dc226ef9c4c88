use crate::{Error, Result};
use bytes::Bytes;
use std::fmt;
use std::io::{Cursor, Read};

/// One pkt-line: some payload bytes, or the `0000` flush packet.
#[derive(Debug, Clone, PartialEq)]
pub struct PktLine(Option<Vec<u8>>);

impl PktLine {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Some(bytes))
    }

    pub fn flush() -> Self {
        Self(None)
    }

    pub fn is_flush(&self) -> bool {
        self.0.is_none()
    }

    /// Framed length: payload plus the four length digits. Zero for flush.
    pub fn size(&self) -> usize {
        if let Some(bytes) = self.0.as_ref() {
            bytes.len() + 4
        } else {
            0
        }
    }

    pub fn payload(&self) -> &[u8] {
        self.0.as_deref().unwrap_or_default()
    }
}

impl From<&[u8]> for PktLine {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.into())
    }
}

impl fmt::Display for PktLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}{}",
            self.size(),
            String::from_utf8_lossy(self.payload())
        )
    }
}

/// Iterates the pkt-lines of a complete protocol document.
#[derive(Debug, Clone)]
pub struct PktLines {
    cursor: Cursor<Vec<u8>>,
}

impl From<Bytes> for PktLines {
    fn from(value: Bytes) -> Self {
        Self::new(value.to_vec())
    }
}

impl PktLines {
    pub fn new(buf: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len() - self.cursor.position() as usize
    }
}

impl Iterator for PktLines {
    type Item = Result<PktLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() < 4 {
            return None;
        }

        let mut buf = [0u8; 4];
        if let Err(err) = self.cursor.read_exact(&mut buf) {
            return Some(Err(err.into()));
        }

        let line_len = match line_size(&buf) {
            Ok(len) => len,
            Err(err) => return Some(Err(err)),
        };
        if line_len == 0 {
            return Some(Ok(PktLine::flush()));
        }
        if line_len < 4 {
            return Some(Err(Error::Protocol(format!(
                "pkt line length {line_len} is shorter than its own frame"
            ))));
        }

        let value_len = line_len - 4;
        if self.remaining() < value_len {
            return Some(Err(Error::Protocol("truncated pkt line".into())));
        }

        let mut buf = vec![0u8; value_len];
        if let Err(err) = self.cursor.read_exact(&mut buf) {
            return Some(Err(err.into()));
        }

        Some(Ok(PktLine::new(buf)))
    }
}

fn line_size(buf: &[u8; 4]) -> Result<usize> {
    std::str::from_utf8(buf)
        .ok()
        .and_then(|digits| usize::from_str_radix(digits, 16).ok())
        .ok_or_else(|| Error::Protocol(format!("bad pkt line length frame {buf:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_prints_to_pkt_line() {
        let line = PktLine::new(b"foobar\n".to_vec());
        assert_eq!(format!("{line}"), "000bfoobar\n");
    }

    #[test]
    fn it_creates_flush_line() {
        let line = PktLine::flush();
        assert_eq!(format!("{line}"), "0000");
        assert!(line.is_flush());
    }

    #[test]
    fn it_retrieves_pkt_lines() {
        let bytes = b"00ab3b1031798a00fdf9b574b5857b1721bc4b0e6bac HEAD\x00multi_ack thin-pack side-band side-band-64k ofs-delta shallow no-progress include-tag multi_ack_detailed agent=git/1.8.1\n003f3b1031798a00fdf9b574b5857b1721bc4b0e6bac refs/heads/master\n0048c4bf7555e2eb4a2b55c7404c742e7e95017ec850 refs/remotes/origin/master\n0000".to_vec();
        let mut lines = PktLines::new(bytes);

        let line = lines.next().unwrap().unwrap();
        assert!(line.payload().starts_with(b"3b1031798a00fdf9b574b5857b1721bc4b0e6bac HEAD\x00"));

        let line = lines.next().unwrap().unwrap();
        assert_eq!(
            line,
            PktLine::new(b"3b1031798a00fdf9b574b5857b1721bc4b0e6bac refs/heads/master\n".to_vec())
        );

        let line = lines.next().unwrap().unwrap();
        assert_eq!(
            line,
            PktLine::new(
                b"c4bf7555e2eb4a2b55c7404c742e7e95017ec850 refs/remotes/origin/master\n".to_vec()
            )
        );

        let line = lines.next().unwrap().unwrap();
        assert!(line.is_flush());

        assert!(lines.next().is_none());
    }

    #[test]
    fn it_rejects_bad_length_frames() {
        let mut lines = PktLines::new(b"zzzzwhatever".to_vec());
        assert!(lines.next().unwrap().is_err());

        let mut lines = PktLines::new(b"0003".to_vec());
        assert!(lines.next().unwrap().is_err());

        let mut lines = PktLines::new(b"00ffshort".to_vec());
        assert!(lines.next().unwrap().is_err());
    }
}
