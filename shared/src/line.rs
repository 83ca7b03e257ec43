//! Line reassembly for the `\r\n` framed text protocol
//!
//! TCP delivers bytes, not commands: a single command may arrive split over
//! several reads, and one read may carry several commands. `LineBuffer` keeps
//! whatever has not been terminated yet and hands out complete lines one at a
//! time.

use crate::LINE_TERMINATOR;
use thiserror::Error;

/// Result of feeding one read's worth of bytes into a [`LineBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Bytes were buffered but no terminator has been seen yet
    NoCompleteLine,
    /// The read returned zero bytes: the peer closed the connection
    ConnectionClosed,
    /// A full line, without its terminator
    CompleteLine(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("no line terminator within {capacity} buffered bytes")]
    CapacityExceeded { capacity: usize },
}

/// Per-connection input buffer with an explicit capacity
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buf: Vec<u8>,
    capacity: usize,
    /// Bytes already searched for a terminator
    scanned: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            scanned: 0,
        }
    }

    /// Appends the bytes of one read and extracts the first complete line
    ///
    /// An empty slice means the read hit end-of-file. Lines beyond the first
    /// stay buffered and are retrieved with [`LineBuffer::next_line`].
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Feed, LineError> {
        if bytes.is_empty() {
            return Ok(Feed::ConnectionClosed);
        }

        self.buf.extend_from_slice(bytes);

        Ok(match self.next_line()? {
            Some(line) => Feed::CompleteLine(line),
            None => Feed::NoCompleteLine,
        })
    }

    /// Extracts the next complete line already sitting in the buffer
    ///
    /// Returns an error once more than `capacity` bytes are pending without a
    /// terminator, since no line could ever complete.
    pub fn next_line(&mut self) -> Result<Option<String>, LineError> {
        let terminator = LINE_TERMINATOR.as_bytes();
        // The terminator may straddle the previous scan boundary
        let start = self.scanned.saturating_sub(terminator.len() - 1);

        let found = self.buf[start..]
            .windows(terminator.len())
            .position(|window| window == terminator);

        match found {
            Some(offset) => {
                let end = start + offset;
                let line = String::from_utf8_lossy(&self.buf[..end]).into_owned();
                self.buf.drain(..end + terminator.len());
                self.scanned = 0;
                Ok(Some(line))
            }
            None => {
                self.scanned = self.buf.len();
                if self.buf.len() > self.capacity {
                    Err(LineError::CapacityExceeded {
                        capacity: self.capacity,
                    })
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Number of buffered bytes not yet returned as part of a line
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_lines(buffer: &mut LineBuffer, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        if let Feed::CompleteLine(line) = buffer.feed(bytes).unwrap() {
            lines.push(line);
            while let Some(line) = buffer.next_line().unwrap() {
                lines.push(line);
            }
        }
        lines
    }

    #[test]
    fn test_whole_line() {
        let mut buffer = LineBuffer::new(64);
        assert_eq!(
            buffer.feed(b"alice\r\n").unwrap(),
            Feed::CompleteLine("alice".to_string())
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_byte_at_a_time_matches_whole_line() {
        let mut buffer = LineBuffer::new(64);
        let input = b"hello there\r\n";
        let mut completed = Vec::new();

        for byte in input.iter() {
            match buffer.feed(std::slice::from_ref(byte)).unwrap() {
                Feed::CompleteLine(line) => completed.push(line),
                Feed::NoCompleteLine => {}
                Feed::ConnectionClosed => panic!("non-empty read reported as closed"),
            }
        }

        assert_eq!(completed, vec!["hello there".to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_terminator_split_across_reads() {
        let mut buffer = LineBuffer::new(64);
        assert_eq!(buffer.feed(b"abc\r").unwrap(), Feed::NoCompleteLine);
        assert_eq!(
            buffer.feed(b"\n").unwrap(),
            Feed::CompleteLine("abc".to_string())
        );
    }

    #[test]
    fn test_empty_read_is_closed() {
        let mut buffer = LineBuffer::new(64);
        buffer.feed(b"partial").unwrap();
        assert_eq!(buffer.feed(b"").unwrap(), Feed::ConnectionClosed);
    }

    #[test]
    fn test_empty_line() {
        let mut buffer = LineBuffer::new(64);
        assert_eq!(
            buffer.feed(b"\r\n").unwrap(),
            Feed::CompleteLine(String::new())
        );
    }

    #[test]
    fn test_bare_newline_is_not_a_terminator() {
        let mut buffer = LineBuffer::new(64);
        assert_eq!(buffer.feed(b"a\nb").unwrap(), Feed::NoCompleteLine);
        assert_eq!(
            buffer.feed(b"\r\n").unwrap(),
            Feed::CompleteLine("a\nb".to_string())
        );
    }

    #[test]
    fn test_two_lines_in_one_read() {
        let mut buffer = LineBuffer::new(64);
        let lines = collect_lines(&mut buffer, b"a\r\nb\r\npartial");
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(buffer.len(), "partial".len());

        assert_eq!(
            buffer.feed(b"\r\n").unwrap(),
            Feed::CompleteLine("partial".to_string())
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut buffer = LineBuffer::new(8);
        assert_eq!(buffer.feed(b"12345678").unwrap(), Feed::NoCompleteLine);
        assert_eq!(
            buffer.feed(b"9").unwrap_err(),
            LineError::CapacityExceeded { capacity: 8 }
        );
    }

    #[test]
    fn test_long_line_completing_in_same_read_is_accepted() {
        let mut buffer = LineBuffer::new(4);
        assert_eq!(
            buffer.feed(b"abcdef\r\n").unwrap(),
            Feed::CompleteLine("abcdef".to_string())
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buffer = LineBuffer::new(16);
        match buffer.feed(&[0xff, b'a', b'\r', b'\n']).unwrap() {
            Feed::CompleteLine(line) => assert_eq!(line, "\u{fffd}a"),
            other => panic!("unexpected feed result {:?}", other),
        }
    }
}
