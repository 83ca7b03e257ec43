//! Protocol pieces shared by the word game server and its line client.
//!
//! The wire format is plain text: every command and every server message is a
//! single line terminated by `\r\n`. [`LineBuffer`] reassembles those lines from
//! arbitrary TCP read boundaries.

mod line;

pub use line::{Feed, LineBuffer, LineError};

/// Two-byte sequence terminating every protocol line.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Names must be strictly shorter than this many bytes.
pub const MAX_NAME: usize = 30;
/// Capacity of a connection's input buffer, and the size of a single read.
pub const MAX_BUF: usize = 256;
/// Wrong guesses allowed per round unless configured otherwise.
pub const MAX_GUESSES: u32 = 4;

pub const DEFAULT_PORT: u16 = 58966;
/// Listen backlog for the server socket.
pub const MAX_QUEUE: u32 = 5;

/// Appends the line terminator to `text`.
pub fn frame(text: &str) -> String {
    let mut line = String::with_capacity(text.len() + LINE_TERMINATOR.len());
    line.push_str(text);
    line.push_str(LINE_TERMINATOR);
    line
}
