use shared::{MAX_BUF, MAX_GUESSES, MAX_NAME, MAX_QUEUE};

/// Tunables for a game server instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Wrong guesses allowed before a round is lost
    pub max_guesses: u32,
    /// Names of this many bytes or more are rejected
    pub max_name_len: usize,
    /// Bytes a client may send without a line terminator before it is dropped
    pub line_capacity: usize,
    /// Pending connection queue length for the listening socket
    pub backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_guesses: MAX_GUESSES,
            max_name_len: MAX_NAME,
            line_capacity: MAX_BUF,
            backlog: MAX_QUEUE,
        }
    }
}

impl ServerConfig {
    pub fn with_max_guesses(mut self, max_guesses: u32) -> Self {
        self.max_guesses = max_guesses.max(1);
        self
    }
}
