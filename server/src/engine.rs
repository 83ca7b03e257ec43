//! Game protocol handlers
//!
//! [`Engine`] owns the client registry, the current round and the word
//! source. It never touches sockets: every entry point takes what arrived
//! from a connection and returns the messages to write, leaving delivery to
//! the network layer. This keeps the whole game playable from unit tests.

use crate::client_manager::{ClientId, ClientManager};
use crate::config::ServerConfig;
use crate::dictionary::WordSource;
use crate::game::{parse_guess, GameState, GuessOutcome};
use crate::messages;
use log::{debug, info, warn};
use shared::Feed;
use std::net::SocketAddr;

/// A message addressed to one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub client_id: ClientId,
    pub text: String,
}

impl Outgoing {
    pub fn new(client_id: ClientId, text: String) -> Self {
        Self { client_id, text }
    }
}

/// Outcome of feeding one read into the engine
#[derive(Debug, Default)]
pub struct Received {
    /// Messages produced by the lines that completed
    pub outgoing: Vec<Outgoing>,
    /// The client was removed and its connection must be closed
    pub closed: bool,
}

/// Why a candidate name was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong,
    Taken,
}

impl NameError {
    pub fn message(self) -> String {
        match self {
            NameError::Empty => messages::name_empty(),
            NameError::TooLong => messages::name_too_long(),
            NameError::Taken => messages::name_taken(),
        }
    }
}

/// Checks a candidate name, reporting the first rule it breaks
///
/// Rules apply in order: non-empty, shorter than `max_len` bytes, not used by
/// an active client. Pending clients are not considered.
pub fn validate_name(
    name: &str,
    max_len: usize,
    clients: &ClientManager,
) -> Result<(), NameError> {
    if name.is_empty() {
        Err(NameError::Empty)
    } else if name.len() >= max_len {
        Err(NameError::TooLong)
    } else if clients.name_taken(name) {
        Err(NameError::Taken)
    } else {
        Ok(())
    }
}

pub struct Engine {
    config: ServerConfig,
    clients: ClientManager,
    game: GameState,
    words: Box<dyn WordSource>,
}

impl Engine {
    /// Creates the engine and draws the word for the first round
    pub fn new(config: ServerConfig, mut words: Box<dyn WordSource>) -> Self {
        let game = GameState::new(words.next_word(), config.max_guesses);
        let clients = ClientManager::new(config.line_capacity);

        Self {
            config,
            clients,
            game,
            words,
        }
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registers a new connection as a pending client and greets it
    pub fn connect(&mut self, id: ClientId, addr: SocketAddr) -> Vec<Outgoing> {
        if !self.clients.admit(id, addr) {
            warn!("Client id {} is already registered", id);
            return Vec::new();
        }
        vec![Outgoing::new(id, messages::welcome())]
    }

    /// Feeds the bytes of one read from `id` and handles every line that completes
    ///
    /// An empty read means end-of-file and removes the client, as does a
    /// client that overflows its line buffer.
    pub fn receive(&mut self, id: ClientId, bytes: &[u8]) -> Received {
        let Some(client) = self.clients.get_mut(id) else {
            warn!("Received data for unknown client {}", id);
            return Received::default();
        };

        let mut received = Received::default();
        let mut next = client.buffer.feed(bytes).map(|feed| match feed {
            Feed::CompleteLine(line) => Some(line),
            Feed::NoCompleteLine => None,
            Feed::ConnectionClosed => {
                received.closed = true;
                None
            }
        });

        loop {
            match next {
                Ok(Some(line)) => self.dispatch(id, line, &mut received.outgoing),
                Ok(None) => break,
                Err(e) => {
                    warn!("Dropping client {}: {}", id, e);
                    received.closed = true;
                    break;
                }
            }

            // Further lines from the same read are handled right away
            next = match self.clients.get_mut(id) {
                Some(client) => client.buffer.next_line(),
                None => Ok(None),
            };
        }

        if received.closed {
            received.outgoing.extend(self.disconnect(id));
        }
        received
    }

    /// Removes a client and tells the remaining players
    ///
    /// Only the departure of the turn holder triggers a fresh turn
    /// announcement; other departures just broadcast the farewell.
    pub fn disconnect(&mut self, id: ClientId) -> Vec<Outgoing> {
        let had_turn = self.clients.has_turn(id);
        let Some(client) = self.clients.remove(id) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if let Some(name) = client.name() {
            info!("{} left the game", name);
            self.broadcast(&mut out, &messages::goodbye(name));
            if had_turn {
                self.announce_turn(&mut out);
            }
        }
        out
    }

    fn dispatch(&mut self, id: ClientId, line: String, out: &mut Vec<Outgoing>) {
        let Some(client) = self.clients.get(id) else {
            return;
        };

        if client.is_active() {
            self.handle_guess(id, &line, out);
        } else {
            self.handle_name(id, line, out);
        }
    }

    fn handle_name(&mut self, id: ClientId, name: String, out: &mut Vec<Outgoing>) {
        if let Err(e) = validate_name(&name, self.config.max_name_len, &self.clients) {
            debug!("Client {} picked an invalid name: {:?}", id, e);
            out.push(Outgoing::new(id, e.message()));
            return;
        }

        if !self.clients.promote(id, name.clone()) {
            return;
        }

        info!("{} has just joined", name);
        self.broadcast(out, &messages::joined(&name));
        out.push(Outgoing::new(id, self.game.status_message()));
        self.announce_turn(out);
    }

    fn handle_guess(&mut self, id: ClientId, line: &str, out: &mut Vec<Outgoing>) {
        let name = self.name_of(id);

        if !self.clients.has_turn(id) {
            info!("{} tried to guess out of turn", name);
            out.push(Outgoing::new(id, messages::not_your_turn()));
            return;
        }

        let Some(letter) = parse_guess(line) else {
            out.push(Outgoing::new(id, messages::invalid_guess()));
            return;
        };

        let outcome = self.game.guess(letter);
        if outcome == GuessOutcome::AlreadyGuessed {
            out.push(Outgoing::new(id, messages::already_guessed()));
            return;
        }

        info!("{} guesses {}: {:?}", name, letter, outcome);
        self.broadcast(out, &messages::guessed(&name, letter));
        if matches!(outcome, GuessOutcome::Miss | GuessOutcome::Lost) {
            out.push(Outgoing::new(id, messages::not_in_word(letter)));
        }
        self.broadcast(out, &self.game.status_message());

        match outcome {
            GuessOutcome::Hit => self.announce_turn(out),
            GuessOutcome::Miss => {
                self.clients.advance_turn();
                self.announce_turn(out);
            }
            GuessOutcome::Won => {
                info!("Game over! {} won!", name);
                self.announce_winner(id, &name, out);
                self.finish_round(out);
            }
            GuessOutcome::Lost => {
                info!("Game over! Nobody guessed {}", self.game.word());
                self.broadcast(out, &messages::out_of_guesses());
                self.finish_round(out);
            }
            GuessOutcome::AlreadyGuessed => {}
        }
    }

    /// Reveals the word, starts a new round and passes the turn on
    fn finish_round(&mut self, out: &mut Vec<Outgoing>) {
        self.broadcast(out, &messages::word_was(self.game.word()));

        let word = self.words.next_word();
        self.game.restart(word);
        info!("New game");

        self.broadcast(out, &messages::new_round());
        self.broadcast(out, &self.game.status_message());
        self.clients.advance_turn();
        self.announce_turn(out);
    }

    fn announce_winner(&self, winner: ClientId, name: &str, out: &mut Vec<Outgoing>) {
        for &id in self.clients.active_ids() {
            let text = if id == winner {
                messages::you_won()
            } else {
                messages::winner_is(name)
            };
            out.push(Outgoing::new(id, text));
        }
    }

    /// Prompts the turn holder and tells everyone else who is up
    fn announce_turn(&self, out: &mut Vec<Outgoing>) {
        let (Some(holder), Some(name)) = (self.clients.turn(), self.clients.turn_name()) else {
            return;
        };

        let others = messages::turn_of(name);
        for &id in self.clients.active_ids() {
            let text = if id == holder {
                messages::your_turn()
            } else {
                others.clone()
            };
            out.push(Outgoing::new(id, text));
        }
        debug!("It's {}'s turn", name);
    }

    fn broadcast(&self, out: &mut Vec<Outgoing>, text: &str) {
        out.extend(
            self.clients
                .active_ids()
                .iter()
                .map(|&id| Outgoing::new(id, text.to_string())),
        );
    }

    fn name_of(&self, id: ClientId) -> String {
        self.clients
            .get(id)
            .and_then(|client| client.name())
            .unwrap_or_default()
            .to_string()
    }
}
