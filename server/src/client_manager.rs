//! Session bookkeeping for connected players
//!
//! This module tracks every connection the game knows about:
//! - Pending clients that connected but have not picked a name yet
//! - Active clients that are named and take part in the turn rotation
//! - The turn reference, which always points at an active client or nowhere
//!
//! Clients live in a map keyed by connection id. The active rotation is an
//! ordered list of ids, so advancing the turn is an index successor with
//! wraparound and removal never leaves a stale reference behind.

use log::{debug, info};
use shared::LineBuffer;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Identifier of one live connection, unique for the process lifetime
pub type ClientId = u32;

/// Where a client is in the protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, waiting for a name
    Pending,
    /// Named and part of the game
    Active { name: String },
}

/// One connected client
#[derive(Debug)]
pub struct Client {
    /// Connection id assigned on accept
    pub id: ClientId,
    /// Peer address, for logging
    pub addr: SocketAddr,
    pub state: SessionState,
    /// Bytes received but not yet terminated
    pub buffer: LineBuffer,
}

impl Client {
    pub fn new(id: ClientId, addr: SocketAddr, line_capacity: usize) -> Self {
        Self {
            id,
            addr,
            state: SessionState::Pending,
            buffer: LineBuffer::new(line_capacity),
        }
    }

    /// The display name, once the client has one
    pub fn name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Pending => None,
            SessionState::Active { name } => Some(name),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }
}

/// Registry of pending and active clients plus the turn rotation
pub struct ClientManager {
    clients: HashMap<ClientId, Client>,
    /// Unnamed clients in arrival order
    pending: Vec<ClientId>,
    /// Turn rotation; the newest player sits at the front
    active: Vec<ClientId>,
    /// Active client whose guess is accepted next
    turn: Option<ClientId>,
    line_capacity: usize,
}

impl ClientManager {
    pub fn new(line_capacity: usize) -> Self {
        Self {
            clients: HashMap::new(),
            pending: Vec::new(),
            active: Vec::new(),
            turn: None,
            line_capacity,
        }
    }

    /// Registers a freshly accepted connection as a pending client
    ///
    /// Returns false if the id is already in use.
    pub fn admit(&mut self, id: ClientId, addr: SocketAddr) -> bool {
        if self.clients.contains_key(&id) {
            return false;
        }

        info!("Adding client {} from {}", id, addr);
        self.clients
            .insert(id, Client::new(id, addr, self.line_capacity));
        self.pending.push(id);
        true
    }

    /// Names a pending client and moves it into the turn rotation
    ///
    /// The client is placed at the front of the rotation. If it is the only
    /// active client it also receives the turn. Returns false if `id` is not a
    /// pending client.
    pub fn promote(&mut self, id: ClientId, name: String) -> bool {
        let Some(position) = self.pending.iter().position(|&p| p == id) else {
            return false;
        };
        let Some(client) = self.clients.get_mut(&id) else {
            return false;
        };

        self.pending.remove(position);
        info!("Client {} is now known as {}", id, name);
        client.state = SessionState::Active { name };
        self.active.insert(0, id);

        if self.turn.is_none() {
            self.turn = Some(id);
        }
        true
    }

    /// Removes a client from whichever list holds it
    ///
    /// If the client held the turn, the turn first moves to its successor in
    /// the rotation (or to nobody if it was the last active client).
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        let client = self.clients.remove(&id)?;

        if let Some(position) = self.active.iter().position(|&a| a == id) {
            if self.turn == Some(id) {
                self.advance_turn();
                if self.turn == Some(id) {
                    self.turn = None;
                }
            }
            self.active.remove(position);
        } else {
            self.pending.retain(|&p| p != id);
        }

        info!("Removing client {} {}", id, client.addr);
        Some(client)
    }

    /// Moves the turn to the structural successor of the current holder
    pub fn advance_turn(&mut self) -> Option<ClientId> {
        let current = self.turn?;
        let position = self.active.iter().position(|&a| a == current)?;
        let next = self.active[(position + 1) % self.active.len()];
        self.turn = Some(next);
        debug!("Turn passes from {} to {}", current, next);
        self.turn
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// True if an active client already uses exactly this name
    pub fn name_taken(&self, name: &str) -> bool {
        self.active_clients().any(|client| client.name() == Some(name))
    }

    pub fn turn(&self) -> Option<ClientId> {
        self.turn
    }

    pub fn has_turn(&self, id: ClientId) -> bool {
        self.turn == Some(id)
    }

    /// Display name of the turn holder
    pub fn turn_name(&self) -> Option<&str> {
        self.turn
            .and_then(|id| self.clients.get(&id))
            .and_then(Client::name)
    }

    /// Active client ids in rotation order
    pub fn active_ids(&self) -> &[ClientId] {
        &self.active
    }

    /// Active clients in rotation order
    pub fn active_clients(&self) -> impl Iterator<Item = &Client> {
        self.active.iter().filter_map(|id| self.clients.get(id))
    }

    pub fn pending_ids(&self) -> &[ClientId] {
        &self.pending
    }

    /// Returns the number of connected clients, named or not
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Tests cover the session lifecycle and the turn rotation invariants:
/// the turn holder is always an active client, and removal hands the turn
/// to the structural successor.
#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn manager_with_players(names: &[&str]) -> ClientManager {
        let mut manager = ClientManager::new(256);
        for (i, name) in names.iter().enumerate() {
            let id = i as ClientId + 1;
            assert!(manager.admit(id, test_addr()));
            assert!(manager.promote(id, name.to_string()));
        }
        manager
    }

    #[test]
    fn test_client_creation() {
        let client = Client::new(3, test_addr(), 64);
        assert_eq!(client.id, 3);
        assert_eq!(client.state, SessionState::Pending);
        assert_eq!(client.name(), None);
        assert!(!client.is_active());
        assert_eq!(client.buffer.capacity(), 64);
    }

    #[test]
    fn test_admit() {
        let mut manager = ClientManager::new(256);
        assert!(manager.admit(1, test_addr()));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.pending_ids(), &[1]);
        assert!(manager.active_ids().is_empty());
        assert_eq!(manager.turn(), None);
    }

    #[test]
    fn test_admit_duplicate_id() {
        let mut manager = ClientManager::new(256);
        assert!(manager.admit(1, test_addr()));
        assert!(!manager.admit(1, test_addr()));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_first_promoted_client_gets_turn() {
        let mut manager = ClientManager::new(256);
        manager.admit(1, test_addr());
        manager.admit(2, test_addr());

        assert!(manager.promote(2, "bob".to_string()));
        assert_eq!(manager.turn(), Some(2));
        assert_eq!(manager.turn_name(), Some("bob"));
        assert_eq!(manager.pending_ids(), &[1]);

        assert!(manager.promote(1, "alice".to_string()));
        assert_eq!(manager.turn(), Some(2));
        assert_eq!(manager.active_ids(), &[1, 2]);
    }

    #[test]
    fn test_promote_requires_pending() {
        let mut manager = manager_with_players(&["alice"]);
        assert!(!manager.promote(1, "again".to_string()));
        assert!(!manager.promote(99, "ghost".to_string()));
        assert_eq!(manager.get(1).unwrap().name(), Some("alice"));
    }

    #[test]
    fn test_name_taken_checks_active_only() {
        let mut manager = manager_with_players(&["alice"]);
        manager.admit(2, test_addr());

        assert!(manager.name_taken("alice"));
        assert!(!manager.name_taken("Alice"));
        assert!(!manager.name_taken(""));
    }

    #[test]
    fn test_advance_turn_cycles() {
        let mut manager = manager_with_players(&["a", "b", "c", "d"]);
        let start = manager.turn();

        let mut seen = Vec::new();
        for _ in 0..manager.active_ids().len() {
            seen.push(manager.advance_turn().unwrap());
        }

        assert_eq!(manager.turn(), start);
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_advance_turn_follows_rotation_order() {
        // Rotation is [3, 2, 1] since each new player goes to the front
        let mut manager = manager_with_players(&["a", "b", "c"]);
        assert_eq!(manager.turn(), Some(1));
        assert_eq!(manager.advance_turn(), Some(3));
        assert_eq!(manager.advance_turn(), Some(2));
        assert_eq!(manager.advance_turn(), Some(1));
    }

    #[test]
    fn test_advance_turn_without_players() {
        let mut manager = ClientManager::new(256);
        assert_eq!(manager.advance_turn(), None);
    }

    #[test]
    fn test_remove_turn_holder_passes_to_successor() {
        let mut manager = manager_with_players(&["a", "b", "c"]);
        // Rotation [3, 2, 1]; give the turn to 2, whose successor is 1
        manager.advance_turn();
        manager.advance_turn();
        assert_eq!(manager.turn(), Some(2));

        let removed = manager.remove(2).unwrap();
        assert_eq!(removed.name(), Some("b"));
        assert_eq!(manager.turn(), Some(1));
        assert_eq!(manager.active_ids(), &[3, 1]);
    }

    #[test]
    fn test_remove_last_in_rotation_wraps() {
        let mut manager = manager_with_players(&["a", "b", "c"]);
        // Holder 1 is last in [3, 2, 1]
        assert_eq!(manager.turn(), Some(1));
        manager.remove(1);
        assert_eq!(manager.turn(), Some(3));
    }

    #[test]
    fn test_remove_other_player_keeps_turn() {
        let mut manager = manager_with_players(&["a", "b", "c"]);
        manager.remove(3);
        assert_eq!(manager.turn(), Some(1));
        assert_eq!(manager.active_ids(), &[2, 1]);
    }

    #[test]
    fn test_remove_only_player_clears_turn() {
        let mut manager = manager_with_players(&["solo"]);
        manager.remove(1);
        assert_eq!(manager.turn(), None);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_remove_pending_client() {
        let mut manager = manager_with_players(&["alice"]);
        manager.admit(2, test_addr());

        let removed = manager.remove(2).unwrap();
        assert!(!removed.is_active());
        assert!(manager.pending_ids().is_empty());
        assert_eq!(manager.turn(), Some(1));
    }

    #[test]
    fn test_remove_unknown_client() {
        let mut manager = ClientManager::new(256);
        assert!(manager.remove(42).is_none());
    }

    #[test]
    fn test_turn_holder_always_active() {
        let mut manager = manager_with_players(&["a", "b", "c", "d", "e"]);
        for id in [3, 1, 5, 2] {
            manager.advance_turn();
            manager.remove(id);
            let holder = manager.turn().unwrap();
            assert!(manager.active_ids().contains(&holder));
        }
        assert_eq!(manager.turn(), Some(4));
    }
}
