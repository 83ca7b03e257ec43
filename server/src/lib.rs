//! # Word Game Server Library
//!
//! This library provides the server for a multiplayer word-guessing game.
//! Players connect over TCP, pick a display name, and take turns guessing the
//! letters of a hidden word. The server owns the canonical game state and
//! tells every player what happened after each move.
//!
//! ## Core Responsibilities
//!
//! ### Session Lifecycle
//! Every connection starts as a pending client. Once it sends a valid name
//! it becomes an active player and joins the turn rotation. A client leaves
//! when its connection closes, a read or write fails, or it floods its input
//! buffer without ever finishing a line.
//!
//! ### Turn Arbitration
//! Exactly one active player holds the turn. A correct guess keeps the turn,
//! a wrong guess passes it on, and the end of a round passes it on as well.
//! When the holder leaves, the turn goes to the next player in the rotation.
//!
//! ### Round Management
//! A round ends when the word is fully revealed or the guesses run out. The
//! word is then revealed to everyone and a new round starts right away with a
//! fresh word; the rotation carries over unchanged.
//!
//! ## Architecture Design
//!
//! ### Single Owner Event Loop
//! The [`network::Server`] loop is the only code that touches game state. Per
//! connection reader and writer tasks just move bytes and report back over a
//! channel, so handlers run to completion one event at a time and no locks are
//! needed.
//!
//! ### Line Protocol
//! Commands and replies are text lines terminated by `\r\n`. Reads are
//! reassembled per client with [`shared::LineBuffer`]; every complete line in
//! a read is handled before the loop waits again.
//!
//! ## Module Organization
//!
//! - [`client_manager`]: pending and active clients, the turn rotation
//! - [`config`]: server tunables
//! - [`dictionary`]: word sources for new rounds
//! - [`engine`]: naming, guessing and disconnect handlers
//! - [`game`]: the state of a single round
//! - [`messages`]: text of every server message
//! - [`network`]: listener, connection tasks and the event loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::dictionary::Dictionary;
//! use server::engine::Engine;
//! use server::network::Server;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let words = Dictionary::open("words.txt", None)?;
//!     let engine = Engine::new(ServerConfig::default(), Box::new(words));
//!
//!     let mut server = Server::bind("0.0.0.0:58966".parse()?, engine).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod game;
pub mod messages;
pub mod network;
