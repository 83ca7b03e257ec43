//! Server network layer handling TCP connections and event dispatch

use crate::client_manager::ClientId;
use crate::engine::{Engine, Outgoing};
use log::{error, info, warn};
use shared::MAX_BUF;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    /// One read's worth of bytes; empty means the peer closed the stream
    Received { client_id: ClientId, bytes: Vec<u8> },
    /// Reading failed and the connection is unusable
    ReadFailed { client_id: ClientId },
    /// Writing failed and the connection is unusable
    WriteFailed { client_id: ClientId },
}

/// Tasks and outbound queue of one live connection
struct Connection {
    addr: SocketAddr,
    outbound: mpsc::UnboundedSender<String>,
    reader: JoinHandle<()>,
}

/// Main server owning the listener, every connection and the game engine
///
/// Connection tasks only move bytes. All game state is touched from `run`,
/// one event at a time.
pub struct Server {
    listener: TcpListener,
    engine: Engine,
    connections: HashMap<ClientId, Connection>,
    next_client_id: ClientId,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    /// Binds the listening socket with the configured backlog
    pub async fn bind(
        addr: SocketAddr,
        engine: Engine,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(engine.config().backlog)?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            engine,
            connections: HashMap::new(),
            next_client_id: 1,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Main server loop: waits for a new connection or a connection event
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Server started successfully");

        loop {
            tokio::select! {
                // New connections are serviced before connection events
                biased;

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            let (read_half, write_half) = stream.into_split();
                            self.handle_accept(read_half, write_half, addr);
                        }
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                        }
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },
            }
        }

        Ok(())
    }

    /// Registers a new connection, starts its tasks and greets it
    fn handle_accept<R, W>(&mut self, reader: R, writer: W, addr: SocketAddr)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let client_id = self.next_client_id;
        self.next_client_id = self.next_client_id.wrapping_add(1).max(1);
        info!("Connection from {} (client {})", addr, client_id);

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(client_id, reader, self.server_tx.clone()));
        tokio::spawn(write_loop(
            client_id,
            writer,
            outbound_rx,
            self.server_tx.clone(),
        ));

        self.connections.insert(
            client_id,
            Connection {
                addr,
                outbound,
                reader,
            },
        );

        let welcome = self.engine.connect(client_id, addr);
        self.deliver(welcome);
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Received { client_id, bytes } => {
                if !self.connections.contains_key(&client_id) {
                    return;
                }
                let received = self.engine.receive(client_id, &bytes);
                if received.closed {
                    self.close_connection(client_id);
                }
                self.deliver(received.outgoing);
            }
            ServerMessage::ReadFailed { client_id } | ServerMessage::WriteFailed { client_id } => {
                self.disconnect(client_id);
            }
        }
    }

    /// Tears down a connection and lets the engine announce the departure
    fn disconnect(&mut self, client_id: ClientId) {
        if !self.close_connection(client_id) {
            return;
        }
        let farewell = self.engine.disconnect(client_id);
        self.deliver(farewell);
    }

    /// Stops a connection's tasks; returns false if it was already gone
    fn close_connection(&mut self, client_id: ClientId) -> bool {
        match self.connections.remove(&client_id) {
            Some(connection) => {
                info!("Disconnect from {} (client {})", connection.addr, client_id);
                connection.reader.abort();
                // Dropping `outbound` lets the writer flush and shut down
                true
            }
            None => false,
        }
    }

    /// Queues messages on their connections
    ///
    /// A connection whose writer is gone counts as disconnected; its
    /// departure may produce more messages, which are delivered in turn.
    fn deliver(&mut self, outgoing: Vec<Outgoing>) {
        let mut queue: VecDeque<Outgoing> = outgoing.into();

        while let Some(message) = queue.pop_front() {
            let Some(connection) = self.connections.get(&message.client_id) else {
                continue;
            };

            if connection.outbound.send(message.text).is_err() {
                warn!("Write to client {} failed", message.client_id);
                self.close_connection(message.client_id);
                queue.extend(self.engine.disconnect(message.client_id));
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

/// Forwards every read from a connection to the server loop
///
/// The zero-length read at end-of-file is forwarded too, which is how the
/// engine learns the client left.
async fn read_loop<R>(
    client_id: ClientId,
    mut reader: R,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) where
    R: AsyncRead + Unpin,
{
    let mut buffer = [0u8; MAX_BUF];

    loop {
        match reader.read(&mut buffer).await {
            Ok(len) => {
                let message = ServerMessage::Received {
                    client_id,
                    bytes: buffer[..len].to_vec(),
                };
                if server_tx.send(message).is_err() || len == 0 {
                    break;
                }
            }
            Err(e) => {
                warn!("Read from client {} failed: {}", client_id, e);
                let _ = server_tx.send(ServerMessage::ReadFailed { client_id });
                break;
            }
        }
    }
}

/// Writes queued messages to a connection until the queue closes
async fn write_loop<W>(
    client_id: ClientId,
    mut writer: W,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = outbound_rx.recv().await {
        if let Err(e) = writer.write_all(text.as_bytes()).await {
            error!("Failed to send to client {}: {}", client_id, e);
            let _ = server_tx.send(ServerMessage::WriteFailed { client_id });
            return;
        }
    }

    let _ = writer.shutdown().await;
}
