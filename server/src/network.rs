//! WebSocket transport and message dispatch for the match server
//!
//! One task per connection reads inbound frames; a companion writer
//! task owns the outbound sink and drains a per-connection queue so a
//! slow socket never blocks dispatch. All roster and game mutation
//! happens under a single lock, making each validate-apply-broadcast
//! step one atomic transition.

use crate::game::{GameState, MoveOutcome};
use crate::session::SessionRegistry;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

/// The shared match: the roster plus the single authoritative game
/// state, replaced wholesale on restart.
struct Match {
    registry: SessionRegistry,
    game: GameState,
}

impl Match {
    fn new() -> Self {
        Self {
            registry: SessionRegistry::new(),
            game: GameState::new(),
        }
    }
}

/// WebSocket server coordinating one two-player match.
pub struct Server {
    listener: TcpListener,
    state: Arc<Mutex<Match>>,
}

impl Server {
    /// Binds the listening endpoint and prepares an empty match.
    pub async fn bind(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on ws://{}", listener.local_addr()?);

        Ok(Server {
            listener,
            state: Arc::new(Mutex::new(Match::new())),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, spawning one handler task each.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let mut next_conn_id: u64 = 0;

        loop {
            let (stream, peer) = self.listener.accept().await?;
            next_conn_id += 1;
            let conn_id = next_conn_id;
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(state, stream, conn_id).await {
                    warn!("Connection {} from {} ended with error: {}", conn_id, peer, e);
                }
            });
        }
    }
}

/// Drives one connection from handshake to disconnect.
async fn handle_connection(
    state: Arc<Mutex<Match>>,
    stream: TcpStream,
    conn_id: u64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Writer task: owns the sink. A failed send means the socket is
    // gone; the reader loop observes the close independently.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let admitted = {
        let mut shared = state.lock().await;
        match shared.registry.admit(conn_id, tx.clone()) {
            Some(symbol) => {
                send_to(
                    &tx,
                    &ServerMessage::Symbol {
                        message: format!("You have been assigned the symbol {}", symbol),
                    },
                );

                if shared.registry.is_full() {
                    shared.game.set_started(true);
                    info!("Roster full, match started");
                    let snapshot = shared.game.snapshot();
                    for participant in shared.registry.participants() {
                        send_to(
                            &participant.sender,
                            &ServerMessage::Start {
                                game_state: snapshot.clone(),
                                message: format!(
                                    "The match has started. Your symbol is {}",
                                    participant.symbol
                                ),
                            },
                        );
                    }
                } else {
                    send_to(
                        &tx,
                        &ServerMessage::Waiting {
                            message: "Waiting for an opponent to connect".to_string(),
                        },
                    );
                }
                true
            }
            None => {
                info!("Connection {} rejected, match in progress", conn_id);
                send_to(
                    &tx,
                    &ServerMessage::Error {
                        message: "Match in progress".to_string(),
                    },
                );
                false
            }
        }
    };

    if !admitted {
        // Let the rejection notice flush, then close the socket.
        drop(tx);
        let _ = writer.await;
        return Ok(());
    }

    while let Some(frame) = ws_rx.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Read error on connection {}: {}", conn_id, e);
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let mut shared = state.lock().await;
                handle_client_message(&mut shared, &tx, conn_id, &text);
            }
            Message::Close(_) => break,
            other => debug!("Ignoring non-text frame on connection {}: {:?}", conn_id, other),
        }
    }

    // Disconnect frees the slot and stops the match, but the board is
    // left as-is; only an explicit restart clears cells.
    {
        let mut shared = state.lock().await;
        shared.registry.remove(conn_id);
        shared.game.set_started(false);
        info!(
            "Connection {} disconnected, {} player(s) remaining",
            conn_id,
            shared.registry.len()
        );
    }

    drop(tx);
    let _ = writer.await;
    Ok(())
}

/// Parses and dispatches one inbound frame under the match lock.
fn handle_client_message(
    shared: &mut Match,
    tx: &mpsc::UnboundedSender<Message>,
    conn_id: u64,
    text: &str,
) {
    let parsed: Result<ClientMessage, _> = serde_json::from_str(text);

    match parsed {
        Ok(ClientMessage::Move {
            row,
            col,
            player,
            board_index,
        }) => match shared.game.apply_move(player, board_index, row, col) {
            Ok(MoveOutcome::Update) => {
                let snapshot = shared.game.snapshot();
                broadcast(
                    &shared.registry,
                    &ServerMessage::Update {
                        game_state: snapshot,
                    },
                );
            }
            Ok(MoveOutcome::GameOver { winner }) => {
                broadcast(
                    &shared.registry,
                    &ServerMessage::GameOver {
                        message: format!("Player {} has won the game!", winner),
                        global_winner: winner,
                        individual_board_winners: shared.game.board_winners(),
                    },
                );
            }
            Err(err) => {
                debug!("Rejected move from connection {}: {}", conn_id, err);
                send_to(
                    tx,
                    &ServerMessage::Error {
                        message: err.message().to_string(),
                    },
                );
            }
        },
        Ok(ClientMessage::Restart) => {
            info!("Match restarted by connection {}", conn_id);
            shared.game = GameState::restarted();
            let snapshot = shared.game.snapshot();
            for participant in shared.registry.participants() {
                send_to(
                    &participant.sender,
                    &ServerMessage::Start {
                        game_state: snapshot.clone(),
                        message: format!(
                            "The match has been restarted. Your symbol is {}",
                            participant.symbol
                        ),
                    },
                );
            }
        }
        Err(e) => {
            warn!("Malformed message from connection {}: {}", conn_id, e);
            send_to(
                tx,
                &ServerMessage::Error {
                    message: "Malformed message.".to_string(),
                },
            );
        }
    }
}

/// Queues one message for a participant's writer task. A closed queue
/// means the connection is already going away; delivery is best-effort
/// and never aborts sends to the other participant.
fn send_to(sender: &mpsc::UnboundedSender<Message>, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            let _ = sender.send(Message::Text(json));
        }
        Err(e) => error!("Failed to encode outbound message: {}", e),
    }
}

fn broadcast(registry: &SessionRegistry, message: &ServerMessage) {
    for participant in registry.participants() {
        send_to(&participant.sender, message);
    }
}
