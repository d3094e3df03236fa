//! # Ultimate Tic-Tac-Toe Match Server
//!
//! Authoritative coordination server for a two-player ultimate
//! tic-tac-toe match: nine linked 3x3 sub-boards where winning a
//! sub-board claims one cell of the global board, and three claimed
//! cells in a line win the game.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Game State
//! The server owns the only copy of the match state. Every inbound move
//! is validated against the composite board rules, applied as a single
//! transition, and the resulting state is broadcast to both players so
//! clients never diverge.
//!
//! ### Session Management
//! At most two players are connected at a time. The first admitted
//! connection plays X, the second O; additional connections are turned
//! away while the match is full. A disconnect frees the slot and marks
//! the game not started, leaving the board for a possible restart.
//!
//! ### Synchronization Protocol
//! Each connection carries JSON text frames over a WebSocket. Inbound
//! frames are `move` and `restart`; outbound frames are `symbol`,
//! `waiting`, `start`, `update`, `gameOver` and `error`, with the wire
//! shapes defined in the `shared` crate.
//!
//! ## Architecture
//!
//! One tokio task per connection reads frames; a writer task per
//! connection drains an outbound queue so a slow peer never stalls the
//! dispatcher. The roster and game state live behind one mutex, so the
//! validate-apply-broadcast sequence for any message is a single
//! non-interleaved transition.
//!
//! ## Module Organization
//!
//! ### Game Module ([`game`])
//! Board state, move legality, and nested win detection.
//!
//! ### Session Module ([`session`])
//! The two-slot roster and symbol assignment.
//!
//! ### Network Module ([`network`])
//! WebSocket accept loop, framing, and message dispatch.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("127.0.0.1:8080").await?;
//!     server.run().await
//! }
//! ```

pub mod game;
pub mod network;
pub mod session;
