//! # Battleship Match Server Library
//!
//! This library provides the authoritative server for a multi-team,
//! multi-player game of Battleship. It admits a fixed number of players
//! over TCP, walks them through ship placement, and then arbitrates a
//! turn-based exchange of fire until exactly one team has ships afloat.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Match State
//! The server owns the definitive boards, turn order, and liveness
//! flags. Every rule decision - placement validity, hit and miss
//! resolution, sinking, player and team elimination, victory - is made
//! here; clients only render what the server reports.
//!
//! ### Session Management
//! Each admitted connection is driven by its own session task through a
//! fixed phase sequence: join, ship placement, the start barrier, the
//! active command loop, and the end acknowledgement. Phase barriers are
//! client-poll driven: a waiting client repeatedly asks and receives
//! WAIT until the relevant admission counter reaches the match size.
//!
//! ### Store-And-Forward Notifications
//! State changes are never pushed. Every mutation appends one line to
//! each player's private notification queue, and each player's session
//! drains its own queue when that client next polls. Slow pollers lose
//! nothing; they just read a longer batch later.
//!
//! ## Architecture Design
//!
//! ### One Lock, Many Sessions
//! All match mutation is serialized by a single match-wide mutex.
//! Contention is human-paced, so correctness wins over throughput: no
//! per-player locks, no lock held across socket I/O.
//!
//! ### Transport Split
//! Command/response traffic rides one persistent TCP stream per player
//! as length-free text frames. Chat payloads ride ephemeral UDP
//! exchanges opened per batch, keeping bulky side traffic off the
//! command stream.
//!
//! ## Module Organization
//!
//! - [`board`]: per-player grid, placement validation, shot resolution
//! - [`player`]: identity, liveness flags, outbound queues
//! - [`match_state`]: registries, barriers, combat, turn rotation
//! - [`session`]: the per-connection phase driver
//! - [`chat`]: the ephemeral UDP chat relay
//! - [`network`]: admission and the match lifecycle gates
//! - [`wire`]: the text frame codec
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // Wait for exactly four players, then run the match to its end.
//!     let mut server = Server::new("127.0.0.1:7788", 4).await?;
//!     let winner = server.run().await?;
//!     println!("winning team: {}", winner);
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod chat;
pub mod match_state;
pub mod network;
pub mod player;
pub mod session;
pub mod wire;
