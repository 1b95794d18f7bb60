//! One worker per connection: drives its player through the fixed phase
//! sequence and translates wire commands into match-state operations.
//!
//! The worker is the only code path that drains its own player's
//! queues. It competes with every other worker for the match lock, but
//! never holds the lock across socket I/O.

use crate::chat::{self, ChatReceiver};
use crate::match_state::MatchState;
use crate::wire::{read_frame, write_frame};
use log::{info, warn};
use shared::{BoardView, ChatScope, Command, Coord, Notification};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

type SharedState = Arc<Mutex<MatchState>>;

/// The phase driver for one admitted connection.
pub struct Session {
    player_id: u32,
    peer: SocketAddr,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    state: SharedState,
}

impl Session {
    pub fn new(stream: TcpStream, peer: SocketAddr, player_id: u32, state: SharedState) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            player_id,
            peer,
            reader: BufReader::new(read_half),
            writer: write_half,
            state,
        }
    }

    /// Runs the full phase sequence. Transport failures end the session
    /// with an error; the connection closes when this returns.
    pub async fn run(mut self) -> io::Result<()> {
        self.await_join().await?;
        self.receive_placements().await?;
        self.await_start().await?;
        self.send_initial_state().await?;
        self.active_loop().await?;
        info!("Session closed for player {} ({})", self.player_id, self.peer);
        Ok(())
    }

    /// JOINING: registers the player on their first JOIN line, then
    /// answers WAIT to every poll until the setup barrier opens.
    async fn await_join(&mut self) -> io::Result<()> {
        loop {
            let line = read_frame(&mut self.reader).await?;
            match Command::parse(&line) {
                Ok(Command::Join { username, team }) => {
                    let setup_started = {
                        let mut state = self.state.lock().await;
                        if !state.is_registered(self.player_id) {
                            state.register_player(self.player_id, &username, &team);
                        }
                        state.setup_started()
                    };
                    if setup_started {
                        write_frame(&mut self.writer, "OK").await?;
                        return Ok(());
                    }
                    write_frame(&mut self.writer, "WAIT").await?;
                }
                _ => {
                    warn!("Player {} sent '{}' before joining", self.player_id, line);
                    write_frame(&mut self.writer, "UNKNOWN CODE").await?;
                }
            }
        }
    }

    /// SETUP: accepts placement lines until the board holds all five
    /// ships. Rejected placements leave the board untouched and the
    /// client retries the same ship.
    async fn receive_placements(&mut self) -> io::Result<()> {
        loop {
            let complete = {
                let state = self.state.lock().await;
                state
                    .player(self.player_id)
                    .is_some_and(|p| p.board.is_complete())
            };
            if complete {
                break;
            }

            let line = read_frame(&mut self.reader).await?;
            let response = match Command::parse(&line) {
                Ok(Command::PlaceShip { ship, cells }) => {
                    // The parser guarantees at least one cell; the span
                    // endpoints are the first and last of the list.
                    let a = cells.first().copied();
                    let b = cells.last().copied();
                    let placed = match (a, b) {
                        (Some(a), Some(b)) => {
                            let mut state = self.state.lock().await;
                            state
                                .player_mut(self.player_id)
                                .map(|player| player.board.place_ship(ship, a, b).map(|_| ()))
                        }
                        _ => None,
                    };
                    match placed {
                        Some(Ok(())) => {
                            info!("Player {} placed their {}", self.player_id, ship);
                            "OK".to_string()
                        }
                        Some(Err(e)) => format!("INVALID_PLACEMENT {}", e),
                        None => {
                            warn!("Placement for unregistered player {}", self.player_id);
                            "UNKNOWN CODE".to_string()
                        }
                    }
                }
                Ok(_) | Err(_) => {
                    warn!("Player {} sent '{}' during placement", self.player_id, line);
                    "INVALID_PLACEMENT expected a ship placement line".to_string()
                }
            };
            write_frame(&mut self.writer, &response).await?;
        }

        let mut state = self.state.lock().await;
        state.mark_ready();
        info!(
            "Player {} finished placement ({}/{})",
            self.player_id,
            state.ready_count(),
            state.capacity()
        );
        Ok(())
    }

    /// WAIT_FOR_START: answers SETUP polls with WAIT until the first
    /// team has been chosen.
    async fn await_start(&mut self) -> io::Result<()> {
        loop {
            let line = read_frame(&mut self.reader).await?;
            match Command::parse(&line) {
                Ok(Command::Setup) => {
                    let started = { self.state.lock().await.started() };
                    if started {
                        write_frame(&mut self.writer, "OK").await?;
                        return Ok(());
                    }
                    write_frame(&mut self.writer, "WAIT").await?;
                }
                _ => {
                    warn!("Player {} sent '{}' before start", self.player_id, line);
                    write_frame(&mut self.writer, "UNKNOWN CODE").await?;
                }
            }
        }
    }

    /// SEND_INITIAL_STATE: exactly one SEND INFO exchange. Anything
    /// else here is a protocol violation that closes the connection.
    async fn send_initial_state(&mut self) -> io::Result<()> {
        let line = read_frame(&mut self.reader).await?;
        if !matches!(Command::parse(&line), Ok(Command::SendInfo)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected SEND INFO, got '{}'", line),
            ));
        }

        let info = { self.state.lock().await.match_info() };
        let json = serde_json::to_string(&info)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_frame(&mut self.writer, &json).await?;
        info!("Sent initial game state to player {}", self.player_id);
        Ok(())
    }

    /// ACTIVE: handles commands until this player acknowledges the end
    /// of the game.
    async fn active_loop(&mut self) -> io::Result<()> {
        loop {
            let line = read_frame(&mut self.reader).await?;
            match Command::parse(&line) {
                Ok(Command::UpdateGame) => self.handle_update_game().await?,
                Ok(Command::UpdateChat) => self.handle_update_chat().await?,
                Ok(Command::NewBoard { target, view }) => {
                    self.handle_new_board(target, view).await?
                }
                Ok(Command::Move { target, row, col }) => {
                    self.handle_move(target, row, col).await?
                }
                Ok(Command::Chat { scope }) => self.handle_chat(scope).await?,
                Ok(Command::EndGame) => {
                    {
                        let mut state = self.state.lock().await;
                        state.mark_end_ack();
                        info!(
                            "Player {} acknowledged game end ({}/{})",
                            self.player_id,
                            state.end_count(),
                            state.capacity()
                        );
                    }
                    write_frame(&mut self.writer, "OK").await?;
                    return Ok(());
                }
                Ok(_) | Err(_) => {
                    warn!("Player {} sent '{}' mid-game", self.player_id, line);
                    write_frame(&mut self.writer, "UNKNOWN CODE").await?;
                }
            }
        }
    }

    /// UPDATE_GAME: either GAME OK (nothing pending) or an UPDATE
    /// handshake followed by the drained notification batch.
    async fn handle_update_game(&mut self) -> io::Result<()> {
        let pending = {
            let state = self.state.lock().await;
            state
                .player(self.player_id)
                .is_some_and(|p| p.has_state_updates())
        };
        if !pending {
            return write_frame(&mut self.writer, "GAME OK").await;
        }

        write_frame(&mut self.writer, "UPDATE").await?;
        let _ack = read_frame(&mut self.reader).await?;

        let batch = {
            let mut state = self.state.lock().await;
            match state.player_mut(self.player_id) {
                Some(player) => player.take_state_updates(),
                None => Vec::new(),
            }
        };
        let text = batch
            .iter()
            .map(Notification::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        write_frame(&mut self.writer, &text).await?;
        info!("Sent state messages to player {}", self.player_id);
        Ok(())
    }

    /// UPDATE_CHAT: either CHAT OK (nothing pending) or an UPDATE
    /// handshake, then the batch rides the UDP relay to the address the
    /// client supplied, then a final OK on the stream.
    async fn handle_update_chat(&mut self) -> io::Result<()> {
        let pending = {
            let state = self.state.lock().await;
            state
                .player(self.player_id)
                .is_some_and(|p| p.has_chat_messages())
        };
        if !pending {
            return write_frame(&mut self.writer, "CHAT OK").await;
        }

        write_frame(&mut self.writer, "UPDATE").await?;
        let addr_line = read_frame(&mut self.reader).await?;
        let dest: SocketAddr = match addr_line.trim().parse() {
            Ok(addr) => addr,
            Err(_) => {
                warn!(
                    "Player {} sent unusable chat address '{}'",
                    self.player_id, addr_line
                );
                return write_frame(&mut self.writer, "UNKNOWN CODE").await;
            }
        };

        let batch = {
            let mut state = self.state.lock().await;
            match state.player_mut(self.player_id) {
                Some(player) => player.take_chat_messages(),
                None => Vec::new(),
            }
        };
        chat::push_batch(dest, &batch).await?;
        write_frame(&mut self.writer, "OK").await?;
        info!("Sent chat messages to player {}", self.player_id);
        Ok(())
    }

    /// NEW_BOARD: serves the target's rendered grid; the ALLY view also
    /// answers the follow-up request with the ship-coordinate map.
    async fn handle_new_board(&mut self, target: u32, view: BoardView) -> io::Result<()> {
        let payload = {
            let state = self.state.lock().await;
            state.player(target).map(|p| {
                let ships = match view {
                    BoardView::Ally => Some(p.board.ship_coordinates()),
                    BoardView::Enemy => None,
                };
                (p.board.render(), ships)
            })
        };
        let Some((grid, ships)) = payload else {
            warn!(
                "Player {} requested board of unknown player {}",
                self.player_id, target
            );
            return write_frame(&mut self.writer, "UNKNOWN CODE").await;
        };

        write_frame(&mut self.writer, &grid).await?;
        if let Some(ships) = ships {
            let _request = read_frame(&mut self.reader).await?;
            let json = serde_json::to_string(&ships)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            write_frame(&mut self.writer, &json).await?;
        }
        info!("Sent new board to player {}", self.player_id);
        Ok(())
    }

    /// MOVE: arbitrated entirely by the match state; rule violations
    /// come back as their named outcomes.
    async fn handle_move(&mut self, target: u32, row: u8, col: u8) -> io::Result<()> {
        if !Coord::new(row, col).in_bounds() {
            warn!(
                "Player {} fired off the board at {}_{}",
                self.player_id, row, col
            );
            return write_frame(&mut self.writer, "UNKNOWN CODE").await;
        }

        let result = {
            let mut state = self.state.lock().await;
            state.make_move(self.player_id, target, row, col)
        };
        match result {
            Ok(()) => {
                info!(
                    "Received move from player {}: {} {}_{}",
                    self.player_id, target, row, col
                );
                write_frame(&mut self.writer, "MOVE_OK").await
            }
            Err(e) => write_frame(&mut self.writer, e.wire_name()).await,
        }
    }

    /// CHAT: opens an ephemeral receive point, pulls one payload from
    /// the client, and queues it for the scope's recipients.
    async fn handle_chat(&mut self, scope: ChatScope) -> io::Result<()> {
        let (receiver, port) = ChatReceiver::bind().await?;
        write_frame(&mut self.writer, &format!("SEND MSG {}", port)).await?;

        let text = receiver.recv_message().await?;
        {
            let mut state = self.state.lock().await;
            state.queue_chat(self.player_id, &scope, &text);
        }
        info!("Received chat message from player {}: {}", self.player_id, text);
        write_frame(&mut self.writer, "CHAT OK").await
    }
}
