//! TCP admission and the match lifecycle gates.
//!
//! The listener admits exactly the configured number of players, turns
//! extra connections away with BUSY, and then walks the match through
//! its phase barriers by polling the admission counters under the match
//! lock. Progress through wait states is client-poll driven; the short
//! sleep here only paces the server's own barrier checks.

use crate::match_state::MatchState;
use crate::session::Session;
use crate::wire::write_frame;
use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

const BARRIER_POLL: Duration = Duration::from_millis(50);

/// The authoritative match server: one listener, one shared match
/// state, one session task per admitted player.
pub struct Server {
    listener: TcpListener,
    state: Arc<Mutex<MatchState>>,
    capacity: usize,
}

impl Server {
    pub async fn new(
        addr: &str,
        capacity: usize,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            state: Arc::new(Mutex::new(MatchState::new(capacity))),
            capacity,
        })
    }

    /// The bound listener address, for callers that asked for port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the match to completion and returns the winning team.
    ///
    /// Phases: admit until full and joined; open setup (aborting
    /// without at least two teams); wait for every placement; pick the
    /// first team; wait for every end acknowledgement; join the session
    /// tasks.
    pub async fn run(&mut self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut sessions: Vec<JoinHandle<()>> = Vec::new();
        let mut admitted = 0usize;

        // JOINING: accept until every admitted player has registered.
        // Extra connections beyond capacity are turned away.
        loop {
            let joined = { self.state.lock().await.join_count() };
            if joined == self.capacity {
                break;
            }

            tokio::select! {
                accepted = self.listener.accept() => {
                    let (mut stream, addr) = accepted?;
                    if admitted < self.capacity {
                        admitted += 1;
                        let player_id = { self.state.lock().await.assign_player_id() };
                        if let Err(e) =
                            write_frame(&mut stream, &format!("SRDY {}", player_id)).await
                        {
                            // This player can never join now; the join
                            // barrier will hold until the process is
                            // restarted, like any other lost player.
                            error!("Failed to greet {}: {}", addr, e);
                            continue;
                        }
                        info!("Admitted player {} from {}", player_id, addr);

                        let session =
                            Session::new(stream, addr, player_id, Arc::clone(&self.state));
                        sessions.push(tokio::spawn(async move {
                            if let Err(e) = session.run().await {
                                error!("Session for player {} failed: {}", player_id, e);
                            }
                        }));
                    } else {
                        info!("Turning away {}: match is full", addr);
                        let _ = write_frame(
                            &mut stream,
                            "BUSY game is full, please try again later",
                        )
                        .await;
                    }
                }
                _ = sleep(BARRIER_POLL) => {}
            }
        }

        // SETUP gate: a match needs at least two distinct teams.
        {
            let mut state = self.state.lock().await;
            if !state.enough_teams() {
                error!("Not enough teams, cancelling game");
                return Err("not enough teams to start the game".into());
            }
            state.open_setup();
            info!("Teams ready, going to game setup");
        }

        // START gate: every player has finished ship placement.
        loop {
            let ready = { self.state.lock().await.ready_count() };
            if ready == self.capacity {
                break;
            }
            sleep(BARRIER_POLL).await;
        }
        {
            let mut state = self.state.lock().await;
            if let Some(team) = state.start(&mut rand::thread_rng()) {
                info!("Game setup complete, team {} takes the first turn", team);
            }
        }

        // END gate: every player has acknowledged the end of the game.
        loop {
            let ended = { self.state.lock().await.end_count() };
            if ended == self.capacity {
                break;
            }
            sleep(BARRIER_POLL).await;
        }

        for handle in sessions {
            let _ = handle.await;
        }

        let winner = {
            let state = self.state.lock().await;
            state.winner().unwrap_or_default().to_string()
        };
        info!("The game has ended. The winning team is: {}", winner);
        Ok(winner)
    }
}
