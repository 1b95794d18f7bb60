//! The shared world model: player and team registries, phase barriers,
//! combat resolution with the elimination cascade, and turn advancement.
//!
//! Every mutation here runs under the single match-wide lock held by the
//! calling session. The state never performs I/O; outbound traffic is
//! expressed solely as appends to per-player notification queues.

use crate::board::Shot;
use crate::player::Player;
use log::{debug, info};
use rand::Rng;
use shared::{ChatScope, Coord, MatchInfo, Notification, PlayerInfo};
use std::collections::HashMap;
use std::fmt;

/// A team: its members in join order and whether any member is alive.
#[derive(Debug)]
pub struct Team {
    pub members: Vec<u32>,
    pub alive: bool,
}

/// Named rule violations for a move attempt, reported to the requester
/// verbatim so the front end can render a precise message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    NotYourTurn,
    AlreadyTakenTurn,
    YouAreDead,
    EnemyIsDead,
    UnknownPlayer,
}

impl MoveError {
    pub fn wire_name(&self) -> &'static str {
        match self {
            MoveError::NotYourTurn => "NOT_YOUR_TURN",
            MoveError::AlreadyTakenTurn => "ALREADY_TAKEN_TURN",
            MoveError::YouAreDead => "YOU_ARE_DEAD",
            MoveError::EnemyIsDead => "ENEMY_IS_DEAD",
            MoveError::UnknownPlayer => "UNKNOWN CODE",
        }
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::error::Error for MoveError {}

/// Authoritative match state for one fixed-size match.
#[derive(Debug)]
pub struct MatchState {
    capacity: usize,
    next_player_id: u32,
    players: HashMap<u32, Player>,
    teams: HashMap<String, Team>,
    /// Team labels in the order first seen at join; turn rotation and
    /// tie-breaks follow this order.
    team_order: Vec<String>,
    team_turn: Option<String>,
    first_team_turn: Option<String>,
    turn_count: u32,
    winner: Option<String>,
    join_count: usize,
    ready_count: usize,
    end_count: usize,
    setup_started: bool,
    started: bool,
}

impl MatchState {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_player_id: 0,
            players: HashMap::new(),
            teams: HashMap::new(),
            team_order: Vec::new(),
            team_turn: None,
            first_team_turn: None,
            turn_count: 1,
            winner: None,
            join_count: 0,
            ready_count: 0,
            end_count: 0,
            setup_started: false,
            started: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hands out the next player number, starting from 1.
    pub fn assign_player_id(&mut self) -> u32 {
        self.next_player_id += 1;
        self.next_player_id
    }

    /// Registers a joining player under an admitted id and fixes their
    /// team membership. Returns false if the id is already registered or
    /// the match is full.
    pub fn register_player(&mut self, id: u32, username: &str, team: &str) -> bool {
        if self.join_count >= self.capacity || self.players.contains_key(&id) {
            return false;
        }

        self.players
            .insert(id, Player::new(id, username.to_string(), team.to_string()));
        let entry = self.teams.entry(team.to_string()).or_insert_with(|| {
            self.team_order.push(team.to_string());
            Team {
                members: Vec::new(),
                alive: true,
            }
        });
        entry.members.push(id);
        self.join_count += 1;

        info!("Player {} ({}) joined team {}", id, username, team);
        true
    }

    pub fn is_registered(&self, id: u32) -> bool {
        self.players.contains_key(&id)
    }

    pub fn join_count(&self) -> usize {
        self.join_count
    }

    /// The match needs at least two distinct teams to be playable.
    pub fn enough_teams(&self) -> bool {
        self.team_order.len() > 1
    }

    pub fn open_setup(&mut self) {
        self.setup_started = true;
    }

    pub fn setup_started(&self) -> bool {
        self.setup_started
    }

    pub fn mark_ready(&mut self) {
        self.ready_count += 1;
    }

    pub fn ready_count(&self) -> usize {
        self.ready_count
    }

    /// Opens the playing phase: picks the first team uniformly at random
    /// and seeds the turn pointer with it.
    pub fn start<R: Rng>(&mut self, rng: &mut R) -> Option<String> {
        let index = rng.gen_range(0..self.team_order.len().max(1));
        let first = self.team_order.get(index)?.clone();
        self.team_turn = Some(first.clone());
        self.first_team_turn = Some(first.clone());
        self.started = true;
        Some(first)
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn mark_end_ack(&mut self) {
        self.end_count += 1;
    }

    pub fn end_count(&self) -> usize {
        self.end_count
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn current_team(&self) -> Option<&str> {
        self.team_turn.as_deref()
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn team_order(&self) -> &[String] {
        &self.team_order
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Verifies the move preconditions without mutating anything.
    pub fn check_move(&self, attacker_id: u32, defender_id: u32) -> Result<(), MoveError> {
        let attacker = self
            .players
            .get(&attacker_id)
            .ok_or(MoveError::UnknownPlayer)?;
        let defender = self
            .players
            .get(&defender_id)
            .ok_or(MoveError::UnknownPlayer)?;

        // Terminal state: once a winner is set no further moves are
        // accepted.
        if self.winner.is_some() {
            return Err(MoveError::NotYourTurn);
        }
        if !attacker.alive {
            return Err(MoveError::YouAreDead);
        }
        if !defender.alive {
            return Err(MoveError::EnemyIsDead);
        }
        if self.team_turn.as_deref() != Some(attacker.team.as_str()) {
            return Err(MoveError::NotYourTurn);
        }
        if attacker.taken_turn {
            return Err(MoveError::AlreadyTakenTurn);
        }
        Ok(())
    }

    /// Resolves one shot from `attacker_id` at `(row, col)` on the
    /// defender's board: cell transition, sunk sweep, player and team
    /// elimination, victory check, turn consumption and advancement.
    /// Rejected moves mutate nothing.
    pub fn make_move(
        &mut self,
        attacker_id: u32,
        defender_id: u32,
        row: u8,
        col: u8,
    ) -> Result<(), MoveError> {
        self.check_move(attacker_id, defender_id)?;
        let coord = Coord::new(row, col);

        let (attacker_name, attacker_team) = match self.players.get(&attacker_id) {
            Some(p) => (p.username.clone(), p.team.clone()),
            None => return Err(MoveError::UnknownPlayer),
        };
        let (shot, sunk_ships, defender_dead, defender_name, defender_team) =
            match self.players.get_mut(&defender_id) {
                Some(d) => {
                    let shot = d.board.fire(coord);
                    let sunk = d.board.sweep_sunk();
                    let dead = d.board.all_sunk();
                    if dead {
                        d.alive = false;
                    }
                    (shot, sunk, dead, d.username.clone(), d.team.clone())
                }
                None => return Err(MoveError::UnknownPlayer),
            };

        debug!(
            "{} fired at {} {} -> {:?}",
            attacker_name, defender_name, coord, shot
        );
        self.broadcast(match shot {
            Shot::Hit => Notification::Hit {
                attacker: attacker_name.clone(),
                defender: defender_name.clone(),
                row,
                col,
            },
            Shot::Miss => Notification::Miss {
                attacker: attacker_name.clone(),
                defender: defender_name.clone(),
                row,
                col,
            },
        });

        for (ship, cells) in sunk_ships {
            info!("{} sank {}'s {}", attacker_name, defender_name, ship);
            self.broadcast(Notification::Sunk {
                attacker: attacker_name.clone(),
                defender: defender_name.clone(),
                ship,
                cells,
            });
        }

        if defender_dead {
            info!("Player {} eliminated", defender_name);
            self.broadcast(Notification::ElimPlayer {
                attacker: attacker_name.clone(),
                defender: defender_name.clone(),
            });
            self.eliminate_team_if_dead(&attacker_team, &defender_team);
        }

        if let Some(attacker) = self.players.get_mut(&attacker_id) {
            attacker.taken_turn = true;
        }
        if self.winner.is_none() {
            self.advance_turn_if_complete();
        }
        Ok(())
    }

    /// Marks `defender_team` dead once its last member falls, then runs
    /// the victory check.
    fn eliminate_team_if_dead(&mut self, attacker_team: &str, defender_team: &str) {
        let any_alive = match self.teams.get(defender_team) {
            Some(team) if team.alive => team
                .members
                .iter()
                .any(|id| self.players.get(id).is_some_and(|p| p.alive)),
            _ => return,
        };
        if any_alive {
            return;
        }

        if let Some(team) = self.teams.get_mut(defender_team) {
            team.alive = false;
        }
        info!("Team {} eliminated", defender_team);
        self.broadcast(Notification::ElimTeam {
            attacker_team: attacker_team.to_string(),
            defender_team: defender_team.to_string(),
        });

        let alive: Vec<String> = self
            .team_order
            .iter()
            .filter(|label| self.teams.get(*label).is_some_and(|t| t.alive))
            .cloned()
            .collect();
        if let [last] = alive.as_slice() {
            let last = last.clone();
            info!("Team {} wins", last);
            self.broadcast(Notification::GameEnd { team: last.clone() });
            self.winner = Some(last);
        }
    }

    /// Once every member of the current team has moved, resets their
    /// flags and rotates the turn to the next living team in join order.
    /// Cycling back to the first-turn team completes a round and bumps
    /// the turn counter.
    fn advance_turn_if_complete(&mut self) {
        let Some(current) = self.team_turn.clone() else {
            return;
        };
        let members = match self.teams.get(&current) {
            Some(team) => team.members.clone(),
            None => return,
        };
        let turn_taken = members
            .iter()
            .all(|id| self.players.get(id).is_some_and(|p| p.taken_turn));
        if !turn_taken {
            return;
        }
        for id in &members {
            if let Some(player) = self.players.get_mut(id) {
                player.taken_turn = false;
            }
        }

        let Some(position) = self.team_order.iter().position(|t| *t == current) else {
            return;
        };
        for offset in 1..=self.team_order.len() {
            let next = &self.team_order[(position + offset) % self.team_order.len()];
            if !self.teams.get(next).is_some_and(|t| t.alive) {
                continue;
            }
            let next = next.clone();
            if Some(next.as_str()) == self.first_team_turn.as_deref() {
                self.turn_count += 1;
            }
            debug!("Turn {} passes to team {}", self.turn_count, next);
            self.team_turn = Some(next.clone());
            self.broadcast(Notification::TurnChange {
                turn: self.turn_count,
                team: next,
            });
            return;
        }
    }

    /// Appends `notification` to every player's state queue; the sole
    /// broadcast mechanism.
    fn broadcast(&mut self, notification: Notification) {
        for player in self.players.values_mut() {
            player.push_state(notification.clone());
        }
    }

    /// Routes one chat line to its recipients' chat queues, tagged with
    /// the sender label for that scope.
    pub fn queue_chat(&mut self, sender_id: u32, scope: &ChatScope, text: &str) {
        let (sender_name, sender_team) = match self.players.get(&sender_id) {
            Some(p) => (p.username.clone(), p.team.clone()),
            None => return,
        };

        match scope {
            ChatScope::All => {
                let line = format!("[{} (ALL)] {}", sender_name, text);
                for player in self.players.values_mut() {
                    player.push_chat(line.clone());
                }
            }
            ChatScope::Allies => {
                let line = format!("[{} (ALLIES)] {}", sender_name, text);
                self.queue_chat_to_team(&sender_team, &line);
            }
            ChatScope::Enemy { team } => {
                let to_enemy = format!("[{} (FROM ENEMY - {})] {}", sender_name, team, text);
                let to_allies = format!("[{} (TO ENEMY - {})] {}", sender_name, team, text);
                self.queue_chat_to_team(team, &to_enemy);
                self.queue_chat_to_team(&sender_team, &to_allies);
            }
        }
    }

    fn queue_chat_to_team(&mut self, team: &str, line: &str) {
        let members = match self.teams.get(team) {
            Some(team) => team.members.clone(),
            None => return,
        };
        for id in members {
            if let Some(player) = self.players.get_mut(&id) {
                player.push_chat(line.to_string());
            }
        }
    }

    /// The `SEND INFO` payload.
    pub fn match_info(&self) -> MatchInfo {
        let mut players: Vec<u32> = self.players.keys().copied().collect();
        players.sort_unstable();

        let teams = self
            .teams
            .iter()
            .map(|(label, team)| (label.clone(), team.members.clone()))
            .collect();
        let roster = self
            .players
            .iter()
            .map(|(id, p)| {
                (
                    *id,
                    PlayerInfo {
                        username: p.username.clone(),
                        team: p.team.clone(),
                    },
                )
            })
            .collect();

        MatchInfo {
            players,
            teams,
            first_turn: self.first_team_turn.clone().unwrap_or_default(),
            roster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use shared::ShipKind;

    /// Standard fleet hugging the left edge, rows 1-5.
    fn place_fleet(state: &mut MatchState, id: u32) {
        let board = &mut state.player_mut(id).unwrap().board;
        board
            .place_ship(ShipKind::Carrier, Coord::new(1, 1), Coord::new(1, 5))
            .unwrap();
        board
            .place_ship(ShipKind::Battleship, Coord::new(2, 1), Coord::new(2, 4))
            .unwrap();
        board
            .place_ship(ShipKind::Cruiser, Coord::new(3, 1), Coord::new(3, 3))
            .unwrap();
        board
            .place_ship(ShipKind::Submarine, Coord::new(4, 1), Coord::new(4, 3))
            .unwrap();
        board
            .place_ship(ShipKind::Destroyer, Coord::new(5, 1), Coord::new(5, 2))
            .unwrap();
    }

    /// Registers `specs` as (username, team), places fleets, and starts
    /// with a zero rng so the first-joined team moves first.
    fn started_match(specs: &[(&str, &str)]) -> MatchState {
        let mut state = MatchState::new(specs.len());
        for (username, team) in specs {
            let id = state.assign_player_id();
            assert!(state.register_player(id, username, team));
            place_fleet(&mut state, id);
        }
        state.open_setup();
        let first = state.start(&mut StepRng::new(0, 0)).unwrap();
        assert_eq!(first, specs[0].1);
        state
    }

    fn drain_all(state: &mut MatchState, id: u32) -> Vec<String> {
        state
            .player_mut(id)
            .unwrap()
            .take_state_updates()
            .iter()
            .map(Notification::to_string)
            .collect()
    }

    /// All 17 fleet cells of the standard placement.
    fn fleet_cells() -> Vec<(u8, u8)> {
        let mut cells = Vec::new();
        for (row, len) in [(1u8, 5u8), (2, 4), (3, 3), (4, 3), (5, 2)] {
            for col in 1..=len {
                cells.push((row, col));
            }
        }
        cells
    }

    #[test]
    fn test_registration_and_team_order() {
        let mut state = MatchState::new(3);
        let a = state.assign_player_id();
        let b = state.assign_player_id();
        let c = state.assign_player_id();
        assert_eq!((a, b, c), (1, 2, 3));

        assert!(state.register_player(a, "steve", "Red"));
        assert!(state.register_player(b, "ada", "Blue"));
        assert!(state.register_player(c, "grace", "Red"));
        assert!(!state.register_player(a, "steve", "Red"));

        assert_eq!(state.join_count(), 3);
        assert_eq!(state.team_order(), ["Red", "Blue"]);
        assert!(state.enough_teams());
    }

    #[test]
    fn test_registration_stops_at_capacity() {
        let mut state = MatchState::new(1);
        let a = state.assign_player_id();
        let b = state.assign_player_id();
        assert!(state.register_player(a, "steve", "Red"));
        assert!(!state.register_player(b, "ada", "Blue"));
        assert_eq!(state.join_count(), 1);
    }

    #[test]
    fn test_single_team_is_not_enough() {
        let mut state = MatchState::new(2);
        let a = state.assign_player_id();
        let b = state.assign_player_id();
        state.register_player(a, "steve", "Red");
        state.register_player(b, "grace", "Red");
        assert!(!state.enough_teams());
    }

    #[test]
    fn test_first_team_selection_is_registered_team() {
        let mut state = MatchState::new(2);
        let a = state.assign_player_id();
        let b = state.assign_player_id();
        state.register_player(a, "steve", "Red");
        state.register_player(b, "ada", "Blue");

        let first = state.start(&mut StepRng::new(0, 0)).unwrap();
        assert!(state.team_order().contains(&first));
        assert_eq!(state.current_team(), Some(first.as_str()));
        assert!(state.started());
        assert_eq!(state.turn_count(), 1);
    }

    #[test]
    fn test_move_precondition_precedence() {
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);

        // Blue has not been given the turn yet.
        assert_eq!(state.check_move(2, 1), Err(MoveError::NotYourTurn));

        // Red moves, then cannot move again within the same team-turn...
        state.make_move(1, 2, 10, 10).unwrap();
        // ...but with one member per team the turn has already rotated.
        assert_eq!(state.check_move(1, 2), Err(MoveError::NotYourTurn));
        assert_eq!(state.current_team(), Some("Blue"));

        // Dead participants outrank turn errors.
        state.player_mut(1).unwrap().alive = false;
        assert_eq!(state.check_move(1, 2), Err(MoveError::YouAreDead));
        assert_eq!(state.check_move(2, 1), Err(MoveError::EnemyIsDead));

        assert_eq!(state.check_move(7, 1), Err(MoveError::UnknownPlayer));
    }

    #[test]
    fn test_already_taken_turn_with_two_member_team() {
        let mut state = started_match(&[
            ("steve", "Red"),
            ("grace", "Red"),
            ("ada", "Blue"),
        ]);

        state.make_move(1, 3, 10, 10).unwrap();
        // Team turn is not over: grace has not moved, steve has.
        assert_eq!(state.current_team(), Some("Red"));
        assert_eq!(state.check_move(1, 3), Err(MoveError::AlreadyTakenTurn));

        state.make_move(2, 3, 10, 9).unwrap();
        assert_eq!(state.current_team(), Some("Blue"));
        // Flags reset for the next Red team-turn.
        assert!(!state.player(1).unwrap().taken_turn);
        assert!(!state.player(2).unwrap().taken_turn);
    }

    #[test]
    fn test_hit_and_miss_fan_out_to_every_player() {
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);

        state.make_move(1, 2, 1, 1).unwrap();
        for id in [1, 2] {
            let lines = drain_all(&mut state, id);
            assert_eq!(lines[0], "HIT steve ada 1 1");
            assert_eq!(lines[1], "TURN_CHANGE 1 Blue");
        }

        state.make_move(2, 1, 9, 9).unwrap();
        for id in [1, 2] {
            let lines = drain_all(&mut state, id);
            assert_eq!(lines[0], "MISS ada steve 9 9");
            // Back to the first-turn team: one full round completed.
            assert_eq!(lines[1], "TURN_CHANGE 2 Red");
        }
    }

    #[test]
    fn test_refire_consumes_turn_with_same_outcome() {
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);

        state.make_move(1, 2, 1, 1).unwrap();
        state.make_move(2, 1, 10, 10).unwrap();
        // Same cell again: same HIT outcome, turn still consumed.
        state.make_move(1, 2, 1, 1).unwrap();
        let lines = drain_all(&mut state, 1);
        assert!(lines.contains(&"HIT steve ada 1 1".to_string()));
        assert_eq!(state.current_team(), Some("Blue"));
    }

    #[test]
    fn test_elimination_cascade_and_victory() {
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);

        let cells = fleet_cells();
        for (i, (row, col)) in cells.iter().enumerate() {
            state.make_move(1, 2, *row, *col).unwrap();
            if i + 1 < cells.len() {
                // Keep the rotation going: ada answers with a miss.
                state.make_move(2, 1, 10, 10).unwrap();
            }
        }

        assert!(!state.player(2).unwrap().alive);
        assert!(state.is_over());
        assert_eq!(state.winner(), Some("Red"));

        let lines = drain_all(&mut state, 1);
        let tail: Vec<&String> = lines.iter().rev().take(4).collect();
        // Final shot: HIT, SUNK, ELIM_PLAYER, ELIM_TEAM, GAME_END and no
        // TURN_CHANGE afterwards.
        assert_eq!(tail[0], "GAME_END Red");
        assert_eq!(tail[1], "ELIM_TEAM Red Blue");
        assert_eq!(tail[2], "ELIM_PLAYER steve ada");
        assert!(tail[3].starts_with("SUNK steve ada destroyer"));

        // Terminal: no further moves accepted.
        assert_eq!(state.make_move(2, 1, 1, 1), Err(MoveError::NotYourTurn));
        assert_eq!(state.make_move(1, 2, 1, 1), Err(MoveError::NotYourTurn));
    }

    #[test]
    fn test_victory_only_after_second_of_three_teams_falls() {
        let mut state = started_match(&[
            ("steve", "Red"),
            ("ada", "Blue"),
            ("linus", "Green"),
        ]);

        // Red sinks Blue's fleet; Blue and Green answer with misses at
        // their turns until Blue falls.
        for (row, col) in fleet_cells() {
            state.make_move(1, 2, row, col).unwrap();
            if state.player(2).unwrap().alive {
                state.make_move(2, 1, 10, 10).unwrap();
            }
            state.make_move(3, 1, 10, 10).unwrap();
        }

        assert!(!state.player(2).unwrap().alive);
        assert!(!state.is_over(), "two teams still alive");

        // Rotation now skips the dead team entirely.
        assert_eq!(state.current_team(), Some("Red"));
        state.make_move(1, 3, 10, 10).unwrap();
        assert_eq!(state.current_team(), Some("Green"));

        // Green falls next; only then does Red win.
        state.make_move(3, 1, 10, 9).unwrap();
        for (row, col) in fleet_cells() {
            state.make_move(1, 3, row, col).unwrap();
            if state.player(3).unwrap().alive {
                state.make_move(3, 1, 10, 10).unwrap();
            }
        }
        assert_eq!(state.winner(), Some("Red"));
    }

    #[test]
    fn test_turn_counter_increments_once_per_round() {
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);
        assert_eq!(state.turn_count(), 1);

        state.make_move(1, 2, 10, 10).unwrap();
        assert_eq!(state.turn_count(), 1);
        state.make_move(2, 1, 10, 10).unwrap();
        assert_eq!(state.turn_count(), 2);
        state.make_move(1, 2, 10, 9).unwrap();
        state.make_move(2, 1, 10, 9).unwrap();
        assert_eq!(state.turn_count(), 3);
    }

    #[test]
    fn test_chat_all_reaches_everyone_including_sender() {
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);
        state.queue_chat(1, &ChatScope::All, "good luck");

        for id in [1, 2] {
            let lines = state.player_mut(id).unwrap().take_chat_messages();
            assert_eq!(lines, vec!["[steve (ALL)] good luck".to_string()]);
        }
    }

    #[test]
    fn test_chat_allies_stays_on_team() {
        let mut state = started_match(&[
            ("steve", "Red"),
            ("grace", "Red"),
            ("ada", "Blue"),
        ]);
        state.queue_chat(1, &ChatScope::Allies, "flank left");

        for id in [1, 2] {
            let lines = state.player_mut(id).unwrap().take_chat_messages();
            assert_eq!(lines, vec!["[steve (ALLIES)] flank left".to_string()]);
        }
        assert!(!state.player(3).unwrap().has_chat_messages());
    }

    #[test]
    fn test_chat_enemy_copies_senders_team() {
        let mut state = started_match(&[
            ("steve", "Red"),
            ("grace", "Red"),
            ("ada", "Blue"),
        ]);
        state.queue_chat(
            1,
            &ChatScope::Enemy {
                team: "Blue".to_string(),
            },
            "surrender now",
        );

        let blue = state.player_mut(3).unwrap().take_chat_messages();
        assert_eq!(
            blue,
            vec!["[steve (FROM ENEMY - Blue)] surrender now".to_string()]
        );
        for id in [1, 2] {
            let red = state.player_mut(id).unwrap().take_chat_messages();
            assert_eq!(
                red,
                vec!["[steve (TO ENEMY - Blue)] surrender now".to_string()]
            );
        }
    }

    #[test]
    fn test_match_info_payload() {
        let state = started_match(&[("steve", "Red"), ("ada", "Blue")]);
        let info = state.match_info();

        assert_eq!(info.players, vec![1, 2]);
        assert_eq!(info.first_turn, "Red");
        assert_eq!(info.teams["Red"], vec![1]);
        assert_eq!(info.teams["Blue"], vec![2]);
        assert_eq!(info.roster[&2].username, "ada");
        assert_eq!(info.roster[&2].team, "Blue");
    }

    #[test]
    fn test_shot_outcomes_are_visible_to_board() {
        // A sanity pin for the board contract make_move relies on.
        let mut state = started_match(&[("steve", "Red"), ("ada", "Blue")]);
        let board = &mut state.player_mut(2).unwrap().board;
        assert_eq!(board.fire(Coord::new(1, 1)), Shot::Hit);
        assert_eq!(board.fire(Coord::new(10, 10)), Shot::Miss);
    }
}
