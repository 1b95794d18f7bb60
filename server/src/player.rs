//! Per-player identity, liveness flags, and the two outbound queues.

use crate::board::Board;
use shared::Notification;

/// One admitted player. The two queues are append-only from match logic
/// and drained only by the session that owns this player.
#[derive(Debug)]
pub struct Player {
    pub id: u32,
    pub username: String,
    pub team: String,
    pub alive: bool,
    pub taken_turn: bool,
    pub board: Board,
    state_queue: Vec<Notification>,
    chat_queue: Vec<String>,
}

impl Player {
    pub fn new(id: u32, username: String, team: String) -> Self {
        Self {
            id,
            username,
            team,
            alive: true,
            taken_turn: false,
            board: Board::new(),
            state_queue: Vec::new(),
            chat_queue: Vec::new(),
        }
    }

    pub fn push_state(&mut self, notification: Notification) {
        self.state_queue.push(notification);
    }

    pub fn has_state_updates(&self) -> bool {
        !self.state_queue.is_empty()
    }

    /// Hands over and clears the pending notifications.
    pub fn take_state_updates(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.state_queue)
    }

    pub fn push_chat(&mut self, line: String) {
        self.chat_queue.push(line);
    }

    pub fn has_chat_messages(&self) -> bool {
        !self.chat_queue.is_empty()
    }

    /// Hands over and clears the pending chat lines.
    pub fn take_chat_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.chat_queue)
    }
}
