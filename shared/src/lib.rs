use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const BOARD_SIZE: u8 = 10;

/// Rendered axis labels for row 0 / column 0 of a serialized grid.
pub const ROW_LABELS: [&str; 11] = [
    "+", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J",
];

/// Sentinel datagram closing a chat batch.
pub const SEND_COMPLETE: &str = "SEND COMPLETE";

/// State of one playable board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Ship,
    Hit,
    Miss,
    Sunk,
}

impl Cell {
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Ship => 'S',
            Cell::Hit => 'H',
            Cell::Miss => 'M',
            Cell::Sunk => 'X',
        }
    }
}

/// A playable board coordinate. Rows and columns run 1..=10; index 0 on
/// either axis belongs to the rendered labels, never to a cell.
///
/// Wire form is `row_col`, e.g. `3_7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(&self) -> bool {
        (1..=BOARD_SIZE).contains(&self.row) && (1..=BOARD_SIZE).contains(&self.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.row, self.col)
    }
}

impl FromStr for Coord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s.split_once('_').ok_or(ParseError::BadCoordinate)?;
        let row = row.parse().map_err(|_| ParseError::BadCoordinate)?;
        let col = col.parse().map_err(|_| ParseError::BadCoordinate)?;
        Ok(Coord { row, col })
    }
}

/// The fixed fleet every player places, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::Destroyer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShipKind::Carrier => "carrier",
            ShipKind::Battleship => "battleship",
            ShipKind::Cruiser => "cruiser",
            ShipKind::Submarine => "submarine",
            ShipKind::Destroyer => "destroyer",
        }
    }

    pub fn length(&self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShipKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or(ParseError::UnknownShip)
    }
}

/// Which rendering of another player's board a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView {
    Ally,
    Enemy,
}

/// Chat addressing. `Enemy` delivers to the named team and, so allies see
/// outgoing taunts, to the sender's own team as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatScope {
    All,
    Allies,
    Enemy { team: String },
}

/// One request line from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Join { username: String, team: String },
    PlaceShip { ship: ShipKind, cells: Vec<Coord> },
    Setup,
    SendInfo,
    UpdateGame,
    UpdateChat,
    NewBoard { target: u32, view: BoardView },
    Move { target: u32, row: u8, col: u8 },
    Chat { scope: ChatScope },
    EndGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingArgument,
    BadArgument,
    BadCoordinate,
    UnknownShip,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::Empty => "empty command line",
            ParseError::UnknownCommand => "unknown command",
            ParseError::MissingArgument => "missing argument",
            ParseError::BadArgument => "malformed argument",
            ParseError::BadCoordinate => "malformed coordinate",
            ParseError::UnknownShip => "unknown ship name",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

impl Command {
    /// Parses one request line of the wire grammar.
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or(ParseError::Empty)?;

        match head {
            "JOIN" => {
                let username = tokens.next().ok_or(ParseError::MissingArgument)?;
                let team = tokens.next().ok_or(ParseError::MissingArgument)?;
                Ok(Command::Join {
                    username: username.to_string(),
                    team: team.to_string(),
                })
            }
            "SETUP" => Ok(Command::Setup),
            "SEND" => match tokens.next() {
                Some("INFO") => Ok(Command::SendInfo),
                _ => Err(ParseError::UnknownCommand),
            },
            "UPDATE_GAME" => Ok(Command::UpdateGame),
            "UPDATE_CHAT" => Ok(Command::UpdateChat),
            "NEW_BOARD" => {
                let target = next_number(&mut tokens)?;
                let view = match tokens.next().ok_or(ParseError::MissingArgument)? {
                    "ALLY" => BoardView::Ally,
                    "ENEMY" => BoardView::Enemy,
                    _ => return Err(ParseError::BadArgument),
                };
                Ok(Command::NewBoard { target, view })
            }
            "MOVE" => {
                let target = next_number(&mut tokens)?;
                let row = next_number(&mut tokens)?;
                let col = next_number(&mut tokens)?;
                Ok(Command::Move { target, row, col })
            }
            "CHAT" => {
                let scope = match tokens.next().ok_or(ParseError::MissingArgument)? {
                    "ALL" => ChatScope::All,
                    "ALLIES" => ChatScope::Allies,
                    // Trailing tokens after the team are tolerated; some
                    // front ends echo the sender's own team here.
                    "ENEMY" => ChatScope::Enemy {
                        team: tokens
                            .next()
                            .ok_or(ParseError::MissingArgument)?
                            .to_string(),
                    },
                    _ => return Err(ParseError::BadArgument),
                };
                Ok(Command::Chat { scope })
            }
            "END_GAME" => Ok(Command::EndGame),
            other => {
                // Placement lines lead with a ship name instead of a verb.
                let ship = ShipKind::from_str(other)?;
                let cells = tokens
                    .map(Coord::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                if cells.is_empty() {
                    return Err(ParseError::MissingArgument);
                }
                Ok(Command::PlaceShip { ship, cells })
            }
        }
    }
}

fn next_number<'a, T, I>(tokens: &mut I) -> Result<T, ParseError>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
{
    tokens
        .next()
        .ok_or(ParseError::MissingArgument)?
        .parse()
        .map_err(|_| ParseError::BadArgument)
}

/// One state-change line fanned out to every player's notification queue.
///
/// Rendered forms:
/// `HIT <attacker> <defender> <row> <col>`
/// `MISS <attacker> <defender> <row> <col>`
/// `SUNK <attacker> <defender> <ship> <cell>...`
/// `ELIM_PLAYER <attacker> <defender>`
/// `ELIM_TEAM <attackerTeam> <defenderTeam>`
/// `GAME_END <team>`
/// `TURN_CHANGE <turnNumber> <team>`
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Hit {
        attacker: String,
        defender: String,
        row: u8,
        col: u8,
    },
    Miss {
        attacker: String,
        defender: String,
        row: u8,
        col: u8,
    },
    Sunk {
        attacker: String,
        defender: String,
        ship: ShipKind,
        cells: Vec<Coord>,
    },
    ElimPlayer {
        attacker: String,
        defender: String,
    },
    ElimTeam {
        attacker_team: String,
        defender_team: String,
    },
    GameEnd {
        team: String,
    },
    TurnChange {
        turn: u32,
        team: String,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Hit {
                attacker,
                defender,
                row,
                col,
            } => write!(f, "HIT {} {} {} {}", attacker, defender, row, col),
            Notification::Miss {
                attacker,
                defender,
                row,
                col,
            } => write!(f, "MISS {} {} {} {}", attacker, defender, row, col),
            Notification::Sunk {
                attacker,
                defender,
                ship,
                cells,
            } => {
                write!(f, "SUNK {} {} {}", attacker, defender, ship)?;
                for cell in cells {
                    write!(f, " {}", cell)?;
                }
                Ok(())
            }
            Notification::ElimPlayer { attacker, defender } => {
                write!(f, "ELIM_PLAYER {} {}", attacker, defender)
            }
            Notification::ElimTeam {
                attacker_team,
                defender_team,
            } => write!(f, "ELIM_TEAM {} {}", attacker_team, defender_team),
            Notification::GameEnd { team } => write!(f, "GAME_END {}", team),
            Notification::TurnChange { turn, team } => {
                write!(f, "TURN_CHANGE {} {}", turn, team)
            }
        }
    }
}

impl FromStr for Notification {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let head = tokens.next().ok_or(ParseError::Empty)?;

        match head {
            "HIT" | "MISS" => {
                let attacker = next_word(&mut tokens)?;
                let defender = next_word(&mut tokens)?;
                let row = next_number(&mut tokens)?;
                let col = next_number(&mut tokens)?;
                if head == "HIT" {
                    Ok(Notification::Hit {
                        attacker,
                        defender,
                        row,
                        col,
                    })
                } else {
                    Ok(Notification::Miss {
                        attacker,
                        defender,
                        row,
                        col,
                    })
                }
            }
            "SUNK" => {
                let attacker = next_word(&mut tokens)?;
                let defender = next_word(&mut tokens)?;
                let ship = next_word(&mut tokens)?.parse()?;
                let cells = tokens
                    .map(Coord::from_str)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Notification::Sunk {
                    attacker,
                    defender,
                    ship,
                    cells,
                })
            }
            "ELIM_PLAYER" => Ok(Notification::ElimPlayer {
                attacker: next_word(&mut tokens)?,
                defender: next_word(&mut tokens)?,
            }),
            "ELIM_TEAM" => Ok(Notification::ElimTeam {
                attacker_team: next_word(&mut tokens)?,
                defender_team: next_word(&mut tokens)?,
            }),
            "GAME_END" => Ok(Notification::GameEnd {
                team: next_word(&mut tokens)?,
            }),
            "TURN_CHANGE" => {
                let turn = next_number(&mut tokens)?;
                Ok(Notification::TurnChange {
                    turn,
                    team: next_word(&mut tokens)?,
                })
            }
            _ => Err(ParseError::UnknownCommand),
        }
    }
}

fn next_word<'a, I>(tokens: &mut I) -> Result<String, ParseError>
where
    I: Iterator<Item = &'a str>,
{
    tokens
        .next()
        .map(str::to_string)
        .ok_or(ParseError::MissingArgument)
}

/// Roster entry inside [`MatchInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub username: String,
    pub team: String,
}

/// The `SEND INFO` payload: everything a front end needs to draw the
/// lobby before the first turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchInfo {
    pub players: Vec<u32>,
    pub teams: HashMap<String, Vec<u32>>,
    pub first_turn: String,
    pub roster: HashMap<u32, PlayerInfo>,
}
