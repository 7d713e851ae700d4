//! Players, teams and the forest character roster.
//!
//! This module contains:
//! - The twelve forest characters players choose from
//! - Player state (position on the track, character, team membership)
//! - Team state, which refers to players by id and derives its position

use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier (index into the session's player list)
pub type PlayerId = u8;

/// Team identifier (0 or 1)
pub type TeamId = u8;

/// Colours used for the two teams
pub const TEAM_COLORS: [u32; 2] = [0x388E3C, 0x66BB6A];

/// A forest animal a player picks in the menu.
///
/// The character doubles as the key for the token animation and the
/// success sound, so it is carried on the player rather than looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Rabbit,
    Bear,
    Fox,
    Frog,
    Squirrel,
    Owl,
    Wolf,
    Deer,
    Bee,
    Butterfly,
    Ladybug,
    Lizard,
}

impl Character {
    /// The full roster in menu order
    pub const ALL: [Character; 12] = [
        Character::Rabbit,
        Character::Bear,
        Character::Fox,
        Character::Frog,
        Character::Squirrel,
        Character::Owl,
        Character::Wolf,
        Character::Deer,
        Character::Bee,
        Character::Butterfly,
        Character::Ladybug,
        Character::Lizard,
    ];

    /// Emoji shown on the token
    pub fn icon(&self) -> &'static str {
        match self {
            Character::Rabbit => "🐰",
            Character::Bear => "🐻",
            Character::Fox => "🦊",
            Character::Frog => "🐸",
            Character::Squirrel => "🐿️",
            Character::Owl => "🦉",
            Character::Wolf => "🐺",
            Character::Deer => "🦌",
            Character::Bee => "🐝",
            Character::Butterfly => "🦋",
            Character::Ladybug => "🐞",
            Character::Lizard => "🦎",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Character::Rabbit => "Rabbit",
            Character::Bear => "Bear",
            Character::Fox => "Fox",
            Character::Frog => "Frog",
            Character::Squirrel => "Squirrel",
            Character::Owl => "Owl",
            Character::Wolf => "Wolf",
            Character::Deer => "Deer",
            Character::Bee => "Bee",
            Character::Butterfly => "Butterfly",
            Character::Ladybug => "Ladybug",
            Character::Lizard => "Lizard",
        }
    }

    /// Plural name, used for team names
    pub fn plural_name(&self) -> &'static str {
        match self {
            Character::Rabbit => "Rabbits",
            Character::Bear => "Bears",
            Character::Fox => "Foxes",
            Character::Frog => "Frogs",
            Character::Squirrel => "Squirrels",
            Character::Owl => "Owls",
            Character::Wolf => "Wolves",
            Character::Deer => "Deer",
            Character::Bee => "Bees",
            Character::Butterfly => "Butterflies",
            Character::Ladybug => "Ladybugs",
            Character::Lizard => "Lizards",
        }
    }

    /// Token colour as an RGB hex code
    pub fn hex_code(&self) -> u32 {
        match self {
            Character::Rabbit => 0x8B9A5B,
            Character::Bear => 0x6B8E23,
            Character::Fox => 0x9ACD32,
            Character::Frog => 0x32CD32,
            Character::Squirrel => 0x7CB342,
            Character::Owl => 0x556B2F,
            Character::Wolf => 0x6B8E23,
            Character::Deer => 0x8FBC8F,
            Character::Bee => 0xADFF2F,
            Character::Butterfly => 0x98FB98,
            Character::Ladybug => 0x90EE90,
            Character::Lizard => 0x7CFC00,
        }
    }

    /// Look a character up by its emoji
    pub fn from_icon(icon: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.icon() == icon)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of a single player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Cell index, always within `0..BOARD_SIZE`
    pub position: usize,
    pub color: u32,
    pub character: Character,
    pub team: Option<TeamId>,
}

impl Player {
    /// Create a player on the start cell
    pub fn new(id: PlayerId, character: Character) -> Self {
        Self {
            id,
            name: character.name().to_string(),
            position: 0,
            color: character.hex_code(),
            character,
            team: None,
        }
    }

    /// Emoji for the token
    pub fn icon(&self) -> &'static str {
        self.character.icon()
    }
}

/// A team in team mode.
///
/// Members are held by id; the session's player list stays the single
/// source of truth for positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: u32,
    /// Member ids in turn order
    pub members: Vec<PlayerId>,
    /// Floor of the mean member position
    pub position: usize,
}

impl Team {
    /// Create a team named after its lead member's character
    pub fn new(id: TeamId, lead: Character, members: Vec<PlayerId>) -> Self {
        Self {
            id,
            name: format!("Team of {}", lead.plural_name()),
            color: TEAM_COLORS[id as usize % TEAM_COLORS.len()],
            members,
            position: 0,
        }
    }

    /// Number of members
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Whether a player belongs to this team
    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    /// Recompute the derived position from the authoritative player list
    pub fn recompute_position(&mut self, players: &[Player]) {
        if self.members.is_empty() {
            self.position = 0;
            return;
        }

        let total: usize = self
            .members
            .iter()
            .filter_map(|id| players.iter().find(|p| p.id == *id))
            .map(|p| p.position)
            .sum();

        self.position = total / self.members.len();
    }
}

/// Split players into two teams by alternating assignment (index mod 2).
///
/// Writes the team id back onto each player.
pub fn partition_into_teams(players: &mut [Player]) -> Vec<Team> {
    let mut teams = Vec::with_capacity(crate::config::TEAM_COUNT);

    for team_index in 0..crate::config::TEAM_COUNT {
        let id = team_index as TeamId;
        let mut members = Vec::new();
        let mut lead = None;

        for player in players.iter_mut().skip(team_index).step_by(crate::config::TEAM_COUNT) {
            player.team = Some(id);
            members.push(player.id);
            lead.get_or_insert(player.character);
        }

        if let Some(lead) = lead {
            teams.push(Team::new(id, lead, members));
        }
    }

    teams
}
