//! Win detection, layered on top of positions.
//!
//! Kept apart from movement so the winner is only captured once the last
//! transition of a turn has committed.

use crate::config::GameMode;
use crate::player::{Player, PlayerId, Team, TeamId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Winner {
    Player(PlayerId),
    Team(TeamId),
}

/// Find the winner, if anyone has reached `goal`.
///
/// In team mode the team of the first member on the goal wins; the team's
/// averaged position is not what counts.
pub fn detect_winner(
    mode: GameMode,
    players: &[Player],
    teams: &[Team],
    goal: usize,
) -> Option<Winner> {
    let finisher = players.iter().find(|p| p.position >= goal)?;

    match mode {
        GameMode::Individual => Some(Winner::Player(finisher.id)),
        GameMode::Teams => teams
            .iter()
            .find(|t| t.contains(finisher.id))
            .map(|t| Winner::Team(t.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{partition_into_teams, Character};

    fn players(positions: &[usize]) -> Vec<Player> {
        positions
            .iter()
            .enumerate()
            .map(|(i, pos)| {
                let mut p = Player::new(i as PlayerId, Character::ALL[i]);
                p.position = *pos;
                p
            })
            .collect()
    }

    #[test]
    fn test_no_winner_below_goal() {
        let players = players(&[3, 28]);
        assert_eq!(detect_winner(GameMode::Individual, &players, &[], 29), None);
    }

    #[test]
    fn test_individual_winner() {
        let players = players(&[3, 29]);
        assert_eq!(
            detect_winner(GameMode::Individual, &players, &[], 29),
            Some(Winner::Player(1))
        );
    }

    #[test]
    fn test_team_wins_through_any_member() {
        let mut players = players(&[0, 0, 0, 29]);
        let mut teams = partition_into_teams(&mut players);
        for team in &mut teams {
            team.recompute_position(&players);
        }

        // team 1 averages 14 but still wins
        assert_eq!(teams[1].position, 14);
        assert_eq!(
            detect_winner(GameMode::Teams, &players, &teams, 29),
            Some(Winner::Team(1))
        );
    }
}
