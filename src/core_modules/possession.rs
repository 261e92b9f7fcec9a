// THEORY:
// Possession is the simplest possible model: the team1 player whose center is
// nearest the ball's center has the ball. It is a single linear scan with a
// strict comparison, so equal distances resolve to the player found first.
// Without a ball there is no possession.

use crate::core_modules::entity::{Entity, FrameAnalysis};
use tracing::debug;

/// Index of the player in `players` nearest to `ball`; the first wins on ties.
pub fn nearest_to_ball(players: &[Entity], ball: &Entity) -> Option<usize> {
    let mut closest: Option<(usize, f64)> = None;
    for (index, player) in players.iter().enumerate() {
        let distance = player.distance_to(ball);
        if closest.is_none_or(|(_, best)| distance < best) {
            closest = Some((index, distance));
        }
    }
    closest.map(|(index, _)| index)
}

/// Fills in `player_in_possession`.
pub fn resolve(mut analysis: FrameAnalysis) -> FrameAnalysis {
    analysis.player_in_possession = analysis
        .ball
        .as_ref()
        .and_then(|ball| nearest_to_ball(&analysis.team1, ball));

    if let Some(player) = analysis.possessor() {
        debug!(x = player.x, y = player.y, "resolved possession");
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_classifier::EntityKind;

    /// A 10x10 entity centered on (`cx`, `cy`).
    fn centered(kind: EntityKind, cx: u32, cy: u32) -> Entity {
        Entity::new(kind, cx - 5, cy - 5, 10, 10)
    }

    #[test]
    fn nearest_player_gets_the_ball() {
        let analysis = FrameAnalysis {
            team1: vec![
                centered(EntityKind::Team1, 40, 50),
                centered(EntityKind::Team1, 100, 100),
            ],
            ball: Some(centered(EntityKind::Ball, 50, 50)),
            ..FrameAnalysis::default()
        };
        let resolved = resolve(analysis);
        assert_eq!(resolved.player_in_possession, Some(0));
        assert_eq!(resolved.possessor().map(Entity::center), Some((40.0, 50.0)));
    }

    #[test]
    fn no_ball_no_possession() {
        let analysis = FrameAnalysis {
            team1: vec![centered(EntityKind::Team1, 40, 50)],
            ..FrameAnalysis::default()
        };
        assert_eq!(resolve(analysis).player_in_possession, None);
    }

    #[test]
    fn equal_distance_goes_to_first_player() {
        let players = [
            centered(EntityKind::Team1, 40, 50),
            centered(EntityKind::Team1, 60, 50),
        ];
        let ball = centered(EntityKind::Ball, 50, 50);
        assert_eq!(nearest_to_ball(&players, &ball), Some(0));
    }

    #[test]
    fn no_players_no_possession() {
        let ball = centered(EntityKind::Ball, 50, 50);
        assert_eq!(nearest_to_ball(&[], &ball), None);
    }
}
