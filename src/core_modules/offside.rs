// THEORY:
// The `OffsideEvaluator` compares two consecutive frame analyses and decides
// whether a pass was played to a player in an offside position.
//
// The law: a player is offside if, at the moment the ball is played, they are
// nearer to the opponents' goal line than both the ball and the second-last
// opponent. With only two frames of bounding boxes to go on, that becomes:
//
// 1.  **Possession**: find the team1 player nearest the ball in each frame.
// 2.  **Correspondence**: entities are rebuilt every frame, so there is no stable
//     identity. The previous possessor is matched to whichever current team1
//     player is nearest its old center, the same nearest-neighbor association a
//     tracker uses. This is a heuristic, and it breaks down when players cross
//     or move far between frames.
// 3.  **Pass**: if the previous possessor's counterpart is not the current
//     possessor, the ball changed hands and a pass was played.
// 4.  **Position**: the receiver is offside when its center x is strictly beyond
//     both the ball's center x in the previous frame (where the pass was played)
//     and the defender's center x in the current frame, in the direction of
//     attack.
//
// A frame missing its ball, defender or attackers is an error. The evaluator
// never guesses "not offside" when it cannot see the play.

use crate::core_modules::entity::{Entity, FrameAnalysis};
use crate::core_modules::possession::nearest_to_ball;
use crate::error::{FrameRole, RequiredEntity, Result, VisionError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which way along the image x axis the attacking team plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackDirection {
    /// Attacking goal at high x.
    #[default]
    PositiveX,
    /// Attacking goal at low x.
    NegativeX,
}

impl AttackDirection {
    /// True when `a` is strictly further toward the attacking goal than `b`.
    pub fn is_beyond(&self, a: f64, b: f64) -> bool {
        match self {
            AttackDirection::PositiveX => a > b,
            AttackDirection::NegativeX => a < b,
        }
    }
}

/// The full reasoning behind one offside decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsideAssessment {
    pub pass_detected: bool,
    pub is_offside: bool,
    /// The possessor in the previous frame.
    pub passer: Entity,
    /// The possessor in the current frame.
    pub receiver: Entity,
    /// Ball center x in the previous frame.
    pub ball_x_at_pass: f64,
    /// Defender center x in the current frame.
    pub defender_x: f64,
}

/// The ball, defender and possessor of one frame, once presence is checked.
struct Play<'a> {
    team1: &'a [Entity],
    ball: &'a Entity,
    defender: &'a Entity,
    possessor: usize,
}

impl<'a> Play<'a> {
    fn from_analysis(analysis: &'a FrameAnalysis, role: FrameRole) -> Result<Self> {
        if analysis.team1.is_empty() {
            return Err(VisionError::missing(role, RequiredEntity::Team1));
        }
        let ball = analysis
            .ball
            .as_ref()
            .ok_or_else(|| VisionError::missing(role, RequiredEntity::Ball))?;
        let defender = analysis
            .team2
            .as_ref()
            .ok_or_else(|| VisionError::missing(role, RequiredEntity::Defender))?;

        // Use the cached possession only if it is still valid for this analysis.
        let possessor = match analysis.player_in_possession {
            Some(index) if index < analysis.team1.len() => index,
            _ => nearest_to_ball(&analysis.team1, ball)
                .ok_or_else(|| VisionError::missing(role, RequiredEntity::Team1))?,
        };

        Ok(Self {
            team1: &analysis.team1,
            ball,
            defender,
            possessor,
        })
    }

    fn possessor(&self) -> &'a Entity {
        &self.team1[self.possessor]
    }
}

/// Index of the player in `candidates` whose center is nearest `entity`'s center.
fn correspondent(entity: &Entity, candidates: &[Entity]) -> Option<usize> {
    nearest_to_ball(candidates, entity)
}

/// Compares `previous` and `current` (in capture order) and explains the verdict.
pub fn assess(
    previous: &FrameAnalysis,
    current: &FrameAnalysis,
    direction: AttackDirection,
) -> Result<OffsideAssessment> {
    let before = Play::from_analysis(previous, FrameRole::Previous)?;
    let after = Play::from_analysis(current, FrameRole::Current)?;

    let passer = before.possessor();
    let receiver = after.possessor();
    let ball_x_at_pass = before.ball.center_x();
    let defender_x = after.defender.center_x();

    let pass_detected = correspondent(passer, after.team1) != Some(after.possessor);

    let is_offside = pass_detected
        && direction.is_beyond(receiver.center_x(), ball_x_at_pass)
        && direction.is_beyond(receiver.center_x(), defender_x);

    debug!(
        pass_detected,
        is_offside,
        receiver_x = receiver.center_x(),
        ball_x_at_pass,
        defender_x,
        "evaluated frame pair"
    );

    Ok(OffsideAssessment {
        pass_detected,
        is_offside,
        passer: *passer,
        receiver: *receiver,
        ball_x_at_pass,
        defender_x,
    })
}

/// True when a pass between `previous` and `current` found its receiver offside.
pub fn evaluate(
    previous: &FrameAnalysis,
    current: &FrameAnalysis,
    direction: AttackDirection,
) -> Result<bool> {
    assess(previous, current, direction).map(|assessment| assessment.is_offside)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_classifier::EntityKind;
    use crate::error::MissingEntity;

    fn centered(kind: EntityKind, cx: u32, cy: u32) -> Entity {
        Entity::new(kind, cx - 5, cy - 5, 10, 10)
    }

    fn frame(team1: &[(u32, u32)], ball: (u32, u32), defender_x: u32) -> FrameAnalysis {
        FrameAnalysis {
            team1: team1
                .iter()
                .map(|&(x, y)| centered(EntityKind::Team1, x, y))
                .collect(),
            team2: Some(centered(EntityKind::Team2, defender_x, 50)),
            ball: Some(centered(EntityKind::Ball, ball.0, ball.1)),
            ..FrameAnalysis::default()
        }
    }

    #[test]
    fn pass_to_player_beyond_ball_and_defender_is_offside() {
        let previous = frame(&[(30, 50), (70, 20)], (30, 50), 60);
        let current = frame(&[(30, 50), (70, 20)], (65, 20), 60);

        let assessment = assess(&previous, &current, AttackDirection::PositiveX).unwrap();
        assert!(assessment.pass_detected);
        assert!(assessment.is_offside);
        assert_eq!(assessment.ball_x_at_pass, 30.0);
        assert_eq!(assessment.defender_x, 60.0);
        assert_eq!(assessment.receiver.center_x(), 70.0);
    }

    #[test]
    fn same_possessor_is_never_offside() {
        // The possessor ran past the defender with the ball: no pass, no offside.
        let previous = frame(&[(30, 50), (10, 100)], (32, 50), 60);
        let current = frame(&[(65, 50), (10, 100)], (67, 50), 60);

        let assessment = assess(&previous, &current, AttackDirection::PositiveX).unwrap();
        assert!(!assessment.pass_detected);
        assert!(!assessment.is_offside);
    }

    #[test]
    fn receiver_level_with_defender_is_onside() {
        let previous = frame(&[(30, 50), (60, 20)], (30, 50), 60);
        let current = frame(&[(30, 50), (60, 20)], (58, 20), 60);
        assert!(!evaluate(&previous, &current, AttackDirection::PositiveX).unwrap());
    }

    #[test]
    fn receiver_behind_ball_is_onside() {
        let previous = frame(&[(20, 50), (80, 50)], (80, 52), 10);
        let current = frame(&[(20, 50), (80, 50)], (22, 50), 10);
        let assessment = assess(&previous, &current, AttackDirection::PositiveX).unwrap();
        assert!(assessment.pass_detected);
        assert!(!assessment.is_offside);
    }

    #[test]
    fn direction_flips_the_comparison() {
        let previous = frame(&[(70, 50), (20, 20)], (70, 50), 40);
        let current = frame(&[(70, 50), (20, 20)], (25, 20), 40);
        assert!(evaluate(&previous, &current, AttackDirection::NegativeX).unwrap());
        assert!(!evaluate(&previous, &current, AttackDirection::PositiveX).unwrap());
    }

    #[test]
    fn missing_ball_is_an_error() {
        let previous = frame(&[(30, 50)], (30, 50), 60);
        let mut current = frame(&[(30, 50)], (30, 50), 60);
        current.ball = None;
        let err = evaluate(&previous, &current, AttackDirection::PositiveX).unwrap_err();
        assert!(matches!(
            err,
            VisionError::MissingEntity(MissingEntity {
                frame: FrameRole::Current,
                entity: RequiredEntity::Ball
            })
        ));
    }

    #[test]
    fn missing_defender_and_players_are_errors() {
        let mut previous = frame(&[(30, 50)], (30, 50), 60);
        let current = frame(&[(30, 50)], (30, 50), 60);
        previous.team2 = None;
        assert!(matches!(
            evaluate(&previous, &current, AttackDirection::PositiveX),
            Err(VisionError::MissingEntity(MissingEntity {
                frame: FrameRole::Previous,
                entity: RequiredEntity::Defender
            }))
        ));

        previous.team2 = current.team2;
        previous.team1.clear();
        assert!(matches!(
            evaluate(&previous, &current, AttackDirection::PositiveX),
            Err(VisionError::MissingEntity(MissingEntity {
                frame: FrameRole::Previous,
                entity: RequiredEntity::Team1
            }))
        ));
    }

    #[test]
    fn stale_possession_index_is_recomputed() {
        let mut previous = frame(&[(30, 50), (70, 20)], (30, 50), 60);
        previous.player_in_possession = Some(9);
        let current = frame(&[(30, 50), (70, 20)], (65, 20), 60);
        assert!(evaluate(&previous, &current, AttackDirection::PositiveX).unwrap());
    }
}
