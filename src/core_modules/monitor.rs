// THEORY:
// The core stages are stateless, but a live feed needs someone to remember the
// previous frame. The `OffsideMonitor` is that memory, kept outside the core
// so the core stays pure. It holds the most recent analysis it was given,
// evaluates each new one against it, and then replaces it with the new one,
// whether or not the pair could be evaluated.
//
// Failure handling follows a "skip and continue" policy: a frame that cannot be
// evaluated (no ball visible, say) produces an error report but does not poison
// the stream. The pairing simply moves on to the newest frame. Callers that drop
// frames upstream should call `reset` so a stale frame is never paired with a
// much later one.

use crate::core_modules::entity::FrameAnalysis;
use crate::core_modules::offside::{AttackDirection, OffsideAssessment, assess};
use crate::error::{Result, VisionError};
use tracing::{info, warn};

/// The outcome of feeding one frame to the monitor.
#[derive(Debug)]
pub enum Report {
    /// The first frame of a sequence, or the first after a reset.
    Baseline,
    /// The frame was compared with its predecessor.
    Evaluated(OffsideAssessment),
    /// The pair could not be evaluated; the new frame becomes the baseline.
    Skipped(VisionError),
}

impl Report {
    pub fn is_offside(&self) -> bool {
        matches!(self, Report::Evaluated(a) if a.is_offside)
    }
}

/// Pairs consecutive frame analyses and evaluates each pair.
#[derive(Debug, Default)]
pub struct OffsideMonitor {
    direction: AttackDirection,
    previous: Option<FrameAnalysis>,
    frames_seen: u64,
    offside_count: u64,
}

impl OffsideMonitor {
    pub fn new(direction: AttackDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Feeds the next analysis in capture order.
    pub fn push(&mut self, current: FrameAnalysis) -> Report {
        self.frames_seen += 1;
        let report = match self.previous.take() {
            None => Report::Baseline,
            Some(previous) => match self.compare(&previous, &current) {
                Ok(assessment) => Report::Evaluated(assessment),
                Err(err) => {
                    warn!(frame = self.frames_seen, "skipping frame pair: {err}");
                    Report::Skipped(err)
                }
            },
        };

        if report.is_offside() {
            self.offside_count += 1;
            info!(frame = self.frames_seen, "offside detected");
        }

        self.previous = Some(current);
        report
    }

    fn compare(&self, previous: &FrameAnalysis, current: &FrameAnalysis) -> Result<OffsideAssessment> {
        assess(previous, current, self.direction)
    }

    /// Forgets the previous frame.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn offside_count(&self) -> u64 {
        self.offside_count
    }

    pub fn previous(&self) -> Option<&FrameAnalysis> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_classifier::EntityKind;
    use crate::core_modules::entity::Entity;

    fn centered(kind: EntityKind, cx: u32, cy: u32) -> Entity {
        Entity::new(kind, cx - 5, cy - 5, 10, 10)
    }

    fn frame(ball: Option<(u32, u32)>) -> FrameAnalysis {
        FrameAnalysis {
            team1: vec![
                centered(EntityKind::Team1, 30, 50),
                centered(EntityKind::Team1, 70, 20),
            ],
            team2: Some(centered(EntityKind::Team2, 60, 50)),
            ball: ball.map(|(x, y)| centered(EntityKind::Ball, x, y)),
            ..FrameAnalysis::default()
        }
    }

    #[test]
    fn first_frame_is_baseline() {
        let mut monitor = OffsideMonitor::default();
        assert!(matches!(monitor.push(frame(Some((30, 50)))), Report::Baseline));
        assert_eq!(monitor.frames_seen(), 1);
    }

    #[test]
    fn pass_is_reported_and_counted() {
        let mut monitor = OffsideMonitor::new(AttackDirection::PositiveX);
        monitor.push(frame(Some((30, 50))));
        let report = monitor.push(frame(Some((65, 20))));
        assert!(report.is_offside());
        assert_eq!(monitor.offside_count(), 1);
    }

    #[test]
    fn unusable_frame_is_skipped_and_stream_continues() {
        let mut monitor = OffsideMonitor::default();
        monitor.push(frame(Some((30, 50))));
        let report = monitor.push(frame(None));
        assert!(matches!(report, Report::Skipped(VisionError::MissingEntity(_))));

        // The ball-less frame is now the baseline, so this pair also fails.
        assert!(matches!(monitor.push(frame(Some((30, 50)))), Report::Skipped(_)));
        // Back to normal.
        assert!(monitor.push(frame(Some((65, 20)))).is_offside());
    }

    #[test]
    fn reset_restarts_pairing() {
        let mut monitor = OffsideMonitor::default();
        monitor.push(frame(Some((30, 50))));
        monitor.reset();
        assert!(monitor.previous().is_none());
        assert!(matches!(monitor.push(frame(Some((65, 20)))), Report::Baseline));
    }
}
