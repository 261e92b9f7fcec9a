// THEORY:
// The `EntityExtractor` gives blobs their meaning. Every blob is projected from
// cell space into pixel space and sorted by label into a `FrameAnalysis`:
// attacking players go into a list, while the defender and the ball are
// singular.
//
// A second `team2` or `ball` blob in one frame is not silently accepted. Only
// the first one in scan order is kept, but the extra one is reported as a
// `ClassificationAnomaly` (and logged at warn level). It almost always means
// the palette or threshold is poorly calibrated for the footage.
//
// `FrameAnalysis` refers to the player in possession by index into `team1`,
// which makes "possession is always a team1 member" true by construction.

use crate::core_modules::color_classifier::EntityKind;
use crate::core_modules::smart_blob::Blob;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A semantic object in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Entity {
    pub fn new(kind: EntityKind, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_blob(blob: &Blob, cell_size: u32) -> Self {
        let (x, y, width, height) = blob.pixel_bounds(cell_size);
        Self::new(blob.label, x, y, width, height)
    }

    /// Center of the bounding box, `(x + width/2, y + height/2)`.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn center_x(&self) -> f64 {
        self.center().0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Euclidean distance between the two centers.
    pub fn distance_to(&self, other: &Entity) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// A warning-level condition found while extracting entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationAnomaly {
    /// More than one blob carried a label that should be unique in a frame.
    /// `discarded` is the entity that was dropped in favor of the first one.
    DuplicateEntity { label: EntityKind, discarded: Entity },
}

/// Everything the pipeline knows about one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub team1: Vec<Entity>,
    pub team2: Option<Entity>,
    pub ball: Option<Entity>,
    /// Index into `team1` of the player nearest the ball.
    pub player_in_possession: Option<usize>,
    /// Index into `team1` of the player with the largest bounding box.
    pub first_attacking_player: Option<usize>,
    pub anomalies: Vec<ClassificationAnomaly>,
}

impl FrameAnalysis {
    pub fn possessor(&self) -> Option<&Entity> {
        self.player_in_possession.and_then(|i| self.team1.get(i))
    }

    pub fn first_attacker(&self) -> Option<&Entity> {
        self.first_attacking_player.and_then(|i| self.team1.get(i))
    }

    /// All recognized entities in order: team1, then team2, then ball.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.team1.iter().chain(self.team2.iter()).chain(self.ball.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Converts blobs into typed entities. Possession is left unset.
pub fn extract(blobs: &[Blob], cell_size: u32) -> FrameAnalysis {
    let mut analysis = FrameAnalysis::default();

    for blob in blobs {
        let entity = Entity::from_blob(blob, cell_size);
        match blob.label {
            EntityKind::Team1 => analysis.team1.push(entity),
            EntityKind::Team2 => keep_first(&mut analysis.team2, entity, &mut analysis.anomalies),
            EntityKind::Ball => keep_first(&mut analysis.ball, entity, &mut analysis.anomalies),
        }
    }

    analysis.first_attacking_player = largest(&analysis.team1);

    debug!(
        team1 = analysis.team1.len(),
        team2 = analysis.team2.is_some(),
        ball = analysis.ball.is_some(),
        "extracted entities from {} blobs",
        blobs.len()
    );
    analysis
}

fn keep_first(slot: &mut Option<Entity>, entity: Entity, anomalies: &mut Vec<ClassificationAnomaly>) {
    let Some(kept) = slot.as_ref() else {
        *slot = Some(entity);
        return;
    };
    warn!(
        label = %entity.kind,
        kept_x = kept.x,
        kept_y = kept.y,
        discarded_x = entity.x,
        discarded_y = entity.y,
        "more than one {} region in frame; check palette calibration",
        entity.kind
    );
    anomalies.push(ClassificationAnomaly::DuplicateEntity {
        label: entity.kind,
        discarded: entity,
    });
}

/// Index of the entity with the largest area; the first one wins on ties.
fn largest(entities: &[Entity]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (index, entity) in entities.iter().enumerate() {
        if best.is_none_or(|(_, area)| entity.area() > area) {
            best = Some((index, entity.area()));
        }
    }
    best.map(|(index, _)| index)
}
