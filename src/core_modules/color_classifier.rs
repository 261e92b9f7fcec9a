// THEORY:
// The `ColorClassifier` is the only place where color becomes meaning. It maps
// the mean color of one cell to a semantic label (`team1`, `team2`, `ball`) or
// to nothing, using an ordered palette of reference colors.
//
// Two matching policies exist:
// 1.  **Distance threshold** (default): Euclidean distance in RGB space to every
//     palette entry; the nearest entry wins if it is strictly closer than the
//     threshold. Equal distances resolve to the earlier palette entry.
// 2.  **Quantized equality**: every channel is divided by a bucket width and
//     rounded; a cell matches an entry when all three buckets agree. When more
//     than one entry matches, the LAST one in palette order wins.
//
// The palette is quantized once when the classifier is built, so the per-cell
// cost is a handful of float operations per palette entry.

use crate::core_modules::pixel::pixel::ColorSample;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 60.0;
pub const DEFAULT_BUCKET_WIDTH: f64 = 32.0;

/// The semantic label a palette color stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Team1,
    Team2,
    Ball,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Team1 => "team1",
            EntityKind::Team2 => "team2",
            EntityKind::Ball => "ball",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference color and the label it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub label: EntityKind,
}

impl PaletteEntry {
    pub fn new(r: u8, g: u8, b: u8, label: EntityKind) -> Self {
        Self { r, g, b, label }
    }

    pub fn sample(&self) -> ColorSample {
        ColorSample::new(self.r as f64, self.g as f64, self.b as f64)
    }
}

/// An ordered list of reference colors. Order matters for tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: PaletteEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The first entry carrying `label`, if any.
    pub fn color_of(&self, label: EntityKind) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.label == label)
    }
}

/// How a cell's mean color is matched against the palette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchPolicy {
    DistanceThreshold { threshold: f64 },
    Quantized { bucket_width: f64 },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::DistanceThreshold {
            threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

impl MatchPolicy {
    pub fn quantized() -> Self {
        MatchPolicy::Quantized {
            bucket_width: DEFAULT_BUCKET_WIDTH,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (name, value) = match *self {
            MatchPolicy::DistanceThreshold { threshold } => ("threshold", threshold),
            MatchPolicy::Quantized { bucket_width } => ("bucket_width", bucket_width),
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(VisionError::InvalidPolicy(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
        Ok(())
    }
}

type Buckets = (i64, i64, i64);

fn quantize(sample: &ColorSample, bucket_width: f64) -> Buckets {
    (
        (sample.r / bucket_width).round() as i64,
        (sample.g / bucket_width).round() as i64,
        (sample.b / bucket_width).round() as i64,
    )
}

/// Maps color samples to labels for one palette and policy.
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    palette: Palette,
    policy: MatchPolicy,
    /// Bucketed palette colors, parallel to `palette`. Empty under the distance policy.
    quantized_palette: Vec<Buckets>,
}

impl ColorClassifier {
    pub fn new(palette: Palette, policy: MatchPolicy) -> Result<Self> {
        if palette.is_empty() {
            return Err(VisionError::EmptyPalette);
        }
        policy.validate()?;

        let quantized_palette = match policy {
            MatchPolicy::Quantized { bucket_width } => palette
                .entries()
                .iter()
                .map(|e| quantize(&e.sample(), bucket_width))
                .collect(),
            MatchPolicy::DistanceThreshold { .. } => Vec::new(),
        };

        Ok(Self {
            palette,
            policy,
            quantized_palette,
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Returns the label for `sample`, or `None` when nothing in the palette matches.
    pub fn classify(&self, sample: &ColorSample) -> Option<EntityKind> {
        match self.policy {
            MatchPolicy::DistanceThreshold { threshold } => self.classify_nearest(sample, threshold),
            MatchPolicy::Quantized { bucket_width } => self.classify_quantized(sample, bucket_width),
        }
    }

    fn classify_nearest(&self, sample: &ColorSample, threshold: f64) -> Option<EntityKind> {
        let mut best: Option<(f64, EntityKind)> = None;
        for entry in self.palette.entries() {
            let distance = sample.distance(&entry.sample());
            // Strict comparison keeps the earlier entry on equal distance.
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, entry.label));
            }
        }
        best.filter(|(distance, _)| *distance < threshold)
            .map(|(_, label)| label)
    }

    fn classify_quantized(&self, sample: &ColorSample, bucket_width: f64) -> Option<EntityKind> {
        let buckets = quantize(sample, bucket_width);
        // Last matching entry in palette order wins.
        self.quantized_palette
            .iter()
            .zip(self.palette.entries())
            .rev()
            .find(|(entry_buckets, _)| **entry_buckets == buckets)
            .map(|(_, entry)| entry.label)
    }
}
