use std::collections::BTreeMap;

use crate::foundation::error::{IsoError, IsoResult};

/// A named run of frames inside a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSequence {
    /// First sheet frame of the sequence.
    pub start_frame: u32,
    /// Number of frames; the sequence index stays in `[0, frame_count)`.
    pub frame_count: u32,
    /// Playback rate. `0` means a static sequence that never advances.
    #[serde(default)]
    pub fps: f64,
}

impl AnimationSequence {
    /// Duration of one frame, or `None` when the sequence never advances.
    pub fn frame_period(&self) -> Option<f64> {
        if self.frame_count == 0 || !self.fps.is_finite() || self.fps <= 0.0 {
            return None;
        }
        Some(1.0 / self.fps)
    }
}

/// Per-sprite table of named sequences.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AnimationDef {
    sequences: BTreeMap<String, AnimationSequence>,
}

impl AnimationDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{ "name": { "start_frame": .., "frame_count": .., "fps": .. } }` table.
    pub fn from_json(s: &str) -> IsoResult<Self> {
        let def: Self = serde_json::from_str(s)
            .map_err(|e| IsoError::serde(format!("parse animation table: {e}")))?;
        for (name, seq) in &def.sequences {
            if seq.frame_count == 0 {
                return Err(IsoError::validation(format!(
                    "animation '{name}' must have frame_count > 0"
                )));
            }
        }
        Ok(def)
    }

    pub fn with(mut self, name: impl Into<String>, seq: AnimationSequence) -> Self {
        self.insert(name, seq);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, seq: AnimationSequence) {
        self.sequences.insert(name.into(), seq);
    }

    pub fn get(&self, name: &str) -> Option<&AnimationSequence> {
        self.sequences.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }
}
