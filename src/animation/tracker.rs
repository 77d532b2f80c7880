//! Per-entity sprite animation timing.
//!
//! States live in a slot arena addressed by generational [`AnimHandle`]s; host entity ids map
//! onto handles. A state is created the first time an entity is referenced and discarded when
//! the host removes the entity.

use std::collections::BTreeMap;

use crate::animation::sheet::AnimationSequence;

/// Opaque host entity identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct EntityId(pub u64);

/// Stable arena handle. Stale handles (after removal) never alias a newer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimHandle {
    index: u32,
    generation: u32,
}

/// Mutable playback state of one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationState {
    pub sprite_id: String,
    pub animation: String,
    /// Index within the active sequence.
    pub frame_index: u32,
    /// Time accumulated towards the next frame, in seconds.
    pub elapsed: f64,
    pub playing: bool,
}

impl AnimationState {
    fn new(sprite_id: &str, animation: &str) -> Self {
        Self {
            sprite_id: sprite_id.to_owned(),
            animation: animation.to_owned(),
            frame_index: 0,
            elapsed: 0.0,
            playing: true,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    state: Option<AnimationState>,
}

#[derive(Debug, Default)]
pub struct AnimationTracker {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_entity: BTreeMap<EntityId, AnimHandle>,
}

impl AnimationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    /// Look up or lazily create the state for `entity`.
    ///
    /// Switching sprite or animation name resets the frame index and elapsed time.
    pub fn ensure(&mut self, entity: EntityId, sprite_id: &str, animation: &str) -> AnimHandle {
        let existing = self.by_entity.get(&entity).copied();
        if let Some(handle) = existing
            && let Some(state) = self.state_mut(handle)
        {
            if state.sprite_id != sprite_id || state.animation != animation {
                state.sprite_id = sprite_id.to_owned();
                state.animation = animation.to_owned();
                state.frame_index = 0;
                state.elapsed = 0.0;
            }
            return handle;
        }

        let state = AnimationState::new(sprite_id, animation);
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.state = Some(state);
                AnimHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    state: Some(state),
                });
                AnimHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.by_entity.insert(entity, handle);
        handle
    }

    pub fn handle(&self, entity: EntityId) -> Option<AnimHandle> {
        self.by_entity.get(&entity).copied()
    }

    pub fn get(&self, entity: EntityId) -> Option<&AnimationState> {
        self.handle(entity).and_then(|h| self.state(h))
    }

    pub fn state(&self, handle: AnimHandle) -> Option<&AnimationState> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.state.as_ref()
    }

    fn state_mut(&mut self, handle: AnimHandle) -> Option<&mut AnimationState> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.state.as_mut()
    }

    /// Discard the entity's state immediately.
    pub fn remove(&mut self, entity: EntityId) -> Option<AnimationState> {
        let handle = self.by_entity.remove(&entity)?;
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let state = slot.state.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        state
    }

    /// Pause or resume an entity. Returns `false` when the entity has no state.
    pub fn set_playing(&mut self, entity: EntityId, playing: bool) -> bool {
        match self.handle(entity).and_then(|h| self.state_mut(h)) {
            Some(state) => {
                state.playing = playing;
                true
            }
            None => false,
        }
    }

    /// Advance every playing entity by `dt` seconds.
    ///
    /// `sequence_for(sprite_id, animation)` resolves the active sequence; entities whose
    /// sequence is unknown or static are left untouched.
    pub fn update(
        &mut self,
        dt: f64,
        sequence_for: impl Fn(&str, &str) -> Option<AnimationSequence>,
    ) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for slot in &mut self.slots {
            let Some(state) = slot.state.as_mut() else {
                continue;
            };
            if !state.playing {
                continue;
            }
            let Some(seq) = sequence_for(&state.sprite_id, &state.animation) else {
                continue;
            };
            let Some(period) = seq.frame_period() else {
                continue;
            };

            state.frame_index %= seq.frame_count;
            state.elapsed += dt;
            let steps = (state.elapsed / period).floor();
            if steps >= 1.0 {
                let count = u64::from(seq.frame_count);
                let wraps = if steps.is_finite() {
                    (steps % count as f64) as u64
                } else {
                    0
                };
                state.frame_index = ((u64::from(state.frame_index) + wraps) % count) as u32;
                // NaN when both sides are infinite; `max` maps it to zero.
                state.elapsed = (state.elapsed - steps * period).max(0.0);
            }
        }
    }

    /// Absolute sheet frame for the entity under `seq`, or `None` without state.
    pub fn sheet_frame(&self, entity: EntityId, seq: &AnimationSequence) -> Option<u32> {
        let state = self.get(entity)?;
        let idx = if seq.frame_count == 0 {
            0
        } else {
            state.frame_index % seq.frame_count
        };
        Some(seq.start_frame.saturating_add(idx))
    }

    /// States in entity order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &AnimationState)> {
        self.by_entity
            .iter()
            .filter_map(|(&e, &h)| self.state(h).map(|s| (e, s)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tracker.rs"]
mod tests;
