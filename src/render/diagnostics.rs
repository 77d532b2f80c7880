use std::collections::BTreeSet;

/// A command that did not draw.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SkippedCommand {
    /// Position in the submitted command list.
    pub index: usize,
    pub reason: String,
}

/// A viewport that rendered as nothing, or only partly.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DegradedViewport {
    pub id: String,
    pub reason: String,
}

/// Everything a frame degraded on instead of failing.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameDiagnostics {
    pub commands_total: usize,
    pub commands_drawn: usize,
    pub skipped: Vec<SkippedCommand>,
    /// Sprite ids that painted a placeholder.
    pub missing_sprites: BTreeSet<String>,
    pub degraded_viewports: Vec<DegradedViewport>,
    /// Text primitives drawn as placeholder bars.
    pub text_fallbacks: usize,
    pub mask_cache_hits: u64,
    pub mask_cache_misses: u64,
}

impl FrameDiagnostics {
    pub(crate) fn skip(&mut self, index: usize, kind: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(index, kind, reason = %reason, "draw command skipped");
        self.skipped.push(SkippedCommand { index, reason });
    }

    pub(crate) fn missing_sprite(&mut self, id: &str) {
        if self.missing_sprites.insert(id.to_owned()) {
            tracing::warn!(sprite = id, "sprite not resolved; drawing placeholder");
        }
    }

    pub(crate) fn degraded_viewport(&mut self, id: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(viewport = id, reason = %reason, "viewport degraded");
        self.degraded_viewports.push(DegradedViewport {
            id: id.to_owned(),
            reason,
        });
    }

    /// Number of distinct fallbacks taken this frame.
    pub fn degradation_count(&self) -> usize {
        self.skipped.len()
            + self.missing_sprites.len()
            + self.degraded_viewports.len()
            + self.text_fallbacks
    }

    pub fn is_clean(&self) -> bool {
        self.degradation_count() == 0
    }
}
