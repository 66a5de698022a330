//! Draw-call batching
//!
//! Triangles are appended in submission order. Consecutive runs sharing the
//! same rendering-state hash (brush + scissor) are merged into one
//! [`DrawCall`]; a state change or an explicit split request starts a new
//! call. Only the single placeholder left by [`DrawCallBatcher::reset`] can
//! ever be empty, and it is never exposed.

use std::hash::{Hash, Hasher};

use prowl_core::{Brush, DrawCall, Scissor};
use rustc_hash::FxHasher;

/// Hash of everything a draw call's GPU state depends on
pub fn state_hash(brush: &Brush, scissor: &Scissor) -> u64 {
    let mut hasher = FxHasher::default();
    scissor.hash(&mut hasher);
    brush.hash(&mut hasher);
    hasher.finish()
}

/// Which paint of the current state a triangle run uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintRole {
    Fill,
    Stroke,
}

/// Lazily computed state hashes, dropped on every state change
#[derive(Clone, Copy, Debug, Default)]
pub struct StateHashCache {
    fill: Option<u64>,
    stroke: Option<u64>,
}

impl StateHashCache {
    pub fn get_or_compute(&mut self, role: PaintRole, compute: impl FnOnce() -> u64) -> u64 {
        let slot = match role {
            PaintRole::Fill => &mut self.fill,
            PaintRole::Stroke => &mut self.stroke,
        };
        *slot.get_or_insert_with(compute)
    }

    pub fn invalidate(&mut self) {
        self.fill = None;
        self.stroke = None;
    }

    #[cfg(test)]
    fn is_cached(&self, role: PaintRole) -> bool {
        match role {
            PaintRole::Fill => self.fill.is_some(),
            PaintRole::Stroke => self.stroke.is_some(),
        }
    }
}

/// Ordered list of draw calls for one frame
#[derive(Debug)]
pub struct DrawCallBatcher {
    calls: Vec<DrawCall>,
    /// State hash of the last call; `None` for the fresh placeholder
    current_hash: Option<u64>,
    force_split: bool,
}

impl Default for DrawCallBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawCallBatcher {
    pub fn new() -> Self {
        Self {
            calls: vec![DrawCall::default()],
            current_hash: None,
            force_split: false,
        }
    }

    /// Start a new frame, keeping the list's allocation
    pub fn reset(&mut self) {
        self.calls.clear();
        self.calls.push(DrawCall::default());
        self.current_hash = None;
        self.force_split = false;
    }

    /// Make the next triangles start a new draw call even if state matches
    pub fn request_new_draw_call(&mut self) {
        self.force_split = true;
    }

    /// Account for `element_count` more indices drawn with the given state
    pub fn add_elements(
        &mut self,
        element_count: u32,
        hash: u64,
        brush: &Brush,
        scissor: &Scissor,
    ) {
        if element_count == 0 {
            return;
        }
        debug_assert_eq!(element_count % 3, 0);

        let force = std::mem::take(&mut self.force_split);
        let same_state = self.current_hash == Some(hash);

        match self.calls.last_mut() {
            Some(call) if same_state && !force => {
                call.element_count += element_count;
            }
            Some(call) if call.is_empty() => {
                tracing::trace!(hash, "retargeting empty draw call");
                call.brush = brush.clone();
                call.scissor = *scissor;
                call.element_count = element_count;
                self.current_hash = Some(hash);
            }
            _ => {
                tracing::trace!(
                    hash,
                    calls = self.calls.len(),
                    forced = force,
                    "splitting draw call"
                );
                let mut call = DrawCall::new(brush.clone(), *scissor);
                call.element_count = element_count;
                self.calls.push(call);
                self.current_hash = Some(hash);
            }
        }
    }

    /// Non-empty draw calls in submission order
    pub fn calls(&self) -> &[DrawCall] {
        match self.calls.last() {
            Some(last) if last.is_empty() => &self.calls[..self.calls.len() - 1],
            _ => &self.calls,
        }
    }

    /// Total indices across all draw calls
    pub fn element_count(&self) -> u64 {
        self.calls.iter().map(|c| c.element_count as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prowl_core::{Affine2D, Color};

    fn solid(color: Color) -> (Brush, u64) {
        let brush = Brush::solid(color);
        let hash = state_hash(&brush, &Scissor::DISABLED);
        (brush, hash)
    }

    #[test]
    fn test_fresh_batcher_exposes_no_calls() {
        let batcher = DrawCallBatcher::new();
        assert!(batcher.calls().is_empty());
        assert_eq!(batcher.element_count(), 0);
    }

    #[test]
    fn test_same_state_extends_call() {
        let mut batcher = DrawCallBatcher::new();
        let (red, hash) = solid(Color::RED);
        batcher.add_elements(6, hash, &red, &Scissor::DISABLED);
        batcher.add_elements(6, hash, &red, &Scissor::DISABLED);
        assert_eq!(batcher.calls().len(), 1);
        assert_eq!(batcher.calls()[0].element_count, 12);
        assert_eq!(batcher.calls()[0].brush, red);
    }

    #[test]
    fn test_state_change_splits() {
        let mut batcher = DrawCallBatcher::new();
        let (red, red_hash) = solid(Color::RED);
        let (blue, blue_hash) = solid(Color::BLUE);
        batcher.add_elements(12, red_hash, &red, &Scissor::DISABLED);
        batcher.add_elements(6, blue_hash, &blue, &Scissor::DISABLED);
        batcher.add_elements(3, red_hash, &red, &Scissor::DISABLED);

        let counts: Vec<u32> = batcher.calls().iter().map(|c| c.element_count).collect();
        assert_eq!(counts, vec![12, 6, 3]);
        assert_eq!(batcher.element_count(), 21);
    }

    #[test]
    fn test_forced_split_only_after_triangles() {
        let mut batcher = DrawCallBatcher::new();
        let (red, hash) = solid(Color::RED);

        // Nothing drawn yet: the placeholder is reused
        batcher.request_new_draw_call();
        batcher.add_elements(3, hash, &red, &Scissor::DISABLED);
        assert_eq!(batcher.calls().len(), 1);

        batcher.request_new_draw_call();
        batcher.add_elements(3, hash, &red, &Scissor::DISABLED);
        assert_eq!(batcher.calls().len(), 2);

        // The request is consumed
        batcher.add_elements(3, hash, &red, &Scissor::DISABLED);
        assert_eq!(batcher.calls().len(), 2);
    }

    #[test]
    fn test_scissor_is_part_of_state() {
        let brush = Brush::solid(Color::RED);
        let clipped = Scissor::new(&Affine2D::IDENTITY, 0.0, 0.0, 10.0, 10.0);
        assert_ne!(
            state_hash(&brush, &Scissor::DISABLED),
            state_hash(&brush, &clipped)
        );
    }

    #[test]
    fn test_zero_elements_are_ignored() {
        let mut batcher = DrawCallBatcher::new();
        let (red, hash) = solid(Color::RED);
        batcher.request_new_draw_call();
        batcher.add_elements(0, hash, &red, &Scissor::DISABLED);
        assert!(batcher.calls().is_empty());
    }

    #[test]
    fn test_reset_restores_placeholder() {
        let mut batcher = DrawCallBatcher::new();
        let (red, hash) = solid(Color::RED);
        batcher.add_elements(3, hash, &red, &Scissor::DISABLED);
        batcher.reset();
        assert!(batcher.calls().is_empty());
        batcher.add_elements(3, hash, &red, &Scissor::DISABLED);
        assert_eq!(batcher.calls().len(), 1);
    }

    #[test]
    fn test_hash_cache_invalidation() {
        let mut cache = StateHashCache::default();
        let mut computed = 0;
        let mut compute = || {
            computed += 1;
            42
        };
        assert_eq!(cache.get_or_compute(PaintRole::Fill, &mut compute), 42);
        assert_eq!(cache.get_or_compute(PaintRole::Fill, &mut compute), 42);
        assert!(!cache.is_cached(PaintRole::Stroke));
        cache.invalidate();
        assert!(!cache.is_cached(PaintRole::Fill));
        cache.get_or_compute(PaintRole::Fill, &mut compute);
        assert_eq!(computed, 2);
    }
}
