//! Draw calls
//!
//! A draw call is one contiguous run of indices sharing brush and scissor.

use crate::brush::{Brush, Scissor};

/// One contiguous run of triangles submitted to the backend in a single call
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawCall {
    /// Number of indices (always a multiple of 3)
    pub element_count: u32,
    pub brush: Brush,
    pub scissor: Scissor,
}

impl DrawCall {
    pub fn new(brush: Brush, scissor: Scissor) -> Self {
        Self {
            element_count: 0,
            brush,
            scissor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    pub fn triangle_count(&self) -> u32 {
        self.element_count / 3
    }
}
