//! Blocks that cover and reveal the page.

use crate::anim::TargetId;
use serde::{Deserialize, Serialize};

/// Resting look of a block between animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockBase {
    /// Zero width, page visible.
    Collapsed,
    /// Full width, page covered.
    Expanded,
}

/// One strip of the transition overlay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionBlock {
    pub index: usize,
    pub target: TargetId,
    pub base: BlockBase,
    /// Seconds after the sequence starts that this block starts moving.
    pub stagger_offset: f64,
}

impl TransitionBlock {
    pub fn new(index: usize, target: TargetId, stagger: f64) -> Self {
        Self {
            index,
            target,
            base: BlockBase::Collapsed,
            stagger_offset: index as f64 * stagger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_grows_with_index() {
        let block = TransitionBlock::new(5, TargetId::from_raw(9), 0.02);
        assert!((block.stagger_offset - 0.1).abs() < 1e-12);
        assert_eq!(block.base, BlockBase::Collapsed);
    }
}
