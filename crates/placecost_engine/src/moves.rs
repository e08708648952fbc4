//! Move records: the blocks relocated by one proposed move.

use crate::ids::BlockId;
use crate::netlist::BlockLoc;

/// One relocated block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovedBlock {
    /// The block being moved.
    pub block: BlockId,
    /// Location before the move.
    pub from: BlockLoc,
    /// Proposed location.
    pub to: BlockLoc,
}

/// The set of blocks relocated by one proposed move.
///
/// A record is meant to be reused across iterations: [`clear`](Self::clear)
/// keeps the allocation.
#[derive(Debug, Clone, Default)]
pub struct MoveRecord {
    moved: Vec<MovedBlock>,
}

impl MoveRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block relocation.
    pub fn push(&mut self, block: BlockId, from: BlockLoc, to: BlockLoc) {
        debug_assert!(
            !self.contains(block),
            "block {block} appears twice in one move"
        );
        self.moved.push(MovedBlock { block, from, to });
    }

    /// Removes all relocations.
    pub fn clear(&mut self) {
        self.moved.clear();
    }

    /// The relocated blocks.
    pub fn blocks(&self) -> &[MovedBlock] {
        &self.moved
    }

    /// Number of relocated blocks.
    pub fn len(&self) -> usize {
        self.moved.len()
    }

    /// Returns `true` if no block is relocated.
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
    }

    /// Returns `true` if `block` is relocated by this move.
    pub fn contains(&self, block: BlockId) -> bool {
        self.moved.iter().any(|m| m.block == block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_records_both_blocks() {
        let a = BlockId::from_raw(0);
        let b = BlockId::from_raw(1);
        let la = BlockLoc::new(1, 1, 0);
        let lb = BlockLoc::new(3, 4, 0);
        let mut mv = MoveRecord::new();
        mv.push(a, la, lb);
        mv.push(b, lb, la);
        assert_eq!(mv.len(), 2);
        assert!(mv.contains(a));
        assert!(mv.contains(b));
        assert!(!mv.contains(BlockId::from_raw(2)));
    }

    #[test]
    fn clear_empties_record() {
        let mut mv = MoveRecord::new();
        mv.push(BlockId::from_raw(0), BlockLoc::default(), BlockLoc::new(1, 1, 0));
        mv.clear();
        assert!(mv.is_empty());
    }
}
