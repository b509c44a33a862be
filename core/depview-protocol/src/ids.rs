use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Opaque handle to a terminal node inside a parser-owned tree.
///
/// The graph stores and hands these back but never dereferences them; only
/// the backend that issued a handle knows what it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(transparent)]
pub struct TreeNodeId(pub u32);

impl TreeNodeId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TreeNodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TreeNodeId> for u32 {
    fn from(id: TreeNodeId) -> u32 {
        id.0
    }
}
