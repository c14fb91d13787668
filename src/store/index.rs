use std::collections::HashMap;

use crate::core::position::PositionRecord;
use crate::core::types::{ChildKind, TigId};

use super::store::TigStore;

/// Where a child object is placed: the tig and its index in that tig's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub tig_id: TigId,
    pub child_index: usize,
}

/// Reverse index from child objects to the tigs that contain them
#[derive(Debug, Default)]
pub struct ChildIndex {
    placements: HashMap<(ChildKind, u32), Vec<Placement>>,
}

impl ChildIndex {
    /// Index every child of every tig in `store`
    #[must_use]
    pub fn build(store: &TigStore) -> Self {
        let mut placements: HashMap<(ChildKind, u32), Vec<Placement>> = HashMap::new();

        for tig in store {
            for (child_index, child) in tig.children().iter().enumerate() {
                // Stored tigs are validated, so every child has a kind
                let Some(kind) = child.kind() else { continue };
                placements
                    .entry((kind, child.obj_id))
                    .or_default()
                    .push(Placement {
                        tig_id: tig.tig_id,
                        child_index,
                    });
            }
        }

        Self { placements }
    }

    /// All placements of an object, in store order
    #[must_use]
    pub fn find(&self, kind: ChildKind, obj_id: u32) -> &[Placement] {
        self.placements
            .get(&(kind, obj_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolve a placement to its position record
    #[must_use]
    pub fn resolve<'s>(store: &'s TigStore, placement: Placement) -> Option<&'s PositionRecord> {
        store.get(placement.tig_id)?.child(placement.child_index)
    }

    /// Number of distinct objects indexed
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
