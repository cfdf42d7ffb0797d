//! Object Registry
//!
//! Generational arena holding every object on the active screen.
//!
//! The live sequence (insertion order = update/draw order) is only ever
//! mutated in [`ObjectRegistry::post_update`]. Everything else stages:
//! additions go to `to_add`, removals to `to_remove`, and both are applied
//! at the frame boundary (removals first, then additions).
//!
//! Handles are `(index, generation)` pairs. A slot is recycled with a bumped
//! generation once its object is removed, so a stale handle resolves to
//! nothing instead of aliasing the slot's next occupant.

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::entity::{Entity, EntityTag};

// =============================================================================
// ENTITY ID
// =============================================================================

/// Handle to an object in the registry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Slot index.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// SLOTS
// =============================================================================

#[derive(Debug)]
struct Slot {
    generation: u32,
    /// Kind of the occupant, kept here so it can be matched while the
    /// occupant itself is checked out.
    tag: Option<EntityTag>,
    /// `None` when the slot is free or the entity is checked out.
    entity: Option<Entity>,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Staged, handle-based object store for one screen.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: Vec<EntityId>,
    to_add: Vec<EntityId>,
    to_remove: Vec<EntityId>,
    modified: bool,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an object for insertion.
    ///
    /// The object gets a slot (and a usable handle) immediately, but it is not
    /// part of the live sequence until the next [`post_update`](Self::post_update).
    pub fn add(&mut self, entity: Entity) -> EntityId {
        let tag = entity.tag();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.tag = Some(tag);
                slot.entity = Some(entity);
                EntityId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    tag: Some(tag),
                    entity: Some(entity),
                });
                EntityId { index, generation: 0 }
            }
        };

        debug!(%id, ?tag, "staged add");
        self.to_add.push(id);
        self.modified = true;
        id
    }

    /// Stage an object for removal. Staging the same object twice is a no-op.
    pub fn remove(&mut self, id: EntityId) {
        if self.to_remove.contains(&id) {
            return;
        }
        debug!(%id, "staged remove");
        self.to_remove.push(id);
        self.modified = true;
    }

    /// Stage every live object of the given kind for removal.
    pub fn remove_all_instances_of(&mut self, tag: EntityTag) {
        let matching: Vec<EntityId> = self
            .live
            .iter()
            .copied()
            .filter(|id| self.tag_of(*id) == Some(tag))
            .collect();

        for id in matching {
            self.remove(id);
        }
    }

    /// Whether the object is waiting to be removed at the next frame boundary.
    pub fn marked_for_removal(&self, id: EntityId) -> bool {
        self.to_remove.contains(&id)
    }

    /// Apply staged removals, then staged additions, and clear both queues.
    ///
    /// Removing an object that is not live does nothing, so an object added and
    /// removed within the same frame becomes live.
    pub fn post_update(&mut self) {
        for id in std::mem::take(&mut self.to_remove) {
            let Some(pos) = self.live.iter().position(|live| *live == id) else {
                continue;
            };
            self.live.remove(pos);

            let slot = &mut self.slots[id.index as usize];
            slot.entity = None;
            slot.tag = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }

        for id in std::mem::take(&mut self.to_add) {
            if self.is_current(id) && !self.live.contains(&id) {
                self.live.push(id);
            }
        }

        self.modified = false;
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    fn is_current(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.tag.is_some())
    }

    /// Borrow an object (live or staged for addition).
    ///
    /// Returns `None` for stale handles and for objects that are currently
    /// checked out with [`take`](Self::take).
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    /// Mutably borrow an object.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Kind of the object behind a handle, even while it is checked out.
    pub fn tag_of(&self, id: EntityId) -> Option<EntityTag> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.tag
    }

    /// Check an object out of its slot so it can be mutated alongside the registry.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.take()
    }

    /// Return an object checked out with [`take`](Self::take).
    pub fn restore(&mut self, id: EntityId, entity: Entity) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            if slot.generation == id.generation && slot.entity.is_none() {
                slot.entity = Some(entity);
            }
        }
    }

    /// Whether the object is in the live sequence.
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    /// Live handles in update/draw order.
    pub fn live_ids(&self) -> &[EntityId] {
        &self.live
    }

    /// Handles staged for addition.
    pub fn pending_additions(&self) -> &[EntityId] {
        &self.to_add
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the live sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether anything was staged since the last frame boundary.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Live objects in order, skipping any that are checked out.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.live
            .iter()
            .filter_map(move |id| self.get(*id).map(|entity| (*id, entity)))
    }

    /// Count live objects of a kind.
    pub fn count_of(&self, tag: EntityTag) -> usize {
        self.live
            .iter()
            .filter(|id| self.tag_of(**id) == Some(tag))
            .count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
