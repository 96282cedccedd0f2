use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::object::HostObject;

/// Generational reference to an object owned by an [`ObjectArena`].
///
/// A handle outlives the object it points to: once the slot is reclaimed
/// and reused, the generation no longer matches and lookups return `None`.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owner of every host object of type `T`.
///
/// Objects are never freed directly. Marking one pending-kill through its
/// [`ObjectHeader`](crate::ObjectHeader) makes it invalid immediately; the
/// memory is released by the next [`collect_garbage`](Self::collect_garbage).
pub struct ObjectArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for ObjectArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T: HostObject> ObjectArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `value` and return a handle to it.
    pub fn create(&mut self, value: T) -> Handle<T> {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).expect("object arena exhausted");
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::new(index, 0)
    }

    /// Resolve a handle. Pending-kill objects still resolve until swept.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// True while the object exists and has not been marked pending-kill.
    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        self.get(handle)
            .is_some_and(|object| !object.header().is_pending_kill())
    }

    /// True if the object is logically dead but not yet reclaimed.
    pub fn is_pending_kill(&self, handle: Handle<T>) -> bool {
        self.get(handle)
            .is_some_and(|object| object.header().is_pending_kill())
    }

    /// Objects still held in memory, including ones pending reclamation.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u32, slot.generation), value))
        })
    }

    /// Sweep: drop every pending-kill object that is not rooted.
    ///
    /// Returns the number of objects reclaimed. Their handles resolve to
    /// `None` from here on.
    pub fn collect_garbage(&mut self) -> usize {
        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let dead = slot.value.as_ref().is_some_and(|object| {
                object.header().is_pending_kill() && !object.header().is_rooted()
            });
            if !dead {
                continue;
            }

            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index as u32);
            reclaimed += 1;
        }

        self.live -= reclaimed;
        tracing::debug!(reclaimed, live = self.live, "Garbage collection sweep finished");
        reclaimed
    }
}
