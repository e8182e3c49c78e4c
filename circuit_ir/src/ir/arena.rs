//! Append-only storage behind gate and metadata handles.
//!
//! A circuit never frees a single gate: deletion retires it in place as a
//! `NOP`, so every handle handed out stays dereferenceable until the circuit
//! itself is dropped. Edges therefore store [`Id`]s instead of references and
//! survive any growth of the backing vector.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

// =============================================================================
// Handles
// =============================================================================

/// Index of an item in an [`Arena<T>`].
///
/// `T` only tags the handle so a [`GateId`](super::GateId) cannot be passed
/// where a [`MetaRef`](super::MetaRef) is expected.
pub struct Id<T> {
    index: u32,
    _tag: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Id {
            index,
            _tag: PhantomData,
        }
    }

    /// Allocation position, also the number printed in dumps.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.index as usize
    }
}

// Derives would demand the same traits of `T`.
impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Append-only vector addressed by [`Id`].
#[derive(Debug, Clone)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Store `item`; its handle is its position.
    #[inline]
    pub fn alloc(&mut self, item: T) -> Id<T> {
        self.alloc_with(|_| item)
    }

    /// Store an item built from the handle it is about to receive.
    ///
    /// Gates record their own id, so the id must exist before the gate does.
    pub fn alloc_with(&mut self, make: impl FnOnce(Id<T>) -> T) -> Id<T> {
        let id = Id::new(self.items.len() as u32);
        self.items.push(make(id));
        id
    }

    /// `None` for a handle minted by another arena past this one's end.
    #[inline]
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.items.get(id.as_usize())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every handle ever issued, retired items included.
    pub fn ids(&self) -> impl Iterator<Item = Id<T>> {
        (0..self.items.len() as u32).map(Id::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.ids().zip(self.items.iter())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

impl<T> Index<Id<T>> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: Id<T>) -> &T {
        &self.items[id.as_usize()]
    }
}

impl<T> IndexMut<Id<T>> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.items[id.as_usize()]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_follow_allocation_order() {
        let mut arena: Arena<&str> = Arena::with_capacity(2);
        let a = arena.alloc("state");
        let b = arena.alloc("depend");

        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(arena[b], "depend");
        arena[a] = "root";
        assert_eq!(arena.get(a), Some(&"root"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_alloc_with_sees_own_id() {
        struct Slot(Id<Slot>, u8);

        let mut arena: Arena<Slot> = Arena::with_capacity(0);
        arena.alloc(Slot(Id::new(99), 0));

        let id = arena.alloc_with(|id| Slot(id, 1));
        assert_eq!(arena[id].0, id);
        assert_eq!(id.to_string(), "1");
        assert_eq!(format!("{id:?}"), "#1");
    }

    #[test]
    fn test_ids_survive_growth_past_capacity() {
        let mut arena: Arena<u32> = Arena::with_capacity(1);
        let first = arena.alloc(7);
        for value in 0..32 {
            arena.alloc(value);
        }

        assert_eq!(arena[first], 7);
        assert_eq!(arena.ids().count(), 33);
        let paired: Vec<_> = arena.iter().take(2).map(|(id, v)| (id.index(), *v)).collect();
        assert_eq!(paired, vec![(0, 7), (1, 0)]);
    }

    #[test]
    fn test_values_mut_touches_every_item() {
        let mut arena: Arena<u32> = Arena::with_capacity(3);
        for value in 1..=3 {
            arena.alloc(value);
        }
        arena.values_mut().for_each(|v| *v = 0);
        assert!(arena.iter().all(|(_, v)| *v == 0));
        assert!(arena.get(Id::new(3)).is_none());
        assert!(!arena.is_empty());
    }
}
