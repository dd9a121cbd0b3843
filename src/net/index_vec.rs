//! Typed arena backing the net collections.
//!
//! Every collection keeps its handles dense: the only way to shrink an
//! [`IndexVec`] is [`IndexVec::swap_remove`], which moves the last slot into the
//! freed one and reports the handle that moved so callers can rewrite
//! references to it. Handles carry the [`NetTag`] of their collection and a
//! handle with a foreign tag is treated like an out-of-range one.
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::net::ids::NetTag;

/// Trait implemented by identifier types that can index into [`IndexVec`].
pub trait Idx: Copy + Eq + PartialEq + Ord + fmt::Debug {
    fn index(self) -> usize;
    fn owner(self) -> NetTag;
    fn from_parts(owner: NetTag, idx: usize) -> Self;
}

/// A vector indexed by strongly typed identifiers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IndexVec<I, T> {
    owner: NetTag,
    data: Vec<T>,
    _marker: PhantomData<I>,
}

/// Outcome of [`IndexVec::swap_remove`].
#[derive(Debug)]
pub struct SwapRemoved<I, T> {
    pub value: T,
    /// Handle the former last element was stored under, if it had to move.
    pub moved_from: Option<I>,
}

impl<I, T> IndexVec<I, T>
where
    I: Idx,
{
    pub fn new(owner: NetTag) -> Self {
        Self {
            owner,
            data: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn owner(&self) -> NetTag {
        self.owner
    }

    /// Handle the next [`IndexVec::push`] will return.
    pub fn next_index(&self) -> I {
        I::from_parts(self.owner, self.data.len())
    }

    pub fn push(&mut self, value: T) -> I {
        let idx = self.next_index();
        self.data.push(value);
        idx
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` when `index` was issued for this collection and is in range.
    pub fn contains(&self, index: I) -> bool {
        index.owner() == self.owner && index.index() < self.data.len()
    }

    /// Handle of the element at position `idx`, if there is one.
    pub fn handle(&self, idx: usize) -> Option<I> {
        (idx < self.data.len()).then(|| I::from_parts(self.owner, idx))
    }

    pub fn indices(&self) -> impl Iterator<Item = I> + use<I, T> {
        let owner = self.owner;
        (0..self.data.len()).map(move |idx| I::from_parts(owner, idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &T)> {
        let owner = self.owner;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, value)| (I::from_parts(owner, idx), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }

    pub fn get(&self, index: I) -> Option<&T> {
        if index.owner() != self.owner {
            return None;
        }
        self.data.get(index.index())
    }

    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        if index.owner() != self.owner {
            return None;
        }
        self.data.get_mut(index.index())
    }

    /// Removes `index` by moving the last element into its slot.
    ///
    /// Returns `None` when `index` does not belong to this collection.
    pub fn swap_remove(&mut self, index: I) -> Option<SwapRemoved<I, T>> {
        if !self.contains(index) {
            return None;
        }
        let last = I::from_parts(self.owner, self.data.len() - 1);
        let value = self.data.swap_remove(index.index());
        Some(SwapRemoved {
            value,
            moved_from: (last != index).then_some(last),
        })
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Moves the collection to `owner`. Handles stored inside the elements
    /// are the caller's business.
    pub(crate) fn retag(&mut self, owner: NetTag) {
        self.owner = owner;
    }
}

impl<I, T> fmt::Debug for IndexVec<I, T>
where
    I: Idx,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<I, T> Index<I> for IndexVec<I, T>
where
    I: Idx,
{
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        assert_eq!(index.owner(), self.owner, "{index:?} belongs to another net");
        &self.data[index.index()]
    }
}

impl<I, T> IndexMut<I> for IndexVec<I, T>
where
    I: Idx,
{
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        assert_eq!(index.owner(), self.owner, "{index:?} belongs to another net");
        &mut self.data[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ids::PlaceId;

    #[test]
    fn swap_remove_reports_moved_handle() {
        let mut vec: IndexVec<PlaceId, &str> = IndexVec::new(NetTag::fresh());
        let a = vec.push("a");
        vec.push("b");
        let c = vec.push("c");

        let removed = vec.swap_remove(a).unwrap();
        assert_eq!(removed.value, "a");
        assert_eq!(removed.moved_from, Some(c));
        assert_eq!(vec[a], "c");
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn swap_remove_last_moves_nothing() {
        let mut vec: IndexVec<PlaceId, u32> = IndexVec::new(NetTag::fresh());
        vec.push(1);
        let last = vec.push(2);

        let removed = vec.swap_remove(last).unwrap();
        assert_eq!(removed.moved_from, None);
        assert!(vec.swap_remove(last).is_none());
        assert_eq!(vec.handle(1), None);
    }

    #[test]
    fn foreign_handles_are_not_contained() {
        let mut ours: IndexVec<PlaceId, u32> = IndexVec::new(NetTag::fresh());
        let mut theirs: IndexVec<PlaceId, u32> = IndexVec::new(NetTag::fresh());
        ours.push(1);
        let foreign = theirs.push(2);

        assert_eq!(foreign.index(), 0);
        assert!(!ours.contains(foreign));
        assert!(ours.get(foreign).is_none());
        assert!(ours.swap_remove(foreign).is_none());
        assert_eq!(ours.len(), 1);
    }
}
