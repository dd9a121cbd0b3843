//! Per-net allocation of display-name indices.
//!
//! Every index below `next` is either in use or listed in `released`, and
//! `next` itself is always free, so the smallest free index is the first
//! released one or `next`. Hints above `next` are only recorded in `used`.
use std::collections::BTreeSet;

use crate::net::structure::NameIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    used: BTreeSet<NameIndex>,
    released: BTreeSet<NameIndex>,
    next: NameIndex,
}

impl Default for NameTable {
    fn default() -> Self {
        Self {
            used: BTreeSet::new(),
            released: BTreeSet::new(),
            next: 1,
        }
    }
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_taken(&self, name: NameIndex) -> bool {
        self.used.contains(&name)
    }

    /// Smallest positive index not in use.
    pub fn first_free(&self) -> NameIndex {
        self.released.first().copied().unwrap_or(self.next)
    }

    /// Picks `hint` when it is free, otherwise the first free index. The
    /// caller registers the result with [`NameTable::claim`] once the
    /// surrounding mutation is known to succeed.
    pub fn resolve(&self, hint: Option<NameIndex>) -> NameIndex {
        match hint {
            Some(name) if !self.is_taken(name) => name,
            _ => self.first_free(),
        }
    }

    pub fn claim(&mut self, name: NameIndex) {
        if !self.used.insert(name) {
            return;
        }
        if name < self.next {
            self.released.remove(&name);
        } else if name == self.next {
            // skip over hints claimed ahead of the counter
            self.next += 1;
            while self.used.contains(&self.next) {
                self.next += 1;
            }
        }
    }

    pub fn release(&mut self, name: NameIndex) {
        if self.used.remove(&name) && name < self.next {
            self.released.insert(name);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn falls_back_to_first_gap() {
        let mut names = NameTable::new();
        names.claim(1);
        names.claim(2);
        names.claim(4);

        assert_eq!(names.resolve(Some(2)), 3);
        assert_eq!(names.resolve(Some(7)), 7);
        assert_eq!(names.resolve(None), 3);

        names.claim(3);
        assert_eq!(names.first_free(), 5);

        names.release(1);
        assert_eq!(names.first_free(), 1);
    }

    #[test]
    fn released_hint_above_counter_is_free_again() {
        let mut names = NameTable::new();
        names.claim(10);
        assert_eq!(names.first_free(), 1);
        names.release(10);
        assert!(!names.is_taken(10));
        assert_eq!(names.resolve(Some(10)), 10);
        assert_eq!(names.first_free(), 1);
    }

    #[test]
    fn matches_linear_scan_under_random_use() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut names = NameTable::new();
        let mut taken = BTreeSet::new();
        for _ in 0..2000 {
            if rng.random_bool(0.6) || taken.is_empty() {
                let hint = rng.random_bool(0.3).then(|| rng.random_range(1..60));
                let name = names.resolve(hint);
                names.claim(name);
                assert!(taken.insert(name), "{name} handed out twice");
            } else {
                let victim = *taken.iter().nth(rng.random_range(0..taken.len())).unwrap();
                names.release(victim);
                taken.remove(&victim);
            }
            let expected = (1..).find(|n| !taken.contains(n)).unwrap();
            assert_eq!(names.first_free(), expected);
        }
    }
}
