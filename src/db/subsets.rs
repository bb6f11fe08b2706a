use itertools::{Combinations, Itertools};
use std::slice;

/// Lazy sequence of every non-empty subset of a pool, smallest first.
///
/// Subsets of size `k` are produced in lexicographic pool order before any
/// subset of size `k + 1`. Nothing is materialized beyond the combination
/// currently being yielded, and a clone (or [`Subsets::restart`]) replays
/// the sequence independently.
pub struct Subsets<'a, T> {
    pool: &'a [T],
    max_size: usize,
    size: usize,
    current: Option<Combinations<slice::Iter<'a, T>>>,
}

impl<'a, T> Subsets<'a, T> {
    /// Subsets of `pool` with at most `max_size` members (all sizes when
    /// `None`).
    pub fn new(pool: &'a [T], max_size: Option<usize>) -> Self {
        let max_size = max_size.map_or(pool.len(), |cap| cap.min(pool.len()));
        Self {
            pool,
            max_size,
            size: 0,
            current: None,
        }
    }

    /// A fresh sequence over the same pool.
    pub fn restart(&self) -> Self {
        Self::new(self.pool, Some(self.max_size))
    }

    /// Size of the subsets currently being produced (0 before the first).
    pub fn current_size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<T> Clone for Subsets<'_, T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            max_size: self.max_size,
            size: self.size,
            current: self.current.clone(),
        }
    }
}

impl<'a, T> Iterator for Subsets<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(combination) = self.current.as_mut().and_then(Iterator::next) {
                return Some(combination);
            }
            if self.size >= self.max_size {
                self.current = None;
                return None;
            }
            self.size += 1;
            self.current = Some(self.pool.iter().combinations(self.size));
        }
    }
}
