// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Disjoint-set forest over vertex indices

/// Union-find with path halving
///
/// The smaller index always becomes the root of a merged set, so `find`
/// returns the lowest index of each set.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative (lowest index) of the set containing `x`
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Union the sets of `a` and `b`, returning the new representative
    pub fn merge(&mut self, a: usize, b: usize) -> usize {
        let root_a = self.find(a);
        let root_b = self.find(b);
        let (root, child) = if root_a <= root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[child] = root;
        root
    }

    /// Number of disjoint sets
    pub fn count_sets(&mut self) -> usize {
        (0..self.parent.len()).filter(|&x| self.find(x) == x).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_index_is_root() {
        let mut sets = DisjointSet::new(6);
        sets.merge(5, 3);
        sets.merge(3, 4);
        assert_eq!(sets.find(5), 3);
        sets.merge(4, 1);
        assert_eq!(sets.find(5), 1);
        assert_eq!(sets.find(0), 0);
        assert_eq!(sets.count_sets(), 3);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut sets = DisjointSet::new(3);
        assert_eq!(sets.merge(2, 1), 1);
        assert_eq!(sets.merge(1, 2), 1);
        assert_eq!(sets.find(2), 1);
        assert_eq!(sets.count_sets(), 2);
    }
}
