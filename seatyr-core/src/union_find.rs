//! Union-find (disjoint set union) over [`GuestId`]s.
//!
//! Used by the group builder (§4.E, over `must ∪ adjacent` edges) and by the
//! constraint validator (§4.D, over the adjacent-only graph, to find closed
//! rings). No back-references or ownership cycles: the structure is a flat
//! arena keyed by dense index, with a `GuestId -> index` lookup layered on
//! top so callers work in terms of the public identifier type.

use std::collections::HashMap;

use crate::model::GuestId;

/// A union-find structure keyed by [`GuestId`], with path compression and
/// union-by-rank.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    index_of: HashMap<GuestId, usize>,
    ids: Vec<GuestId>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Builds a disjoint set with one singleton component per id in `ids`.
    ///
    /// Duplicate ids are ignored after the first occurrence.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = GuestId>) -> Self {
        let mut index_of = HashMap::new();
        let mut unique_ids = Vec::new();
        for id in ids {
            if !index_of.contains_key(&id) {
                index_of.insert(id.clone(), unique_ids.len());
                unique_ids.push(id);
            }
        }
        let len = unique_ids.len();
        Self {
            index_of,
            ids: unique_ids,
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Returns the representative (root) id of the component containing `id`.
    ///
    /// Returns `None` if `id` was not part of the original id set.
    pub fn find(&mut self, id: &GuestId) -> Option<GuestId> {
        let index = *self.index_of.get(id)?;
        let root = self.find_index(index);
        Some(self.ids[root].clone())
    }

    /// Merges the components containing `a` and `b`.
    ///
    /// Does nothing if either id is unknown or they are already in the same
    /// component.
    pub fn union(&mut self, a: &GuestId, b: &GuestId) {
        let (Some(&a_index), Some(&b_index)) = (self.index_of.get(a), self.index_of.get(b)) else {
            return;
        };
        self.union_indices(a_index, b_index);
    }

    /// Groups every known id by its component root, in first-seen order.
    #[must_use]
    pub fn components(&mut self) -> Vec<Vec<GuestId>> {
        let mut by_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<GuestId>> = Vec::new();
        for index in 0..self.ids.len() {
            let root = self.find_index(index);
            let group_index = *by_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group_index].push(self.ids[index].clone());
        }
        groups
    }

    fn find_index(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = node;
        while self.parent[current] != current {
            let parent = self.parent[current];
            self.parent[current] = root;
            current = parent;
        }

        root
    }

    fn union_indices(&mut self, left: usize, right: usize) -> usize {
        let mut left = self.find_index(left);
        let mut right = self.find_index(right);
        if left == right {
            return left;
        }
        if self.rank[left] < self.rank[right] {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if self.rank[left] == self.rank[right] {
            self.rank[left] = self.rank[left].saturating_add(1);
        }
        left
    }
}
