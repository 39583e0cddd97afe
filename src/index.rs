//! Permutation-invariant lookup over the target's canonical keys.
//!
//! Order-independent exact matching is bought at startup: every ordering of
//! the target tuple is rendered to suffix bytes, encoded as a
//! [`CanonicalKey`], and inserted into a custom hash set. Workers then test
//! each candidate suffix with one O(1) membership probe instead of comparing
//! against k! orderings.
//!
//! The set is a power-of-two bucket array with an intrusive singly-linked
//! chain per bucket, links stored as `u32` indices into a flat entry vector.
//! At most 720 entries against 2^18 buckets keeps chains essentially
//! length one; the `h ^ (h >> 16)` finalizer spreads the 31-chain hash
//! before masking.

use crate::key::CanonicalKey;
use crate::target::TargetTuple;

const BUCKET_COUNT: usize = 1 << 18;
const BUCKET_MASK: u32 = (BUCKET_COUNT - 1) as u32;
/// Empty bucket / end of chain.
const NONE: u32 = u32::MAX;

struct Entry {
    key: CanonicalKey,
    next: u32,
}

/// Read-only after [`build`](PermutationIndex::build); shared across workers
/// without locks.
pub struct PermutationIndex {
    heads: Vec<u32>,
    entries: Vec<Entry>,
    key_len: usize,
}

impl PermutationIndex {
    /// Index every distinct ordering of `target`.
    ///
    /// Orderings are enumerated with Heap's algorithm (iterative form) and
    /// de-duplicated on insert, so a target with repeated values builds a
    /// minimal index rather than redundant chain entries.
    pub fn build(target: &TargetTuple) -> Self {
        let mut index = Self {
            heads: vec![NONE; BUCKET_COUNT],
            entries: Vec::with_capacity(factorial(target.len())),
            key_len: target.suffix_len(),
        };

        let mut order = target.values().to_vec();
        let mut buf = [0u8; crate::key::MAX_SUFFIX_LEN];
        index.insert(CanonicalKey::encode(TargetTuple::render_suffix(&order, &mut buf)));

        let n = order.len();
        let mut counters = vec![0usize; n];
        let mut i = 0;
        while i < n {
            if counters[i] < i {
                if i % 2 == 0 {
                    order.swap(0, i);
                } else {
                    order.swap(counters[i], i);
                }
                index.insert(CanonicalKey::encode(TargetTuple::render_suffix(&order, &mut buf)));
                counters[i] += 1;
                i = 0;
            } else {
                counters[i] = 0;
                i += 1;
            }
        }
        index
    }

    /// Suffix byte length shared by every indexed ordering.
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Number of distinct orderings indexed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    fn bucket(key: &CanonicalKey) -> usize {
        let h = key.hash();
        ((h ^ (h >> 16)) & BUCKET_MASK) as usize
    }

    fn insert(&mut self, key: CanonicalKey) {
        // Orderings of a tuple with repeated values render to identical
        // bytes; drop them here so chains stay minimal.
        if self.contains(&key) {
            return;
        }
        let bucket = Self::bucket(&key);
        self.entries.push(Entry {
            key,
            next: self.heads[bucket],
        });
        self.heads[bucket] = (self.entries.len() - 1) as u32;
    }

    /// Membership probe: one bucket, walk the chain.
    #[inline(always)]
    pub fn contains(&self, key: &CanonicalKey) -> bool {
        let mut at = self.heads[Self::bucket(key)];
        while at != NONE {
            let entry = &self.entries[at as usize];
            if entry.key == *key {
                return true;
            }
            at = entry.next;
        }
        false
    }
}

fn factorial(n: usize) -> usize {
    (2..=n).product::<usize>().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::MAX_SUFFIX_LEN;

    fn key_of(order: &[u8]) -> CanonicalKey {
        let mut buf = [0u8; MAX_SUFFIX_LEN];
        CanonicalKey::encode(TargetTuple::render_suffix(order, &mut buf))
    }

    fn permutations(values: &[u8]) -> Vec<Vec<u8>> {
        // Simple recursive reference enumeration for test oracles.
        if values.len() <= 1 {
            return vec![values.to_vec()];
        }
        let mut out = Vec::new();
        for (i, &v) in values.iter().enumerate() {
            let mut rest = values.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, v);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn contains_every_ordering_of_distinct_values() {
        let target = TargetTuple::new(vec![11, 22, 33, 44, 5, 6]).unwrap();
        let index = PermutationIndex::build(&target);
        assert_eq!(index.len(), 720);
        for ordering in permutations(target.values()) {
            assert!(index.contains(&key_of(&ordering)), "{:?}", ordering);
        }
    }

    #[test]
    fn misses_any_changed_value() {
        let target = TargetTuple::new(vec![11, 22, 33, 44, 5, 6]).unwrap();
        let index = PermutationIndex::build(&target);
        assert!(!index.contains(&key_of(&[11, 22, 33, 44, 5, 7])));
        assert!(!index.contains(&key_of(&[12, 22, 33, 44, 5, 6])));
    }

    #[test]
    fn repeated_values_build_a_deduplicated_index() {
        let target = TargetTuple::new(vec![17, 17, 28, 39]).unwrap();
        let index = PermutationIndex::build(&target);
        // 4! orderings, halved by the swap symmetry of the repeated 17s.
        assert_eq!(index.len(), 12);
        assert!(index.contains(&key_of(&[28, 17, 39, 17])));
    }

    #[test]
    fn key_len_is_the_target_suffix_len() {
        let target = TargetTuple::new(vec![10, 2, 33, 4, 5, 6]).unwrap();
        let index = PermutationIndex::build(&target);
        assert_eq!(index.key_len(), target.suffix_len());
    }
}
