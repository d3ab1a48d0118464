use bio::data_structures::interval_tree::IntervalTree;
use rustc_hash::FxHashMap;
use log::debug;
use crate::lib::interval::SvInterval;

/// An interval index over `SvInterval` keys which can hold any payload.
/// Like the per-chromosome tree hashmaps we use elsewhere it keeps one
/// `bio` interval tree per contig. The trees only hold the position of the
/// entry in an insertion ordered vector, which gives us two stable orders:
/// insertion order (`iter`) and interval order (`iter_sorted`).
/// Identical keys are allowed and kept as separate entries.
#[derive(Debug,Clone)]
pub struct SvIntervalTree<T> {
    trees   : FxHashMap<u32,IntervalTree<u64,usize>>,
    entries : Vec<(SvInterval,T)>,
}

impl<T> Default for SvIntervalTree<T> {
    fn default() -> Self {
        SvIntervalTree {
            trees   : FxHashMap::default(),
            entries : Vec::new(),
        }
    }
}

impl<T> SvIntervalTree<T> {
    pub fn new() -> SvIntervalTree<T> {
        SvIntervalTree::default()
    }

    pub fn put(&mut self, interval: SvInterval, value: T) {
        let idx = self.entries.len();
        self.trees
            .entry(interval.contig)
            .or_insert_with(IntervalTree::new)
            .insert(interval.to_range(), idx);
        self.entries.push((interval, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// short-circuits on the first hit
    pub fn has_overlapper(&self, query: &SvInterval) -> bool {
        match self.trees.get(&query.contig) {
            Some(tree) => tree.find(query.to_range()).next().is_some(),
            None       => false,
        }
    }

    /// entry positions overlapping the query, ordered by (interval, insertion)
    fn overlapping_indices(&self, query: &SvInterval) -> Vec<usize> {
        let mut hits : Vec<usize> = match self.trees.get(&query.contig) {
            Some(tree) => tree.find(query.to_range()).map(|x| *x.data()).collect(),
            None       => Vec::new(),
        };
        hits.sort_by(|a, b| self.entries[*a].0.cmp(&self.entries[*b].0).then(a.cmp(b)));
        hits
    }

    /// all entries overlapping the query in interval order
    pub fn overlappers<'a>(&'a self, query: &SvInterval) -> impl Iterator<Item = (&'a SvInterval, &'a T)> + 'a {
        self.overlapping_indices(query)
            .into_iter()
            .map(move |idx| {
                let (interval, value) = &self.entries[idx];
                (interval, value)
            })
    }

    /// True if any entry overlaps the query with a reciprocal overlap of at least
    /// `min_fraction`. Containment alone is not enough, a small call inside a
    /// large one is not a duplicate.
    pub fn has_reciprocal_overlapper(&self, query: &SvInterval, min_fraction: f64) -> bool {
        match self.trees.get(&query.contig) {
            Some(tree) => tree
                .find(query.to_range())
                .any(|hit| {
                    let fraction = self.entries[*hit.data()].0.reciprocal_overlap_fraction(query);
                    if fraction >= min_fraction {
                        debug!("Query {} overlaps {} with reciprocal fraction {}", query, self.entries[*hit.data()].0, fraction);
                        true
                    } else {
                        false
                    }
                }),
            None => false,
        }
    }

    /// entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&SvInterval, &T)> {
        self.entries.iter().map(|(interval, value)| (interval, value))
    }

    /// entries ordered by interval, identical intervals in insertion order
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&SvInterval, &T)> {
        let mut order : Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|a, b| self.entries[*a].0.cmp(&self.entries[*b].0));
        order.into_iter().map(move |idx| {
            let (interval, value) = &self.entries[idx];
            (interval, value)
        })
    }

    /// consumes the tree and returns the payloads ordered by interval
    pub fn into_sorted_values(self) -> Vec<T> {
        let mut entries = self.entries;
        // stable sort, identical keys keep insertion order
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, value)| value).collect()
    }
}

/// Free-standing form of the duplicate test used by the caller: does the
/// tree already hold something which covers nearly the same region as `interval`
pub fn has_reciprocal_overlap_in_tree<T>(
    interval     : &SvInterval,
    tree         : &SvIntervalTree<T>,
    min_fraction : f64
) -> bool {
    tree.has_reciprocal_overlapper(interval, min_fraction)
}
