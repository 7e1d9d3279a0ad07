use std::collections::HashSet;

use skillboard_core::RawPosting;

/// A posting that survived deduplication, paired with its identifier.
#[derive(Debug, Clone, Copy)]
pub struct KeyedPosting<'a> {
    pub id: &'a str,
    pub posting: &'a RawPosting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub input: usize,
    pub missing_id: usize,
    pub duplicates: usize,
}

#[derive(Debug)]
pub struct Deduped<'a> {
    ids: Vec<String>,
    postings: Vec<&'a RawPosting>,
    pub stats: DedupStats,
}

impl<'a> Deduped<'a> {
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Survivors in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = KeyedPosting<'_>> + '_ {
        self.ids
            .iter()
            .zip(&self.postings)
            .map(|(id, posting)| KeyedPosting { id, posting })
    }
}

/// Keep the first posting for every identifier, in input order.
///
/// Postings without an identifier cannot be keyed downstream and are
/// dropped silently; they are only counted in the stats.
pub fn dedupe_postings(postings: &[RawPosting]) -> Deduped<'_> {
    let mut seen = HashSet::with_capacity(postings.len());
    let mut ids = Vec::with_capacity(postings.len());
    let mut kept = Vec::with_capacity(postings.len());
    let mut stats = DedupStats {
        input: postings.len(),
        ..DedupStats::default()
    };

    for posting in postings {
        let Some(id) = posting.id() else {
            stats.missing_id += 1;
            continue;
        };
        if seen.insert(id.clone()) {
            ids.push(id);
            kept.push(posting);
        } else {
            stats.duplicates += 1;
        }
    }

    Deduped {
        ids,
        postings: kept,
        stats,
    }
}
