//! Most-used tag ranking.

use std::collections::HashMap;

use serde::Serialize;

use crate::entry::Entry;

/// How many entries carry a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Ranks tags by the number of entries using them, keeping the first `n`.
///
/// Ties are broken alphabetically so the ranking is stable across runs.
pub fn top_tags(entries: &[Entry], n: usize) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in entries.iter().flat_map(|e| &e.tags) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    ranked.truncate(n);
    ranked
}
