use std::ops::Range;
use log::{debug, error, warn};

use crate::subtitle_processor::{serialize_entries, SubtitleEntry};

// @module: Chunk planning for large-document translation
//
// Two independent ceilings apply to every submitted chunk: an approximate
// character budget (the service's total-request-size limit) and an exact
// per-file byte limit (stricter, checked last). The planner produces index
// ranges into the source entry list; chunks are never copied here, only
// materialized later by the orchestrator.

/// Character budget per chunk, with a safety margin below DeepL's
/// 500k-character request limit
pub const DEFAULT_CHAR_BUDGET: usize = 400_000;

/// Per-file byte limit, with a safety margin below DeepL's 150KB
/// document limit for the free tier
pub const DEFAULT_FILE_SIZE_LIMIT: usize = 130 * 1024;

/// Partitions subtitle entries into ordered chunks that satisfy both
/// size ceilings
#[derive(Debug, Clone)]
pub struct ChunkPlanner {
    /// Approximate serialized-size budget for the greedy pass
    char_budget: usize,

    /// Exact serialized-size ceiling for one uploaded file
    file_size_limit: usize,
}

impl Default for ChunkPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_BUDGET, DEFAULT_FILE_SIZE_LIMIT)
    }
}

impl ChunkPlanner {
    /// Create a planner with explicit ceilings
    pub fn new(char_budget: usize, file_size_limit: usize) -> Self {
        ChunkPlanner {
            char_budget,
            file_size_limit,
        }
    }

    /// Partition `entries` into ordered index ranges.
    ///
    /// Flattening the returned ranges in order reproduces `0..entries.len()`
    /// exactly: no entry is dropped, duplicated, or reordered. Every range
    /// with more than one entry serializes to at most `file_size_limit`
    /// bytes; a single entry that alone exceeds the limit is passed through
    /// as its own range and logged, since a subtitle cannot be split.
    pub fn plan(&self, entries: &[SubtitleEntry]) -> Vec<Range<usize>> {
        if entries.is_empty() {
            warn!("No subtitle entries to plan into chunks");
            return Vec::new();
        }

        let groups = self.greedy_char_pass(entries);
        debug!(
            "Greedy pass split {} entries into {} group(s) under the {}-byte budget",
            entries.len(),
            groups.len(),
            self.char_budget
        );

        let mut validated = Vec::new();
        for group in groups {
            self.validate_group_size(entries, group, &mut validated);
        }

        // Coverage check - the planner must never lose an entry
        let covered: usize = validated.iter().map(|r| r.len()).sum();
        if covered != entries.len() {
            error!(
                "Chunk planning lost entries: {} in, {} covered by {} range(s)",
                entries.len(),
                covered,
                validated.len()
            );
        }

        validated
    }

    /// Exact serialized byte size of a sub-range of entries
    pub fn serialized_size(entries: &[SubtitleEntry], range: &Range<usize>) -> usize {
        serialize_entries(&entries[range.clone()]).len()
    }

    // Greedy accumulation against the character budget: close the current
    // group when adding the next entry would overflow it and the group is
    // non-empty. An entry that alone exceeds the budget becomes its own
    // group.
    fn greedy_char_pass(&self, entries: &[SubtitleEntry]) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut group_start = 0usize;
        let mut group_size = 0usize;

        for (i, entry) in entries.iter().enumerate() {
            let entry_size = entry.serialized_len();

            if group_size + entry_size > self.char_budget && i > group_start {
                groups.push(group_start..i);
                group_start = i;
                group_size = 0;
            }

            group_size += entry_size;
        }

        if group_start < entries.len() {
            groups.push(group_start..entries.len());
        }

        groups
    }

    // Recursive midpoint bisection against the exact byte ceiling. Operates
    // on index ranges with an explicit accumulator; the recursion is not
    // size-aware, so an oversized group may need several halvings before
    // converging. Base case: a single entry is accepted regardless of size.
    fn validate_group_size(
        &self,
        entries: &[SubtitleEntry],
        range: Range<usize>,
        accepted: &mut Vec<Range<usize>>,
    ) {
        let exact_size = Self::serialized_size(entries, &range);

        if exact_size <= self.file_size_limit {
            accepted.push(range);
            return;
        }

        if range.len() == 1 {
            // Cannot split a single subtitle; let it through and let the
            // service rule on it (accepted-risk boundary, never truncate)
            warn!(
                "Entry {} alone serializes to {}KB, over the {}KB file limit; submitting as-is",
                entries[range.start].seq_num,
                exact_size / 1024,
                self.file_size_limit / 1024
            );
            accepted.push(range);
            return;
        }

        debug!(
            "Bisecting group of {} entries ({}KB > {}KB)",
            range.len(),
            exact_size / 1024,
            self.file_size_limit / 1024
        );

        let mid = range.start + range.len() / 2;
        self.validate_group_size(entries, range.start..mid, accepted);
        self.validate_group_size(entries, mid..range.end, accepted);
    }
}
