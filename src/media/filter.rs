//! Resolution filtering of candidate lists.

use std::collections::HashSet;

use crate::media::candidate::MediaCandidate;

/// Max-dimension rule: passes if either side meets the threshold.
pub fn meets_resolution(width: u32, height: u32, min_resolution: u32) -> bool {
    width >= min_resolution || height >= min_resolution
}

/// Deduplicate candidates by URL and drop those reported below `min_resolution`.
///
/// The first occurrence of each `source_url` wins. Candidates whose provider
/// reported `0x0` pass through so the downloader can check the real file.
/// Relative input order is preserved.
pub fn filter_candidates(candidates: &[MediaCandidate], min_resolution: u32) -> Vec<MediaCandidate> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());

    candidates
        .iter()
        .filter(|c| seen.insert(c.source_url.as_str()))
        .filter(|c| {
            c.has_unknown_dimensions()
                || meets_resolution(c.reported_width, c.reported_height, min_resolution)
        })
        .cloned()
        .collect()
}
