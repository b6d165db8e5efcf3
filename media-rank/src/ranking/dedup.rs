//! Candidate deduplication by identity and download URL.
//!
//! Two candidates are duplicates when they share an ID or an original
//! download URL. No pixel or perceptual comparison is done; the first
//! occurrence always wins and relative order is preserved.

use std::collections::HashSet;

use crate::types::MediaCandidate;

/// Remove duplicates from a single batch.
///
/// Returns the surviving candidates in their original order together
/// with the number removed. Besides the original URL, an accepted
/// candidate's `large` and `medium` variants are also remembered, so a
/// later candidate whose original URL is one of those variants is
/// treated as a duplicate.
pub fn deduplicate(items: Vec<MediaCandidate>) -> (Vec<MediaCandidate>, usize) {
    if items.is_empty() {
        return (Vec::new(), 0);
    }

    let mut seen_ids: HashSet<String> = HashSet::with_capacity(items.len());
    let mut seen_urls: HashSet<String> = HashSet::with_capacity(items.len() * 3);
    let mut unique = Vec::with_capacity(items.len());
    let mut removed = 0;

    for item in items {
        if seen_ids.contains(&item.id) || seen_urls.contains(item.urls.original.as_str()) {
            removed += 1;
            continue;
        }

        seen_ids.insert(item.id.clone());
        seen_urls.insert(item.urls.original.to_string());
        for variant in [&item.urls.large, &item.urls.medium].into_iter().flatten() {
            seen_urls.insert(variant.to_string());
        }

        unique.push(item);
    }

    if removed > 0 {
        tracing::debug!(removed, kept = unique.len(), "duplicates removed");
    }

    (unique, removed)
}

/// Remove duplicates across several batches, first occurrence wins.
///
/// IDs and original URLs seen in earlier batches (or earlier in the same
/// batch) mark later candidates as duplicates. Batches keep their
/// position and internal order even when they end up empty.
///
/// Unlike [`deduplicate`], only original URLs are remembered here; the
/// `large`/`medium` variants are not.
pub fn deduplicate_across(
    batches: Vec<Vec<MediaCandidate>>,
) -> (Vec<Vec<MediaCandidate>>, usize) {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut total_removed = 0;

    let unique_batches: Vec<Vec<MediaCandidate>> = batches
        .into_iter()
        .map(|batch| {
            let mut unique_in_batch = Vec::with_capacity(batch.len());
            for item in batch {
                if seen_ids.contains(&item.id) || seen_urls.contains(item.urls.original.as_str())
                {
                    total_removed += 1;
                    continue;
                }
                seen_ids.insert(item.id.clone());
                seen_urls.insert(item.urls.original.to_string());
                unique_in_batch.push(item);
            }
            unique_in_batch
        })
        .collect();

    if total_removed > 0 {
        tracing::debug!(
            removed = total_removed,
            batches = unique_batches.len(),
            "cross-batch duplicates removed"
        );
    }

    (unique_batches, total_removed)
}

/// Coarse grouping key for candidates that are likely the same asset.
///
/// Buckets dimensions to the nearest hundred pixels and combines them
/// with the source and media type, e.g. `pexels_19_10_image` for a
/// 1920×1080 Pexels photo. Not used by [`deduplicate`].
pub fn similarity_hash(item: &MediaCandidate) -> String {
    format!(
        "{}_{}_{}_{}",
        item.source,
        item.dimensions.width / 100,
        item.dimensions.height / 100,
        item.media_type
    )
}
