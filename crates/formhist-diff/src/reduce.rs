//! Version history reducer
//!
//! Folds [`diff`](crate::diff()) over a snapshot chain, one changeset per
//! transition.

use crate::change::{Changeset, RecordHistory};
use crate::diff::diff;
use crate::snapshot::SnapshotChain;

/// Build the raw history of a record, most recent transition first.
///
/// # Transitions (chronological)
/// 1. nothing → `versions[0]`, stamped with its time, authored by the creator
/// 2. `versions[i-1]` → `versions[i]`, authored by whoever replaced `versions[i-1]`
/// 3. last version → `current`
///
/// Without stored versions the chain is the single transition
/// nothing → `current`, stamped with the creation time.
///
/// A chain with `n` versions always yields `n + 1` changesets.
#[must_use]
pub fn reduce(chain: &SnapshotChain) -> RecordHistory {
    let mut history = Vec::with_capacity(chain.transition_count());

    match chain.versions.split_first() {
        None => history.push(Changeset::new(
            chain.created_at,
            chain.creator.clone(),
            diff(None, &chain.current.data),
        )),
        Some((first, rest)) => {
            history.push(Changeset::new(
                first.timestamp,
                chain.creator.clone(),
                diff(None, &first.data),
            ));

            for pair in chain.versions.windows(2) {
                let (previous, next) = (&pair[0], &pair[1]);
                history.push(Changeset::new(
                    next.timestamp,
                    previous.author.clone(),
                    diff(Some(&previous.data), &next.data),
                ));
            }

            let last = rest.last().unwrap_or(first);
            history.push(Changeset::new(
                chain.current.timestamp,
                last.author.clone(),
                diff(Some(&last.data), &chain.current.data),
            ));
        }
    }

    tracing::debug!("reduced {} versions into {} changesets", chain.versions.len(), history.len());

    history.reverse();
    history
}
