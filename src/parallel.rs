//! Parallel Filtering
//!
//! Runs one matching session per document across a rayon worker pool. The
//! shared `FilterSet` is read-only; every document gets its own session, so
//! no locking is involved.

use rayon::prelude::*;

use crate::events::{drive, StreamEvent};
use crate::session::{FilterSet, SessionStats};

/// Filter a batch of recorded documents, one session each
///
/// Stats come back in input order regardless of which worker ran which
/// document.
pub fn filter_documents(filter: &FilterSet, documents: &[Vec<StreamEvent>]) -> Vec<SessionStats> {
    documents
        .par_iter()
        .map(|document| {
            let mut session = filter.session();
            drive(document, &mut session);
            session.stats()
        })
        .collect()
}
