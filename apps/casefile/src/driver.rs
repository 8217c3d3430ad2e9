//! # View Driver
//!
//! Runs the casefile-core views against a [`RecordSource`].
//!
//! The core issues keyed requests and the driver performs them, handing each
//! outcome back with its token. Superseded responses are dropped by the
//! core; the driver only logs them.

use crate::client::RecordSource;
use casefile_core::{
    EvidencePager, FetchError, Issued, PageCommit, PageRequest, RawSearchHit, SearchAggregator,
    SearchCommit, SearchRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Upper bound on reloads triggered by a shrinking page count.
const MAX_REISSUES: usize = 3;

/// Perform `issued` and commit the outcome into `pager`.
///
/// When the response reveals fewer pages than the current page, the pager
/// clamps and asks for its last page; that request is followed too, up to
/// `MAX_REISSUES` times. Past that the pending request is failed so the
/// pager never stays `Loading`.
pub async fn load_page<S: RecordSource>(
    pager: &mut EvidencePager,
    source: &S,
    mut issued: Issued<PageRequest>,
) -> Result<(), FetchError> {
    let mut reissues = 0;
    loop {
        let outcome = source.fetch_evidence_page(issued.key).await;
        match pager.commit(issued.token, outcome) {
            PageCommit::Applied => break,
            PageCommit::Superseded => {
                tracing::debug!(page = issued.key.page, "Dropped superseded evidence page");
                break;
            }
            PageCommit::Reissued(next) if reissues < MAX_REISSUES => {
                tracing::info!(
                    requested = issued.key.page,
                    page = next.key.page,
                    "Page out of range, loading last page"
                );
                reissues += 1;
                issued = next;
            }
            PageCommit::Reissued(next) => {
                tracing::warn!(
                    page = next.key.page,
                    reissues,
                    "Page count kept shrinking, giving up"
                );
                let error = FetchError::Malformed(format!(
                    "page count changed on each of {} reloads",
                    reissues + 1
                ));
                pager.commit(next.token, Err(error));
                break;
            }
        }
    }

    match pager.state().error() {
        Some(e) => {
            tracing::warn!(page = pager.current_page(), "Evidence page failed: {}", e);
            Err(e.clone())
        }
        None => Ok(()),
    }
}

/// Set `query` on the aggregator and, if it is long enough, run the search.
pub async fn run_search<S: RecordSource>(
    aggregator: &mut SearchAggregator,
    source: &S,
    query: &str,
) -> Result<(), FetchError> {
    let Some(issued) = aggregator.set_query(query) else {
        tracing::debug!("Query below activation length, search idle");
        return Ok(());
    };
    perform_search(aggregator, source, issued).await
}

/// Re-run the aggregator's current query after a failure.
pub async fn retry_search<S: RecordSource>(
    aggregator: &mut SearchAggregator,
    source: &S,
) -> Result<(), FetchError> {
    match aggregator.retry() {
        Some(issued) => perform_search(aggregator, source, issued).await,
        None => Ok(()),
    }
}

async fn perform_search<S: RecordSource>(
    aggregator: &mut SearchAggregator,
    source: &S,
    issued: Issued<SearchRequest>,
) -> Result<(), FetchError> {
    let outcome = source.fetch_entity_search(&issued.key.query).await;
    let (commit, rejected) = aggregator.commit_raw(issued.token, outcome);
    report_commit(commit, &issued.key.query, &rejected);

    match aggregator.state().error() {
        Some(e) => {
            tracing::warn!(query = %issued.key.query, "Search failed: {}", e);
            Err(e.clone())
        }
        None => Ok(()),
    }
}

/// Feed successive query strings as a user would type them.
///
/// Each keystroke issues a search (if active) without waiting for earlier
/// ones; responses are committed in completion order. Only the last issued
/// search can land, however the fetches interleave.
pub async fn search_as_typed<S>(
    aggregator: &mut SearchAggregator,
    source: Arc<S>,
    keystrokes: &[String],
    interval: Duration,
) -> Result<(), FetchError>
where
    S: RecordSource + Send + Sync + 'static,
{
    let mut inflight = JoinSet::new();

    for query in keystrokes {
        if let Some(issued) = aggregator.set_query(query.clone()) {
            let source = Arc::clone(&source);
            inflight.spawn(async move {
                let outcome = source.fetch_entity_search(&issued.key.query).await;
                (issued, outcome)
            });
        }

        while let Some(joined) = inflight.try_join_next() {
            commit_joined(aggregator, joined);
        }
        tokio::time::sleep(interval).await;
    }

    while let Some(joined) = inflight.join_next().await {
        commit_joined(aggregator, joined);
    }

    match aggregator.state().error() {
        Some(e) => Err(e.clone()),
        None => Ok(()),
    }
}

type JoinedSearch = (Issued<SearchRequest>, Result<Vec<RawSearchHit>, FetchError>);

fn commit_joined(
    aggregator: &mut SearchAggregator,
    joined: Result<JoinedSearch, tokio::task::JoinError>,
) {
    match joined {
        Ok((issued, outcome)) => {
            let (commit, rejected) = aggregator.commit_raw(issued.token, outcome);
            report_commit(commit, &issued.key.query, &rejected);
        }
        Err(e) => tracing::error!("Search task aborted: {}", e),
    }
}

fn report_commit(commit: SearchCommit, query: &str, rejected: &[RawSearchHit]) {
    if commit == SearchCommit::Superseded {
        tracing::debug!(query, "Dropped superseded search response");
        return;
    }
    for hit in rejected {
        tracing::warn!(
            id = %hit.id,
            entity_type = hit.type_tag(),
            "Skipping search hit with unknown entity type"
        );
    }
}
