//! # Search Aggregator
//!
//! Faceted view over a flat list of entity search results.
//!
//! The pipeline for one committed result set is:
//!
//! ```text
//! results ──► compute_counts ──► TypeCounts        (once, unfiltered)
//!    │
//!    └──► apply_filter(selected) ──► group_by_type ──► TypeGroups
//! ```
//!
//! Counts are computed before filtering and cached, so toggling a facet
//! never changes them. Groups iterate in the canonical entity-type order
//! and keep each type's results in the order they were received.
//!
//! ## Activation
//!
//! Queries shorter than [`MIN_QUERY_CHARS`](crate::primitives::MIN_QUERY_CHARS)
//! leave the aggregator idle and issue no request. This is distinct from a
//! request that came back with zero results (`LoadState::Empty`).

use crate::primitives::query_is_active;
use crate::request::{Issued, RequestSequencer, RequestToken};
use crate::types::{
    EntitySearchResult, EntityType, FetchError, LoadState, RawSearchHit, partition_hits,
};
use std::collections::{BTreeMap, BTreeSet};

/// Results grouped by entity type, canonical type order.
pub type TypeGroups<'a> = BTreeMap<EntityType, Vec<&'a EntitySearchResult>>;

// =============================================================================
// TYPE COUNTS
// =============================================================================

/// Number of results per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeCounts([usize; EntityType::COUNT]);

impl TypeCounts {
    /// Count for one type.
    #[must_use]
    pub fn get(&self, entity_type: EntityType) -> usize {
        self.0[entity_type.index()]
    }

    /// Sum over all types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Types with a non-zero count, canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityType, usize)> + '_ {
        EntityType::ALL
            .into_iter()
            .map(|t| (t, self.get(t)))
            .filter(|(_, n)| *n > 0)
    }

    /// Non-zero counts as a map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<EntityType, usize> {
        self.iter().collect()
    }
}

// =============================================================================
// PURE TRANSFORMS
// =============================================================================

/// Tally results per type over the full, unfiltered set. O(n).
#[must_use]
pub fn compute_counts(results: &[EntitySearchResult]) -> TypeCounts {
    let mut counts = TypeCounts::default();
    for result in results {
        counts.0[result.entity_type.index()] += 1;
    }
    counts
}

/// Keep results whose type is selected. An empty selection keeps everything.
#[must_use]
pub fn apply_filter<'a>(
    results: &'a [EntitySearchResult],
    selected: &BTreeSet<EntityType>,
) -> Vec<&'a EntitySearchResult> {
    if selected.is_empty() {
        return results.iter().collect();
    }
    results
        .iter()
        .filter(|r| selected.contains(&r.entity_type))
        .collect()
}

/// Partition results by their own type tag. O(n), order-preserving.
///
/// Only types that actually occur get a group.
#[must_use]
pub fn group_by_type<'a, I>(results: I) -> TypeGroups<'a>
where
    I: IntoIterator<Item = &'a EntitySearchResult>,
{
    let mut groups = TypeGroups::new();
    for result in results {
        groups.entry(result.entity_type).or_default().push(result);
    }
    groups
}

// =============================================================================
// AGGREGATOR STATE
// =============================================================================

/// What the fetch layer is asked to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

/// Result of handing a response back to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCommit {
    /// The response was current and is now the view's data.
    Applied,
    /// A newer query was issued meanwhile; the response was dropped.
    Superseded,
}

/// Faceted search state: query, filter selection and last accepted results.
#[derive(Debug, Clone, Default)]
pub struct SearchAggregator {
    query: String,
    selected: BTreeSet<EntityType>,
    results: Vec<EntitySearchResult>,
    counts: TypeCounts,
    state: LoadState,
    sequencer: RequestSequencer,
}

impl SearchAggregator {
    /// Create an idle aggregator with no filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn selected(&self) -> &BTreeSet<EntityType> {
        &self.selected
    }

    #[must_use]
    pub fn results(&self) -> &[EntitySearchResult] {
        &self.results
    }

    /// Counts over the unfiltered results of the last accepted response.
    #[must_use]
    pub fn counts(&self) -> &TypeCounts {
        &self.counts
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    // =========================================================================
    // QUERY
    // =========================================================================

    /// Replace the query.
    ///
    /// Returns the request to perform, or `None` when the query is below the
    /// activation length. In that case results are cleared, the state goes
    /// back to `Idle` and any in-flight search is superseded.
    pub fn set_query(&mut self, query: impl Into<String>) -> Option<Issued<SearchRequest>> {
        self.query = query.into();
        if !query_is_active(&self.query) {
            self.sequencer.invalidate();
            self.results.clear();
            self.counts = TypeCounts::default();
            self.state = LoadState::Idle;
            return None;
        }
        Some(self.issue())
    }

    /// Re-issue the current query. `None` if the query is inactive.
    pub fn retry(&mut self) -> Option<Issued<SearchRequest>> {
        if !query_is_active(&self.query) {
            return None;
        }
        Some(self.issue())
    }

    fn issue(&mut self) -> Issued<SearchRequest> {
        self.state = LoadState::Loading;
        Issued {
            token: self.sequencer.issue(),
            key: SearchRequest {
                query: self.query.clone(),
            },
        }
    }

    /// Hand a fetch outcome back to the aggregator.
    ///
    /// Counts are computed here, once per accepted result set. On failure the
    /// filter selection and last good results are kept.
    pub fn commit(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<EntitySearchResult>, FetchError>,
    ) -> SearchCommit {
        if !self.sequencer.is_current(token) {
            return SearchCommit::Superseded;
        }

        match outcome {
            Ok(results) => {
                self.counts = compute_counts(&results);
                self.results = results;
                self.state = if self.results.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Loaded
                };
            }
            Err(e) => self.state = LoadState::Failed(e),
        }
        SearchCommit::Applied
    }

    /// Like [`commit`](Self::commit) for untyped hits.
    ///
    /// Hits with unrecognised entity types are left out of the result set
    /// and returned so the caller can report them.
    pub fn commit_raw(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<RawSearchHit>, FetchError>,
    ) -> (SearchCommit, Vec<RawSearchHit>) {
        match outcome {
            Ok(hits) => {
                let (accepted, rejected) = partition_hits(hits);
                (self.commit(token, Ok(accepted)), rejected)
            }
            Err(e) => (self.commit(token, Err(e)), Vec::new()),
        }
    }

    // =========================================================================
    // FILTER SELECTION
    // =========================================================================

    /// Add `entity_type` to the selection, or remove it if present.
    pub fn toggle_type(&mut self, entity_type: EntityType) {
        if !self.selected.remove(&entity_type) {
            self.selected.insert(entity_type);
        }
    }

    /// Reset the selection to "all types".
    pub fn clear_filters(&mut self) {
        self.selected.clear();
    }

    #[must_use]
    pub fn is_selected(&self, entity_type: EntityType) -> bool {
        self.selected.contains(&entity_type)
    }

    // =========================================================================
    // VIEW MODEL
    // =========================================================================

    /// Render-ready grouped and filtered view.
    #[must_use]
    pub fn view(&self) -> SearchView<'_> {
        let filtered = apply_filter(&self.results, &self.selected);
        let visible = filtered.len();
        SearchView {
            query: &self.query,
            groups: group_by_type(filtered),
            counts: &self.counts,
            selected: &self.selected,
            state: &self.state,
            total: self.results.len(),
            visible,
        }
    }
}

/// Borrowed view model of the search results.
#[derive(Debug, Clone)]
pub struct SearchView<'a> {
    pub query: &'a str,
    /// Filtered results by type.
    pub groups: TypeGroups<'a>,
    /// Unfiltered per-type counts.
    pub counts: &'a TypeCounts,
    pub selected: &'a BTreeSet<EntityType>,
    pub state: &'a LoadState,
    /// Results before filtering.
    pub total: usize,
    /// Results after filtering.
    pub visible: usize,
}

impl SearchView<'_> {
    /// Whether a facet filter is active.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        !self.selected.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn result(id: &str, t: EntityType) -> EntitySearchResult {
        EntitySearchResult::new(id, t, format!("entity {id}"))
    }

    fn ids(group: &[&EntitySearchResult]) -> Vec<String> {
        group.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn counts_cover_every_result() {
        let results = vec![
            result("1", EntityType::Person),
            result("2", EntityType::Event),
            result("3", EntityType::Person),
        ];
        let counts = compute_counts(&results);
        assert_eq!(counts.get(EntityType::Person), 2);
        assert_eq!(counts.get(EntityType::Event), 1);
        assert_eq!(counts.get(EntityType::Location), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn groups_follow_canonical_order() {
        let results = vec![
            result("1", EntityType::Location),
            result("2", EntityType::Person),
            result("3", EntityType::Document),
            result("4", EntityType::Person),
        ];
        let groups = group_by_type(&results);
        let order: Vec<_> = groups.keys().copied().collect();
        assert_eq!(
            order,
            vec![EntityType::Person, EntityType::Document, EntityType::Location]
        );
        assert_eq!(ids(&groups[&EntityType::Person]), vec!["2", "4"]);
    }

    #[test]
    fn empty_selection_means_all() {
        let results = vec![
            result("1", EntityType::Person),
            result("2", EntityType::Event),
        ];
        assert_eq!(apply_filter(&results, &BTreeSet::new()).len(), 2);

        let only_events: BTreeSet<_> = [EntityType::Event].into_iter().collect();
        let filtered = apply_filter(&results, &only_events);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id.as_str(), "2");
    }

    #[test]
    fn short_query_does_not_issue() {
        let mut agg = SearchAggregator::new();
        assert!(agg.set_query("a").is_none());
        assert_eq!(agg.state(), &LoadState::Idle);

        let issued = agg.set_query("ab");
        assert_eq!(issued.map(|i| i.key.query).as_deref(), Some("ab"));
        assert!(agg.state().is_loading());
    }

    #[test]
    fn shortening_query_supersedes_inflight() {
        let mut agg = SearchAggregator::new();
        let issued = agg.set_query("smith").unwrap();
        assert!(agg.set_query("s").is_none());

        let outcome = agg.commit(issued.token, Ok(vec![result("1", EntityType::Person)]));
        assert_eq!(outcome, SearchCommit::Superseded);
        assert_eq!(agg.state(), &LoadState::Idle);
        assert!(agg.results().is_empty());
    }

    #[test]
    fn toggle_is_symmetric_difference() {
        let mut agg = SearchAggregator::new();
        agg.toggle_type(EntityType::Person);
        agg.toggle_type(EntityType::Event);
        assert!(agg.is_selected(EntityType::Person));
        assert!(agg.is_selected(EntityType::Event));

        agg.toggle_type(EntityType::Person);
        assert!(!agg.is_selected(EntityType::Person));
        assert_eq!(agg.selected().len(), 1);

        agg.clear_filters();
        assert!(agg.selected().is_empty());
    }

    #[test]
    fn filter_changes_groups_not_counts() {
        let mut agg = SearchAggregator::new();
        let issued = agg.set_query("roe").unwrap();
        let results = vec![
            result("1", EntityType::Person),
            result("2", EntityType::Document),
        ];
        agg.commit(issued.token, Ok(results));
        let before = *agg.counts();

        agg.toggle_type(EntityType::Document);
        let view = agg.view();
        assert_eq!(*view.counts, before);
        assert_eq!(view.groups.len(), 1);
        assert!(view.groups.contains_key(&EntityType::Document));
        assert_eq!(view.visible, 1);
        assert_eq!(view.total, 2);
        assert!(view.is_filtered());
    }

    #[test]
    fn failure_keeps_selection_and_results() {
        let mut agg = SearchAggregator::new();
        let issued = agg.set_query("roe").unwrap();
        agg.commit(issued.token, Ok(vec![result("1", EntityType::Person)]));
        agg.toggle_type(EntityType::Person);

        let issued = agg.retry().unwrap();
        agg.commit(issued.token, Err(FetchError::Unauthorized));
        assert_eq!(agg.state().error(), Some(&FetchError::Unauthorized));
        assert!(agg.is_selected(EntityType::Person));
        assert_eq!(agg.results().len(), 1);
    }

    #[test]
    fn zero_results_is_empty_not_idle() {
        let mut agg = SearchAggregator::new();
        let issued = agg.set_query("zz").unwrap();
        agg.commit(issued.token, Ok(Vec::new()));
        assert_eq!(agg.state(), &LoadState::Empty);
    }

    #[test]
    fn commit_raw_reports_unknown_types() {
        let mut agg = SearchAggregator::new();
        let hit = |id: &str, t: &str| RawSearchHit {
            id: id.into(),
            entity_type: Some(t.to_string()),
            name: id.to_string(),
            subtitle: None,
        };
        let issued = agg.set_query("van").unwrap();
        let (commit, rejected) = agg.commit_raw(
            issued.token,
            Ok(vec![hit("1", "vehicle"), hit("2", "location")]),
        );
        assert_eq!(commit, SearchCommit::Applied);
        assert_eq!(rejected.len(), 1);
        assert_eq!(agg.counts().total(), 1);
    }
}
