//! # Property-Based Tests
//!
//! Invariants of the pager and the search aggregator, checked with proptest.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use casefile_core::{
    EntitySearchResult, EntityType, EvidenceId, EvidencePageResponse, EvidencePager,
    SearchAggregator, apply_filter, compute_counts, group_by_type,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// STRATEGIES
// =============================================================================

fn entity_type() -> impl Strategy<Value = EntityType> {
    prop::sample::select(EntityType::ALL.to_vec())
}

fn result_set(max: usize) -> impl Strategy<Value = Vec<EntitySearchResult>> {
    vec(entity_type(), 0..max).prop_map(|types| {
        types
            .into_iter()
            .enumerate()
            .map(|(i, t)| EntitySearchResult::new(i.to_string(), t, format!("entity {i}")))
            .collect()
    })
}

fn selection() -> impl Strategy<Value = BTreeSet<EntityType>> {
    vec(entity_type(), 0..=EntityType::COUNT).prop_map(|types| types.into_iter().collect())
}

/// Pager that has accepted one response with `total_count` records.
fn loaded_pager(total_count: usize, page_size: usize) -> EvidencePager {
    let mut pager = EvidencePager::new(page_size);
    let issued = pager.load();
    pager.commit(
        issued.token,
        Ok(EvidencePageResponse {
            items: Vec::new(),
            total_count,
            total_pages: 0,
        }),
    );
    pager
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Any target page lands inside [1, total_pages].
    #[test]
    fn go_to_page_stays_in_bounds(
        total_count in 1usize..5000,
        page_size in 1usize..100,
        target in 0usize..10_000
    ) {
        let mut pager = loaded_pager(total_count, page_size);
        let total_pages = pager.total_pages();
        let issued = pager.go_to_page(target);

        prop_assert!(issued.key.page >= 1);
        prop_assert!(issued.key.page <= total_pages);
        prop_assert_eq!(issued.key.page, pager.current_page());
    }

    /// Toggling the same row twice collapses it.
    #[test]
    fn toggle_expanded_twice_collapses(id in "[a-z0-9]{1,12}") {
        let mut pager = EvidencePager::default();
        let id = EvidenceId::new(id);
        pager.toggle_expanded(&id);
        pager.toggle_expanded(&id);
        prop_assert_eq!(pager.expanded_id(), None);
    }

    /// Toggling the same type twice restores the selection.
    #[test]
    fn toggle_type_twice_restores_selection(
        initial in selection(),
        toggled in entity_type()
    ) {
        let mut agg = SearchAggregator::new();
        for t in &initial {
            agg.toggle_type(*t);
        }
        let before = agg.selected().clone();

        agg.toggle_type(toggled);
        agg.toggle_type(toggled);
        prop_assert_eq!(agg.selected(), &before);
    }

    /// Toggles commute across types.
    #[test]
    fn toggle_type_commutes(a in entity_type(), b in entity_type()) {
        let mut first = SearchAggregator::new();
        first.toggle_type(a);
        first.toggle_type(b);

        let mut second = SearchAggregator::new();
        second.toggle_type(b);
        second.toggle_type(a);

        prop_assert_eq!(first.selected(), second.selected());
    }

    /// Per-type counts sum to the number of results.
    #[test]
    fn counts_sum_to_total(results in result_set(200)) {
        prop_assert_eq!(compute_counts(&results).total(), results.len());
    }

    /// Filter-then-group only yields selected types and reproduces the
    /// filtered subset, each type in its original order.
    #[test]
    fn grouping_partitions_filtered_results(
        results in result_set(200),
        selected in selection()
    ) {
        let filtered = apply_filter(&results, &selected);
        let groups = group_by_type(filtered.iter().copied());

        for t in groups.keys() {
            prop_assert!(selected.is_empty() || selected.contains(t));
        }

        let regrouped: usize = groups.values().map(Vec::len).sum();
        prop_assert_eq!(regrouped, filtered.len());

        for (t, group) in &groups {
            let expected: Vec<_> = filtered
                .iter()
                .filter(|r| r.entity_type == *t)
                .map(|r| r.id.clone())
                .collect();
            let actual: Vec<_> = group.iter().map(|r| r.id.clone()).collect();
            prop_assert_eq!(actual, expected);
        }

        // Canonical type order.
        let keys: Vec<_> = groups.keys().copied().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }

    /// Counts do not move when the selection changes.
    #[test]
    fn counts_independent_of_selection(
        results in result_set(100),
        toggles in vec(entity_type(), 0..10)
    ) {
        let mut agg = SearchAggregator::new();
        let issued = agg.set_query("query").unwrap();
        agg.commit(issued.token, Ok(results));
        let before = *agg.counts();

        for t in toggles {
            agg.toggle_type(t);
            prop_assert_eq!(*agg.view().counts, before);
        }
        agg.clear_filters();
        prop_assert_eq!(*agg.counts(), before);
    }

    /// Queries shorter than two characters never issue a request.
    #[test]
    fn activation_gate(query in "\\PC{0,6}") {
        let mut agg = SearchAggregator::new();
        let issued = agg.set_query(query.clone());
        prop_assert_eq!(issued.is_some(), query.chars().count() >= 2);
    }
}
