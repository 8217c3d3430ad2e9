//! # Navigation Dispatch
//!
//! Maps a selected search result to the route it opens.
//!
//! Only people have a detail route; every other entity type opens its
//! listing. Resolution is keyed strictly on the entity type and never fails.
//! Performing the navigation is the job of a [`Navigator`] supplied by the
//! host.

use crate::types::{EntityId, EntitySearchResult, EntityType, RawSearchHit};
use std::fmt;

/// A destination in the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Detail page of one person.
    PersonDetail(EntityId),
    /// Documents listing.
    Documents,
    /// Organizations listing.
    Organizations,
    /// Event timeline.
    Timeline,
    /// Locations listing.
    Locations,
}

impl Route {
    /// Path string understood by the host router.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::PersonDetail(id) => format!("/people/{id}"),
            Self::Documents => "/documents".to_string(),
            Self::Organizations => "/organizations".to_string(),
            Self::Timeline => "/timeline".to_string(),
            Self::Locations => "/locations".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Route for an entity of type `entity_type` with identifier `id`.
#[must_use]
pub fn route_for(entity_type: EntityType, id: &EntityId) -> Route {
    match entity_type {
        EntityType::Person => Route::PersonDetail(id.clone()),
        EntityType::Document => Route::Documents,
        EntityType::Organization => Route::Organizations,
        EntityType::Event => Route::Timeline,
        EntityType::Location => Route::Locations,
    }
}

/// Destination for a typed search result.
///
/// Always `Some` for the closed set of types; the `Option` keeps the
/// signature aligned with [`resolve_raw_navigation`].
#[must_use]
pub fn resolve_navigation(result: &EntitySearchResult) -> Option<Route> {
    Some(route_for(result.entity_type, &result.id))
}

/// Destination for an untyped hit. Unrecognised types resolve to `None`.
#[must_use]
pub fn resolve_raw_navigation(hit: &RawSearchHit) -> Option<Route> {
    EntityType::parse(hit.type_tag()).map(|t| route_for(t, &hit.id))
}

/// Host-side router.
pub trait Navigator {
    /// Navigate to `route`.
    fn navigate_to(&mut self, route: &Route);
}

/// Resolve `result` and forward it to `navigator`.
///
/// Returns whether a navigation happened.
pub fn dispatch<N: Navigator + ?Sized>(navigator: &mut N, result: &EntitySearchResult) -> bool {
    match resolve_navigation(result) {
        Some(route) => {
            navigator.navigate_to(&route);
            true
        }
        None => false,
    }
}

/// Navigator that records every route it is sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<Route>,
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&mut self, route: &Route) {
        self.visited.push(route.clone());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn person_routes_to_detail() {
        let result = EntitySearchResult::new("42", EntityType::Person, "Jane Roe");
        let route = resolve_navigation(&result);
        assert_eq!(route, Some(Route::PersonDetail(EntityId::new("42"))));
        assert_eq!(route.map(|r| r.path()).as_deref(), Some("/people/42"));
    }

    #[test]
    fn listings_ignore_identifier() {
        let doc_a = EntitySearchResult::new("1", EntityType::Document, "Ledger");
        let doc_b = EntitySearchResult::new("99", EntityType::Document, "Invoice");
        assert_eq!(resolve_navigation(&doc_a), Some(Route::Documents));
        assert_eq!(resolve_navigation(&doc_b), Some(Route::Documents));

        let cases = [
            (EntityType::Organization, "/organizations"),
            (EntityType::Event, "/timeline"),
            (EntityType::Location, "/locations"),
        ];
        for (t, path) in cases {
            let result = EntitySearchResult::new("7", t, "x");
            assert_eq!(
                resolve_navigation(&result).map(|r| r.path()).as_deref(),
                Some(path)
            );
        }
    }

    #[test]
    fn unknown_raw_type_is_noop() {
        let hit = RawSearchHit {
            id: EntityId::new("5"),
            entity_type: Some("vehicle".to_string()),
            name: "Van".to_string(),
            subtitle: None,
        };
        assert_eq!(resolve_raw_navigation(&hit), None);

        let known = RawSearchHit {
            entity_type: Some("person".to_string()),
            ..hit
        };
        assert_eq!(
            resolve_raw_navigation(&known),
            Some(Route::PersonDetail(EntityId::new("5")))
        );
    }

    #[test]
    fn dispatch_forwards_to_navigator() {
        let mut nav = RecordingNavigator::default();
        let result = EntitySearchResult::new("3", EntityType::Event, "Raid");
        assert!(dispatch(&mut nav, &result));
        assert_eq!(nav.visited, vec![Route::Timeline]);
    }
}
