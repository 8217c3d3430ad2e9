//! # casefile-core
//!
//! The view-model core for Casefile - THE LOGIC.
//!
//! This crate turns raw record API results into the render-ready structures
//! behind two read-only investigative views:
//!
//! - **Evidence Pager** (`pager`): paginated evidence register with a single
//!   expandable chain-of-custody row.
//! - **Search Aggregator** (`search`): faceted entity search results, grouped
//!   by entity type, with client-side type filtering and type-based
//!   navigation (`navigation`).
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Never fetches, routes or renders; those are external collaborators
//! - Never mutates a record; only local UI state changes
//! - Keys every fetch with a `RequestToken` so the last issued request wins
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod navigation;
pub mod pager;
pub mod primitives;
pub mod request;
pub mod search;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CasefileError, CustodyRecord, EntityId, EntitySearchResult, EntityType, EvidenceId,
    EvidencePageResponse, EvidenceRecord, EvidenceStatus, FetchError, LoadState, RawSearchHit,
    partition_hits,
};

// =============================================================================
// RE-EXPORTS: Views
// =============================================================================

pub use navigation::{
    Navigator, RecordingNavigator, Route, dispatch, resolve_navigation, resolve_raw_navigation,
};
pub use pager::{EvidencePage, EvidencePager, PageCommit, PageRequest};
pub use request::{Issued, RequestSequencer, RequestToken};
pub use search::{
    SearchAggregator, SearchCommit, SearchRequest, SearchView, TypeCounts, TypeGroups,
    apply_filter, compute_counts, group_by_type,
};
