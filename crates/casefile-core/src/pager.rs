//! # Evidence Pager
//!
//! Local state and view model for the paginated evidence register.
//!
//! The pager owns exactly two pieces of UI state: the current page and the
//! single expanded row. Everything else (records, totals, load state) is the
//! last accepted response from the fetch layer.
//!
//! ## Fetch Protocol
//!
//! The pager never fetches by itself. Navigation returns an
//! [`Issued<PageRequest>`](crate::request::Issued); the caller performs the
//! fetch and hands the outcome back through [`EvidencePager::commit`]
//! together with the token. Responses for superseded requests are dropped.
//!
//! ## Expansion
//!
//! At most one row is expanded. Changing page does not clear the expanded
//! id: if the id is not on the newly loaded page, no row renders expanded.

use crate::primitives::{DEFAULT_PAGE_SIZE, FIRST_PAGE, page_count};
use crate::request::{Issued, RequestSequencer, RequestToken};
use crate::types::{EvidenceId, EvidencePageResponse, EvidenceRecord, FetchError, LoadState};

/// What the fetch layer is asked to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number.
    pub page: usize,
    /// Records per page.
    pub page_size: usize,
}

/// Result of handing a response back to the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommit {
    /// The response was current and is now the view's data.
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
    /// The response shrank the page count below the current page.
    /// The page was clamped and a request for it issued.
    Reissued(Issued<PageRequest>),
}

/// Evidence register state.
#[derive(Debug, Clone)]
pub struct EvidencePager {
    page_size: usize,
    current_page: usize,
    expanded_id: Option<EvidenceId>,
    records: Vec<EvidenceRecord>,
    total_count: usize,
    /// Page count from the last accepted response; `None` until one arrives.
    total_pages: Option<usize>,
    state: LoadState,
    sequencer: RequestSequencer,
}

impl Default for EvidencePager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl EvidencePager {
    /// Create a pager on page 1. A zero page size falls back to the default.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
            current_page: FIRST_PAGE,
            expanded_id: None,
            records: Vec::new(),
            total_count: 0,
            total_pages: None,
            state: LoadState::Idle,
            sequencer: RequestSequencer::new(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn expanded_id(&self) -> Option<&EvidenceId> {
        self.expanded_id.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Last known page count, `0` before the first response.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages.unwrap_or(0)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    #[must_use]
    pub fn records(&self) -> &[EvidenceRecord] {
        &self.records
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Clamp a page number against the last known page count.
    ///
    /// With no known count (or zero pages) only the lower bound applies.
    #[must_use]
    pub fn clamp_page(&self, target: usize) -> usize {
        match self.total_pages {
            Some(pages) if pages >= FIRST_PAGE => target.clamp(FIRST_PAGE, pages),
            _ => target.max(FIRST_PAGE),
        }
    }

    /// Request the current page. Used for the initial load.
    pub fn load(&mut self) -> Issued<PageRequest> {
        self.issue()
    }

    /// Move to `target` (clamped) and request that page.
    ///
    /// A request is issued even when the page does not change, since the
    /// page is part of the fetch key. The expanded row is left untouched.
    pub fn go_to_page(&mut self, target: usize) -> Issued<PageRequest> {
        self.current_page = self.clamp_page(target);
        self.issue()
    }

    /// Move one page forward (clamped).
    pub fn next_page(&mut self) -> Issued<PageRequest> {
        self.go_to_page(self.current_page.saturating_add(1))
    }

    /// Move one page back (clamped).
    pub fn previous_page(&mut self) -> Issued<PageRequest> {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current_page > FIRST_PAGE
    }

    /// Re-issue the request for the current page after a failure.
    pub fn retry(&mut self) -> Issued<PageRequest> {
        self.issue()
    }

    fn issue(&mut self) -> Issued<PageRequest> {
        self.state = LoadState::Loading;
        Issued {
            token: self.sequencer.issue(),
            key: PageRequest {
                page: self.current_page,
                page_size: self.page_size,
            },
        }
    }

    // =========================================================================
    // EXPANSION
    // =========================================================================

    /// Expand `id`, or collapse it if it is already the expanded row.
    pub fn toggle_expanded(&mut self, id: &EvidenceId) {
        if self.expanded_id.as_ref() == Some(id) {
            self.expanded_id = None;
        } else {
            self.expanded_id = Some(id.clone());
        }
    }

    /// The expanded record, if it is on the current page.
    #[must_use]
    pub fn expanded_record(&self) -> Option<&EvidenceRecord> {
        let id = self.expanded_id.as_ref()?;
        self.records.iter().find(|r| &r.id == id)
    }

    // =========================================================================
    // RESPONSES
    // =========================================================================

    /// Hand a fetch outcome back to the pager.
    ///
    /// On failure the current page, expanded row and last good records are
    /// kept so a retry resumes in place.
    pub fn commit(
        &mut self,
        token: RequestToken,
        outcome: Result<EvidencePageResponse, FetchError>,
    ) -> PageCommit {
        if !self.sequencer.is_current(token) {
            return PageCommit::Superseded;
        }

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                self.state = LoadState::Failed(e);
                return PageCommit::Applied;
            }
        };

        let pages = if response.total_pages > 0 {
            response.total_pages
        } else {
            page_count(response.total_count, self.page_size)
        };
        self.total_count = response.total_count;
        self.total_pages = Some(pages);
        self.records = response.items;
        self.state = if self.records.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded
        };

        if pages >= FIRST_PAGE && self.current_page > pages {
            self.current_page = pages;
            return PageCommit::Reissued(self.issue());
        }

        PageCommit::Applied
    }

    // =========================================================================
    // VIEW MODEL
    // =========================================================================

    /// Render-ready view of the current page.
    #[must_use]
    pub fn view(&self) -> EvidencePage<'_> {
        EvidencePage {
            records: &self.records,
            total_count: self.total_count,
            total_pages: self.total_pages(),
            current_page: self.current_page,
            expanded_id: self.expanded_id.as_ref(),
            state: &self.state,
        }
    }
}

/// Borrowed view model of one evidence page.
#[derive(Debug, Clone, Copy)]
pub struct EvidencePage<'a> {
    pub records: &'a [EvidenceRecord],
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub expanded_id: Option<&'a EvidenceId>,
    pub state: &'a LoadState,
}

impl EvidencePage<'_> {
    /// Whether `record` renders expanded.
    #[must_use]
    pub fn is_expanded(&self, record: &EvidenceRecord) -> bool {
        self.expanded_id == Some(&record.id)
    }

    /// Pagination controls are hidden for a single page or less.
    #[must_use]
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn records(ids: &[&str]) -> Vec<EvidenceRecord> {
        ids.iter()
            .map(|id| EvidenceRecord::new(EvidenceId::new(*id)))
            .collect()
    }

    fn page(ids: &[&str], total_count: usize, total_pages: usize) -> EvidencePageResponse {
        EvidencePageResponse {
            items: records(ids),
            total_count,
            total_pages,
        }
    }

    #[test]
    fn initial_state() {
        let pager = EvidencePager::default();
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(pager.expanded_id(), None);
        assert_eq!(pager.state(), &LoadState::Idle);
        assert!(!pager.view().show_pagination());
    }

    #[test]
    fn clamp_without_known_pages() {
        let mut pager = EvidencePager::default();
        assert_eq!(pager.go_to_page(0).key.page, 1);
        assert_eq!(pager.go_to_page(7).key.page, 7);
    }

    #[test]
    fn clamp_with_known_pages() {
        let mut pager = EvidencePager::default();
        let req = pager.load();
        pager.commit(req.token, Ok(page(&["a", "b", "c"], 45, 3)));

        assert_eq!(pager.go_to_page(10).key.page, 3);
        assert_eq!(pager.go_to_page(0).key.page, 1);
        assert_eq!(pager.go_to_page(2).key.page, 2);
    }

    #[test]
    fn total_pages_derived_when_missing() {
        let mut pager = EvidencePager::new(20);
        let req = pager.load();
        pager.commit(req.token, Ok(page(&["a"], 41, 0)));
        assert_eq!(pager.total_pages(), 3);
    }

    #[test]
    fn same_page_still_issues_request() {
        let mut pager = EvidencePager::default();
        let first = pager.load();
        pager.commit(first.token, Ok(page(&["a"], 45, 3)));

        let again = pager.go_to_page(1);
        assert_eq!(again.key.page, 1);
        assert!(again.token > first.token);
        assert!(pager.state().is_loading());
    }

    #[test]
    fn toggle_expanded_round_trip() {
        let mut pager = EvidencePager::default();
        let a = EvidenceId::new("a");
        let b = EvidenceId::new("b");

        pager.toggle_expanded(&a);
        assert_eq!(pager.expanded_id(), Some(&a));
        pager.toggle_expanded(&b);
        assert_eq!(pager.expanded_id(), Some(&b));
        pager.toggle_expanded(&b);
        assert_eq!(pager.expanded_id(), None);
    }

    #[test]
    fn expansion_survives_page_change_but_goes_stale() {
        let mut pager = EvidencePager::default();
        let req = pager.load();
        pager.commit(req.token, Ok(page(&["a", "b"], 45, 3)));
        pager.toggle_expanded(&EvidenceId::new("b"));
        assert!(pager.expanded_record().is_some());

        let req = pager.go_to_page(2);
        assert_eq!(pager.expanded_id(), Some(&EvidenceId::new("b")));
        pager.commit(req.token, Ok(page(&["x", "y"], 45, 3)));

        assert_eq!(pager.expanded_id(), Some(&EvidenceId::new("b")));
        assert!(pager.expanded_record().is_none());
        let view = pager.view();
        assert!(view.records.iter().all(|r| !view.is_expanded(r)));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut pager = EvidencePager::default();
        let first = pager.go_to_page(1);
        let second = pager.go_to_page(2);

        assert_eq!(
            pager.commit(second.token, Ok(page(&["p2"], 45, 3))),
            PageCommit::Applied
        );
        assert_eq!(
            pager.commit(first.token, Ok(page(&["p1"], 45, 3))),
            PageCommit::Superseded
        );
        assert_eq!(pager.records()[0].id.as_str(), "p2");
    }

    #[test]
    fn failure_preserves_local_state() {
        let mut pager = EvidencePager::default();
        let req = pager.load();
        pager.commit(req.token, Ok(page(&["a"], 45, 3)));
        pager.toggle_expanded(&EvidenceId::new("a"));

        let req = pager.go_to_page(2);
        pager.commit(req.token, Err(FetchError::Unreachable("down".into())));

        assert!(pager.state().error().is_some());
        assert_eq!(pager.current_page(), 2);
        assert_eq!(pager.expanded_id(), Some(&EvidenceId::new("a")));

        let retry = pager.retry();
        assert_eq!(retry.key.page, 2);
        assert!(pager.state().is_loading());
    }

    #[test]
    fn empty_result_is_distinct_state() {
        let mut pager = EvidencePager::default();
        let req = pager.load();
        pager.commit(req.token, Ok(page(&[], 0, 0)));
        assert_eq!(pager.state(), &LoadState::Empty);
        assert_eq!(pager.current_page(), 1);
        assert!(!pager.view().show_pagination());
    }

    #[test]
    fn shrinking_total_reissues_clamped_page() {
        let mut pager = EvidencePager::default();
        let req = pager.go_to_page(5);
        let outcome = pager.commit(req.token, Ok(page(&[], 45, 3)));

        assert!(matches!(outcome, PageCommit::Reissued(ref issued) if issued.key.page == 3));
        assert_eq!(pager.current_page(), 3);
    }

    #[test]
    fn next_and_previous_stay_in_bounds() {
        let mut pager = EvidencePager::default();
        let req = pager.load();
        pager.commit(req.token, Ok(page(&["a"], 45, 3)));

        assert!(!pager.has_previous());
        assert_eq!(pager.previous_page().key.page, 1);
        pager.next_page();
        pager.next_page();
        assert_eq!(pager.next_page().key.page, 3);
        assert!(!pager.has_next());
        assert!(pager.has_previous());
    }
}
