//! # Request Sequencing
//!
//! Last-issued-wins ordering for asynchronous fetches.
//!
//! Every fetch a view issues is stamped with a `RequestToken` drawn from a
//! monotonically increasing `RequestSequencer`. A response may only be
//! committed while its token is still the latest one issued; any older
//! response is superseded and must be dropped, regardless of when it
//! completes.

/// Opaque, ordered stamp attached to one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Issues request tokens and decides which response is current.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    /// Sequence number of the most recently issued request (0 = none).
    latest: u64,
}

impl RequestSequencer {
    /// Create a sequencer with no issued requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one.
    pub fn issue(&mut self) -> RequestToken {
        self.latest = self.latest.saturating_add(1);
        RequestToken(self.latest)
    }

    /// Whether a response stamped with `token` may be committed.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest != 0 && token.0 == self.latest
    }

    /// Supersede any in-flight request without issuing a new one.
    ///
    /// Used when a view returns to idle and nothing it has in flight may land.
    pub fn invalidate(&mut self) {
        self.latest = self.latest.saturating_add(1);
    }
}

/// A keyed request a view asks the fetch layer to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued<K> {
    /// Token to hand back with the response.
    pub token: RequestToken,
    /// What to fetch.
    pub key: K,
}

// =============================================================================
// TESTS
// =============================================================================
