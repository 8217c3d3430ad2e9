//! # Core Type Definitions
//!
//! This module contains all record and state types shared by the Casefile views:
//! - Record identifiers (`EvidenceId`, `EntityId`)
//! - Evidence register records (`EvidenceRecord`, `CustodyRecord`, `EvidenceStatus`)
//! - Entity search records (`EntityType`, `EntitySearchResult`, `RawSearchHit`)
//! - Fetch responses and load states (`EvidencePageResponse`, `LoadState`)
//! - Error types (`CasefileError`, `FetchError`)
//!
//! ## Read-Only Guarantee
//!
//! Records are received from the fetch layer and handed to presentation as-is.
//! Nothing in this crate mutates a record after it has been decoded.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Record APIs emit identifiers either as JSON strings or as integers.
/// Both decode to the same textual identifier.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Unsigned(n) => n.to_string(),
        Repr::Signed(n) => n.to_string(),
    })
}

/// Unique, stable identifier of an evidence record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceId(#[serde(deserialize_with = "string_or_number")] pub String);

impl EvidenceId {
    /// Create an evidence identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an entity returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(#[serde(deserialize_with = "string_or_number")] pub String);

impl EntityId {
    /// Create an entity identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// EVIDENCE REGISTER
// =============================================================================

/// Custody status of a piece of evidence.
///
/// The API sends free text. The five known values map to variants; anything
/// else is kept verbatim in `Unknown` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvidenceStatus {
    InCustody,
    Released,
    Destroyed,
    Transferred,
    Sealed,
    Unknown(String),
}

impl EvidenceStatus {
    /// Parse a status tag. Case-insensitive; `-` and spaces count as `_`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "in_custody" => Self::InCustody,
            "released" => Self::Released,
            "destroyed" => Self::Destroyed,
            "transferred" => Self::Transferred,
            "sealed" => Self::Sealed,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Wire form of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InCustody => "in_custody",
            Self::Released => "released",
            Self::Destroyed => "destroyed",
            Self::Transferred => "transferred",
            Self::Sealed => "sealed",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the status is one of the known custody states.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for EvidenceStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<EvidenceStatus> for String {
    fn from(status: EvidenceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One entry in a chain of custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    pub date: String,
    pub action: String,
    #[serde(alias = "handler_name", alias = "handledBy")]
    pub handler: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A single row of the evidence register.
///
/// The chain of custody is kept in the order the API returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: EvidenceId,
    #[serde(default, alias = "evidenceNumber")]
    pub evidence_number: Option<String>,
    #[serde(default, alias = "evidenceType")]
    pub evidence_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "seizedFrom")]
    pub seized_from: Option<String>,
    #[serde(default, alias = "seizureDate")]
    pub seizure_date: Option<String>,
    #[serde(default)]
    pub status: Option<EvidenceStatus>,
    #[serde(default, alias = "currentLocation")]
    pub current_location: Option<String>,
    #[serde(default, alias = "chainOfCustody")]
    pub chain_of_custody: Vec<CustodyRecord>,
    #[serde(default, alias = "sourceDocument")]
    pub source_document: Option<String>,
}

/// Number of identifier characters used in a derived evidence label.
const DERIVED_LABEL_CHARS: usize = 8;

impl EvidenceRecord {
    /// Create a record with only an identifier set.
    #[must_use]
    pub fn new(id: EvidenceId) -> Self {
        Self {
            id,
            evidence_number: None,
            evidence_type: None,
            description: None,
            seized_from: None,
            seizure_date: None,
            status: None,
            current_location: None,
            chain_of_custody: Vec::new(),
            source_document: None,
        }
    }

    /// Label shown for the row.
    ///
    /// Uses the evidence number when present and non-blank, otherwise
    /// `EV-` followed by the first eight identifier characters, uppercased.
    #[must_use]
    pub fn display_label(&self) -> String {
        match self.evidence_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => {
                let prefix: String = self
                    .id
                    .as_str()
                    .chars()
                    .take(DERIVED_LABEL_CHARS)
                    .collect();
                format!("EV-{}", prefix.to_uppercase())
            }
        }
    }

    /// Whether the record carries any custody history.
    #[must_use]
    pub fn has_custody_history(&self) -> bool {
        !self.chain_of_custody.is_empty()
    }
}

/// One page as returned by the evidence list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePageResponse {
    pub items: Vec<EvidenceRecord>,
    #[serde(alias = "totalCount", alias = "total")]
    pub total_count: usize,
    #[serde(default, alias = "totalPages")]
    pub total_pages: usize,
}

// =============================================================================
// ENTITY SEARCH
// =============================================================================

/// The closed set of searchable entity kinds.
///
/// Declaration order is the canonical display order; `Ord` follows it, so a
/// `BTreeMap<EntityType, _>` iterates person, organization, document, event,
/// location.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Organization,
    Document,
    Event,
    Location,
}

impl EntityType {
    /// Number of entity types.
    pub const COUNT: usize = 5;

    /// Every entity type in canonical order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Person,
        Self::Organization,
        Self::Document,
        Self::Event,
        Self::Location,
    ];

    /// Parse a wire type tag. Exact lowercase match only, no inference.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "person" => Some(Self::Person),
            "organization" => Some(Self::Organization),
            "document" => Some(Self::Document),
            "event" => Some(Self::Event),
            "location" => Some(Self::Location),
            _ => None,
        }
    }

    /// Wire form of the type tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Document => "document",
            Self::Event => "event",
            Self::Location => "location",
        }
    }

    /// Position in the canonical ordering.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Person => 0,
            Self::Organization => 1,
            Self::Document => 2,
            Self::Event => 3,
            Self::Location => 4,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = CasefileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CasefileError::UnknownEntityType(s.to_string()))
    }
}

/// A typed entity search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySearchResult {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl EntitySearchResult {
    /// Create a result without a subtitle.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type,
            name: name.into(),
            subtitle: None,
        }
    }

    /// Attach a subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A search hit exactly as the endpoint sent it, with the type still untyped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchHit {
    pub id: EntityId,
    /// Missing and `null` tags decode as `None` and are rejected later.
    #[serde(default, alias = "entityType", alias = "type")]
    pub entity_type: Option<String>,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl RawSearchHit {
    /// The type tag as sent, or `""` when the endpoint left it out.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        self.entity_type.as_deref().unwrap_or_default()
    }

    /// Convert into a typed result.
    ///
    /// Returns `CasefileError::UnknownEntityType` for tags outside the closed set.
    pub fn to_result(&self) -> Result<EntitySearchResult, CasefileError> {
        let entity_type: EntityType = self.type_tag().parse()?;
        Ok(EntitySearchResult {
            id: self.id.clone(),
            entity_type,
            name: self.name.clone(),
            subtitle: self.subtitle.clone(),
        })
    }
}

/// Split raw hits into typed results and hits with unrecognised types.
///
/// Order is preserved on both sides. The caller decides whether to log the
/// rejected hits; nothing is silently reclassified.
#[must_use]
pub fn partition_hits(hits: Vec<RawSearchHit>) -> (Vec<EntitySearchResult>, Vec<RawSearchHit>) {
    let mut accepted = Vec::with_capacity(hits.len());
    let mut rejected = Vec::new();

    for hit in hits {
        match hit.to_result() {
            Ok(result) => accepted.push(result),
            Err(_) => rejected.push(hit),
        }
    }

    (accepted, rejected)
}

// =============================================================================
// LOAD STATE
// =============================================================================

/// Lifecycle of the data behind a view.
///
/// `Empty` is a terminal success state with zero rows, distinct from
/// `Loading` and from `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet (or the query is below the activation length).
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last accepted response carried rows.
    Loaded,
    /// The last accepted response carried zero rows.
    Empty,
    /// The last accepted request failed.
    Failed(FetchError),
}

impl LoadState {
    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The failure, if the last request failed.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Failure reported by the fetch layer.
///
/// Carried inside `LoadState::Failed`, so it is `Clone` and comparable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The record API could not be reached.
    #[error("Record API unreachable: {0}")]
    Unreachable(String),

    /// The record API rejected the credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// The record API answered with a non-success status.
    #[error("Record API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Errors that can occur in Casefile.
///
/// Local view operations (toggles, filter changes, navigation resolution)
/// are total and never produce one of these.
#[derive(Debug, Error)]
pub enum CasefileError {
    /// A fetch failed.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// An entity type tag outside the closed set.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Configuration is missing or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
