// ── Resource abstraction ──
//
// One implementation per NetBox entity kind. A resource knows its REST
// endpoint, how its natural-key query renders to filter parameters, and
// how to evaluate that same query against an already-fetched record.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Store-assigned, opaque record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A NetBox entity kind.
///
/// `Query` is the natural-key lookup for the kind (name, slug, serial,
/// vid, ...). It renders to NetBox filter parameters for the HTTP client
/// and evaluates locally via [`Resource::matches`] for in-process stores,
/// so both enforce identical lookups.
pub trait Resource: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Path below `/api/`, with trailing slash (e.g. `"dcim/devices/"`).
    const ENDPOINT: &'static str;

    /// Natural-key lookup.
    type Query: fmt::Debug + Send + Sync;

    /// Body sent on create.
    type Draft: Serialize + fmt::Debug + Send + Sync;

    /// Partial body sent on update.
    type Patch: Serialize + fmt::Debug + Send + Sync;

    fn id(&self) -> RecordId;

    /// NetBox filter parameters for `query`.
    fn query_params(query: &Self::Query) -> Vec<(&'static str, String)>;

    /// Whether this record satisfies `query`.
    fn matches(&self, query: &Self::Query) -> bool;
}

/// Paginated list envelope returned by every NetBox list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}
