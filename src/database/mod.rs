pub mod profile_repo;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Error;
use crate::models::{Gender, Profile};

pub use profile_repo::SqliteProfileStore;

#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Store-level candidate filter, built by the candidate service.
/// Birth-date bounds encode the requested age range; the exact age and
/// distance checks are re-applied by the service on the rows returned.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub exclude_id: String,
    pub genders: Vec<Gender>,
    /// Exclusive lower bound (candidates older than `max_age` fall below it).
    pub born_after: NaiveDate,
    /// Inclusive upper bound (candidates younger than `min_age` fall above it).
    pub born_on_or_before: NaiveDate,
    pub bbox: Option<BoundingBox>,
    pub scan_limit: i64,
}

/// Primary-store seam. The services only ever talk to this trait.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, Error>;

    async fn email_exists(&self, email: &str) -> Result<bool, Error>;

    async fn insert(&self, profile: &Profile) -> Result<(), Error>;

    /// Persist `profile` (whose `version` is already bumped) only if the
    /// stored row still carries `expected_version`. A concurrent mutation
    /// surfaces as `Error::Conflict`.
    async fn update(&self, profile: &Profile, expected_version: i64) -> Result<(), Error>;

    /// Returns whether a row was actually deleted.
    async fn delete_by_id(&self, id: &str) -> Result<bool, Error>;

    /// Eligible candidates matching `query`, ordered by id ascending.
    async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<Profile>, Error>;

    async fn touch_last_active(&self, id: &str, at: DateTime<Utc>) -> Result<(), Error>;
}
