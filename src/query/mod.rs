//! Per-entity repositories over the [`Store`](crate::db::Store).
//!
//! Reads hand back plain serializable records. Writes run in one transaction
//! each and return the id of the affected row.

use std::future::Future;

use serde::Serialize;

use crate::error::Result;

pub mod album;
pub mod artist;
pub mod booking;
pub mod show;
pub mod song;
pub mod venue;

/// Create/read/update/delete over one entity kind.
pub trait Repository {
    type Record;
    type New;
    type Patch;

    fn create(&self, new: Self::New) -> impl Future<Output = Result<i32>> + Send;

    fn get(&self, id: i32) -> impl Future<Output = Result<Self::Record>> + Send;

    /// Only the fields set in `patch` change. Fails with `NotFound` before
    /// touching anything when `id` is absent.
    fn update(&self, id: i32, patch: Self::Patch) -> impl Future<Output = Result<i32>> + Send;

    fn delete(&self, id: i32) -> impl Future<Output = Result<()>> + Send;
}

/// Landing page and search box queries shared by venues and artists.
pub trait Listing: Repository {
    /// Oldest listings first.
    fn list_recent(&self, limit: u64) -> impl Future<Output = Result<Vec<Self::Record>>> + Send;

    /// Case-insensitive substring match on the name, ordered by name.
    fn search_by_name(&self, term: &str) -> impl Future<Output = Result<Vec<Self::Record>>> + Send;
}

/// id/name pair for select boxes and index pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sea_orm::FromQueryResult)]
pub struct Choice {
    pub id: i32,
    pub name: String,
}

/// Unicode-aware, locale-independent case fold.
pub(crate) fn name_matches(name: &str, folded_term: &str) -> bool {
    name.to_lowercase().contains(folded_term)
}
