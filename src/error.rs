use std::fmt;

use sea_orm::{prelude::DateTime, DbErr};
use serde::Serialize;
use thiserror::Error;

/// The record families the query layer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Venue,
    Artist,
    Album,
    Song,
    Show,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Venue => "venue",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Song => "song",
            EntityKind::Show => "show",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i32 },
    #[error("artist {artist_id} is already booked between {earliest} and {latest}")]
    BookingConflict {
        artist_id: i32,
        earliest: DateTime,
        latest: DateTime,
    },
    #[error("persistence: {0}")]
    Persistence(#[from] DbErr),
}

impl Error {
    pub(crate) fn missing(field: &'static str) -> Self {
        Error::Validation {
            field,
            reason: "required".to_string(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: i32) -> Self {
        Error::NotFound { kind, id }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
