//! An artist can only be booked once per six-hour span: a new show must not
//! start within three hours of any show the artist already has.

use chrono::TimeDelta;
use sea_orm::{prelude::DateTime, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::{
    entity::show,
    error::{Error, Result},
};

pub const BUFFER_HOURS: i64 = 3;

/// Closed interval `[start - 3h, start + 3h]` around a proposed start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub earliest: DateTime,
    pub latest: DateTime,
}

impl Window {
    pub fn around(start: DateTime) -> Self {
        let buffer = TimeDelta::hours(BUFFER_HOURS);
        Window {
            earliest: start.checked_sub_signed(buffer).unwrap_or(DateTime::MIN),
            latest: start.checked_add_signed(buffer).unwrap_or(DateTime::MAX),
        }
    }

    pub fn contains(&self, at: DateTime) -> bool {
        self.earliest <= at && at <= self.latest
    }
}

/// Fails with [`Error::BookingConflict`] if `artist_id` already has a show
/// inside the window around `start`.
pub async fn check(conn: &impl ConnectionTrait, artist_id: i32, start: DateTime) -> Result<()> {
    let window = Window::around(start);
    let clash = show::Entity::find()
        .filter(show::Column::ArtistId.eq(artist_id))
        .filter(show::Column::StartTime.between(window.earliest, window.latest))
        .one(conn)
        .await?;

    match clash {
        Some(existing) => {
            debug!(
                "artist {artist_id} already plays show {} at {}",
                existing.id, existing.start_time
            );
            Err(Error::BookingConflict {
                artist_id,
                earliest: window.earliest,
                latest: window.latest,
            })
        }
        None => Ok(()),
    }
}
