use std::collections::HashMap;

use sea_orm::{
    prelude::DateTime, ActiveModelTrait, ActiveValue as AV, ColumnTrait, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{artist, booking, venue};
use crate::{
    db::{finish, Store},
    entity::{self, show},
    error::{EntityKind, Error, Result},
};

pub use show::Model as Show;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime,
}

/// One show as seen from a venue or an artist page: `id`, `name` and
/// `image_link` describe the other side of the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowSummary {
    pub show_id: i32,
    pub id: i32,
    pub name: String,
    pub image_link: Option<String>,
    pub start_time: DateTime,
}

/// Shows split around a reference instant. A show starting exactly at `now`
/// is past.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub past_shows: Vec<ShowSummary>,
    pub upcoming_shows: Vec<ShowSummary>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl Schedule {
    pub fn partition(shows: impl IntoIterator<Item = ShowSummary>, now: DateTime) -> Self {
        let (past_shows, upcoming_shows): (Vec<_>, Vec<_>) =
            shows.into_iter().partition(|s| s.start_time <= now);
        Schedule {
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }

    pub fn total(&self) -> usize {
        self.past_shows_count + self.upcoming_shows_count
    }
}

/// Row of the `/shows` page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime,
}

pub struct Shows<'a> {
    store: &'a Store,
}

impl<'a> Shows<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Shows { store }
    }

    /// Books `artist_id` at `venue_id`. Both must exist and the artist must
    /// be free for three hours either side of `start_time`.
    pub async fn create(&self, new: NewShow) -> Result<i32> {
        let txn = self.store.begin().await?;
        let outcome = book(&txn, &new).await;
        let id = finish(txn, outcome).await?;
        info!(
            "show {id} listed: artist {} at venue {} on {}",
            new.artist_id, new.venue_id, new.start_time
        );
        Ok(id)
    }

    pub async fn get(&self, id: i32) -> Result<Show> {
        find(self.store.connection(), id).await
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.store.begin().await?;
        let outcome = remove(&txn, id).await;
        finish(txn, outcome).await
    }

    /// Every show with both sides resolved, soonest first.
    pub async fn list(&self) -> Result<Vec<ShowListing>> {
        let conn = self.store.connection();
        let rows = show::Entity::find()
            .order_by_asc(show::Column::StartTime)
            .order_by_asc(show::Column::Id)
            .find_also_related(entity::artist::Entity)
            .all(conn)
            .await?;

        let mut venue_ids: Vec<i32> = rows.iter().map(|(show, _)| show.venue_id).collect();
        venue_ids.sort_unstable();
        venue_ids.dedup();
        let venues: HashMap<i32, entity::venue::Model> = if venue_ids.is_empty() {
            HashMap::new()
        } else {
            entity::venue::Entity::find()
                .filter(entity::venue::Column::Id.is_in(venue_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|venue| (venue.id, venue))
                .collect()
        };

        let mut out = Vec::with_capacity(rows.len());
        for (show, artist) in rows {
            let Some(artist) = artist else {
                warn!("show {} points at missing artist {}", show.id, show.artist_id);
                continue;
            };
            let Some(venue) = venues.get(&show.venue_id) else {
                warn!("show {} points at missing venue {}", show.id, show.venue_id);
                continue;
            };
            out.push(ShowListing {
                id: show.id,
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name,
                artist_image_link: artist.image_link,
                start_time: show.start_time,
            });
        }
        Ok(out)
    }
}

async fn book(conn: &impl ConnectionTrait, new: &NewShow) -> Result<i32> {
    artist::find(conn, new.artist_id).await?;
    venue::find(conn, new.venue_id).await?;
    booking::check(conn, new.artist_id, new.start_time).await?;

    let show = show::ActiveModel {
        artist_id: AV::Set(new.artist_id),
        venue_id: AV::Set(new.venue_id),
        start_time: AV::Set(new.start_time),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(show.id)
}

async fn remove(conn: &impl ConnectionTrait, id: i32) -> Result<()> {
    find(conn, id).await?;
    show::Entity::delete_by_id(id).exec(conn).await?;
    Ok(())
}

pub(crate) async fn find(conn: &impl ConnectionTrait, id: i32) -> Result<Show> {
    show::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(Error::not_found(EntityKind::Show, id))
}
