use std::collections::HashMap;

use chrono::Local;
use sea_orm::{
    prelude::{Date, DateTime},
    sea_query::Expr,
    ActiveModelTrait, ActiveValue as AV, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{
    album::AlbumSlot,
    show::{Schedule, ShowSummary},
    Choice, Listing, Repository,
};
use crate::{
    db::{finish, Store},
    entity::{album, artist, show, song, venue},
    error::{EntityKind, Error, Result},
    genre::Genres,
    util::{required, NonBlank},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Genres,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub listed_on: Date,
}

impl From<artist::Model> for Artist {
    fn from(model: artist::Model) -> Self {
        Artist {
            id: model.id,
            genres: Genres::decode(&model.genres),
            name: model.name,
            city: model.city,
            state: model.state,
            phone: model.phone,
            image_link: model.image_link,
            facebook_link: model.facebook_link,
            website_link: model.website_link,
            seeking_venue: model.seeking_venue,
            seeking_description: model.seeking_description,
            listed_on: model.listed_on,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Genres,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub listed_on: Option<Date>,
}

impl NewArtist {
    fn into_active_model(self) -> Result<artist::ActiveModel> {
        Ok(artist::ActiveModel {
            name: AV::Set(required("name", self.name)?),
            city: AV::Set(required("city", self.city)?),
            state: AV::Set(required("state", self.state)?),
            phone: AV::Set(self.phone.non_blank()),
            genres: AV::Set(self.genres.encode()),
            image_link: AV::Set(self.image_link.non_blank()),
            facebook_link: AV::Set(self.facebook_link.non_blank()),
            website_link: AV::Set(self.website_link.non_blank()),
            seeking_venue: AV::Set(self.seeking_venue),
            seeking_description: AV::Set(self.seeking_description.non_blank()),
            listed_on: AV::Set(self.listed_on.unwrap_or_else(|| Local::now().date_naive())),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtistPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Genres>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: Option<bool>,
    pub seeking_description: Option<String>,
}

impl ArtistPatch {
    fn apply(self, active: &mut artist::ActiveModel) -> Result<()> {
        if let Some(name) = self.name {
            active.name = AV::Set(required("name", name)?);
        }
        if let Some(city) = self.city {
            active.city = AV::Set(required("city", city)?);
        }
        if let Some(state) = self.state {
            active.state = AV::Set(required("state", state)?);
        }
        if let Some(phone) = self.phone {
            active.phone = AV::Set(phone.non_blank());
        }
        if let Some(genres) = self.genres {
            active.genres = AV::Set(genres.encode());
        }
        if let Some(link) = self.image_link {
            active.image_link = AV::Set(link.non_blank());
        }
        if let Some(link) = self.facebook_link {
            active.facebook_link = AV::Set(link.non_blank());
        }
        if let Some(link) = self.website_link {
            active.website_link = AV::Set(link.non_blank());
        }
        if let Some(seeking) = self.seeking_venue {
            active.seeking_venue = AV::Set(seeking);
        }
        if let Some(description) = self.seeking_description {
            active.seeking_description = AV::Set(description.non_blank());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub albums: Vec<AlbumSlot>,
    /// shows of this artist, `id`/`name`/`image_link` are the venue's
    #[serde(flatten)]
    pub schedule: Schedule,
}

pub struct Artists<'a> {
    store: &'a Store,
}

impl<'a> Artists<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Artists { store }
    }

    /// The artist index: id and name, alphabetical.
    pub async fn choices(&self) -> Result<Vec<Choice>> {
        Ok(artist::Entity::find()
            .select_only()
            .column(artist::Column::Id)
            .column(artist::Column::Name)
            .order_by_asc(artist::Column::Name)
            .order_by_asc(artist::Column::Id)
            .into_model::<Choice>()
            .all(self.store.connection())
            .await?)
    }

    pub async fn detail(&self, id: i32, now: DateTime) -> Result<ArtistDetail> {
        let conn = self.store.connection();
        let artist = find(conn, id).await?;

        let rows = show::Entity::find()
            .filter(show::Column::ArtistId.eq(id))
            .order_by_asc(show::Column::StartTime)
            .find_also_related(venue::Entity)
            .all(conn)
            .await?;
        let shows = rows.into_iter().filter_map(|(show, venue)| match venue {
            Some(venue) => Some(ShowSummary {
                show_id: show.id,
                id: venue.id,
                name: venue.name,
                image_link: venue.image_link,
                start_time: show.start_time,
            }),
            None => {
                warn!("show {} points at missing venue {}", show.id, show.venue_id);
                None
            }
        });

        let albums = album::Entity::find()
            .filter(album::Column::ArtistId.eq(id))
            .order_by_asc(album::Column::Name)
            .order_by_asc(album::Column::Id)
            .all(conn)
            .await?;
        let counts = song_counts(conn, albums.iter().map(|a| a.id).collect()).await?;
        let albums = albums
            .into_iter()
            .map(|a| AlbumSlot {
                num_songs: counts.get(&a.id).copied().unwrap_or_default() as u64,
                id: a.id,
                name: a.name,
            })
            .collect();

        Ok(ArtistDetail {
            artist: artist.into(),
            albums,
            schedule: Schedule::partition(shows, now),
        })
    }
}

impl Repository for Artists<'_> {
    type Record = Artist;
    type New = NewArtist;
    type Patch = ArtistPatch;

    async fn create(&self, new: NewArtist) -> Result<i32> {
        let active = new.into_active_model()?;
        let txn = self.store.begin().await?;
        let outcome = active.insert(&txn).await.map(|m| m.id).map_err(Error::from);
        let id = finish(txn, outcome).await?;
        info!("artist {id} listed");
        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Artist> {
        Ok(find(self.store.connection(), id).await?.into())
    }

    async fn update(&self, id: i32, patch: ArtistPatch) -> Result<i32> {
        let txn = self.store.begin().await?;
        let outcome = modify(&txn, id, patch).await;
        finish(txn, outcome).await
    }

    /// Cascades: the artist's albums, their songs and the artist's shows are
    /// deleted in the same transaction.
    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.store.begin().await?;
        let outcome = remove(&txn, id).await;
        finish(txn, outcome).await?;
        info!("artist {id} removed");
        Ok(())
    }
}

impl Listing for Artists<'_> {
    async fn list_recent(&self, limit: u64) -> Result<Vec<Artist>> {
        let artists = artist::Entity::find()
            .order_by_asc(artist::Column::ListedOn)
            .order_by_asc(artist::Column::Id)
            .limit(limit)
            .all(self.store.connection())
            .await?;
        Ok(artists.into_iter().map(Artist::from).collect())
    }

    async fn search_by_name(&self, term: &str) -> Result<Vec<Artist>> {
        let folded = term.trim().to_lowercase();
        let artists = artist::Entity::find()
            .order_by_asc(artist::Column::Name)
            .order_by_asc(artist::Column::Id)
            .all(self.store.connection())
            .await?;
        Ok(artists
            .into_iter()
            .filter(|a| super::name_matches(&a.name, &folded))
            .map(Artist::from)
            .collect())
    }
}

/// Number of songs per album id, for the given albums only.
pub(crate) async fn song_counts(
    conn: &impl ConnectionTrait,
    album_ids: Vec<i32>,
) -> Result<HashMap<i32, i64>> {
    if album_ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(song::Entity::find()
        .select_only()
        .column(song::Column::AlbumId)
        .column_as(Expr::col(song::Column::Id).count(), "num_songs")
        .filter(song::Column::AlbumId.is_in(album_ids))
        .group_by(song::Column::AlbumId)
        .into_tuple::<(i32, i64)>()
        .all(conn)
        .await?
        .into_iter()
        .collect())
}

async fn modify(conn: &impl ConnectionTrait, id: i32, patch: ArtistPatch) -> Result<i32> {
    let mut active: artist::ActiveModel = find(conn, id).await?.into();
    patch.apply(&mut active)?;
    if active.is_changed() {
        active.update(conn).await?;
    }
    Ok(id)
}

async fn remove(conn: &impl ConnectionTrait, id: i32) -> Result<()> {
    find(conn, id).await?;

    let album_ids: Vec<i32> = album::Entity::find()
        .select_only()
        .column(album::Column::Id)
        .filter(album::Column::ArtistId.eq(id))
        .into_tuple()
        .all(conn)
        .await?;
    if !album_ids.is_empty() {
        song::Entity::delete_many()
            .filter(song::Column::AlbumId.is_in(album_ids))
            .exec(conn)
            .await?;
    }
    album::Entity::delete_many()
        .filter(album::Column::ArtistId.eq(id))
        .exec(conn)
        .await?;
    show::Entity::delete_many()
        .filter(show::Column::ArtistId.eq(id))
        .exec(conn)
        .await?;
    artist::Entity::delete_by_id(id).exec(conn).await?;
    Ok(())
}

pub(crate) async fn find(conn: &impl ConnectionTrait, id: i32) -> Result<artist::Model> {
    artist::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(Error::not_found(EntityKind::Artist, id))
}
