use chrono::Local;
use sea_orm::{
    prelude::Date, ActiveModelTrait, ActiveValue as AV, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::info;

use super::{artist, song::Song, Repository};
use crate::{
    db::{finish, Store},
    entity::{self, album, song},
    error::{EntityKind, Error, Result},
    util::{required, NonBlank},
};

pub use album::Model as Album;

#[derive(Debug, Clone, Default)]
pub struct NewAlbum {
    pub name: String,
    pub description: Option<String>,
    /// defaults to today
    pub launch_date: Option<Date>,
    pub image_cover: Option<String>,
    pub artist_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct AlbumPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub launch_date: Option<Date>,
    pub image_cover: Option<String>,
    pub artist_id: Option<i32>,
}

/// Album line on an artist page or the album index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumSlot {
    pub id: i32,
    pub name: String,
    pub num_songs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistAlbums {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_albums: Vec<AlbumSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub artist_name: String,
    pub songs: Vec<Song>,
    pub num_songs: usize,
}

pub struct Albums<'a> {
    store: &'a Store,
}

impl<'a> Albums<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Albums { store }
    }

    /// Every artist by name, including those without albums, each with
    /// their albums by name.
    pub async fn list_grouped_by_artist(&self) -> Result<Vec<ArtistAlbums>> {
        let conn = self.store.connection();
        let rows = entity::artist::Entity::find()
            .order_by_asc(entity::artist::Column::Name)
            .order_by_asc(entity::artist::Column::Id)
            .find_with_related(album::Entity)
            .all(conn)
            .await?;

        let album_ids = rows
            .iter()
            .flat_map(|(_, albums)| albums.iter().map(|a| a.id))
            .collect();
        let counts = artist::song_counts(conn, album_ids).await?;

        Ok(rows
            .into_iter()
            .map(|(artist, mut albums)| {
                albums.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                ArtistAlbums {
                    artist_id: artist.id,
                    artist_name: artist.name,
                    artist_albums: albums
                        .into_iter()
                        .map(|a| AlbumSlot {
                            num_songs: counts.get(&a.id).copied().unwrap_or_default() as u64,
                            id: a.id,
                            name: a.name,
                        })
                        .collect(),
                }
            })
            .collect())
    }

    /// The album with its owner's name and its songs in insertion order.
    pub async fn detail(&self, id: i32) -> Result<AlbumDetail> {
        let conn = self.store.connection();
        let album = find(conn, id).await?;
        let owner = artist::find(conn, album.artist_id).await?;
        let songs = song::Entity::find()
            .filter(song::Column::AlbumId.eq(id))
            .order_by_asc(song::Column::Id)
            .all(conn)
            .await?;
        Ok(AlbumDetail {
            album,
            artist_name: owner.name,
            num_songs: songs.len(),
            songs,
        })
    }
}

impl Repository for Albums<'_> {
    type Record = Album;
    type New = NewAlbum;
    type Patch = AlbumPatch;

    async fn create(&self, new: NewAlbum) -> Result<i32> {
        let name = required("name", new.name)?;
        let txn = self.store.begin().await?;
        let outcome = insert(
            &txn,
            new.artist_id,
            album::ActiveModel {
                name: AV::Set(name),
                description: AV::Set(new.description.non_blank()),
                launch_date: AV::Set(new.launch_date.unwrap_or_else(|| Local::now().date_naive())),
                image_cover: AV::Set(new.image_cover.non_blank()),
                artist_id: AV::Set(new.artist_id),
                ..Default::default()
            },
        )
        .await;
        let id = finish(txn, outcome).await?;
        info!("album {id} listed for artist {}", new.artist_id);
        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Album> {
        find(self.store.connection(), id).await
    }

    async fn update(&self, id: i32, patch: AlbumPatch) -> Result<i32> {
        let txn = self.store.begin().await?;
        let outcome = modify(&txn, id, patch).await;
        finish(txn, outcome).await
    }

    /// Songs of the album go with it.
    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.store.begin().await?;
        let outcome = remove(&txn, id).await;
        finish(txn, outcome).await?;
        info!("album {id} removed");
        Ok(())
    }
}

async fn insert(
    conn: &impl ConnectionTrait,
    artist_id: i32,
    active: album::ActiveModel,
) -> Result<i32> {
    artist::find(conn, artist_id).await?;
    Ok(active.insert(conn).await?.id)
}

async fn modify(conn: &impl ConnectionTrait, id: i32, patch: AlbumPatch) -> Result<i32> {
    let mut active: album::ActiveModel = find(conn, id).await?.into();
    if let Some(name) = patch.name {
        active.name = AV::Set(required("name", name)?);
    }
    if let Some(description) = patch.description {
        active.description = AV::Set(description.non_blank());
    }
    if let Some(launch_date) = patch.launch_date {
        active.launch_date = AV::Set(launch_date);
    }
    if let Some(cover) = patch.image_cover {
        active.image_cover = AV::Set(cover.non_blank());
    }
    if let Some(artist_id) = patch.artist_id {
        artist::find(conn, artist_id).await?;
        active.artist_id = AV::Set(artist_id);
    }
    if active.is_changed() {
        active.update(conn).await?;
    }
    Ok(id)
}

async fn remove(conn: &impl ConnectionTrait, id: i32) -> Result<()> {
    find(conn, id).await?;
    song::Entity::delete_many()
        .filter(song::Column::AlbumId.eq(id))
        .exec(conn)
        .await?;
    album::Entity::delete_by_id(id).exec(conn).await?;
    Ok(())
}

pub(crate) async fn find(conn: &impl ConnectionTrait, id: i32) -> Result<Album> {
    album::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(Error::not_found(EntityKind::Album, id))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::query::{fixtures, song::NewSong};

    async fn with_artist(name: &str) -> (Store, i32) {
        let store = Store::in_memory().await.unwrap();
        let id = store.artists().create(fixtures::artist(name)).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn create_needs_name_and_existing_artist() {
        let (store, artist_id) = with_artist("Guns N Petals").await;
        assert!(matches!(
            store
                .albums()
                .create(NewAlbum {
                    artist_id,
                    ..Default::default()
                })
                .await,
            Err(Error::Validation { field: "name", .. })
        ));
        assert!(matches!(
            store
                .albums()
                .create(NewAlbum {
                    name: "Orphan".into(),
                    artist_id: artist_id + 1,
                    ..Default::default()
                })
                .await,
            Err(Error::NotFound {
                kind: EntityKind::Artist,
                ..
            })
        ));
        assert!(store.albums().list_grouped_by_artist().await.unwrap()[0]
            .artist_albums
            .is_empty());
    }

    #[tokio::test]
    async fn grouped_by_artist_counts_songs() {
        let (store, petals) = with_artist("Guns N Petals").await;
        let sax = store
            .artists()
            .create(fixtures::artist("The Wild Sax Band"))
            .await
            .unwrap();
        store
            .artists()
            .create(fixtures::artist("Matt Quevedo"))
            .await
            .unwrap();
        let b_side = store
            .albums()
            .create(NewAlbum {
                name: "B-Sides".into(),
                artist_id: petals,
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .albums()
            .create(NewAlbum {
                name: "Anthology".into(),
                artist_id: petals,
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .albums()
            .create(NewAlbum {
                name: "Saxophonics".into(),
                artist_id: sax,
                ..Default::default()
            })
            .await
            .unwrap();
        for name in ["Root", "Stem"] {
            store
                .songs()
                .create(NewSong {
                    name: name.into(),
                    duration: NaiveTime::from_hms_opt(0, 3, 30),
                    album_id: b_side,
                })
                .await
                .unwrap();
        }

        let groups = store.albums().list_grouped_by_artist().await.unwrap();
        let artists: Vec<_> = groups.iter().map(|g| g.artist_name.as_str()).collect();
        assert_eq!(artists, ["Guns N Petals", "Matt Quevedo", "The Wild Sax Band"]);
        let petals_albums: Vec<_> = groups[0]
            .artist_albums
            .iter()
            .map(|a| (a.name.as_str(), a.num_songs))
            .collect();
        assert_eq!(petals_albums, [("Anthology", 0), ("B-Sides", 2)]);
        assert!(groups[1].artist_albums.is_empty());
        assert_eq!(groups[2].artist_albums.len(), 1);
    }

    #[tokio::test]
    async fn update_can_move_album_to_another_artist() {
        let (store, petals) = with_artist("Guns N Petals").await;
        let sax = store
            .artists()
            .create(fixtures::artist("The Wild Sax Band"))
            .await
            .unwrap();
        let id = store
            .albums()
            .create(NewAlbum {
                name: "Petal Power".into(),
                description: Some("debut".into()),
                artist_id: petals,
                ..Default::default()
            })
            .await
            .unwrap();

        let err = store
            .albums()
            .update(
                id,
                AlbumPatch {
                    name: Some("Renamed".into()),
                    artist_id: Some(sax + 10),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: EntityKind::Artist, .. }));
        assert_eq!(store.albums().get(id).await.unwrap().name, "Petal Power");

        store
            .albums()
            .update(
                id,
                AlbumPatch {
                    description: Some(String::new()),
                    artist_id: Some(sax),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let detail = store.albums().detail(id).await.unwrap();
        assert_eq!(detail.artist_name, "The Wild Sax Band");
        assert_eq!(detail.album.description, None);
    }

    #[tokio::test]
    async fn deleted_album_is_gone_with_its_songs() {
        let (store, artist_id) = with_artist("Guns N Petals").await;
        let id = store
            .albums()
            .create(NewAlbum {
                name: "Petal Power".into(),
                artist_id,
                ..Default::default()
            })
            .await
            .unwrap();
        let song_id = store
            .songs()
            .create(NewSong {
                name: "Thorns".into(),
                duration: None,
                album_id: id,
            })
            .await
            .unwrap();

        store.albums().delete(id).await.unwrap();
        assert!(matches!(
            store.albums().detail(id).await,
            Err(Error::NotFound {
                kind: EntityKind::Album,
                ..
            })
        ));
        assert!(store.songs().get(song_id).await.is_err());
        assert!(store.artists().get(artist_id).await.is_ok());
    }
}
