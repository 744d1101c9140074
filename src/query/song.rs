use sea_orm::{
    prelude::Time, ActiveModelTrait, ActiveValue as AV, ConnectionTrait, EntityTrait,
};
use tracing::info;

use super::{album, Repository};
use crate::{
    db::{finish, Store},
    entity::song,
    error::{EntityKind, Error, Result},
    util::required,
};

pub use song::Model as Song;

#[derive(Debug, Clone)]
pub struct NewSong {
    pub name: String,
    pub duration: Option<Time>,
    pub album_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct SongPatch {
    pub name: Option<String>,
    pub duration: Option<Time>,
}

pub struct Songs<'a> {
    store: &'a Store,
}

impl<'a> Songs<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Songs { store }
    }
}

impl Repository for Songs<'_> {
    type Record = Song;
    type New = NewSong;
    type Patch = SongPatch;

    async fn create(&self, new: NewSong) -> Result<i32> {
        let name = required("name", new.name)?;
        let txn = self.store.begin().await?;
        let outcome = insert(&txn, name, new.duration, new.album_id).await;
        let id = finish(txn, outcome).await?;
        info!("song {id} added to album {}", new.album_id);
        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Song> {
        find(self.store.connection(), id).await
    }

    async fn update(&self, id: i32, patch: SongPatch) -> Result<i32> {
        let txn = self.store.begin().await?;
        let outcome = modify(&txn, id, patch).await;
        finish(txn, outcome).await
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.store.begin().await?;
        let outcome = remove(&txn, id).await;
        finish(txn, outcome).await
    }
}

async fn insert(
    conn: &impl ConnectionTrait,
    name: String,
    duration: Option<Time>,
    album_id: i32,
) -> Result<i32> {
    album::find(conn, album_id).await?;
    let song = song::ActiveModel {
        name: AV::Set(name),
        duration: AV::Set(duration),
        album_id: AV::Set(album_id),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(song.id)
}

async fn modify(conn: &impl ConnectionTrait, id: i32, patch: SongPatch) -> Result<i32> {
    let mut active: song::ActiveModel = find(conn, id).await?.into();
    if let Some(name) = patch.name {
        active.name = AV::Set(required("name", name)?);
    }
    if let Some(duration) = patch.duration {
        active.duration = AV::Set(Some(duration));
    }
    if active.is_changed() {
        active.update(conn).await?;
    }
    Ok(id)
}

async fn remove(conn: &impl ConnectionTrait, id: i32) -> Result<()> {
    find(conn, id).await?;
    song::Entity::delete_by_id(id).exec(conn).await?;
    Ok(())
}

pub(crate) async fn find(conn: &impl ConnectionTrait, id: i32) -> Result<Song> {
    song::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(Error::not_found(EntityKind::Song, id))
}
