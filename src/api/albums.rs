use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::Form;
use serde::Serialize;

use super::{
    deleted,
    forms::{AlbumForm, SongForm},
    AppState,
};
use crate::{
    error::Result,
    query::{
        album::{Album, AlbumDetail, ArtistAlbums},
        Choice, Repository,
    },
};

#[derive(Serialize)]
pub(super) struct AlbumChoices {
    artists: Vec<Choice>,
}

#[derive(Serialize)]
pub(super) struct AlbumEdit {
    album: Album,
    artists: Vec<Choice>,
}

pub(super) async fn index(State(state): State<AppState>) -> Result<Json<Vec<ArtistAlbums>>> {
    Ok(Json(state.store.albums().list_grouped_by_artist().await?))
}

pub(super) async fn choices(State(state): State<AppState>) -> Result<Json<AlbumChoices>> {
    Ok(Json(AlbumChoices {
        artists: state.store.artists().choices().await?,
    }))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<AlbumForm>,
) -> Result<Redirect> {
    let id = state.store.albums().create(form.into_new()?).await?;
    Ok(Redirect::to(&format!("/album/{id}")))
}

pub(super) async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AlbumDetail>> {
    Ok(Json(state.store.albums().detail(id).await?))
}

pub(super) async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AlbumEdit>> {
    Ok(Json(AlbumEdit {
        album: state.store.albums().get(id).await?,
        artists: state.store.artists().choices().await?,
    }))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<AlbumForm>,
) -> Result<Redirect> {
    let id = state.store.albums().update(id, form.into_patch()?).await?;
    Ok(Redirect::to(&format!("/album/{id}")))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    state.store.albums().delete(id).await?;
    Ok(deleted())
}

pub(super) async fn add_song(
    State(state): State<AppState>,
    Path(album_id): Path<i32>,
    Form(form): Form<SongForm>,
) -> Result<Redirect> {
    state.store.songs().create(form.into_new(album_id)?).await?;
    Ok(Redirect::to(&format!("/album/{album_id}")))
}

pub(super) async fn remove_song(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    state.store.songs().delete(id).await?;
    Ok(deleted())
}
