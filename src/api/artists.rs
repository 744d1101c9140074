use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::Form;

use super::{
    deleted,
    forms::{ArtistForm, SearchForm},
    now,
    venues::Found,
    AppState,
};
use crate::{
    error::Result,
    query::{
        artist::{Artist, ArtistDetail},
        Choice, Listing, Repository,
    },
};

pub(super) async fn index(State(state): State<AppState>) -> Result<Json<Vec<Choice>>> {
    Ok(Json(state.store.artists().choices().await?))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Json<Found<Artist>>> {
    let data = state.store.artists().search_by_name(&form.search_term).await?;
    Ok(Json(Found::new(form.search_term, data)))
}

pub(super) async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistDetail>> {
    Ok(Json(state.store.artists().detail(id, now()).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<ArtistForm>,
) -> Result<Redirect> {
    let id = state.store.artists().create(form.into_new()?).await?;
    Ok(Redirect::to(&format!("/artists/{id}")))
}

pub(super) async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Artist>> {
    Ok(Json(state.store.artists().get(id).await?))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ArtistForm>,
) -> Result<Redirect> {
    let id = state.store.artists().update(id, form.into_patch()?).await?;
    Ok(Redirect::to(&format!("/artists/{id}")))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    state.store.artists().delete(id).await?;
    Ok(deleted())
}
