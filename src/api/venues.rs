use axum::{
    extract::{Path, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::Form;
use serde::Serialize;

use super::{
    deleted,
    forms::{SearchForm, VenueForm},
    now, AppState,
};
use crate::{
    error::Result,
    query::{
        venue::{Area, Venue, VenueDetail},
        Listing, Repository,
    },
};

#[derive(Serialize)]
pub(super) struct Found<T> {
    pub count: usize,
    pub data: Vec<T>,
    pub search_term: String,
}

impl<T> Found<T> {
    pub(super) fn new(search_term: String, data: Vec<T>) -> Self {
        Found {
            count: data.len(),
            data,
            search_term,
        }
    }
}

pub(super) async fn index(State(state): State<AppState>) -> Result<Json<Vec<Area>>> {
    Ok(Json(state.store.venues().list_grouped_by_location().await?))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Json<Found<Venue>>> {
    let data = state.store.venues().search_by_name(&form.search_term).await?;
    Ok(Json(Found::new(form.search_term, data)))
}

pub(super) async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VenueDetail>> {
    Ok(Json(state.store.venues().detail(id, now()).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<VenueForm>,
) -> Result<Redirect> {
    let id = state.store.venues().create(form.into_new()?).await?;
    Ok(Redirect::to(&format!("/venues/{id}")))
}

pub(super) async fn edit(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Venue>> {
    Ok(Json(state.store.venues().get(id).await?))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<VenueForm>,
) -> Result<Redirect> {
    let id = state.store.venues().update(id, form.into_patch()?).await?;
    Ok(Redirect::to(&format!("/venues/{id}")))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    state.store.venues().delete(id).await?;
    Ok(deleted())
}
