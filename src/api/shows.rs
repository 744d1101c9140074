use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::Form;
use serde::Serialize;
use tracing::warn;

use super::{forms::ShowForm, AppState};
use crate::{
    error::{Error, Result},
    query::{show::ShowListing, Choice},
};

#[derive(Serialize)]
pub(super) struct ShowChoices {
    artists: Vec<Choice>,
    venues: Vec<Choice>,
}

pub(super) async fn index(State(state): State<AppState>) -> Result<Json<Vec<ShowListing>>> {
    Ok(Json(state.store.shows().list().await?))
}

pub(super) async fn choices(State(state): State<AppState>) -> Result<Json<ShowChoices>> {
    Ok(Json(ShowChoices {
        artists: state.store.artists().choices().await?,
        venues: state.store.venues().choices().await?,
    }))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<ShowForm>,
) -> Result<Redirect> {
    match state.store.shows().create(form.into_new()?).await {
        Ok(_) => Ok(Redirect::to("/shows")),
        Err(err @ Error::BookingConflict { artist_id, .. }) => {
            warn!("artist {artist_id} double booked");
            Err(err)
        }
        Err(err) => Err(err),
    }
}
