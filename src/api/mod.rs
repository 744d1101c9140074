use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{classify::ServerErrorsFailureClass, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{debug, error, info, Span};

use crate::{
    db::Store,
    error::{Error, Result},
    present,
    query::{artist::Artist, venue::Venue, Listing},
};

mod albums;
mod artists;
pub mod forms;
mod shows;
mod venues;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// rows per kind on the landing page
    pub recent_limit: u64,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::BookingConflict { .. } => StatusCode::CONFLICT,
            Error::Persistence(err) => {
                error!("store failure: {err}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": present::message(&self) }))).into_response()
    }
}

/// Body of every successful `DELETE`.
pub(crate) fn deleted() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

/// Wall clock used to split past from upcoming shows.
pub(crate) fn now() -> sea_orm::prelude::DateTime {
    chrono::Local::now().naive_local()
}

#[derive(Serialize)]
struct Home {
    recent_venues: Vec<Venue>,
    recent_artists: Vec<Artist>,
}

async fn home(State(state): State<AppState>) -> Result<Json<Home>> {
    Ok(Json(Home {
        recent_venues: state.store.venues().list_recent(state.recent_limit).await?,
        recent_artists: state.store.artists().list_recent(state.recent_limit).await?,
    }))
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/venues", get(venues::index))
        .route("/venues/search", post(venues::search))
        .route("/venues/create", post(venues::create))
        .route("/venues/:id", get(venues::detail).delete(venues::remove))
        .route("/venues/:id/edit", get(venues::edit).post(venues::update))
        .route("/artists", get(artists::index))
        .route("/artists/search", post(artists::search))
        .route("/artists/create", post(artists::create))
        .route("/artists/:id", get(artists::detail).delete(artists::remove))
        .route("/artists/:id/edit", get(artists::edit).post(artists::update))
        .route("/albums", get(albums::index))
        .route("/album/create", get(albums::choices).post(albums::create))
        .route("/album/:id", get(albums::detail).delete(albums::remove))
        .route("/album/:id/edit", get(albums::edit).post(albums::update))
        .route("/song/create/:album_id", post(albums::add_song))
        .route("/song/remove/:id", delete(albums::remove_song))
        .route("/shows", get(shows::index))
        .route("/shows/create", get(shows::choices).post(shows::create))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .on_request(|req: &Request<Body>, _span: &Span| {
                    debug!("{} {}", req.method(), req.uri());
                })
                .on_response(|response: &Response, latency: Duration, _span: &Span| {
                    debug!("{} in {latency:?}", response.status());
                })
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        error!("{error:?}");
                    },
                ),
        )
}

pub async fn serve(
    state: AppState,
    addr: impl AsRef<str>,
    request_timeout: Duration,
) -> std::io::Result<()> {
    let app = router(state, request_timeout);

    let listener = tokio::net::TcpListener::bind(addr.as_ref()).await?;
    info!("Running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("cannot listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
