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
    show::{Schedule, ShowSummary},
    Choice, Listing, Repository,
};
use crate::{
    db::{finish, Store},
    entity::{artist, show, venue},
    error::{EntityKind, Error, Result},
    genre::Genres,
    util::{required, NonBlank},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Genres,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub listed_on: Date,
}

impl From<venue::Model> for Venue {
    fn from(model: venue::Model) -> Self {
        Venue {
            id: model.id,
            genres: Genres::decode(&model.genres),
            name: model.name,
            city: model.city,
            state: model.state,
            address: model.address,
            phone: model.phone,
            image_link: model.image_link,
            facebook_link: model.facebook_link,
            website_link: model.website_link,
            seeking_talent: model.seeking_talent,
            seeking_description: model.seeking_description,
            listed_on: model.listed_on,
        }
    }
}

/// Fields of a venue about to be listed. `name`, `city`, `state` and
/// `address` are required; `listed_on` defaults to today.
#[derive(Debug, Clone, Default)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Genres,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub listed_on: Option<Date>,
}

impl NewVenue {
    fn into_active_model(self) -> Result<venue::ActiveModel> {
        Ok(venue::ActiveModel {
            name: AV::Set(required("name", self.name)?),
            city: AV::Set(required("city", self.city)?),
            state: AV::Set(required("state", self.state)?),
            address: AV::Set(required("address", self.address)?),
            phone: AV::Set(self.phone.non_blank()),
            genres: AV::Set(self.genres.encode()),
            image_link: AV::Set(self.image_link.non_blank()),
            facebook_link: AV::Set(self.facebook_link.non_blank()),
            website_link: AV::Set(self.website_link.non_blank()),
            seeking_talent: AV::Set(self.seeking_talent),
            seeking_description: AV::Set(self.seeking_description.non_blank()),
            listed_on: AV::Set(self.listed_on.unwrap_or_else(|| Local::now().date_naive())),
            ..Default::default()
        })
    }
}

/// Edit form submission. `None` leaves a column alone; for optional columns a
/// blank string clears it.
#[derive(Debug, Clone, Default)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<Genres>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: Option<bool>,
    pub seeking_description: Option<String>,
}

impl VenuePatch {
    fn apply(self, active: &mut venue::ActiveModel) -> Result<()> {
        if let Some(name) = self.name {
            active.name = AV::Set(required("name", name)?);
        }
        if let Some(city) = self.city {
            active.city = AV::Set(required("city", city)?);
        }
        if let Some(state) = self.state {
            active.state = AV::Set(required("state", state)?);
        }
        if let Some(address) = self.address {
            active.address = AV::Set(required("address", address)?);
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
        if let Some(seeking) = self.seeking_talent {
            active.seeking_talent = AV::Set(seeking);
        }
        if let Some(description) = self.seeking_description {
            active.seeking_description = AV::Set(description.non_blank());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    /// shows here, `id`/`name`/`image_link` are the artist's
    #[serde(flatten)]
    pub schedule: Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueSlot {
    pub id: i32,
    pub name: String,
    pub num_shows: u64,
}

/// All venues of one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSlot>,
}

pub struct Venues<'a> {
    store: &'a Store,
}

impl<'a> Venues<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Venues { store }
    }

    /// Distinct (city, state) pairs by state then city, venues by name.
    pub async fn list_grouped_by_location(&self) -> Result<Vec<Area>> {
        let conn = self.store.connection();
        let venues = venue::Entity::find()
            .order_by_asc(venue::Column::State)
            .order_by_asc(venue::Column::City)
            .order_by_asc(venue::Column::Name)
            .order_by_asc(venue::Column::Id)
            .all(conn)
            .await?;

        let counts: HashMap<i32, i64> = show::Entity::find()
            .select_only()
            .column(show::Column::VenueId)
            .column_as(Expr::col(show::Column::Id).count(), "num_shows")
            .group_by(show::Column::VenueId)
            .into_tuple::<(i32, i64)>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        let mut areas: Vec<Area> = Vec::new();
        for venue in venues {
            let slot = VenueSlot {
                id: venue.id,
                num_shows: counts.get(&venue.id).copied().unwrap_or_default() as u64,
                name: venue.name,
            };
            match areas.last_mut() {
                Some(area) if area.city == venue.city && area.state == venue.state => {
                    area.venues.push(slot)
                }
                _ => areas.push(Area {
                    city: venue.city,
                    state: venue.state,
                    venues: vec![slot],
                }),
            }
        }
        Ok(areas)
    }

    /// The venue with its shows split around `now`.
    pub async fn detail(&self, id: i32, now: DateTime) -> Result<VenueDetail> {
        let conn = self.store.connection();
        let venue = find(conn, id).await?;

        let rows = show::Entity::find()
            .filter(show::Column::VenueId.eq(id))
            .order_by_asc(show::Column::StartTime)
            .find_also_related(artist::Entity)
            .all(conn)
            .await?;

        let shows = rows.into_iter().filter_map(|(show, artist)| match artist {
            Some(artist) => Some(ShowSummary {
                show_id: show.id,
                id: artist.id,
                name: artist.name,
                image_link: artist.image_link,
                start_time: show.start_time,
            }),
            None => {
                warn!("show {} points at missing artist {}", show.id, show.artist_id);
                None
            }
        });

        Ok(VenueDetail {
            venue: venue.into(),
            schedule: Schedule::partition(shows, now),
        })
    }

    pub async fn choices(&self) -> Result<Vec<Choice>> {
        Ok(venue::Entity::find()
            .select_only()
            .column(venue::Column::Id)
            .column(venue::Column::Name)
            .order_by_asc(venue::Column::Name)
            .into_model::<Choice>()
            .all(self.store.connection())
            .await?)
    }
}

impl Repository for Venues<'_> {
    type Record = Venue;
    type New = NewVenue;
    type Patch = VenuePatch;

    async fn create(&self, new: NewVenue) -> Result<i32> {
        let active = new.into_active_model()?;
        let txn = self.store.begin().await?;
        let outcome = active.insert(&txn).await.map(|m| m.id).map_err(Error::from);
        let id = finish(txn, outcome).await?;
        info!("venue {id} listed");
        Ok(id)
    }

    async fn get(&self, id: i32) -> Result<Venue> {
        Ok(find(self.store.connection(), id).await?.into())
    }

    async fn update(&self, id: i32, patch: VenuePatch) -> Result<i32> {
        let txn = self.store.begin().await?;
        let outcome = modify(&txn, id, patch).await;
        finish(txn, outcome).await
    }

    /// Shows at the venue go with it.
    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.store.begin().await?;
        let outcome = remove(&txn, id).await;
        finish(txn, outcome).await?;
        info!("venue {id} removed");
        Ok(())
    }
}

impl Listing for Venues<'_> {
    async fn list_recent(&self, limit: u64) -> Result<Vec<Venue>> {
        let venues = venue::Entity::find()
            .order_by_asc(venue::Column::ListedOn)
            .order_by_asc(venue::Column::Id)
            .limit(limit)
            .all(self.store.connection())
            .await?;
        Ok(venues.into_iter().map(Venue::from).collect())
    }

    async fn search_by_name(&self, term: &str) -> Result<Vec<Venue>> {
        let folded = term.trim().to_lowercase();
        let venues = venue::Entity::find()
            .order_by_asc(venue::Column::Name)
            .order_by_asc(venue::Column::Id)
            .all(self.store.connection())
            .await?;
        Ok(venues
            .into_iter()
            .filter(|v| super::name_matches(&v.name, &folded))
            .map(Venue::from)
            .collect())
    }
}

async fn modify(conn: &impl ConnectionTrait, id: i32, patch: VenuePatch) -> Result<i32> {
    let mut active: venue::ActiveModel = find(conn, id).await?.into();
    patch.apply(&mut active)?;
    if active.is_changed() {
        active.update(conn).await?;
    }
    Ok(id)
}

async fn remove(conn: &impl ConnectionTrait, id: i32) -> Result<()> {
    find(conn, id).await?;
    show::Entity::delete_many()
        .filter(show::Column::VenueId.eq(id))
        .exec(conn)
        .await?;
    venue::Entity::delete_by_id(id).exec(conn).await?;
    Ok(())
}

pub(crate) async fn find(conn: &impl ConnectionTrait, id: i32) -> Result<venue::Model> {
    venue::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(Error::not_found(EntityKind::Venue, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        fixtures::{self, at},
        show::NewShow,
    };

    #[tokio::test]
    async fn create_requires_name_city_state_address() {
        let store = Store::in_memory().await.unwrap();
        let mut new = fixtures::venue("The Musical Hop", "San Francisco", "CA");
        new.address = "  ".into();
        assert!(matches!(
            store.venues().create(new).await,
            Err(Error::Validation {
                field: "address",
                ..
            })
        ));
        assert!(store.venues().list_recent(10).await.unwrap().is_empty());

        let id = store
            .venues()
            .create(fixtures::venue("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();
        let venue = store.venues().get(id).await.unwrap();
        assert_eq!(venue.name, "The Musical Hop");
        assert_eq!(venue.genres.iter().collect::<Vec<_>>(), ["Jazz", "Reggae"]);
        assert!(!venue.seeking_talent);
    }

    #[tokio::test]
    async fn recent_is_oldest_listing_first() {
        let store = Store::in_memory().await.unwrap();
        for (name, day) in [("Park Square", 3), ("The Musical Hop", 1), ("Dueling Pianos", 2)] {
            let mut new = fixtures::venue(name, "San Francisco", "CA");
            new.listed_on = Date::from_ymd_opt(2024, 1, day);
            store.venues().create(new).await.unwrap();
        }
        let recent = store.venues().list_recent(2).await.unwrap();
        let names: Vec<_> = recent.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["The Musical Hop", "Dueling Pianos"]);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let store = Store::in_memory().await.unwrap();
        for name in ["The Musical Hop", "Park Square Live Music & Coffee", "The Dueling Pianos Bar"] {
            store
                .venues()
                .create(fixtures::venue(name, "San Francisco", "CA"))
                .await
                .unwrap();
        }
        let hits = store.venues().search_by_name("MUSIC").await.unwrap();
        let names: Vec<_> = hits.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Park Square Live Music & Coffee", "The Musical Hop"]);
        assert!(store.venues().search_by_name("opera").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn grouped_by_location_counts_shows() {
        let store = Store::in_memory().await.unwrap();
        let hop = store
            .venues()
            .create(fixtures::venue("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();
        store
            .venues()
            .create(fixtures::venue("Park Square", "San Francisco", "CA"))
            .await
            .unwrap();
        store
            .venues()
            .create(fixtures::venue("The Dueling Pianos Bar", "New York", "NY"))
            .await
            .unwrap();
        let artist = store
            .artists()
            .create(fixtures::artist("Guns N Petals"))
            .await
            .unwrap();
        for day in [1, 2] {
            store
                .shows()
                .create(NewShow {
                    artist_id: artist,
                    venue_id: hop,
                    start_time: at(2035, 5, day, 20, 0, 0),
                })
                .await
                .unwrap();
        }

        let areas = store.venues().list_grouped_by_location().await.unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!((areas[0].city.as_str(), areas[0].state.as_str()), ("San Francisco", "CA"));
        assert_eq!(areas[1].state, "NY");
        let sf: Vec<_> = areas[0]
            .venues
            .iter()
            .map(|v| (v.name.as_str(), v.num_shows))
            .collect();
        assert_eq!(sf, [("Park Square", 0), ("The Musical Hop", 2)]);
    }

    #[tokio::test]
    async fn detail_partitions_shows() {
        let store = Store::in_memory().await.unwrap();
        let venue_id = store
            .venues()
            .create(fixtures::venue("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();
        let artist_id = store
            .artists()
            .create(fixtures::artist("Guns N Petals"))
            .await
            .unwrap();
        let now = at(2030, 1, 1, 12, 0, 0);
        for start_time in [
            at(2029, 12, 1, 20, 0, 0),
            now,
            at(2030, 1, 1, 18, 0, 0),
            at(2030, 2, 1, 20, 0, 0),
        ] {
            store
                .shows()
                .create(NewShow {
                    artist_id,
                    venue_id,
                    start_time,
                })
                .await
                .unwrap();
        }

        let detail = store.venues().detail(venue_id, now).await.unwrap();
        assert_eq!(detail.schedule.past_shows_count, 2);
        assert_eq!(detail.schedule.upcoming_shows_count, 2);
        assert_eq!(detail.schedule.total(), 4);
        assert!(detail.schedule.past_shows.iter().any(|s| s.start_time == now));
        assert_eq!(detail.schedule.upcoming_shows[0].name, "Guns N Petals");
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let store = Store::in_memory().await.unwrap();
        let id = store
            .venues()
            .create(fixtures::venue("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();
        store
            .venues()
            .update(
                id,
                VenuePatch {
                    city: Some("Oakland".into()),
                    phone: Some(String::new()),
                    seeking_talent: Some(true),
                    genres: Some(Genres::new(["Folk"]).unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let venue = store.venues().get(id).await.unwrap();
        assert_eq!(venue.name, "The Musical Hop");
        assert_eq!(venue.city, "Oakland");
        assert_eq!(venue.phone, None);
        assert!(venue.seeking_talent);
        assert_eq!(venue.genres.encode(), "Folk");
    }

    #[tokio::test]
    async fn update_missing_venue_changes_nothing() {
        let store = Store::in_memory().await.unwrap();
        let id = store
            .venues()
            .create(fixtures::venue("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();
        let before = store.venues().get(id).await.unwrap();
        let err = store
            .venues()
            .update(
                id + 1,
                VenuePatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: EntityKind::Venue,
                ..
            }
        ));
        assert_eq!(store.venues().get(id).await.unwrap(), before);

        // blanking a required column is refused and rolled back
        let err = store
            .venues()
            .update(
                id,
                VenuePatch {
                    city: Some("Oakland".into()),
                    name: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "name", .. }));
        assert_eq!(store.venues().get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn delete_removes_venue_and_its_shows() {
        let store = Store::in_memory().await.unwrap();
        let venue_id = store
            .venues()
            .create(fixtures::venue("The Musical Hop", "San Francisco", "CA"))
            .await
            .unwrap();
        let artist_id = store
            .artists()
            .create(fixtures::artist("Guns N Petals"))
            .await
            .unwrap();
        store
            .shows()
            .create(NewShow {
                artist_id,
                venue_id,
                start_time: at(2035, 5, 21, 21, 30, 0),
            })
            .await
            .unwrap();

        store.venues().delete(venue_id).await.unwrap();
        assert!(matches!(
            store.venues().get(venue_id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(store.shows().list().await.unwrap().is_empty());
        assert!(matches!(
            store.venues().delete(venue_id).await,
            Err(Error::NotFound {
                kind: EntityKind::Venue,
                ..
            })
        ));
    }
}
