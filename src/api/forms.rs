//! Form bodies as the browser posts them, and their translation into
//! commands. Every field is optional here; the commands decide what is
//! required.

use chrono::NaiveDate;
use sea_orm::prelude::Time;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    genre::Genres,
    present::parse_timestamp,
    query::{
        album::{AlbumPatch, NewAlbum},
        artist::{ArtistPatch, NewArtist},
        show::NewShow,
        song::NewSong,
        venue::{NewVenue, VenuePatch},
    },
    util::NonBlank,
};

/// Checkbox value meaning "yes".
pub const FLAG_TRUE: &str = "y";

pub fn flag(value: Option<&str>) -> bool {
    value == Some(FLAG_TRUE)
}

fn id(field: &'static str, value: Option<String>) -> Result<i32> {
    let value = value.non_blank().ok_or_else(|| Error::missing(field))?;
    value
        .parse()
        .map_err(|_| Error::invalid(field, format!("{value:?} is not an id")))
}

fn date(field: &'static str, value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .non_blank()
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| Error::invalid(field, format!("{v:?} is not a YYYY-MM-DD date")))
        })
        .transpose()
}

fn duration(value: Option<String>) -> Result<Option<Time>> {
    value
        .non_blank()
        .map(|v| {
            Time::parse_from_str(&v, "%H:%M:%S")
                .or_else(|_| Time::parse_from_str(&format!("00:{v}"), "%H:%M:%S"))
                .map_err(|_| Error::invalid("song_duration", format!("{v:?} is not [HH:]MM:SS")))
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VenueForm {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: Option<String>,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn into_new(self) -> Result<NewVenue> {
        Ok(NewVenue {
            genres: Genres::new(&self.genres)?,
            seeking_talent: flag(self.seeking_talent.as_deref()),
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            website_link: self.website_link,
            seeking_description: self.seeking_description,
            listed_on: None,
        })
    }

    /// An unticked checkbox and an empty multi-select are absent from the
    /// body, so both always count as submitted.
    pub fn into_patch(self) -> Result<VenuePatch> {
        Ok(VenuePatch {
            genres: Some(Genres::new(&self.genres)?),
            seeking_talent: Some(flag(self.seeking_talent.as_deref())),
            name: self.name,
            city: self.city,
            state: self.state,
            address: self.address,
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            website_link: self.website_link,
            seeking_description: self.seeking_description,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistForm {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn into_new(self) -> Result<NewArtist> {
        Ok(NewArtist {
            genres: Genres::new(&self.genres)?,
            seeking_venue: flag(self.seeking_venue.as_deref()),
            name: self.name.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            website_link: self.website_link,
            seeking_description: self.seeking_description,
            listed_on: None,
        })
    }

    pub fn into_patch(self) -> Result<ArtistPatch> {
        Ok(ArtistPatch {
            genres: Some(Genres::new(&self.genres)?),
            seeking_venue: Some(flag(self.seeking_venue.as_deref())),
            name: self.name,
            city: self.city,
            state: self.state,
            phone: self.phone,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
            website_link: self.website_link,
            seeking_description: self.seeking_description,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AlbumForm {
    pub album_name: Option<String>,
    pub album_description: Option<String>,
    pub album_launch_date: Option<String>,
    pub album_image_cover: Option<String>,
    pub artist: Option<String>,
}

impl AlbumForm {
    pub fn into_new(self) -> Result<NewAlbum> {
        Ok(NewAlbum {
            artist_id: id("artist", self.artist)?,
            launch_date: date("album_launch_date", self.album_launch_date)?,
            name: self.album_name.unwrap_or_default(),
            description: self.album_description,
            image_cover: self.album_image_cover,
        })
    }

    pub fn into_patch(self) -> Result<AlbumPatch> {
        let artist_id = match self.artist.non_blank() {
            Some(artist) => Some(id("artist", Some(artist))?),
            None => None,
        };
        Ok(AlbumPatch {
            artist_id,
            launch_date: date("album_launch_date", self.album_launch_date)?,
            name: self.album_name,
            description: self.album_description,
            image_cover: self.album_image_cover,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SongForm {
    pub song_name: Option<String>,
    pub song_duration: Option<String>,
}

impl SongForm {
    pub fn into_new(self, album_id: i32) -> Result<NewSong> {
        Ok(NewSong {
            duration: duration(self.song_duration)?,
            name: self.song_name.unwrap_or_default(),
            album_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowForm {
    pub artist_id: Option<String>,
    pub venue_id: Option<String>,
    pub start_time: Option<String>,
}

impl ShowForm {
    pub fn into_new(self) -> Result<NewShow> {
        let start_time = self
            .start_time
            .non_blank()
            .ok_or_else(|| Error::missing("start_time"))?;
        Ok(NewShow {
            artist_id: id("artist_id", self.artist_id)?,
            venue_id: id("venue_id", self.venue_id)?,
            start_time: parse_timestamp(&start_time)?,
        })
    }
}
