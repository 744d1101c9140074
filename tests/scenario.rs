//! End-to-end walk through the command layer: an artist, an album with a
//! song, and shows that do or do not collide.

use camino::Utf8Path;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use gigbook::{
    db::Store,
    genre::Genres,
    query::{
        album::NewAlbum, artist::NewArtist, show::NewShow, song::NewSong, venue::NewVenue,
        Listing, Repository,
    },
    EntityKind, Error,
};
use tempfile::TempDir;

fn at(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2035, 4, 1)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn artist_album_song_and_shows() {
    let store = Store::in_memory().await.expect("Failed to open store");

    let artist = store
        .artists()
        .create(NewArtist {
            name: "A".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            genres: Genres::new(["Rock n Roll"]).unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();

    let album = store
        .albums()
        .create(NewAlbum {
            name: "X".into(),
            artist_id: artist,
            ..Default::default()
        })
        .await
        .unwrap();

    store
        .songs()
        .create(NewSong {
            name: "S1".into(),
            duration: None,
            album_id: album,
        })
        .await
        .unwrap();

    let detail = store.albums().detail(album).await.unwrap();
    assert_eq!(detail.num_songs, 1);
    assert_eq!(detail.songs[0].name, "S1");
    assert_eq!(detail.artist_name, "A");

    let venue = store
        .venues()
        .create(NewVenue {
            name: "V".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let show = |start_time| NewShow {
        artist_id: artist,
        venue_id: venue,
        start_time,
    };
    let t = at(18);

    store.shows().create(show(t)).await.unwrap();

    let err = store
        .shows()
        .create(show(t + TimeDelta::hours(2)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::BookingConflict { artist_id, .. } if artist_id == artist),
        "{err:?}"
    );

    store
        .shows()
        .create(show(t + TimeDelta::hours(4)))
        .await
        .expect("four hours later is free");

    assert_eq!(store.shows().list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleted_album_detail_is_not_found() {
    let store = Store::in_memory().await.unwrap();
    let artist = store
        .artists()
        .create(NewArtist {
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let album = store
        .albums()
        .create(NewAlbum {
            name: "Petal Power".into(),
            artist_id: artist,
            ..Default::default()
        })
        .await
        .unwrap();

    store.albums().delete(album).await.unwrap();

    let err = store.albums().detail(album).await.unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound {
            kind: EntityKind::Album,
            ..
        }
    ));
}

/// The on-disk store survives a reopen.
#[tokio::test]
async fn store_on_disk_is_persistent() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = Utf8Path::from_path(temp_dir.path()).expect("temp dir is UTF-8");

    {
        let store = Store::open(data_path, false).await.expect("Failed to open store");
        store
            .venues()
            .create(NewVenue {
                name: "The Dueling Pianos Bar".into(),
                city: "New York".into(),
                state: "NY".into(),
                address: "335 Delancey Street".into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    assert!(data_path.join("gigbook.sqlite").is_file());

    let store = Store::open(data_path, false).await.unwrap();
    let found = store.venues().search_by_name("dueling").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].city, "New York");
}

#[tokio::test]
async fn relative_data_path_is_rejected() {
    let err = Store::open("relative/dir", false).await.unwrap_err();
    assert!(matches!(err, gigbook::db::Error::RelativePath(_)));
}
