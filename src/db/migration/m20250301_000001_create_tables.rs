use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Venue::Table)
                    .if_not_exists()
                    .col(pk_auto(Venue::Id))
                    .col(string(Venue::Name))
                    .col(string_len(Venue::City, 128))
                    .col(string_len(Venue::State, 128))
                    .col(string_len(Venue::Address, 128))
                    .col(string_len_null(Venue::Phone, 128))
                    .col(string(Venue::Genres))
                    .col(string_len_null(Venue::ImageLink, 512))
                    .col(string_len_null(Venue::FacebookLink, 128))
                    .col(string_len_null(Venue::WebsiteLink, 128))
                    .col(boolean(Venue::SeekingTalent))
                    .col(string_len_null(Venue::SeekingDescription, 255))
                    .col(date(Venue::ListedOn))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-venue-location")
                    .table(Venue::Table)
                    .col(Venue::State)
                    .col(Venue::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Artist::Table)
                    .if_not_exists()
                    .col(pk_auto(Artist::Id))
                    .col(string(Artist::Name))
                    .col(string_len(Artist::City, 128))
                    .col(string_len(Artist::State, 128))
                    .col(string_len_null(Artist::Phone, 128))
                    .col(string(Artist::Genres))
                    .col(string_len_null(Artist::ImageLink, 512))
                    .col(string_len_null(Artist::FacebookLink, 128))
                    .col(string_len_null(Artist::WebsiteLink, 128))
                    .col(boolean(Artist::SeekingVenue))
                    .col(string_len_null(Artist::SeekingDescription, 255))
                    .col(date(Artist::ListedOn))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Show::Table)
                    .if_not_exists()
                    .col(pk_auto(Show::Id))
                    .col(integer(Show::VenueId))
                    .col(integer(Show::ArtistId))
                    .col(date_time(Show::StartTime))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-show-venue_id")
                            .from(Show::Table, Show::VenueId)
                            .to(Venue::Table, Venue::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-show-artist_id")
                            .from(Show::Table, Show::ArtistId)
                            .to(Artist::Table, Artist::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // the booking check filters on both
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-show-artist-start")
                    .table(Show::Table)
                    .col(Show::ArtistId)
                    .col(Show::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(pk_auto(Album::Id))
                    .col(string_len(Album::Name, 128))
                    .col(string_len_null(Album::Description, 255))
                    .col(date(Album::LaunchDate))
                    .col(string_null(Album::ImageCover))
                    .col(integer(Album::ArtistId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-album-artist_id")
                            .from(Album::Table, Album::ArtistId)
                            .to(Artist::Table, Artist::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Song::Table)
                    .if_not_exists()
                    .col(pk_auto(Song::Id))
                    .col(string_len(Song::Name, 128))
                    .col(time_null(Song::Duration))
                    .col(integer(Song::AlbumId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-song-album_id")
                            .from(Song::Table, Song::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Song::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Show::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Artist::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Venue::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Venue {
    Table,
    Id,
    Name,
    City,
    State,
    Address,
    Phone,
    Genres,
    ImageLink,
    FacebookLink,
    WebsiteLink,
    SeekingTalent,
    SeekingDescription,
    ListedOn,
}

#[derive(DeriveIden)]
enum Artist {
    Table,
    Id,
    Name,
    City,
    State,
    Phone,
    Genres,
    ImageLink,
    FacebookLink,
    WebsiteLink,
    SeekingVenue,
    SeekingDescription,
    ListedOn,
}

#[derive(DeriveIden)]
enum Show {
    Table,
    Id,
    VenueId,
    ArtistId,
    StartTime,
}

#[derive(DeriveIden)]
enum Album {
    Table,
    Id,
    Name,
    Description,
    LaunchDate,
    ImageCover,
    ArtistId,
}

#[derive(DeriveIden)]
enum Song {
    Table,
    Id,
    Name,
    Duration,
    AlbumId,
}
