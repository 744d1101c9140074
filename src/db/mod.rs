use camino::Utf8Path;
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::query::{
    album::Albums, artist::Artists, show::Shows, song::Songs, venue::Venues,
};

mod migration;

pub use migration::Migrator;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database: {0}")]
    DbErr(#[from] DbErr),
    #[error("data path must be absolute: {0}")]
    RelativePath(String),
}

/// Handle to the persistent store. Cheap to clone; every command borrows it
/// and acquires its own transaction.
#[derive(Debug, Clone)]
pub struct Store {
    connection: DatabaseConnection,
}

impl Store {
    /// Opens (creating if needed) `gigbook.sqlite` below `data_path` and
    /// brings the schema up to date.
    pub async fn open(data_path: impl AsRef<Utf8Path>, log_statements: bool) -> Result<Self, Error> {
        let path = data_path.as_ref();
        if !path.is_absolute() {
            return Err(Error::RelativePath(path.to_string()));
        }

        let db_url = format!("sqlite://{path}/gigbook.sqlite?mode=rwc");
        let mut opts = ConnectOptions::new(db_url);
        opts.sqlx_logging(true).sqlx_logging_level(if log_statements {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Debug
        });

        Ok(Self::connect(opts).await?)
    }

    /// Private in-memory database; the pool is pinned to one connection so
    /// every query sees the same schema.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        Self::connect(opts).await
    }

    pub async fn connect(opts: ConnectOptions) -> Result<Self, DbErr> {
        debug!("database URL: {}", opts.get_url());
        let connection = Database::connect(opts).await?;
        Migrator::up(&connection, None).await?;
        info!("schema up to date");
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn venues(&self) -> Venues<'_> {
        Venues::new(self)
    }

    pub fn artists(&self) -> Artists<'_> {
        Artists::new(self)
    }

    pub fn albums(&self) -> Albums<'_> {
        Albums::new(self)
    }

    pub fn songs(&self) -> Songs<'_> {
        Songs::new(self)
    }

    pub fn shows(&self) -> Shows<'_> {
        Shows::new(self)
    }

    pub(crate) async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.connection.begin().await
    }
}

/// Ends a write scope: commits on success, rolls back on error. The command
/// error wins over a failed rollback.
pub(crate) async fn finish<T>(
    txn: DatabaseTransaction,
    outcome: crate::error::Result<T>,
) -> crate::error::Result<T> {
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                warn!("rollback after {e}: {rollback}");
            }
            Err(e)
        }
    }
}
