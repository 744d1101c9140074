pub mod api;

pub mod config;

pub mod db;

pub mod entity;

pub mod error;

pub mod genre;

pub mod options;

pub mod present;

pub mod query;

pub(crate) mod util;

pub use error::{EntityKind, Error, Result};
