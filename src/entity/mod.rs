pub mod album;
pub mod artist;
pub mod show;
pub mod song;
pub mod venue;
