//! Genre tags are a set at the domain boundary and a single comma-joined
//! column in storage.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SEPARATOR: char = ',';

/// Ordered, duplicate-free list of genre tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genres(Vec<String>);

impl Genres {
    /// Builds a tag set from raw form values. Blank tags and repeats are
    /// dropped; a tag containing the separator cannot be stored and is rejected.
    pub fn new<I, S>(tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if tag.is_empty() {
                continue;
            }
            if tag.contains(SEPARATOR) {
                return Err(Error::invalid(
                    "genres",
                    format!("genre {tag:?} contains '{SEPARATOR}'"),
                ));
            }
            if !out.iter().any(|known| known == tag) {
                out.push(tag.to_string());
            }
        }
        Ok(Genres(out))
    }

    pub fn encode(&self) -> String {
        self.0.join(",")
    }

    /// Inverse of [`Genres::encode`]. The empty string is the empty set.
    pub fn decode(stored: &str) -> Self {
        if stored.is_empty() {
            return Genres::default();
        }
        let mut out: Vec<String> = Vec::new();
        for tag in stored.split(SEPARATOR).map(str::trim) {
            if !tag.is_empty() && !out.iter().any(|known| known == tag) {
                out.push(tag.to_string());
            }
        }
        Genres(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
