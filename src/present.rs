//! Display helpers for whatever renders the records: the `datetime` filter
//! and the wording of user-facing error messages.

use std::str::FromStr;

use chrono::{DateTime as Zoned, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// `Tuesday May, 21, 2019 at 9:30PM`
    Full,
    /// `Tue 05, 21, 2019 9:30PM`
    #[default]
    Medium,
}

impl Style {
    fn pattern(self) -> &'static str {
        match self {
            Style::Full => "%A %B, %-d, %Y at %-I:%M%p",
            Style::Medium => "%a %m, %d, %Y %-I:%M%p",
        }
    }

    pub fn render(self, at: NaiveDateTime) -> String {
        at.format(self.pattern()).to_string()
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(Style::Full),
            "medium" => Ok(Style::Medium),
            other => Err(Error::invalid("format", format!("unknown style {other:?}"))),
        }
    }
}

/// A timestamp as the filter receives it.
#[derive(Debug, Clone, Copy)]
pub enum When<'a> {
    At(NaiveDateTime),
    Text(&'a str),
}

impl From<NaiveDateTime> for When<'_> {
    fn from(at: NaiveDateTime) -> Self {
        When::At(at)
    }
}

impl<'a> From<&'a str> for When<'a> {
    fn from(text: &'a str) -> Self {
        When::Text(text)
    }
}

const TEXT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses the ISO-ish spellings the forms and the database produce.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(zoned) = Zoned::parse_from_rfc3339(text) {
        return Ok(zoned.naive_local());
    }
    for format in TEXT_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(at);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::invalid("datetime", format!("cannot read {text:?} as a timestamp")))
}

pub fn format_datetime<'a>(value: impl Into<When<'a>>, style: Style) -> Result<String> {
    let at = match value.into() {
        When::At(at) => at,
        When::Text(text) => parse_timestamp(text)?,
    };
    Ok(style.render(at))
}

/// Text shown to the user in place of an error.
pub fn message(error: &Error) -> String {
    match error {
        Error::BookingConflict {
            earliest, latest, ..
        } => format!(
            "Artist is already booked for that date! Please choose a date before \"{}\" or after \"{}\"",
            Style::Medium.render(*earliest),
            Style::Medium.render(*latest),
        ),
        Error::Persistence(_) => "An error occurred. The change could not be saved.".to_string(),
        other => other.to_string(),
    }
}
