use crate::error::{Error, Result};

/// Form inputs arrive as strings that may be empty; optional columns store
/// those as NULL.
pub(crate) trait NonBlank {
    fn non_blank(self) -> Option<String>;
}

impl NonBlank for String {
    fn non_blank(self) -> Option<String> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == self.len() {
            Some(self)
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl NonBlank for Option<String> {
    fn non_blank(self) -> Option<String> {
        self.and_then(NonBlank::non_blank)
    }
}

/// Required text columns: trims, rejects blank.
pub(crate) fn required(field: &'static str, value: String) -> Result<String> {
    value.non_blank().ok_or_else(|| Error::missing(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(String::new().non_blank(), None);
        assert_eq!("   ".to_string().non_blank(), None);
        assert_eq!(None::<String>.non_blank(), None);
        assert_eq!(" Rock ".to_string().non_blank().as_deref(), Some("Rock"));
    }

    #[test]
    fn required_rejects_blank() {
        assert!(matches!(
            required("name", " ".into()),
            Err(Error::Validation { field: "name", .. })
        ));
        assert_eq!(required("name", "The Musical Hop".into()).unwrap(), "The Musical Hop");
    }
}
