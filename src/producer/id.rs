//! Resource identifier validation.

use std::fmt;

/// A resource identifier that passed the well-formedness check.
///
/// Well-formed means exactly `length` characters, each an ASCII letter,
/// digit, `-` or `_`. The character set excludes `.` and `/`, so an id can
/// never address anything outside a media directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

/// The raw identifier failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resource id `{0}`")]
pub struct InvalidResourceId(pub String);

impl ResourceId {
    pub fn parse(raw: &str, length: usize) -> Result<Self, InvalidResourceId> {
        let well_formed = raw.len() == length
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidResourceId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
