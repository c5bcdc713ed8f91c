//! Station code type.

use std::fmt;

/// Error returned when a station code is not a valid CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CRS code {input:?}: {reason}")]
pub struct InvalidCrs {
    input: String,
    reason: &'static str,
}

/// A 3-letter CRS station code, as used by Darwin to key departure boards.
///
/// Always 3 uppercase ASCII letters.
///
/// # Examples
///
/// ```
/// use departure_board::domain::Crs;
///
/// let cdf = Crs::parse("CDF").unwrap();
/// assert_eq!(cdf.as_str(), "CDF");
///
/// assert!(Crs::parse("cdf").is_err());
/// assert_eq!(Crs::from_config(" cdf ").unwrap(), cdf);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a CRS code. The input must be exactly 3 uppercase letters.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        let bytes = s.as_bytes();

        if bytes.len() != 3 {
            return Err(InvalidCrs {
                input: s.to_string(),
                reason: "must be exactly 3 characters",
            });
        }

        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidCrs {
                input: s.to_string(),
                reason: "must be uppercase ASCII letters A-Z",
            });
        }

        Ok(Crs([bytes[0], bytes[1], bytes[2]]))
    }

    /// Parse a code typed by a person into a config file.
    ///
    /// Surrounding whitespace is ignored and letters are uppercased first.
    pub fn from_config(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: We only store valid ASCII uppercase letters
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
