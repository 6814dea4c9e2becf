//! Catalogue items as received from the service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Catalogue item identifier.
///
/// # Examples
/// ```
/// use shortflix_client::domain::ShortId;
///
/// let id: ShortId = "42".parse().unwrap();
/// assert_eq!(id.to_string(), "42");
/// assert!("forty-two".parse::<ShortId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortId(u64);

impl ShortId {
    /// Wrap a raw catalogue id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw catalogue id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShortId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Reference to the uploading account.
///
/// The listing endpoint renders the owner as a username while older payloads
/// carry the numeric id, so both shapes are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerRef {
    /// Numeric account id.
    Id(u64),
    /// Account username.
    Username(String),
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

/// Immutable snapshot of one catalogue item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Short {
    /// Catalogue id.
    pub id: ShortId,
    /// Display title.
    pub title: String,
    /// Empty when the uploader gave none.
    pub description: String,
    /// Tags in server order.
    pub tags: Vec<String>,
    /// Absolute URL of the video file.
    pub media_uri: String,
    /// Absolute URL of the cover image, if any.
    pub thumbnail_uri: Option<String>,
    /// Play count reported by the service.
    pub view_count: u64,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
    /// Uploader.
    pub owner: OwnerRef,
}
