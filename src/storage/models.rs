use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category a visitor picks on the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    SongSubmission,
    Advertisement,
    Collaboration,
    #[serde(other)]
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::SongSubmission,
        ServiceType::Advertisement,
        ServiceType::Collaboration,
        ServiceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::SongSubmission => "song-submission",
            ServiceType::Advertisement => "advertisement",
            ServiceType::Collaboration => "collaboration",
            ServiceType::Other => "other",
        }
    }

    /// Human-readable label for forms and the admin listing.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::SongSubmission => "Song Submission",
            ServiceType::Advertisement => "Advertisement Inquiry",
            ServiceType::Collaboration => "Collaboration",
            ServiceType::Other => "Other",
        }
    }

    /// Lenient decode for stored values; anything unrecognised is `Other`.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(ServiceType::Other)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// A featured video link shown in the gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new media item
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaItem {
    pub title: String,
    pub artist: String,
    pub video_url: String,
}

impl NewMediaItem {
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> MediaItem {
        MediaItem {
            id,
            title: self.title,
            artist: self.artist,
            video_url: self.video_url,
            created_at,
        }
    }
}

/// Partial update for a media item; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub video_url: Option<String>,
}

impl MediaPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.video_url.is_none()
    }

    pub fn apply(&self, item: &mut MediaItem) {
        if let Some(ref title) = self.title {
            item.title = title.clone();
        }
        if let Some(ref artist) = self.artist {
            item.artist = artist.clone();
        }
        if let Some(ref video_url) = self.video_url {
            item.video_url = video_url.clone();
        }
    }
}

/// A message left through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: ServiceType,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated contact form fields
#[derive(Debug, Clone, PartialEq)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: ServiceType,
    pub message: String,
}

impl NewContactSubmission {
    /// New submissions always start unread.
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            service_type: self.service_type,
            message: self.message,
            is_read: false,
            created_at,
        }
    }
}

/// Marketing copy and counters, without the document id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub description: String,
    pub mission: String,
    pub shows_produced: String,
    pub artists_featured: String,
    pub years_experience: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// The canonical company profile document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: String,
    pub details: CompanyDetails,
}

/// Allow-list entry keyed by the identity provider's user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminGrant {
    pub uid: String,
    pub email: String,
    pub is_admin: bool,
    pub added_at: DateTime<Utc>,
}

impl AdminGrant {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            is_admin: true,
            added_at: Utc::now(),
        }
    }

    /// A grant only authorizes when its flag is set.
    pub fn authorizes(&self) -> bool {
        self.is_admin
    }
}
