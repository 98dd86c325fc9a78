//! Input validation for the public contact form and the admin panel.
//!
//! Validation runs before any store call and reports every failing field at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::storage::models::{
    CompanyDetails, MediaPatch, NewContactSubmission, NewMediaItem, ServiceType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for a single field, for rendering next to the input.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Trimmed value, recording `message` if it ends up empty.
fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, message);
    }
    trimmed.to_string()
}

/// Basic email shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Absolute http(s) URL with a host.
pub fn is_valid_video_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

// ============================================================================
// Contact form
// ============================================================================

/// Contact form as submitted (urlencoded page form or JSON)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub message: String,
    /// Checkbox; browsers send `on` when ticked and omit it otherwise
    #[serde(default, deserialize_with = "checkbox")]
    pub accept_terms: bool,
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContactSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required(&mut errors, "name", &self.name, "Name is required");
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            errors.push("email", "Invalid email address");
        }
        let phone = required(&mut errors, "phone", &self.phone, "Phone is required");
        let service_type = match self.service_type.trim() {
            "" => {
                errors.push("service_type", "Service type is required");
                ServiceType::Other
            }
            raw => raw.parse::<ServiceType>().unwrap_or_else(|_| {
                errors.push("service_type", "Unknown service type");
                ServiceType::Other
            }),
        };
        let message = required(&mut errors, "message", &self.message, "Message is required");
        if !self.accept_terms {
            errors.push(
                "accept_terms",
                "Please accept the terms and conditions to continue",
            );
        }

        errors.into_result(|| NewContactSubmission {
            name,
            email,
            phone,
            service_type,
            message,
        })
    }
}

/// Accepts JSON booleans and HTML checkbox strings (`on`, `true`, `1`).
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Text(s) => matches!(s.as_str(), "on" | "true" | "1" | "yes"),
    })
}

// ============================================================================
// Admin forms
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub video_url: String,
}

impl MediaForm {
    pub fn validate(&self) -> Result<NewMediaItem, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = required(&mut errors, "title", &self.title, "Title is required");
        let artist = required(&mut errors, "artist", &self.artist, "Artist is required");
        let video_url = self.video_url.trim().to_string();
        if !is_valid_video_url(&video_url) {
            errors.push("video_url", "Invalid video URL");
        }

        errors.into_result(|| NewMediaItem {
            title,
            artist,
            video_url,
        })
    }
}

/// Partial media update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaUpdateForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl MediaUpdateForm {
    pub fn validate(&self) -> Result<MediaPatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.title.is_none() && self.artist.is_none() && self.video_url.is_none() {
            errors.push(
                "body",
                "at least one field (title, artist, video_url) must be provided",
            );
            return Err(errors);
        }

        let title = self
            .title
            .as_deref()
            .map(|t| required(&mut errors, "title", t, "Title is required"));
        let artist = self
            .artist
            .as_deref()
            .map(|a| required(&mut errors, "artist", a, "Artist is required"));
        let video_url = self.video_url.as_deref().map(|raw| {
            let url = raw.trim().to_string();
            if !is_valid_video_url(&url) {
                errors.push("video_url", "Invalid video URL");
            }
            url
        });

        errors.into_result(|| MediaPatch {
            title,
            artist,
            video_url,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompanyForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub shows_produced: String,
    #[serde(default)]
    pub artists_featured: String,
    #[serde(default)]
    pub years_experience: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl CompanyForm {
    pub fn validate(&self) -> Result<CompanyDetails, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let description = required(
            &mut errors,
            "description",
            &self.description,
            "Description is required",
        );
        let mission = required(&mut errors, "mission", &self.mission, "Mission is required");
        let shows_produced = required(
            &mut errors,
            "shows_produced",
            &self.shows_produced,
            "Shows produced is required",
        );
        let artists_featured = required(
            &mut errors,
            "artists_featured",
            &self.artists_featured,
            "Artists featured is required",
        );
        let years_experience = required(
            &mut errors,
            "years_experience",
            &self.years_experience,
            "Years of experience is required",
        );
        let phone = required(&mut errors, "phone", &self.phone, "Phone is required");
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            errors.push("email", "Invalid email address");
        }
        let address = required(&mut errors, "address", &self.address, "Address is required");

        errors.into_result(|| CompanyDetails {
            description,
            mission,
            shows_produced,
            artists_featured,
            years_experience,
            phone,
            email,
            address,
        })
    }
}

/// Body for granting admin access; the uid comes from the path.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminGrantForm {
    #[serde(default)]
    pub email: String,
}

impl AdminGrantForm {
    /// Returns the trimmed `(uid, email)` pair.
    pub fn validate(&self, uid: &str) -> Result<(String, String), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let uid = required(&mut errors, "uid", uid, "User UID is required");
        if uid.contains('/') {
            errors.push("uid", "User UID must not contain '/'");
        }
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            errors.push("email", "Invalid email address");
        }

        errors.into_result(|| (uid, email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_contact() -> ContactForm {
        ContactForm {
            name: "Gurpreet Singh".to_string(),
            email: "gurpreet@example.com".to_string(),
            phone: "+91 98151 00000".to_string(),
            service_type: "song-submission".to_string(),
            message: "I would like to submit my new track.".to_string(),
            accept_terms: true,
        }
    }

    #[test]
    fn test_contact_form_valid() {
        let submission = filled_contact().validate().unwrap();
        assert_eq!(submission.name, "Gurpreet Singh");
        assert_eq!(submission.service_type, ServiceType::SongSubmission);
    }

    #[test]
    fn test_contact_form_rejects_empty_required_fields() {
        let form = ContactForm {
            name: "   ".to_string(),
            phone: String::new(),
            message: String::new(),
            ..filled_contact()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message_for("name"), Some("Name is required"));
        assert_eq!(errors.message_for("phone"), Some("Phone is required"));
        assert_eq!(errors.message_for("message"), Some("Message is required"));
        assert_eq!(errors.errors().len(), 3);
    }

    #[test]
    fn test_contact_form_requires_terms_and_known_service() {
        let form = ContactForm {
            service_type: "wedding".to_string(),
            accept_terms: false,
            ..filled_contact()
        };

        let errors = form.validate().unwrap_err();
        assert!(errors.message_for("service_type").is_some());
        assert!(errors.message_for("accept_terms").is_some());
    }

    #[test]
    fn test_contact_form_checkbox_from_urlencoded() {
        let form: ContactForm = serde_qs::from_str(
            "name=A&email=a%40b.co&phone=1&service_type=other&message=hi&accept_terms=on",
        )
        .unwrap();
        assert!(form.accept_terms);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("official@studio.com"));
        assert!(!is_valid_email("official@studio"));
        assert!(!is_valid_email("@studio.com"));
        assert!(!is_valid_email("a b@studio.com"));
        assert!(!is_valid_email("a@b@studio.com"));
    }

    #[test]
    fn test_media_form_validates_url() {
        let form = MediaForm {
            title: "Heer".to_string(),
            artist: "Folk Group".to_string(),
            video_url: "not a url".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message_for("video_url"), Some("Invalid video URL"));

        let form = MediaForm {
            video_url: "ftp://example.com/video".to_string(),
            ..form
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_media_update_requires_a_field() {
        let errors = MediaUpdateForm::default().validate().unwrap_err();
        assert!(errors.message_for("body").is_some());

        let patch = MediaUpdateForm {
            artist: Some("  New Artist ".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.artist.as_deref(), Some("New Artist"));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn test_media_update_rejects_blank_provided_field() {
        let form = MediaUpdateForm {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_admin_grant_form() {
        let form = AdminGrantForm {
            email: "admin@example.com".to_string(),
        };
        assert_eq!(
            form.validate(" uid-1 ").unwrap(),
            ("uid-1".to_string(), "admin@example.com".to_string())
        );
        assert!(form.validate("").is_err());
        assert!(form.validate("a/b").is_err());
    }
}
