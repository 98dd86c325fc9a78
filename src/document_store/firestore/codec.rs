//! Mapping between Firestore REST documents and the site's records.
//!
//! Field names follow the hosted collections' camelCase schema so that data
//! written by earlier clients stays readable.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::document_store::StoreError;
use crate::storage::models::{
    AdminGrant, CompanyDetails, CompanyProfile, ContactSubmission, MediaItem, MediaPatch,
    ServiceType,
};

pub const MEDIA_COLLECTION: &str = "songs";
pub const CONTACTS_COLLECTION: &str = "contacts";
pub const COMPANY_COLLECTION: &str = "company";
pub const ADMINS_COLLECTION: &str = "admins";

/// A document as returned by the REST API
#[derive(Debug, Deserialize)]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn reader(&self) -> FieldReader<'_> {
        FieldReader {
            doc: self.id(),
            fields: &self.fields,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Alias of the single `count` aggregation requested by the store
pub const COUNT_ALIAS: &str = "total";

/// One element of a `runAggregationQuery` response stream
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResponse {
    #[serde(default)]
    pub result: Option<AggregationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    #[serde(default)]
    pub aggregate_fields: Map<String, Value>,
}

/// Read the [`COUNT_ALIAS`] value. Integers arrive as decimal strings.
pub fn aggregate_count(responses: &[AggregationResponse]) -> Result<u64, StoreError> {
    let value = responses
        .iter()
        .filter_map(|r| r.result.as_ref())
        .find_map(|r| r.aggregate_fields.get(COUNT_ALIAS))
        .and_then(|v| v.get("integerValue"))
        .ok_or_else(|| StoreError::Malformed("aggregation result has no count".to_string()))?;

    match value {
        Value::String(raw) => raw.parse().ok(),
        other => other.as_u64(),
    }
    .ok_or_else(|| StoreError::Malformed(format!("invalid count value: {value}")))
}

// ============================================================================
// Encoding
// ============================================================================

/// Typed field map for a write request
#[derive(Debug, Default)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), json!({ "stringValue": value }));
        self
    }

    pub fn boolean(mut self, name: &str, value: bool) -> Self {
        self.0.insert(name.to_string(), json!({ "booleanValue": value }));
        self
    }

    pub fn timestamp(mut self, name: &str, value: DateTime<Utc>) -> Self {
        let formatted = value.to_rfc3339_opts(SecondsFormat::Micros, true);
        self.0
            .insert(name.to_string(), json!({ "timestampValue": formatted }));
        self
    }

    /// Field paths for an `updateMask`
    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn into_body(self) -> Value {
        json!({ "fields": self.0 })
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Lenient reader: absent fields fall back to defaults, mistyped ones are errors.
struct FieldReader<'a> {
    doc: &'a str,
    fields: &'a Map<String, Value>,
}

impl FieldReader<'_> {
    fn typed(&self, name: &str, kind: &str) -> Result<Option<&Value>, StoreError> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(value) if value.get("nullValue").is_some() => Ok(None),
            Some(value) => value.get(kind).map(Some).ok_or_else(|| {
                StoreError::Malformed(format!(
                    "document {}: field '{name}' is not a {kind}",
                    self.doc
                ))
            }),
        }
    }

    fn string(&self, name: &str) -> Result<String, StoreError> {
        Ok(self
            .typed(name, "stringValue")?
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    fn boolean(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self
            .typed(name, "booleanValue")?
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    /// Missing timestamps read as the Unix epoch so undated documents sort last.
    fn timestamp(&self, name: &str) -> Result<DateTime<Utc>, StoreError> {
        match self.typed(name, "timestampValue")?.and_then(Value::as_str) {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    StoreError::Malformed(format!(
                        "document {}: field '{name}' has invalid timestamp: {e}",
                        self.doc
                    ))
                }),
            None => Ok(DateTime::<Utc>::default()),
        }
    }
}

// ============================================================================
// Record mappings
// ============================================================================

pub trait FirestoreRecord: Sized {
    const COLLECTION: &'static str;

    fn to_fields(&self) -> Fields;
    fn from_document(doc: &Document) -> Result<Self, StoreError>;
}

impl FirestoreRecord for MediaItem {
    const COLLECTION: &'static str = MEDIA_COLLECTION;

    fn to_fields(&self) -> Fields {
        Fields::new()
            .string("title", &self.title)
            .string("artist", &self.artist)
            .string("youtubeUrl", &self.video_url)
            .timestamp("createdAt", self.created_at)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let r = doc.reader();
        Ok(MediaItem {
            id: doc.id().to_string(),
            title: r.string("title")?,
            artist: r.string("artist")?,
            video_url: r.string("youtubeUrl")?,
            created_at: r.timestamp("createdAt")?,
        })
    }
}

impl FirestoreRecord for ContactSubmission {
    const COLLECTION: &'static str = CONTACTS_COLLECTION;

    fn to_fields(&self) -> Fields {
        Fields::new()
            .string("name", &self.name)
            .string("email", &self.email)
            .string("phone", &self.phone)
            .string("serviceType", self.service_type.as_str())
            .string("message", &self.message)
            .boolean("isRead", self.is_read)
            .timestamp("createdAt", self.created_at)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let r = doc.reader();
        Ok(ContactSubmission {
            id: doc.id().to_string(),
            name: r.string("name")?,
            email: r.string("email")?,
            phone: r.string("phone")?,
            service_type: ServiceType::from_stored(&r.string("serviceType")?),
            message: r.string("message")?,
            is_read: r.boolean("isRead")?,
            created_at: r.timestamp("createdAt")?,
        })
    }
}

impl FirestoreRecord for CompanyProfile {
    const COLLECTION: &'static str = COMPANY_COLLECTION;

    fn to_fields(&self) -> Fields {
        company_fields(&self.details)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let r = doc.reader();
        Ok(CompanyProfile {
            id: doc.id().to_string(),
            details: CompanyDetails {
                description: r.string("description")?,
                mission: r.string("mission")?,
                shows_produced: r.string("showsProduced")?,
                artists_featured: r.string("artistsFeatured")?,
                years_experience: r.string("yearsExperience")?,
                phone: r.string("phone")?,
                email: r.string("email")?,
                address: r.string("address")?,
            },
        })
    }
}

impl FirestoreRecord for AdminGrant {
    const COLLECTION: &'static str = ADMINS_COLLECTION;

    fn to_fields(&self) -> Fields {
        Fields::new()
            .string("email", &self.email)
            .boolean("isAdmin", self.is_admin)
            .timestamp("addedAt", self.added_at)
    }

    fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let r = doc.reader();
        Ok(AdminGrant {
            uid: doc.id().to_string(),
            email: r.string("email")?,
            is_admin: r.boolean("isAdmin")?,
            added_at: r.timestamp("addedAt")?,
        })
    }
}

pub fn company_fields(details: &CompanyDetails) -> Fields {
    Fields::new()
        .string("description", &details.description)
        .string("mission", &details.mission)
        .string("showsProduced", &details.shows_produced)
        .string("artistsFeatured", &details.artists_featured)
        .string("yearsExperience", &details.years_experience)
        .string("phone", &details.phone)
        .string("email", &details.email)
        .string("address", &details.address)
}

/// Only the fields present in the patch, for use with an update mask
pub fn media_patch_fields(patch: &MediaPatch) -> Fields {
    let mut fields = Fields::new();
    if let Some(ref title) = patch.title {
        fields = fields.string("title", title);
    }
    if let Some(ref artist) = patch.artist {
        fields = fields.string("artist", artist);
    }
    if let Some(ref video_url) = patch.video_url {
        fields = fields.string("youtubeUrl", video_url);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_contact_document() {
        let doc = document(json!({
            "name": "projects/p/databases/(default)/documents/contacts/abc123",
            "fields": {
                "name": { "stringValue": "Harpreet" },
                "email": { "stringValue": "h@example.com" },
                "phone": { "stringValue": "+91 98765 43210" },
                "serviceType": { "stringValue": "advertisement" },
                "message": { "stringValue": "Slot for Sunday show?" },
                "isRead": { "booleanValue": true },
                "createdAt": { "timestampValue": "2024-03-01T10:15:00.123456Z" }
            }
        }));

        let contact = ContactSubmission::from_document(&doc).unwrap();
        assert_eq!(contact.id, "abc123");
        assert_eq!(contact.service_type, ServiceType::Advertisement);
        assert!(contact.is_read);
        assert_eq!(
            contact.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            "2024-03-01T10:15:00.123456Z"
        );
    }

    #[test]
    fn test_decode_tolerates_missing_fields() {
        let doc = document(json!({
            "name": "projects/p/databases/(default)/documents/contacts/old",
            "fields": {
                "name": { "stringValue": "Legacy" },
                "serviceType": { "stringValue": "wedding-shoot" }
            }
        }));

        let contact = ContactSubmission::from_document(&doc).unwrap();
        assert_eq!(contact.email, "");
        assert!(!contact.is_read);
        assert_eq!(contact.service_type, ServiceType::Other);
        assert_eq!(contact.created_at.timestamp(), 0);
    }

    #[test]
    fn test_undated_documents_sort_after_dated_ones() {
        let dated = document(json!({
            "name": "projects/p/databases/(default)/documents/songs/new",
            "fields": { "createdAt": { "timestampValue": "2021-06-01T00:00:00Z" } }
        }));
        let undated = document(json!({
            "name": "projects/p/databases/(default)/documents/songs/old",
            "fields": { "title": { "stringValue": "Untimed" } }
        }));

        let mut items = vec![
            MediaItem::from_document(&undated).unwrap(),
            MediaItem::from_document(&dated).unwrap(),
        ];
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        assert_eq!(items[0].id, "new");
        assert_eq!(items[1].id, "old");

        // Decoding the same document twice gives the same key.
        let again = MediaItem::from_document(&undated).unwrap();
        assert_eq!(again.created_at, items[1].created_at);
    }

    #[test]
    fn test_aggregate_count_reads_string_integers() {
        let responses: Vec<AggregationResponse> = serde_json::from_value(json!([{
            "result": { "aggregateFields": { "total": { "integerValue": "42" } } },
            "readTime": "2024-03-01T10:15:00Z"
        }]))
        .unwrap();
        assert_eq!(aggregate_count(&responses).unwrap(), 42);

        let empty: Vec<AggregationResponse> =
            serde_json::from_value(json!([{ "readTime": "2024-03-01T10:15:00Z" }])).unwrap();
        assert!(matches!(
            aggregate_count(&empty),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_mistyped_field() {
        let doc = document(json!({
            "name": "projects/p/databases/(default)/documents/admins/u1",
            "fields": { "isAdmin": { "stringValue": "yes" } }
        }));

        let err = AdminGrant::from_document(&doc).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_media_uses_hosted_field_names() {
        let item = MediaItem {
            id: "m1".to_string(),
            title: "Folk Evening".to_string(),
            artist: "Kuldeep".to_string(),
            video_url: "https://youtu.be/abc".to_string(),
            created_at: Utc::now(),
        };

        let body = item.to_fields().into_body();
        assert_eq!(
            body["fields"]["youtubeUrl"]["stringValue"],
            "https://youtu.be/abc"
        );
        assert!(body["fields"]["createdAt"]["timestampValue"].is_string());
        assert!(body["fields"].get("id").is_none());
    }

    #[test]
    fn test_media_patch_only_includes_present_fields() {
        let patch = MediaPatch {
            title: Some("New Title".to_string()),
            ..Default::default()
        };

        let fields = media_patch_fields(&patch);
        assert_eq!(fields.names(), vec!["title".to_string()]);
    }
}
