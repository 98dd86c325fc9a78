mod auth;
mod codec;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use url::Url;

use self::auth::TokenSource;
use self::codec::{
    aggregate_count, company_fields, media_patch_fields, AggregationResponse, Document, Fields,
    FirestoreRecord, ListResponse, ADMINS_COLLECTION, CONTACTS_COLLECTION, COUNT_ALIAS,
    MEDIA_COLLECTION,
};
use super::{new_document_id, DocumentStore, StoreError};
use crate::storage::models::{
    AdminGrant, CompanyDetails, CompanyProfile, ContactSubmission, MediaItem, MediaPatch,
    NewContactSubmission, NewMediaItem,
};
use crate::storage::PurgeStats;

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// Database id, `(default)` unless a named database is used
    pub database: String,
    /// Service account JSON key; metadata server credentials when absent
    pub credentials_file: Option<String>,
    /// `host:port` of a local emulator
    pub emulator_host: Option<String>,
}

/// Hosted Firestore backend over the REST API.
pub struct FirestoreStore {
    client: Client,
    documents_url: Url,
    tokens: TokenSource,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;

        let base = match config.emulator_host {
            Some(ref host) => format!("http://{host}/v1"),
            None => FIRESTORE_API.to_string(),
        };
        let documents_url = Url::parse(&format!(
            "{base}/projects/{}/databases/{}/documents",
            config.project_id, config.database
        ))?;

        let tokens = TokenSource::new(
            client.clone(),
            config.credentials_file.as_deref(),
            config.emulator_host.is_some(),
        );

        Ok(Self {
            client,
            documents_url,
            tokens,
        })
    }

    fn collection_url(&self, collection: &str) -> Result<Url, StoreError> {
        self.with_segments(&[collection])
    }

    /// URL of a single document. The id is always exactly one path segment.
    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        check_document_id(id)?;
        self.with_segments(&[collection, id])
    }

    fn with_segments(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Backend(format!("cannot extend {}", self.documents_url)))?
            .extend(segments);
        Ok(url)
    }

    /// Count a collection server-side with a `runAggregationQuery`.
    async fn count(&self, collection: &str, filter: Option<Value>) -> Result<u64, StoreError> {
        let mut structured_query = json!({ "from": [{ "collectionId": collection }] });
        if let Some(filter) = filter {
            structured_query["where"] = filter;
        }
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": structured_query,
                "aggregations": [{ "alias": COUNT_ALIAS, "count": {} }]
            }
        });

        let url = Url::parse(&format!("{}:runAggregationQuery", self.documents_url))
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.tokens.bearer().await?)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let responses: Vec<AggregationResponse> = read_json(check(resp, "count").await?).await?;
        aggregate_count(&responses)
    }

    /// All documents of a collection, following page tokens.
    async fn list<T: FirestoreRecord>(
        &self,
        order_by: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        let page_size = match limit {
            Some(n) => n.to_string(),
            None => PAGE_SIZE.to_string(),
        };

        loop {
            let mut query: Vec<(&str, &str)> = vec![("pageSize", page_size.as_str())];
            if let Some(order) = order_by {
                query.push(("orderBy", order));
            }
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let resp = self
                .client
                .get(self.collection_url(T::COLLECTION)?)
                .bearer_auth(self.tokens.bearer().await?)
                .query(&query)
                .send()
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let page: ListResponse = read_json(check(resp, "list").await?).await?;

            for doc in &page.documents {
                records.push(T::from_document(doc)?);
            }

            if limit.is_some_and(|n| records.len() >= n) {
                break;
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn get<T: FirestoreRecord>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let resp = self
            .client
            .get(self.document_url(T::COLLECTION, id)?)
            .bearer_auth(self.tokens.bearer().await?)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc: Document = read_json(check(resp, "get").await?).await?;
        Ok(Some(T::from_document(&doc)?))
    }

    /// Create a document under a client-chosen id.
    async fn create<T: FirestoreRecord>(&self, id: &str, record: &T) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(self.collection_url(T::COLLECTION)?)
            .bearer_auth(self.tokens.bearer().await?)
            .query(&[("documentId", id)])
            .json(&record.to_fields().into_body())
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        check(resp, "create").await?;
        Ok(())
    }

    /// Patch the masked fields of an existing document.
    /// Returns the full updated record, or `None` if the document does not exist.
    async fn patch_existing<T: FirestoreRecord>(
        &self,
        id: &str,
        fields: Fields,
    ) -> Result<Option<T>, StoreError> {
        let mut query: Vec<(&str, String)> = fields
            .names()
            .into_iter()
            .map(|name| ("updateMask.fieldPaths", name))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));

        let resp = self
            .client
            .patch(self.document_url(T::COLLECTION, id)?)
            .bearer_auth(self.tokens.bearer().await?)
            .query(&query)
            .json(&fields.into_body())
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc: Document = read_json(check(resp, "update").await?).await?;
        Ok(Some(T::from_document(&doc)?))
    }

    /// Delete a document, reporting whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let resp = self
            .client
            .delete(self.document_url(collection, id)?)
            .bearer_auth(self.tokens.bearer().await?)
            .query(&[("currentDocument.exists", "true")])
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        check(resp, "delete").await?;
        Ok(true)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_media(&self) -> Result<Vec<MediaItem>, StoreError> {
        self.list(Some("createdAt desc"), None).await
    }

    async fn get_media(&self, id: &str) -> Result<Option<MediaItem>, StoreError> {
        self.get(id).await
    }

    async fn create_media(&self, item: NewMediaItem) -> Result<MediaItem, StoreError> {
        let record = item.into_record(new_document_id(), Utc::now());
        self.create(&record.id, &record).await?;
        tracing::debug!(media_id = %record.id, "Created media document");
        Ok(record)
    }

    async fn update_media(
        &self,
        id: &str,
        patch: &MediaPatch,
    ) -> Result<Option<MediaItem>, StoreError> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        self.patch_existing(id, media_patch_fields(patch)).await
    }

    async fn delete_media(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(MEDIA_COLLECTION, id).await
    }

    async fn count_media(&self) -> Result<u64, StoreError> {
        self.count(MEDIA_COLLECTION, None).await
    }

    async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        self.list(Some("createdAt desc"), None).await
    }

    async fn create_contact(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        let record = submission.into_record(new_document_id(), Utc::now());
        self.create(&record.id, &record).await?;
        tracing::debug!(contact_id = %record.id, "Created contact document");
        Ok(record)
    }

    async fn set_contact_read(
        &self,
        id: &str,
        is_read: bool,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        self.patch_existing(id, Fields::new().boolean("isRead", is_read))
            .await
    }

    async fn delete_contact(&self, id: &str) -> Result<bool, StoreError> {
        self.delete(CONTACTS_COLLECTION, id).await
    }

    async fn count_contacts(&self, unread_only: bool) -> Result<u64, StoreError> {
        let filter = unread_only.then(|| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": "isRead" },
                    "op": "EQUAL",
                    "value": { "booleanValue": false }
                }
            })
        });
        self.count(CONTACTS_COLLECTION, filter).await
    }

    async fn get_company(&self) -> Result<Option<CompanyProfile>, StoreError> {
        let profiles: Vec<CompanyProfile> = self.list(None, Some(1)).await?;
        Ok(profiles.into_iter().next())
    }

    // Not transactional: two concurrent first-time upserts could both create.
    // get_company still only ever reads the first document.
    async fn upsert_company(&self, details: &CompanyDetails) -> Result<CompanyProfile, StoreError> {
        if let Some(existing) = self.get_company().await? {
            let updated: Option<CompanyProfile> = self
                .patch_existing(&existing.id, company_fields(details))
                .await?;
            if let Some(profile) = updated {
                return Ok(profile);
            }
        }

        let profile = CompanyProfile {
            id: new_document_id(),
            details: details.clone(),
        };
        self.create(&profile.id, &profile).await?;
        Ok(profile)
    }

    async fn list_admin_grants(&self) -> Result<Vec<AdminGrant>, StoreError> {
        self.list(None, None).await
    }

    async fn get_admin_grant(&self, uid: &str) -> Result<Option<AdminGrant>, StoreError> {
        self.get(uid).await
    }

    /// Full overwrite without preconditions, creating the document if needed.
    async fn put_admin_grant(&self, grant: &AdminGrant) -> Result<(), StoreError> {
        let resp = self
            .client
            .patch(self.document_url(ADMINS_COLLECTION, &grant.uid)?)
            .bearer_auth(self.tokens.bearer().await?)
            .json(&grant.to_fields().into_body())
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        check(resp, "set").await?;
        Ok(())
    }

    async fn delete_admin_grant(&self, uid: &str) -> Result<bool, StoreError> {
        self.delete(ADMINS_COLLECTION, uid).await
    }

    async fn purge_all(&self) -> Result<PurgeStats, StoreError> {
        Err(StoreError::Unsupported("purge_all on a hosted database"))
    }
}

/// Reject ids that could not be used as a single document path segment.
fn check_document_id(id: &str) -> Result<(), StoreError> {
    let reserved = id.len() >= 4 && id.starts_with("__") && id.ends_with("__");
    if id.is_empty() || id == "." || id == ".." || id.contains('/') || reserved {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Turn a non-success response into a `StoreError::Backend` carrying the API's message.
async fn check(resp: Response, operation: &str) -> Result<Response, StoreError> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Backend(format!(
        "Firestore {operation} failed ({status}): {body}"
    )))
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    resp.json()
        .await
        .map_err(|e| StoreError::Malformed(e.to_string()))
}
