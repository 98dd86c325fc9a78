//! First-run content so a fresh deployment renders something sensible.

use crate::document_store::{DocumentStore, StoreError};
use crate::storage::models::{AdminGrant, CompanyDetails, NewMediaItem};

/// What `initialize_defaults` created
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub company_created: bool,
    pub media_created: usize,
    pub admin_bootstrapped: bool,
}

/// Allow-list entry to create when no admins exist yet
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub uid: String,
    pub email: String,
}

pub fn default_company() -> CompanyDetails {
    CompanyDetails {
        description: "Jashan Films stands as a premier Punjabi music production house, dedicated \
                      to showcasing the rich cultural heritage of Punjab through television \
                      programming. We broadcast authentic Punjabi music shows on Doordarshan \
                      three times a week, reaching millions of viewers across India."
            .to_string(),
        mission: "As a licensed advertisement agency with Doordarshan, we bridge the gap between \
                  talented artists and national television, providing comprehensive production \
                  services that honor traditional Punjabi music while embracing modern \
                  broadcasting standards."
            .to_string(),
        shows_produced: "500+".to_string(),
        artists_featured: "1000+".to_string(),
        years_experience: "25+".to_string(),
        phone: "+91 98151 05700".to_string(),
        email: "official@jashanfilms.com".to_string(),
        address: "Jalandhar, Punjab, India".to_string(),
    }
}

pub fn sample_media() -> Vec<NewMediaItem> {
    [
        ("Punjabi Folk Song - Traditional", "Featured Artist Name"),
        ("Modern Punjabi Hit", "Popular Singer"),
        ("Cultural Dance Performance", "Traditional Group"),
    ]
    .into_iter()
    .map(|(title, artist)| NewMediaItem {
        title: title.to_string(),
        artist: artist.to_string(),
        video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
    })
    .collect()
}

/// Create the company profile and sample media if missing, and the bootstrap
/// admin if the allow-list is empty. Existing content is never touched.
pub async fn initialize_defaults(
    store: &dyn DocumentStore,
    bootstrap_admin: Option<&BootstrapAdmin>,
) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if store.get_company().await?.is_none() {
        store.upsert_company(&default_company()).await?;
        report.company_created = true;
    }

    if store.list_media().await?.is_empty() {
        for item in sample_media() {
            store.create_media(item).await?;
            report.media_created += 1;
        }
    }

    if let Some(admin) = bootstrap_admin {
        if store.list_admin_grants().await?.is_empty() {
            store
                .put_admin_grant(&AdminGrant::new(&admin.uid, &admin.email))
                .await?;
            report.admin_bootstrapped = true;
        }
    }

    Ok(report)
}
