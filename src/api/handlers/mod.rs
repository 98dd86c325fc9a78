mod admins;
mod company;
mod contacts;
mod media;
mod system;

use serde::{Deserialize, Serialize};

use crate::api::response::{ApiError, JSendPaginated, Pagination};

pub use admins::{grant_admin, list_grants, revoke_admin, session, stats};
pub use company::{get_company, upsert_company};
pub use contacts::{delete_contact, list_contacts, mark_contact, submit_contact};
pub use media::{create_media, delete_media, list_media, update_media};
pub use system::{health, purge};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    20
}

/// Slice an already ordered listing into a JSend page.
fn paginate<T, R: Serialize>(
    records: &[T],
    limit: u32,
    offset: u32,
    to_response: impl Fn(&T) -> R,
) -> Result<axum::Json<JSendPaginated<R>>, ApiError> {
    if limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let items: Vec<R> = records
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(to_response)
        .collect();

    Ok(JSendPaginated::success(
        items,
        Pagination {
            limit,
            offset,
            total: records.len() as u64,
        },
    ))
}
