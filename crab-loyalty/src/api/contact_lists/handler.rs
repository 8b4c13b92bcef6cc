//! Contact List API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Contact, ContactList, ContactListCreate, ContactListKind};
use sqlx::PgPool;

use super::super::{ApiResult, MessageResponse, require_text};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

fn list_not_found() -> AppError {
    AppError::new(ErrorCode::ContactListNotFound)
}

async fn require_list(pool: &PgPool, id: i64) -> ServiceResult<ContactList> {
    Ok(db::contact_lists::find_by_id(pool, id)
        .await?
        .ok_or_else(list_not_found)?)
}

fn validate_create(payload: &ContactListCreate) -> Result<(), AppError> {
    require_text(&payload.name, "name")?;
    match payload.kind {
        ContactListKind::Sync if payload.filter_customer_types.is_empty() => {
            Err(AppError::validation("SYNC lists need filterCustomerTypes")
                .with_detail("field", "filterCustomerTypes"))
        }
        ContactListKind::Manual if payload.contacts.iter().any(|c| c.name.trim().is_empty()) => {
            Err(AppError::validation("Every contact needs a name")
                .with_detail("field", "contacts"))
        }
        _ => Ok(()),
    }
}

/// GET /contact-lists
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ContactList>> {
    Ok(Json(db::contact_lists::list(&state.pool).await?))
}

/// GET /contact-lists/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ContactList> {
    Ok(Json(require_list(&state.pool, id).await?))
}

/// POST /contact-lists. SYNC lists are populated right away
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ContactListCreate>,
) -> ApiResult<ContactList> {
    validate_create(&payload)?;

    let id = db::contact_lists::create(&state.pool, &payload).await?;
    if payload.kind == ContactListKind::Sync {
        db::contact_lists::sync_from_customers(&state.pool, id, &payload.filter_customer_types)
            .await?;
    }
    let list = require_list(&state.pool, id).await?;
    tracing::info!(list_id = id, contacts = list.contact_count, "Contact list created");
    Ok(Json(list))
}

/// DELETE /contact-lists/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<MessageResponse> {
    if !db::contact_lists::delete(&state.pool, id).await? {
        return Err(list_not_found().into());
    }
    Ok(MessageResponse::new("Contact list deleted"))
}

/// GET /contact-lists/{id}/contacts
pub async fn contacts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Contact>> {
    require_list(&state.pool, id).await?;
    Ok(Json(db::contact_lists::contacts(&state.pool, id).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSyncResult {
    pub list_id: i64,
    pub contact_count: u64,
}

/// POST /contact-lists/{id}/sync
pub async fn sync(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ListSyncResult> {
    let list = require_list(&state.pool, id).await?;
    if list.kind != ContactListKind::Sync {
        return Err(AppError::new(ErrorCode::ContactListNotSyncable).into());
    }
    let contact_count =
        db::contact_lists::sync_from_customers(&state.pool, id, &list.filter_customer_types)
            .await?;
    tracing::info!(list_id = id, contact_count, "Contact list synced");
    Ok(Json(ListSyncResult {
        list_id: id,
        contact_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ContactInput, CustomerType};

    fn payload(kind: ContactListKind) -> ContactListCreate {
        ContactListCreate {
            name: "Spring promo".into(),
            description: None,
            kind,
            filter_customer_types: vec![],
            contacts: vec![],
        }
    }

    #[test]
    fn sync_lists_need_a_filter() {
        assert!(validate_create(&payload(ContactListKind::Sync)).is_err());
        let with_filter = ContactListCreate {
            filter_customer_types: vec![CustomerType::Designer],
            ..payload(ContactListKind::Sync)
        };
        assert!(validate_create(&with_filter).is_ok());
    }

    #[test]
    fn manual_contacts_need_names() {
        let blank = ContactListCreate {
            contacts: vec![ContactInput {
                name: "  ".into(),
                phone: Some("555-0100".into()),
                email: None,
                customer_id: None,
            }],
            ..payload(ContactListKind::Manual)
        };
        assert!(validate_create(&blank).is_err());
        assert!(validate_create(&payload(ContactListKind::Manual)).is_ok());
    }
}
