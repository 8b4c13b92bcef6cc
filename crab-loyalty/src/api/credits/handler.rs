//! Credit API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{CreditBatch, CreditStats, CreditWithCustomer, CustomerCredit};

use super::super::ApiResult;
use crate::db::{self, credits::CreditQuery};
use crate::services::credits::{
    self, BatchRevokeResult, CreditValidation, UseCreditRequest, UseCreditResult,
};
use crate::services::issuance::{
    self, ByCustomers, ByLists, ByTypes, CreditIssueResult, CreditTerms, IssueTarget,
};
use crate::state::AppState;

/// Issuance body: target fields plus the credit terms, flat
#[derive(Debug, Deserialize)]
pub struct IssueRequest<T> {
    #[serde(flatten)]
    pub target: T,
    #[serde(flatten)]
    pub terms: CreditTerms,
}

/// GET /credits
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CreditQuery>,
) -> ApiResult<Vec<CreditWithCustomer>> {
    Ok(Json(db::credits::list(&state.pool, &query).await?))
}

/// GET /credits/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<CreditStats> {
    let now = shared::util::now_millis();
    Ok(Json(db::credits::stats(&state.pool, now).await?))
}

/// GET /credits/batches
pub async fn batches(State(state): State<AppState>) -> ApiResult<Vec<CreditBatch>> {
    Ok(Json(db::credits::batches(&state.pool).await?))
}

/// GET /credits/customer/{id}
pub async fn list_for_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<CreditWithCustomer>> {
    Ok(Json(db::credits::list_for_customer(&state.pool, id).await?))
}

async fn issue(
    state: &AppState,
    target: IssueTarget,
    terms: &CreditTerms,
) -> ApiResult<CreditIssueResult> {
    Ok(Json(issuance::issue_credits(&state.pool, terms, &target).await?))
}

/// POST /credits/issue/by-type
pub async fn issue_by_type(
    State(state): State<AppState>,
    Json(payload): Json<IssueRequest<ByTypes>>,
) -> ApiResult<CreditIssueResult> {
    issue(&state, payload.target.into(), &payload.terms).await
}

/// POST /credits/issue/by-lists
pub async fn issue_by_lists(
    State(state): State<AppState>,
    Json(payload): Json<IssueRequest<ByLists>>,
) -> ApiResult<CreditIssueResult> {
    issue(&state, payload.target.into(), &payload.terms).await
}

/// POST /credits/issue/by-customers
pub async fn issue_by_customers(
    State(state): State<AppState>,
    Json(payload): Json<IssueRequest<ByCustomers>>,
) -> ApiResult<CreditIssueResult> {
    issue(&state, payload.target.into(), &payload.terms).await
}

/// POST /credits/{id}/use
pub async fn use_credit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UseCreditRequest>,
) -> ApiResult<UseCreditResult> {
    Ok(Json(credits::use_credit(&state.pool, id, &payload).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateQuery {
    pub order_total: f64,
}

/// GET /credits/{id}/validate?orderTotal=
pub async fn validate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ValidateQuery>,
) -> ApiResult<CreditValidation> {
    Ok(Json(
        credits::validate_credit(&state.pool, id, query.order_total).await?,
    ))
}

/// DELETE /credits/{id}
pub async fn revoke(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CustomerCredit> {
    Ok(Json(credits::revoke(&state.pool, id).await?))
}

/// DELETE /credits/batch/{batch_id}
pub async fn revoke_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> ApiResult<BatchRevokeResult> {
    Ok(Json(credits::revoke_batch(&state.pool, &batch_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CreditSource, CustomerType};

    #[test]
    fn issue_body_is_flat() {
        let body: IssueRequest<ByTypes> = serde_json::from_value(serde_json::json!({
            "customerTypes": ["GC", "DESIGNER"],
            "amount": 25.0,
            "source": "COMPENSATION",
            "expiresInDays": 14
        }))
        .unwrap();
        assert_eq!(
            body.target.customer_types,
            vec![CustomerType::Gc, CustomerType::Designer]
        );
        assert_eq!(body.terms.amount, 25.0);
        assert_eq!(body.terms.min_order_amount, 0.0);
        assert_eq!(body.terms.source, CreditSource::Compensation);
        assert_eq!(body.terms.expires_in_days, Some(14));
    }
}
